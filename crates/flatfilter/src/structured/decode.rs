//! Structured nodes described in builder vocabulary.

use super::{
    ComparisonOperator, Expression, FunctionExpression, LogicalOperator, SpatialOperator,
    StructuredFilter, TemporalOperator,
};
use crate::{
    TEMPLATE_FUNCTION_NAME,
    error::VocabularyError,
    operator::{LogicalOp, TerminalOp},
    value::{FunctionCall, Literal, Subject, TemplateValue, TerminalValue},
    visitor::{Visit, Visitable},
};

impl Visitable for StructuredFilter {
    fn visit(&self) -> Result<Visit<'_, Self>, VocabularyError> {
        let (op, expressions) = match self {
            Self::Logic(node) => {
                return Ok(Visit::Composite {
                    op: logical_op(node.op),
                    children: &node.children,
                });
            }
            Self::Comparison(node) => (comparison_op(node.op), &node.expressions),
            Self::Like(node) => {
                let op = if node.match_case {
                    TerminalOp::Like
                } else {
                    TerminalOp::ILike
                };
                (op, &node.expressions)
            }
            Self::Temporal(node) => (temporal_op(node.op), &node.expressions),
            Self::Spatial(node) => (spatial_op(node.op), &node.expressions),
        };

        decode_terminal(op, expressions)
    }
}

const fn logical_op(op: LogicalOperator) -> LogicalOp {
    match op {
        LogicalOperator::And => LogicalOp::And,
        LogicalOperator::Or => LogicalOp::Or,
    }
}

const fn comparison_op(op: ComparisonOperator) -> TerminalOp {
    match op {
        ComparisonOperator::PropertyIsEqualTo => TerminalOp::Equal,
        ComparisonOperator::PropertyIsNotEqualTo => TerminalOp::NotEqual,
        ComparisonOperator::PropertyIsLessThan => TerminalOp::Less,
        ComparisonOperator::PropertyIsLessThanOrEqualTo => TerminalOp::LessOrEqual,
        ComparisonOperator::PropertyIsGreaterThan => TerminalOp::Greater,
        ComparisonOperator::PropertyIsGreaterThanOrEqualTo => TerminalOp::GreaterOrEqual,
    }
}

const fn temporal_op(op: TemporalOperator) -> TerminalOp {
    match op {
        TemporalOperator::Before => TerminalOp::Before,
        TemporalOperator::After => TerminalOp::After,
    }
}

const fn spatial_op(op: SpatialOperator) -> TerminalOp {
    match op {
        SpatialOperator::Intersects => TerminalOp::Intersects,
        SpatialOperator::Disjoint => TerminalOp::Disjoint,
    }
}

fn decode_terminal(
    op: TerminalOp,
    expressions: &[Expression],
) -> Result<Visit<'static, StructuredFilter>, VocabularyError> {
    let [subject, value] = expressions else {
        return Err(VocabularyError::unrepresentable(
            op.token(),
            format!("expected 2 expressions, found {}", expressions.len()),
        ));
    };

    let subject = match subject {
        Expression::PropertyName(name) => Subject::Property(name.clone()),
        Expression::Literal(literal) => Subject::LiteralProperty(literal.clone()),
        Expression::Function(function) => {
            return Err(VocabularyError::unrepresentable(
                op.token(),
                format!("function '{}' used as the subject", function.name),
            ));
        }
    };

    match value {
        Expression::Literal(literal) => Ok(Visit::Terminal {
            op,
            subject,
            value: TerminalValue::Plain(literal.clone()),
        }),
        Expression::Function(function) if function.name == TEMPLATE_FUNCTION_NAME => {
            Ok(Visit::Terminal {
                op,
                subject,
                value: TerminalValue::Templated(decode_template(op, function)?),
            })
        }
        Expression::Function(function) => Ok(Visit::Function {
            op,
            subject,
            call: decode_call(op, function)?,
        }),
        Expression::PropertyName(name) => Err(VocabularyError::unrepresentable(
            op.token(),
            format!("property '{name}' used as the value"),
        )),
    }
}

fn literal_args(
    op: TerminalOp,
    function: &FunctionExpression,
) -> Result<Vec<Literal>, VocabularyError> {
    function
        .args
        .iter()
        .map(|arg| match arg {
            Expression::Literal(literal) => Ok(literal.clone()),
            Expression::PropertyName(_) | Expression::Function(_) => {
                Err(VocabularyError::unrepresentable(
                    op.token(),
                    format!("function '{}' has a non-literal argument", function.name),
                ))
            }
        })
        .collect()
}

fn decode_call(
    op: TerminalOp,
    function: &FunctionExpression,
) -> Result<FunctionCall, VocabularyError> {
    let args = literal_args(op, function)?;

    FunctionCall::new(&function.name, &args)
}

fn decode_template(
    op: TerminalOp,
    function: &FunctionExpression,
) -> Result<TemplateValue, VocabularyError> {
    let args = literal_args(op, function)?;

    match args.as_slice() {
        [
            default_value,
            Literal::Text(node_id),
            Literal::Bool(is_visible),
            Literal::Bool(is_read_only),
        ] => Ok(TemplateValue::new(
            default_value.clone(),
            node_id.clone(),
            *is_visible,
            *is_read_only,
        )),
        _ => Err(VocabularyError::unrepresentable(
            op.token(),
            format!("malformed {TEMPLATE_FUNCTION_NAME} arguments"),
        )),
    }
}
