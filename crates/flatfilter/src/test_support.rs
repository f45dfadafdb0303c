use crate::{
    builder::FlatFilterBuilder,
    error::{FilterError, VocabularyError},
    operator::{LogicalOp, TerminalKind, TerminalOp},
    value::{FunctionCall, Literal, Subject, TemplateValue, TerminalValue},
    visitor::{Visit, Visitable},
};
use proptest::prelude::*;

/// Route builder tracing to the test writer; `RUST_LOG` selects the level.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `op(property, value)` as one terminal.
pub(crate) fn push_comparison<B: FlatFilterBuilder>(
    builder: &mut B,
    op: &str,
    property: &str,
    value: &str,
) -> Result<(), FilterError> {
    builder
        .begin_terminal(TerminalKind::Comparison, op)?
        .set_property(property)?
        .set_value(Literal::text(value))?
        .end_terminal()?;

    Ok(())
}

/// `AND(=(name, "Bob"), OR(<(length, "120"), <=(width, "20")))`
pub(crate) fn build_nested<B: FlatFilterBuilder>(builder: &mut B) -> Result<(), FilterError> {
    builder.begin_composite("AND")?;
    push_comparison(builder, "=", "name", "Bob")?;
    builder.begin_composite("OR")?;
    push_comparison(builder, "<", "length", "120")?;
    push_comparison(builder, "<=", "width", "20")?;
    builder.end_composite()?.end_composite()?;

    Ok(())
}

/// One node of every terminal family, a templated value, a literal subject
/// and a function-valued terminal under two logic levels.
pub(crate) fn build_mixed<B: FlatFilterBuilder>(builder: &mut B) -> Result<(), FilterError> {
    builder
        .begin_composite("OR")?
        .begin_composite("AND")?
        .begin_terminal(TerminalKind::Like, "ILIKE")?
        .set_property("title")?
        .set_value(Literal::text("*report*"))?
        .end_terminal()?
        .begin_terminal(TerminalKind::Temporal, "AFTER")?
        .set_property("created")?
        .set_templated_value(Literal::text("2024-01-01T00:00:00Z"), "created-after", true, false)?
        .end_terminal()?
        .begin_terminal(TerminalKind::Spatial, "INTERSECTS")?
        .set_property("anyGeo")?
        .set_value(Literal::text("POINT(1 2)"))?
        .end_terminal()?
        .end_composite()?
        .begin_terminal(TerminalKind::Comparison, "=")?
        .set_literal_property(Literal::Bool(true))?
        .set_function_values(
            "proximity",
            &[Literal::text("anyText"), Literal::Int(2), Literal::text("words")],
        )?
        .end_terminal()?
        .begin_terminal(TerminalKind::Like, "LIKE")?
        .set_property("owner")?
        .set_value(Literal::text("adm?n"))?
        .end_terminal()?
        .end_composite()?;

    Ok(())
}

///
/// Shape
///
/// Test-only visitable tree used to drive builders from generated input.
///

#[derive(Clone, Debug)]
pub(crate) enum Shape {
    Composite {
        op: LogicalOp,
        children: Vec<Self>,
    },
    Terminal {
        op: TerminalOp,
        subject: Subject,
        value: TerminalValue,
    },
    Function {
        op: TerminalOp,
        subject: Subject,
        call: FunctionCall,
    },
}

impl Visitable for Shape {
    fn visit(&self) -> Result<Visit<'_, Self>, VocabularyError> {
        Ok(match self {
            Self::Composite { op, children } => Visit::Composite {
                op: *op,
                children,
            },
            Self::Terminal { op, subject, value } => Visit::Terminal {
                op: *op,
                subject: subject.clone(),
                value: value.clone(),
            },
            Self::Function { op, subject, call } => Visit::Function {
                op: *op,
                subject: subject.clone(),
                call: call.clone(),
            },
        })
    }
}

pub(crate) fn arb_literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,8}".prop_map(Literal::Text),
        any::<i64>().prop_map(Literal::Int),
        any::<bool>().prop_map(Literal::Bool),
    ]
}

fn arb_subject() -> impl Strategy<Value = Subject> {
    prop_oneof![
        3 => "[a-z][a-zA-Z]{0,7}".prop_map(Subject::Property),
        1 => arb_literal().prop_map(Subject::LiteralProperty),
    ]
}

fn arb_terminal_value() -> impl Strategy<Value = TerminalValue> {
    prop_oneof![
        3 => arb_literal().prop_map(TerminalValue::Plain),
        1 => (arb_literal(), "[a-z0-9-]{1,8}", any::<bool>(), any::<bool>()).prop_map(
            |(default_value, node_id, is_visible, is_read_only)| {
                TerminalValue::Templated(TemplateValue::new(
                    default_value,
                    node_id,
                    is_visible,
                    is_read_only,
                ))
            }
        ),
    ]
}

fn arb_call() -> impl Strategy<Value = FunctionCall> {
    (
        prop::sample::select(vec!["proximity", "near", "strlen"]),
        prop::collection::vec(arb_literal(), 1..4),
    )
        .prop_map(|(name, args)| FunctionCall::new(name, &args).unwrap())
}

fn arb_terminal_op() -> impl Strategy<Value = TerminalOp> {
    prop::sample::select(TerminalOp::ALL.to_vec())
}

fn arb_leaf() -> impl Strategy<Value = Shape> {
    prop_oneof![
        3 => (arb_terminal_op(), arb_subject(), arb_terminal_value())
            .prop_map(|(op, subject, value)| Shape::Terminal { op, subject, value }),
        1 => (arb_terminal_op(), arb_subject(), arb_call())
            .prop_map(|(op, subject, call)| Shape::Function { op, subject, call }),
    ]
}

pub(crate) fn arb_shape() -> impl Strategy<Value = Shape> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        (
            prop::sample::select(LogicalOp::ALL.to_vec()),
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(op, children)| Shape::Composite { op, children })
    })
}
