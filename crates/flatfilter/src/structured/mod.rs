//! Structured model backend.
//!
//! Schema-constrained filter tree in the shape of a filter-encoding wire
//! document. Node shapes differ per operator family:
//!
//! - comparison: two ordered expressions (subject, value)
//! - like: two expressions plus escape / wildcard / single-char metadata and
//!   a match-case flag, fixed by the backend configuration
//! - spatial / temporal: an ordered expression list of any length
//!
//! Templated values have no native slot here and travel as the reserved
//! function [`TEMPLATE_FUNCTION_NAME`].

mod decode;

use crate::{
    TEMPLATE_FUNCTION_NAME,
    builder::{FilterBackend, FilterBuilder},
    config::{FlatFilterConfig, LikeMetadata},
    error::{StateError, VocabularyError},
    operator::{TerminalKind, lookup},
    supplier::Reducer,
    value::{FunctionCall, Literal, TemplateValue},
};
use derive_more::Display;
use serde::Serialize;
use std::fmt;

///
/// TABLES
///

const LOGICAL: &[(&str, LogicalOperator)] = &[
    ("AND", LogicalOperator::And),
    ("OR", LogicalOperator::Or),
];

const COMPARISON: &[(&str, ComparisonOperator)] = &[
    ("=", ComparisonOperator::PropertyIsEqualTo),
    ("!=", ComparisonOperator::PropertyIsNotEqualTo),
    ("<", ComparisonOperator::PropertyIsLessThan),
    ("<=", ComparisonOperator::PropertyIsLessThanOrEqualTo),
    (">", ComparisonOperator::PropertyIsGreaterThan),
    (">=", ComparisonOperator::PropertyIsGreaterThanOrEqualTo),
];

// token -> match_case
const LIKE: &[(&str, bool)] = &[("LIKE", true), ("ILIKE", false)];

const TEMPORAL: &[(&str, TemporalOperator)] = &[
    ("BEFORE", TemporalOperator::Before),
    ("AFTER", TemporalOperator::After),
];

const SPATIAL: &[(&str, SpatialOperator)] = &[
    ("INTERSECTS", SpatialOperator::Intersects),
    ("DISJOINT", SpatialOperator::Disjoint),
];

///
/// LogicalOperator
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum LogicalOperator {
    And,
    Or,
}

///
/// ComparisonOperator
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ComparisonOperator {
    PropertyIsEqualTo,
    PropertyIsNotEqualTo,
    PropertyIsLessThan,
    PropertyIsLessThanOrEqualTo,
    PropertyIsGreaterThan,
    PropertyIsGreaterThanOrEqualTo,
}

///
/// LikeOperator
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum LikeOperator {
    PropertyIsLike,
}

///
/// TemporalOperator
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum TemporalOperator {
    Before,
    After,
}

///
/// SpatialOperator
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum SpatialOperator {
    Intersects,
    Disjoint,
}

///
/// Expression
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Expression {
    #[serde(rename = "ValueReference")]
    PropertyName(String),
    Literal(Literal),
    Function(FunctionExpression),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropertyName(name) => f.write_str(name),
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Function(function) => {
                write!(f, "{}(", function.name)?;
                write_list(f, &function.args)?;
                f.write_str(")")
            }
        }
    }
}

///
/// FunctionExpression
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct FunctionExpression {
    pub(crate) name: String,
    #[serde(rename = "expression")]
    pub(crate) args: Vec<Expression>,
}

impl FunctionExpression {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    fn from_call(call: FunctionCall) -> Self {
        Self {
            name: call.name,
            args: call.args.into_iter().map(Expression::Literal).collect(),
        }
    }

    fn from_template(template: TemplateValue) -> Self {
        Self {
            name: TEMPLATE_FUNCTION_NAME.to_string(),
            args: vec![
                Expression::Literal(template.default_value),
                Expression::Literal(Literal::Text(template.node_id)),
                Expression::Literal(Literal::Bool(template.is_visible)),
                Expression::Literal(Literal::Bool(template.is_read_only)),
            ],
        }
    }
}

///
/// StructuredFilter
///
/// Sealed node of the structured model.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredFilter {
    Logic(LogicNode),
    Comparison(ComparisonNode),
    Like(LikeNode),
    Temporal(TemporalNode),
    Spatial(SpatialNode),
}

impl StructuredFilter {
    /// Element name of this node in the wire vocabulary.
    #[must_use]
    pub fn element(&self) -> String {
        match self {
            Self::Logic(node) => node.op.to_string(),
            Self::Comparison(node) => node.op.to_string(),
            Self::Like(node) => node.op.to_string(),
            Self::Temporal(node) => node.op.to_string(),
            Self::Spatial(node) => node.op.to_string(),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Logic(node) => &node.children,
            Self::Comparison(_) | Self::Like(_) | Self::Temporal(_) | Self::Spatial(_) => &[],
        }
    }

    /// Ordered operands of a non-logical node; empty for logic nodes.
    #[must_use]
    pub fn expressions(&self) -> &[Expression] {
        match self {
            Self::Logic(_) => &[],
            Self::Comparison(node) => &node.expressions,
            Self::Like(node) => &node.expressions,
            Self::Temporal(node) => &node.expressions,
            Self::Spatial(node) => &node.expressions,
        }
    }
}

impl fmt::Display for StructuredFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.element())?;
        match self {
            Self::Logic(node) => write_list(f, &node.children)?,
            _ => write_list(f, self.expressions())?,
        }
        f.write_str("]")
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}

///
/// LogicNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct LogicNode {
    #[serde(rename = "element")]
    pub(crate) op: LogicalOperator,
    #[serde(rename = "filters")]
    pub(crate) children: Vec<StructuredFilter>,
}

impl LogicNode {
    #[must_use]
    pub const fn op(&self) -> LogicalOperator {
        self.op
    }

    #[must_use]
    pub fn children(&self) -> &[StructuredFilter] {
        &self.children
    }
}

///
/// ComparisonNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct ComparisonNode {
    #[serde(rename = "element")]
    pub(crate) op: ComparisonOperator,
    #[serde(rename = "expression")]
    pub(crate) expressions: Vec<Expression>,
}

impl ComparisonNode {
    #[must_use]
    pub const fn op(&self) -> ComparisonOperator {
        self.op
    }
}

///
/// LikeNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeNode {
    #[serde(rename = "element")]
    pub(crate) op: LikeOperator,
    #[serde(rename = "expression")]
    pub(crate) expressions: Vec<Expression>,
    #[serde(flatten)]
    pub(crate) metadata: LikeMetadata,
    pub(crate) match_case: bool,
}

impl LikeNode {
    #[must_use]
    pub const fn metadata(&self) -> LikeMetadata {
        self.metadata
    }

    #[must_use]
    pub const fn match_case(&self) -> bool {
        self.match_case
    }
}

///
/// TemporalNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct TemporalNode {
    #[serde(rename = "element")]
    pub(crate) op: TemporalOperator,
    #[serde(rename = "expression")]
    pub(crate) expressions: Vec<Expression>,
}

impl TemporalNode {
    #[must_use]
    pub const fn op(&self) -> TemporalOperator {
        self.op
    }
}

///
/// SpatialNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct SpatialNode {
    #[serde(rename = "element")]
    pub(crate) op: SpatialOperator,
    #[serde(rename = "expression")]
    pub(crate) expressions: Vec<Expression>,
}

impl SpatialNode {
    #[must_use]
    pub const fn op(&self) -> SpatialOperator {
        self.op
    }
}

///
/// StructuredBackend
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredBackend {
    like: LikeMetadata,
}

impl StructuredBackend {
    #[must_use]
    pub const fn new(config: &FlatFilterConfig) -> Self {
        Self { like: config.like }
    }

    #[must_use]
    pub const fn like_metadata(&self) -> LikeMetadata {
        self.like
    }
}

/// Builder producing [`StructuredFilter`] trees.
pub type StructuredModelBuilder = FilterBuilder<StructuredBackend>;

impl FilterBackend for StructuredBackend {
    type Operand = Expression;
    type Node = StructuredFilter;

    fn logical(
        &self,
        op: &str,
    ) -> Result<Reducer<StructuredFilter, StructuredFilter>, VocabularyError> {
        let op = lookup(LOGICAL, op).ok_or_else(|| VocabularyError::UnknownLogicalOp {
            token: op.to_string(),
        })?;

        Ok(Box::new(move |children: Vec<StructuredFilter>| {
            Ok(StructuredFilter::Logic(LogicNode { op, children }))
        }))
    }

    fn terminal(
        &self,
        kind: TerminalKind,
        op: &str,
    ) -> Result<Reducer<Expression, StructuredFilter>, VocabularyError> {
        let unknown = || VocabularyError::UnknownTerminalOp {
            kind,
            token: op.to_string(),
        };

        let reducer: Reducer<Expression, StructuredFilter> = match kind {
            TerminalKind::Comparison => {
                let op = lookup(COMPARISON, op).ok_or_else(unknown)?;
                Box::new(move |expressions: Vec<Expression>| -> Result<_, StateError> {
                    ensure_pair(op.to_string(), &expressions)?;
                    Ok(StructuredFilter::Comparison(ComparisonNode { op, expressions }))
                })
            }
            TerminalKind::Like => {
                let match_case = lookup(LIKE, op).ok_or_else(unknown)?;
                let metadata = self.like;
                Box::new(move |expressions: Vec<Expression>| -> Result<_, StateError> {
                    ensure_pair(LikeOperator::PropertyIsLike.to_string(), &expressions)?;
                    Ok(StructuredFilter::Like(LikeNode {
                        op: LikeOperator::PropertyIsLike,
                        expressions,
                        metadata,
                        match_case,
                    }))
                })
            }
            TerminalKind::Temporal => {
                let op = lookup(TEMPORAL, op).ok_or_else(unknown)?;
                Box::new(move |expressions: Vec<Expression>| {
                    Ok(StructuredFilter::Temporal(TemporalNode { op, expressions }))
                })
            }
            TerminalKind::Spatial => {
                let op = lookup(SPATIAL, op).ok_or_else(unknown)?;
                Box::new(move |expressions: Vec<Expression>| {
                    Ok(StructuredFilter::Spatial(SpatialNode { op, expressions }))
                })
            }
        };

        Ok(reducer)
    }

    fn property(&self, name: &str) -> Expression {
        Expression::PropertyName(name.to_string())
    }

    fn literal_property(&self, value: Literal) -> Expression {
        Expression::Literal(value)
    }

    fn value(&self, value: Literal) -> Expression {
        Expression::Literal(value)
    }

    fn templated_value(&self, template: TemplateValue) -> Expression {
        Expression::Function(FunctionExpression::from_template(template))
    }

    fn function(&self, call: FunctionCall) -> Expression {
        Expression::Function(FunctionExpression::from_call(call))
    }
}

fn ensure_pair(node: String, expressions: &[Expression]) -> Result<(), StateError> {
    if expressions.len() != 2 {
        return Err(StateError::MalformedOperands { node });
    }

    Ok(())
}
