//! Tree model backend.
//!
//! Lightweight, representation-agnostic filter tree intended for UI-facing
//! serialization. Operator tokens map 1:1 onto [`LogicalOp`] / [`TerminalOp`].


use crate::{
    builder::{FilterBackend, FilterBuilder},
    error::{StateError, VocabularyError},
    operator::{LogicalOp, TerminalKind, TerminalOp, lookup},
    supplier::Reducer,
    value::{FunctionCall, Literal, Subject, TemplateValue, TerminalValue},
    visitor::{Visit, Visitable},
};
use serde::Serialize;
use std::fmt;

///
/// TABLES
///

const LOGICAL: &[(&str, LogicalOp)] = &[("AND", LogicalOp::And), ("OR", LogicalOp::Or)];

const COMPARISON: &[(&str, TerminalOp)] = &[
    ("=", TerminalOp::Equal),
    ("!=", TerminalOp::NotEqual),
    ("<", TerminalOp::Less),
    ("<=", TerminalOp::LessOrEqual),
    (">", TerminalOp::Greater),
    (">=", TerminalOp::GreaterOrEqual),
];

const LIKE: &[(&str, TerminalOp)] = &[("LIKE", TerminalOp::Like), ("ILIKE", TerminalOp::ILike)];

const TEMPORAL: &[(&str, TerminalOp)] = &[
    ("BEFORE", TerminalOp::Before),
    ("AFTER", TerminalOp::After),
];

const SPATIAL: &[(&str, TerminalOp)] = &[
    ("INTERSECTS", TerminalOp::Intersects),
    ("DISJOINT", TerminalOp::Disjoint),
];

///
/// FilterNode
///
/// Sealed node of the tree model. Only builders create these; the tree is
/// immutable once handed out.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    Composite(CompositeNode),
    Terminal(TerminalNode),
    Function(FunctionNode),
}

impl FilterNode {
    /// Operator token of this node.
    #[must_use]
    pub const fn op_token(&self) -> &'static str {
        match self {
            Self::Composite(node) => node.op.token(),
            Self::Terminal(node) => node.op.token(),
            Self::Function(node) => node.op.token(),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Composite(node) => &node.children,
            Self::Terminal(_) | Self::Function(_) => &[],
        }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }

    /// Nesting depth of this subtree; a lone terminal has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Self::depth).max().unwrap_or(0)
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite(node) => {
                write!(f, "{}(", node.op)?;
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            Self::Terminal(node) => write!(f, "{}({}, {})", node.op, node.subject, node.value),
            Self::Function(node) => write!(f, "{}({}, {})", node.op, node.subject, node.call),
        }
    }
}

///
/// CompositeNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct CompositeNode {
    #[serde(rename = "type")]
    pub(crate) op: LogicalOp,
    #[serde(rename = "filters")]
    pub(crate) children: Vec<FilterNode>,
}

impl CompositeNode {
    #[must_use]
    pub const fn op(&self) -> LogicalOp {
        self.op
    }

    #[must_use]
    pub fn children(&self) -> &[FilterNode] {
        &self.children
    }
}

///
/// TerminalNode
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct TerminalNode {
    #[serde(rename = "type")]
    pub(crate) op: TerminalOp,
    #[serde(flatten)]
    pub(crate) subject: Subject,
    #[serde(flatten)]
    pub(crate) value: TerminalValue,
}

impl TerminalNode {
    #[must_use]
    pub const fn op(&self) -> TerminalOp {
        self.op
    }

    #[must_use]
    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub const fn value(&self) -> &TerminalValue {
        &self.value
    }

    #[must_use]
    pub const fn is_templated(&self) -> bool {
        matches!(self.value, TerminalValue::Templated(_))
    }
}

///
/// FunctionNode
///
/// Terminal whose value slot holds a function call.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct FunctionNode {
    #[serde(rename = "type")]
    pub(crate) op: TerminalOp,
    #[serde(flatten)]
    pub(crate) subject: Subject,
    #[serde(rename = "function")]
    pub(crate) call: FunctionCall,
}

impl FunctionNode {
    #[must_use]
    pub const fn op(&self) -> TerminalOp {
        self.op
    }

    #[must_use]
    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub const fn call(&self) -> &FunctionCall {
        &self.call
    }
}

impl Visitable for FilterNode {
    fn visit(&self) -> Result<Visit<'_, Self>, VocabularyError> {
        Ok(match self {
            Self::Composite(node) => Visit::Composite {
                op: node.op,
                children: &node.children,
            },
            Self::Terminal(node) => Visit::Terminal {
                op: node.op,
                subject: node.subject.clone(),
                value: node.value.clone(),
            },
            Self::Function(node) => Visit::Function {
                op: node.op,
                subject: node.subject.clone(),
                call: node.call.clone(),
            },
        })
    }
}

///
/// TreeOperand
///
/// Terminal operand accumulated by an open tree-model terminal.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TreeOperand {
    Property(String),
    LiteralProperty(Literal),
    Value(Literal),
    Templated(TemplateValue),
    Function(FunctionCall),
}

///
/// TreeModelBackend
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TreeModelBackend;

/// Builder producing [`FilterNode`] trees.
pub type TreeModelBuilder = FilterBuilder<TreeModelBackend>;

impl FilterBackend for TreeModelBackend {
    type Operand = TreeOperand;
    type Node = FilterNode;

    fn logical(&self, op: &str) -> Result<Reducer<FilterNode, FilterNode>, VocabularyError> {
        let op = lookup(LOGICAL, op).ok_or_else(|| VocabularyError::UnknownLogicalOp {
            token: op.to_string(),
        })?;

        Ok(Box::new(move |children: Vec<FilterNode>| {
            Ok(FilterNode::Composite(CompositeNode { op, children }))
        }))
    }

    fn terminal(
        &self,
        kind: TerminalKind,
        op: &str,
    ) -> Result<Reducer<TreeOperand, FilterNode>, VocabularyError> {
        let table = match kind {
            TerminalKind::Comparison => COMPARISON,
            TerminalKind::Like => LIKE,
            TerminalKind::Temporal => TEMPORAL,
            TerminalKind::Spatial => SPATIAL,
        };
        let op = lookup(table, op).ok_or_else(|| VocabularyError::UnknownTerminalOp {
            kind,
            token: op.to_string(),
        })?;

        Ok(Box::new(move |operands: Vec<TreeOperand>| {
            reduce_terminal(op, operands)
        }))
    }

    fn property(&self, name: &str) -> TreeOperand {
        TreeOperand::Property(name.to_string())
    }

    fn literal_property(&self, value: Literal) -> TreeOperand {
        TreeOperand::LiteralProperty(value)
    }

    fn value(&self, value: Literal) -> TreeOperand {
        TreeOperand::Value(value)
    }

    fn templated_value(&self, template: TemplateValue) -> TreeOperand {
        TreeOperand::Templated(template)
    }

    fn function(&self, call: FunctionCall) -> TreeOperand {
        TreeOperand::Function(call)
    }
}

// Operands arrive as [subject, value]; anything else is a state machine defect.
fn reduce_terminal(op: TerminalOp, operands: Vec<TreeOperand>) -> Result<FilterNode, StateError> {
    let malformed = || StateError::MalformedOperands {
        node: op.token().to_string(),
    };

    let [subject, value]: [TreeOperand; 2] = operands.try_into().map_err(|_| malformed())?;
    let subject = match subject {
        TreeOperand::Property(name) => Subject::Property(name),
        TreeOperand::LiteralProperty(literal) => Subject::LiteralProperty(literal),
        _ => return Err(malformed()),
    };

    let node = match value {
        TreeOperand::Value(literal) => FilterNode::Terminal(TerminalNode {
            op,
            subject,
            value: TerminalValue::Plain(literal),
        }),
        TreeOperand::Templated(template) => FilterNode::Terminal(TerminalNode {
            op,
            subject,
            value: TerminalValue::Templated(template),
        }),
        TreeOperand::Function(call) => FilterNode::Function(FunctionNode { op, subject, call }),
        TreeOperand::Property(_) | TreeOperand::LiteralProperty(_) => return Err(malformed()),
    };

    Ok(node)
}
