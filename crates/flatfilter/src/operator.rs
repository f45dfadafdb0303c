//! Operator vocabulary shared by every backend.
//!
//! The tokens are the cross-representation contract: a visitor replays a
//! tree by emitting these tokens, and each backend resolves them through its
//! own family tables. Adding an operator here without adding it to every
//! backend's tables leaves it unsupported in that backend.

use derive_more::Display;
use serde::Serialize;

///
/// LogicalOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum LogicalOp {
    #[display("AND")]
    #[serde(rename = "AND")]
    And,

    #[display("OR")]
    #[serde(rename = "OR")]
    Or,
}

impl LogicalOp {
    pub const ALL: [Self; 2] = [Self::And, Self::Or];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

///
/// TerminalKind
///
/// Operator family of a terminal node; selects the lookup table used to
/// resolve the operator token.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalKind {
    #[display("comparison")]
    Comparison,

    #[display("like")]
    Like,

    #[display("temporal")]
    Temporal,

    #[display("spatial")]
    Spatial,
}

impl TerminalKind {
    pub const ALL: [Self; 4] = [Self::Comparison, Self::Like, Self::Temporal, Self::Spatial];
}

///
/// TerminalOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum TerminalOp {
    #[display("=")]
    #[serde(rename = "=")]
    Equal,

    #[display("!=")]
    #[serde(rename = "!=")]
    NotEqual,

    #[display("<")]
    #[serde(rename = "<")]
    Less,

    #[display("<=")]
    #[serde(rename = "<=")]
    LessOrEqual,

    #[display(">")]
    #[serde(rename = ">")]
    Greater,

    #[display(">=")]
    #[serde(rename = ">=")]
    GreaterOrEqual,

    #[display("LIKE")]
    #[serde(rename = "LIKE")]
    Like,

    #[display("ILIKE")]
    #[serde(rename = "ILIKE")]
    ILike,

    #[display("BEFORE")]
    #[serde(rename = "BEFORE")]
    Before,

    #[display("AFTER")]
    #[serde(rename = "AFTER")]
    After,

    #[display("INTERSECTS")]
    #[serde(rename = "INTERSECTS")]
    Intersects,

    #[display("DISJOINT")]
    #[serde(rename = "DISJOINT")]
    Disjoint,
}

impl TerminalOp {
    pub const ALL: [Self; 12] = [
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::Like,
        Self::ILike,
        Self::Before,
        Self::After,
        Self::Intersects,
        Self::Disjoint,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::Intersects => "INTERSECTS",
            Self::Disjoint => "DISJOINT",
        }
    }

    #[must_use]
    pub const fn kind(self) -> TerminalKind {
        match self {
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessOrEqual
            | Self::Greater
            | Self::GreaterOrEqual => TerminalKind::Comparison,
            Self::Like | Self::ILike => TerminalKind::Like,
            Self::Before | Self::After => TerminalKind::Temporal,
            Self::Intersects | Self::Disjoint => TerminalKind::Spatial,
        }
    }
}

/// Resolve `token` in a backend's `(token, operator)` family table.
pub(crate) fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find_map(|(candidate, op)| (*candidate == token).then_some(*op))
}
