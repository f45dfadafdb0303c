//! Flat call-sequence filter builder: the `FlatFilterBuilder` contract, the
//! tree-model and structured backends that realise it, and the transform
//! visitor that replays one tree through any builder.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod operator;
pub mod structured;
pub mod supplier;
pub mod value;
pub mod visitor;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Reserved function name carrying a templated value through formats that
/// have no native template slot.
pub const TEMPLATE_FUNCTION_NAME: &str = "template.value.v1";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, backends, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        builder::FlatFilterBuilder,
        model::FilterNode,
        operator::{LogicalOp, TerminalKind, TerminalOp},
        structured::StructuredFilter,
        value::{FunctionCall, Literal, TemplateValue},
    };
}
