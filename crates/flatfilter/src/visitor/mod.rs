//! Transform visitor.
//!
//! Replays any visitable tree through any [`FlatFilterBuilder`], so every
//! (source, target) pair of representations is covered by one adapter per
//! representation instead of one converter per pair.

#[cfg(test)]
mod tests;

use crate::{
    builder::FlatFilterBuilder,
    error::{FilterError, VocabularyError},
    operator::{LogicalOp, TerminalOp},
    value::{FunctionCall, Subject, TerminalValue},
};
use std::sync::Arc;

///
/// Visit
///
/// Dispatch view of one node, in builder vocabulary.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Visit<'a, T> {
    Composite {
        op: LogicalOp,
        children: &'a [T],
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

///
/// Visitable
///
/// A tree representation that can describe each of its nodes as a [`Visit`].
/// Nodes the builder contract cannot express yield a vocabulary error.
///

pub trait Visitable: Sized {
    fn visit(&self) -> Result<Visit<'_, Self>, VocabularyError>;
}

/// Replay `node` and its subtree depth-first into `builder`.
pub fn replay<T, B>(node: &T, builder: &mut B) -> Result<(), FilterError>
where
    T: Visitable,
    B: FlatFilterBuilder + ?Sized,
{
    match node.visit()? {
        Visit::Composite { op, children } => {
            builder.begin_logical(op)?;
            for child in children {
                replay(child, builder)?;
            }
            builder.end_composite()?;
        }
        Visit::Terminal { op, subject, value } => {
            builder.begin_predicate(op)?;
            replay_subject(builder, subject)?;
            match value {
                TerminalValue::Plain(literal) => {
                    builder.set_value(literal)?;
                }
                TerminalValue::Templated(template) => {
                    builder.set_templated_value(
                        template.default_value,
                        &template.node_id,
                        template.is_visible,
                        template.is_read_only,
                    )?;
                }
            }
            builder.end_terminal()?;
        }
        Visit::Function { op, subject, call } => {
            builder.begin_predicate(op)?;
            replay_subject(builder, subject)?;
            builder.set_function_values(call.name(), call.args())?;
            builder.end_terminal()?;
        }
    }

    Ok(())
}

fn replay_subject<B>(builder: &mut B, subject: Subject) -> Result<(), FilterError>
where
    B: FlatFilterBuilder + ?Sized,
{
    match subject {
        Subject::Property(name) => builder.set_property(&name)?,
        Subject::LiteralProperty(literal) => builder.set_literal_property(literal)?,
    };

    Ok(())
}

/// Rebuild `tree` with `builder` and return the builder's root.
pub fn transform<T, B>(tree: &T, mut builder: B) -> Result<Arc<B::Output>, FilterError>
where
    T: Visitable,
    B: FlatFilterBuilder,
{
    tracing::debug!(target_type = std::any::type_name::<B::Output>(), "transform started");
    replay(tree, &mut builder)?;
    let root = builder.get_result()?;
    tracing::debug!("transform finished");

    Ok(root)
}
