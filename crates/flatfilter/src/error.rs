use crate::{operator::TerminalKind, supplier::PairSlot};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// FilterError
///
/// The only error surfaced by builder operations and transforms.
/// Every failure is either a protocol violation by the caller or input the
/// active backend does not understand; neither is ever retried or recovered.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    #[error("protocol error: {0}")]
    State(#[from] StateError),

    #[error("vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),
}

impl FilterError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::State(_) => ErrorClass::Protocol,
            Self::Vocabulary(_) => ErrorClass::Vocabulary,
        }
    }

    #[must_use]
    pub const fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    #[must_use]
    pub const fn is_vocabulary(&self) -> bool {
        matches!(self, Self::Vocabulary(_))
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    #[display("protocol")]
    Protocol,

    #[display("vocabulary")]
    Vocabulary,
}

///
/// StateError
///
/// Structural precondition violations of the builder call grammar.
/// Each variant names the precondition that failed.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StateError {
    #[error("builder is sealed; get_result() has already been called")]
    Sealed,

    #[error("a terminal node is open; call end_terminal() first")]
    TerminalOpen,

    #[error("no terminal node is open")]
    NoTerminalOpen,

    #[error("no composite node is open")]
    NoCompositeOpen,

    #[error("composite node '{op}' has no children")]
    EmptyComposite { op: String },

    #[error("{depth} composite node(s) still open")]
    CompositeOpen { depth: usize },

    #[error("no root node has been built")]
    NoRoot,

    #[error("a root node has already been built; a builder run produces exactly one root")]
    RootAlreadySet,

    #[error("terminal '{node}' slot '{slot}' is already set")]
    SlotAlreadySet { node: String, slot: TerminalSlot },

    #[error("terminal '{node}' has both a property and a literal property")]
    ConflictingProperty { node: String },

    #[error("terminal '{node}' has both a plain and a templated value")]
    ConflictingValue { node: String },

    #[error("node '{node}' is missing its {slot}")]
    MissingSlot { node: String, slot: PairSlot },

    #[error("node '{node}' already holds a property and a value")]
    PairOverflow { node: String },

    #[error("node '{node}' has no accumulated children")]
    EmptySupplier { node: String },

    #[error("node '{node}' received operands in an unexpected shape")]
    MalformedOperands { node: String },
}

///
/// TerminalSlot
///
/// Named slots of an open terminal accumulator.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum TerminalSlot {
    #[display("property")]
    Property,

    #[display("literal property")]
    LiteralProperty,

    #[display("value")]
    Value,

    #[display("templated value")]
    TemplatedValue,
}

///
/// VocabularyError
///
/// Operator tokens or function metadata not understood by the active backend.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum VocabularyError {
    #[error("unknown logical operator '{token}'")]
    UnknownLogicalOp { token: String },

    #[error("unknown {kind} operator '{token}'")]
    UnknownTerminalOp { kind: TerminalKind, token: String },

    #[error("malformed function metadata: {reason}")]
    MalformedFunction { reason: String },

    #[error("'{op}' node cannot be expressed as a single subject and value: {reason}")]
    UnrepresentableNode { op: String, reason: String },
}

impl VocabularyError {
    pub(crate) fn malformed_function(reason: impl Into<String>) -> Self {
        Self::MalformedFunction {
            reason: reason.into(),
        }
    }

    pub(crate) fn unrepresentable(op: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnrepresentableNode {
            op: op.into(),
            reason: reason.into(),
        }
    }
}
