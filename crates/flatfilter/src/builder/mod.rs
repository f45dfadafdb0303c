//! The flat builder call grammar and the state machine that enforces it.
//!
//! A builder run is a linear sequence of `begin_*` / `set_*` / `end_*` calls
//! that describes one filter tree, followed by a single `get_result`. The
//! state machine here is backend-agnostic; a [`FilterBackend`] decides what
//! the operands and nodes actually look like.


use crate::{
    error::{FilterError, StateError, TerminalSlot, VocabularyError},
    operator::{LogicalOp, TerminalKind, TerminalOp},
    supplier::{BoundedPairSupplier, NodeSupplier, PairSlot, Reducer, UnboundedSupplier},
    value::{FunctionCall, Literal, TemplateValue},
};
use std::{convert::identity, sync::Arc};

///
/// FlatFilterBuilder
///
/// Caller-facing contract. Any walker that obeys the call grammar can drive
/// any implementation; a grammar violation is a caller defect and fails
/// immediately with a protocol error.
///

pub trait FlatFilterBuilder {
    type Output;

    /// Open a logical node (`AND` / `OR`).
    fn begin_composite(&mut self, op: &str) -> Result<&mut Self, FilterError>;

    /// Close the innermost logical node; it must have at least one child.
    fn end_composite(&mut self) -> Result<&mut Self, FilterError>;

    /// Open a terminal node whose operator is resolved in the `kind` table.
    fn begin_terminal(&mut self, kind: TerminalKind, op: &str) -> Result<&mut Self, FilterError>;

    fn set_property(&mut self, name: &str) -> Result<&mut Self, FilterError>;

    fn set_literal_property(&mut self, value: Literal) -> Result<&mut Self, FilterError>;

    fn set_value(&mut self, value: Literal) -> Result<&mut Self, FilterError>;

    fn set_templated_value(
        &mut self,
        default_value: Literal,
        node_id: &str,
        is_visible: bool,
        is_read_only: bool,
    ) -> Result<&mut Self, FilterError>;

    /// Fill the value slot with a function call.
    fn set_function_values(&mut self, name: &str, args: &[Literal])
    -> Result<&mut Self, FilterError>;

    fn end_terminal(&mut self) -> Result<&mut Self, FilterError>;

    /// Seal the builder and return the root. Repeated calls return the same
    /// shared root; every mutating call afterwards fails.
    fn get_result(&mut self) -> Result<Arc<Self::Output>, FilterError>;

    fn begin_logical(&mut self, op: LogicalOp) -> Result<&mut Self, FilterError> {
        self.begin_composite(op.token())
    }

    fn begin_predicate(&mut self, op: TerminalOp) -> Result<&mut Self, FilterError> {
        self.begin_terminal(op.kind(), op.token())
    }
}

///
/// FilterBackend
///
/// Shape provider for a builder. Resolves operator tokens through its own
/// family tables and renders terminal operands in its representation.
///

pub trait FilterBackend {
    /// Property / value operand accumulated by an open terminal.
    type Operand;

    /// Sealed filter node.
    type Node;

    fn logical(&self, op: &str) -> Result<Reducer<Self::Node, Self::Node>, VocabularyError>;

    fn terminal(
        &self,
        kind: TerminalKind,
        op: &str,
    ) -> Result<Reducer<Self::Operand, Self::Node>, VocabularyError>;

    fn property(&self, name: &str) -> Self::Operand;

    fn literal_property(&self, value: Literal) -> Self::Operand;

    fn value(&self, value: Literal) -> Self::Operand;

    fn templated_value(&self, template: TemplateValue) -> Self::Operand;

    fn function(&self, call: FunctionCall) -> Self::Operand;
}

///
/// FilterBuilder
///
/// Single-use state machine implementing [`FlatFilterBuilder`] over any
/// backend. Not synchronized; confine one instance to one thread.
///

pub struct FilterBuilder<B: FilterBackend> {
    backend: B,
    state: BuilderState<B::Operand, B::Node>,
}

impl<B: FilterBackend> FilterBuilder<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: BuilderState::Building(Building::default()),
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// True once `get_result` has succeeded.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        matches!(self.state, BuilderState::Sealed(_))
    }

    /// Number of composite nodes currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        match &self.state {
            BuilderState::Building(building) => building.frames.len(),
            BuilderState::Sealed(_) => 0,
        }
    }

    fn set_slot(
        &mut self,
        slot: TerminalSlot,
        operand: impl FnOnce(&B) -> B::Operand,
    ) -> Result<&mut Self, FilterError> {
        let terminal = self.state.building()?.open_terminal()?;
        terminal.set(slot, operand(&self.backend))?;
        tracing::trace!(node = %terminal.op, %slot, "terminal slot set");

        Ok(self)
    }
}

impl<B: FilterBackend + Default> Default for FilterBuilder<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: FilterBackend> FlatFilterBuilder for FilterBuilder<B> {
    type Output = B::Node;

    fn begin_composite(&mut self, op: &str) -> Result<&mut Self, FilterError> {
        let building = self.state.building()?;
        building.ensure_can_open()?;

        let reducer = self.backend.logical(op)?;
        building.frames.push(UnboundedSupplier::new(op, reducer));
        tracing::debug!(op, depth = building.frames.len(), "composite opened");

        Ok(self)
    }

    fn end_composite(&mut self) -> Result<&mut Self, FilterError> {
        let building = self.state.building()?;
        building.ensure_no_terminal()?;

        match building.frames.last() {
            None => return Err(StateError::NoCompositeOpen.into()),
            Some(frame) if frame.is_empty() => {
                return Err(StateError::EmptyComposite {
                    op: frame.node().to_string(),
                }
                .into());
            }
            Some(_) => {}
        }

        if let Some(frame) = building.frames.pop() {
            tracing::debug!(op = frame.node(), children = frame.len(), "composite closed");
            let node = frame.get()?;
            building.attach(node)?;
        }

        Ok(self)
    }

    fn begin_terminal(&mut self, kind: TerminalKind, op: &str) -> Result<&mut Self, FilterError> {
        let building = self.state.building()?;
        building.ensure_can_open()?;

        let reducer = self.backend.terminal(kind, op)?;
        building.terminal = Some(TerminalFrame::new(op, reducer));
        tracing::debug!(op, %kind, "terminal opened");

        Ok(self)
    }

    fn set_property(&mut self, name: &str) -> Result<&mut Self, FilterError> {
        self.set_slot(TerminalSlot::Property, |backend| backend.property(name))
    }

    fn set_literal_property(&mut self, value: Literal) -> Result<&mut Self, FilterError> {
        self.set_slot(TerminalSlot::LiteralProperty, |backend| {
            backend.literal_property(value)
        })
    }

    fn set_value(&mut self, value: Literal) -> Result<&mut Self, FilterError> {
        self.set_slot(TerminalSlot::Value, |backend| backend.value(value))
    }

    fn set_templated_value(
        &mut self,
        default_value: Literal,
        node_id: &str,
        is_visible: bool,
        is_read_only: bool,
    ) -> Result<&mut Self, FilterError> {
        let template = TemplateValue::new(default_value, node_id, is_visible, is_read_only);

        self.set_slot(TerminalSlot::TemplatedValue, |backend| {
            backend.templated_value(template)
        })
    }

    fn set_function_values(
        &mut self,
        name: &str,
        args: &[Literal],
    ) -> Result<&mut Self, FilterError> {
        // protocol errors win over malformed metadata
        self.state.building()?.open_terminal()?;
        let call = FunctionCall::new(name, args)?;

        self.set_slot(TerminalSlot::Value, |backend| backend.function(call))
    }

    fn end_terminal(&mut self) -> Result<&mut Self, FilterError> {
        let building = self.state.building()?;
        building.open_terminal()?.check()?;
        let terminal = building.terminal.take().ok_or(StateError::NoTerminalOpen)?;

        tracing::debug!(op = %terminal.op, "terminal closed");
        let node = terminal.seal()?;
        building.attach(node)?;

        Ok(self)
    }

    fn get_result(&mut self) -> Result<Arc<Self::Output>, FilterError> {
        let building = match &mut self.state {
            BuilderState::Sealed(root) => return Ok(Arc::clone(root)),
            BuilderState::Building(building) => building,
        };

        building.ensure_no_terminal()?;
        if !building.frames.is_empty() {
            return Err(StateError::CompositeOpen {
                depth: building.frames.len(),
            }
            .into());
        }

        let root = Arc::new(building.root.take().ok_or(StateError::NoRoot)?);
        self.state = BuilderState::Sealed(Arc::clone(&root));
        tracing::debug!("builder sealed");

        Ok(root)
    }
}

///
/// BuilderState
///

enum BuilderState<O, N> {
    Building(Building<O, N>),
    Sealed(Arc<N>),
}

impl<O, N> BuilderState<O, N> {
    fn building(&mut self) -> Result<&mut Building<O, N>, StateError> {
        match self {
            Self::Building(building) => Ok(building),
            Self::Sealed(_) => Err(StateError::Sealed),
        }
    }
}

///
/// Building
///
/// Open composite frames (innermost last), the open terminal if any, and
/// the root once the outermost node has been closed.
///

struct Building<O, N> {
    frames: Vec<UnboundedSupplier<N, N>>,
    terminal: Option<TerminalFrame<O, N>>,
    root: Option<N>,
}

impl<O, N> Default for Building<O, N> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            terminal: None,
            root: None,
        }
    }
}

impl<O, N> Building<O, N> {
    fn ensure_no_terminal(&self) -> Result<(), StateError> {
        if self.terminal.is_some() {
            return Err(StateError::TerminalOpen);
        }

        Ok(())
    }

    fn ensure_can_open(&self) -> Result<(), StateError> {
        self.ensure_no_terminal()?;
        if self.frames.is_empty() && self.root.is_some() {
            return Err(StateError::RootAlreadySet);
        }

        Ok(())
    }

    fn open_terminal(&mut self) -> Result<&mut TerminalFrame<O, N>, StateError> {
        match &mut self.terminal {
            Some(terminal) => Ok(terminal),
            None => Err(StateError::NoTerminalOpen),
        }
    }

    // Append a sealed node to the innermost open composite, or make it the root.
    fn attach(&mut self, node: N) -> Result<(), StateError> {
        if let Some(parent) = self.frames.last_mut() {
            return parent.set_next(node);
        }
        if self.root.is_some() {
            return Err(StateError::RootAlreadySet);
        }

        self.root = Some(node);
        tracing::debug!("root set");

        Ok(())
    }
}

///
/// TerminalFrame
///
/// Slots of the open terminal. Same-slot rewrites fail as soon as they
/// happen; the property / literal-property and value / templated-value
/// exclusions are only checked when the terminal is closed, and a close
/// that fails them keeps the terminal open.
///

struct TerminalFrame<O, N> {
    op: String,
    reducer: Reducer<O, N>,
    property: Option<O>,
    literal_property: Option<O>,
    value: Option<O>,
    templated_value: Option<O>,
}

impl<O, N> TerminalFrame<O, N> {
    fn new(op: &str, reducer: Reducer<O, N>) -> Self {
        Self {
            op: op.to_string(),
            reducer,
            property: None,
            literal_property: None,
            value: None,
            templated_value: None,
        }
    }

    fn set(&mut self, slot: TerminalSlot, operand: O) -> Result<(), StateError> {
        let target = match slot {
            TerminalSlot::Property => &mut self.property,
            TerminalSlot::LiteralProperty => &mut self.literal_property,
            TerminalSlot::Value => &mut self.value,
            TerminalSlot::TemplatedValue => &mut self.templated_value,
        };
        if target.is_some() {
            return Err(StateError::SlotAlreadySet {
                node: self.op.clone(),
                slot,
            });
        }

        *target = Some(operand);

        Ok(())
    }

    // Slot rules are checked through a shared borrow so a failed close
    // leaves the terminal open.
    fn check(&self) -> Result<(), StateError> {
        if self.property.is_some() && self.literal_property.is_some() {
            return Err(StateError::ConflictingProperty {
                node: self.op.clone(),
            });
        }
        if self.value.is_some() && self.templated_value.is_some() {
            return Err(StateError::ConflictingValue {
                node: self.op.clone(),
            });
        }

        let slot = if self.property.is_none() && self.literal_property.is_none() {
            PairSlot::Property
        } else if self.value.is_none() && self.templated_value.is_none() {
            PairSlot::Value
        } else {
            return Ok(());
        };

        Err(StateError::MissingSlot {
            node: self.op.clone(),
            slot,
        })
    }

    fn seal(self) -> Result<N, StateError> {
        let subject = self.property.or(self.literal_property);
        let value = self.value.or(self.templated_value);

        // a missing subject must be reported as the missing slot, so the value
        // is only offered once the property is in place
        let mut pair = BoundedPairSupplier::new(self.op, self.reducer);
        for operand in [subject, value].into_iter().map_while(identity) {
            pair.set_next(operand)?;
        }

        pair.get()
    }
}
