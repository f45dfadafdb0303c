//! Child accumulators that collapse into a single node.
//!
//! Suppliers only count and order their inputs. They do not guard against use
//! after `get`; `get` consumes the supplier and the owning state machine is
//! responsible for never handing out a sealed one.

use crate::error::StateError;
use derive_more::Display;

///
/// Reducer
///
/// Injected reduction from the accumulated children to one node.
///

pub type Reducer<T, R> = Box<dyn Fn(Vec<T>) -> Result<R, StateError>>;

///
/// NodeSupplier
///

pub trait NodeSupplier<T, R> {
    /// Accept the next child value in arrival order.
    fn set_next(&mut self, value: T) -> Result<(), StateError>;

    /// Reduce the accumulated children into one node.
    fn get(self) -> Result<R, StateError>;
}

///
/// PairSlot
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum PairSlot {
    #[display("property")]
    Property,

    #[display("value")]
    Value,
}

///
/// BoundedPairSupplier
///
/// Accepts exactly two children: the property, then the value.
///

pub struct BoundedPairSupplier<T, R> {
    node: String,
    property: Option<T>,
    value: Option<T>,
    reducer: Reducer<T, R>,
}

impl<T, R> BoundedPairSupplier<T, R> {
    #[must_use]
    pub fn new(node: impl Into<String>, reducer: Reducer<T, R>) -> Self {
        Self {
            node: node.into(),
            property: None,
            value: None,
            reducer,
        }
    }

    /// Label of the node being accumulated, used in error messages.
    #[must_use]
    pub fn node(&self) -> &str {
        &self.node
    }
}

impl<T, R> NodeSupplier<T, R> for BoundedPairSupplier<T, R> {
    fn set_next(&mut self, value: T) -> Result<(), StateError> {
        if self.property.is_none() {
            self.property = Some(value);
        } else if self.value.is_none() {
            self.value = Some(value);
        } else {
            return Err(StateError::PairOverflow {
                node: self.node.clone(),
            });
        }

        Ok(())
    }

    fn get(self) -> Result<R, StateError> {
        let Some(property) = self.property else {
            return Err(StateError::MissingSlot {
                node: self.node,
                slot: PairSlot::Property,
            });
        };
        let Some(value) = self.value else {
            return Err(StateError::MissingSlot {
                node: self.node,
                slot: PairSlot::Value,
            });
        };

        (self.reducer)(vec![property, value])
    }
}

///
/// UnboundedSupplier
///
/// Accepts one or more children, kept in arrival order.
///

pub struct UnboundedSupplier<T, R> {
    node: String,
    values: Vec<T>,
    reducer: Reducer<T, R>,
}

impl<T, R> UnboundedSupplier<T, R> {
    #[must_use]
    pub fn new(node: impl Into<String>, reducer: Reducer<T, R>) -> Self {
        Self {
            node: node.into(),
            values: Vec::new(),
            reducer,
        }
    }

    #[must_use]
    pub fn node(&self) -> &str {
        &self.node
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T, R> NodeSupplier<T, R> for UnboundedSupplier<T, R> {
    fn set_next(&mut self, value: T) -> Result<(), StateError> {
        self.values.push(value);

        Ok(())
    }

    fn get(self) -> Result<R, StateError> {
        if self.values.is_empty() {
            return Err(StateError::EmptySupplier { node: self.node });
        }

        (self.reducer)(self.values)
    }
}
