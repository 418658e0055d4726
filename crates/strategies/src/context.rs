//! Per-operation marshalling context
//!
//! A context is created once per marshalling or unmarshalling operation by
//! [`MarshallingStrategy::create_context`](crate::MarshallingStrategy::create_context)
//! and handed back to that strategy on every chunk call of the operation.
//! The identity and native strategies keep no per-operation state, so their
//! contexts are empty.

use std::any::Any;
use std::fmt;

/// Opaque, strategy-defined handle for one marshalling operation.
#[derive(Default)]
pub struct MarshallingContext {
    state: Option<Box<dyn Any + Send>>,
}

impl MarshallingContext {
    /// A context carrying no state.
    pub fn empty() -> Self {
        MarshallingContext { state: None }
    }

    /// A context carrying strategy-defined state.
    pub fn with_state<T: Any + Send>(state: T) -> Self {
        MarshallingContext {
            state: Some(Box::new(state)),
        }
    }

    /// True if no state is attached.
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    /// Borrow the attached state as a `T`.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_ref().and_then(|s| s.downcast_ref::<T>())
    }

    /// Mutably borrow the attached state as a `T`.
    pub fn state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state.as_mut().and_then(|s| s.downcast_mut::<T>())
    }
}

impl fmt::Debug for MarshallingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshallingContext")
            .field("has_state", &self.state.is_some())
            .finish()
    }
}
