//! Identity-preserving surrogate key strategy.
//!
//! - [`IdentityTable`]: bidirectional key ↔ object store keyed by reference identity
//! - [`IdentityPlaceholderStrategy`]: strategy writing keys in place of objects

mod strategy;
mod table;

pub use strategy::{IdentityPlaceholderStrategy, IDENTITY_STRATEGY_NAME};
pub use table::{Associations, IdentityTable};
