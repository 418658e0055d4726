//! Marshalling strategies for Tessera
//!
//! This crate provides the pluggable strategy layer:
//! - MarshallingStrategy: stream, chunk and JSON conventions in one trait
//! - IdentityPlaceholderStrategy / IdentityTable: identity-preserving surrogate keys
//! - NativeSerializationStrategy: full deep serialization
//! - StrategyAcceptor: predicates routing objects to strategies
//! - StrategyStore: the ordered acceptor chain
//! - StrategyStoreConfig: TOML description of a strategy chain

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acceptor;
pub mod config;
pub mod context;
pub mod identity;
pub mod native;
pub mod store;
pub mod strategy;

pub use acceptor::{AcceptAll, FnAcceptor, PatternError, StrategyAcceptor, TypePattern, TypePatternAcceptor};
pub use config::{ConfigError, StrategyKind, StrategySpec, StrategyStoreConfig};
pub use context::MarshallingContext;
pub use identity::{Associations, IdentityPlaceholderStrategy, IdentityTable, IDENTITY_STRATEGY_NAME};
pub use native::{NativeSerializationStrategy, NATIVE_STRATEGY_NAME};
pub use store::{MarshalledEntry, StrategyStore};
pub use strategy::MarshallingStrategy;
