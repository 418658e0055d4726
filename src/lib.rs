//! Tessera - pluggable object marshalling strategies
//!
//! Tessera turns in-memory objects into bytes (or JSON) and back through
//! interchangeable strategies selected per object by an acceptor chain.
//!
//! # Quick Start
//!
//! ```ignore
//! use tessera::{
//!     object_ref, AcceptAll, IdentityPlaceholderStrategy, MarshallingStrategy, ObjectIdentity,
//! };
//! use std::sync::Arc;
//!
//! let mut strategy = IdentityPlaceholderStrategy::new(Arc::new(AcceptAll));
//! let fact = object_ref(String::from("shared"));
//!
//! let mut buf = Vec::new();
//! strategy.write(&mut buf, &fact)?;
//! strategy.write(&mut buf, &fact)?; // same key again
//!
//! let back = strategy.read(&mut buf.as_slice())?;
//! assert!(ObjectIdentity::same(&back, &fact));
//! ```
//!
//! # Architecture
//!
//! - `tessera-core`: object model, surrogate keys, type resolution, JSON codec, errors
//! - `tessera-strategies`: identity-placeholder and native strategies, acceptors,
//!   the strategy store and its TOML configuration

pub use tessera_core::*;
pub use tessera_strategies::*;
