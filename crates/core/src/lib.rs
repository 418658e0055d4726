//! Core types for Tessera marshalling
//!
//! This crate defines the vocabulary shared by every marshalling strategy:
//! - SurrogateKey: integer standing in for an object's identity
//! - Marshallable / ObjectRef: the object model and its shared handle
//! - ObjectIdentity: reference identity of a shared object
//! - TypeResolver: type name → decoder bindings, with ambient per-thread resolution
//! - JsonCodec: the process-wide stateless JSON codec
//! - Limits: size limits on untrusted encoded input
//! - Error: the marshalling / unmarshalling failure kinds

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod key;
pub mod limits;
pub mod object;
pub mod resolver;

pub use error::{Cause, Error, Result};
pub use json::JsonCodec;
pub use key::{SurrogateKey, KEY_ENCODED_LEN};
pub use limits::Limits;
pub use object::{downcast_object, object_ref, Marshallable, ObjectIdentity, ObjectRef};
pub use resolver::{ResolverScope, TypeBinding, TypeResolver};
