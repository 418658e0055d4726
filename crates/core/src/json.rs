//! Process-wide JSON codec
//!
//! JSON mode is the human-readable interop form of a single object. It is
//! full-content and dedup-free: an object shared from several places is
//! written out in full each time. The codec holds no per-call state, so the
//! one shared instance is safe to use from any thread.

use crate::error::{Error, Result};
use crate::object::{Marshallable, ObjectRef};
use crate::resolver::TypeResolver;

/// Stateless JSON encoder/decoder for marshallable objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

static SHARED_CODEC: JsonCodec = JsonCodec;

impl JsonCodec {
    /// The process-wide codec instance.
    pub fn shared() -> &'static JsonCodec {
        &SHARED_CODEC
    }

    /// Serialize one object to JSON text.
    ///
    /// # Errors
    ///
    /// Returns a marshalling failure if the object cannot be represented as
    /// JSON (e.g. a map with non-string keys, or a `Serialize` impl that
    /// refuses).
    pub fn encode(&self, object: &dyn Marshallable) -> Result<String> {
        object.encode_json().map_err(Error::marshalling)
    }

    /// Decode JSON text into an instance of the type bound to `type_name`.
    ///
    /// # Errors
    ///
    /// Returns an unmarshalling failure if `type_name` does not resolve or
    /// the text does not match the bound type's shape.
    pub fn decode(&self, type_name: &str, json: &str, resolver: &TypeResolver) -> Result<ObjectRef> {
        resolver.resolve(type_name)?.decode_json(json)
    }

    /// [`decode`](Self::decode) through the calling thread's current resolver.
    pub fn decode_ambient(&self, type_name: &str, json: &str) -> Result<ObjectRef> {
        self.decode(type_name, json, &TypeResolver::current())
    }
}
