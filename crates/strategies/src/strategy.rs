//! Marshalling strategy trait
//!
//! A strategy is one way of turning objects into a transportable form and
//! back. Every strategy speaks three conventions:
//!
//! - **Stream**: `write` / `read` against a caller-supplied byte stream.
//! - **Chunk**: `marshal` / `unmarshal` producing and consuming one byte
//!   array per object, with an explicit type resolver on the way back in.
//! - **JSON**: `marshal_to_json` / `unmarshal_from_json`, a full-content,
//!   dedup-free interop form shared by all strategies.
//!
//! The encoded forms carry no strategy tag. Whoever routes objects to
//! strategies (see [`StrategyStore`](crate::StrategyStore)) must record which
//! strategy produced each entry and use the same one to read it back.
//!
//! # Thread Safety
//!
//! Write paths take `&mut self`: a strategy instance serves one marshalling
//! pass at a time. Share an instance across concurrent sessions only behind
//! external synchronization.

use crate::context::MarshallingContext;
use std::fmt;
use std::io::{Read, Write};
use tessera_core::{JsonCodec, Marshallable, ObjectRef, Result, TypeResolver};

/// A pluggable unit converting objects to and from a transportable form.
pub trait MarshallingStrategy: Send + fmt::Debug {
    /// Strategy name, unique within a store.
    fn name(&self) -> &str;

    /// True if this strategy is responsible for `object`.
    ///
    /// Delegates to the acceptor the strategy was built with.
    fn accept(&self, object: &dyn Marshallable) -> bool;

    /// Encode `object` onto `sink`.
    fn write(&mut self, sink: &mut dyn Write, object: &ObjectRef) -> Result<()>;

    /// Decode one object from `source`.
    ///
    /// Type names, where needed, resolve through the calling thread's
    /// current resolver.
    fn read(&self, source: &mut dyn Read) -> Result<ObjectRef>;

    /// Create the per-operation context for a marshalling pass.
    fn create_context(&self) -> MarshallingContext {
        MarshallingContext::empty()
    }

    /// Encode `object` into a standalone byte array.
    ///
    /// `sink` is the surrounding stream of the pass; strategies may ignore it.
    fn marshal(
        &mut self,
        context: &mut MarshallingContext,
        sink: &mut dyn Write,
        object: &ObjectRef,
    ) -> Result<Vec<u8>>;

    /// Decode an object from a byte array produced by [`marshal`](Self::marshal).
    ///
    /// `data_type` is the type-name hint recorded alongside the bytes;
    /// type names resolve through `resolver`, not the ambient one.
    fn unmarshal(
        &self,
        data_type: &str,
        context: &mut MarshallingContext,
        source: &mut dyn Read,
        bytes: &[u8],
        resolver: &TypeResolver,
    ) -> Result<ObjectRef>;

    /// Serialize `object` to JSON text.
    fn marshal_to_json(&self, object: &dyn Marshallable) -> Result<String> {
        JsonCodec::shared().encode(object)
    }

    /// Decode JSON text into the type bound to `data_type` in `resolver`.
    fn unmarshal_from_json_with(
        &self,
        data_type: &str,
        json: &str,
        resolver: &TypeResolver,
    ) -> Result<ObjectRef> {
        JsonCodec::shared().decode(data_type, json, resolver)
    }

    /// Decode JSON text, resolving `data_type` through the calling thread's
    /// current resolver.
    fn unmarshal_from_json(&self, data_type: &str, json: &str) -> Result<ObjectRef> {
        self.unmarshal_from_json_with(data_type, json, &TypeResolver::current())
    }
}
