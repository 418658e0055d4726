//! Native serialization strategy
//!
//! Deep-serializes each accepted object with the native binary codec
//! (bincode). Nothing is deduplicated: an object written twice is encoded
//! twice and restored as two value-equal copies.
//!
//! ## Envelope format
//!
//! The encoded form is self-describing so it can be restored without the
//! surrounding stream:
//!
//! ```text
//! ┌──────────────┬───────────────┬──────────────┬─────────────────┐
//! │ name_len u32 │ type name     │ data_len u32 │ bincode payload │
//! │ (BE)         │ (UTF-8)       │ (BE)         │                 │
//! └──────────────┴───────────────┴──────────────┴─────────────────┘
//! ```
//!
//! The type name is resolved through a [`TypeResolver`] on the way back in:
//! the caller-supplied one for [`unmarshal`](MarshallingStrategy::unmarshal),
//! the calling thread's current one for [`read`](MarshallingStrategy::read).

use crate::acceptor::StrategyAcceptor;
use crate::context::MarshallingContext;
use crate::strategy::MarshallingStrategy;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};
use std::sync::Arc;
use tessera_core::{Cause, Error, Limits, Marshallable, ObjectRef, Result, TypeResolver};
use tracing::trace;

/// Default name of native serialization strategies.
pub const NATIVE_STRATEGY_NAME: &str = "native-serialization";

/// Decoded envelope header and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Envelope {
    type_name: String,
    payload: Vec<u8>,
}

/// Strategy deep-serializing accepted objects.
#[derive(Debug)]
pub struct NativeSerializationStrategy {
    name: String,
    acceptor: Arc<dyn StrategyAcceptor>,
    limits: Limits,
}

impl NativeSerializationStrategy {
    /// Create a strategy with default limits.
    pub fn new(acceptor: Arc<dyn StrategyAcceptor>) -> Self {
        Self::with_name(NATIVE_STRATEGY_NAME, acceptor)
    }

    /// Create a named strategy with default limits.
    pub fn with_name(name: impl Into<String>, acceptor: Arc<dyn StrategyAcceptor>) -> Self {
        NativeSerializationStrategy {
            name: name.into(),
            acceptor,
            limits: Limits::default(),
        }
    }

    /// Replace the size limits applied to envelopes.
    ///
    /// Both limits are capped at `u32::MAX`, the largest length a frame
    /// prefix can carry.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = Limits {
            max_type_name_bytes: limits.max_type_name_bytes.min(MAX_FRAME_LEN),
            max_payload_bytes: limits.max_payload_bytes.min(MAX_FRAME_LEN),
        };
        self
    }

    /// Size limits applied to envelopes.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Decode one object from `source`, resolving its type through `resolver`.
    pub fn read_with(&self, source: &mut dyn Read, resolver: &TypeResolver) -> Result<ObjectRef> {
        let envelope = self.read_envelope(source)?;
        resolver.resolve(&envelope.type_name)?.decode_native(&envelope.payload)
    }

    fn write_envelope(&self, sink: &mut dyn Write, object: &dyn Marshallable) -> Result<()> {
        let type_name = object.type_name();
        let payload = object.encode_native().map_err(Error::marshalling)?;

        self.limits
            .check_type_name(type_name.len())
            .map_err(Error::marshalling)?;
        self.limits
            .check_payload(payload.len())
            .map_err(Error::marshalling)?;

        write_frame(sink, "type name", type_name.as_bytes())?;
        write_frame(sink, "payload", &payload)?;

        trace!(type_name, payload_len = payload.len(), "wrote native envelope");
        Ok(())
    }

    fn read_envelope(&self, source: &mut dyn Read) -> Result<Envelope> {
        let name_len = read_len(source)?;
        self.limits
            .check_type_name(name_len)
            .map_err(Error::unmarshalling)?;
        let name = read_exact_vec(source, name_len)?;
        let type_name = String::from_utf8(name).map_err(|_| {
            Error::unmarshalling(Cause::MalformedEnvelope(
                "type name is not valid UTF-8".to_string(),
            ))
        })?;

        let payload_len = read_len(source)?;
        self.limits
            .check_payload(payload_len)
            .map_err(Error::unmarshalling)?;
        let payload = read_exact_vec(source, payload_len)?;

        Ok(Envelope { type_name, payload })
    }
}

/// Largest length a frame prefix can carry.
const MAX_FRAME_LEN: usize = u32::MAX as usize;

fn frame_len(what: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::marshalling(Cause::LimitExceeded {
            what,
            len,
            max: MAX_FRAME_LEN,
        })
    })
}

fn write_frame(sink: &mut dyn Write, what: &'static str, bytes: &[u8]) -> Result<()> {
    let len = frame_len(what, bytes.len())?;
    sink.write_u32::<BigEndian>(len)
        .and_then(|_| sink.write_all(bytes))
        .map_err(Error::marshalling)
}

fn read_len(source: &mut dyn Read) -> Result<usize> {
    let len = source
        .read_u32::<BigEndian>()
        .map_err(Error::unmarshalling)?;
    Ok(len as usize)
}

fn read_exact_vec(source: &mut dyn Read, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    source.read_exact(&mut buf).map_err(Error::unmarshalling)?;
    Ok(buf)
}

impl MarshallingStrategy for NativeSerializationStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, object: &dyn Marshallable) -> bool {
        self.acceptor.accept(object)
    }

    fn write(&mut self, sink: &mut dyn Write, object: &ObjectRef) -> Result<()> {
        self.write_envelope(sink, object.as_ref())
    }

    fn read(&self, source: &mut dyn Read) -> Result<ObjectRef> {
        self.read_with(source, &TypeResolver::current())
    }

    fn marshal(
        &mut self,
        _context: &mut MarshallingContext,
        _sink: &mut dyn Write,
        object: &ObjectRef,
    ) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_envelope(&mut buf, object.as_ref())?;
        Ok(buf)
    }

    /// Restores from a standalone envelope. A non-empty `data_type` takes
    /// precedence over the type name recorded in the envelope.
    fn unmarshal(
        &self,
        data_type: &str,
        _context: &mut MarshallingContext,
        _source: &mut dyn Read,
        bytes: &[u8],
        resolver: &TypeResolver,
    ) -> Result<ObjectRef> {
        let mut cursor = Cursor::new(bytes);
        let envelope = self.read_envelope(&mut cursor)?;
        let trailing = bytes.len() - cursor.position() as usize;
        if trailing > 0 {
            return Err(Error::unmarshalling(Cause::MalformedEnvelope(format!(
                "{trailing} trailing bytes after payload"
            ))));
        }

        let type_name = if data_type.is_empty() {
            envelope.type_name.as_str()
        } else {
            data_type
        };
        resolver.resolve(type_name)?.decode_native(&envelope.payload)
    }
}
