//! Failure kinds by direction.

use crate::common::*;
use serde::{Serialize, Serializer};
use std::io::{self, Cursor, Write};
use std::sync::Arc;
use tessera::{Cause, Limits, MarshallingContext, SurrogateKey};

/// Holds a resource that refuses to be serialized.
#[derive(Debug)]
struct Connection;

impl Serialize for Connection {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("connections cannot be serialized"))
    }
}

struct ClosedSink;

impl Write for ClosedSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn read_of_unassigned_key_fails() {
    let strategy = identity_strategy();
    let mut cursor = Cursor::new(SurrogateKey::new(3).to_bytes().to_vec());
    let err = strategy.read(&mut cursor).unwrap_err();
    assert!(err.is_unmarshalling());
    assert!(matches!(err.cause(), Cause::UnknownKey(k) if k.value() == 3));
}

#[test]
fn unmarshal_of_unassigned_key_fails() {
    let strategy = identity_strategy();
    let err = strategy
        .unmarshal(
            "",
            &mut MarshallingContext::empty(),
            &mut io::empty(),
            &[0, 0, 0, 0],
            &resolver(),
        )
        .unwrap_err();
    assert!(err.is_unmarshalling());
    assert!(matches!(err.cause(), Cause::UnknownKey(_)));
}

#[test]
fn truncated_key_fails() {
    let strategy = identity_strategy();
    let err = strategy.read(&mut Cursor::new(vec![0, 0])).unwrap_err();
    assert!(err.is_unmarshalling());
    assert!(matches!(err.cause(), Cause::Io(_)));
}

#[test]
fn unserializable_object_fails_to_marshal() {
    let mut strategy = native_strategy();
    let err = strategy
        .write(&mut Vec::new(), &object_ref(Connection))
        .unwrap_err();
    assert!(err.is_marshalling());
    assert!(matches!(err.cause(), Cause::Native(_)));

    let err = strategy.marshal_to_json(&Connection).unwrap_err();
    assert!(err.is_marshalling());
    assert!(matches!(err.cause(), Cause::Json(_)));
}

#[test]
fn failing_sink_is_a_marshalling_failure() {
    let mut identity = identity_strategy();
    let err = identity
        .write(&mut ClosedSink, &fact("a", 1))
        .unwrap_err();
    assert!(err.is_marshalling());
    assert!(matches!(err.cause(), Cause::Io(_)));
    // The key stays assigned; the table is still consistent.
    assert_eq!(identity.table().len(), 1);
}

#[test]
fn native_unmarshal_of_unregistered_type_fails() {
    let mut strategy = native_strategy();
    let bytes = strategy
        .marshal(
            &mut MarshallingContext::empty(),
            &mut io::sink(),
            &object_ref(order(1)),
        )
        .unwrap();

    let empty = TypeResolver::new("empty");
    let err = strategy
        .unmarshal("", &mut MarshallingContext::empty(), &mut io::empty(), &bytes, &empty)
        .unwrap_err();
    assert!(err.is_unmarshalling());
    assert!(matches!(err.cause(), Cause::UnresolvedType { resolver, .. } if resolver == "empty"));
}

#[test]
fn oversized_envelope_is_rejected_before_allocation() {
    let strategy = native_strategy().with_limits(Limits {
        max_type_name_bytes: 1024,
        max_payload_bytes: 16,
    });

    let name = std::any::type_name::<Order>();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(name.len() as u32).to_be_bytes());
    bytes.extend_from_slice(name.as_bytes());
    bytes.extend_from_slice(&u32::MAX.to_be_bytes());

    let _scope = TypeResolver::enter(Arc::new(resolver()));
    let err = strategy.read(&mut Cursor::new(bytes)).unwrap_err();
    assert!(err.is_unmarshalling());
    assert!(matches!(err.cause(), Cause::LimitExceeded { max: 16, .. }));
}

#[test]
fn no_accepting_strategy_is_a_marshalling_failure() {
    let mut store = StrategyStore::new();
    store.push(Box::new(IdentityPlaceholderStrategy::new(Arc::new(
        TypePatternAcceptor::for_type::<Fact>(),
    ))));

    let err = store
        .write_object(&mut Vec::new(), &object_ref(order(1)))
        .unwrap_err();
    assert!(err.is_marshalling());
    assert!(matches!(err.cause(), Cause::NoAcceptingStrategy(_)));
}
