//! Native serialization strategy end to end.

use crate::common::*;
use std::io::Cursor;
use std::sync::Arc;
use tessera::{downcast_object, MarshallingContext};

#[test]
fn chunk_roundtrip_reproduces_equal_value() {
    let mut strategy = native_strategy();
    let original = object_ref(order(42));
    let mut ctx = strategy.create_context();

    let bytes = strategy
        .marshal(&mut ctx, &mut std::io::sink(), &original)
        .unwrap();
    let back = strategy
        .unmarshal(
            std::any::type_name::<Order>(),
            &mut ctx,
            &mut std::io::empty(),
            &bytes,
            &resolver(),
        )
        .unwrap();

    assert_eq!(back.downcast_ref::<Order>(), Some(&order(42)));
    assert!(!ObjectIdentity::same(&back, &original));
}

#[test]
fn repeated_object_is_encoded_each_time() {
    let mut strategy = native_strategy();
    let shared = object_ref(order(1));

    let mut buf = Vec::new();
    strategy.write(&mut buf, &shared).unwrap();
    let once = buf.len();
    strategy.write(&mut buf, &shared).unwrap();
    assert_eq!(buf.len(), once * 2);

    let _scope = TypeResolver::enter(Arc::new(resolver()));
    let mut cursor = Cursor::new(buf);
    let first = strategy.read(&mut cursor).unwrap();
    let second = strategy.read(&mut cursor).unwrap();

    assert!(!ObjectIdentity::same(&first, &second));
    let first = downcast_object::<Order>(first).unwrap();
    let second = downcast_object::<Order>(second).unwrap();
    assert_eq!(*first, *second);
}

#[test]
fn explicit_resolver_read_ignores_ambient() {
    let mut strategy = native_strategy();
    let mut buf = Vec::new();
    strategy.write(&mut buf, &object_ref(order(5))).unwrap();

    let _scope = TypeResolver::enter(Arc::new(TypeResolver::new("empty")));
    let back = strategy
        .read_with(&mut Cursor::new(buf), &resolver())
        .unwrap();
    assert_eq!(back.downcast_ref::<Order>().map(|o| o.id), Some(5));
}

#[test]
fn standard_library_values_resolve_globally() {
    let mut strategy = native_strategy();
    let mut ctx = MarshallingContext::empty();
    let value = object_ref(vec![1u32, 2, 3]);

    let bytes = strategy.marshal(&mut ctx, &mut std::io::sink(), &value).unwrap();

    let global = TypeResolver::global();
    global.register::<Vec<u32>>();
    let back = strategy
        .unmarshal("", &mut ctx, &mut std::io::empty(), &bytes, &global)
        .unwrap();
    assert_eq!(back.downcast_ref::<Vec<u32>>(), Some(&vec![1, 2, 3]));
}
