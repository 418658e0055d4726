//! Property tests over the public strategy surface.

use crate::common::*;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Cursor;
use tessera::{IdentityTable, MarshallingContext, SurrogateKey};

proptest! {
    #[test]
    fn prop_same_reference_same_key(weights in proptest::collection::vec(any::<u32>(), 1..32)) {
        let objects: Vec<ObjectRef> = weights.iter().map(|w| fact("p", *w)).collect();
        let mut table = IdentityTable::new();

        let first: Vec<SurrogateKey> = objects.iter().map(|o| table.assign_or_get(o).unwrap()).collect();
        let second: Vec<SurrogateKey> = objects.iter().map(|o| table.assign_or_get(o).unwrap()).collect();

        prop_assert_eq!(first, second);
        // Every instance is distinct even when values coincide.
        prop_assert_eq!(table.len(), objects.len());
    }

    #[test]
    fn prop_stream_keys_are_dense_in_first_seen_order(
        picks in proptest::collection::vec(0usize..10, 1..60)
    ) {
        let pool: Vec<ObjectRef> = (0..10).map(|i| fact("pool", i)).collect();
        let mut strategy = identity_strategy();
        let mut buf = Vec::new();
        for &i in &picks {
            strategy.write(&mut buf, &pool[i]).unwrap();
        }

        let mut first_seen: Vec<usize> = Vec::new();
        for &i in &picks {
            if !first_seen.contains(&i) {
                first_seen.push(i);
            }
        }

        let keys: Vec<i32> = buf
            .chunks(4)
            .map(|c| SurrogateKey::from_bytes(c).unwrap().value())
            .collect();
        for (&pick, key) in picks.iter().zip(keys) {
            let expected = first_seen.iter().position(|&p| p == pick).unwrap() as i32;
            prop_assert_eq!(key, expected);
        }
    }

    #[test]
    fn prop_write_then_read_restores_references(
        picks in proptest::collection::vec(0usize..6, 1..40)
    ) {
        let pool: Vec<ObjectRef> = (0..6).map(|i| fact("rt", i)).collect();
        let mut strategy = identity_strategy();
        let mut buf = Vec::new();
        for &i in &picks {
            strategy.write(&mut buf, &pool[i]).unwrap();
        }

        let mut cursor = Cursor::new(buf);
        for &i in &picks {
            let back = strategy.read(&mut cursor).unwrap();
            prop_assert!(ObjectIdentity::same(&back, &pool[i]));
        }
    }

    #[test]
    fn prop_rehydrated_associations_replace_previous(
        keys in proptest::collection::btree_set(0i32..1000, 0..20)
    ) {
        let mut strategy = identity_strategy();
        let mut ctx = MarshallingContext::empty();
        let stale = fact("stale", 0);
        strategy.marshal(&mut ctx, &mut std::io::sink(), &stale).unwrap();

        let associations: BTreeMap<SurrogateKey, ObjectRef> = keys
            .iter()
            .map(|&k| (SurrogateKey::new(k), fact("fresh", k as u32)))
            .collect();
        strategy.set_associations(associations.clone());

        let restored = strategy.associations();
        prop_assert_eq!(restored.len(), associations.len());
        for (k, o) in &associations {
            prop_assert!(ObjectIdentity::same(&restored[k], o));
            prop_assert!(ObjectIdentity::same(&strategy.table().lookup(*k).unwrap(), o));
        }
        prop_assert!(strategy.table().key_of(&stale).is_none());
    }

    #[test]
    fn prop_key_bytes_roundtrip(value in any::<i32>()) {
        let key = SurrogateKey::new(value);
        let mut buf = Vec::new();
        key.write_to(&mut buf).unwrap();
        prop_assert_eq!(buf.as_slice(), &key.to_bytes()[..]);
        prop_assert_eq!(SurrogateKey::read_from(&mut buf.as_slice()).unwrap(), key);
    }

    #[test]
    fn prop_native_chunk_preserves_value(id in any::<u64>(), note in proptest::option::of("[a-z ]{0,24}")) {
        let mut strategy = native_strategy();
        let mut value = order(id);
        value.note = note;
        let mut ctx = MarshallingContext::empty();

        let bytes = strategy.marshal(&mut ctx, &mut std::io::sink(), &object_ref(value.clone())).unwrap();
        let back = strategy
            .unmarshal("", &mut ctx, &mut std::io::empty(), &bytes, &resolver())
            .unwrap();
        prop_assert_eq!(back.downcast_ref::<Order>(), Some(&value));
    }
}
