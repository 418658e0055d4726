//! Shared fixtures for the strategy integration suite.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Arc;
pub use tessera::{
    object_ref, AcceptAll, IdentityPlaceholderStrategy, MarshallingStrategy,
    NativeSerializationStrategy, ObjectIdentity, ObjectRef, StrategyStore, TypePatternAcceptor,
    TypeResolver,
};

pub mod facts {
    use serde::{Deserialize, Serialize};

    /// A fact shared by reference across a session graph.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Fact {
        pub name: String,
        pub weight: u32,
    }
}

pub use facts::Fact;

/// A plain value object restored by copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub lines: Vec<OrderLine>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
}

pub fn fact(name: &str, weight: u32) -> ObjectRef {
    object_ref(Fact {
        name: name.to_string(),
        weight,
    })
}

pub fn order(id: u64) -> Order {
    Order {
        id,
        lines: vec![
            OrderLine {
                sku: "A-1".to_string(),
                quantity: 2,
            },
            OrderLine {
                sku: "B-7".to_string(),
                quantity: 1,
            },
        ],
        note: Some("leave at door".to_string()),
    }
}

/// Resolver knowing every fixture type.
pub fn resolver() -> TypeResolver {
    let resolver = TypeResolver::new("integration");
    resolver
        .register::<Fact>()
        .register::<Order>()
        .register::<OrderLine>();
    resolver
}

pub fn identity_strategy() -> IdentityPlaceholderStrategy {
    IdentityPlaceholderStrategy::new(Arc::new(AcceptAll))
}

pub fn native_strategy() -> NativeSerializationStrategy {
    NativeSerializationStrategy::new(Arc::new(AcceptAll))
}

/// Facts by identity, everything else by value.
pub fn fact_store() -> StrategyStore {
    let mut store = StrategyStore::new();
    store.push(Box::new(IdentityPlaceholderStrategy::new(Arc::new(
        TypePatternAcceptor::for_type::<Fact>(),
    ))));
    store.push(Box::new(native_strategy()));
    store
}
