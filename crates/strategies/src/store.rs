//! Strategy store: the ordered acceptor chain
//!
//! The store holds strategies in a fixed order and routes each object to the
//! first strategy whose acceptor takes it. Because encoded forms carry no
//! strategy tag, the store records the routing decision next to each entry:
//!
//! - stream form ([`write_object`](StrategyStore::write_object)): a 2-byte
//!   big-endian strategy index precedes the strategy's own encoding;
//! - chunk form ([`marshal_entry`](StrategyStore::marshal_entry)): a
//!   [`MarshalledEntry`] names the strategy and the type hint.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut store = StrategyStore::new();
//! store.push(Box::new(IdentityPlaceholderStrategy::new(Arc::new(facts_acceptor))));
//! store.push(Box::new(NativeSerializationStrategy::new(Arc::new(AcceptAll))));
//!
//! let entry = store.marshal_entry(&object)?;
//! let back = store.unmarshal_entry(&entry, &resolver)?;
//! ```

use crate::strategy::MarshallingStrategy;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Write};
use tessera_core::{Cause, Error, Marshallable, ObjectRef, Result, TypeResolver};
use tracing::{debug, warn};

/// One object marshalled through the chunk protocol, with its routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarshalledEntry {
    /// Position of the producing strategy in the store
    pub strategy_index: u16,
    /// Name of the producing strategy
    pub strategy_name: String,
    /// Type-name hint of the marshalled object
    pub data_type: String,
    /// Strategy-specific encoding
    pub bytes: Vec<u8>,
}

/// Ordered chain of marshalling strategies.
#[derive(Default)]
pub struct StrategyStore {
    strategies: Vec<Box<dyn MarshallingStrategy>>,
}

impl StrategyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        StrategyStore {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to the end of the chain; returns its index.
    ///
    /// Names should be unique. Entries from a strategy whose name is shared
    /// can only be restored at the index that produced them.
    pub fn push(&mut self, strategy: Box<dyn MarshallingStrategy>) -> usize {
        if self.by_name(strategy.name()).is_some() {
            warn!(strategy = strategy.name(), "strategy name already in store");
        }
        self.strategies.push(strategy);
        self.strategies.len() - 1
    }

    /// Index of the first strategy accepting `object`.
    ///
    /// # Errors
    ///
    /// Returns a marshalling failure if no strategy accepts it.
    pub fn index_of(&self, object: &dyn Marshallable) -> Result<usize> {
        self.strategies
            .iter()
            .position(|s| s.accept(object))
            .ok_or_else(|| {
                Error::marshalling(Cause::NoAcceptingStrategy(object.type_name().to_string()))
            })
    }

    /// Strategy at `index`.
    pub fn get(&self, index: usize) -> Option<&dyn MarshallingStrategy> {
        self.strategies.get(index).map(|s| s.as_ref())
    }

    /// Mutable strategy at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn MarshallingStrategy + 'static)> {
        self.strategies.get_mut(index).map(|s| s.as_mut())
    }

    /// Index of the first strategy named `name`.
    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.strategies.iter().position(|s| s.name() == name)
    }

    /// Strategy names in chain order.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Number of strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// True if the store holds no strategies.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn route(&self, object: &dyn Marshallable) -> Result<u16> {
        let index = self.index_of(object)?;
        let tag = u16::try_from(index).map_err(|_| {
            Error::marshalling(Cause::UnknownStrategy {
                index,
                len: self.strategies.len(),
            })
        })?;
        debug!(
            strategy = self.strategies[index].name(),
            index,
            type_name = object.type_name(),
            "routed object to strategy"
        );
        Ok(tag)
    }

    fn strategy_at(&self, index: usize) -> Result<&dyn MarshallingStrategy> {
        self.get(index).ok_or_else(|| {
            Error::unmarshalling(Cause::UnknownStrategy {
                index,
                len: self.strategies.len(),
            })
        })
    }

    fn entry_strategy(&self, entry: &MarshalledEntry) -> Result<&dyn MarshallingStrategy> {
        let recorded = self
            .get(usize::from(entry.strategy_index))
            .filter(|s| s.name() == entry.strategy_name);
        if let Some(strategy) = recorded {
            return Ok(strategy);
        }

        let mut named = self
            .strategies
            .iter()
            .filter(|s| s.name() == entry.strategy_name);
        match (named.next(), named.next()) {
            (Some(strategy), None) => Ok(strategy.as_ref()),
            _ => Err(Error::unmarshalling(Cause::UnknownStrategyName(
                entry.strategy_name.clone(),
            ))),
        }
    }

    /// Write `object` tagged with the index of the strategy that takes it.
    ///
    /// Returns the index used.
    pub fn write_object(&mut self, sink: &mut dyn Write, object: &ObjectRef) -> Result<usize> {
        let tag = self.route(object.as_ref())?;
        sink.write_u16::<BigEndian>(tag)
            .map_err(Error::marshalling)?;
        let index = usize::from(tag);
        self.strategies[index].write(sink, object)?;
        Ok(index)
    }

    /// Read one object written by [`write_object`](Self::write_object).
    pub fn read_object(&self, source: &mut dyn Read) -> Result<ObjectRef> {
        let tag = source
            .read_u16::<BigEndian>()
            .map_err(Error::unmarshalling)?;
        self.strategy_at(usize::from(tag))?.read(source)
    }

    /// Marshal `object` through the chunk protocol of its strategy.
    pub fn marshal_entry(&mut self, object: &ObjectRef) -> Result<MarshalledEntry> {
        let tag = self.route(object.as_ref())?;
        let strategy = &mut self.strategies[usize::from(tag)];
        let mut context = strategy.create_context();
        let bytes = strategy.marshal(&mut context, &mut io::sink(), object)?;
        Ok(MarshalledEntry {
            strategy_index: tag,
            strategy_name: strategy.name().to_string(),
            data_type: object.type_name().to_string(),
            bytes,
        })
    }

    /// Restore an object from an entry produced by
    /// [`marshal_entry`](Self::marshal_entry).
    ///
    /// The strategy at the recorded index is used when its name matches.
    /// Otherwise the entry falls back to the one strategy carrying that
    /// name, so entries survive a reordered chain.
    ///
    /// # Errors
    ///
    /// Returns an unmarshalling failure if no strategy, or more than one,
    /// could have produced the entry.
    pub fn unmarshal_entry(&self, entry: &MarshalledEntry, resolver: &TypeResolver) -> Result<ObjectRef> {
        let strategy = self.entry_strategy(entry)?;
        let mut context = strategy.create_context();
        strategy.unmarshal(
            &entry.data_type,
            &mut context,
            &mut io::empty(),
            &entry.bytes,
            resolver,
        )
    }
}

impl fmt::Debug for StrategyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyStore")
            .field("strategies", &self.names())
            .finish()
    }
}
