//! Identity placeholder strategy
//!
//! Writes a 4-byte surrogate key in place of each accepted object. The first
//! time an object is seen it gets the next key; every later appearance of
//! the same reference writes that key again. Reading maps a key back to the
//! very object it was assigned to, so shared references are re-linked, not
//! duplicated.
//!
//! The object itself is never encoded: restoring requires a table that
//! already knows the objects, either because the same strategy instance did
//! the save or because its associations were transferred with
//! [`set_associations`](IdentityPlaceholderStrategy::set_associations).
//! Keys are handed out in presentation order, so the caller must replay
//! reads in the order the writes happened.

use super::table::{Associations, IdentityTable};
use crate::acceptor::StrategyAcceptor;
use crate::context::MarshallingContext;
use crate::strategy::MarshallingStrategy;
use std::io::{Read, Write};
use std::sync::Arc;
use tessera_core::{Marshallable, ObjectRef, Result, SurrogateKey, TypeResolver};

/// Default name of identity placeholder strategies.
pub const IDENTITY_STRATEGY_NAME: &str = "identity-placeholder";

/// Strategy encoding accepted objects as surrogate keys.
#[derive(Debug)]
pub struct IdentityPlaceholderStrategy {
    name: String,
    acceptor: Arc<dyn StrategyAcceptor>,
    table: IdentityTable,
}

impl IdentityPlaceholderStrategy {
    /// Create a strategy with an empty table.
    pub fn new(acceptor: Arc<dyn StrategyAcceptor>) -> Self {
        Self::with_name(IDENTITY_STRATEGY_NAME, acceptor)
    }

    /// Create a named strategy with an empty table.
    pub fn with_name(name: impl Into<String>, acceptor: Arc<dyn StrategyAcceptor>) -> Self {
        IdentityPlaceholderStrategy {
            name: name.into(),
            acceptor,
            table: IdentityTable::new(),
        }
    }

    /// Create a strategy pre-seeded with previously captured associations.
    pub fn with_associations(acceptor: Arc<dyn StrategyAcceptor>, associations: Associations) -> Self {
        let mut strategy = Self::new(acceptor);
        strategy.set_associations(associations);
        strategy
    }

    /// Copy of the full key → object association.
    pub fn associations(&self) -> Associations {
        self.table.snapshot()
    }

    /// Replace the association wholesale, as if the strategy had already
    /// seen exactly these objects under these keys.
    pub fn set_associations(&mut self, associations: Associations) {
        self.table.rehydrate(associations);
    }

    /// The underlying table.
    pub fn table(&self) -> &IdentityTable {
        &self.table
    }

    /// Forget every association, e.g. before retrying a failed save.
    pub fn reset(&mut self) {
        self.table.clear();
    }
}

impl MarshallingStrategy for IdentityPlaceholderStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, object: &dyn Marshallable) -> bool {
        self.acceptor.accept(object)
    }

    fn write(&mut self, sink: &mut dyn Write, object: &ObjectRef) -> Result<()> {
        self.table.assign_or_get(object)?.write_to(sink)
    }

    fn read(&self, source: &mut dyn Read) -> Result<ObjectRef> {
        let key = SurrogateKey::read_from(source)?;
        self.table.lookup(key)
    }

    fn marshal(
        &mut self,
        _context: &mut MarshallingContext,
        _sink: &mut dyn Write,
        object: &ObjectRef,
    ) -> Result<Vec<u8>> {
        let key = self.table.assign_or_get(object)?;
        Ok(key.to_bytes().to_vec())
    }

    fn unmarshal(
        &self,
        _data_type: &str,
        _context: &mut MarshallingContext,
        _source: &mut dyn Read,
        bytes: &[u8],
        _resolver: &TypeResolver,
    ) -> Result<ObjectRef> {
        let key = SurrogateKey::from_bytes(bytes)?;
        self.table.lookup(key)
    }
}
