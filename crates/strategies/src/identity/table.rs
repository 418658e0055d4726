//! Bidirectional surrogate key ↔ object table
//!
//! The forward map (key → object) is ordered by key; the reverse map is
//! keyed by reference identity, so two equal but separately allocated
//! objects get two keys. The table holds a handle to every tracked object,
//! which keeps each identity valid for as long as it is in the reverse map.
//!
//! ## Invariant
//!
//! `reverse[o] == k` ⇔ `forward[k] == o`, except after a rehydration that
//! listed one object under several keys; the reverse map then keeps the
//! lowest of them.

use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tessera_core::{Cause, Error, ObjectIdentity, ObjectRef, Result, SurrogateKey};
use tracing::{debug, info, trace, warn};

/// Key → object associations, as exchanged by snapshot and rehydrate.
pub type Associations = BTreeMap<SurrogateKey, ObjectRef>;

/// Bidirectional surrogate key table.
#[derive(Default, Clone)]
pub struct IdentityTable {
    forward: Associations,
    reverse: FxHashMap<ObjectIdentity, SurrogateKey>,
}

impl IdentityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table that behaves as if it had already seen `associations`.
    pub fn from_associations(associations: Associations) -> Self {
        let mut table = Self::new();
        table.rehydrate(associations);
        table
    }

    /// Key for `object`, assigning the next free one on first sight.
    ///
    /// The same object always gets the same key; a key is never
    /// re-allocated.
    ///
    /// # Errors
    ///
    /// Returns a marshalling failure once the `i32` key space is exhausted.
    pub fn assign_or_get(&mut self, object: &ObjectRef) -> Result<SurrogateKey> {
        let identity = ObjectIdentity::of(object);
        if let Some(&key) = self.reverse.get(&identity) {
            trace!(key = key.value(), type_name = object.type_name(), "reused surrogate key");
            return Ok(key);
        }

        let key = self.next_key()?;
        self.forward.insert(key, Arc::clone(object));
        self.reverse.insert(identity, key);
        debug!(key = key.value(), type_name = object.type_name(), "assigned surrogate key");
        Ok(key)
    }

    /// Next key to hand out: the table size, unless a rehydrated entry
    /// already occupies it, in which case one past the highest key.
    ///
    /// Gaps below the highest key are never reused, so a rehydrated table
    /// holding `i32::MAX` whose size is also taken reports exhaustion even
    /// though lower keys are free.
    fn next_key(&self) -> Result<SurrogateKey> {
        let exhausted = || Error::marshalling(Cause::KeySpaceExhausted(self.forward.len()));

        let candidate = SurrogateKey::from_index(self.forward.len()).ok_or_else(exhausted)?;
        if !self.forward.contains_key(&candidate) {
            return Ok(candidate);
        }
        self.forward
            .keys()
            .next_back()
            .and_then(|highest| highest.next())
            .ok_or_else(exhausted)
    }

    /// Key already assigned to `object`, if any.
    pub fn key_of(&self, object: &ObjectRef) -> Option<SurrogateKey> {
        self.reverse.get(&ObjectIdentity::of(object)).copied()
    }

    /// Object assigned to `key`, if any.
    pub fn get(&self, key: SurrogateKey) -> Option<&ObjectRef> {
        self.forward.get(&key)
    }

    /// Object assigned to `key`.
    ///
    /// # Errors
    ///
    /// Returns an unmarshalling failure if `key` was never assigned in this
    /// table, which means save and restore order are out of sync.
    pub fn lookup(&self, key: SurrogateKey) -> Result<ObjectRef> {
        self.get(key)
            .cloned()
            .ok_or_else(|| Error::unmarshalling(Cause::UnknownKey(key)))
    }

    /// Replace the table contents with `associations`.
    ///
    /// The reverse index is rebuilt from scratch; nothing from before the
    /// call survives.
    pub fn rehydrate(&mut self, associations: Associations) {
        let mut reverse = FxHashMap::default();
        reverse.reserve(associations.len());

        let mut duplicates = 0usize;
        for (&key, object) in &associations {
            // Ascending key order: the first key seen for an object wins.
            match reverse.entry(ObjectIdentity::of(object)) {
                Entry::Vacant(slot) => {
                    slot.insert(key);
                }
                Entry::Occupied(_) => duplicates += 1,
            }
        }
        if duplicates > 0 {
            warn!(
                duplicates,
                "rehydrated associations list objects under several keys; keeping the lowest"
            );
        }

        info!(entries = associations.len(), "rehydrated identity table");
        self.forward = associations;
        self.reverse = reverse;
    }

    /// Copy of the key → object associations.
    ///
    /// The copy shares the objects but not the table: mutating it cannot
    /// desynchronize the reverse index.
    pub fn snapshot(&self) -> Associations {
        self.forward.clone()
    }

    /// Iterate associations in key order.
    pub fn iter(&self) -> impl Iterator<Item = (SurrogateKey, &ObjectRef)> {
        self.forward.iter().map(|(&k, o)| (k, o))
    }

    /// Number of assigned keys.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// True if no keys are assigned.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Forget every association.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

impl fmt::Debug for IdentityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTable")
            .field("len", &self.forward.len())
            .field("tracked", &self.reverse.len())
            .finish()
    }
}
