use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{DatabaseError, Entity, EntityStore};

/// Map-backed table. Rows are keyed by an insertion sequence so listing
/// keeps insertion order; `index` maps ids to sequence numbers.
pub struct MemoryTable<E> {
    rows: RwLock<Rows<E>>,
}

struct Rows<E> {
    next_seq: u64,
    by_seq: BTreeMap<u64, E>,
    index: HashMap<String, u64>,
}

impl<E: Entity> MemoryTable<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Rows {
                next_seq: 0,
                by_seq: BTreeMap::new(),
                index: HashMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Rows<E>>, DatabaseError> {
        self.rows.read().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows<E>>, DatabaseError> {
        self.rows.write().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl<E: Entity> Default for MemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityStore<E> for MemoryTable<E> {
    fn list(&self, user_id: &str) -> Result<Vec<E>, DatabaseError> {
        let rows = self.read()?;
        Ok(rows
            .by_seq
            .values()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect())
    }

    fn get(&self, id: &str) -> Result<Option<E>, DatabaseError> {
        let rows = self.read()?;
        Ok(rows
            .index
            .get(id)
            .and_then(|seq| rows.by_seq.get(seq))
            .cloned())
    }

    fn insert(&self, entity: &E) -> Result<(), DatabaseError> {
        let mut rows = self.write()?;
        // Ids are fresh v4 UUIDs; a clash replaces the old row in place.
        if let Some(seq) = rows.index.get(entity.id()).copied() {
            rows.by_seq.insert(seq, entity.clone());
            return Ok(());
        }
        let seq = rows.next_seq;
        rows.next_seq += 1;
        rows.index.insert(entity.id().to_string(), seq);
        rows.by_seq.insert(seq, entity.clone());
        Ok(())
    }

    fn modify(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut E) -> Result<(), DatabaseError>,
    ) -> Result<E, DatabaseError> {
        let mut rows = self.write()?;
        let seq = *rows
            .index
            .get(id)
            .ok_or_else(|| DatabaseError::not_found::<E>(id))?;
        let stored = rows
            .by_seq
            .get_mut(&seq)
            .ok_or_else(|| DatabaseError::not_found::<E>(id))?;

        // Work on a copy so a failed callback leaves the row untouched.
        let mut updated = stored.clone();
        apply(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }

    fn remove(&self, id: &str, keep_going: &dyn Fn(&E) -> bool) -> Result<bool, DatabaseError> {
        let mut rows = self.write()?;
        let Some(seq) = rows.index.get(id).copied() else {
            return Ok(false);
        };
        match rows.by_seq.get(&seq) {
            Some(entity) if keep_going(entity) => {}
            _ => return Ok(false),
        }
        rows.by_seq.remove(&seq);
        rows.index.remove(id);
        Ok(true)
    }
}
