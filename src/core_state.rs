//! Shared application state.
//!
//! `CoreState` is built once at startup, wrapped in `Arc`, and handed to the
//! router. It owns the entity tables; everything else is derived per request.

use chrono::{DateTime, Utc};

use crate::db::Storage;

pub struct CoreState {
    storage: Storage,
    started_at: DateTime<Utc>,
}

impl CoreState {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            started_at: Utc::now(),
        }
    }

    /// State over fresh volatile tables.
    pub fn in_memory() -> Self {
        Self::new(Storage::in_memory())
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the state was built.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_uses_memory_backend() {
        let core = CoreState::default();
        assert_eq!(core.storage().backend(), "memory");
        assert!(core.uptime_secs() >= 0);
        assert!(core.started_at() <= Utc::now());
    }
}
