use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{DatabaseError, Entity, EntityStore};

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;"
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
        (2, include_str!("../../resources/migrations/002_owner_indexes.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// One entity table on a shared connection.
///
/// Rows hold the entity as a JSON `body`; `id` and `user_id` are copied
/// into columns for lookup. `seq` preserves insertion order. The connection
/// mutex serializes every statement across all tables.
pub struct SqliteTable<E> {
    conn: Arc<Mutex<Connection>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SqliteTable<E> {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

fn load_body<E: Entity>(conn: &Connection, id: &str) -> Result<Option<E>, DatabaseError> {
    let body: Option<String> = conn
        .query_row(
            &format!("SELECT body FROM {} WHERE id = ?1", E::TABLE),
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    body.map(|b| serde_json::from_str(&b).map_err(DatabaseError::from))
        .transpose()
}

impl<E: Entity> EntityStore<E> for SqliteTable<E> {
    fn list(&self, user_id: &str) -> Result<Vec<E>, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT body FROM {} WHERE user_id = ?1 ORDER BY seq",
            E::TABLE
        ))?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;

        let mut entities = Vec::new();
        for body in rows {
            entities.push(serde_json::from_str(&body?)?);
        }
        Ok(entities)
    }

    fn get(&self, id: &str) -> Result<Option<E>, DatabaseError> {
        let conn = self.lock()?;
        load_body(&conn, id)
    }

    fn insert(&self, entity: &E) -> Result<(), DatabaseError> {
        let body = serde_json::to_string(entity)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, user_id, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id, body = excluded.body",
                E::TABLE
            ),
            params![entity.id(), entity.user_id(), body],
        )?;
        Ok(())
    }

    fn modify(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut E) -> Result<(), DatabaseError>,
    ) -> Result<E, DatabaseError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut entity: E =
            load_body(&tx, id)?.ok_or_else(|| DatabaseError::not_found::<E>(id))?;
        apply(&mut entity)?;

        tx.execute(
            &format!("UPDATE {} SET user_id = ?2, body = ?3 WHERE id = ?1", E::TABLE),
            params![id, entity.user_id(), serde_json::to_string(&entity)?],
        )?;
        tx.commit()?;
        Ok(entity)
    }

    fn remove(&self, id: &str, keep_going: &dyn Fn(&E) -> bool) -> Result<bool, DatabaseError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(entity) = load_body::<E>(&tx, id)? else {
            return Ok(false);
        };
        if !keep_going(&entity) {
            return Ok(false);
        }
        let removed = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", E::TABLE),
            params![id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medication, Meta, NewMedication};

    fn shared_memory() -> Arc<Mutex<Connection>> {
        Arc::new(Mutex::new(open_memory_database().unwrap()))
    }

    fn aspirin(user_id: &str) -> Medication {
        Medication::from_draft(
            Meta::new(user_id),
            serde_json::from_value::<NewMedication>(serde_json::json!({
                "medicineName": "Aspirin",
                "startDate": "2026-10-01",
                "dosage": "100mg",
                "times": ["08:00", "20:00"]
            }))
            .unwrap(),
        )
    }

    fn user_tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        assert_eq!(
            user_tables(&conn),
            [
                "dose_records",
                "family_members",
                "health_metrics",
                "health_reports",
                "medications",
                "schema_version",
                "users",
            ]
        );
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn insert_and_get_round_trip() {
        let table: SqliteTable<Medication> = SqliteTable::new(shared_memory());
        let med = aspirin("u1");
        table.insert(&med).unwrap();

        let loaded = table.get(med.id()).unwrap().unwrap();
        assert_eq!(loaded, med);
        assert!(table.get("missing").unwrap().is_none());
    }

    #[test]
    fn list_filters_by_owner_in_insertion_order() {
        let table: SqliteTable<Medication> = SqliteTable::new(shared_memory());
        let first = aspirin("u1");
        let second = aspirin("u1");
        table.insert(&first).unwrap();
        table.insert(&aspirin("u2")).unwrap();
        table.insert(&second).unwrap();

        let ids: Vec<_> = table
            .list("u1")
            .unwrap()
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        assert_eq!(ids, vec![first.id().to_string(), second.id().to_string()]);
    }

    #[test]
    fn modify_persists_and_rolls_back_on_error() {
        let table: SqliteTable<Medication> = SqliteTable::new(shared_memory());
        let med = aspirin("u1");
        table.insert(&med).unwrap();

        let updated = table
            .modify(med.id(), &mut |m: &mut Medication| {
                m.is_running = false;
                Ok(())
            })
            .unwrap();
        assert!(!updated.is_running);
        assert!(!table.get(med.id()).unwrap().unwrap().is_running);

        let failed = table.modify(med.id(), &mut |m: &mut Medication| {
            m.dosage = "999mg".into();
            Err(DatabaseError::not_found::<Medication>(m.id()))
        });
        assert!(failed.is_err());
        assert_eq!(table.get(med.id()).unwrap().unwrap().dosage, "100mg");
    }

    #[test]
    fn remove_reports_whether_row_existed() {
        let table: SqliteTable<Medication> = SqliteTable::new(shared_memory());
        let med = aspirin("u1");
        table.insert(&med).unwrap();

        assert!(!table.remove(med.id(), &|m| m.user_id() == "u2").unwrap());
        assert!(table.remove(med.id(), &|_| true).unwrap());
        assert!(!table.remove(med.id(), &|_| true).unwrap());
    }

    #[test]
    fn file_database_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("portal.db");
        let med = aspirin("u1");
        {
            let table: SqliteTable<Medication> =
                SqliteTable::new(Arc::new(Mutex::new(open_database(&path).unwrap())));
            table.insert(&med).unwrap();
        }
        let table: SqliteTable<Medication> =
            SqliteTable::new(Arc::new(Mutex::new(open_database(&path).unwrap())));
        assert_eq!(table.list("u1").unwrap().len(), 1);
    }
}
