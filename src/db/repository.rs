//! Typed store operations shared by every entity table.
//!
//! Generic over `Entity`, so one implementation serves all six tables on
//! either backend. The `_owned` variants scope id-based access to a caller:
//! a row owned by someone else behaves exactly like a missing row.

use chrono::{NaiveDate, Utc};

use super::{DatabaseError, Entity, Storage};
use crate::models::enums::DoseStatus;
use crate::models::{DoseRecord, DoseRecordPatch, HealthMetrics, Meta, NewUser, User};

/// Create an entity owned by `user_id`: fresh id, `created_at == updated_at == now`.
pub fn create<E: Entity>(
    storage: &Storage,
    user_id: &str,
    draft: E::Draft,
) -> Result<E, DatabaseError> {
    insert_new(storage, E::from_draft(Meta::new(user_id), draft))
}

/// Create a user record, which owns itself.
pub fn create_user(storage: &Storage, draft: NewUser) -> Result<User, DatabaseError> {
    insert_new(storage, User::from_draft(Meta::self_owned(), draft))
}

fn insert_new<E: Entity>(storage: &Storage, entity: E) -> Result<E, DatabaseError> {
    E::table(storage).insert(&entity)?;
    tracing::debug!(table = E::TABLE, id = entity.id(), "Entity created");
    Ok(entity)
}

pub fn get<E: Entity>(storage: &Storage, id: &str) -> Result<Option<E>, DatabaseError> {
    E::table(storage).get(id)
}

/// `get` restricted to rows owned by `user_id`.
pub fn get_owned<E: Entity>(
    storage: &Storage,
    id: &str,
    user_id: &str,
) -> Result<Option<E>, DatabaseError> {
    Ok(get::<E>(storage, id)?.filter(|e| e.user_id() == user_id))
}

pub fn list<E: Entity>(storage: &Storage, user_id: &str) -> Result<Vec<E>, DatabaseError> {
    E::table(storage).list(user_id)
}

/// Shallow-merge `patch` and refresh `updated_at`. `NotFound` when absent.
pub fn update<E: Entity>(
    storage: &Storage,
    id: &str,
    patch: E::Patch,
) -> Result<E, DatabaseError> {
    patch_where(storage, id, patch, |_| true)
}

/// `update` restricted to rows owned by `user_id`.
pub fn update_owned<E: Entity>(
    storage: &Storage,
    id: &str,
    user_id: &str,
    patch: E::Patch,
) -> Result<E, DatabaseError> {
    patch_where(storage, id, patch, |e: &E| e.user_id() == user_id)
}

fn patch_where<E: Entity>(
    storage: &Storage,
    id: &str,
    patch: E::Patch,
    allowed: impl Fn(&E) -> bool,
) -> Result<E, DatabaseError> {
    let mut patch = Some(patch);
    E::table(storage).modify(id, &mut |entity: &mut E| {
        if !allowed(entity) {
            return Err(DatabaseError::not_found::<E>(id));
        }
        if let Some(patch) = patch.take() {
            entity.apply_patch(patch);
        }
        entity.meta_mut().touch();
        Ok(())
    })
}

/// Remove by id. Returns whether a row was removed; never cascades.
pub fn delete<E: Entity>(storage: &Storage, id: &str) -> Result<bool, DatabaseError> {
    E::table(storage).remove(id, &|_| true)
}

/// `delete` restricted to rows owned by `user_id`.
pub fn delete_owned<E: Entity>(
    storage: &Storage,
    id: &str,
    user_id: &str,
) -> Result<bool, DatabaseError> {
    E::table(storage).remove(id, &|e: &E| e.user_id() == user_id)
}

/// Dose records owned by `user_id` scheduled on `date`.
pub fn list_doses_by_date(
    storage: &Storage,
    user_id: &str,
    date: NaiveDate,
) -> Result<Vec<DoseRecord>, DatabaseError> {
    Ok(list::<DoseRecord>(storage, user_id)?
        .into_iter()
        .filter(|d| d.is_scheduled_on(date))
        .collect())
}

/// Newest metrics snapshot by `recorded_at`; ties go to the later insert.
pub fn latest_metrics(
    storage: &Storage,
    user_id: &str,
) -> Result<Option<HealthMetrics>, DatabaseError> {
    Ok(list::<HealthMetrics>(storage, user_id)?
        .into_iter()
        .max_by_key(|m| m.recorded_at))
}

/// Mark a dose taken (stamps `actual_time`) or skipped (clears it).
pub fn record_dose_outcome(
    storage: &Storage,
    id: &str,
    user_id: &str,
    status: DoseStatus,
) -> Result<DoseRecord, DatabaseError> {
    let actual_time = match status {
        DoseStatus::Taken => Some(Utc::now()),
        _ => None,
    };
    update_owned::<DoseRecord>(
        storage,
        id,
        user_id,
        DoseRecordPatch::outcome(status, actual_time),
    )
}
