pub mod dose_record;
pub mod enums;
pub mod family_member;
pub mod health_metrics;
pub mod health_report;
pub mod medication;
pub mod user;

pub use dose_record::*;
pub use family_member::*;
pub use health_metrics::*;
pub use health_report::*;
pub use medication::*;
pub use user::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Bookkeeping fields shared by every stored entity.
///
/// Flattened into each entity so the wire shape is
/// `{ id, userId, ...fields, createdAt, updatedAt }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meta {
    /// Fresh metadata owned by `user_id`.
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fresh metadata for a record that owns itself (users).
    pub fn self_owned() -> Self {
        let mut meta = Self::new("");
        meta.user_id = meta.id.clone();
        meta
    }

    /// Refresh `updated_at`, never moving it behind `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// Deserialize a patch field so that `null` is distinguishable from absent.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: absent -> `None`, `null` -> `Some(None)`.
pub(crate) fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Overwrite `slot` when the patch supplied a value.
pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
