use serde::{Deserialize, Serialize};

use super::enums::UserRole;
use super::{merge, nullable, Meta};
use crate::db::{Entity, EntityStore, Storage};

/// Portal account. Owns itself: `userId` equals `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub meta: Meta,
    pub username: String,
    pub role: UserRole,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
}

impl Entity for User {
    const LABEL: &'static str = "User";
    const TABLE: &'static str = "users";

    type Draft = NewUser;
    type Patch = UserPatch;

    fn from_draft(meta: Meta, draft: NewUser) -> Self {
        Self {
            meta,
            username: draft.username,
            role: draft.role,
            full_name: draft.full_name,
            email: draft.email,
        }
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        merge(&mut self.username, patch.username);
        merge(&mut self.role, patch.role);
        merge(&mut self.full_name, patch.full_name);
        merge(&mut self.email, patch.email);
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn table(storage: &Storage) -> &dyn EntityStore<Self> {
        storage.users.as_ref()
    }
}
