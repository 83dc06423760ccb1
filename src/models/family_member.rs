use serde::{Deserialize, Serialize};

use super::{merge, nullable, Meta};
use crate::db::{Entity, EntityStore, Storage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    #[serde(flatten)]
    pub meta: Meta,
    pub name: String,
    pub relationship: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFamilyMember {
    pub name: String,
    pub relationship: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberPatch {
    pub name: Option<String>,
    pub relationship: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: Option<Option<String>>,
    pub conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
}

impl Entity for FamilyMember {
    const LABEL: &'static str = "Family member";
    const TABLE: &'static str = "family_members";

    type Draft = NewFamilyMember;
    type Patch = FamilyMemberPatch;

    fn from_draft(meta: Meta, draft: NewFamilyMember) -> Self {
        Self {
            meta,
            name: draft.name,
            relationship: draft.relationship,
            age: draft.age,
            gender: draft.gender,
            conditions: draft.conditions,
            medications: draft.medications,
        }
    }

    fn apply_patch(&mut self, patch: FamilyMemberPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.relationship, patch.relationship);
        merge(&mut self.age, patch.age);
        merge(&mut self.gender, patch.gender);
        merge(&mut self.conditions, patch.conditions);
        merge(&mut self.medications, patch.medications);
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn table(storage: &Storage) -> &dyn EntityStore<Self> {
        storage.family_members.as_ref()
    }
}
