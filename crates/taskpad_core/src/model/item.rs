//! Item domain model.
//!
//! # Responsibility
//! - Define the single task record and its persisted wire shape.
//! - Define the partial-update shape used by edit flows.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `title` is validated before any write reaches stored state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque identifier for one task item.
///
/// Persisted data may carry ids produced by other writers, so this is a
/// string newtype rather than a parsed UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One task record.
///
/// Serialized with camelCase keys: `{ id, title, completed, createdAt }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Assigned at creation, unique across the live collection.
    pub id: ItemId,
    /// Trimmed and non-blank. Create/edit also cap it at 500 characters.
    pub title: String,
    pub completed: bool,
    /// Serialized as an RFC 3339 string.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Builds an item from already-normalized parts.
    ///
    /// Does not validate `title`; creation paths go through
    /// `store::item_store::create`.
    pub fn from_parts(
        id: ItemId,
        title: impl Into<String>,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            completed,
            created_at,
        }
    }

    /// Returns whether this item still needs doing.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Partial field set merged into an existing item by `update`.
///
/// `None` keeps the existing value. Identity and creation time are not
/// patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl ItemPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}
