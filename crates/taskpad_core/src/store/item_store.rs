//! Item store operations over `&[Item]`.
//!
//! Every function except `create` is deterministic and side-effect free.
//! `create` draws from injected `Clock` and `IdSource` capabilities.

use crate::capability::{Clock, IdSource};
use crate::model::item::{Item, ItemId, ItemPatch};
use crate::model::title::{normalize_title, TitleValidationError};

/// Builds a new active item from user input.
///
/// # Errors
/// - `EmptyTitle` / `TitleTooLong` when the trimmed title breaks the contract.
pub fn create(
    title: &str,
    clock: &impl Clock,
    ids: &impl IdSource,
) -> Result<Item, TitleValidationError> {
    let title = normalize_title(title)?;
    Ok(Item::from_parts(ids.next_id(), title, false, clock.now()))
}

/// Returns `items` with `item` appended.
pub fn append(items: &[Item], item: Item) -> Vec<Item> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

/// Merges `patch` into the item matching `id`.
///
/// A patched title is trimmed before merge. Title validation is the caller's
/// responsibility (see `TaskSession::edit`).
pub fn update(items: &[Item], id: &ItemId, patch: &ItemPatch) -> Vec<Item> {
    map_matching(items, id, |item| {
        if let Some(title) = patch.title.as_deref() {
            item.title = title.trim().to_string();
        }
        if let Some(completed) = patch.completed {
            item.completed = completed;
        }
    })
}

/// Removes every item matching `id`.
pub fn delete(items: &[Item], id: &ItemId) -> Vec<Item> {
    items
        .iter()
        .filter(|item| &item.id != id)
        .cloned()
        .collect()
}

/// Flips `completed` on the item matching `id`.
pub fn toggle(items: &[Item], id: &ItemId) -> Vec<Item> {
    map_matching(items, id, |item| item.completed = !item.completed)
}

pub fn clear_all() -> Vec<Item> {
    Vec::new()
}

/// Keeps only active items.
pub fn clear_completed(items: &[Item]) -> Vec<Item> {
    items.iter().filter(|item| item.is_active()).cloned().collect()
}

pub fn find<'a>(items: &'a [Item], id: &ItemId) -> Option<&'a Item> {
    items.iter().find(|item| &item.id == id)
}

pub fn contains(items: &[Item], id: &ItemId) -> bool {
    find(items, id).is_some()
}

// Persisted input may carry duplicate ids; every match is rewritten.
fn map_matching(items: &[Item], id: &ItemId, mut apply: impl FnMut(&mut Item)) -> Vec<Item> {
    items
        .iter()
        .map(|item| {
            let mut next = item.clone();
            if &next.id == id {
                apply(&mut next);
            }
            next
        })
        .collect()
}
