//! Aggregate counts and presentation ordering.

use crate::model::item::Item;
use serde::Serialize;

/// Plain counts over one collection.
///
/// `active + completed == total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl ItemStats {
    /// Completed share rounded to the nearest whole percent.
    ///
    /// Returns `0` for an empty collection.
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let scaled = (self.completed as u64) * 200 + self.total as u64;
        (scaled / (2 * self.total as u64)) as u32
    }
}

pub fn stats(items: &[Item]) -> ItemStats {
    let completed = items.iter().filter(|item| item.completed).count();
    ItemStats {
        total: items.len(),
        active: items.len() - completed,
        completed,
    }
}

/// Active items first, newest first within each group.
///
/// Uses a stable sort, so equal keys keep insertion order.
pub fn presentation_order(items: &[Item]) -> Vec<Item> {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    ordered
}
