//! Item-level comparison of two feeds.
//!
//! Two items are the same entry when [`Item::matches`] says so: a non-empty
//! guid match, or else an exact `pub_date` and `title` match.

use std::cmp::Ordering;

use serde::Serialize;

use super::model::{Feed, Item};

/// Returns the items of the smaller feed that have no counterpart in the larger one.
///
/// The feed with more items is the reference and the other is the probe. Each
/// probe item is looked up in the reference with [`Item::matches`], and the
/// unmatched ones are returned in probe order. Items that exist only in the
/// reference feed are never reported.
///
/// When both feeds hold the same number of items the result is empty without
/// looking at their contents. Callers rely on an equal count meaning "nothing
/// new", so this stays as is; use [`diff_feeds`] for a comparison that always
/// inspects the items.
pub fn compare_items<'a>(a: &'a Feed, b: &'a Feed) -> Vec<&'a Item> {
    let (reference, probe) = match a.items.len().cmp(&b.items.len()) {
        Ordering::Equal => return Vec::new(),
        Ordering::Greater => (a, b),
        Ordering::Less => (b, a),
    };

    unmatched_items(&probe.items, &reference.items)
}

/// Items of `probe` that match no item of `reference`, in `probe` order.
pub fn unmatched_items<'a>(probe: &'a [Item], reference: &[Item]) -> Vec<&'a Item> {
    probe
        .iter()
        .filter(|item| !reference.iter().any(|candidate| item.matches(candidate)))
        .collect()
}

/// Entries gained and lost between two revisions of a feed.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeedDiff<'a> {
    /// Items of the newer revision with no match in the older one
    pub added: Vec<&'a Item>,
    /// Items of the older revision with no match in the newer one
    pub removed: Vec<&'a Item>,
}

impl FeedDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compares two revisions of a feed item by item, regardless of their sizes.
pub fn diff_feeds<'a>(old: &'a Feed, new: &'a Feed) -> FeedDiff<'a> {
    FeedDiff {
        added: unmatched_items(&new.items, &old.items),
        removed: unmatched_items(&old.items, &new.items),
    }
}
