//! Moving one item inside an ordered group.
//!
//! A reorder only ever reads the moving item, its declared neighbours and the
//! rows lying strictly between those neighbours, and only ever writes the
//! moving item.

use crate::error::{PiecesError, Result};
use crate::position::{self, PositionKey};
use crate::store::GroupMemberSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// OrderedItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub record_id: String,
    pub group_id: String,
    pub member_id: String,
    pub position: PositionKey,
}

impl OrderedItem {
    pub fn new(
        record_id: impl Into<String>,
        group_id: impl Into<String>,
        member_id: impl Into<String>,
        position: PositionKey,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            group_id: group_id.into(),
            member_id: member_id.into(),
            position,
        }
    }

    pub fn with_position(&self, position: PositionKey) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

/// Sort items into their visible order. Ties keep a stable order by record id.
pub fn sort_by_position(items: &mut [OrderedItem]) {
    items.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });
}

/// Rewrite a whole group to keys 1.0, 2.0, ... in its current order.
///
/// Returns only the rows whose key actually changes. This is the recovery
/// path once [`PiecesError::PositionExhausted`] has been hit.
pub fn renumber(items: &[OrderedItem]) -> Result<Vec<OrderedItem>> {
    let mut sorted = items.to_vec();
    sort_by_position(&mut sorted);

    let mut changed = Vec::new();
    for (i, item) in sorted.iter().enumerate() {
        let key = PositionKey::new((i + 1) as f64)?;
        if item.position != key {
            changed.push(item.with_position(key));
        }
    }
    tracing::info!(
        items = sorted.len(),
        changed = changed.len(),
        "renumbered group positions"
    );
    Ok(changed)
}

// ---------------------------------------------------------------------------
// OrderedItemCollection
// ---------------------------------------------------------------------------

/// The rows of one group needed to validate a single move.
///
/// Built per request from whatever the member source returned and dropped
/// afterwards; it is never the whole group unless the group is tiny.
#[derive(Debug, Clone)]
pub struct OrderedItemCollection {
    group_id: String,
    items: BTreeMap<String, OrderedItem>,
}

impl OrderedItemCollection {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            items: BTreeMap::new(),
        }
    }

    /// Add rows. Rows from other groups are ignored.
    pub fn extend(&mut self, items: impl IntoIterator<Item = OrderedItem>) {
        for item in items {
            if item.group_id == self.group_id {
                self.items.insert(item.record_id.clone(), item);
            }
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, record_id: &str) -> Result<&OrderedItem> {
        self.items
            .get(record_id)
            .ok_or_else(|| PiecesError::ItemNotFound {
                group: self.group_id.clone(),
                id: record_id.to_string(),
            })
    }

    /// Items strictly between `lower` and `upper`, excluding `skip`, in order.
    pub fn strictly_between(
        &self,
        lower: PositionKey,
        upper: PositionKey,
        skip: &str,
    ) -> Vec<&OrderedItem> {
        let mut found: Vec<&OrderedItem> = self
            .items
            .values()
            .filter(|i| i.record_id != skip && i.position > lower && i.position < upper)
            .collect();
        found.sort_by(|a, b| a.position.cmp(&b.position));
        found
    }

    /// Decide where `moving_id` goes, given its intended neighbours.
    ///
    /// Returns `Ok(None)` when the item already sits between them, otherwise
    /// the moving item carrying its new key. The collection must already hold
    /// the moving row, both neighbours, and every row between the neighbours.
    pub fn plan_move(
        &self,
        moving_id: &str,
        before_id: Option<&str>,
        after_id: Option<&str>,
    ) -> Result<Option<OrderedItem>> {
        let moving = self.get(moving_id)?;
        let before = before_id.map(|id| self.get(id)).transpose()?;
        let after = after_id.map(|id| self.get(id)).transpose()?;

        if before_id == Some(moving_id) || after_id == Some(moving_id) {
            return Err(PiecesError::SelfReference(moving_id.to_string()));
        }

        let lower = before.map(|i| i.position);
        let upper = after.map(|i| i.position);

        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo >= hi {
                return Err(PiecesError::OrderingViolation {
                    before: lo.value(),
                    after: hi.value(),
                });
            }
            let blocking: Vec<String> = self
                .strictly_between(lo, hi, moving_id)
                .into_iter()
                .map(|i| i.record_id.clone())
                .collect();
            if !blocking.is_empty() {
                return Err(PiecesError::NotConsecutive(blocking));
            }
        }

        let current = moving.position;
        let in_place =
            lower.map_or(true, |lo| current > lo) && upper.map_or(true, |hi| current < hi);
        if in_place {
            return Ok(None);
        }

        let key = position::between(lower, upper)?;
        Ok(Some(moving.with_position(key)))
    }
}

// ---------------------------------------------------------------------------
// ReorderCoordinator
// ---------------------------------------------------------------------------

/// Loads the minimum set of rows for a move and plans it.
pub struct ReorderCoordinator<'a, S: GroupMemberSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: GroupMemberSource + ?Sized> ReorderCoordinator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Plan moving `moving_id` between `before_id` and `after_id` in `group_id`.
    ///
    /// `Ok(None)` means no write is needed. Nothing is persisted here.
    pub fn move_to(
        &self,
        group_id: &str,
        moving_id: &str,
        before_id: Option<&str>,
        after_id: Option<&str>,
    ) -> Result<Option<OrderedItem>> {
        let mut ids = vec![moving_id];
        ids.extend(before_id);
        ids.extend(after_id);

        let mut collection = OrderedItemCollection::new(group_id);
        collection.extend(self.source.items_by_ids(group_id, &ids)?);

        // Only the span between two declared neighbours needs scanning.
        if let (Some(b), Some(a)) = (before_id, after_id) {
            let lower = collection.get(b)?.position;
            let upper = collection.get(a)?.position;
            if lower < upper {
                collection.extend(self.source.items_between(group_id, lower, upper)?);
            }
        }

        let planned = collection.plan_move(moving_id, before_id, after_id)?;
        match &planned {
            Some(item) => tracing::debug!(
                group = group_id,
                record = moving_id,
                position = %item.position,
                "planned reorder"
            ),
            None => tracing::debug!(
                group = group_id,
                record = moving_id,
                "item already in place; nothing to reorder"
            ),
        }
        Ok(planned)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
