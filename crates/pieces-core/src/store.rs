//! Storage seams consumed by the planner and the reorder coordinator.
//!
//! The core never talks to a database directly. Callers provide these traits;
//! [`MemoryStore`] is the in-process implementation and the YAML workspace in
//! [`crate::piece`] is the on-disk one.

use crate::distribution::AvailableCounts;
use crate::error::{PiecesError, Result};
use crate::ordering::{sort_by_position, OrderedItem};
use crate::position::PositionKey;
use crate::types::Tier;
use std::collections::BTreeMap;

/// Reports which problems can currently be selected, per tier.
pub trait AvailabilitySource {
    fn available_counts(&self) -> Result<AvailableCounts>;

    /// Up to `limit` selectable problem ids in `tier`.
    fn items_for_tier(&self, tier: Tier, limit: u64) -> Result<Vec<String>>;
}

/// Read access to the ordered members of a group.
pub trait GroupMemberSource {
    /// Rows for exactly the requested record ids. Unknown ids are omitted.
    fn items_by_ids(&self, group_id: &str, record_ids: &[&str]) -> Result<Vec<OrderedItem>>;

    /// Rows whose key lies in the open interval `(lower, upper)`.
    fn items_between(
        &self,
        group_id: &str,
        lower: PositionKey,
        upper: PositionKey,
    ) -> Result<Vec<OrderedItem>>;
}

/// Accepts the single row a reorder produces.
pub trait PersistenceSink {
    fn save_item(&mut self, item: &OrderedItem) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// problem id -> tier
    catalog: BTreeMap<String, Tier>,
    /// group id -> record id -> row
    groups: BTreeMap<String, BTreeMap<String, OrderedItem>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_problem(&mut self, id: impl Into<String>, tier: Tier) -> Result<()> {
        let id = id.into();
        if self.catalog.contains_key(&id) {
            return Err(PiecesError::ProblemExists(id));
        }
        self.catalog.insert(id, tier);
        Ok(())
    }

    pub fn insert(&mut self, item: OrderedItem) {
        self.groups
            .entry(item.group_id.clone())
            .or_default()
            .insert(item.record_id.clone(), item);
    }

    /// Every row of a group in visible order.
    pub fn group(&self, group_id: &str) -> Vec<OrderedItem> {
        let mut items: Vec<OrderedItem> = self
            .groups
            .get(group_id)
            .map(|g| g.values().cloned().collect())
            .unwrap_or_default();
        sort_by_position(&mut items);
        items
    }

    /// Record ids of a group in visible order.
    pub fn order(&self, group_id: &str) -> Vec<String> {
        self.group(group_id)
            .into_iter()
            .map(|i| i.record_id)
            .collect()
    }

    /// Number of rows written through [`PersistenceSink`].
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl AvailabilitySource for MemoryStore {
    fn available_counts(&self) -> Result<AvailableCounts> {
        let mut counts = AvailableCounts::default();
        for tier in self.catalog.values() {
            match tier {
                Tier::Low => counts.low += 1,
                Tier::Mid => counts.mid += 1,
                Tier::High => counts.high += 1,
            }
        }
        Ok(counts)
    }

    fn items_for_tier(&self, tier: Tier, limit: u64) -> Result<Vec<String>> {
        Ok(self
            .catalog
            .iter()
            .filter(|(_, t)| **t == tier)
            .map(|(id, _)| id.clone())
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }
}

impl GroupMemberSource for MemoryStore {
    fn items_by_ids(&self, group_id: &str, record_ids: &[&str]) -> Result<Vec<OrderedItem>> {
        let Some(group) = self.groups.get(group_id) else {
            return Ok(Vec::new());
        };
        Ok(record_ids
            .iter()
            .filter_map(|id| group.get(*id).cloned())
            .collect())
    }

    fn items_between(
        &self,
        group_id: &str,
        lower: PositionKey,
        upper: PositionKey,
    ) -> Result<Vec<OrderedItem>> {
        let Some(group) = self.groups.get(group_id) else {
            return Ok(Vec::new());
        };
        Ok(group
            .values()
            .filter(|i| i.position > lower && i.position < upper)
            .cloned()
            .collect())
    }
}

impl PersistenceSink for MemoryStore {
    fn save_item(&mut self, item: &OrderedItem) -> Result<()> {
        let group = self
            .groups
            .get_mut(&item.group_id)
            .ok_or_else(|| PiecesError::PieceNotFound(item.group_id.clone()))?;
        let slot = group
            .get_mut(&item.record_id)
            .ok_or_else(|| PiecesError::ItemNotFound {
                group: item.group_id.clone(),
                id: item.record_id.clone(),
            })?;
        *slot = item.clone();
        self.writes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: f64) -> PositionKey {
        PositionKey::new(v).unwrap()
    }

    fn store() -> MemoryStore {
        let mut s = MemoryStore::new();
        for (id, pos) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
            s.insert(OrderedItem::new(id, "g", id, key(pos)));
        }
        s
    }

    #[test]
    fn counts_per_tier() {
        let mut s = MemoryStore::new();
        s.add_problem("p1", Tier::Low).unwrap();
        s.add_problem("p2", Tier::High).unwrap();
        s.add_problem("p3", Tier::High).unwrap();
        let counts = s.available_counts().unwrap();
        assert_eq!((counts.low, counts.mid, counts.high), (1, 0, 2));
        assert_eq!(s.items_for_tier(Tier::High, 1).unwrap(), vec!["p2"]);
        assert!(matches!(
            s.add_problem("p1", Tier::Mid),
            Err(PiecesError::ProblemExists(_))
        ));
    }

    #[test]
    fn by_ids_returns_only_requested() {
        let s = store();
        let rows = s.items_by_ids("g", &["c", "ghost", "a"]).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert!(s.items_by_ids("nope", &["a"]).unwrap().is_empty());
    }

    #[test]
    fn between_is_open_interval() {
        let s = store();
        let rows = s.items_between("g", key(1.0), key(3.0)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record_id, "b");
    }

    #[test]
    fn save_replaces_row_and_counts_write() {
        let mut s = store();
        let moved = OrderedItem::new("c", "g", "c", key(0.5));
        s.save_item(&moved).unwrap();
        assert_eq!(s.order("g"), vec!["c", "a", "b"]);
        assert_eq!(s.writes(), 1);

        let stray = OrderedItem::new("zz", "g", "zz", key(9.0));
        assert!(s.save_item(&stray).unwrap_err().is_not_found());
    }
}
