use crate::distribution::AvailableCounts;
use crate::document;
use crate::error::{PiecesError, Result};
use crate::paths;
use crate::store::AvailabilitySource;
use crate::types::Tier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Every selectable problem, keyed by problem id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub problems: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn load(root: &Path) -> Result<Self> {
        let catalog = document::read_yaml(&paths::catalog_path(root))?;
        Ok(catalog.unwrap_or_default())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        document::write_yaml(&paths::catalog_path(root), self)
    }

    pub fn add(&mut self, id: &str, tier: Tier, title: Option<String>) -> Result<()> {
        paths::validate_slug(id)?;
        if self.problems.contains_key(id) {
            return Err(PiecesError::ProblemExists(id.to_string()));
        }
        self.problems
            .insert(id.to_string(), CatalogEntry { tier, title });
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<CatalogEntry> {
        self.problems
            .remove(id)
            .ok_or_else(|| PiecesError::ProblemNotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Result<&CatalogEntry> {
        self.problems
            .get(id)
            .ok_or_else(|| PiecesError::ProblemNotFound(id.to_string()))
    }

    /// A copy of the catalog without the given problem ids.
    pub fn without<'a>(&self, exclude: impl IntoIterator<Item = &'a str>) -> Catalog {
        let exclude: HashSet<&str> = exclude.into_iter().collect();
        Catalog {
            problems: self
                .problems
                .iter()
                .filter(|(id, _)| !exclude.contains(id.as_str()))
                .map(|(id, e)| (id.clone(), e.clone()))
                .collect(),
        }
    }
}

impl AvailabilitySource for Catalog {
    fn available_counts(&self) -> Result<AvailableCounts> {
        let mut counts = AvailableCounts::default();
        for entry in self.problems.values() {
            match entry.tier {
                Tier::Low => counts.low += 1,
                Tier::Mid => counts.mid += 1,
                Tier::High => counts.high += 1,
            }
        }
        Ok(counts)
    }

    fn items_for_tier(&self, tier: Tier, limit: u64) -> Result<Vec<String>> {
        Ok(self
            .problems
            .iter()
            .filter(|(_, e)| e.tier == tier)
            .map(|(id, _)| id.clone())
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
