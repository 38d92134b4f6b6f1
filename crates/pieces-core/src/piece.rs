use crate::config::Config;
use crate::document;
use crate::error::{PiecesError, Result};
use crate::ordering::{self, OrderedItem};
use crate::paths;
use crate::position::{self, PositionKey};
use crate::store::{GroupMemberSource, PersistenceSink};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// PieceItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceItem {
    pub record_id: String,
    pub problem_id: String,
    pub position: PositionKey,
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A named, ordered problem set. Items are stored unsorted; their order is
/// given by `position`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<PieceItem>,
    #[serde(default)]
    pub next_record: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Piece {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            title: title.into(),
            items: Vec::new(),
            next_record: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(root: &Path, slug: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;

        if paths::piece_dir(root, &slug).exists() {
            return Err(PiecesError::PieceExists(slug));
        }

        let piece = Self::new(slug, title);
        piece.save(root)?;
        Ok(piece)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        paths::validate_slug(slug)?;
        let mut piece: Piece = document::read_yaml(&paths::piece_manifest(root, slug))?
            .ok_or_else(|| PiecesError::PieceNotFound(slug.to_string()))?;

        // The directory name is the piece's identity; a hand-edited slug
        // field must not redirect the next save elsewhere.
        if piece.slug != slug {
            tracing::warn!(
                piece = slug,
                manifest_slug = %piece.slug,
                "manifest slug does not match its directory; using the directory name"
            );
            piece.slug = slug.to_string();
        }
        Ok(piece)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        paths::validate_slug(&self.slug)?;
        document::write_yaml(&paths::piece_manifest(root, &self.slug), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::PIECE_SETS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut pieces = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let slug = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &slug) {
                    Ok(p) => pieces.push(p),
                    Err(PiecesError::PieceNotFound(_) | PiecesError::InvalidSlug(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        pieces.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pieces)
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    /// Items in visible order.
    pub fn ordered(&self) -> Vec<OrderedItem> {
        let mut items: Vec<OrderedItem> = self.items.iter().map(|i| self.to_ordered(i)).collect();
        ordering::sort_by_position(&mut items);
        items
    }

    pub fn contains_problem(&self, problem_id: &str) -> bool {
        self.items.iter().any(|i| i.problem_id == problem_id)
    }

    fn to_ordered(&self, item: &PieceItem) -> OrderedItem {
        OrderedItem::new(
            item.record_id.clone(),
            self.slug.clone(),
            item.problem_id.clone(),
            item.position,
        )
    }

    fn last_position(&self) -> Option<PositionKey> {
        self.items.iter().map(|i| i.position).max()
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Append a problem at the end. Returns the new record id.
    pub fn add_problem(&mut self, problem_id: &str) -> Result<String> {
        if self.contains_problem(problem_id) {
            return Err(PiecesError::DuplicateMember(problem_id.to_string()));
        }
        let position = position::append_after(self.last_position())?;
        self.next_record += 1;
        let record_id = format!("r{}", self.next_record);
        self.items.push(PieceItem {
            record_id: record_id.clone(),
            problem_id: problem_id.to_string(),
            position,
        });
        self.updated_at = Utc::now();
        Ok(record_id)
    }

    /// Remove an item by record id. Other keys are left untouched.
    pub fn remove_item(&mut self, record_id: &str) -> Result<PieceItem> {
        let idx = self
            .items
            .iter()
            .position(|i| i.record_id == record_id)
            .ok_or_else(|| self.not_found(record_id))?;
        self.updated_at = Utc::now();
        Ok(self.items.remove(idx))
    }

    /// Overwrite the key of one item. The item must belong to this piece.
    pub fn apply(&mut self, item: &OrderedItem) -> Result<()> {
        if item.group_id != self.slug {
            return Err(PiecesError::GroupMismatch {
                expected: self.slug.clone(),
                found: item.group_id.clone(),
                id: item.record_id.clone(),
            });
        }
        let slot = self
            .items
            .iter_mut()
            .find(|i| i.record_id == item.record_id)
            .ok_or_else(|| PiecesError::ItemNotFound {
                group: item.group_id.clone(),
                id: item.record_id.clone(),
            })?;
        slot.position = item.position;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Reset every key to 1.0, 2.0, ... keeping the current order.
    /// Returns the number of items whose key changed.
    pub fn renumber(&mut self) -> Result<usize> {
        let changed = ordering::renumber(&self.ordered())?;
        for item in &changed {
            self.apply(item)?;
        }
        Ok(changed.len())
    }

    fn not_found(&self, record_id: &str) -> PiecesError {
        PiecesError::ItemNotFound {
            group: self.slug.clone(),
            id: record_id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Group member source and sink backed by piece manifests on disk.
///
/// The group id is the piece slug.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    precision_floor: f64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            root: root.into(),
            precision_floor: config.precision_floor,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl GroupMemberSource for FileStore {
    fn items_by_ids(&self, group_id: &str, record_ids: &[&str]) -> Result<Vec<OrderedItem>> {
        let piece = Piece::load(&self.root, group_id)?;
        Ok(piece
            .items
            .iter()
            .filter(|i| record_ids.contains(&i.record_id.as_str()))
            .map(|i| piece.to_ordered(i))
            .collect())
    }

    fn items_between(
        &self,
        group_id: &str,
        lower: PositionKey,
        upper: PositionKey,
    ) -> Result<Vec<OrderedItem>> {
        let piece = Piece::load(&self.root, group_id)?;
        Ok(piece
            .items
            .iter()
            .filter(|i| i.position > lower && i.position < upper)
            .map(|i| piece.to_ordered(i))
            .collect())
    }
}

impl PersistenceSink for FileStore {
    fn save_item(&mut self, item: &OrderedItem) -> Result<()> {
        let mut piece = Piece::load(&self.root, &item.group_id)?;
        piece.apply(item)?;

        let others = piece.items.iter().filter(|i| i.record_id != item.record_id);
        let below = others
            .clone()
            .map(|i| i.position)
            .filter(|p| *p < item.position)
            .max();
        let above = others
            .map(|i| i.position)
            .filter(|p| *p > item.position)
            .min();
        if position::gap_is_tight(below, Some(item.position), self.precision_floor)
            || position::gap_is_tight(Some(item.position), above, self.precision_floor)
        {
            tracing::warn!(
                piece = %item.group_id,
                record = %item.record_id,
                position = %item.position,
                "position keys are nearly exhausted; run `pieces piece renumber`"
            );
        }

        piece.save(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::reorder;
    use tempfile::TempDir;

    fn piece_with(dir: &TempDir, problems: &[&str]) -> Piece {
        let mut p = Piece::create(dir.path(), "week-1", "Week 1").unwrap();
        for prob in problems {
            p.add_problem(prob).unwrap();
        }
        p.save(dir.path()).unwrap();
        p
    }

    fn order(p: &Piece) -> Vec<String> {
        p.ordered().into_iter().map(|i| i.member_id).collect()
    }

    #[test]
    fn create_load_list() {
        let dir = TempDir::new().unwrap();
        Piece::create(dir.path(), "week-1", "Week 1").unwrap();
        Piece::create(dir.path(), "week-2", "Week 2").unwrap();

        let loaded = Piece::load(dir.path(), "week-1").unwrap();
        assert_eq!(loaded.title, "Week 1");
        assert!(loaded.items.is_empty());
        assert_eq!(Piece::list(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn duplicate_piece_fails() {
        let dir = TempDir::new().unwrap();
        Piece::create(dir.path(), "week-1", "a").unwrap();
        assert!(matches!(
            Piece::create(dir.path(), "week-1", "b"),
            Err(PiecesError::PieceExists(_))
        ));
    }

    #[test]
    fn missing_piece_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(Piece::load(dir.path(), "nope").unwrap_err().is_not_found());
    }

    #[test]
    fn load_rejects_path_like_slugs() {
        let dir = TempDir::new().unwrap();
        piece_with(&dir, &["p1"]);
        for slug in ["../week-1", "week-1/../week-1", "/etc", ".."] {
            assert!(
                matches!(Piece::load(dir.path(), slug), Err(PiecesError::InvalidSlug(_))),
                "{slug} should be rejected"
            );
        }

        let mut store = FileStore::new(dir.path(), &Config::default());
        let err = reorder(&mut store, "../week-1", "r1", None, None).unwrap_err();
        assert!(matches!(err, PiecesError::InvalidSlug(_)));
    }

    #[test]
    fn list_skips_directories_with_invalid_names() {
        let dir = TempDir::new().unwrap();
        piece_with(&dir, &[]);
        std::fs::create_dir_all(dir.path().join(paths::PIECE_SETS_DIR).join("Not A Slug")).unwrap();
        let slugs: Vec<String> = Piece::list(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["week-1"]);
    }

    #[test]
    fn load_uses_directory_name_over_manifest_slug() {
        let dir = TempDir::new().unwrap();
        let mut p = piece_with(&dir, &["p1", "p2"]);
        p.slug = "week-2".to_string();
        // Write week-1's manifest with a foreign slug inside.
        document::write_yaml(&paths::piece_manifest(dir.path(), "week-1"), &p).unwrap();

        let loaded = Piece::load(dir.path(), "week-1").unwrap();
        assert_eq!(loaded.slug, "week-1");

        let mut store = FileStore::new(dir.path(), &Config::default());
        reorder(&mut store, "week-1", "r2", None, Some("r1")).unwrap();
        assert!(!paths::piece_dir(dir.path(), "week-2").exists());
        assert_eq!(order(&Piece::load(dir.path(), "week-1").unwrap()), vec!["p2", "p1"]);
    }

    #[test]
    fn apply_rejects_item_from_another_group() {
        let dir = TempDir::new().unwrap();
        let mut p = piece_with(&dir, &["p1", "p2"]);
        let foreign = OrderedItem::new("r1", "week-9", "p1", PositionKey::new(5.0).unwrap());
        let err = p.apply(&foreign).unwrap_err();
        assert!(matches!(
            err,
            PiecesError::GroupMismatch { ref expected, ref found, .. }
                if expected == "week-1" && found == "week-9"
        ));
        assert_eq!(order(&p), vec!["p1", "p2"]);

        // The sink looks the item up under its own group.
        let mut store = FileStore::new(dir.path(), &Config::default());
        assert!(store.save_item(&foreign).unwrap_err().is_not_found());
    }

    #[test]
    fn add_appends_in_order() {
        let dir = TempDir::new().unwrap();
        let p = piece_with(&dir, &["p1", "p2", "p3"]);
        assert_eq!(order(&p), vec!["p1", "p2", "p3"]);
        let keys: Vec<f64> = p.ordered().iter().map(|i| i.position.value()).collect();
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn add_rejects_duplicate_problem() {
        let dir = TempDir::new().unwrap();
        let mut p = piece_with(&dir, &["p1"]);
        assert!(matches!(
            p.add_problem("p1"),
            Err(PiecesError::DuplicateMember(_))
        ));
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let mut p = piece_with(&dir, &["p1", "p2", "p3"]);
        p.remove_item("r2").unwrap();
        let keys: Vec<f64> = p.ordered().iter().map(|i| i.position.value()).collect();
        assert_eq!(keys, vec![1.0, 3.0]);
        assert!(p.remove_item("r2").unwrap_err().is_not_found());
        // Record ids are never reused.
        assert_eq!(p.add_problem("p4").unwrap(), "r4");
    }

    #[test]
    fn file_store_reorder_round_trip() {
        let dir = TempDir::new().unwrap();
        piece_with(&dir, &["p1", "p2", "p3"]);
        let mut store = FileStore::new(dir.path(), &Config::default());

        let outcome = reorder(&mut store, "week-1", "r3", None, Some("r1")).unwrap();
        assert!(outcome.moved);
        assert_eq!(outcome.new_position.unwrap().value(), 0.5);

        let loaded = Piece::load(dir.path(), "week-1").unwrap();
        assert_eq!(order(&loaded), vec!["p3", "p1", "p2"]);
        // Untouched rows keep their keys.
        let r2 = loaded.items.iter().find(|i| i.record_id == "r2").unwrap();
        assert_eq!(r2.position.value(), 2.0);
    }

    #[test]
    fn file_store_reports_blocking_item() {
        let dir = TempDir::new().unwrap();
        piece_with(&dir, &["p1", "p2", "p3", "p4"]);
        let mut store = FileStore::new(dir.path(), &Config::default());
        let err = reorder(&mut store, "week-1", "r4", Some("r1"), Some("r3")).unwrap_err();
        assert!(matches!(err, PiecesError::NotConsecutive(ref ids) if ids == &["r2".to_string()]));
    }

    #[test]
    fn renumber_recovers_spacing() {
        let dir = TempDir::new().unwrap();
        let mut p = piece_with(&dir, &["p1", "p2", "p3"]);
        let moved = p.ordered()[2].with_position(PositionKey::new(1.25).unwrap());
        p.apply(&moved).unwrap();
        assert_eq!(order(&p), vec!["p1", "p3", "p2"]);

        let changed = p.renumber().unwrap();
        assert_eq!(changed, 2);
        assert_eq!(order(&p), vec!["p1", "p3", "p2"]);
        let keys: Vec<f64> = p.ordered().iter().map(|i| i.position.value()).collect();
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
    }
}
