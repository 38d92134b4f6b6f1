use crate::error::{PiecesError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PIECES_DIR: &str = ".pieces";
pub const PIECE_SETS_DIR: &str = ".pieces/pieces";

pub const CONFIG_FILE: &str = ".pieces/config.yaml";
pub const CATALOG_FILE: &str = ".pieces/catalog.yaml";

pub const MANIFEST_FILE: &str = "manifest.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn pieces_dir(root: &Path) -> PathBuf {
    root.join(PIECES_DIR)
}

pub fn piece_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(PIECE_SETS_DIR).join(slug)
}

pub fn piece_manifest(root: &Path, slug: &str) -> PathBuf {
    piece_dir(root, slug).join(MANIFEST_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").expect("slug pattern is valid")
    })
}

/// Piece slugs and problem ids share one format.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(PiecesError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
