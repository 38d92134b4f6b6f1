use anyhow::Context;
use pieces_core::{catalog::Catalog, config::Config, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing pieces in: {}", root.display());

    for dir in [paths::PIECES_DIR, paths::PIECE_SETS_DIR] {
        let p = root.join(dir);
        std::fs::create_dir_all(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    // An existing catalog is never overwritten: it is the user's problem bank.
    if paths::catalog_path(root).exists() {
        println!("  exists:  {}", paths::CATALOG_FILE);
    } else {
        Catalog::default()
            .save(root)
            .context("failed to write catalog.yaml")?;
        println!("  created: {}", paths::CATALOG_FILE);
    }

    Ok(())
}
