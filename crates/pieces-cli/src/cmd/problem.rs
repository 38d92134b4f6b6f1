use crate::output::{print_json, print_problems};
use anyhow::Context;
use clap::Subcommand;
use pieces_core::catalog::Catalog;
use pieces_core::Tier;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProblemSubcommand {
    /// Add a problem to the catalog
    Add {
        id: String,
        /// Difficulty tier: low, mid or high
        #[arg(long)]
        tier: Tier,
        #[arg(long)]
        title: Option<String>,
    },
    /// List catalog problems
    List {
        /// Only show one tier
        #[arg(long)]
        tier: Option<Tier>,
    },
    /// Remove a problem from the catalog
    Remove { id: String },
}

pub fn run(root: &Path, subcmd: ProblemSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProblemSubcommand::Add { id, tier, title } => add(root, &id, tier, title, json),
        ProblemSubcommand::List { tier } => list(root, tier, json),
        ProblemSubcommand::Remove { id } => remove(root, &id, json),
    }
}

fn add(root: &Path, id: &str, tier: Tier, title: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut catalog = Catalog::load(root).context("failed to load catalog")?;
    catalog.add(id, tier, title)?;
    catalog.save(root).context("failed to save catalog")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "tier": tier }))?;
    } else {
        println!("Added problem: {id} [{tier}]");
    }
    Ok(())
}

fn list(root: &Path, tier: Option<Tier>, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::load(root).context("failed to load catalog")?;
    let entries: Vec<_> = catalog
        .problems
        .iter()
        .filter(|(_, e)| tier.map_or(true, |t| e.tier == t))
        .collect();

    if json {
        let items: Vec<_> = entries
            .iter()
            .map(|(id, e)| serde_json::json!({ "id": id, "tier": e.tier, "title": e.title }))
            .collect();
        return print_json(&items);
    }

    if entries.is_empty() {
        println!("No problems.");
        return Ok(());
    }
    print_problems(entries);
    Ok(())
}

fn remove(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut catalog = Catalog::load(root).context("failed to load catalog")?;
    catalog.remove(id)?;
    catalog.save(root).context("failed to save catalog")?;

    if json {
        print_json(&serde_json::json!({ "removed": id }))?;
    } else {
        println!("Removed problem: {id}");
    }
    Ok(())
}
