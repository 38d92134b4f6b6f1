use crate::output::{print_items, print_json, print_pieces};
use anyhow::Context;
use clap::Subcommand;
use pieces_core::catalog::Catalog;
use pieces_core::config::Config;
use pieces_core::piece::{FileStore, Piece};
use pieces_core::{reorder, select_problems, SkillProfile};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PieceSubcommand {
    /// Create a new piece
    Create {
        slug: String,
        /// Piece title
        #[arg(long)]
        title: String,
    },
    /// List all pieces
    List,
    /// Show a piece's problems in order
    Show { slug: String },
    /// Append catalog problems to the end of a piece
    Add {
        slug: String,
        /// Problem ids, appended in the given order
        #[arg(required = true)]
        problems: Vec<String>,
    },
    /// Remove an item from a piece
    Remove {
        slug: String,
        /// Record id (see `piece show`)
        record: String,
    },
    /// Move one item between two neighbours
    Move {
        slug: String,
        /// Record id of the item to move
        record: String,
        /// Record id that should come right before the item
        #[arg(long)]
        before: Option<String>,
        /// Record id that should come right after the item
        #[arg(long)]
        after: Option<String>,
    },
    /// Fill a piece with a tiered selection from the catalog
    Assemble {
        slug: String,
        /// Skill profile: low, mid or high (default from config)
        #[arg(long)]
        profile: Option<SkillProfile>,
        /// Number of problems to add (default from config)
        #[arg(long)]
        total: Option<u64>,
    },
    /// Rewrite every position key to 1, 2, 3, ... keeping the order
    Renumber { slug: String },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: PieceSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PieceSubcommand::Create { slug, title } => create(root, &slug, &title, json),
        PieceSubcommand::List => list(root, json),
        PieceSubcommand::Show { slug } => show(root, &slug, json),
        PieceSubcommand::Add { slug, problems } => add(root, &slug, &problems, json),
        PieceSubcommand::Remove { slug, record } => remove(root, &slug, &record, json),
        PieceSubcommand::Move {
            slug,
            record,
            before,
            after,
        } => move_item(root, &slug, &record, before.as_deref(), after.as_deref(), json),
        PieceSubcommand::Assemble {
            slug,
            profile,
            total,
        } => assemble(root, &slug, profile, total, json),
        PieceSubcommand::Renumber { slug } => renumber(root, &slug, json),
    }
}

// ---------------------------------------------------------------------------
// create / list / show
// ---------------------------------------------------------------------------

fn create(root: &Path, slug: &str, title: &str, json: bool) -> anyhow::Result<()> {
    let piece = Piece::create(root, slug, title)?;
    if json {
        print_json(&serde_json::json!({ "slug": piece.slug, "title": piece.title }))?;
    } else {
        println!("Created piece: {} ({})", piece.slug, piece.title);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let pieces = Piece::list(root).context("failed to list pieces")?;

    if json {
        let items: Vec<_> = pieces
            .iter()
            .map(|p| serde_json::json!({ "slug": p.slug, "title": p.title, "items": p.items.len() }))
            .collect();
        return print_json(&items);
    }

    if pieces.is_empty() {
        println!("No pieces.");
        return Ok(());
    }
    print_pieces(&pieces);
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let piece = Piece::load(root, slug)?;
    let ordered = piece.ordered();

    if json {
        return print_json(&serde_json::json!({
            "slug": piece.slug,
            "title": piece.title,
            "items": ordered,
        }));
    }

    println!("{} ({})", piece.title, piece.slug);
    if ordered.is_empty() {
        println!("No problems yet.");
        return Ok(());
    }
    print_items(&ordered);
    Ok(())
}

// ---------------------------------------------------------------------------
// add / remove
// ---------------------------------------------------------------------------

fn add(root: &Path, slug: &str, problems: &[String], json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::load(root).context("failed to load catalog")?;
    let mut piece = Piece::load(root, slug)?;

    let mut added = Vec::new();
    for problem in problems {
        catalog.get(problem)?;
        let record = piece.add_problem(problem)?;
        added.push(serde_json::json!({ "record_id": record, "problem_id": problem }));
    }
    piece.save(root).context("failed to save piece")?;

    if json {
        print_json(&added)?;
    } else {
        println!("Added {} problem(s) to '{slug}'", added.len());
    }
    Ok(())
}

fn remove(root: &Path, slug: &str, record: &str, json: bool) -> anyhow::Result<()> {
    let mut piece = Piece::load(root, slug)?;
    let removed = piece.remove_item(record)?;
    piece.save(root).context("failed to save piece")?;

    if json {
        print_json(&removed)?;
    } else {
        println!("Removed {} ({}) from '{slug}'", removed.record_id, removed.problem_id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// move
// ---------------------------------------------------------------------------

fn move_item(
    root: &Path,
    slug: &str,
    record: &str,
    before: Option<&str>,
    after: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut store = FileStore::new(root, &config);
    let outcome = reorder(&mut store, slug, record, before, after)
        .with_context(|| format!("cannot move '{record}' in '{slug}'"))?;

    if json {
        return print_json(&outcome);
    }
    match outcome.new_position {
        Some(position) => println!("Moved {record} to position {position}"),
        None => println!("{record} is already in place"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// assemble / renumber
// ---------------------------------------------------------------------------

fn assemble(
    root: &Path,
    slug: &str,
    profile: Option<SkillProfile>,
    total: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let profile = profile.unwrap_or(config.default_profile);
    let total = total.unwrap_or(config.default_total);

    let mut piece = Piece::load(root, slug)?;
    let catalog = Catalog::load(root).context("failed to load catalog")?;
    let remaining = catalog.without(piece.items.iter().map(|i| i.problem_id.as_str()));

    let selection = select_problems(&remaining, profile, total)?;
    for selected in &selection.problems {
        piece.add_problem(&selected.problem_id)?;
    }
    piece.save(root).context("failed to save piece")?;

    if json {
        return print_json(&selection);
    }
    let quota = selection.quota;
    println!(
        "Assembled '{slug}' with {profile} profile: low {}  mid {}  high {}  (total {} of {total})",
        quota.low(),
        quota.mid(),
        quota.high(),
        quota.total()
    );
    Ok(())
}

fn renumber(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let mut piece = Piece::load(root, slug)?;
    let changed = piece.renumber()?;
    piece.save(root).context("failed to save piece")?;

    if json {
        print_json(&serde_json::json!({ "slug": slug, "changed": changed }))?;
    } else {
        println!("Renumbered '{slug}': {changed} item(s) changed");
    }
    Ok(())
}
