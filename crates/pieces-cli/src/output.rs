//! Rendering for command output: JSON for `--json`, aligned tables otherwise.

use pieces_core::catalog::CatalogEntry;
use pieces_core::piece::Piece;
use pieces_core::{OrderedItem, PositionKey, Tier};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// `SLUG  TITLE  ITEMS`, one row per piece.
pub fn print_pieces(pieces: &[Piece]) {
    let rows = pieces
        .iter()
        .map(|p| vec![p.slug.clone(), p.title.clone(), p.items.len().to_string()])
        .collect();
    print!(
        "{}",
        render(&[Column::left("SLUG"), Column::left("TITLE"), Column::right("ITEMS")], rows)
    );
}

/// Items in visible order with their rank and raw key.
pub fn print_items(items: &[OrderedItem]) {
    print!("{}", render_items(items));
}

/// Catalog problems, lowest tier first.
pub fn print_problems<'a>(entries: impl IntoIterator<Item = (&'a String, &'a CatalogEntry)>) {
    print!("{}", render_problems(entries));
}

fn render_items(items: &[OrderedItem]) -> String {
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            vec![
                (i + 1).to_string(),
                item.record_id.clone(),
                item.member_id.clone(),
                format_position(item.position),
            ]
        })
        .collect();
    render(
        &[
            Column::right("#"),
            Column::left("RECORD"),
            Column::left("PROBLEM"),
            Column::right("POSITION"),
        ],
        rows,
    )
}

fn render_problems<'a>(entries: impl IntoIterator<Item = (&'a String, &'a CatalogEntry)>) -> String {
    let mut entries: Vec<_> = entries.into_iter().collect();
    entries.sort_by(|(a_id, a), (b_id, b)| a.tier.cmp(&b.tier).then_with(|| a_id.cmp(b_id)));
    let rows = entries
        .into_iter()
        .map(|(id, e)| {
            vec![
                id.clone(),
                tier_label(e.tier).to_string(),
                e.title.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render(&[Column::left("ID"), Column::left("TIER"), Column::left("TITLE")], rows)
}

/// Keys that came from halving print in full so neighbours stay
/// distinguishable; very small gaps switch to scientific notation.
fn format_position(key: PositionKey) -> String {
    let v = key.value();
    if v >= 1e-4 && v < 1e15 {
        v.to_string()
    } else {
        format!("{v:e}")
    }
}

fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Low => "LOW",
        Tier::Mid => "MID",
        Tier::High => "HIGH",
    }
}

// ---------------------------------------------------------------------------
// Table layout
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    align: Align,
}

impl Column {
    fn left(header: &'static str) -> Self {
        Self {
            header,
            align: Align::Left,
        }
    }

    fn right(header: &'static str) -> Self {
        Self {
            header,
            align: Align::Right,
        }
    }
}

fn render(columns: &[Column], rows: Vec<Vec<String>>) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|cell| cell.chars().count())
                .fold(c.header.len(), usize::max)
        })
        .collect();

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = columns
            .iter()
            .zip(&widths)
            .zip(cells)
            .map(|((c, &w), cell)| match c.align {
                Align::Left => format!("{cell:<w$}"),
                Align::Right => format!("{cell:>w$}"),
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(columns.iter().map(|c| c.header).collect());
    let rules: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(rules.iter().map(String::as_str).collect()));
    for row in &rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}
