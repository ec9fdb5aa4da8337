//! Table row and alignment extraction.
//!
//! Two table shapes exist: the piped form, whose rows all start with `|`,
//! and the loose form, whose rows only carry interior pipes. Cell counts are
//! not validated against the header; uneven rows are passed to the renderer
//! as-is.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Column alignment parsed from the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    None,
}

/// A fully extracted table: header cells, per-column alignment and the row
/// grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    pub header: Vec<String>,
    pub align: Vec<Align>,
    pub rows: Vec<Vec<String>>,
}

fn cell_sep() -> &'static Regex {
    static SEP: OnceLock<Regex> = OnceLock::new();
    SEP.get_or_init(|| Regex::new(r" *\| *").expect("Invalid cell separator pattern"))
}

fn header_edges() -> &'static Regex {
    static EDGES: OnceLock<Regex> = OnceLock::new();
    EDGES.get_or_init(|| Regex::new(r"^ *| *\| *$").expect("Invalid header edge pattern"))
}

fn row_edges() -> &'static Regex {
    static EDGES: OnceLock<Regex> = OnceLock::new();
    EDGES.get_or_init(|| Regex::new(r"^ *\| *| *\| *$").expect("Invalid row edge pattern"))
}

fn piped_tail() -> &'static Regex {
    static TAIL: OnceLock<Regex> = OnceLock::new();
    TAIL.get_or_init(|| Regex::new(r"(?: *\| *)?\n$").expect("Invalid row tail pattern"))
}

fn split_cells(row: &str) -> Vec<String> {
    cell_sep().split(row).map(str::to_owned).collect()
}

fn parse_align(cell: &str) -> Align {
    let lead = cell.starts_with(':');
    let trail = cell.len() > lead as usize && cell.ends_with(':');
    let core = &cell[lead as usize..cell.len() - trail as usize];
    if core.is_empty() || !core.bytes().all(|b| b == b'-') {
        return Align::None;
    }
    match (lead, trail) {
        (true, true) => Align::Center,
        (true, false) => Align::Left,
        (false, true) => Align::Right,
        (false, false) => Align::None,
    }
}

/// Parses the alignment row. Spaces are dropped, then the row is split on
/// every pipe; a trailing pipe therefore yields a trailing empty cell with
/// no alignment, which is tolerated rather than trimmed.
fn parse_align_row(row: &str) -> Vec<Align> {
    let cleaned: String = row.chars().filter(|&c| c != ' ').collect();
    cleaned.split('|').map(parse_align).collect()
}

fn parse_header(row: &str) -> Vec<String> {
    split_cells(&header_edges().replace_all(row, ""))
}

/// Extracts a piped table. `cells` is the raw body capture: one optional
/// trailing separator-and-newline is dropped, then each line loses its edge
/// pipes before splitting.
pub(crate) fn parse_piped(header: &str, align: &str, cells: &str) -> TableSpec {
    let body = piped_tail().replace(cells, "");
    let rows = body
        .split('\n')
        .map(|row| split_cells(&row_edges().replace_all(row, "")))
        .collect();
    TableSpec {
        header: parse_header(header),
        align: parse_align_row(align),
        rows,
    }
}

/// Extracts a loose table. Rows keep their edges; only the final newline of
/// the body capture is dropped.
pub(crate) fn parse_unpiped(header: &str, align: &str, cells: &str) -> TableSpec {
    let body = cells.strip_suffix('\n').unwrap_or(cells);
    let rows = body.split('\n').map(split_cells).collect();
    TableSpec {
        header: parse_header(header),
        align: parse_align_row(align),
        rows,
    }
}
