//! List item splitting and emission.
//!
//! A captured list block is cut into items at lines that repeat the first
//! bullet's exact indent; deeper or shallower bullets stay inside the
//! current item and surface as nested lists when the item body is
//! rescanned. Each item body is rescanned with the reduced list rule set,
//! so arbitrary nesting falls out of recursion.

use crate::lexing::block::{BlockRule, BlockScanner};
use crate::lexing::context::ParseContext;
use crate::lexing::error::ScanError;
use crate::render::BlockRenderer;

pub(crate) fn emit_list<R: BlockRenderer>(
    scanner: &BlockScanner,
    cap: &str,
    ordered: bool,
    ctx: &mut ParseContext,
    out: &mut R,
) -> Result<(), ScanError> {
    out.list_start(ctx, ordered);
    let items = split_items(scanner, cap);
    let last = items.len().saturating_sub(1);
    // An item is loose when a blank line sits inside it or between it and
    // its neighbour; blank separation also spills onto the following item.
    let mut next_loose = false;
    for (i, raw) in items.iter().enumerate() {
        let body = strip_bullet(scanner, raw);

        let mut loose = next_loose;
        if !loose && has_interior_blank(&body) {
            loose = true;
        }
        if i != last && !body.is_empty() {
            next_loose = body.ends_with('\n');
            if !loose {
                loose = next_loose;
            }
        }

        if loose {
            out.loose_item_start(ctx);
        } else {
            out.list_item_start(ctx);
        }
        scanner.scan(&body, BlockRule::LIST, ctx, out)?;
        out.list_item_end(ctx);
    }
    out.list_end(ctx);
    Ok(())
}

/// Splits a list capture into raw items. A new item starts at every line
/// that repeats the first item's indent followed by a bullet marker; all
/// other lines, blank ones included, continue the current item.
fn split_items(scanner: &BlockScanner, cap: &str) -> Vec<String> {
    let grammar = scanner.grammar();
    let indent = grammar
        .bullet_start
        .captures(cap)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_owned()))
        .unwrap_or_default();

    let mut items: Vec<Vec<&str>> = Vec::new();
    for line in cap.split('\n') {
        let starts_item = line
            .strip_prefix(&indent)
            .is_some_and(|r| grammar.bullet_marker.is_match(r));
        if items.is_empty() || starts_item {
            items.push(vec![line]);
        } else if let Some(current) = items.last_mut() {
            current.push(line);
        }
    }
    items.into_iter().map(|lines| lines.join("\n")).collect()
}

/// Removes the bullet prefix from the first line and outdents continuation
/// lines by at most the width the bullet occupied.
fn strip_bullet(scanner: &BlockScanner, raw: &str) -> String {
    let grammar = scanner.grammar();
    let before = raw.len();
    let body = grammar.bullet_prefix.replace(raw, "").into_owned();
    if !body.contains("\n ") {
        return body;
    }
    let width = before - body.len();
    body.split('\n')
        .map(|line| {
            let leading = line.len() - line.trim_start_matches(' ').len();
            &line[leading.min(width)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when the body holds a blank line that is not merely trailing
/// whitespace.
fn has_interior_blank(body: &str) -> bool {
    let mut search = 0;
    while let Some(k) = body[search..].find("\n\n") {
        let after = &body[search + k + 2..];
        if !after.chars().all(char::is_whitespace) {
            return true;
        }
        search += k + 1;
    }
    false
}
