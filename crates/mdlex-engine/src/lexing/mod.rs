//! # Lexing
//!
//! Block-level and inline-level scanners over an ordered grammar.
//!
//! ## Modules
//!
//! - **`context`**: [`ParseContext`], the document-wide link and footnote
//!   reference tables threaded through every scan call
//! - **`error`**: [`ScanError`], the single fatal no-match condition
//! - **`block`**: block rule table and [`block::BlockScanner`]
//! - **`inline`**: inline rule table and [`inline::InlineScanner`]
//!
//! ## Key invariants
//!
//! - Every rule match consumes a strictly positive prefix of the remaining
//!   text; concatenating the matched prefixes in order reconstructs the
//!   scanned region exactly.
//! - Matching is leftmost-first across the ordered rule list, never
//!   longest-match, and never backtracks across rules once a match is chosen.
//! - Reference tables are written by the block scanner and read (and, for
//!   footnote ordinals, claimed) by the inline scanner.

pub mod block;
pub mod context;
pub mod error;
pub mod inline;

use crate::render::BlockRenderer;

pub use block::{BlockRule, BlockScanner};
pub use context::ParseContext;
pub use error::ScanError;
pub use inline::{InlineRule, InlineScanner};

/// Scans a whole document with the default block rule set.
pub fn scan_document<R: BlockRenderer>(
    text: &str,
    ctx: &mut ParseContext,
    out: &mut R,
) -> Result<(), ScanError> {
    BlockScanner::new().scan(text, BlockRule::DEFAULT, ctx, out)
}
