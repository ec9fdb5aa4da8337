//! # mdlex-engine
//!
//! A two-level, grammar-driven Markdown tokenizer.
//!
//! The [`BlockScanner`] segments a document into structural units (headings,
//! lists, quotes, tables, code blocks, paragraphs) and the [`InlineScanner`]
//! segments the text of one unit into spans (emphasis, links, code spans,
//! footnote references). Both scanners match an ordered table of rules
//! greedily against the front of the remaining input; every successful match
//! consumes a non-empty prefix and dispatches exactly one event to a render
//! sink, so parsing stays fully decoupled from rendering.
//!
//! ## Wiring
//!
//! The block scanner never invokes the inline scanner itself. By convention
//! the caller's [`BlockRenderer`] forwards `paragraph`/`text_line` events to
//! an [`InlineScanner`] using the same [`ParseContext`], which carries the
//! document-wide link and footnote definition tables. Because definitions can
//! appear after the references that use them, a backend that needs resolved
//! references should buffer block events (or the paragraph texts) and run the
//! inline pass once the block pass has populated the context.
//!
//! ```
//! use mdlex_engine::{BlockRule, BlockScanner, ParseContext, TraceRenderer};
//!
//! let scanner = BlockScanner::new();
//! let mut ctx = ParseContext::new();
//! let mut sink = TraceRenderer::new();
//! scanner
//!     .scan("# Title\n", BlockRule::DEFAULT, &mut ctx, &mut sink)
//!     .unwrap();
//! assert_eq!(sink.events.len(), 1);
//! ```
//!
//! ## Tolerated anomalies
//!
//! Three behaviors are deliberate and preserved from the grammar this engine
//! reimplements: a `[text][key]` or `[text]` span whose key has no definition
//! is consumed with no event at all; a footnote key referenced more than once
//! produces an event only for its first reference; and duplicate footnote
//! definitions after the first are consumed silently.

pub mod lexing;
pub mod render;

pub use lexing::block::tables::{Align, TableSpec};
pub use lexing::scan_document;
pub use lexing::block::{BlockGrammar, BlockRule, BlockScanner};
pub use lexing::context::{LinkDef, ParseContext, keyify};
pub use lexing::error::ScanError;
pub use lexing::inline::{InlineGrammar, InlineRule, InlineScanner};
pub use render::{BlockRenderer, InlineRenderer, TraceEvent, TraceRenderer};
