//! # Block scanning
//!
//! The block scanner cuts a document into structural units and emits one
//! event per matched unit. Rules are tried in a fixed order against the
//! front of the remaining text; the first rule that matches consumes its
//! prefix and the loop restarts. Containers (quotes, list items, footnote
//! bodies) rescan their stripped content recursively, with a reduced rule
//! set where the grammar demands one.

pub mod grammar;
mod lists;
pub mod tables;

pub use grammar::BlockGrammar;

use crate::lexing::context::{LinkDef, ParseContext, keyify};
use crate::lexing::error::ScanError;
use crate::render::BlockRenderer;

/// One block-level rule. The ordering inside a rule slice is the dispatch
/// order, and earlier rules win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRule {
    Blank,
    Hrule,
    IndentedCode,
    FencedCode,
    AtxHeading,
    NpTable,
    SetextHeading,
    BlockQuote,
    List,
    Html,
    LinkDef,
    FootnoteDef,
    Table,
    Paragraph,
    Text,
}

impl BlockRule {
    /// Full rule set for top-level text and block-quote bodies.
    pub const DEFAULT: &'static [BlockRule] = &[
        BlockRule::Blank,
        BlockRule::Hrule,
        BlockRule::IndentedCode,
        BlockRule::FencedCode,
        BlockRule::AtxHeading,
        BlockRule::NpTable,
        BlockRule::SetextHeading,
        BlockRule::BlockQuote,
        BlockRule::List,
        BlockRule::Html,
        BlockRule::LinkDef,
        BlockRule::FootnoteDef,
        BlockRule::Table,
        BlockRule::Paragraph,
        BlockRule::Text,
    ];

    /// Reduced set for list item bodies: no headings-by-prefix, tables or
    /// definitions, and single lines fall through to `Text`.
    pub const LIST: &'static [BlockRule] = &[
        BlockRule::Blank,
        BlockRule::IndentedCode,
        BlockRule::FencedCode,
        BlockRule::SetextHeading,
        BlockRule::Hrule,
        BlockRule::BlockQuote,
        BlockRule::List,
        BlockRule::Html,
        BlockRule::Text,
    ];

    /// Set for footnote bodies: everything but nested definitions.
    pub const FOOTNOTE: &'static [BlockRule] = &[
        BlockRule::Blank,
        BlockRule::IndentedCode,
        BlockRule::FencedCode,
        BlockRule::AtxHeading,
        BlockRule::NpTable,
        BlockRule::SetextHeading,
        BlockRule::Hrule,
        BlockRule::BlockQuote,
        BlockRule::List,
        BlockRule::Html,
        BlockRule::Table,
        BlockRule::Paragraph,
        BlockRule::Text,
    ];
}

/// Block-level scanner over a compiled [`BlockGrammar`].
#[derive(Debug, Default)]
pub struct BlockScanner {
    grammar: BlockGrammar,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grammar(&self) -> &BlockGrammar {
        &self.grammar
    }

    /// Scans `text` with the given rule set, emitting block events to `out`.
    ///
    /// Trailing newlines are dropped before matching starts. Fails only
    /// when no rule matches non-empty remaining text, which a rule set
    /// ending in [`BlockRule::Text`] rules out.
    pub fn scan<R: BlockRenderer>(
        &self,
        text: &str,
        rules: &[BlockRule],
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<(), ScanError> {
        let mut rest = text.trim_end_matches('\n');
        while !rest.is_empty() {
            let consumed = self.step(rest, rules, ctx, out)?;
            rest = &rest[consumed..];
        }
        Ok(())
    }

    fn step<R: BlockRenderer>(
        &self,
        rest: &str,
        rules: &[BlockRule],
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<usize, ScanError> {
        for rule in rules {
            if let Some(consumed) = self.apply(*rule, rest, ctx, out)? {
                if consumed == 0 {
                    return Err(ScanError::no_match(rest));
                }
                return Ok(consumed);
            }
        }
        Err(ScanError::no_match(rest))
    }

    fn apply<R: BlockRenderer>(
        &self,
        rule: BlockRule,
        text: &str,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<Option<usize>, ScanError> {
        let g = &self.grammar;
        let consumed = match rule {
            BlockRule::Blank => g.blank.find(text).map(|m| {
                // A single newline between blocks is structure, not content.
                if m.end() > 1 {
                    out.blank_lines(ctx);
                }
                m.end()
            }),
            BlockRule::Hrule => g.hrule.find(text).map(|m| {
                out.hrule(ctx);
                m.end()
            }),
            BlockRule::IndentedCode => g.indented_code.find(text).map(|m| {
                let code = g.strip_code_indent(m.as_str());
                out.code(ctx, &code, None);
                m.end()
            }),
            BlockRule::FencedCode => g.fenced_code(text).map(|m| {
                out.code(ctx, m.body, m.lang);
                m.len
            }),
            BlockRule::AtxHeading => g.atx_heading.captures(text).map(|caps| {
                let level = caps[1].len() as u8;
                out.heading(ctx, &caps[2], level);
                caps[0].len()
            }),
            BlockRule::SetextHeading => g.setext_heading.captures(text).map(|caps| {
                let level = if &caps[2] == "=" { 1 } else { 2 };
                out.heading(ctx, &caps[1], level);
                caps[0].len()
            }),
            BlockRule::NpTable => g.nptable.captures(text).map(|caps| {
                let spec = tables::parse_unpiped(&caps[1], &caps[2], &caps[3]);
                out.nptable(ctx, &spec);
                caps[0].len()
            }),
            BlockRule::Table => g.table.captures(text).map(|caps| {
                let spec = tables::parse_piped(&caps[1], &caps[2], &caps[3]);
                out.table(ctx, &spec);
                caps[0].len()
            }),
            BlockRule::BlockQuote => match g.block_quote.find(text) {
                Some(m) => {
                    out.block_quote_start(ctx);
                    let inner = g.strip_quote_prefix(m.as_str());
                    self.scan(&inner, BlockRule::DEFAULT, ctx, out)?;
                    out.block_quote_end(ctx);
                    Some(m.end())
                }
                None => None,
            },
            BlockRule::List => match g.list_block(text) {
                Some((len, ordered)) => {
                    lists::emit_list(self, &text[..len], ordered, ctx, out)?;
                    Some(len)
                }
                None => None,
            },
            BlockRule::Html => g.block_html(text).map(|(len, pre)| {
                out.block_html(ctx, &text[..len], pre);
                len
            }),
            BlockRule::LinkDef => g.link_def.captures(text).map(|caps| {
                let def = LinkDef {
                    url: caps[2].to_owned(),
                    title: caps.get(3).map(|m| m.as_str().to_owned()),
                };
                ctx.define_link(&caps[1], def);
                caps[0].len()
            }),
            BlockRule::FootnoteDef => match g.footnote_def.captures(text) {
                Some(caps) => {
                    let key = keyify(&caps[1]);
                    // Redefinitions are consumed without a second body.
                    if ctx.define_footnote(&key) {
                        out.footnote_start(ctx, &key);
                        let body = dedent_footnote(&caps[2]);
                        self.scan(&body, BlockRule::FOOTNOTE, ctx, out)?;
                        out.footnote_end(ctx, &key);
                    }
                    Some(caps[0].len())
                }
                None => None,
            },
            BlockRule::Paragraph => g.paragraph(text).map(|len| {
                out.paragraph(ctx, text[..len].trim_end_matches('\n'));
                len
            }),
            BlockRule::Text => g.text.find(text).map(|m| {
                out.text_line(ctx, m.as_str());
                m.end()
            }),
        };
        Ok(consumed)
    }
}

/// Outdents a footnote body by the smallest non-zero leading whitespace
/// found on its continuation lines. Width is counted and cut in
/// characters, since the leading run may mix spaces with wider
/// whitespace.
fn dedent_footnote(body: &str) -> String {
    if !body.contains('\n') {
        return body.to_owned();
    }
    let mut lines = body.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .map(|line| line.chars().count() - line.trim_start().chars().count())
        .filter(|&w| w > 0)
        .min()
        .unwrap_or(0);
    let mut out = vec![first.to_owned()];
    for line in &rest {
        let cut = line
            .char_indices()
            .nth(indent)
            .map_or(line.len(), |(idx, _)| idx);
        out.push(line[cut..].to_owned());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{TraceEvent, TraceRenderer};
    use pretty_assertions::assert_eq;

    fn events(text: &str, rules: &[BlockRule]) -> Vec<TraceEvent> {
        let scanner = BlockScanner::new();
        let mut ctx = ParseContext::new();
        let mut sink = TraceRenderer::new();
        scanner
            .scan(text, rules, &mut ctx, &mut sink)
            .expect("scan failed");
        sink.events
    }

    #[test]
    fn atx_heading_level_and_text() {
        assert_eq!(
            events("### Deep ###\n", BlockRule::DEFAULT),
            vec![TraceEvent::Heading {
                text: "Deep".to_owned(),
                level: 3,
            }]
        );
    }

    #[test]
    fn setext_underline_sets_the_level() {
        assert_eq!(
            events("Title\n=====\n", BlockRule::DEFAULT),
            vec![TraceEvent::Heading {
                text: "Title".to_owned(),
                level: 1,
            }]
        );
        assert_eq!(
            events("Title\n-----\n", BlockRule::DEFAULT),
            vec![TraceEvent::Heading {
                text: "Title".to_owned(),
                level: 2,
            }]
        );
    }

    #[test]
    fn indented_code_keeps_trailing_newlines() {
        assert_eq!(
            events("    let x = 1;\n\n\nafter\n", BlockRule::DEFAULT),
            vec![
                TraceEvent::Code {
                    code: "let x = 1;\n\n\n".to_owned(),
                    lang: None,
                },
                TraceEvent::Paragraph {
                    text: "after".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn block_quote_rescans_its_body_with_the_full_rule_set() {
        assert_eq!(
            events("> # Quoted\n> text\n", BlockRule::DEFAULT),
            vec![
                TraceEvent::BlockQuoteStart,
                TraceEvent::Heading {
                    text: "Quoted".to_owned(),
                    level: 1,
                },
                TraceEvent::Paragraph {
                    text: "text".to_owned(),
                },
                TraceEvent::BlockQuoteEnd,
            ]
        );
    }

    #[test]
    fn link_definition_registers_without_an_event() {
        let scanner = BlockScanner::new();
        let mut ctx = ParseContext::new();
        let mut sink = TraceRenderer::new();
        scanner
            .scan(
                "[1]: http://e.com \"T\"\n",
                BlockRule::DEFAULT,
                &mut ctx,
                &mut sink,
            )
            .unwrap();
        assert!(sink.events.is_empty());
        let def = ctx.links.get("1").expect("definition missing");
        assert_eq!(def.url, "http://e.com");
        assert_eq!(def.title.as_deref(), Some("T"));
    }

    #[test]
    fn later_link_definition_overwrites_earlier() {
        let scanner = BlockScanner::new();
        let mut ctx = ParseContext::new();
        let mut sink = TraceRenderer::new();
        scanner
            .scan(
                "[k]: http://a.com\n[k]: http://b.com\n",
                BlockRule::DEFAULT,
                &mut ctx,
                &mut sink,
            )
            .unwrap();
        assert_eq!(ctx.links.get("k").map(|d| d.url.as_str()), Some("http://b.com"));
    }

    #[test]
    fn footnote_definition_scans_its_body_without_nested_definitions() {
        assert_eq!(
            events("[^n]: body line\n", BlockRule::DEFAULT),
            vec![
                TraceEvent::FootnoteStart { key: "n".to_owned() },
                TraceEvent::Paragraph {
                    text: "body line".to_owned(),
                },
                TraceEvent::FootnoteEnd { key: "n".to_owned() },
            ]
        );
    }

    #[test]
    fn duplicate_footnote_definition_is_consumed_silently() {
        let got = events("[^n]: first\n[^n]: second\n", BlockRule::DEFAULT);
        assert_eq!(
            got,
            vec![
                TraceEvent::FootnoteStart { key: "n".to_owned() },
                TraceEvent::Paragraph {
                    text: "first".to_owned(),
                },
                TraceEvent::FootnoteEnd { key: "n".to_owned() },
            ]
        );
    }

    #[test]
    fn footnote_body_is_dedented_by_minimum_indent() {
        assert_eq!(dedent_footnote("a\n   b\n  c"), "a\n b\nc");
        assert_eq!(dedent_footnote("a"), "a");
        assert_eq!(dedent_footnote("a\nb"), "a\nb");
    }

    #[test]
    fn footnote_dedent_counts_wide_whitespace_in_characters() {
        assert_eq!(dedent_footnote("x\n \u{3000}b\n  c"), "x\nb\nc");
    }

    #[test]
    fn footnote_body_with_wide_whitespace_indent_scans() {
        assert_eq!(
            events("[^a]: x\n \u{3000}b\n  c\n", BlockRule::DEFAULT),
            vec![
                TraceEvent::FootnoteStart { key: "a".to_owned() },
                TraceEvent::Paragraph {
                    text: "x\nb\nc".to_owned(),
                },
                TraceEvent::FootnoteEnd { key: "a".to_owned() },
            ]
        );
    }

    #[test]
    fn blank_rule_emits_only_for_runs() {
        assert_eq!(
            events("a\n\n\nb\n", BlockRule::DEFAULT),
            vec![
                TraceEvent::Paragraph { text: "a".to_owned() },
                TraceEvent::Paragraph { text: "b".to_owned() },
            ]
        );
    }

    #[test]
    fn text_rule_takes_single_lines_in_list_context() {
        assert_eq!(
            events("just a line", BlockRule::LIST),
            vec![TraceEvent::TextLine {
                text: "just a line".to_owned(),
            }]
        );
    }

    #[test]
    fn hrule_matches_spaced_forms() {
        assert_eq!(events("* * *\n", BlockRule::DEFAULT), vec![TraceEvent::Hrule]);
        assert_eq!(events("---\n", BlockRule::DEFAULT), vec![TraceEvent::Hrule]);
    }

    #[test]
    fn empty_input_emits_nothing() {
        assert!(events("", BlockRule::DEFAULT).is_empty());
        assert!(events("\n\n", BlockRule::DEFAULT).is_empty());
    }
}
