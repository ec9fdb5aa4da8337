//! # Inline scanning
//!
//! The inline scanner decomposes one block's text into span events. Like
//! the block scanner it walks an ordered rule list and the first match
//! consumes a prefix; unlike the block scanner it never recurses, so span
//! content (emphasis text, link text) is delivered raw for the sink to
//! rescan if it wants nested spans.
//!
//! Two pieces of state color the match: whether the scanner sits inside a
//! raw `<a>` element (bare URLs inside one degrade to plain text) and
//! whether footnote references are live (they are not while scanning a
//! footnote body). The anchor flag survives across calls on the same
//! scanner, mirroring how raw HTML can open in one paragraph and close in
//! a later one.

pub mod grammar;

pub use grammar::InlineGrammar;

use crate::lexing::context::ParseContext;
use crate::lexing::error::ScanError;
use crate::render::InlineRenderer;

use grammar::link_tail;

/// One inline rule; slice order is dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineRule {
    Escape,
    Autolink,
    Url,
    Tag,
    Footnote,
    Link,
    Reflink,
    Nolink,
    DoubleEmphasis,
    Emphasis,
    Code,
    Linebreak,
    Strikethrough,
    Text,
}

impl InlineRule {
    pub const DEFAULT: &'static [InlineRule] = &[
        InlineRule::Escape,
        InlineRule::Autolink,
        InlineRule::Url,
        InlineRule::Tag,
        InlineRule::Footnote,
        InlineRule::Link,
        InlineRule::Reflink,
        InlineRule::Nolink,
        InlineRule::DoubleEmphasis,
        InlineRule::Emphasis,
        InlineRule::Code,
        InlineRule::Linebreak,
        InlineRule::Strikethrough,
        InlineRule::Text,
    ];
}

/// Inline-level scanner over a compiled [`InlineGrammar`].
///
/// Hard-wrap line breaks are the default: any newline inside a block is a
/// break. [`InlineScanner::two_space_breaks`] restores the strict form
/// where a break needs two trailing spaces.
#[derive(Debug)]
pub struct InlineScanner {
    grammar: InlineGrammar,
    hard_wrap: bool,
    in_anchor: bool,
}

impl Default for InlineScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineScanner {
    pub fn new() -> Self {
        Self {
            grammar: InlineGrammar::new(),
            hard_wrap: true,
            in_anchor: false,
        }
    }

    pub fn two_space_breaks() -> Self {
        Self {
            hard_wrap: false,
            ..Self::new()
        }
    }

    /// Scans span text with footnote references live.
    pub fn scan<R: InlineRenderer>(
        &mut self,
        text: &str,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<(), ScanError> {
        self.scan_with(text, InlineRule::DEFAULT, true, ctx, out)
    }

    /// Scans the text of a footnote body; footnote references inside one
    /// are not recognized, so `[^k]` falls through to the link rules.
    pub fn scan_footnote_body<R: InlineRenderer>(
        &mut self,
        text: &str,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<(), ScanError> {
        self.scan_with(text, InlineRule::DEFAULT, false, ctx, out)
    }

    pub fn scan_with<R: InlineRenderer>(
        &mut self,
        text: &str,
        rules: &[InlineRule],
        footnotes: bool,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<(), ScanError> {
        let mut rest = text.trim_end_matches('\n');
        while !rest.is_empty() {
            let consumed = self.step(rest, rules, footnotes, ctx, out)?;
            rest = &rest[consumed..];
        }
        Ok(())
    }

    fn step<R: InlineRenderer>(
        &mut self,
        rest: &str,
        rules: &[InlineRule],
        footnotes: bool,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Result<usize, ScanError> {
        for rule in rules {
            if let Some(consumed) = self.apply(*rule, rest, footnotes, ctx, out) {
                if consumed == 0 {
                    return Err(ScanError::no_match(rest));
                }
                return Ok(consumed);
            }
        }
        Err(ScanError::no_match(rest))
    }

    fn apply<R: InlineRenderer>(
        &mut self,
        rule: InlineRule,
        text: &str,
        footnotes: bool,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Option<usize> {
        match rule {
            InlineRule::Escape => self.grammar.escape.captures(text).map(|caps| {
                out.text(ctx, &caps[1]);
                caps[0].len()
            }),
            InlineRule::Autolink => self.grammar.autolink.captures(text).map(|caps| {
                let is_email = &caps[2] == "@";
                out.autolink(ctx, &caps[1], is_email);
                caps[0].len()
            }),
            InlineRule::Url => self.grammar.url.captures(text).map(|caps| {
                if self.in_anchor {
                    out.text(ctx, &caps[1]);
                } else {
                    out.autolink(ctx, &caps[1], false);
                }
                caps[0].len()
            }),
            InlineRule::Tag => self.grammar.tag.find(text).map(|m| {
                let lower = m.as_str().to_lowercase();
                if lower.starts_with("<a ") {
                    self.in_anchor = true;
                }
                if lower.starts_with("</a>") {
                    self.in_anchor = false;
                }
                out.inline_html(ctx, m.as_str());
                m.end()
            }),
            InlineRule::Footnote => {
                if !footnotes {
                    return None;
                }
                self.grammar.footnote.captures(text).map(|caps| {
                    let key = crate::lexing::context::keyify(&caps[1]);
                    // Unknown keys and repeat references consume silently.
                    if let Some(ordinal) = ctx.claim_footnote(&key) {
                        out.footnote_ref(ctx, &key, ordinal);
                    }
                    caps[0].len()
                })
            }
            InlineRule::Link => self.inline_link(text, ctx, out),
            InlineRule::Reflink => self.reference_link(text, ctx, out),
            InlineRule::Nolink => {
                let caps = self.grammar.nolink.captures(text)?;
                let image = caps[0].starts_with('!');
                let content = caps.get(1).map_or("", |m| m.as_str());
                Some(self.resolve_link(image, content, content, caps[0].len(), ctx, out))
            }
            InlineRule::DoubleEmphasis => self.grammar.double_emphasis(text).map(|(len, body)| {
                out.bold(ctx, body);
                len
            }),
            InlineRule::Emphasis => {
                if let Some(caps) = self.grammar.em_underscore.captures(text) {
                    let len = caps[0].len();
                    out.italic(ctx, &caps[1]);
                    return Some(len);
                }
                self.grammar.star_emphasis(text).map(|(len, body)| {
                    out.italic(ctx, body);
                    len
                })
            }
            InlineRule::Code => self.grammar.code_span(text).map(|(len, body)| {
                out.codespan(ctx, body);
                len
            }),
            InlineRule::Linebreak => {
                let re = if self.hard_wrap {
                    &self.grammar.linebreak_any
                } else {
                    &self.grammar.linebreak_trailing
                };
                let m = re.find(text)?;
                // A break right before trailing whitespace is not a break.
                if text[m.end()..].chars().all(char::is_whitespace) {
                    return None;
                }
                out.linebreak(ctx);
                Some(m.end())
            }
            InlineRule::Strikethrough => self.grammar.strikethrough.captures(text).map(|caps| {
                out.strikethrough(ctx, &caps[1]);
                caps[0].len()
            }),
            InlineRule::Text => {
                let len = self.grammar.text_run(text, self.hard_wrap);
                out.text(ctx, &text[..len]);
                Some(len)
            }
        }
    }

    /// `[text](target "title")`.
    fn inline_link<R: InlineRenderer>(
        &mut self,
        text: &str,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Option<usize> {
        let head = self.grammar.bracketed(text)?;
        let tail = text[head.end..].strip_prefix('(')?;
        let (used, href, title) = link_tail(tail)?;
        let len = head.end + 1 + used;
        if head.image {
            out.image(ctx, href, title, head.content);
        } else {
            self.in_anchor = false;
            out.link(ctx, href, title, head.content);
        }
        Some(len)
    }

    /// `[text][key]`, with an empty key defaulting to the text.
    fn reference_link<R: InlineRenderer>(
        &mut self,
        text: &str,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> Option<usize> {
        let head = self.grammar.bracketed(text)?;
        let rest = &text[head.end..];
        let after_ws = rest.trim_start();
        let key_body = after_ws.strip_prefix('[')?;
        let key_end = key_body.find(']')?;
        let key_raw = &key_body[..key_end];
        if key_raw.contains('^') {
            return None;
        }
        let len = head.end + (rest.len() - after_ws.len()) + 1 + key_end + 1;
        let key = if key_raw.is_empty() { head.content } else { key_raw };
        Some(self.resolve_link(head.image, key, head.content, len, ctx, out))
    }

    /// Looks a reference key up and emits the span, or consumes it silently
    /// when the key is undefined.
    fn resolve_link<R: InlineRenderer>(
        &mut self,
        image: bool,
        key: &str,
        content: &str,
        len: usize,
        ctx: &mut ParseContext,
        out: &mut R,
    ) -> usize {
        let key = crate::lexing::context::keyify(key);
        let Some(def) = ctx.links.get(&key).cloned() else {
            return len;
        };
        if image {
            out.image(ctx, &def.url, def.title.as_deref(), content);
        } else {
            self.in_anchor = false;
            out.link(ctx, &def.url, def.title.as_deref(), content);
        }
        len
    }
}
