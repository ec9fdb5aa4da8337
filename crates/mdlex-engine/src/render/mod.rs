//! # Render sinks
//!
//! The scanners do not build a syntax tree; they push events into a sink as
//! each rule matches. A backend implements [`BlockRenderer`] for structural
//! events and [`InlineRenderer`] for span events. Every method has a no-op
//! default, so a sink only overrides the events it cares about.
//!
//! Each method receives the [`ParseContext`] first, giving block sinks the
//! reference tables they need to drive their own inline passes over
//! `paragraph` and `text_line` payloads.
//!
//! [`TraceRenderer`] is the built-in sink: it records every event as a
//! [`TraceEvent`] value, which is what the test suite asserts against.

use serde::Serialize;

use crate::lexing::block::tables::TableSpec;
use crate::lexing::context::ParseContext;

/// Sink for block-level events.
///
/// The scanner guarantees balanced nesting: every `*_start` is eventually
/// followed by its matching `*_end`, and container events never interleave.
#[allow(unused_variables)]
pub trait BlockRenderer {
    /// One or more consecutive blank lines between blocks.
    fn blank_lines(&mut self, ctx: &mut ParseContext) {}

    /// A thematic break.
    fn hrule(&mut self, ctx: &mut ParseContext) {}

    /// A heading; `level` is 1 through 6.
    fn heading(&mut self, ctx: &mut ParseContext, text: &str, level: u8) {}

    /// A code block. `lang` carries the fence info string when present;
    /// indented code blocks never have one.
    fn code(&mut self, ctx: &mut ParseContext, code: &str, lang: Option<&str>) {}

    fn block_quote_start(&mut self, ctx: &mut ParseContext) {}
    fn block_quote_end(&mut self, ctx: &mut ParseContext) {}

    fn list_start(&mut self, ctx: &mut ParseContext, ordered: bool) {}
    fn list_end(&mut self, ctx: &mut ParseContext) {}

    /// Opens a tight list item. Its body arrives as `text_line` events.
    fn list_item_start(&mut self, ctx: &mut ParseContext) {}

    /// Opens a loose list item. Its body arrives as full block events.
    fn loose_item_start(&mut self, ctx: &mut ParseContext) {}

    fn list_item_end(&mut self, ctx: &mut ParseContext) {}

    fn footnote_start(&mut self, ctx: &mut ParseContext, key: &str) {}
    fn footnote_end(&mut self, ctx: &mut ParseContext, key: &str) {}

    /// A table with a leading-pipe header row.
    fn table(&mut self, ctx: &mut ParseContext, spec: &TableSpec) {}

    /// A table whose rows carry interior pipes only.
    fn nptable(&mut self, ctx: &mut ParseContext, spec: &TableSpec) {}

    /// A raw HTML block. `pre` is true for balanced `pre`, `script` and
    /// `style` elements, whose content must not be reflowed.
    fn block_html(&mut self, ctx: &mut ParseContext, html: &str, pre: bool) {}

    /// A paragraph, trailing newlines stripped. The payload is raw span
    /// text; run it through an inline scan to decompose it.
    fn paragraph(&mut self, ctx: &mut ParseContext, text: &str) {}

    /// A single line inside a tight list item, same payload convention as
    /// `paragraph`.
    fn text_line(&mut self, ctx: &mut ParseContext, text: &str) {}
}

/// Sink for inline span events.
#[allow(unused_variables)]
pub trait InlineRenderer {
    /// A literal text run, escapes already resolved.
    fn text(&mut self, ctx: &mut ParseContext, text: &str) {}

    /// An angle-bracket autolink or a bare URL.
    fn autolink(&mut self, ctx: &mut ParseContext, link: &str, is_email: bool) {}

    /// A raw inline tag or comment, passed through verbatim.
    fn inline_html(&mut self, ctx: &mut ParseContext, html: &str) {}

    /// The first reference to a defined footnote. `ordinal` counts from 1 in
    /// reference order.
    fn footnote_ref(&mut self, ctx: &mut ParseContext, key: &str, ordinal: usize) {}

    /// A resolved link. `content` is the bracketed text, not yet inline-scanned.
    fn link(&mut self, ctx: &mut ParseContext, url: &str, title: Option<&str>, content: &str) {}

    fn image(&mut self, ctx: &mut ParseContext, src: &str, title: Option<&str>, alt: &str) {}

    /// Double-delimiter emphasis; `content` is not yet inline-scanned.
    fn bold(&mut self, ctx: &mut ParseContext, content: &str) {}

    /// Single-delimiter emphasis; `content` is not yet inline-scanned.
    fn italic(&mut self, ctx: &mut ParseContext, content: &str) {}

    /// A code span, delimiters stripped and content trimmed.
    fn codespan(&mut self, ctx: &mut ParseContext, code: &str) {}

    fn linebreak(&mut self, ctx: &mut ParseContext) {}

    fn strikethrough(&mut self, ctx: &mut ParseContext, content: &str) {}
}

/// One recorded scanner event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    BlankLines,
    Hrule,
    Heading {
        text: String,
        level: u8,
    },
    Code {
        code: String,
        lang: Option<String>,
    },
    BlockQuoteStart,
    BlockQuoteEnd,
    ListStart {
        ordered: bool,
    },
    ListEnd,
    ListItemStart,
    LooseItemStart,
    ListItemEnd,
    FootnoteStart {
        key: String,
    },
    FootnoteEnd {
        key: String,
    },
    Table {
        spec: TableSpec,
    },
    Nptable {
        spec: TableSpec,
    },
    BlockHtml {
        html: String,
        pre: bool,
    },
    Paragraph {
        text: String,
    },
    TextLine {
        text: String,
    },
    Text {
        text: String,
    },
    Autolink {
        link: String,
        is_email: bool,
    },
    InlineHtml {
        html: String,
    },
    FootnoteRef {
        key: String,
        ordinal: usize,
    },
    Link {
        url: String,
        title: Option<String>,
        content: String,
    },
    Image {
        src: String,
        title: Option<String>,
        alt: String,
    },
    Bold {
        content: String,
    },
    Italic {
        content: String,
    },
    Codespan {
        code: String,
    },
    Linebreak,
    Strikethrough {
        content: String,
    },
}

/// A sink that records every event in order.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    pub events: Vec<TraceEvent>,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockRenderer for TraceRenderer {
    fn blank_lines(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::BlankLines);
    }

    fn hrule(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::Hrule);
    }

    fn heading(&mut self, _ctx: &mut ParseContext, text: &str, level: u8) {
        self.events.push(TraceEvent::Heading {
            text: text.to_owned(),
            level,
        });
    }

    fn code(&mut self, _ctx: &mut ParseContext, code: &str, lang: Option<&str>) {
        self.events.push(TraceEvent::Code {
            code: code.to_owned(),
            lang: lang.map(str::to_owned),
        });
    }

    fn block_quote_start(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::BlockQuoteStart);
    }

    fn block_quote_end(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::BlockQuoteEnd);
    }

    fn list_start(&mut self, _ctx: &mut ParseContext, ordered: bool) {
        self.events.push(TraceEvent::ListStart { ordered });
    }

    fn list_end(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::ListEnd);
    }

    fn list_item_start(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::ListItemStart);
    }

    fn loose_item_start(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::LooseItemStart);
    }

    fn list_item_end(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::ListItemEnd);
    }

    fn footnote_start(&mut self, _ctx: &mut ParseContext, key: &str) {
        self.events.push(TraceEvent::FootnoteStart {
            key: key.to_owned(),
        });
    }

    fn footnote_end(&mut self, _ctx: &mut ParseContext, key: &str) {
        self.events.push(TraceEvent::FootnoteEnd {
            key: key.to_owned(),
        });
    }

    fn table(&mut self, _ctx: &mut ParseContext, spec: &TableSpec) {
        self.events.push(TraceEvent::Table { spec: spec.clone() });
    }

    fn nptable(&mut self, _ctx: &mut ParseContext, spec: &TableSpec) {
        self.events.push(TraceEvent::Nptable { spec: spec.clone() });
    }

    fn block_html(&mut self, _ctx: &mut ParseContext, html: &str, pre: bool) {
        self.events.push(TraceEvent::BlockHtml {
            html: html.to_owned(),
            pre,
        });
    }

    fn paragraph(&mut self, _ctx: &mut ParseContext, text: &str) {
        self.events.push(TraceEvent::Paragraph {
            text: text.to_owned(),
        });
    }

    fn text_line(&mut self, _ctx: &mut ParseContext, text: &str) {
        self.events.push(TraceEvent::TextLine {
            text: text.to_owned(),
        });
    }
}

impl InlineRenderer for TraceRenderer {
    fn text(&mut self, _ctx: &mut ParseContext, text: &str) {
        self.events.push(TraceEvent::Text {
            text: text.to_owned(),
        });
    }

    fn autolink(&mut self, _ctx: &mut ParseContext, link: &str, is_email: bool) {
        self.events.push(TraceEvent::Autolink {
            link: link.to_owned(),
            is_email,
        });
    }

    fn inline_html(&mut self, _ctx: &mut ParseContext, html: &str) {
        self.events.push(TraceEvent::InlineHtml {
            html: html.to_owned(),
        });
    }

    fn footnote_ref(&mut self, _ctx: &mut ParseContext, key: &str, ordinal: usize) {
        self.events.push(TraceEvent::FootnoteRef {
            key: key.to_owned(),
            ordinal,
        });
    }

    fn link(&mut self, _ctx: &mut ParseContext, url: &str, title: Option<&str>, content: &str) {
        self.events.push(TraceEvent::Link {
            url: url.to_owned(),
            title: title.map(str::to_owned),
            content: content.to_owned(),
        });
    }

    fn image(&mut self, _ctx: &mut ParseContext, src: &str, title: Option<&str>, alt: &str) {
        self.events.push(TraceEvent::Image {
            src: src.to_owned(),
            title: title.map(str::to_owned),
            alt: alt.to_owned(),
        });
    }

    fn bold(&mut self, _ctx: &mut ParseContext, content: &str) {
        self.events.push(TraceEvent::Bold {
            content: content.to_owned(),
        });
    }

    fn italic(&mut self, _ctx: &mut ParseContext, content: &str) {
        self.events.push(TraceEvent::Italic {
            content: content.to_owned(),
        });
    }

    fn codespan(&mut self, _ctx: &mut ParseContext, code: &str) {
        self.events.push(TraceEvent::Codespan {
            code: code.to_owned(),
        });
    }

    fn linebreak(&mut self, _ctx: &mut ParseContext) {
        self.events.push(TraceEvent::Linebreak);
    }

    fn strikethrough(&mut self, _ctx: &mut ParseContext, content: &str) {
        self.events.push(TraceEvent::Strikethrough {
            content: content.to_owned(),
        });
    }
}
