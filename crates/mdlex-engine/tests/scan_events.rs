//! End-to-end event streams over whole documents, including the
//! block-to-inline forwarding convention the crate documents: a block
//! pass populates the reference tables, then paragraph payloads are fed
//! through an inline scan against the same context.

use mdlex_engine::{
    BlockRenderer, BlockScanner, InlineScanner, ParseContext, ScanError, TraceEvent, TraceRenderer,
    scan_document,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn doc_events(text: &str) -> Vec<TraceEvent> {
    let mut ctx = ParseContext::new();
    let mut sink = TraceRenderer::new();
    scan_document(text, &mut ctx, &mut sink).expect("scan failed");
    sink.events
}

/// A sink that forwards paragraph and text-line payloads through an
/// inline scan, switching to the footnote-body variant while inside a
/// footnote definition.
struct ForwardRenderer {
    inline: InlineScanner,
    trace: TraceRenderer,
    footnote_depth: usize,
}

impl ForwardRenderer {
    fn new() -> Self {
        Self {
            inline: InlineScanner::new(),
            trace: TraceRenderer::new(),
            footnote_depth: 0,
        }
    }

    fn forward(&mut self, ctx: &mut ParseContext, text: &str) {
        let result = if self.footnote_depth > 0 {
            self.inline.scan_footnote_body(text, ctx, &mut self.trace)
        } else {
            self.inline.scan(text, ctx, &mut self.trace)
        };
        result.expect("inline scan failed");
    }
}

impl BlockRenderer for ForwardRenderer {
    fn heading(&mut self, ctx: &mut ParseContext, text: &str, level: u8) {
        self.trace.heading(ctx, text, level);
    }

    fn list_start(&mut self, ctx: &mut ParseContext, ordered: bool) {
        self.trace.list_start(ctx, ordered);
    }

    fn list_end(&mut self, ctx: &mut ParseContext) {
        self.trace.list_end(ctx);
    }

    fn list_item_start(&mut self, ctx: &mut ParseContext) {
        self.trace.list_item_start(ctx);
    }

    fn loose_item_start(&mut self, ctx: &mut ParseContext) {
        self.trace.loose_item_start(ctx);
    }

    fn list_item_end(&mut self, ctx: &mut ParseContext) {
        self.trace.list_item_end(ctx);
    }

    fn footnote_start(&mut self, ctx: &mut ParseContext, key: &str) {
        self.footnote_depth += 1;
        self.trace.footnote_start(ctx, key);
    }

    fn footnote_end(&mut self, ctx: &mut ParseContext, key: &str) {
        self.footnote_depth -= 1;
        self.trace.footnote_end(ctx, key);
    }

    fn paragraph(&mut self, ctx: &mut ParseContext, text: &str) {
        self.forward(ctx, text);
    }

    fn text_line(&mut self, ctx: &mut ParseContext, text: &str) {
        self.forward(ctx, text);
    }
}

#[test]
fn heading_document_emits_one_event() {
    assert_eq!(
        doc_events("# Title\n"),
        vec![TraceEvent::Heading {
            text: "Title".to_owned(),
            level: 1,
        }]
    );
}

#[rstest]
#[case("# a\n", 1)]
#[case("### a\n", 3)]
#[case("###### a\n", 6)]
fn atx_levels_span_one_through_six(#[case] text: &str, #[case] level: u8) {
    assert_eq!(
        doc_events(text),
        vec![TraceEvent::Heading {
            text: "a".to_owned(),
            level,
        }]
    );
}

#[test]
fn tight_list_item_bodies_arrive_as_text_lines() {
    assert_eq!(
        doc_events("* a\n* b\n"),
        vec![
            TraceEvent::ListStart { ordered: false },
            TraceEvent::ListItemStart,
            TraceEvent::TextLine { text: "a".to_owned() },
            TraceEvent::ListItemEnd,
            TraceEvent::ListItemStart,
            TraceEvent::TextLine { text: "b".to_owned() },
            TraceEvent::ListItemEnd,
            TraceEvent::ListEnd,
        ]
    );
}

#[test]
fn blank_separated_items_make_the_whole_list_loose() {
    assert_eq!(
        doc_events("* a\n\n* b\n"),
        vec![
            TraceEvent::ListStart { ordered: false },
            TraceEvent::LooseItemStart,
            TraceEvent::TextLine { text: "a".to_owned() },
            TraceEvent::ListItemEnd,
            TraceEvent::LooseItemStart,
            TraceEvent::TextLine { text: "b".to_owned() },
            TraceEvent::ListItemEnd,
            TraceEvent::ListEnd,
        ]
    );
}

#[test]
fn numbered_bullets_set_the_ordered_flag() {
    assert_eq!(
        doc_events("1. a\n2. b\n")[0],
        TraceEvent::ListStart { ordered: true }
    );
}

#[test]
fn fenced_code_carries_its_info_string() {
    assert_eq!(
        doc_events("```rust\nfn main() {}\n```\n"),
        vec![TraceEvent::Code {
            code: "fn main() {}".to_owned(),
            lang: Some("rust".to_owned()),
        }]
    );
}

#[test]
fn piped_table_event_as_json() {
    let events = doc_events("| a | b |\n| --- | --- |\n| 1 | 2 |\n");
    assert_eq!(
        serde_json::to_value(&events).unwrap(),
        json!([{
            "event": "table",
            "spec": {
                "header": ["a", "b"],
                "align": ["none", "none", "none"],
                "rows": [["1", "2"]],
            },
        }])
    );
}

#[test]
fn loose_table_rows_need_only_interior_pipes() {
    let events = doc_events("a | b\n--- | ---\n1 | 2\n");
    match &events[..] {
        [TraceEvent::Nptable { spec }] => {
            assert_eq!(spec.header, vec!["a", "b"]);
            assert_eq!(spec.rows, vec![vec!["1", "2"]]);
        }
        other => panic!("expected one nptable event, got {other:?}"),
    }
}

#[test]
fn empty_document_emits_nothing() {
    assert!(doc_events("").is_empty());
    assert!(doc_events("\n\n\n").is_empty());
}

#[test]
fn reference_link_resolves_after_a_defining_block_pass() {
    let doc = "[^n]: note text\n\nSee [x][1] and [^n].\n\n[1]: http://e.com \"T\"\n";

    // First pass registers the definitions that appear after their uses.
    let mut ctx = ParseContext::new();
    let mut defs = TraceRenderer::new();
    scan_document(doc, &mut ctx, &mut defs).unwrap();
    assert!(ctx.links.contains_key("1"));
    assert!(ctx.footnotes.contains_key("n"));

    // Second pass forwards paragraphs inline; the duplicate definitions
    // are consumed without events this time.
    let mut sink = ForwardRenderer::new();
    scan_document(doc, &mut ctx, &mut sink).unwrap();
    assert_eq!(
        sink.trace.events,
        vec![
            TraceEvent::Text {
                text: "See ".to_owned(),
            },
            TraceEvent::Link {
                url: "http://e.com".to_owned(),
                title: Some("T".to_owned()),
                content: "x".to_owned(),
            },
            TraceEvent::Text {
                text: " and ".to_owned(),
            },
            TraceEvent::FootnoteRef {
                key: "n".to_owned(),
                ordinal: 1,
            },
            TraceEvent::Text { text: ".".to_owned() },
        ]
    );
}

#[test]
fn undefined_reference_produces_no_events() {
    let mut ctx = ParseContext::new();
    let mut sink = ForwardRenderer::new();
    scan_document("[y][2]\n", &mut ctx, &mut sink).unwrap();
    assert!(sink.trace.events.is_empty());
}

#[test]
fn footnote_bodies_do_not_claim_their_own_key() {
    let doc = "[^a]: self [^a]\n\nref [^a]\n";
    let mut ctx = ParseContext::new();
    let mut sink = ForwardRenderer::new();
    scan_document(doc, &mut ctx, &mut sink).unwrap();
    assert_eq!(
        sink.trace.events,
        vec![
            TraceEvent::FootnoteStart { key: "a".to_owned() },
            TraceEvent::Text {
                text: "self ".to_owned(),
            },
            TraceEvent::FootnoteEnd { key: "a".to_owned() },
            TraceEvent::Text {
                text: "ref ".to_owned(),
            },
            TraceEvent::FootnoteRef {
                key: "a".to_owned(),
                ordinal: 1,
            },
        ]
    );
}

#[test]
fn empty_rule_set_fails_instead_of_spinning() {
    let scanner = BlockScanner::new();
    let mut ctx = ParseContext::new();
    let mut sink = TraceRenderer::new();
    let err = scanner.scan("text", &[], &mut ctx, &mut sink).unwrap_err();
    assert!(matches!(err, ScanError::NoMatch { .. }));
}

#[test]
fn mixed_document_event_snapshot() {
    let events = doc_events("# Title\n\n* one\n* two\n\n***\n");
    insta::assert_yaml_snapshot!(events, @r"
    - event: heading
      text: Title
      level: 1
    - event: list_start
      ordered: false
    - event: list_item_start
    - event: text_line
      text: one
    - event: list_item_end
    - event: list_item_start
    - event: text_line
      text: two
    - event: list_item_end
    - event: list_end
    - event: hrule
    ");
}

#[test]
fn pathological_inputs_scan_to_completion() {
    let inputs = vec![
        format!("{}deep\n", "> ".repeat(64)),
        format!("*{}", "a".repeat(100_000)),
        format!("**{}\n", "b".repeat(100_000)),
        "*_`~[!".repeat(512),
        format!("{}\n", "`".repeat(300)),
        "```rust\nnever closed\n".to_owned(),
        format!("[x]({}\n", "(".repeat(256)),
        format!("{}item\n", "  * ".repeat(32)),
        "[^a]: \u{3000} wide indent\n \u{3000}body\n".to_owned(),
        "~~ unclosed ~ tilde\n".to_owned(),
        "| a |\n| --- |\n| ".repeat(128),
    ];
    for input in &inputs {
        let mut ctx = ParseContext::new();
        let mut sink = ForwardRenderer::new();
        let head: String = input.chars().take(24).collect();
        scan_document(input, &mut ctx, &mut sink)
            .unwrap_or_else(|e| panic!("scan failed on {head:?}...: {e}"));
    }
}

#[test]
fn quote_wrapping_survives_forwarding() {
    let mut ctx = ParseContext::new();
    let mut sink = ForwardRenderer::new();
    scan_document("> **bold** words\n", &mut ctx, &mut sink).unwrap();
    assert_eq!(
        sink.trace.events,
        vec![
            TraceEvent::Bold {
                content: "bold".to_owned(),
            },
            TraceEvent::Text {
                text: " words".to_owned(),
            },
        ]
    );
}
