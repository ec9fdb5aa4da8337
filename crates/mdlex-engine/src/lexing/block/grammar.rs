//! Compiled block-level patterns and the matchers that need more than a
//! regular expression.
//!
//! Four constructs cannot be expressed in the `regex` crate because the
//! grammar relies on backreferences or lookaround: fenced code (the closing
//! fence must repeat the opening delimiter exactly), list blocks (the
//! terminator peeks at what follows without consuming it), raw HTML blocks
//! (the closing tag must repeat the opening tag name) and paragraphs (each
//! line peeks ahead for an interrupting construct). Those are hand-written
//! scans over the input that reproduce the backtracking the patterns would
//! perform.

use regex::Regex;

/// Tag names that are inline-level and therefore never open an HTML block.
const INLINE_TAGS: &[&str] = &[
    "a", "em", "strong", "small", "s", "cite", "q", "dfn", "abbr", "data", "time", "code", "var",
    "samp", "kbd", "sub", "sup", "i", "b", "u", "mark", "ruby", "rt", "rp", "bdi", "bdo", "span",
    "br", "wbr", "ins", "del", "img",
];

/// Elements whose raw content must not be reflowed by a backend.
const PRE_TAGS: &[&str] = &["pre", "script", "style"];

/// A successful fenced-code match.
pub struct FencedCode<'a> {
    pub len: usize,
    pub lang: Option<&'a str>,
    pub body: &'a str,
}

#[derive(Debug)]
pub struct BlockGrammar {
    pub blank: Regex,
    pub hrule: Regex,
    pub indented_code: Regex,
    pub atx_heading: Regex,
    pub setext_heading: Regex,
    pub block_quote: Regex,
    pub link_def: Regex,
    pub footnote_def: Regex,
    pub table: Regex,
    pub nptable: Regex,
    pub text: Regex,
    pub bullet_start: Regex,
    pub bullet_prefix: Regex,
    pub bullet_marker: Regex,
    code_indent: Regex,
    quote_prefix: Regex,
    fence_open: Regex,
    hrule_tail: Regex,
}

impl BlockGrammar {
    pub fn new() -> Self {
        Self {
            blank: Regex::new(r"^\n+").expect("Invalid blank-line pattern"),
            hrule: Regex::new(r"^ {0,3}[-*_](?: *[-*_]){2,} *(?:\n+|$)")
                .expect("Invalid hrule pattern"),
            indented_code: Regex::new(r"^(?: {4}[^\n]+\n*)+")
                .expect("Invalid indented-code pattern"),
            atx_heading: Regex::new(r"^ *(#{1,6}) *([^\n]+?) *#* *(?:\n+|$)")
                .expect("Invalid heading pattern"),
            setext_heading: Regex::new(r"^([^\n]+)\n *(=|-)+ *(?:\n+|$)")
                .expect("Invalid setext heading pattern"),
            block_quote: Regex::new(r"^( *>[^\n]+(\n[^\n]+)*\n*)+")
                .expect("Invalid block-quote pattern"),
            link_def: Regex::new(
                r#"^ *\[([^\^\]]+)\]: *<?([^\s>]+)>?(?: +["(]([^\n]+)[")])? *(?:\n+|$)"#,
            )
            .expect("Invalid link-definition pattern"),
            footnote_def: Regex::new(r"^\[\^([^\]]+)\]: *([^\n]*(?:\n+|$)(?: +[^\n]*(?:\n+|$))*)")
                .expect("Invalid footnote-definition pattern"),
            table: Regex::new(r"^ *\|(.+)\n *\|( *[-:]+[-| :]*)\n((?: *\|.*(?:\n|$))*)\n*")
                .expect("Invalid table pattern"),
            nptable: Regex::new(r"^ *(\S.*\|.*)\n *([-:]+ *\|[-| :]*)\n((?:.*\|.*(?:\n|$))*)\n*")
                .expect("Invalid nptable pattern"),
            text: Regex::new(r"^[^\n]+").expect("Invalid text pattern"),
            bullet_start: Regex::new(r"^( *)([*+-]|\d+\.) ").expect("Invalid bullet pattern"),
            bullet_prefix: Regex::new(r"^ *(?:[*+-]|\d+\.) +")
                .expect("Invalid bullet-prefix pattern"),
            bullet_marker: Regex::new(r"^(?:[*+-]|\d+\.) ").expect("Invalid bullet-marker pattern"),
            code_indent: Regex::new(r"(?m)^ {4}").expect("Invalid code-indent pattern"),
            quote_prefix: Regex::new(r"(?m)^ *> ?").expect("Invalid quote-prefix pattern"),
            fence_open: Regex::new(r"^ *(`{3,}|~{3,}) *(\S+)? *\n").expect("Invalid fence pattern"),
            hrule_tail: Regex::new(r"^(?:[-*_] *){3,}(?:\n+|$)")
                .expect("Invalid hrule-tail pattern"),
        }
    }

    /// Removes the four-space indent from every line of an indented code
    /// capture.
    pub fn strip_code_indent(&self, code: &str) -> String {
        self.code_indent.replace_all(code, "").into_owned()
    }

    /// Removes the `> ` prefix from every line of a block-quote capture.
    pub fn strip_quote_prefix(&self, quote: &str) -> String {
        self.quote_prefix.replace_all(quote, "").into_owned()
    }

    /// Matches a fenced code block: an opening run of three or more
    /// backticks or tildes with an optional info string, a non-empty body
    /// and a closing run repeating the opening delimiter exactly.
    pub fn fenced_code<'a>(&self, text: &'a str) -> Option<FencedCode<'a>> {
        let caps = self.fence_open.captures(text)?;
        let open_end = caps.get(0).map(|m| m.end())?;
        let delim = caps.get(1).map(|m| m.as_str())?;
        let lang = caps.get(2).map(|m| m.as_str());
        let rest = &text[open_end..];
        let bytes = rest.as_bytes();
        let d0 = delim.as_bytes()[0];
        // Earliest viable close wins; candidates inside a longer delimiter
        // run are tried at every offset so that e.g. four backticks can
        // still close a three-backtick fence.
        let mut k = 1;
        while k + delim.len() <= rest.len() {
            if bytes[k] == d0 && rest[k..].starts_with(delim) {
                let mut p = k + delim.len();
                while p < rest.len() && bytes[p] == b' ' {
                    p += 1;
                }
                let nl_start = p;
                while p < rest.len() && bytes[p] == b'\n' {
                    p += 1;
                }
                if p == rest.len() || p > nl_start {
                    return Some(FencedCode {
                        len: open_end + p,
                        lang,
                        body: rest[..k].trim_end(),
                    });
                }
            }
            k += 1;
        }
        None
    }

    /// Matches a list block: a bullet line plus everything up to the first
    /// terminator. A run of newlines terminates the block when it is
    /// followed by a horizontal rule, a link or footnote definition, or
    /// (for a run of two or more) by a line that is neither indented nor a
    /// sibling bullet; otherwise the block runs to the end of the text.
    pub fn list_block(&self, text: &str) -> Option<(usize, bool)> {
        let caps = self.bullet_start.captures(text)?;
        let indent = caps.get(1).map(|m| m.as_str())?;
        let ordered = caps.get(2).map(|m| m.as_str().contains('.'))?;
        let prefix_end = caps.get(0).map(|m| m.end())?;
        let bytes = text.as_bytes();
        let mut end = text.len();
        let mut i = prefix_end;
        while i < text.len() {
            if bytes[i] != b'\n' {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < text.len() && bytes[j] == b'\n' {
                j += 1;
            }
            let n = j - i;
            let rem = &text[j..];
            let hr = rem.strip_prefix(indent).unwrap_or(rem);
            if self.hrule_tail.is_match(hr)
                || self.link_def.is_match(rem)
                || self.footnote_def.is_match(rem)
            {
                end = j;
                break;
            }
            // A run of three or more newlines always splits; a run of two
            // splits unless the next line is indented or a sibling bullet.
            let sibling = rem
                .strip_prefix(indent)
                .is_some_and(|r| self.bullet_marker.is_match(r));
            if n >= 3 || (n == 2 && !rem.starts_with(' ') && !sibling) {
                end = j;
                break;
            }
            if text[i..].chars().all(char::is_whitespace) {
                end = text.len();
                break;
            }
            i = j;
        }
        (end > prefix_end).then_some((end, ordered))
    }

    /// Matches a raw HTML block: a comment, a paired block-level element or
    /// a standalone open tag, followed by a blank line or the end of the
    /// text.
    pub fn block_html(&self, text: &str) -> Option<(usize, bool)> {
        let trimmed = text.trim_start_matches(' ');
        let lead = text.len() - trimmed.len();
        if let Some(rest) = trimmed.strip_prefix("<!--") {
            let close = rest.find("-->")?;
            let end = lead + 4 + close + 3;
            let tail = html_tail(&text[end..])?;
            return Some((end + tail, false));
        }
        let name = html_block_tag(trimmed)?;
        let pre = PRE_TAGS.contains(&name);
        let after_name = lead + 1 + name.len();

        // Paired element: earliest close tag whose tail fits wins.
        let close_tag = format!("</{name}>");
        let hay = &text[after_name..];
        for (pos, _) in hay.match_indices(&close_tag) {
            if pos == 0 {
                continue;
            }
            let end = after_name + pos + close_tag.len();
            if let Some(tail) = html_tail(&text[end..]) {
                return Some((end + tail, pre));
            }
        }

        // Standalone open tag: scan to the closing angle bracket, skipping
        // quoted attribute values.
        let bytes = text.as_bytes();
        let mut i = after_name;
        while i < text.len() {
            match bytes[i] {
                b'>' => {
                    let end = i + 1;
                    let tail = html_tail(&text[end..])?;
                    // Only a balanced pair carries the pre flag; an open tag
                    // on its own does not fence raw content.
                    return Some((end + tail, false));
                }
                q @ (b'"' | b'\'') => {
                    let close = text[i + 1..].as_bytes().iter().position(|&c| c == q)?;
                    i += 1 + close + 1;
                }
                _ => i += 1,
            }
        }
        None
    }

    /// Matches a paragraph: consecutive non-blank lines, stopping after any
    /// line that is followed by an interrupting construct, plus the trailing
    /// newline run.
    pub fn paragraph(&self, text: &str) -> Option<usize> {
        let bytes = text.as_bytes();
        let mut pos = 0;
        loop {
            let line_end = text[pos..].find('\n').map_or(text.len(), |k| pos + k);
            if line_end == pos {
                break;
            }
            pos = line_end;
            if pos == text.len() {
                break;
            }
            pos += 1;
            if self.interrupts(&text[pos..]) {
                break;
            }
        }
        if pos == 0 {
            return None;
        }
        while pos < text.len() && bytes[pos] == b'\n' {
            pos += 1;
        }
        Some(pos)
    }

    /// True when `rest` opens a construct that cuts a paragraph short.
    /// Tables deliberately do not interrupt paragraphs.
    fn interrupts(&self, rest: &str) -> bool {
        self.hrule.is_match(rest)
            || self.atx_heading.is_match(rest)
            || self.setext_heading.is_match(rest)
            || self.block_quote.is_match(rest)
            || self.link_def.is_match(rest)
            || self.footnote_def.is_match(rest)
            || self.fenced_code(rest).is_some()
            || self.list_block(rest).is_some()
            || html_block_tag(rest).is_some()
    }
}

impl Default for BlockGrammar {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts a block-level tag name from text starting at `<`. Inline-level
/// tags, protocol-like names (`foo:/`) and email-like runs are rejected.
fn html_block_tag(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('<')?;
    let end = rest
        .char_indices()
        .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
        .map_or(rest.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    let name = &rest[..end];
    if INLINE_TAGS.contains(&name) {
        return None;
    }
    let after = &rest[end..];
    if after.starts_with(":/") {
        return None;
    }
    for c in after.chars() {
        if c == '@' {
            return None;
        }
        if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
            break;
        }
    }
    Some(name)
}

/// Consumes the whitespace that must follow an HTML block: optional spaces,
/// then either two or more newlines or nothing but whitespace to the end.
fn html_tail(rest: &str) -> Option<usize> {
    let after = rest.trim_start_matches(' ');
    let spaces = rest.len() - after.len();
    let newlines = after.len() - after.trim_start_matches('\n').len();
    if newlines >= 2 {
        return Some(spaces + newlines);
    }
    if after.chars().all(char::is_whitespace) {
        return Some(rest.len());
    }
    None
}
