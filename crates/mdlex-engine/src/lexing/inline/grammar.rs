//! Compiled inline patterns and the span matchers that need backtracking.
//!
//! Emphasis, code spans and bracketed link text all depend on constructs
//! the `regex` crate rejects: delimiter backreferences, `(?!...)` after a
//! closing delimiter, and a lookahead that lets a stray `]` sit inside link
//! text. Each is a small hand scan that reproduces the lazy-with-backtrack
//! behavior of the corresponding pattern.

use regex::Regex;

/// A matched bracketed span: `[content]` with an optional leading `!`.
pub struct Bracketed<'a> {
    pub image: bool,
    pub content: &'a str,
    /// Offset just past the closing bracket.
    pub end: usize,
}

#[derive(Debug)]
pub struct InlineGrammar {
    pub escape: Regex,
    pub tag: Regex,
    pub autolink: Regex,
    pub url: Regex,
    pub nolink: Regex,
    pub footnote: Regex,
    pub strikethrough: Regex,
    pub em_underscore: Regex,
    pub linebreak_any: Regex,
    pub linebreak_trailing: Regex,
}

impl InlineGrammar {
    pub fn new() -> Self {
        Self {
            escape: Regex::new(r"^\\([\\`*{}\[\]()#+\-.!_>~|])").expect("Invalid escape pattern"),
            tag: Regex::new(r"^(?:<!--[\s\S]*?-->|</\w+>|<\w+[^>]*?>)")
                .expect("Invalid inline tag pattern"),
            autolink: Regex::new(r"^<([^ >]+(@|:/)[^ >]+)>").expect("Invalid autolink pattern"),
            url: Regex::new(r#"^(https?://[^\s<]+[^<.,:;"')\]\s])"#)
                .expect("Invalid bare URL pattern"),
            nolink: Regex::new(r"^!?\[((?:\[[^\]]*\]|[^\[\]])*)\]")
                .expect("Invalid shortcut link pattern"),
            footnote: Regex::new(r"^\[\^([^\]]+)\]").expect("Invalid footnote reference pattern"),
            strikethrough: Regex::new(r"^~~(\S(?:.*?\S)?)~~").expect("Invalid strikethrough pattern"),
            em_underscore: Regex::new(r"^\b_((?:__|.)+?)_\b")
                .expect("Invalid underscore emphasis pattern"),
            linebreak_any: Regex::new(r"^ *\n").expect("Invalid linebreak pattern"),
            linebreak_trailing: Regex::new(r"^ {2,}\n").expect("Invalid trailing-space pattern"),
        }
    }

    /// Matches `__content__` or `**content**` where the close is not
    /// followed by a third delimiter. Content is single-line and non-empty.
    pub fn double_emphasis<'a>(&self, text: &'a str) -> Option<(usize, &'a str)> {
        let b = text.as_bytes();
        let d = match b {
            [c @ (b'_' | b'*'), c2, ..] if c2 == c => *c,
            _ => return None,
        };
        for i in 3..b.len().saturating_sub(1) {
            if b[i - 1] == b'\n' {
                return None;
            }
            if b[i] == d && b[i + 1] == d && b.get(i + 2) != Some(&d) {
                return Some((i + 2, &text[2..i]));
            }
        }
        None
    }

    /// Matches `*content*` where the close is a single star. Paired `**`
    /// inside the content is preferred over closing, matching the grammar's
    /// `(?:\*\*|.)+?` unit order.
    ///
    /// Computed right to left: `f1`/`f2` carry the close reachable when the
    /// scan resumes one or two positions further on, so the split-and-retry
    /// a `**` unit needs costs no recursion and the scan stays linear in
    /// the line length.
    pub fn star_emphasis<'a>(&self, text: &'a str) -> Option<(usize, &'a str)> {
        let b = text.as_bytes();
        if b.first() != Some(&b'*') || b.len() < 2 {
            return None;
        }
        let mut f1: Option<usize> = None;
        let mut f2: Option<usize> = None;
        for p in (1..b.len()).rev() {
            let next_star = b.get(p + 1) == Some(&b'*');
            let reachable = if b[p] == b'*' && next_star {
                // pair unit: skip both stars, or split and let the second
                // star close further on
                f2.or(f1)
            } else if b[p] == b'\n' {
                None
            } else {
                f1
            };
            if p == 1 {
                // the first content position is always consumed as a unit,
                // never used as a close, so an empty span cannot match
                let close = reachable?;
                return Some((close + 1, &text[1..close]));
            }
            f2 = f1;
            f1 = if b[p] == b'*' && !next_star {
                Some(p)
            } else {
                reachable
            };
        }
        None
    }

    /// Matches a backtick code span. The close must repeat the opening run
    /// length exactly; a shorter opening run is retried when the full run
    /// finds no close.
    pub fn code_span<'a>(&self, text: &'a str) -> Option<(usize, &'a str)> {
        let max = text.bytes().take_while(|&c| c == b'`').count();
        if max == 0 {
            return None;
        }
        for n in (1..=max).rev() {
            if let Some(hit) = code_span_with(text, n) {
                return Some(hit);
            }
        }
        None
    }

    /// Matches the `[content]` head shared by the three link rules.
    pub fn bracketed<'a>(&self, text: &'a str) -> Option<Bracketed<'a>> {
        let image = text.starts_with('!');
        let skip = usize::from(image);
        let rest = text[skip..].strip_prefix('[')?;
        let close = bracket_text(rest)?;
        Some(Bracketed {
            image,
            content: &rest[..close],
            end: skip + 1 + close + 1,
        })
    }

    /// Length of the plain-text run starting here: everything up to the
    /// next character that could open another span, the next bare URL, or a
    /// line-break position.
    pub fn text_run(&self, text: &str, hard_wrap: bool) -> usize {
        let b = text.as_bytes();
        let mut it = text.char_indices();
        it.next();
        for (i, c) in it {
            match c {
                '\\' | '<' | '!' | '[' | '_' | '*' | '`' | '~' => return i,
                '\n' if hard_wrap => return i,
                ' ' => {
                    let mut j = i + 1;
                    while j < b.len() && b[j] == b' ' {
                        j += 1;
                    }
                    if j < b.len() && b[j] == b'\n' && (hard_wrap || j - i >= 2) {
                        return i;
                    }
                }
                'h' => {
                    let rest = &text[i..];
                    if rest.starts_with("http://") || rest.starts_with("https://") {
                        return i;
                    }
                }
                _ => {}
            }
        }
        text.len()
    }
}

impl Default for InlineGrammar {
    fn default() -> Self {
        Self::new()
    }
}

fn code_span_with(text: &str, n: usize) -> Option<(usize, &str)> {
    let b = text.as_bytes();
    let mut i = n;
    while i < b.len() {
        if b[i] != b'`' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < b.len() && b[i] == b'`' {
            i += 1;
        }
        if i - run_start != n {
            continue;
        }
        let s = text[n..run_start].trim_start();
        let trimmed = s.trim_end();
        if trimmed.is_empty() {
            // Whitespace-only interior: the last non-newline character is
            // the span and the rest is delimiter padding.
            let interior = &text[n..run_start];
            if let Some((idx, c)) = interior.char_indices().rev().find(|&(_, c)| c != '\n') {
                return Some((i, &interior[idx..idx + c.len_utf8()]));
            }
            continue;
        }
        let content = if trimmed.ends_with('`') {
            // the delimiter may not touch a content backtick; one
            // whitespace character stays attached
            let extra = s[trimmed.len()..].chars().next().map_or(0, char::len_utf8);
            &s[..trimmed.len() + extra]
        } else {
            trimmed
        };
        if content.contains('\n') {
            return None;
        }
        return Some((i, content));
    }
    None
}

/// Finds the `]` closing a link-text span. Nested `[...]` pairs must be
/// free of `^` and nested brackets; a stray `]` is absorbed when another
/// `]` follows it with no `[` in between.
fn bracket_text(t: &str) -> Option<usize> {
    let b = t.as_bytes();
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'[' => {
                let mut j = i + 1;
                while j < b.len() && b[j] != b']' && b[j] != b'^' {
                    j += 1;
                }
                if j >= b.len() || b[j] != b']' {
                    return None;
                }
                i = j + 1;
            }
            b']' => {
                let absorb = b[i + 1..]
                    .iter()
                    .take_while(|&&c| c != b'[')
                    .any(|&c| c == b']');
                if absorb {
                    i += 1;
                } else {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Matches the `target "title"` tail of an inline link, starting just past
/// the opening parenthesis. Returns the offset just past the closing `)`,
/// the target and the optional title.
///
/// The target grows lazily: the shortest target for which the remainder
/// reads as an optional quoted title followed by `)` wins, so a title may
/// contain closing parentheses.
pub(crate) fn link_tail(t: &str) -> Option<(usize, &str, Option<&str>)> {
    let stripped = t.trim_start();
    let mut start = t.len() - stripped.len();
    if stripped.starts_with('<') {
        start += 1;
    }
    let bounds = t[start..]
        .char_indices()
        .map(|(i, _)| start + i)
        .chain(std::iter::once(t.len()));
    for end in bounds {
        let target = &t[start..end];
        let rest = &t[end..];
        // an angle-bracketed target may close here; the bare form is
        // still tried when the rest does not parse past the bracket
        let candidates = match rest.strip_prefix('>') {
            Some(r) => [Some(r), Some(rest)],
            None => [Some(rest), None],
        };
        for r in candidates.into_iter().flatten() {
            if let Some((used, title)) = title_then_close(r) {
                return Some((t.len() - r.len() + used, target, Some(title)));
            }
            let after_ws = r.trim_start();
            if after_ws.starts_with(')') {
                return Some((t.len() - after_ws.len() + 1, target, None));
            }
        }
    }
    None
}

/// Matches ` "title")` with either quote kind, title growing lazily to the
/// first quote that a close parenthesis follows.
fn title_then_close(r: &str) -> Option<(usize, &str)> {
    let after = r.trim_start();
    if after.len() == r.len() {
        return None;
    }
    let q = after.chars().next()?;
    if q != '"' && q != '\'' {
        return None;
    }
    let body = &after[1..];
    let mut search = 0;
    while let Some(k) = body[search..].find(q) {
        let pos = search + k;
        let tail = body[pos + q.len_utf8()..].trim_start();
        if tail.starts_with(')') {
            return Some((r.len() - tail.len() + 1, &body[..pos]));
        }
        search = pos + q.len_utf8();
    }
    None
}
