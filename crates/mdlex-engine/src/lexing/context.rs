//! Document-wide reference tables shared by the block and inline scanners.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Normalizes a reference key: lowercase, internal whitespace runs collapsed
/// to a single space.
pub fn keyify(key: &str) -> String {
    static KEY_WS: OnceLock<Regex> = OnceLock::new();
    let ws = KEY_WS.get_or_init(|| Regex::new(r"\s+").expect("Invalid key whitespace regex"));
    ws.replace_all(&key.to_lowercase(), " ").into_owned()
}

/// A link definition registered by `[key]: target "title"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDef {
    pub url: String,
    pub title: Option<String>,
}

/// Mutable parse state threaded through every scan call.
///
/// Created empty by the caller and alive for the whole document parse, so
/// that definitions anywhere in the raw text are visible to references
/// anywhere else, including references that appear earlier than their
/// definition.
///
/// The block scanner populates both tables; the inline scanner reads them
/// and claims footnote ordinals. A footnote ordinal of `0` means the key is
/// defined but not yet referenced.
#[derive(Debug, Default)]
pub struct ParseContext {
    pub links: HashMap<String, LinkDef>,
    pub footnotes: HashMap<String, usize>,
    footnote_index: usize,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a link definition. Later definitions overwrite earlier ones.
    pub fn define_link(&mut self, key: &str, def: LinkDef) {
        self.links.insert(keyify(key), def);
    }

    /// Registers a footnote definition. Returns `false` if the key was
    /// already defined (the first definition wins; redefinitions are
    /// tolerated and ignored).
    pub fn define_footnote(&mut self, key: &str) -> bool {
        let key = keyify(key);
        if self.footnotes.contains_key(&key) {
            return false;
        }
        self.footnotes.insert(key, 0);
        true
    }

    /// Assigns the next ordinal to `key` if it is defined and has not been
    /// referenced yet. Ordinals start at 1 and increase in the order
    /// references are scanned, independent of definition order.
    ///
    /// Returns `None` for unknown keys and for keys that already carry an
    /// ordinal; the caller emits no event in either case.
    pub fn claim_footnote(&mut self, key: &str) -> Option<usize> {
        let slot = self.footnotes.get_mut(key)?;
        if *slot != 0 {
            return None;
        }
        self.footnote_index += 1;
        *slot = self.footnote_index;
        Some(self.footnote_index)
    }
}
