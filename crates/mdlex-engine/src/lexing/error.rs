//! Scanner failure modes.

/// The number of characters of remaining input quoted in a no-match error.
const SNIPPET_LEN: usize = 40;

/// Errors surfaced by the block and inline scanners.
///
/// A well-formed grammar ends with a catch-all rule, so `NoMatch` indicates a
/// grammar bug (a rule list without a final text rule, or a rule that matched
/// zero characters), not malformed input. Scanning stops immediately rather
/// than skipping a character, which would silently drop input.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("no rule matched remaining input starting at: {snippet:?}")]
    NoMatch { snippet: String },
}

impl ScanError {
    pub(crate) fn no_match(remaining: &str) -> Self {
        let snippet = match remaining.char_indices().nth(SNIPPET_LEN) {
            Some((idx, _)) => remaining[..idx].to_owned(),
            None => remaining.to_owned(),
        };
        ScanError::NoMatch { snippet }
    }
}
