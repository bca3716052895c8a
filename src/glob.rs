//! Shell-style wildcard matching for artifact names
//!
//! `*` matches any run of characters (including none), `?` matches exactly one
//! character. Everything else is literal. Matching is case-insensitive and must
//! cover the whole candidate, so `*.txt` does not match `a.txt.bak`.

use regex::{Regex, RegexBuilder};

/// A compiled wildcard pattern
#[derive(Clone, Debug)]
pub struct GlobPattern {
    pattern: String,
    matcher: Matcher,
}

#[derive(Clone, Debug)]
enum Matcher {
    Any,
    Regex(Regex),
    Nothing,
}

impl GlobPattern {
    /// Compile a wildcard pattern.
    ///
    /// An empty pattern and `*` both accept every candidate. A pattern that
    /// cannot be compiled (e.g. one that exceeds the regex size limit) accepts
    /// nothing.
    pub fn new(pattern: &str) -> Self {
        let matcher = if pattern.is_empty() || pattern == "*" {
            Matcher::Any
        } else {
            match RegexBuilder::new(&to_regex(pattern))
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
            {
                Ok(regex) => Matcher::Regex(regex),
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "glob pattern could not be compiled, nothing will match");
                    Matcher::Nothing
                }
            }
        };

        Self {
            pattern: pattern.to_string(),
            matcher,
        }
    }

    /// The pattern as it was given
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Check whether `candidate` matches this pattern
    pub fn is_match(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Any => true,
            Matcher::Regex(regex) => regex.is_match(candidate),
            Matcher::Nothing => false,
        }
    }
}

impl Default for GlobPattern {
    fn default() -> Self {
        Self::new("*")
    }
}

/// Check a single candidate against a wildcard pattern.
///
/// Compiles the pattern on every call; use [`GlobPattern`] when matching many
/// candidates against the same pattern.
///
/// # Examples
///
/// ```
/// use tcad::glob::matches;
///
/// assert!(matches("a.TXT", "*.txt"));
/// assert!(matches("archive.tar.gz", "*.gz"));
/// assert!(!matches("a.txt", "?.txt.bak"));
/// ```
pub fn matches(candidate: &str, pattern: &str) -> bool {
    GlobPattern::new(pattern).is_match(candidate)
}

/// Escape the pattern, then re-introduce the two wildcards
fn to_regex(pattern: &str) -> String {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    format!("^{escaped}$")
}
