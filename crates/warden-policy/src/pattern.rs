// pattern.rs — Compiled glob patterns for permission targets and origin locations.
//
// Patterns are compiled once when a permission or origin matcher is built, so
// `implies` only runs the matcher. Matching is separator-aware: `*` stays
// inside one path segment, `**` crosses segments.
//
// Any candidate containing a `..` segment (raw or percent-encoded) is refused
// before the glob runs, so `/srv/data/**` never covers
// `/srv/data/../../etc/shadow`.

use std::fmt;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A glob pattern compiled at construction time.
///
/// Serialized as its source string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetPattern {
    raw: String,
    compiled: Pattern,
}

impl TargetPattern {
    pub fn new(pattern: &str) -> Result<Self, PolicyError> {
        let compiled = Pattern::new(pattern).map_err(|e| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Does `candidate` fall under this pattern?
    ///
    /// Candidates with a traversal segment never match.
    pub fn matches(&self, candidate: &str) -> bool {
        !contains_path_traversal(candidate) && self.compiled.matches_with(candidate, MATCH_OPTIONS)
    }
}

impl TryFrom<String> for TargetPattern {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<TargetPattern> for String {
    fn from(pattern: TargetPattern) -> Self {
        pattern.raw
    }
}

impl fmt::Display for TargetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Detect `..` path segments, including `%2e%2e` in either case.
///
/// Segments are split on `/` and `\`; a file named `notes..txt` is fine.
pub fn contains_path_traversal(candidate: &str) -> bool {
    candidate
        .split(['/', '\\'])
        .any(|segment| segment == ".." || segment.eq_ignore_ascii_case("%2e%2e"))
}
