// origin.rs — Code origins and the matchers policy entries use for them.
//
// An origin says where executing code came from: a location (URL or path)
// plus the set of signer identities whose signatures were verified by the
// embedding system. Warden never checks signatures itself; it only compares
// the names it is handed.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::pattern::TargetPattern;

/// Where the code behind a security context came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeOrigin {
    /// Code location, e.g. `"file:/opt/app/lib/core.jar"`.
    #[serde(default)]
    pub location: Option<String>,
    /// Verified signer identities.
    #[serde(default)]
    pub signers: BTreeSet<String>,
}

impl CodeOrigin {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            signers: BTreeSet::new(),
        }
    }

    /// An origin with no known location.
    pub fn unlocated() -> Self {
        Self::default()
    }

    pub fn signed_by(mut self, signer: impl Into<String>) -> Self {
        self.signers.insert(signer.into());
        self
    }
}

impl fmt::Display for CodeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.location.as_deref().unwrap_or("<no location>"))?;
        if self.signers.is_empty() {
            f.write_str(" <no signers>)")
        } else {
            let signers: Vec<&str> = self.signers.iter().map(String::as_str).collect();
            write!(f, " signed by {})", signers.join(", "))
        }
    }
}

/// The configured side of the origin check.
///
/// `implies(origin)` means every subject with `origin` satisfies this matcher.
pub trait OriginMatcher: fmt::Display + Send + Sync {
    fn implies(&self, origin: &CodeOrigin) -> bool;
}

/// Reference matcher: a location glob plus a set of required signers.
///
/// - No location: any location matches, including none.
/// - Location glob: the origin must have a location, free of `..` segments,
///   that the glob matches.
/// - Every required signer must be present on the origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginPattern {
    #[serde(default)]
    pub location: Option<TargetPattern>,
    #[serde(default)]
    pub signers: BTreeSet<String>,
}

impl OriginPattern {
    /// Compiles `location` as a glob; fails on a malformed pattern.
    pub fn new(location: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            location: Some(TargetPattern::new(location)?),
            signers: BTreeSet::new(),
        })
    }

    /// Matches any location; only signers are checked.
    pub fn any_location() -> Self {
        Self::default()
    }

    pub fn signed_by(mut self, signer: impl Into<String>) -> Self {
        self.signers.insert(signer.into());
        self
    }
}

impl OriginMatcher for OriginPattern {
    fn implies(&self, origin: &CodeOrigin) -> bool {
        if let Some(pattern) = &self.location {
            let Some(location) = origin.location.as_deref() else {
                return false;
            };
            if !pattern.matches(location) {
                return false;
            }
        }
        self.signers.is_subset(&origin.signers)
    }
}

impl fmt::Display for OriginPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self
            .location
            .as_ref()
            .map_or("<any location>", TargetPattern::as_str);
        write!(f, "({}", location)?;
        if self.signers.is_empty() {
            f.write_str(" <no signers>)")
        } else {
            let signers: Vec<&str> = self.signers.iter().map(String::as_str).collect();
            write!(f, " signed by {})", signers.join(", "))
        }
    }
}
