// principal.rs — Active principals and the patterns policy entries match them with.
//
// A policy entry lists principal requirements as (class, name) pairs. Either
// half may be a wildcard. The active side is a trait so the embedding system
// can hand over its own identity types (roles, users, service accounts).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Wildcard marker used in the textual form of a pattern.
pub const WILDCARD: &str = "*";

/// An identity claim active in the current security context.
///
/// `type_name` is the principal's declared implementation type (for example
/// `"RoleType"`); `name` is its identity value (for example `"admin"`).
pub trait Principal: fmt::Display + Send + Sync {
    fn type_name(&self) -> &str;
    fn name(&self) -> &str;
}

/// Plain principal carrying a type name and an identity value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicPrincipal {
    pub type_name: String,
    pub name: String,
}

impl BasicPrincipal {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl Principal for BasicPrincipal {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BasicPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.type_name, self.name)
    }
}

/// One half of a principal pattern: either an exact value or a wildcard.
///
/// Serialized as a plain string, with `"*"` standing for the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NamePattern {
    Literal(String),
    Wildcard,
}

impl NamePattern {
    /// Parse the textual form: `"*"` is the wildcard, anything else is literal.
    pub fn parse(value: &str) -> Self {
        if value == WILDCARD {
            NamePattern::Wildcard
        } else {
            NamePattern::Literal(value.to_string())
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, NamePattern::Wildcard)
    }

    /// Does `value` satisfy this pattern?
    pub fn matches(&self, value: &str) -> bool {
        match self {
            NamePattern::Wildcard => true,
            NamePattern::Literal(expected) => expected == value,
        }
    }
}

impl From<String> for NamePattern {
    fn from(value: String) -> Self {
        if value == WILDCARD {
            NamePattern::Wildcard
        } else {
            NamePattern::Literal(value)
        }
    }
}

impl From<NamePattern> for String {
    fn from(pattern: NamePattern) -> Self {
        match pattern {
            NamePattern::Literal(value) => value,
            NamePattern::Wildcard => WILDCARD.to_string(),
        }
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::Literal(value) => f.write_str(value),
            NamePattern::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// A principal requirement configured on a policy entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalPattern {
    pub class_name: NamePattern,
    pub principal_name: NamePattern,
}

impl PrincipalPattern {
    pub fn new(class_name: NamePattern, principal_name: NamePattern) -> Self {
        Self {
            class_name,
            principal_name,
        }
    }

    /// Exact class and exact identity.
    pub fn literal(class_name: impl Into<String>, principal_name: impl Into<String>) -> Self {
        Self::new(
            NamePattern::Literal(class_name.into()),
            NamePattern::Literal(principal_name.into()),
        )
    }

    /// Exact class, any identity.
    pub fn any_name(class_name: impl Into<String>) -> Self {
        Self::new(NamePattern::Literal(class_name.into()), NamePattern::Wildcard)
    }

    pub fn has_wildcard_class(&self) -> bool {
        self.class_name.is_wildcard()
    }

    pub fn has_wildcard_name(&self) -> bool {
        self.principal_name.is_wildcard()
    }

    /// Does a single active principal satisfy this pattern?
    ///
    /// A wildcard class name is satisfied by any principal without looking at
    /// `principal_name`, so `* "admin"` accepts a principal named "user".
    pub fn matches(&self, principal: &dyn Principal) -> bool {
        if self.has_wildcard_class() {
            return true;
        }
        self.class_name.matches(principal.type_name())
            && self.principal_name.matches(principal.name())
    }

    /// Reject patterns a parser should never have produced.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match &self.class_name {
            NamePattern::Literal(class) if class.trim().is_empty() => {
                Err(PolicyError::InvalidPattern {
                    pattern: self.to_string(),
                    reason: "class name must be a type name or '*'".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PrincipalPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.class_name, self.principal_name)
    }
}
