// set.rs — Reference aggregation of many entries into one decision.
//
// A single entry only says "my conditions match and I hold the permission".
// `PolicySet` asks every entry and resolves grant vs deny:
//
// - grant and deny both match → `Priority` decides
// - only grant entries match   → Granted
// - only deny entries match    → Denied
// - nothing matches            → NotApplicable
//
// Embedders with different aggregation rules can skip this and iterate
// entries themselves.

use serde::{Deserialize, Serialize};

use crate::config::EvaluatorConfig;
use crate::context::SecurityContext;
use crate::entry::{Polarity, PolicyEntry};
use crate::permission::Permission;

/// Which polarity wins a conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Deny,
    Grant,
}

/// Outcome of asking a whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    Granted,
    Denied,
    NotApplicable,
}

/// An ordered collection of loaded entries.
#[derive(Debug, Default)]
pub struct PolicySet {
    priority: Priority,
    entries: Vec<PolicyEntry>,
}

impl PolicySet {
    pub fn new(priority: Priority) -> Self {
        Self {
            priority,
            entries: Vec::new(),
        }
    }

    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.priority)
    }

    pub fn push(&mut self, entry: PolicyEntry) {
        self.entries.push(entry);
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn decide(&self, context: &dyn SecurityContext, permission: &dyn Permission) -> PolicyDecision {
        let mut granted = false;
        let mut denied = false;

        for entry in &self.entries {
            let seen = match entry.polarity() {
                Polarity::Grant => &mut granted,
                Polarity::Deny => &mut denied,
            };
            // One match per polarity is enough.
            if !*seen && entry.implies(context, permission) {
                *seen = true;
            }
            let decisive = match self.priority {
                Priority::Deny => denied,
                Priority::Grant => granted,
            };
            if decisive {
                break;
            }
        }

        let decision = match (granted, denied) {
            (true, true) => match self.priority {
                Priority::Deny => PolicyDecision::Denied,
                Priority::Grant => PolicyDecision::Granted,
            },
            (true, false) => PolicyDecision::Granted,
            (false, true) => PolicyDecision::Denied,
            (false, false) => PolicyDecision::NotApplicable,
        };
        tracing::trace!(?decision, "policy set decided for {}", permission);
        decision
    }

    pub fn is_granted(&self, context: &dyn SecurityContext, permission: &dyn Permission) -> bool {
        self.decide(context, permission) == PolicyDecision::Granted
    }
}
