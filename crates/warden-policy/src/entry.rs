// entry.rs — A single policy entry and its evaluation.
//
// `PolicyEntry::implies()` answers "do this entry's conditions match, and does
// it hold the requested permission?" as a strict three-stage AND:
//
// 1. never_implies set? → false
// 2. Origin: entry origin present AND active origin present → must imply
// 3. Principals: every pattern needs at least one satisfying active principal
// 4. Permissions: delegate to the owned collection
//
// Absent origins and empty pattern lists are skipped, never failures. The
// grant/deny polarity only shows up in diagnostics; the caller decides what a
// match means.
//
// Entries are built with `PolicyEntryBuilder` and frozen by `build()`. A built
// entry has no interior mutability and is shared freely across threads.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EvaluatorConfig;
use crate::context::SecurityContext;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::origin::OriginMatcher;
use crate::permission::{Permission, PermissionCollection, Permissions};
use crate::principal::PrincipalPattern;

/// Whether a matching entry grants or denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Grant,
    Deny,
}

impl Polarity {
    /// Word used when listing an entry's permissions in diagnostics.
    pub fn verb(&self) -> &'static str {
        match self {
            Polarity::Grant => "granting",
            Polarity::Deny => "denying",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Grant => write!(f, "grant"),
            Polarity::Deny => write!(f, "deny"),
        }
    }
}

/// One step of an entry evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationStep {
    /// Which stage ran: "never_implies", "origin", "principals", "permissions".
    pub check: String,
    /// What happened, e.g. "passed", "skipped: no active origin".
    pub outcome: String,
    /// Whether evaluation stopped here.
    pub terminal: bool,
}

/// Result of `PolicyEntry::implies_with_trace()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTrace {
    /// Same value `implies()` returns for the same inputs.
    pub matched: bool,
    /// Stages in evaluation order.
    pub steps: Vec<EvaluationStep>,
}

/// Construction phase of a policy entry.
///
/// Polarity and verbosity are fixed up front; origin, principals, permissions
/// and the never-implies override are accumulated, then `build()` freezes
/// everything into a [`PolicyEntry`].
pub struct PolicyEntryBuilder {
    polarity: Polarity,
    verbose: bool,
    sink: Option<Arc<dyn DiagnosticSink>>,
    origin: Option<Arc<dyn OriginMatcher>>,
    principals: Vec<PrincipalPattern>,
    permissions: Permissions,
    never_implies: bool,
}

impl PolicyEntryBuilder {
    pub fn new(polarity: Polarity, verbose: bool) -> Self {
        Self {
            polarity,
            verbose,
            sink: None,
            origin: None,
            principals: Vec::new(),
            permissions: Permissions::new(),
            never_implies: false,
        }
    }

    /// Builder whose verbosity comes from the evaluator config.
    pub fn from_config(polarity: Polarity, config: &EvaluatorConfig) -> Self {
        Self::new(polarity, config.verbose)
    }

    /// Route verbose diagnostics to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Last write wins.
    pub fn set_origin(&mut self, origin: Arc<dyn OriginMatcher>) -> &mut Self {
        self.origin = Some(origin);
        self
    }

    pub fn add_principal(&mut self, pattern: PrincipalPattern) -> &mut Self {
        self.principals.push(pattern);
        self
    }

    /// Duplicates are accepted.
    pub fn add_permission(&mut self, permission: Arc<dyn Permission>) -> &mut Self {
        self.permissions.add(permission);
        self
    }

    pub fn set_never_implies(&mut self, never_implies: bool) -> &mut Self {
        self.never_implies = never_implies;
        self
    }

    pub fn build(self) -> PolicyEntry {
        PolicyEntry {
            polarity: self.polarity,
            verbose: self.verbose,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
            origin: self.origin,
            principals: self.principals,
            permissions: self.permissions,
            never_implies: self.never_implies,
        }
    }
}

/// An immutable, loaded policy entry.
pub struct PolicyEntry {
    polarity: Polarity,
    verbose: bool,
    sink: Arc<dyn DiagnosticSink>,
    origin: Option<Arc<dyn OriginMatcher>>,
    principals: Vec<PrincipalPattern>,
    permissions: Permissions,
    never_implies: bool,
}

impl PolicyEntry {
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn never_implies(&self) -> bool {
        self.never_implies
    }

    pub fn origin(&self) -> Option<&dyn OriginMatcher> {
        self.origin.as_deref()
    }

    pub fn principals(&self) -> &[PrincipalPattern] {
        &self.principals
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Do this entry's conditions match `context`, and does it hold `permission`?
    pub fn implies(&self, context: &dyn SecurityContext, permission: &dyn Permission) -> bool {
        self.evaluate(context, permission, &mut Recorder::new(self, None))
    }

    /// Same decision as `implies()`, with the stages that produced it.
    pub fn implies_with_trace(
        &self,
        context: &dyn SecurityContext,
        permission: &dyn Permission,
    ) -> EntryTrace {
        let mut steps = Vec::new();
        let matched = self.evaluate(
            context,
            permission,
            &mut Recorder::new(self, Some(&mut steps)),
        );
        EntryTrace { matched, steps }
    }

    fn evaluate(
        &self,
        context: &dyn SecurityContext,
        permission: &dyn Permission,
        rec: &mut Recorder<'_>,
    ) -> bool {
        // Stage 1: the override dominates everything else.
        if self.never_implies {
            rec.log(|| "This entry never implies anything.".to_string());
            rec.step("never_implies", || "failed: entry never implies anything".to_string(), true);
            return false;
        }
        rec.step("never_implies", || "passed".to_string(), false);

        // Stage 2: origin. Absence on either side skips the check.
        match (&self.origin, context.origin()) {
            (Some(policy_origin), Some(active_origin)) => {
                rec.log(|| "Evaluate codesource...".to_string());
                rec.log(|| format!("      Policy codesource: {}", policy_origin));
                rec.log(|| format!("      Active codesource: {}", active_origin));
                if !policy_origin.implies(active_origin) {
                    rec.log(|| "Evaluation (codesource) failed.".to_string());
                    rec.step(
                        "origin",
                        || format!("failed: {} does not imply {}", policy_origin, active_origin),
                        true,
                    );
                    return false;
                }
                rec.step("origin", || "passed".to_string(), false);
            }
            (None, _) => rec.step("origin", || "skipped: no policy origin".to_string(), false),
            (Some(_), None) => rec.step("origin", || "skipped: no active origin".to_string(), false),
        }

        // Stage 3: principals. Every pattern needs some satisfying principal.
        if self.principals.is_empty() {
            rec.step("principals", || "skipped: no principal patterns".to_string(), false);
        } else {
            rec.log(|| "Evaluate principals...".to_string());
            let active = context.principals();
            if active.is_empty() {
                rec.log(|| {
                    "Evaluation (principals) failed. There are no active principals.".to_string()
                });
                rec.step("principals", || "failed: no active principals".to_string(), true);
                return false;
            }
            if rec.verbose() {
                rec.log(|| "Policy principals:".to_string());
                for pattern in &self.principals {
                    rec.log(|| format!("      {}", pattern));
                }
                rec.log(|| "Active principals:".to_string());
                for principal in active {
                    rec.log(|| format!("      {}", principal));
                }
            }

            for pattern in &self.principals {
                let satisfied = active
                    .iter()
                    .any(|principal| pattern.matches(principal.as_ref()));
                if !satisfied {
                    rec.log(|| "Evaluation (principals) failed.".to_string());
                    rec.step(
                        "principals",
                        || format!("failed: no active principal satisfies {}", pattern),
                        true,
                    );
                    return false;
                }
            }
            rec.step(
                "principals",
                || format!("passed: {} pattern(s) satisfied", self.principals.len()),
                false,
            );
        }

        // Stage 4: permissions.
        if rec.verbose() {
            rec.log(|| "Evaluation codesource/principals passed.".to_string());
            let verb = self.polarity.verb();
            for owned in self.permissions.elements() {
                rec.log(|| format!("      {} {}", verb, owned));
            }
        }

        let found = self.permissions.implies(permission);
        if found {
            rec.log(|| "Needed permission found in this entry.".to_string());
            rec.step("permissions", || format!("found: {}", permission), true);
        } else {
            rec.log(|| "Needed permission wasn't found in this entry.".to_string());
            rec.step("permissions", || format!("not found: {}", permission), true);
        }
        found
    }
}

impl fmt::Debug for PolicyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyEntry")
            .field("polarity", &self.polarity)
            .field("verbose", &self.verbose)
            .field("origin", &self.origin.as_ref().map(|o| o.to_string()))
            .field("principals", &self.principals)
            .field("permissions", &self.permissions)
            .field("never_implies", &self.never_implies)
            .finish()
    }
}

/// Routes diagnostic lines to the entry's sink and steps to an optional trace.
///
/// Both take closures so nothing is formatted when nobody is listening.
struct Recorder<'a> {
    entry: &'a PolicyEntry,
    steps: Option<&'a mut Vec<EvaluationStep>>,
}

impl<'a> Recorder<'a> {
    fn new(entry: &'a PolicyEntry, steps: Option<&'a mut Vec<EvaluationStep>>) -> Self {
        Self { entry, steps }
    }

    fn verbose(&self) -> bool {
        self.entry.verbose
    }

    fn log(&self, line: impl FnOnce() -> String) {
        if !self.entry.verbose {
            return;
        }
        if let Err(e) = self.entry.sink.log(&line()) {
            tracing::warn!("diagnostic sink error: {}", e);
        }
    }

    fn step(&mut self, check: &str, outcome: impl FnOnce() -> String, terminal: bool) {
        if let Some(steps) = self.steps.as_deref_mut() {
            steps.push(EvaluationStep {
                check: check.to_string(),
                outcome: outcome(),
                terminal,
            });
        }
    }
}
