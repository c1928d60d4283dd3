//! # warden-policy
//!
//! Policy entry evaluation for Warden.
//!
//! A [`PolicyEntry`] pairs match conditions (a code origin and principal
//! patterns) with a permission set and a grant/deny intent. Given a
//! [`SecurityContext`] and a requested [`Permission`], `implies()` runs a
//! short-circuiting three-stage check:
//!
//! 1. **Origin** — the entry's origin matcher must imply the active origin
//!    (skipped when either side is absent).
//! 2. **Principals** — every configured pattern must be satisfied by at least
//!    one active principal (skipped when no patterns are configured).
//! 3. **Permissions** — the entry's permission collection must imply the
//!    requested permission.
//!
//! An entry built with `set_never_implies(true)` matches nothing.
//!
//! Origins, principals and permissions are traits supplied by the embedding
//! system; [`OriginPattern`], [`BasicPrincipal`] and [`ResourcePermission`]
//! are reference implementations. [`PolicySet`] aggregates entries with a
//! grant/deny [`Priority`].

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod origin;
pub mod pattern;
pub mod permission;
pub mod principal;
pub mod set;

pub use config::EvaluatorConfig;
pub use context::{ExecutionContext, SecurityContext};
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use entry::{EntryTrace, EvaluationStep, Polarity, PolicyEntry, PolicyEntryBuilder};
pub use error::PolicyError;
pub use origin::{CodeOrigin, OriginMatcher, OriginPattern};
pub use pattern::TargetPattern;
pub use permission::{
    AllPermission, Permission, PermissionCollection, Permissions, ResourcePermission,
};
pub use principal::{BasicPrincipal, NamePattern, Principal, PrincipalPattern};
pub use set::{PolicyDecision, PolicySet, Priority};
