// context.rs — The runtime security context an entry is evaluated against.

use std::sync::Arc;

use crate::origin::CodeOrigin;
use crate::principal::Principal;

/// Read-only view of the active execution context.
pub trait SecurityContext {
    /// Origin of the executing code, if known.
    fn origin(&self) -> Option<&CodeOrigin>;

    /// Identity claims currently active. May be empty.
    fn principals(&self) -> &[Arc<dyn Principal>];
}

/// Owned security context, assembled by the embedding system per check.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    origin: Option<CodeOrigin>,
    principals: Vec<Arc<dyn Principal>>,
}

impl ExecutionContext {
    /// No origin, no principals.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: CodeOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_principal(mut self, principal: Arc<dyn Principal>) -> Self {
        self.principals.push(principal);
        self
    }
}

impl SecurityContext for ExecutionContext {
    fn origin(&self) -> Option<&CodeOrigin> {
        self.origin.as_ref()
    }

    fn principals(&self) -> &[Arc<dyn Principal>] {
        &self.principals
    }
}
