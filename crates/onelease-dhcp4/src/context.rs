//! Per-transaction context and the callout handle carrying it
//!
//! The host invokes several callouts for one client exchange and they share
//! no call stack. Whatever the early callout derives travels forward in the
//! [`TransactionContext`] owned by that exchange's [`CalloutHandle`].

use crate::error::ContextError;
use std::collections::HashMap;

/// Context key holding the client's hardware address text
pub const HWADDR_KEY: &str = "hwaddr_str";

/// Context key holding the derived candidate address text
///
/// An empty value means the gate did not match or derivation produced no
/// candidate.
pub const CANDIDATE_KEY: &str = "oneaddr_str";

/// String key/value store scoped to one client transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionContext {
    values: HashMap<String, String>,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any earlier value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up `key`
    pub fn get(&self, key: &str) -> Result<&str, ContextError> {
        self.values
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| ContextError::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What the host should do after the current callout returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextStep {
    /// Carry on with the host's default processing
    #[default]
    Continue,

    /// Skip the remaining default processing for this transaction
    Skip,
}

/// Everything a callout may touch that belongs to one transaction
///
/// The host creates one handle when a query arrives, passes it to every
/// callout for that query and drops it once the response is sent.
#[derive(Debug, Clone, Default)]
pub struct CalloutHandle {
    context: TransactionContext,
    next_step: NextStep,
}

impl CalloutHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &TransactionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TransactionContext {
        &mut self.context
    }

    pub fn next_step(&self) -> NextStep {
        self.next_step
    }

    pub fn set_next_step(&mut self, next_step: NextStep) {
        self.next_step = next_step;
    }

    /// Split into the context and the next-step flag so both can be
    /// borrowed at once
    pub fn parts_mut(&mut self) -> (&TransactionContext, &mut NextStep) {
        (&self.context, &mut self.next_step)
    }
}
