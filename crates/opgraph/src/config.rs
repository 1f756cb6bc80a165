//! Trace configuration.

use crate::registry::FunctionRegistry;

/// Settings fixed for the lifetime of a [`Trace`](crate::Trace).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceConfig {
    /// Capacity of the live/peak value counters. Exceeding it sets the
    /// counter's overflow flag for good.
    pub live_capacity: u64,
    /// Function registry used by grouped calls.
    pub functions: FunctionRegistry,
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live_capacity(mut self, capacity: u64) -> Self {
        self.live_capacity = capacity;
        self
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            live_capacity: u64::MAX,
            functions: FunctionRegistry::new(),
        }
    }
}
