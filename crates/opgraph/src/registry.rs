//! Host-supplied function-name registry for grouped calls.

use std::collections::BTreeMap;

/// Maps external function names to the index encoded in their node's kind.
///
/// Built once by the host and never mutated while tracing. Only indices
/// below [`MAX_USER_FUNCTIONS`](crate::codec::MAX_USER_FUNCTIONS) can be
/// called; larger ones are rejected by [`Trace::call`](crate::Trace::call).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionRegistry {
    indices: BTreeMap<String, u32>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under an explicit index.
    pub fn with(mut self, name: impl Into<String>, index: u32) -> Self {
        self.indices.insert(name.into(), index);
        self
    }

    /// Index of `name`, if registered.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    /// Reverse lookup, for labelling exports.
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.indices
            .iter()
            .find(|(_, &i)| i == index)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for FunctionRegistry {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().map(|(n, i)| (n.into(), i)).collect(),
        }
    }
}
