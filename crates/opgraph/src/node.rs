//! Node identity.

use std::fmt;

/// Identity of a captured operation. Lightweight (8 bytes), Copy.
///
/// Ids are handed out by a [`Trace`](crate::Trace) in strictly increasing
/// order starting at 0 and are never reused. A value that has not yet
/// taken part in an operation also reports id 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// The id a value carries before it is assigned one.
    pub const UNASSIGNED: Self = Self(0);

    /// Create a NodeId from a raw index.
    #[inline]
    pub fn from_index(index: u64) -> Self {
        Self(index)
    }

    /// The raw index of this node, also its row/column in the graph store.
    #[inline]
    pub fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// Bare number: this is the form written into the input-name export.
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
