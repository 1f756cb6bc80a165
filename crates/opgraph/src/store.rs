//! Sparse, deduplicated (row, col) → integer store.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::codec::DiagonalCode;
use crate::node::NodeId;

/// Sparse matrix over the node-id space.
///
/// Entries are kept row-major, so enumerating everything (or one row) is an
/// ordered range scan. The diagonal `(n, n)` holds node `n`'s combined
/// kind/memory code; off-diagonal `(src, dst)` holds dependency weights.
/// There is at most one entry per coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphStore {
    entries: BTreeMap<(u64, u64), i64>,
    rows: u64,
    cols: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn grow(&mut self, row: u64, col: u64) {
        self.rows = self.rows.max(row.saturating_add(1));
        self.cols = self.cols.max(col.saturating_add(1));
    }

    /// Insert `code`, or add it to the value already at `(row, col)`.
    pub fn upsert_add(&mut self, row: u64, col: u64, code: i64) {
        self.grow(row, col);
        let cell = self.entries.entry((row, col)).or_insert(0);
        *cell = cell.saturating_add(code);
    }

    /// Set `(row, col)` to `value`, replacing whatever was there.
    pub fn insert_or_replace(&mut self, row: u64, col: u64, value: i64) {
        self.grow(row, col);
        self.entries.insert((row, col), value);
    }

    /// Stored value, or 0 if absent.
    #[inline]
    pub fn get(&self, row: u64, col: u64) -> i64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0)
    }

    /// Whether an entry exists at `(row, col)` (even one holding 0).
    #[inline]
    pub fn contains(&self, row: u64, col: u64) -> bool {
        self.entries.contains_key(&(row, col))
    }

    /// One past the largest row index ever written, saturating at `u64::MAX`.
    #[inline]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// One past the largest column index ever written, saturating at `u64::MAX`.
    #[inline]
    pub fn cols(&self) -> u64 {
        self.cols
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries as `(row, col, value)`, row-major then column order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64, i64)> + '_ {
        self.entries.iter().map(|(&(r, c), &v)| (r, c, v))
    }

    /// Entries of a single row as `(col, value)`, in column order.
    pub fn row(&self, row: u64) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.entries
            .range((Bound::Included((row, 0)), Bound::Included((row, u64::MAX))))
            .map(|(&(_, c), &v)| (c, v))
    }

    /// Dependency edges `(source, dest, weight)`, i.e. every off-diagonal entry.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, i64)> + '_ {
        self.iter()
            .filter(|&(r, c, _)| r != c)
            .map(|(r, c, v)| (NodeId(r), NodeId(c), v))
    }

    /// Nodes consuming `node`'s result.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.row(node.0)
            .filter(move |&(c, _)| c != node.0)
            .map(|(c, _)| NodeId(c))
    }

    /// Nodes whose results `node` consumes. Scans all rows.
    pub fn predecessors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges()
            .filter(|&(_, dst, _)| dst == node)
            .map(|(src, _, _)| src)
            .collect()
    }

    /// Decoded diagonal cell of `node`.
    pub fn diagonal(&self, node: NodeId) -> DiagonalCode {
        DiagonalCode::decode(self.get(node.0, node.0))
    }
}

impl FromIterator<(u64, u64, i64)> for GraphStore {
    /// Rebuild from enumerated entries; later duplicates replace earlier ones.
    fn from_iter<I: IntoIterator<Item = (u64, u64, i64)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (r, c, v) in iter {
            store.insert_or_replace(r, c, v);
        }
        store
    }
}
