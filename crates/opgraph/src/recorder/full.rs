use tracing::trace;

use super::{GraphRecorder, OpRecord, Recorder};
use crate::codec::encode_mem_level;
use crate::store::GraphStore;

/// Full dependency graph with per-node kind/memory codes.
///
/// For node `n` the store ends up holding `(p, n) = 1` for every prior
/// result `p` it consumes, and `(n, n) = encode_mem_level(mem) + kind`.
#[derive(Clone, Debug, Default)]
pub struct FullGraph {
    store: GraphStore,
}

impl FullGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the recorder, keeping only the graph.
    pub fn into_store(self) -> GraphStore {
        self.store
    }

    /// Write `op`'s edges and diagonal, skipping edges rejected by `keep`.
    pub(crate) fn write(&mut self, op: &OpRecord<'_>, keep: impl Fn(usize, &OpRecord<'_>) -> bool) {
        let n = op.node.index();
        for (position, prior) in op.predecessors() {
            if !keep(position, op) {
                trace!(from = %prior, to = %op.node, "edge skipped");
                continue;
            }
            trace!(from = %prior, to = %op.node, "creating edge");
            self.store.insert_or_replace(prior.index(), n, 1);
        }
        self.store
            .upsert_add(n, n, encode_mem_level(op.memory_accesses()));
        self.store.upsert_add(n, n, op.kind.code());
    }
}

impl Recorder for FullGraph {
    const KEEPS_NODE_ON_CLONE: bool = true;

    fn record(&mut self, op: &OpRecord<'_>) {
        self.write(op, |_, _| true);
    }
}

impl GraphRecorder for FullGraph {
    fn store(&self) -> &GraphStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DiagonalCode, OpKind};
    use crate::node::NodeId;
    use crate::recorder::{OpForm, Operand, Source};

    #[test]
    fn edges_and_diagonal() {
        let mut g = FullGraph::new();
        let ops = [
            Operand { source: Source::Result(NodeId(0)), node: NodeId(0), name: "" },
            Operand { source: Source::Memory { charged: true }, node: NodeId(0), name: "" },
        ];
        g.record(&OpRecord {
            node: NodeId(1),
            kind: OpKind::Multiply,
            form: OpForm::Binary,
            operands: &ops,
        });
        let s = g.store();
        assert_eq!(s.get(0, 1), 1);
        assert_eq!(s.get(1, 1), 102);
        assert_eq!(
            DiagonalCode::decode(s.get(1, 1)),
            DiagonalCode { kind: Some(OpKind::Multiply), mem_level: 1 }
        );
    }

    #[test]
    fn same_prior_twice_is_one_edge() {
        let mut g = FullGraph::new();
        let ops = [
            Operand { source: Source::Result(NodeId(3)), node: NodeId(3), name: "" },
            Operand { source: Source::Result(NodeId(3)), node: NodeId(3), name: "" },
        ];
        g.record(&OpRecord {
            node: NodeId(4),
            kind: OpKind::Add,
            form: OpForm::Binary,
            operands: &ops,
        });
        let store = g.into_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(3, 4), 1);
        assert_eq!(store.get(4, 4), 1);
    }
}
