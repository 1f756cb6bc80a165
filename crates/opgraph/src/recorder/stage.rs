use tracing::debug;

use super::{OpRecord, Recorder};
use crate::node::NodeId;

/// ASAP stage demand, assuming unlimited resources per stage.
///
/// A node's stage is one more than the latest stage among the prior
/// results it consumes, or 0 if it only reads memory. Per stage we count
/// the operations landing there and the memory accesses they charge.
/// No edges are kept.
#[derive(Clone, Debug, Default)]
pub struct StageSchedule {
    node_stage: Vec<usize>,
    op_counts: Vec<u64>,
    mem_accesses: Vec<u64>,
}

impl StageSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage assigned to `node`, if it was recorded here.
    pub fn stage_of(&self, node: NodeId) -> Option<usize> {
        self.node_stage.get(node.index() as usize).copied()
    }

    /// Operations per stage.
    pub fn op_counts(&self) -> &[u64] {
        &self.op_counts
    }

    /// Memory accesses per stage.
    pub fn mem_accesses(&self) -> &[u64] {
        &self.mem_accesses
    }

    /// Number of stages reached so far.
    pub fn depth(&self) -> usize {
        self.op_counts.len()
    }

    fn ensure_stage(&mut self, stage: usize) {
        if self.op_counts.len() <= stage {
            debug!(stage, "growing stage tables");
            self.op_counts.resize(stage + 1, 0);
            self.mem_accesses.resize(stage + 1, 0);
        }
    }
}

impl Recorder for StageSchedule {
    const KEEPS_NODE_ON_CLONE: bool = true;

    fn record(&mut self, op: &OpRecord<'_>) {
        let stage = op
            .predecessors()
            .map(|(_, prior)| self.stage_of(prior).unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);

        let index = op.node.index() as usize;
        if self.node_stage.len() <= index {
            self.node_stage.resize(index + 1, 0);
        }
        self.node_stage[index] = stage;

        self.ensure_stage(stage);
        self.op_counts[stage] += 1;
        self.mem_accesses[stage] += u64::from(op.memory_accesses());
    }
}
