//! Recorder strategies.
//!
//! The [`Trace`](crate::Trace) classifies every operand of an operation and
//! hands the recorder one [`OpRecord`] per operation. Recorders only decide
//! what to persist:
//!
//! - [`FullGraph`]: dependency edges and diagonal kind/memory codes.
//! - [`NamedTrace`]: the same graph plus one row of operand names per op.
//! - [`StageSchedule`]: no edges, just ASAP stage demand tables.

mod full;
mod named;
mod stage;

pub use full::FullGraph;
pub use named::NamedTrace;
pub use stage::StageSchedule;

use crate::codec::OpKind;
use crate::node::NodeId;
use crate::store::GraphStore;

/// How an operation was written in the host program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpForm {
    /// `x op= y`: the receiver becomes the result.
    Compound,
    /// `z = x op y`: a fresh result value.
    Binary,
    /// A call to a named host function with many inputs and outputs.
    Grouped,
}

/// Where an operand's data comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// A raw input. `charged` is true if this operation paid its one
    /// memory access; false if an earlier operation already did.
    Memory { charged: bool },
    /// The result of an earlier operation.
    Result(NodeId),
}

/// One classified operand, in host operand order.
#[derive(Clone, Copy, Debug)]
pub struct Operand<'a> {
    pub source: Source,
    /// The node the operand value represented before this operation.
    pub node: NodeId,
    /// Symbolic source name, empty for anonymous values.
    pub name: &'a str,
}

impl Operand<'_> {
    /// The operand's name, or its node id in text form if anonymous.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.node.to_string()
        } else {
            self.name.to_string()
        }
    }
}

/// Everything a recorder learns about one operation.
#[derive(Clone, Copy, Debug)]
pub struct OpRecord<'a> {
    /// Freshly allocated id of this operation.
    pub node: NodeId,
    pub kind: OpKind,
    pub form: OpForm,
    pub operands: &'a [Operand<'a>],
}

impl OpRecord<'_> {
    /// Memory accesses charged to this operation.
    pub fn memory_accesses(&self) -> u32 {
        self.operands
            .iter()
            .filter(|o| matches!(o.source, Source::Memory { charged: true }))
            .count() as u32
    }

    /// `(operand position, producing node)` for every operand that is a
    /// prior result.
    pub fn predecessors(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.operands
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o.source {
                Source::Result(prior) => Some((i, prior)),
                Source::Memory { .. } => None,
            })
    }
}

/// A strategy persisting per-operation data.
pub trait Recorder {
    /// Whether `clone()` of a traced value keeps the node id it was copied
    /// from. When false the copy starts over at [`NodeId::UNASSIGNED`].
    const KEEPS_NODE_ON_CLONE: bool;

    /// Persist one operation.
    fn record(&mut self, op: &OpRecord<'_>);
}

/// Recorders that maintain a dependency [`GraphStore`].
pub trait GraphRecorder: Recorder {
    fn store(&self) -> &GraphStore;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operand(source: Source, node: u64, name: &str) -> Operand<'_> {
        Operand {
            source,
            node: NodeId(node),
            name,
        }
    }

    #[test]
    fn labels_fall_back_to_node() {
        assert_eq!(operand(Source::Result(NodeId(4)), 4, "").label(), "4");
        assert_eq!(operand(Source::Memory { charged: true }, 0, "alpha").label(), "alpha");
    }

    #[test]
    fn record_summaries() {
        let ops = [
            operand(Source::Memory { charged: true }, 0, "a"),
            operand(Source::Result(NodeId(2)), 2, ""),
            operand(Source::Memory { charged: false }, 0, "b"),
            operand(Source::Memory { charged: true }, 0, "c"),
        ];
        let rec = OpRecord {
            node: NodeId(3),
            kind: OpKind::UserFunction(0),
            form: OpForm::Grouped,
            operands: &ops,
        };
        assert_eq!(rec.memory_accesses(), 2);
        assert_eq!(rec.predecessors().collect::<Vec<_>>(), vec![(1, NodeId(2))]);
    }
}
