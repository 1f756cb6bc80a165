use super::{FullGraph, GraphRecorder, OpForm, OpRecord, Recorder};
use crate::node::NodeId;
use crate::store::GraphStore;

/// Dependency graph plus an operand-name table for back-annotation.
///
/// Every operation appends one row listing its operands in host order: the
/// operand's symbolic name, or its node id as text when it has none.
///
/// Two behaviours differ from [`FullGraph`]:
/// - cloning a value resets its node id to [`NodeId::UNASSIGNED`];
/// - in a compound update, an argument that is a result of node 0 does not
///   produce an edge, since 0 is also what a reset clone reports.
#[derive(Clone, Debug, Default)]
pub struct NamedTrace {
    graph: FullGraph,
    inputs: Vec<Vec<String>>,
}

impl NamedTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operand names, one row per recorded operation.
    pub fn inputs(&self) -> &[Vec<String>] {
        &self.inputs
    }

    /// Consume the recorder into its graph and name table.
    pub fn into_parts(self) -> (GraphStore, Vec<Vec<String>>) {
        (self.graph.into_store(), self.inputs)
    }
}

impl Recorder for NamedTrace {
    const KEEPS_NODE_ON_CLONE: bool = false;

    fn record(&mut self, op: &OpRecord<'_>) {
        self.graph.write(op, |position, op| {
            let argument_of_compound = op.form == OpForm::Compound && position == 1;
            !(argument_of_compound && op.operands[position].node == NodeId::UNASSIGNED)
        });
        self.inputs
            .push(op.operands.iter().map(|o| o.label()).collect());
    }
}

impl GraphRecorder for NamedTrace {
    fn store(&self) -> &GraphStore {
        self.graph.store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OpKind;
    use crate::recorder::{Operand, Source};

    #[test]
    fn rows_follow_operand_order() {
        let mut t = NamedTrace::new();
        let ops = [
            Operand { source: Source::Memory { charged: true }, node: NodeId(0), name: "x" },
            Operand { source: Source::Result(NodeId(7)), node: NodeId(7), name: "" },
        ];
        t.record(&OpRecord {
            node: NodeId(8),
            kind: OpKind::Subtract,
            form: OpForm::Binary,
            operands: &ops,
        });
        assert_eq!(t.inputs(), &[vec!["x".to_string(), "7".to_string()]]);
        assert_eq!(t.store().get(7, 8), 1);
        assert_eq!(t.store().get(8, 8), 104);
    }

    #[test]
    fn compound_argument_from_node_zero_is_not_linked() {
        let mut t = NamedTrace::new();
        let ops = [
            Operand { source: Source::Result(NodeId(0)), node: NodeId(0), name: "acc" },
            Operand { source: Source::Result(NodeId(0)), node: NodeId(0), name: "" },
        ];
        t.record(&OpRecord {
            node: NodeId(5),
            kind: OpKind::Add,
            form: OpForm::Compound,
            operands: &ops,
        });
        // The receiver still links; only the argument is filtered.
        assert_eq!(t.store().get(0, 5), 1);
        assert_eq!(t.store().len(), 2);

        let (store, inputs) = t.into_parts();
        assert_eq!(store.get(5, 5), 1);
        assert_eq!(inputs[0], vec!["acc".to_string(), "0".to_string()]);
    }
}
