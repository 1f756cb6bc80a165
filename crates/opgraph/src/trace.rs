//! The shared trace context.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::codec::OpKind;
use crate::config::TraceConfig;
use crate::error::TraceError;
use crate::lifecycle::{LiveCounters, LiveStats};
use crate::node::NodeId;
use crate::recorder::{OpForm, OpRecord, Operand, Recorder, Source};
use crate::value::{Payload, Traced};

struct State<R> {
    next_node: u64,
    recorder: R,
}

/// One trace: the node-id counter, the recorder and the lifecycle counters.
///
/// Every [`Traced`] value holds an `Rc` back to the trace it was created
/// on, so operations need no extra arguments. Traces are single-threaded;
/// independent traces never share state.
pub struct Trace<R> {
    config: TraceConfig,
    state: RefCell<State<R>>,
    live: RefCell<LiveCounters>,
}

impl<R> Trace<R> {
    /// Number of operations recorded so far; also the next node id.
    pub fn op_count(&self) -> u64 {
        self.state.borrow().next_node
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Borrow the recorder.
    ///
    /// Do not hold the returned guard across traced operations.
    pub fn recorder(&self) -> Ref<'_, R> {
        Ref::map(self.state.borrow(), |s| &s.recorder)
    }

    /// Run `f` against the recorder.
    pub fn with_recorder<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R) -> T,
    {
        f(&self.state.borrow().recorder)
    }

    /// Live/peak value counts.
    pub fn live_stats(&self) -> LiveStats {
        self.live.borrow().stats()
    }

    pub(crate) fn value_created(&self) {
        self.live.borrow_mut().created();
    }

    pub(crate) fn value_dropped(&self) {
        self.live.borrow_mut().destroyed();
    }
}

impl<R: Recorder> Trace<R> {
    /// Create a trace with default configuration.
    pub fn new(recorder: R) -> Rc<Self> {
        Self::with_config(recorder, TraceConfig::default())
    }

    pub fn with_config(recorder: R, config: TraceConfig) -> Rc<Self> {
        let live = LiveCounters::new(config.live_capacity);
        Rc::new(Self {
            config,
            state: RefCell::new(State {
                next_node: 0,
                recorder,
            }),
            live: RefCell::new(live),
        })
    }

    /// A fresh input. Its first use as an operand charges one memory access.
    pub fn input<T: Payload>(self: &Rc<Self>, value: T) -> Traced<T, R> {
        Traced::new(self, value, false, String::new())
    }

    /// A named fresh input; the name appears in operand-name tables.
    pub fn named<T: Payload>(self: &Rc<Self>, value: T, name: impl Into<String>) -> Traced<T, R> {
        Traced::new(self, value, false, name.into())
    }

    /// A constant. It counts as already read and never charges memory.
    pub fn constant<T: Payload>(self: &Rc<Self>, value: T) -> Traced<T, R> {
        Traced::new(self, value, true, String::new())
    }

    /// Record a call to the registered host function `function` as one node.
    ///
    /// Inputs are classified like any operand (memory access or dependency);
    /// every output becomes a result of the shared node. Payloads are left
    /// untouched: computing them is the host's business.
    ///
    /// Fails if `function` is not registered, or if its index does not fit
    /// in a kind code. Nothing is recorded in either case.
    pub fn call<T: Payload>(
        &self,
        function: &str,
        inputs: &[&Traced<T, R>],
        outputs: &mut [&mut Traced<T, R>],
    ) -> Result<NodeId, TraceError> {
        let index = self
            .config
            .functions
            .index_of(function)
            .ok_or_else(|| TraceError::UnknownFunction(function.to_string()))?;
        let kind = OpKind::user_function(index).ok_or_else(|| TraceError::FunctionIndexOutOfRange {
            name: function.to_string(),
            index,
        })?;
        debug!(
            function,
            inputs = inputs.len(),
            outputs = outputs.len(),
            "recording grouped call"
        );

        let operands: Vec<Operand<'_>> = inputs
            .iter()
            .map(|v| {
                debug_assert!(v.belongs_to(self), "input from another trace");
                v.operand()
            })
            .collect();
        let node = self.record(kind, OpForm::Grouped, &operands);

        for out in outputs.iter_mut() {
            debug_assert!(out.belongs_to(self), "output from another trace");
            out.mark_result(node);
        }
        Ok(node)
    }

    /// Allocate the next node id and hand the classified operation to the
    /// recorder.
    pub(crate) fn record(&self, kind: OpKind, form: OpForm, operands: &[Operand<'_>]) -> NodeId {
        let mut state = self.state.borrow_mut();
        let node = NodeId(state.next_node);
        state.next_node += 1;

        for o in operands {
            match o.source {
                Source::Memory { charged: true } => {
                    trace!(op = %node, operand = %o.label(), "adding memory access")
                }
                Source::Memory { charged: false } => {
                    trace!(op = %node, operand = %o.label(), "already accessed")
                }
                Source::Result(_) => {}
            }
        }

        state.recorder.record(&OpRecord {
            node,
            kind,
            form,
            operands,
        });
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DiagonalCode;
    use crate::lifecycle::LiveCount;
    use crate::recorder::{FullGraph, GraphRecorder, StageSchedule};
    use crate::registry::FunctionRegistry;

    #[test]
    fn ids_are_sequential() {
        let t = Trace::new(FullGraph::new());
        let a = t.input(1.0);
        let b = t.input(2.0);
        let c = &a + &b;
        let d = &c * &a;
        assert_eq!(c.node(), NodeId(0));
        assert_eq!(d.node(), NodeId(1));
        assert_eq!(t.op_count(), 2);
    }

    #[test]
    fn traces_are_isolated() {
        let t1 = Trace::new(FullGraph::new());
        let t2 = Trace::new(FullGraph::new());
        let a = t1.input(1);
        let b = t1.input(2);
        let _ = &a + &b;
        assert_eq!(t1.op_count(), 1);
        assert_eq!(t2.op_count(), 0);
        assert!(t2.recorder().store().is_empty());
    }

    #[test]
    fn grouped_call_shares_one_node() {
        let functions = FunctionRegistry::new().with("svd", 0).with("RMS", 3);
        let t = Trace::with_config(FullGraph::new(), TraceConfig::new().with_functions(functions));
        let x = t.input(1.0);
        let y = t.input(2.0);
        let z = &x + &y; // node 0
        let mut u = t.input(0.0);
        let mut v = t.input(0.0);

        let node = t.call("RMS", &[&x, &z], &mut [&mut u, &mut v]).unwrap();
        assert_eq!(node, NodeId(1));
        assert!(u.is_calculated() && v.is_calculated());
        assert_eq!(u.node(), node);
        assert_eq!(v.node(), node);

        let store = t.recorder();
        assert_eq!(store.store().get(0, 1), 1);
        // x was already charged by node 0, so the call reads no memory.
        assert_eq!(store.store().get(1, 1), OpKind::UserFunction(3).code());
    }

    #[test]
    fn grouped_call_charges_fresh_inputs() {
        let functions = FunctionRegistry::new().with("min", 4);
        let t = Trace::with_config(FullGraph::new(), TraceConfig::new().with_functions(functions));
        let a = t.input(3);
        let b = t.input(4);
        let mut out = t.input(0);
        t.call("min", &[&a, &b], &mut [&mut out]).unwrap();
        assert_eq!(t.recorder().store().get(0, 0), 200 + 24);
    }

    #[test]
    fn unknown_function_is_an_error() {
        let t = Trace::new(StageSchedule::new());
        let a = t.input(1);
        let mut b = t.input(0);
        let err = t.call("svd", &[&a], &mut [&mut b]).unwrap_err();
        assert!(matches!(err, TraceError::UnknownFunction(ref n) if n == "svd"));
        assert_eq!(t.op_count(), 0);
        assert!(!a.is_read());
    }

    #[test]
    fn largest_function_index_still_decodes() {
        let functions = FunctionRegistry::new().with("last", 79).with("big", 80);
        let t = Trace::with_config(FullGraph::new(), TraceConfig::new().with_functions(functions));
        let a = t.input(1);
        let mut out = t.input(0);

        let err = t.call("big", &[&a], &mut [&mut out]).unwrap_err();
        assert!(matches!(
            err,
            TraceError::FunctionIndexOutOfRange { ref name, index: 80 } if name == "big"
        ));
        assert_eq!(t.op_count(), 0);
        assert!(!a.is_read());

        let node = t.call("last", &[&a], &mut [&mut out]).unwrap();
        let g = t.recorder();
        assert_eq!(g.store().get(0, 0), 199);
        assert_eq!(
            g.store().diagonal(node),
            DiagonalCode { kind: Some(OpKind::UserFunction(79)), mem_level: 1 }
        );
    }

    #[test]
    fn live_counts_follow_scopes() {
        let t = Trace::new(FullGraph::new());
        {
            let a = t.input(1);
            let b = t.input(2);
            let _c = &a + &b;
            assert_eq!(t.live_stats().current, LiveCount::Exact(3));
        }
        let stats = t.live_stats();
        assert_eq!(stats.current, LiveCount::Exact(0));
        assert_eq!(stats.peak, LiveCount::Exact(3));
    }
}
