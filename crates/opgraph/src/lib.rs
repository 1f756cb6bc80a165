//! opgraph: dependency-graph capture for instrumented arithmetic.
//!
//! Host code computes with [`Traced`] values instead of plain numbers. Every
//! arithmetic operation still produces the real result, and is also recorded
//! into the value's [`Trace`] as one node. What gets recorded depends on the
//! trace's [`Recorder`]:
//!
//! - [`FullGraph`]: dependency edges plus a per-node kind/memory code.
//! - [`NamedTrace`]: the same graph, plus the operand names of each node.
//! - [`StageSchedule`]: ASAP stage demand (operations and memory accesses
//!   per stage), without edges.
//!
//! Raw inputs are charged one memory access the first time they are used as
//! an operand; results of earlier operations become dependency edges.
//!
//! # Quick start
//!
//! ```
//! use opgraph::{FullGraph, GraphRecorder, OpKind, Trace};
//!
//! let t = Trace::new(FullGraph::new());
//! let a = t.input(2.0);
//! let b = t.input(3.0);
//! let c = &a + &b;        // node 0, reads a and b
//! let d = &c * &a;        // node 1, depends on node 0
//! assert_eq!(d.value(), 10.0);
//!
//! let graph = t.recorder();
//! assert_eq!(graph.store().get(0, 1), 1);
//! let diag = graph.store().diagonal(d.node());
//! assert_eq!(diag.kind, Some(OpKind::Multiply));
//! assert_eq!(diag.mem_level, 0);
//! drop(graph);
//!
//! let mut out = Vec::new();
//! t.write_sparse(&mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "2\n0 0 201\n0 1 1\n1 1 2\n");
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod node;
pub mod recorder;
pub mod registry;
pub mod store;
mod trace;
mod value;

pub use codec::{decode_mem_level, encode_mem_level, DiagonalCode, OpKind};
pub use config::TraceConfig;
pub use error::TraceError;
pub use export::{read_sparse, SparseDump};
pub use lifecycle::{LiveCount, LiveStats};
pub use node::NodeId;
pub use recorder::{
    FullGraph, GraphRecorder, NamedTrace, OpForm, OpRecord, Operand, Recorder, Source,
    StageSchedule,
};
pub use registry::FunctionRegistry;
pub use store::GraphStore;
pub use trace::Trace;
pub use value::{Payload, Traced};
