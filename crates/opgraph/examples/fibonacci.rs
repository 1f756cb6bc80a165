//! Recursive Fibonacci on traced integers.
//!
//! ```text
//! cargo run -p opgraph --example fibonacci -- 6
//! ```
//!
//! Prints the sparse and DOT exports, the stage tables of the same
//! computation, and the live-value report.

use std::io;

use opgraph::{FullGraph, Recorder, StageSchedule, Trace, TraceError, Traced};

fn fib<R: Recorder>(i: &Traced<u64, R>) -> Traced<u64, R> {
    let t = i.trace();
    let one = t.constant(1);
    let two = t.constant(2);
    if *i < two {
        return i.clone();
    }
    let a = fib(&(i - &one));
    let b = fib(&(i - &two));
    &a + &b
}

fn main() -> Result<(), TraceError> {
    let n: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    let graph = Trace::new(FullGraph::new());
    let result = fib(&graph.named(n, "n"));
    println!("fib({n}) = {}", result.value());
    println!("{} operations", graph.op_count());

    let stdout = io::stdout();
    println!("\n# sparse");
    graph.write_sparse(stdout.lock())?;
    println!("\n# dot");
    graph.write_dot(stdout.lock())?;

    let stages = Trace::new(StageSchedule::new());
    let _ = fib(&stages.input(n));
    println!("\n# operations per stage");
    stages.write_op_stages(stdout.lock())?;
    println!("\n# memory accesses per stage");
    stages.write_mem_stages(stdout.lock())?;

    println!("\n{}", graph.live_stats());
    Ok(())
}
