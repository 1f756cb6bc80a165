//! Plain-text exports.
//!
//! - Sparse: first line is the op count, then `row col value` per entry in
//!   row-major order.
//! - Dense: `N` lines of `N` space-separated integers, `N` = op count.
//! - Operand names: one line per operation, names in operand order.
//! - Stage tables: one integer per line, indexed by stage.
//! - DOT: the dependency graph for Graphviz.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::codec::{decode_mem_level, OpKind};
use crate::error::TraceError;
use crate::recorder::{GraphRecorder, NamedTrace, StageSchedule};
use crate::store::GraphStore;
use crate::trace::Trace;

/// Write the sparse dependency export.
pub fn write_sparse<W: Write>(store: &GraphStore, op_count: u64, mut out: W) -> Result<(), TraceError> {
    writeln!(out, "{op_count}")?;
    for (r, c, v) in store.iter() {
        writeln!(out, "{r} {c} {v}")?;
    }
    out.flush()?;
    Ok(())
}

/// Write the dense `op_count x op_count` matrix export.
pub fn write_dense<W: Write>(store: &GraphStore, op_count: u64, mut out: W) -> Result<(), TraceError> {
    let mut line = String::new();
    for i in 0..op_count {
        line.clear();
        for j in 0..op_count {
            if j > 0 {
                line.push(' ');
            }
            line.push_str(&store.get(i, j).to_string());
        }
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Write one line per row of operand names.
pub fn write_names<W: Write>(rows: &[Vec<String>], mut out: W) -> Result<(), TraceError> {
    for row in rows {
        writeln!(out, "{}", row.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Write one count per line.
pub fn write_counts<W: Write>(counts: &[u64], mut out: W) -> Result<(), TraceError> {
    for count in counts {
        writeln!(out, "{count}")?;
    }
    out.flush()?;
    Ok(())
}

/// Write the dependency graph in Graphviz DOT form.
///
/// Nodes are labelled with their operator symbol and id, plus the memory
/// level when it is non-zero.
pub fn write_dot<W: Write>(store: &GraphStore, mut out: W) -> Result<(), TraceError> {
    writeln!(out, "digraph opgraph {{")?;
    for (r, c, code) in store.iter() {
        if r != c {
            continue;
        }
        let symbol = OpKind::decode(code).map_or_else(|| "?".to_string(), OpKind::symbol);
        match decode_mem_level(code) {
            0 => writeln!(out, "    n{r} [label=\"{symbol}{r}\"];")?,
            mem => writeln!(out, "    n{r} [label=\"{symbol}{r}\\nmem {mem}\"];")?,
        }
    }
    for (src, dst, _) in store.edges() {
        writeln!(out, "    n{} -> n{};", src.index(), dst.index())?;
    }
    writeln!(out, "}}")?;
    out.flush()?;
    Ok(())
}

/// A sparse export read back from text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseDump {
    pub op_count: u64,
    pub store: GraphStore,
}

/// Parse a sparse export. Blank lines are ignored.
pub fn read_sparse<R: BufRead>(input: R) -> Result<SparseDump, TraceError> {
    let mut lines = input.lines().enumerate();

    let op_count = loop {
        let Some((i, line)) = lines.next() else {
            return Err(TraceError::Parse {
                line: 1,
                message: "missing op count".into(),
            });
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        break line.parse::<u64>().map_err(|e| TraceError::Parse {
            line: i + 1,
            message: format!("bad op count: {e}"),
        })?;
    };

    let mut store = GraphStore::new();
    for (i, line) in lines {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let parse_err = |message: String| TraceError::Parse { line: i + 1, message };
        if fields.len() != 3 {
            return Err(parse_err(format!("expected 3 fields, found {}", fields.len())));
        }
        let r = fields[0].parse::<u64>().map_err(|e| parse_err(format!("bad row: {e}")))?;
        let c = fields[1].parse::<u64>().map_err(|e| parse_err(format!("bad column: {e}")))?;
        let v = fields[2].parse::<i64>().map_err(|e| parse_err(format!("bad value: {e}")))?;
        store.insert_or_replace(r, c, v);
    }

    Ok(SparseDump { op_count, store })
}

fn create(path: &Path) -> Result<BufWriter<File>, TraceError> {
    Ok(BufWriter::new(File::create(path)?))
}

/// `<base>` + `suffix`, keeping any directory part of `base`.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

impl<R: GraphRecorder> Trace<R> {
    pub fn write_sparse<W: Write>(&self, out: W) -> Result<(), TraceError> {
        write_sparse(self.recorder().store(), self.op_count(), out)
    }

    pub fn write_dense<W: Write>(&self, out: W) -> Result<(), TraceError> {
        write_dense(self.recorder().store(), self.op_count(), out)
    }

    pub fn write_dot<W: Write>(&self, out: W) -> Result<(), TraceError> {
        write_dot(self.recorder().store(), out)
    }

    /// Write the sparse export to `path`.
    pub fn write_sparse_file(&self, path: impl AsRef<Path>) -> Result<(), TraceError> {
        let path = path.as_ref();
        self.write_sparse(create(path)?)?;
        info!(path = %path.display(), entries = self.recorder().store().len(), "wrote sparse export");
        Ok(())
    }

    /// Write the dense matrix to `<base>.txt` and return that path.
    pub fn write_result(&self, base: impl AsRef<Path>) -> Result<PathBuf, TraceError> {
        let path = with_suffix(base.as_ref(), ".txt");
        self.write_dense(create(&path)?)?;
        info!(path = %path.display(), nodes = self.op_count(), "wrote dense export");
        Ok(path)
    }
}

impl Trace<NamedTrace> {
    pub fn write_inputs<W: Write>(&self, out: W) -> Result<(), TraceError> {
        write_names(self.recorder().inputs(), out)
    }

    /// Write the operand-name table to `path`.
    pub fn write_inputs_file(&self, path: impl AsRef<Path>) -> Result<(), TraceError> {
        let path = path.as_ref();
        self.write_inputs(create(path)?)?;
        info!(path = %path.display(), rows = self.recorder().inputs().len(), "wrote operand names");
        Ok(())
    }
}

impl Trace<StageSchedule> {
    pub fn write_op_stages<W: Write>(&self, out: W) -> Result<(), TraceError> {
        write_counts(self.recorder().op_counts(), out)
    }

    pub fn write_mem_stages<W: Write>(&self, out: W) -> Result<(), TraceError> {
        write_counts(self.recorder().mem_accesses(), out)
    }

    /// Write `<base>_op.txt` and `<base>_mem.txt`, returning both paths.
    pub fn write_stage_files(&self, base: impl AsRef<Path>) -> Result<(PathBuf, PathBuf), TraceError> {
        let base = base.as_ref();
        let op = with_suffix(base, "_op.txt");
        let mem = with_suffix(base, "_mem.txt");
        self.write_op_stages(create(&op)?)?;
        self.write_mem_stages(create(&mem)?)?;
        info!(
            op = %op.display(),
            mem = %mem.display(),
            stages = self.recorder().depth(),
            "wrote stage tables"
        );
        Ok((op, mem))
    }
}
