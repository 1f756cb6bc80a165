//! Client algorithms for opgraph benchmarks: seeded RNG, traced input
//! generators, and the linear-algebra kernels whose graphs we study.
//!
//! The kernels are written the way a host program would write them, using
//! nothing but operators on [`Traced`] values, so the same code captures a
//! full graph, a named trace or a stage schedule.

use std::rc::Rc;

use opgraph::{Payload, Recorder, Trace, Traced};

/// xoshiro256** PRNG seeding the traced benchmark inputs.
pub struct Rng {
    s: [u64; 4],
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // SplitMix64 to expand seed into state
        let mut z = seed;
        let mut s = [0u64; 4];
        for slot in &mut s {
            z = z.wrapping_add(0x9e3779b97f4a7c15);
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
            *slot = z ^ (z >> 31);
        }
        Self { s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.s[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;
        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);
        result
    }

    /// Uniform f64 in [-1, 1]
    pub fn f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64) * 2.0 - 1.0
    }
}

pub fn make_rng() -> Rng {
    Rng::new(0xDEAD_BEEF_CAFE_BABE)
}

// --- input generators ---

/// `n` named random inputs `{prefix}0 .. {prefix}{n-1}`.
pub fn random_vector<R: Recorder>(trace: &Rc<Trace<R>>, prefix: &str, n: usize) -> Vec<Traced<f64, R>> {
    let mut rng = make_rng();
    (0..n)
        .map(|i| trace.named(rng.f64(), format!("{prefix}{i}")))
        .collect()
}

/// A `rows x cols` matrix of named random inputs `{prefix}{r}_{c}`.
pub fn random_matrix<R: Recorder>(
    trace: &Rc<Trace<R>>,
    prefix: &str,
    rows: usize,
    cols: usize,
) -> Vec<Vec<Traced<f64, R>>> {
    let mut rng = make_rng();
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| trace.named(rng.f64(), format!("{prefix}{r}_{c}")))
                .collect()
        })
        .collect()
}

// --- kernels ---

/// A fresh value standing for the same node as `v`, without recording.
fn carry<T: Payload, R: Recorder>(v: &Traced<T, R>) -> Traced<T, R> {
    let mut out = v.trace().input(v.value());
    out.assign(v);
    out
}

fn pairwise<T: Payload, R: Recorder>(level: Vec<Traced<T, R>>) -> Vec<Traced<T, R>> {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    let mut it = level.into_iter();
    while let Some(a) = it.next() {
        match it.next() {
            Some(b) => next.push(&a + &b),
            None => next.push(a),
        }
    }
    next
}

fn reduce<T: Payload, R: Recorder>(mut level: Vec<Traced<T, R>>) -> Option<Traced<T, R>> {
    while level.len() > 1 {
        level = pairwise(level);
    }
    level.pop()
}

/// Sum by pairwise tree: adjacent pairs first, then pairs of those sums.
/// An odd element is carried to the end of the next level.
///
/// Returns `None` for an empty slice.
pub fn reduction<T: Payload, R: Recorder>(values: &[Traced<T, R>]) -> Option<Traced<T, R>> {
    match values {
        [] => None,
        [only] => Some(carry(only)),
        _ => reduce(
            values
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => a + b,
                    _ => carry(&pair[0]),
                })
                .collect(),
        ),
    }
}

/// All products first, then a tree [`reduction`] of them.
///
/// Extra elements of the longer slice are ignored.
pub fn dot_product<T: Payload, R: Recorder>(a: &[Traced<T, R>], b: &[Traced<T, R>]) -> Option<Traced<T, R>> {
    reduce(a.iter().zip(b).map(|(x, y)| x * y).collect())
}

/// Block length used by [`dot_product_blocked`] for vectors of length `len`.
///
/// Grows with the square root of the rounded-up length: 2 up to 16
/// elements, then 4, 4, 8, 8, ... capped at 64.
pub fn block_size(len: usize) -> usize {
    const SIZES: [usize; 12] = [2, 2, 2, 4, 4, 8, 8, 16, 16, 32, 32, 64];
    let log2 = len.max(1).next_power_of_two().trailing_zeros() as usize;
    SIZES[log2.saturating_sub(2).min(SIZES.len() - 1)]
}

/// Dot product of `block`-sized slices, whose partial results are then
/// tree-reduced. A trailing partial block is included.
pub fn dot_product_blocked<T: Payload, R: Recorder>(
    a: &[Traced<T, R>],
    b: &[Traced<T, R>],
    block: usize,
) -> Option<Traced<T, R>> {
    let partials = a
        .chunks(block.max(1))
        .zip(b.chunks(block.max(1)))
        .filter_map(|(x, y)| dot_product(x, y))
        .collect();
    reduce(partials)
}

/// `m * v`, one [`dot_product`] per row. `None` if any row is empty.
pub fn matrix_vector_multiply<T: Payload, R: Recorder>(
    m: &[Vec<Traced<T, R>>],
    v: &[Traced<T, R>],
) -> Option<Vec<Traced<T, R>>> {
    m.iter().map(|row| dot_product(row, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opgraph::{FullGraph, GraphRecorder, NamedTrace, NodeId, StageSchedule};

    fn ints<R: Recorder>(t: &Rc<Trace<R>>, values: &[i64]) -> Vec<Traced<i64, R>> {
        values.iter().map(|&v| t.input(v)).collect()
    }

    #[test]
    fn rng_is_reproducible() {
        let mut a = make_rng();
        let mut b = make_rng();
        for _ in 0..16 {
            let x = a.f64();
            assert_eq!(x, b.f64());
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn reduction_of_eight_is_three_stages() {
        let t = Trace::new(StageSchedule::new());
        let xs = ints(&t, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let sum = reduction(&xs).unwrap();
        assert_eq!(sum.value(), 36);

        let s = t.recorder();
        assert_eq!(s.op_counts(), &[4, 2, 1]);
        assert_eq!(s.mem_accesses(), &[8, 0, 0]);
    }

    #[test]
    fn odd_reduction_carries_last_element() {
        let t = Trace::new(FullGraph::new());
        let xs = ints(&t, &[1, 2, 3]);
        let sum = reduction(&xs).unwrap();
        assert_eq!(sum.value(), 6);
        // node 0 = x0 + x1, node 1 = node 0 + x2
        assert_eq!(t.op_count(), 2);
        let g = t.recorder();
        assert_eq!(g.store().get(0, 1), 1);
        assert_eq!(g.store().diagonal(NodeId::from_index(1)).mem_level, 1);
    }

    #[test]
    fn tiny_reductions() {
        let t = Trace::new(FullGraph::new());
        assert!(reduction::<i64, FullGraph>(&[]).is_none());
        let xs = ints(&t, &[5]);
        assert_eq!(reduction(&xs).unwrap().value(), 5);
        assert_eq!(t.op_count(), 0);
    }

    #[test]
    fn tree_edges() {
        let t = Trace::new(FullGraph::new());
        let xs = ints(&t, &[1, 1, 1, 1]);
        let _ = reduction(&xs).unwrap();
        let g = t.recorder();
        let edges: Vec<_> = g.store().edges().map(|(s, d, _)| (s.index(), d.index())).collect();
        assert_eq!(edges, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn dot_product_stages() {
        let t = Trace::new(StageSchedule::new());
        let a = ints(&t, &[1, 2, 3, 4]);
        let b = ints(&t, &[5, 6, 7, 8]);
        assert_eq!(dot_product(&a, &b).unwrap().value(), 70);

        let s = t.recorder();
        assert_eq!(s.op_counts(), &[4, 2, 1]);
        assert_eq!(s.mem_accesses(), &[8, 0, 0]);
    }

    #[test]
    fn block_sizes() {
        assert_eq!(block_size(0), 2);
        assert_eq!(block_size(4), 2);
        assert_eq!(block_size(16), 2);
        assert_eq!(block_size(32), 4);
        assert_eq!(block_size(100), 8);
        assert_eq!(block_size(1 << 20), 64);
    }

    #[test]
    fn blocked_dot_product() {
        let t = Trace::new(StageSchedule::new());
        let a = ints(&t, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let b = ints(&t, &[1, 1, 1, 1, 2, 2, 2, 2]);
        let r = dot_product_blocked(&a, &b, block_size(a.len())).unwrap();
        assert_eq!(r.value(), 10 + 52);

        let s = t.recorder();
        assert_eq!(s.op_counts(), &[8, 4, 2, 1]);
        assert_eq!(s.mem_accesses(), &[16, 0, 0, 0]);
    }

    #[test]
    fn matrix_vector_shares_vector_reads() {
        let t = Trace::new(StageSchedule::new());
        let m = vec![ints(&t, &[1, 2, 3]), ints(&t, &[4, 5, 6])];
        let v = ints(&t, &[1, 0, 2]);
        let out = matrix_vector_multiply(&m, &v).unwrap();
        assert_eq!(out.iter().map(Traced::value).collect::<Vec<_>>(), vec![7, 16]);

        let s = t.recorder();
        assert_eq!(s.op_counts(), &[6, 2, 2]);
        assert_eq!(s.mem_accesses(), &[9, 0, 0]);
    }

    #[test]
    fn named_inputs_label_rows() {
        let t = Trace::new(NamedTrace::new());
        let a = random_vector(&t, "a", 2);
        let b = random_vector(&t, "b", 2);
        dot_product(&a, &b).unwrap();

        let g = t.recorder();
        assert_eq!(g.inputs()[0], vec!["a0".to_string(), "b0".to_string()]);
        assert_eq!(g.inputs()[2], vec!["0".to_string(), "1".to_string()]);
        let m = random_matrix(&t, "m", 2, 3);
        assert_eq!(m[1][2].name(), "m1_2");
    }
}
