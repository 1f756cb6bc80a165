use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use opgraph::{FullGraph, NamedTrace, Recorder, StageSchedule, Trace};
use opgraph_bench::{
    block_size, dot_product, dot_product_blocked, matrix_vector_multiply, random_matrix,
    random_vector, reduction,
};

const SIZES: [usize; 3] = [64, 256, 1024];

fn bench_reduction<R: Recorder>(c: &mut Criterion, name: &str, make: fn() -> R) {
    let mut group = c.benchmark_group(format!("reduction/{name}"));
    for n in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let t = Trace::new(make());
                let xs = random_vector(&t, "x", n);
                black_box(reduction(&xs).map(|r| r.value()));
                t.op_count()
            })
        });
    }
    group.finish();
}

fn bench_dot<R: Recorder>(c: &mut Criterion, name: &str, make: fn() -> R) {
    let mut group = c.benchmark_group(format!("dot/{name}"));
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("plain", n), &n, |b, &n| {
            b.iter(|| {
                let t = Trace::new(make());
                let x = random_vector(&t, "a", n);
                let y = random_vector(&t, "b", n);
                black_box(dot_product(&x, &y).map(|r| r.value()));
                t.op_count()
            })
        });
        group.bench_with_input(BenchmarkId::new("blocked", n), &n, |b, &n| {
            b.iter(|| {
                let t = Trace::new(make());
                let x = random_vector(&t, "a", n);
                let y = random_vector(&t, "b", n);
                black_box(dot_product_blocked(&x, &y, block_size(n)).map(|r| r.value()));
                t.op_count()
            })
        });
    }
    group.finish();
}

fn bench_matvec<R: Recorder>(c: &mut Criterion, name: &str, make: fn() -> R) {
    let mut group = c.benchmark_group(format!("matvec/{name}"));
    for n in [16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let t = Trace::new(make());
                let m = random_matrix(&t, "m", n, n);
                let v = random_vector(&t, "v", n);
                black_box(matrix_vector_multiply(&m, &v).map(|r| r.len()));
                t.op_count()
            })
        });
    }
    group.finish();
}

fn full_graph(c: &mut Criterion) {
    bench_reduction(c, "full", FullGraph::new);
    bench_dot(c, "full", FullGraph::new);
    bench_matvec(c, "full", FullGraph::new);
}

fn named_trace(c: &mut Criterion) {
    bench_reduction(c, "named", NamedTrace::new);
    bench_dot(c, "named", NamedTrace::new);
    bench_matvec(c, "named", NamedTrace::new);
}

fn stage_schedule(c: &mut Criterion) {
    bench_reduction(c, "stage", StageSchedule::new);
    bench_dot(c, "stage", StageSchedule::new);
    bench_matvec(c, "stage", StageSchedule::new);
}

criterion_group!(benches, full_graph, named_trace, stage_schedule);
criterion_main!(benches);
