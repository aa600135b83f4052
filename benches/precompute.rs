//! Skip table precomputation benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench precompute
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use timed_pattern::abstraction::{RegionAutomaton, ZoneAutomaton};
use timed_pattern::bm::skip_table;
use timed_pattern::fixtures;

// ============================================================================
// Benchmark: Zone vs region automaton construction
// ============================================================================

fn bench_abstraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("precompute/abstraction");

    for (name, ta) in [("ta4", fixtures::ta4()), ("ta6", fixtures::ta6()), ("phi8", fixtures::phi8())] {
        group.bench_with_input(BenchmarkId::new("zone", name), &ta, |b, ta| {
            b.iter(|| ZoneAutomaton::build(ta).num_states());
        });
        group.bench_with_input(BenchmarkId::new("region", name), &ta, |b, ta| {
            b.iter(|| RegionAutomaton::build(ta).num_states());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Skip table, shared vs fresh product automaton
// ============================================================================

fn bench_skip_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("precompute/skip_table");
    group.sample_size(10); // The product automaton can be large

    for (name, ta) in [
        ("ta4", fixtures::ta4()),
        ("ta6", fixtures::ta6()),
        ("phi8", fixtures::phi8()),
        ("hscc2014", fixtures::hscc2014()),
    ] {
        for share in [true, false] {
            let id = if share { "shared" } else { "fresh" };
            group.bench_with_input(BenchmarkId::new(id, name), &ta, |b, ta| {
                b.iter(|| skip_table(ta, share));
            });
        }
    }

    group.finish();
}

// ============================================================================
// Benchmark: Chain length scaling
// ============================================================================

fn bench_chain_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("precompute/chain");
    group.sample_size(10);

    for length in [4, 8, 16, 32] {
        let ta = fixtures::chain(length);
        group.bench_with_input(BenchmarkId::new("chain", length), &ta, |b, ta| {
            b.iter(|| skip_table(ta, true));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_abstraction, bench_skip_table, bench_chain_scaling);

criterion_main!(benches);
