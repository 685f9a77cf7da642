//! Report rendering benchmarks.
//!
//! Measures the cost of one full rebuild of the report:
//! - Ingesting a batch of facts into a fresh state
//! - Rendering a large state to KDL
//!
//! Run with: cargo bench --bench render_bench

use apiusage::{
    render_report, DiscoveredApi, DiscoveredApiDeclarationSource, DiscoveredReference, Fact,
    ReportState,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const TFMS: [&str; 3] = ["net48", "net6.0", "net8.0"];

/// Facts for `apis` declared identities, referenced `references` times in total.
///
/// Every third referenced identity is undeclared, so all three sections of the
/// report are populated.
fn synthetic_facts(apis: usize, references: usize) -> Vec<Fact> {
    let mut facts = vec![Fact::from(DiscoveredApiDeclarationSource {
        repository_url: "https://example.com/lib".to_string(),
        branch: "main".to_string(),
        commit_id: "0123456789abcdef".to_string(),
    })];

    for i in 0..apis {
        for tfm in TFMS {
            facts.push(Fact::from(DiscoveredApi {
                api_identity: format!("Lib.Type{}.Method{}()", i / 10, i % 10),
                declaration_url: format!("https://example.com/lib/Type{}.cs#L{}", i / 10, i),
                target_framework: tfm.to_string(),
                exclude_from_unused_report: false,
            }));
        }
    }

    for i in 0..references {
        let target = (i * 7) % (apis + apis / 2);
        facts.push(Fact::from(DiscoveredReference {
            api_identity: format!("Lib.Type{}.Method{}()", target / 10, target % 10),
            api_version: format!("{}.{}.0", i % 4, i % 3),
            repository_url: format!("https://example.com/consumer{}", i % 25),
            referencing_symbol: format!("Consumer.Caller{}()", i),
            reference_url: (i % 9 != 0).then(|| format!("https://example.com/c/{}.cs#L{}", i % 25, i)),
            target_framework: TFMS[i % TFMS.len()].to_string(),
        }));
    }

    facts
}

fn benchmark_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for size in [100usize, 1_000] {
        let facts = synthetic_facts(size, size * 5);
        group.throughput(Throughput::Elements(facts.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &facts, |b, facts| {
            b.iter(|| {
                let mut state = ReportState::new();
                state.ingest(facts.iter().cloned());
                black_box(state)
            })
        });
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [100usize, 1_000] {
        let mut state = ReportState::new();
        state.ingest(synthetic_facts(size, size * 5));
        group.bench_with_input(BenchmarkId::from_parameter(size), &state, |b, state| {
            b.iter(|| black_box(render_report("Lib", state).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_ingest, benchmark_render);
criterion_main!(benches);
