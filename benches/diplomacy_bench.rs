//! Diplomacy hot-path benchmarks
//!
//! Run with `cargo bench --bench diplomacy_bench`.

use archon_diplomacy::core::config::DiplomacyConfig;
use archon_diplomacy::core::fixed::FixedPoint64;
use archon_diplomacy::core::types::CountryId;
use archon_diplomacy::diplomacy::modifier::FIRST_RULE_MODIFIER;
use archon_diplomacy::diplomacy::{DiplomacySystem, OpinionModifier};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const COUNTRIES: u16 = 1000;

/// Deterministic war layout: pairs filled in order of increasing id distance
fn system_with_wars(wars: usize) -> DiplomacySystem {
    let mut system = DiplomacySystem::new(DiplomacyConfig::default(), COUNTRIES);
    let mut declared = 0;
    'outer: for offset in 1..COUNTRIES {
        for a in 0..COUNTRIES - offset {
            if declared == wars {
                break 'outer;
            }
            if system.declare_war(CountryId(a), CountryId(a + offset), 0).is_ok() {
                declared += 1;
            }
        }
    }
    system
}

fn bench_is_at_war(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_at_war");
    for wars in [100usize, 1_000, 10_000] {
        let system = system_with_wars(wars);
        group.bench_with_input(BenchmarkId::from_parameter(wars), &system, |b, system| {
            let mut i: u16 = 0;
            b.iter(|| {
                i = (i + 7) % (COUNTRIES - 1);
                black_box(system.is_at_war(CountryId(i), CountryId(i + 1)))
            })
        });
    }
    group.finish();
}

fn bench_get_opinion(c: &mut Criterion) {
    let mut system = system_with_wars(1_000);
    for a in 0..100u16 {
        for k in 0..8u32 {
            let modifier = OpinionModifier::new(FIRST_RULE_MODIFIER, FixedPoint64::from_int(3), 0, 720 * (k + 1));
            let _ = system.add_opinion_modifier(CountryId(a), CountryId(a + 1), modifier);
        }
    }
    c.bench_function("get_opinion_9_modifiers", |b| {
        b.iter(|| black_box(system.get_opinion(black_box(CountryId(5)), black_box(CountryId(6)), 1800)))
    });
}

fn bench_decay_sweep(c: &mut Criterion) {
    c.bench_function("decay_sweep_10k_wars", |b| {
        b.iter_batched(
            || system_with_wars(10_000),
            |mut system| black_box(system.decay_opinion_modifiers(3600)),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_is_at_war, bench_get_opinion, bench_decay_sweep);
criterion_main!(benches);
