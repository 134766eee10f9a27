//! Criterion benchmarks for simsweep_core
//!
//! Run with: cargo bench -p simsweep_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use simsweep_core::combinations::{self, Combination};
use simsweep_core::exec::{TaskResult, TrialRunner};
use simsweep_core::runner::sweep_with_runner;
use simsweep_core::{ParamValue, Parameter, ParameterSpace, ResultColumns, RowMode, SweepConfig};

/// In-process stand-in for the external executable: column `j` reports the
/// sum of the combination's numeric values plus `j`.
struct SumRunner {
    columns: usize,
}

impl TrialRunner for SumRunner {
    fn run(&self, combination: &Combination) -> TaskResult {
        let total: f64 = combination
            .values
            .iter()
            .filter_map(ParamValue::as_f64)
            .sum();
        TaskResult {
            index: combination.index,
            run: combination.run,
            values: (0..self.columns).map(|j| total + j as f64).collect(),
            exit_code: 0,
            kind: None,
        }
    }
}

fn grid_space(axes: usize, per_axis: usize) -> ParameterSpace {
    let parameters = (0..axes)
        .map(|axis| {
            let values = (0..per_axis).map(|i| ParamValue::Int(i as i64)).collect();
            Parameter::new(format!("p{axis}"), values)
        })
        .collect();
    ParameterSpace::new(parameters).unwrap()
}

fn bench_combination_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let space = grid_space(3, 10);

    for runs in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::new("runs", runs), &runs, |b, &runs| {
            b.iter(|| combinations::generate(black_box(&space), black_box(runs)))
        });
    }

    group.finish();
}

fn bench_dispatch_order_shuffle(c: &mut Criterion) {
    let space = grid_space(3, 10);
    let combinations = combinations::generate(&space, 10);

    c.bench_function("shuffle_10k_trials", |b| {
        b.iter(|| combinations::shuffled(black_box(combinations.clone())))
    });
}

fn bench_in_process_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_in_process");
    let space = grid_space(2, 20);
    let runner = SumRunner { columns: 2 };

    for workers in [1, 4, 8] {
        let config = SweepConfig {
            runs: 5,
            row_mode: RowMode::Averaged,
            columns: ResultColumns::Count(2),
            max_processes: Some(workers),
            ..SweepConfig::default()
        };

        group.bench_with_input(
            BenchmarkId::new("workers", workers),
            &config,
            |b, config| {
                b.iter(|| {
                    sweep_with_runner(black_box(&runner), black_box(&space), black_box(config), None)
                })
            },
        );
    }

    group.finish();
}

fn bench_reshape(c: &mut Criterion) {
    let space = grid_space(4, 8);
    let runner = SumRunner { columns: 3 };
    let config = SweepConfig {
        runs: 1,
        columns: ResultColumns::Count(3),
        max_processes: Some(4),
        ..SweepConfig::default()
    };
    let outcome = sweep_with_runner(&runner, &space, &config, None).unwrap();

    c.bench_function("reshape_4096_rows", |b| {
        b.iter(|| {
            outcome
                .grid
                .reshape(black_box(&space), 1, RowMode::Averaged)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_combination_generation,
    bench_dispatch_order_shuffle,
    bench_in_process_sweep,
    bench_reshape,
);
criterion_main!(benches);
