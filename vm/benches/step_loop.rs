use berry_vm::{Interpreter, RunArgs, TraceRecorder};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

const ITERATIONS: [u8; 3] = [10, 100, 250];

/// Counts down from `n`, storing the counter in memory on every iteration.
///
/// ```text
/// PUSH1 n
/// JUMPDEST            ; loop (2)
/// DUP1 PUSH1 0 MSTORE
/// PUSH1 1 SWAP1 SUB
/// DUP1 PUSH1 2 JUMPI
/// STOP
/// ```
fn countdown(n: u8) -> Vec<u8> {
    vec![
        0x60, n, 0x5b, 0x80, 0x60, 0x00, 0x52, 0x60, 0x01, 0x90, 0x03, 0x80, 0x60, 0x02, 0x57,
        0x00,
    ]
}

/// Straight-line arithmetic over random operands.
fn random_arithmetic(rng: &mut StdRng, ops: usize) -> Vec<u8> {
    const BINARY_OPS: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x06, 0x16, 0x17, 0x18];
    let mut code = vec![0x7f];
    code.extend((0..32).map(|_| rng.random::<u8>()));
    for _ in 0..ops {
        code.push(0x7f);
        code.extend((0..32).map(|_| rng.random::<u8>()));
        code.push(BINARY_OPS[rng.random_range(0..BINARY_OPS.len())]);
    }
    code
}

fn bench_interpreter(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interpreter");

    for &n in &ITERATIONS {
        group.bench_with_input(BenchmarkId::new("countdown", n), &n, |b, &n| {
            let code = countdown(n);
            b.iter(|| Interpreter::default().run(RunArgs::new(code.clone())))
        });
    }

    group.bench_function("random_arithmetic", |b| {
        b.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(42);
                random_arithmetic(&mut rng, 500)
            },
            |code| Interpreter::default().run(RunArgs::new(code)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_recorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("TraceRecorder");

    for &n in &ITERATIONS {
        group.bench_with_input(BenchmarkId::new("countdown", n), &n, |b, &n| {
            let code = countdown(n);
            b.iter(|| TraceRecorder::default().run(RunArgs::new(code.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_interpreter, bench_recorder);
criterion_main!(benches);
