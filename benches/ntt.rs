// benches/ntt.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ntt_engine::{NttTables, SmallModulus};
use rand::Rng;

/// NTT-friendly 60-bit prime: q - 1 = 2^18 * (2^42 - 1)
const Q_60BIT: u64 = 1152921504606584833;

fn random_poly(n: usize, q: u64) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen_range(0..q)).collect()
}

/// 1) Forward transform throughput
fn bench_forward_ntt(c: &mut Criterion) {
    let modulus = SmallModulus::new(Q_60BIT);
    for power in [10usize, 12, 14] {
        let tables = NttTables::new(power, &modulus).unwrap();
        let input = random_poly(1 << power, Q_60BIT);
        c.bench_function(&format!("forward NTT lazy n={}", 1 << power), |bencher| {
            bencher.iter(|| {
                let mut buffer = input.clone();
                tables.forward_ntt_lazy(black_box(&mut buffer));
                black_box(buffer)
            })
        });
    }
}

/// 2) Inverse transform throughput
fn bench_inverse_ntt(c: &mut Criterion) {
    let modulus = SmallModulus::new(Q_60BIT);
    for power in [10usize, 12, 14] {
        let tables = NttTables::new(power, &modulus).unwrap();
        let mut input = random_poly(1 << power, Q_60BIT);
        tables.forward_ntt(&mut input);
        c.bench_function(&format!("inverse NTT lazy n={}", 1 << power), |bencher| {
            bencher.iter(|| {
                let mut buffer = input.clone();
                tables.inverse_ntt_lazy(black_box(&mut buffer));
                black_box(buffer)
            })
        });
    }
}

/// 3) Table construction (root search + six precomputed arrays)
fn bench_build_tables(c: &mut Criterion) {
    let modulus = SmallModulus::new(Q_60BIT);
    c.bench_function("build tables n=4096", |bencher| {
        bencher.iter(|| {
            let tables = NttTables::new(12, black_box(&modulus)).unwrap();
            black_box(tables)
        })
    });
}

/// 4) Negacyclic multiplication: schoolbook O(n^2) vs NTT O(n log n)
fn bench_negacyclic_multiply(c: &mut Criterion) {
    const N: usize = 256;
    let modulus = SmallModulus::new(Q_60BIT);
    let tables = NttTables::new(8, &modulus).unwrap();
    let a = random_poly(N, Q_60BIT);
    let b = random_poly(N, Q_60BIT);

    c.bench_function("schoolbook negacyclic 256", |bencher| {
        bencher.iter(|| {
            let mut result = vec![0u64; N];
            for i in 0..N {
                for j in 0..N {
                    let prod = modulus.mul_mod(a[i], b[j]);
                    let idx = i + j;
                    if idx < N {
                        result[idx] = (result[idx] + prod) % Q_60BIT;
                    } else {
                        result[idx - N] = (result[idx - N] + Q_60BIT - prod) % Q_60BIT;
                    }
                }
            }
            black_box(result)
        })
    });

    c.bench_function("NTT negacyclic 256", |bencher| {
        bencher.iter(|| {
            let mut a_ntt = a.clone();
            let mut b_ntt = b.clone();
            tables.forward_ntt(&mut a_ntt);
            tables.forward_ntt(&mut b_ntt);
            for (ai, &bi) in a_ntt.iter_mut().zip(b_ntt.iter()) {
                *ai = modulus.mul_mod(*ai, bi);
            }
            tables.inverse_ntt(&mut a_ntt);
            black_box(a_ntt)
        })
    });
}

criterion_group!(
    ntt_benches,
    bench_forward_ntt,
    bench_inverse_ntt,
    bench_build_tables,
    bench_negacyclic_multiply,
);
criterion_main!(ntt_benches);
