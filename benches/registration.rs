use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use registration_based_encryption::{
    registration::register,
    setup::{setup, SecretKey},
    storage::MemoryStorage,
};

type E = ark_bls12_381::Bls12_381;

fn bench_register(c: &mut Criterion) {
    let mut rng = ark_std::test_rng();
    let mut group = c.benchmark_group("register");
    group.sample_size(10);

    for users in [4usize, 8, 16, 32] {
        let crs = setup::<E, _>(1024, &mut rng).unwrap();
        let keys: Vec<_> = (0..users)
            .map(|id| {
                SecretKey::<E>::new(&mut rng)
                    .derive_keys(&crs, id)
                    .unwrap()
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(users), &keys, |b, keys| {
            b.iter_batched(
                MemoryStorage::<E>::new,
                |mut store| {
                    for k in keys {
                        register(&crs, &mut store, k.id, &k.pk, &k.helping_values).unwrap();
                    }
                    store
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_register);
criterion_main!(benches);
