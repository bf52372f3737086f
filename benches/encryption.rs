use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use registration_based_encryption::{
    encryption::encrypt,
    registration::register,
    setup::{setup, SecretKey},
    storage::MemoryStorage,
};

type E = ark_bls12_381::Bls12_381;

fn bench_encrypt(c: &mut Criterion) {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let mut rng = ark_std::test_rng();
    let mut group = c.benchmark_group("encrypt");

    for users in [1usize, 4, 16, 31] {
        let crs = setup::<E, _>(1024, &mut rng).unwrap();
        let mut store = MemoryStorage::<E>::new();
        for id in 0..users {
            let keys = SecretKey::<E>::new(&mut rng)
                .derive_keys(&crs, id)
                .unwrap();
            register(&crs, &mut store, id, &keys.pk, &keys.helping_values).unwrap();
        }
        let msg = crs.random_message(&mut rng);

        group.bench_with_input(BenchmarkId::from_parameter(users), &store, |b, store| {
            b.iter(|| encrypt(&crs, store, 0, &msg, &mut rng).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encrypt);
criterion_main!(benches);
