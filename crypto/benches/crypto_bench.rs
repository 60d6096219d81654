use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vouch_types::{AttestationId, Identity, Timestamp};

fn blake2b_256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("blake2b_256_256B", |b| {
        b.iter(|| vouch_crypto::blake2b_256(black_box(&data)))
    });
}

fn derive_verification_id_bench(c: &mut Criterion) {
    let attestation = AttestationId::parse("attestation-0001").unwrap();
    let verifier = Identity::parse("verifier-0001").unwrap();
    let now = Timestamp::new(1_700_000_000);

    c.bench_function("derive_verification_id", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            vouch_crypto::derive_verification_id(
                black_box(&attestation),
                black_box(&verifier),
                now,
                counter,
            )
        })
    });
}

criterion_group!(benches, blake2b_256_bench, derive_verification_id_bench);
criterion_main!(benches);
