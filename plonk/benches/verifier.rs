use criterion::{criterion_group, criterion_main, Criterion};
use piano_plonk::plonk::{
    constraint_system::{Circuit, Permutation},
    indexer::indexer,
    prover::{prover, ProverConfig},
    verifier::verifier,
};
use piano_plonk::poly_commit::kzg_poly_com::KZGCommitmentScheme;
use piano_plonk::Fr;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;

fn bench_verifier(c: &mut Criterion) {
    let mut prng = ChaChaRng::from_seed([0u8; 32]);

    // x_{i+1} = x_i * x_i + x_i, x_0 public
    let len = 500;
    let mut cs = Circuit::new(1, 0, 2 * len);
    let mut witness = vec![Fr::from(5u64)];
    for i in 0..len {
        let (x, sq, next) = (2 * i, 2 * i + 1, 2 * i + 2);
        cs.insert_mul_gate(x, x, sq).unwrap();
        cs.insert_add_gate(sq, x, next).unwrap();
        let square = witness[x] * witness[x];
        witness.push(square);
        witness.push(square + witness[x]);
    }

    let n = cs.size();
    let pcs = KZGCommitmentScheme::new(n + 2, &mut prng);
    let perm = Permutation::from_wiring(&cs, n).unwrap();
    let prover_params = indexer(&cs, &perm, &pcs).unwrap();
    let proof = prover(&mut prng, &cs, &prover_params, &witness, &ProverConfig::default()).unwrap();
    let verifier_params = prover_params.get_verifier_params();

    let mut verifier_group = c.benchmark_group("bench_verifier");
    verifier_group.bench_function(format!("single axis, n = {}", n), |b| {
        b.iter(|| verifier(&verifier_params, &witness[..1], &proof).unwrap())
    });
    verifier_group.finish();
}

criterion_group!(benches, bench_verifier);
criterion_main!(benches);
