use criterion::{criterion_group, criterion_main, Criterion};
use piano_plonk::distributed::{
    coordinator::ChallengeSource, indexer::indexer as distributed_indexer,
    prover::prover as distributed_prover, transport::LocalTransport,
};
use piano_plonk::plonk::{
    constraint_system::{Circuit, Permutation},
    indexer::indexer,
    prover::{prover, ProverConfig},
};
use piano_plonk::poly_commit::{
    dkzg::DistributedSRS, field_polynomial::EvaluationDomain, kzg_poly_com::KZGCommitmentScheme,
};
use piano_plonk::Fr;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;
use std::thread;

// x_{i+1} = x_i * x_i, x_0 public
fn squaring_chain(len: usize, seed: u64) -> (Circuit, Vec<Fr>) {
    let mut cs = Circuit::new(1, 0, len);
    let mut witness = vec![Fr::from(seed)];
    for i in 0..len {
        cs.insert_mul_gate(i, i, i + 1).unwrap();
        witness.push(witness[i] * witness[i]);
    }
    (cs, witness)
}

fn bench_prover(c: &mut Criterion) {
    let mut prng = ChaChaRng::from_seed([0u8; 32]);
    let (cs, witness) = squaring_chain(1000, 3);
    let n = cs.size();
    let pcs = KZGCommitmentScheme::new(n + 2, &mut prng);
    let perm = Permutation::from_wiring(&cs, n).unwrap();
    let prover_params = indexer(&cs, &perm, &pcs).unwrap();

    let mut prover_group = c.benchmark_group("bench_prover");
    prover_group.sample_size(10);
    prover_group.bench_function(format!("single axis, n = {}", n), |b| {
        b.iter(|| {
            prover(&mut prng, &cs, &prover_params, &witness, &ProverConfig::default()).unwrap()
        })
    });

    let m = 4;
    let parties: Vec<(Circuit, Vec<Fr>)> = (0..m)
        .map(|p| squaring_chain(250, p as u64 + 2))
        .collect();
    let circuits: Vec<Circuit> = parties.iter().map(|(cs, _)| cs.clone()).collect();
    let n = circuits[0].size();
    let domain_y = EvaluationDomain::new(m).unwrap();
    let srs = DistributedSRS::new(&domain_y, n + 2, m, &mut prng);
    let (party_params, _) = distributed_indexer(&circuits, &[], &srs).unwrap();

    prover_group.bench_function(format!("two axis, {} parties, n = {}", m, n), |b| {
        b.iter(|| {
            thread::scope(|s| {
                let handles: Vec<_> = LocalTransport::mesh(m)
                    .into_iter()
                    .zip(party_params.iter())
                    .zip(parties.iter())
                    .map(|((transport, params), (cs, witness))| {
                        s.spawn(move || {
                            let mut prng = ChaChaRng::from_seed([params.party as u8; 32]);
                            let source = ChallengeSource::new(transport);
                            distributed_prover(
                                &mut prng,
                                &source,
                                cs,
                                params,
                                witness,
                                &ProverConfig::default(),
                            )
                            .unwrap()
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
            })
        })
    });
    prover_group.finish();
}

criterion_group!(benches, bench_prover);
criterion_main!(benches);
