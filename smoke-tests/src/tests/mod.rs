mod smoke_distributed;

use piano_plonk::distributed::{
    coordinator::ChallengeSource,
    indexer::{indexer, CopyLink, DistributedProof, DistributedVerifierParams},
    prover::prover,
    transport::LocalTransport,
};
use piano_plonk::errors::PlonkError;
use piano_plonk::plonk::{constraint_system::Circuit, prover::ProverConfig};
use piano_plonk::poly_commit::{dkzg::DistributedSRS, field_polynomial::EvaluationDomain};
use piano_plonk::Fr;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;
use std::thread;

/// Route the provers' warnings to the test output, `RUST_LOG` permitting.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `public * secret = output` and `secret = 1`, on a domain of 8 rows.
/// The witness is `[public, 1, public]`.
pub(crate) fn identity_circuit(public: u64) -> (Circuit, Vec<Fr>) {
    let mut cs = Circuit::new(1, 1, 1);
    cs.insert_mul_gate(0, 1, 2).unwrap();
    cs.insert_constant_gate(1, Fr::from(1u64)).unwrap();
    cs.pad(8);
    (cs, [public, 1, public].map(Fr::from).to_vec())
}

/// `x_{i+1} = x_i^2` for `len` steps from the public `x_0`.
pub(crate) fn squaring_chain(len: usize, start: u64) -> (Circuit, Vec<Fr>) {
    let mut cs = Circuit::new(1, 0, len);
    let mut witness = vec![Fr::from(start)];
    for i in 0..len {
        cs.insert_mul_gate(i, i, i + 1).unwrap();
        witness.push(witness[i] * witness[i]);
    }
    (cs, witness)
}

/// Outcome of a two-axis run: what every party returned, in rank order, and the verifying key.
pub(crate) struct DistributedRun {
    pub(crate) results: Vec<Result<Option<DistributedProof>, PlonkError>>,
    pub(crate) verifier_params: DistributedVerifierParams,
}

/// Index the parties' circuits and run the prover of every party on its own thread,
/// connected by an in-process mesh.
pub(crate) fn prove_distributed(
    parties: Vec<(Circuit, Vec<Fr>)>,
    links: &[CopyLink],
    config: ProverConfig,
    seed: u8,
) -> Result<DistributedRun, PlonkError> {
    let m = parties.len();
    let mut prng = ChaChaRng::from_seed([seed; 32]);
    let circuits: Vec<Circuit> = parties.iter().map(|(cs, _)| cs.clone()).collect();
    let n = circuits.iter().map(|cs| cs.size()).max().unwrap_or(1);
    let domain_y = EvaluationDomain::new(m).unwrap();
    let srs = DistributedSRS::new(&domain_y, n + 2, m, &mut prng);
    let (party_params, verifier_params) = indexer(&circuits, links, &srs)?;

    let handles: Vec<_> = LocalTransport::mesh(m)
        .into_iter()
        .zip(party_params)
        .zip(parties)
        .map(|((transport, params), (cs, witness))| {
            let party_seed = seed.wrapping_add(params.party as u8 + 1);
            thread::spawn(move || {
                let mut prng = ChaChaRng::from_seed([party_seed; 32]);
                let source = ChallengeSource::new(transport);
                prover(&mut prng, &source, &cs, &params, &witness, &config)
            })
        })
        .collect();
    let results = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();
    Ok(DistributedRun {
        results,
        verifier_params,
    })
}
