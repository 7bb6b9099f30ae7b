use crate::errors::{commitment_error, PlonkError, Result, SetupFault};
use crate::plonk::{
    constraint_system::{Circuit, N_WIRES_PER_GATE},
    helpers::{
        eval_pi_poly, fold_quotient, hide_polynomial, pi_poly, r_poly, split_t_and_commit,
        t_poly, z_evals, PlonkChallenges,
    },
    indexer::{
        PlonkProof, PlonkProverParams, N_QUOTIENT_CHUNKS, WIRE_BLINDING_DEGREE, Z_BLINDING_DEGREE,
    },
    transcript::transcript_init_plonk,
    witness::{compute_lro, prepare_witness},
};
use crate::poly_commit::{field_polynomial::FpPolynomial, kzg_poly_com::KZGCommitment};
use crate::Fr;
use ark_ff::{One, Zero};
use ark_std::{end_timer, start_timer};
use rand_core::{CryptoRng, RngCore};

/// Options of a Prove call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Produce a proof even if the witness does not satisfy the circuit, after replacing
    /// the internal variables. The proof is then rejected by the verifier.
    pub force: bool,
}

/// PLONK Prover: it produces a proof that `witness` satisfies the circuit.
/// The public inputs are the first `circuit.nb_public` values of the witness.
/// It returns [PlonkError::WitnessUnsatisfied] before any commitment work when the witness
/// does not satisfy the circuit and `config.force` is not set.
/// # Example
/// ```
/// use piano_plonk::plonk::{
///     constraint_system::{Circuit, Permutation},
///     indexer::indexer,
///     prover::{prover, ProverConfig},
///     verifier::verifier,
/// };
/// use piano_plonk::poly_commit::kzg_poly_com::KZGCommitmentScheme;
/// use piano_plonk::Fr;
/// use rand_chacha::ChaChaRng;
/// use rand_core::SeedableRng;
///
/// let mut prng = ChaChaRng::from_seed([0u8; 32]);
/// let pcs = KZGCommitmentScheme::new(20, &mut prng);
///
/// // circuit x_0 * x_1 = x_2, x_0 public
/// let mut cs = Circuit::new(1, 1, 1);
/// cs.insert_mul_gate(0, 1, 2).unwrap();
/// let n = cs.size();
/// let perm = Permutation::from_wiring(&cs, n).unwrap();
/// let prover_params = indexer(&cs, &perm, &pcs).unwrap();
///
/// let witness = [Fr::from(3u64), Fr::from(4u64), Fr::from(12u64)];
/// let proof = prover(&mut prng, &cs, &prover_params, &witness, &ProverConfig::default()).unwrap();
/// assert!(verifier(prover_params.get_verifier_params_ref(), &witness[..1], &proof).is_ok());
/// ```
pub fn prover<R: CryptoRng + RngCore>(
    prng: &mut R,
    circuit: &Circuit,
    prover_params: &PlonkProverParams,
    witness: &[Fr],
    config: &ProverConfig,
) -> Result<PlonkProof> {
    let verifier_params = &prover_params.verifier_params;
    if circuit.nb_public != verifier_params.nb_public {
        return Err(PlonkError::Setup(SetupFault::PublicInputLength {
            expected: verifier_params.nb_public,
            got: circuit.nb_public,
        }));
    }
    let witness = prepare_witness(prng, circuit, witness, config.force)?;

    let prover_timer = start_timer!(|| "Plonk::Prover");
    let domain = &prover_params.domain;
    let pcs = &prover_params.pcs;
    let n = domain.size();
    let public_inputs = &witness[..circuit.nb_public];

    let mut transcript = transcript_init_plonk(verifier_params, public_inputs)?;

    // 1. build witness polynomials, hide them and commit
    let w_timer = start_timer!(|| "Round 1: witness polynomials");
    let lro = compute_lro(circuit, &witness, n)?;
    let mut w_polys = Vec::with_capacity(N_WIRES_PER_GATE);
    let mut cm_w_vec = Vec::with_capacity(N_WIRES_PER_GATE);
    for (i, evals) in lro.iter().enumerate() {
        let mut w_poly = domain.ifft(evals);
        hide_polynomial(prng, &mut w_poly, WIRE_BLINDING_DEGREE, n);
        let cm_w = pcs.commit(&w_poly).map_err(commitment_error("wires", i))?;
        transcript.bind_commitment("gamma", &cm_w)?;
        w_polys.push(w_poly);
        cm_w_vec.push(cm_w);
    }
    end_timer!(w_timer);
    tracing::debug!(n, "round 1: committed the wire polynomials");

    // 2. get challenges gamma and beta
    let gamma = transcript.challenge("gamma")?;
    let beta = transcript.challenge("beta")?;

    // 3. build the z polynomial, hide it and commit
    let z_timer = start_timer!(|| "Round 2: z polynomial");
    let (z_evals, ratio) = z_evals(prover_params, &lro, &beta, &gamma);
    if ratio != Fr::one() {
        tracing::warn!("the permutation accumulator does not return to one");
    }
    let mut z_poly = domain.ifft(&z_evals);
    hide_polynomial(prng, &mut z_poly, Z_BLINDING_DEGREE, n);
    let cm_z = pcs.commit(&z_poly).map_err(commitment_error("accumulator", 0))?;
    transcript.bind_commitment("alpha", &cm_z)?;
    end_timer!(z_timer);
    tracing::debug!("round 2: committed the accumulator");

    // 4. get challenge alpha
    let alpha = transcript.challenge("alpha")?;
    let mut challenges = PlonkChallenges {
        gamma,
        beta,
        alpha,
        zeta: Fr::zero(),
    };

    // 5. build t, split into degree-(n+2) chunks and commit
    let t_timer = start_timer!(|| "Round 3: t polynomial");
    let pi = pi_poly(prover_params, public_inputs);
    let t = t_poly(prover_params, &w_polys, &z_poly, &pi, &challenges);
    let chunk_len = n + 2;
    let (cm_t_vec, t_polys) = split_t_and_commit(
        prng,
        |p| pcs.commit(p),
        &t,
        N_QUOTIENT_CHUNKS,
        chunk_len,
        "quotient",
    )?;
    for cm_t in cm_t_vec.iter() {
        transcript.bind_commitment("zeta", cm_t)?;
    }
    end_timer!(t_timer);
    tracing::debug!(chunks = cm_t_vec.len(), "round 3: committed the quotient");

    // 6. get challenge zeta
    let zeta = transcript.challenge("zeta")?;
    challenges.zeta = zeta;

    // 7. evaluate at \zeta and \zeta\omega, build the r polynomial
    let r_timer = start_timer!(|| "Round 4: r polynomial and openings");
    let zeta_omega = zeta * domain.generator();
    let w_polys_eval_zeta: Vec<Fr> = w_polys.iter().map(|p| p.eval(&zeta)).collect();
    let s_polys_eval_zeta: Vec<Fr> = prover_params
        .s_polys
        .iter()
        .take(N_WIRES_PER_GATE - 1)
        .map(|p| p.eval(&zeta))
        .collect();
    let z_eval_zeta_omega = z_poly.eval(&zeta_omega);
    let (_, l1_eval_zeta) = eval_pi_poly(verifier_params, public_inputs, &zeta);

    let r = r_poly(
        prover_params,
        &z_poly,
        &w_polys_eval_zeta,
        &s_polys_eval_zeta,
        &z_eval_zeta_omega,
        &challenges,
        &l1_eval_zeta,
    );
    let cm_r = pcs.commit(&r).map_err(commitment_error("linearization", 0))?;

    // 8. open [foldedH, r, L, R, O, S1, S2] at \zeta and z at \zeta\omega
    let folded_t: FpPolynomial = fold_quotient(&t_polys, &zeta, chunk_len);
    let cm_folded_t: KZGCommitment = fold_quotient(&cm_t_vec, &zeta, chunk_len);
    let mut polys_to_open: Vec<&FpPolynomial> = vec![&folded_t, &r];
    polys_to_open.extend(w_polys.iter());
    polys_to_open.extend(prover_params.s_polys.iter().take(N_WIRES_PER_GATE - 1));
    let mut digests = vec![cm_folded_t, cm_r];
    digests.extend(cm_w_vec.iter().copied());
    digests.extend(
        verifier_params
            .cm_s_vec
            .iter()
            .take(N_WIRES_PER_GATE - 1)
            .copied(),
    );

    let batched_proof = pcs
        .batch_open_single_point(&polys_to_open, &digests, &zeta)
        .map_err(commitment_error("opening at zeta", 0))?;
    let z_shifted_proof = pcs
        .open(&z_poly, &zeta_omega)
        .map_err(commitment_error("opening at zeta omega", 0))?;
    end_timer!(r_timer);
    end_timer!(prover_timer);
    tracing::debug!("round 4: opened the polynomials");

    Ok(PlonkProof {
        cm_w_vec,
        cm_z,
        cm_t_vec,
        batched_proof,
        z_shifted_proof,
    })
}
