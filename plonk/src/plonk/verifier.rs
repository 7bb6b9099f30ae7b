use crate::errors::{ConstraintFailure, PlonkError, Result, SetupFault, Stage};
use crate::plonk::{
    constraint_system::N_WIRES_PER_GATE,
    helpers::{eval_pi_poly, fold_quotient, identity_residual, r_commitment, PlonkChallenges},
    indexer::{PlonkProof, PlonkVerifierParams, N_QUOTIENT_CHUNKS},
    transcript::transcript_init_plonk,
};
use crate::poly_commit::{
    errors::PolyComSchemeError, kzg_poly_com::KZGCommitment, pcs::PolyComScheme,
};
use crate::Fr;
use ark_ff::Zero;

/// Number of values the batched opening at \zeta claims.
const N_BATCHED_VALUES: usize = 2 + 2 * N_WIRES_PER_GATE - 1;

/// Verifier of a single-axis proof.
/// It recomputes the challenges, checks the constraint identity at \zeta with the claimed
/// values, then checks the openings at \zeta and \zeta\omega with one pairing equation.
pub fn verifier(
    verifier_params: &PlonkVerifierParams,
    public_inputs: &[Fr],
    proof: &PlonkProof,
) -> Result<()> {
    if public_inputs.len() != verifier_params.nb_public {
        return Err(PlonkError::Setup(SetupFault::PublicInputLength {
            expected: verifier_params.nb_public,
            got: public_inputs.len(),
        }));
    }
    if proof.cm_w_vec.len() != N_WIRES_PER_GATE
        || proof.cm_t_vec.len() != N_QUOTIENT_CHUNKS
        || proof.batched_proof.claimed_values.len() != N_BATCHED_VALUES
    {
        return Err(PlonkError::Setup(SetupFault::MalformedProof));
    }

    let mut transcript = transcript_init_plonk(verifier_params, public_inputs)?;
    for cm_w in proof.cm_w_vec.iter() {
        transcript.bind_commitment("gamma", cm_w)?;
    }
    transcript.bind_commitment("alpha", &proof.cm_z)?;
    for cm_t in proof.cm_t_vec.iter() {
        transcript.bind_commitment("zeta", cm_t)?;
    }
    let challenges = PlonkChallenges {
        gamma: transcript.challenge("gamma")?,
        beta: transcript.challenge("beta")?,
        alpha: transcript.challenge("alpha")?,
        zeta: transcript.challenge("zeta")?,
    };
    let zeta = challenges.zeta;

    let values = &proof.batched_proof.claimed_values;
    let t_eval_zeta = values[0];
    let r_eval_zeta = values[1];
    let w_polys_eval_zeta = &values[2..2 + N_WIRES_PER_GATE];
    let s_polys_eval_zeta = &values[2 + N_WIRES_PER_GATE..];
    let z_eval_zeta_omega = proof.z_shifted_proof.claimed_value;

    let (pi_eval_zeta, l1_eval_zeta) = eval_pi_poly(verifier_params, public_inputs, &zeta);
    let residual = identity_residual(
        verifier_params,
        &t_eval_zeta,
        &r_eval_zeta,
        w_polys_eval_zeta,
        s_polys_eval_zeta,
        &z_eval_zeta_omega,
        &challenges,
        &pi_eval_zeta,
        &l1_eval_zeta,
    );
    if !residual.is_zero() {
        return Err(PlonkError::ConstraintFailure(ConstraintFailure::Residual {
            stage: Stage::SingleAxis,
            residual,
        }));
    }

    let cm_r = r_commitment(
        verifier_params,
        &proof.cm_z,
        w_polys_eval_zeta,
        s_polys_eval_zeta,
        &z_eval_zeta_omega,
        &challenges,
        &l1_eval_zeta,
    );
    let n = verifier_params.domain.size();
    let cm_folded_t: KZGCommitment = fold_quotient(&proof.cm_t_vec, &zeta, n + 2);
    let mut digests = vec![cm_folded_t, cm_r];
    digests.extend(proof.cm_w_vec.iter().copied());
    digests.extend(
        verifier_params
            .cm_s_vec
            .iter()
            .take(N_WIRES_PER_GATE - 1)
            .copied(),
    );

    let fold_failure = |_: PolyComSchemeError| {
        PlonkError::ConstraintFailure(ConstraintFailure::Fold {
            stage: Stage::SingleAxis,
        })
    };
    let pcs = &verifier_params.pcs;
    let (opening_zeta, digest_zeta) = pcs
        .fold_proof(&digests, &proof.batched_proof, &zeta)
        .map_err(fold_failure)?;
    pcs.batch_verify_multi_points(
        &[digest_zeta, proof.cm_z],
        &[opening_zeta, proof.z_shifted_proof.clone()],
        &[zeta, zeta * verifier_params.domain.generator()],
    )
    .map_err(fold_failure)
}
