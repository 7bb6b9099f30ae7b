use crate::distributed::{
    helpers::{
        alpha_terms, column_digests, column_numerator, party_pi_evals, row_digests,
        row_opening_bindings, transcript_init_distributed, DistributedChallenges,
    },
    indexer::{
        DistributedProof, DistributedVerifierParams, HY, N_COLUMN_VALUES, N_HX_CHUNKS,
        N_HY_CHUNKS, N_ROW_DIGESTS, W,
    },
};
use crate::errors::{ConstraintFailure, PlonkError, Result, SetupFault, Stage};
use crate::plonk::constraint_system::N_WIRES_PER_GATE;
use crate::poly_commit::{
    errors::PolyComSchemeError,
    kzg_poly_com::KZGCommitment,
    pcs::{BatchOpeningProof, OpeningProof, PolyComScheme},
};
use crate::Fr;
use ark_ff::Zero;

fn fold_failure(stage: Stage) -> impl Fn(PolyComSchemeError) -> PlonkError {
    move |_| PlonkError::ConstraintFailure(ConstraintFailure::Fold { stage })
}

/// Check the row-axis openings at \alpha and \omega_X \alpha against the row digests.
/// The claimed values are column-axis commitments, so this is one pairing equation on
/// the row-axis key.
pub(crate) fn verify_row_openings(
    verifier_params: &DistributedVerifierParams,
    digests: &[KZGCommitment],
    cm_z: &KZGCommitment,
    row_batched_proof: &BatchOpeningProof<KZGCommitment>,
    z_shifted_row_proof: &OpeningProof<KZGCommitment>,
    alpha: &Fr,
) -> Result<()> {
    let pcs = &verifier_params.row_pcs;
    let (opening, digest) = pcs
        .fold_proof(digests, row_batched_proof, alpha)
        .map_err(fold_failure(Stage::RowAxis))?;
    pcs.batch_verify_multi_points(
        &[digest, *cm_z],
        &[opening, z_shifted_row_proof.clone()],
        &[*alpha, *alpha * verifier_params.domain_x.generator()],
    )
    .map_err(fold_failure(Stage::RowAxis))
}

/// Verifier of a two-axis proof. `public_inputs[i]` are the public inputs of party `i`.
///
/// The row axis is checked first: the folded opening at \alpha turns every row polynomial
/// into a column-axis commitment. The two-axis identity is then checked at `(\beta, \alpha)`
/// with the values the column-axis opening claims, and last the column fold itself.
pub fn verifier(
    verifier_params: &DistributedVerifierParams,
    public_inputs: &[Vec<Fr>],
    proof: &DistributedProof,
) -> Result<()> {
    let nb_parties = verifier_params.nb_parties();
    if public_inputs.len() != nb_parties {
        return Err(PlonkError::Setup(SetupFault::PartyCount {
            expected: nb_parties,
            got: public_inputs.len(),
        }));
    }
    for (inputs, expected) in public_inputs.iter().zip(verifier_params.nb_public.iter()) {
        if inputs.len() != *expected {
            return Err(PlonkError::Setup(SetupFault::PublicInputLength {
                expected: *expected,
                got: inputs.len(),
            }));
        }
    }
    if proof.cm_w_vec.len() != N_WIRES_PER_GATE
        || proof.cm_hx_vec.len() != N_HX_CHUNKS
        || proof.cm_hy_vec.len() != N_HY_CHUNKS
        || proof.row_batched_proof.claimed_values.len() != N_ROW_DIGESTS
        || proof.column_batched_proof.claimed_values.len() != N_COLUMN_VALUES
    {
        return Err(PlonkError::Setup(SetupFault::MalformedProof));
    }

    let mut transcript = transcript_init_distributed(verifier_params, public_inputs)?;
    for cm_w in proof.cm_w_vec.iter() {
        transcript.bind_commitment("gamma", cm_w)?;
    }
    let gamma = transcript.challenge("gamma")?;
    let eta_y = transcript.challenge("etaY")?;
    let eta_x = transcript.challenge("etaX")?;
    transcript.bind_commitment("lambda", &proof.cm_z)?;
    transcript.bind_commitment("lambda", &proof.cm_w_product)?;
    let lambda = transcript.challenge("lambda")?;
    for cm_hx in proof.cm_hx_vec.iter() {
        transcript.bind_commitment("alpha", cm_hx)?;
    }
    let alpha = transcript.challenge("alpha")?;

    // row axis
    let digests = row_digests(
        verifier_params,
        &proof.cm_w_vec,
        &proof.cm_z,
        &proof.cm_hx_vec,
        &alpha,
    );
    verify_row_openings(
        verifier_params,
        &digests,
        &proof.cm_z,
        &proof.row_batched_proof,
        &proof.z_shifted_row_proof,
        &alpha,
    )?;

    for cm in row_opening_bindings(&proof.row_batched_proof, &proof.z_shifted_row_proof) {
        transcript.bind_commitment("beta", &cm)?;
    }
    for cm_hy in proof.cm_hy_vec.iter() {
        transcript.bind_commitment("beta", cm_hy)?;
    }
    let beta = transcript.challenge("beta")?;
    let challenges = DistributedChallenges {
        gamma,
        eta_y,
        eta_x,
        lambda,
        alpha,
        beta,
    };

    // two-axis identity at (\beta, \alpha)
    let domain_y = &verifier_params.domain_y;
    let values = &proof.column_batched_proof.claimed_values;
    let lagrange_y = domain_y.lagrange_basis_at(&beta);
    let pi = party_pi_evals(verifier_params, public_inputs, &alpha)
        .iter()
        .zip(lagrange_y.iter())
        .fold(Fr::zero(), |acc, (pi_i, r_i)| acc + *pi_i * r_i);
    let terms = alpha_terms(verifier_params, &challenges);
    let numerator = column_numerator(
        &values[..=W],
        proof.w_shifted_proof.claimed_value,
        pi,
        beta,
        lagrange_y[0],
        &terms,
        &challenges,
    );
    let residual = numerator - values[HY] * domain_y.evaluate_vanishing(&beta);
    if !residual.is_zero() {
        return Err(PlonkError::ConstraintFailure(ConstraintFailure::Residual {
            stage: Stage::ColumnAxis,
            residual,
        }));
    }

    // column axis
    let digests = column_digests(
        verifier_params,
        &proof.row_batched_proof,
        &proof.z_shifted_row_proof,
        &proof.cm_w_product,
        &proof.cm_hy_vec,
        &beta,
    );
    let pcs = &verifier_params.column_pcs;
    let (opening, digest) = pcs
        .fold_proof(&digests, &proof.column_batched_proof, &beta)
        .map_err(fold_failure(Stage::ColumnAxis))?;
    pcs.batch_verify_multi_points(
        &[digest, proof.cm_w_product],
        &[opening, proof.w_shifted_proof.clone()],
        &[beta, beta * domain_y.generator()],
    )
    .map_err(fold_failure(Stage::ColumnAxis))
}
