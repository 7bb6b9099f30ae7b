use crate::distributed::{
    coordinator::{ChallengeSource, Coordinator},
    helpers::{
        hx_poly, hy_poly, party_pi_evals, party_pi_poly, party_z_evals, row_digests,
        column_digests, row_opening_bindings, transcript_init_distributed, DistributedChallenges,
    },
    indexer::{DistributedProof, DistributedProverParams, N_HX_CHUNKS, N_HY_CHUNKS, N_ROW_DIGESTS},
    transport::Transport,
    verifier::verify_row_openings,
};
use crate::errors::{commitment_error, BindingFault, PlonkError, Result, SetupFault};
use crate::plonk::{
    constraint_system::{Circuit, N_WIRES_PER_GATE},
    helpers::{fold_quotient, hide_polynomial, split_t_and_commit},
    indexer::{WIRE_BLINDING_DEGREE, Z_BLINDING_DEGREE},
    prover::ProverConfig,
    witness::{compute_lro, prepare_witness},
};
use crate::poly_commit::{
    field_polynomial::FpPolynomial,
    kzg_poly_com::KZGCommitment,
    pcs::{
        derive_folding_challenge, fold_elems, BatchOpeningProof, HomomorphicPolyComElem,
        OpeningProof,
    },
};
use crate::Fr;
use ark_ff::{One, Zero};
use ark_std::{end_timer, start_timer};
use rand_core::{CryptoRng, RngCore};

/// What only the authority learns while the rounds go on.
struct AuthorityState {
    public_inputs: Vec<Vec<Fr>>,
    cm_w_vec: Vec<KZGCommitment>,
    w_poly: FpPolynomial,
    cm_w_product: KZGCommitment,
    cm_z: KZGCommitment,
    cm_hx_vec: Vec<KZGCommitment>,
    /// The row-axis claims and `Z(Y, \omega_X \alpha)` as polynomials in Y.
    columns: Vec<FpPolynomial>,
}

fn missing(label: &'static str) -> PlonkError {
    PlonkError::TranscriptBinding {
        label,
        fault: BindingFault::MissingData,
    }
}

/// Two-axis prover, run by every party with its own sub-circuit, proving key and witness.
/// The authority (rank 0) returns the proof; followers return `None` once their share of
/// the work is delivered. Every challenge is a barrier between the parties.
pub fn prover<R: CryptoRng + RngCore, T: Transport>(
    prng: &mut R,
    source: &ChallengeSource<T>,
    circuit: &Circuit,
    prover_params: &DistributedProverParams,
    witness: &[Fr],
    config: &ProverConfig,
) -> Result<Option<DistributedProof>> {
    let verifier_params = &prover_params.verifier_params;
    let transport = source.transport();
    let party = prover_params.party;
    let nb_parties = verifier_params.nb_parties();
    if transport.party_count() != nb_parties {
        return Err(PlonkError::Setup(SetupFault::PartyCount {
            expected: nb_parties,
            got: transport.party_count(),
        }));
    }
    if transport.self_id() != party {
        return Err(PlonkError::Setup(SetupFault::PartyRank {
            expected: party,
            got: transport.self_id(),
        }));
    }
    if circuit.nb_public != verifier_params.nb_public[party] {
        return Err(PlonkError::Setup(SetupFault::PublicInputLength {
            expected: verifier_params.nb_public[party],
            got: circuit.nb_public,
        }));
    }
    let witness = prepare_witness(prng, circuit, witness, config.force)?;

    let prover_timer = start_timer!(|| format!("Distributed::Prover party {}", party));
    let domain_x = &prover_params.domain_x;
    let domain_y = &verifier_params.domain_y;
    let share = &prover_params.share;
    let column = &prover_params.column;
    let n = domain_x.size();
    let public_inputs = witness[..circuit.nb_public].to_vec();

    let mut coordinator = Coordinator::new(source);
    let mut authority = None;
    let expected_inputs = |p: usize| verifier_params.nb_public[p];
    if let Some(all) = coordinator.gather_with(public_inputs.clone(), expected_inputs)? {
        coordinator.set_transcript(transcript_init_distributed(verifier_params, &all)?);
        authority = Some(AuthorityState {
            public_inputs: all,
            cm_w_vec: vec![],
            w_poly: FpPolynomial::zero(),
            cm_w_product: KZGCommitment::get_identity(),
            cm_z: KZGCommitment::get_identity(),
            cm_hx_vec: vec![],
            columns: vec![],
        });
    }

    // 1. wire polynomials, summed into the global commitments
    let w_timer = start_timer!(|| "Round 1: witness polynomials");
    let lro = compute_lro(circuit, &witness, n)?;
    let mut w_polys = Vec::with_capacity(N_WIRES_PER_GATE);
    let mut partial_cm_w = Vec::with_capacity(N_WIRES_PER_GATE);
    for (i, evals) in lro.iter().enumerate() {
        let mut w_poly = domain_x.ifft(evals);
        hide_polynomial(prng, &mut w_poly, WIRE_BLINDING_DEGREE, n);
        partial_cm_w.push(share.commit_share(&w_poly).map_err(commitment_error("wires", i))?);
        w_polys.push(w_poly);
    }
    let cm_w_vec = coordinator.gather_sum(partial_cm_w)?;
    if let (Some(state), Some(cm_w_vec)) = (authority.as_mut(), cm_w_vec) {
        coordinator.bind_commitments("gamma", &cm_w_vec)?;
        state.cm_w_vec = cm_w_vec;
    }
    end_timer!(w_timer);
    tracing::debug!(party, n, "round 1: committed the wire polynomials");

    let mut challenges = DistributedChallenges {
        gamma: coordinator.challenge("gamma")?,
        eta_y: coordinator.challenge("etaY")?,
        eta_x: coordinator.challenge("etaX")?,
        lambda: Fr::zero(),
        alpha: Fr::zero(),
        beta: Fr::zero(),
    };

    // 2. local accumulators, the cross-party product W, then the accumulator commitment
    let z_timer = start_timer!(|| "Round 2: accumulators");
    let (z_evals, ratio) = party_z_evals(prover_params, &lro, &challenges);
    let mut w_parts: Option<Vec<Vec<Fr>>> = None;
    if let (Some(state), Some(ratios)) = (authority.as_mut(), coordinator.gather(vec![ratio])?) {
        let mut w_values = Vec::with_capacity(nb_parties);
        let mut acc = Fr::one();
        for r in ratios.iter() {
            w_values.push(acc);
            acc *= r[0];
        }
        if acc != Fr::one() {
            tracing::warn!("the cross-party product does not return to one");
        }
        state.w_poly = domain_y.ifft(&w_values);
        state.cm_w_product = column
            .commit(&state.w_poly)
            .map_err(commitment_error("cross-party product", 0))?;
        w_parts = Some(
            (0..nb_parties)
                .map(|i| vec![w_values[i], w_values[(i + 1) % nb_parties]])
                .collect(),
        );
    }
    let w_pair = coordinator.distribute(w_parts, 2)?;

    let mut z_poly = domain_x.ifft(&z_evals);
    hide_polynomial(prng, &mut z_poly, Z_BLINDING_DEGREE, n);
    let partial_cm_z = share
        .commit_share(&z_poly)
        .map_err(commitment_error("accumulator", 0))?;
    let cm_z = coordinator.gather_sum(vec![partial_cm_z])?;
    if let (Some(state), Some(cm_z)) = (authority.as_mut(), cm_z) {
        state.cm_z = cm_z[0];
        coordinator.bind_commitments("lambda", &[state.cm_z, state.cm_w_product])?;
    }
    end_timer!(z_timer);
    tracing::debug!(party, "round 2: committed the accumulators");
    challenges.lambda = coordinator.challenge("lambda")?;

    // 3. the row-axis quotient
    let hx_timer = start_timer!(|| "Round 3: row quotient");
    let pi = party_pi_poly(prover_params, &public_inputs);
    let hx = hx_poly(prover_params, &w_polys, &z_poly, &pi, &challenges, &w_pair);
    let chunk_len = n + 2;
    let (partial_cm_hx, hx_polys) = split_t_and_commit(
        prng,
        |p| share.commit_share(p),
        &hx,
        N_HX_CHUNKS,
        chunk_len,
        "row quotient",
    )?;
    let cm_hx_vec = coordinator.gather_sum(partial_cm_hx)?;
    if let (Some(state), Some(cm_hx_vec)) = (authority.as_mut(), cm_hx_vec) {
        coordinator.bind_commitments("alpha", &cm_hx_vec)?;
        state.cm_hx_vec = cm_hx_vec;
    }
    end_timer!(hx_timer);
    tracing::debug!(party, "round 3: committed the row quotient");
    challenges.alpha = coordinator.challenge("alpha")?;
    let alpha = challenges.alpha;
    let alpha_omega = alpha * domain_x.generator();

    // 4. row-axis evaluations at \alpha, claims and the folded row opening
    let row_timer = start_timer!(|| "Round 4: row-axis opening");
    let hx_folded: FpPolynomial = fold_quotient(&hx_polys, &alpha, chunk_len);
    let mut row_polys: Vec<FpPolynomial> = Vec::with_capacity(N_ROW_DIGESTS);
    row_polys.push(hx_folded);
    row_polys.extend(w_polys.iter().cloned());
    row_polys.extend(prover_params.q_polys.iter().cloned());
    row_polys.extend(prover_params.sy_polys.iter().cloned());
    row_polys.extend(prover_params.sx_polys.iter().cloned());
    row_polys.push(z_poly.clone());
    let mut values: Vec<Fr> = row_polys.iter().map(|p| p.eval(&alpha)).collect();
    values.push(z_poly.eval(&alpha_omega));

    let mut row_claims: Option<(Vec<KZGCommitment>, Vec<KZGCommitment>, Fr)> = None;
    if let (Some(state), Some(all_values)) = (authority.as_mut(), coordinator.gather(values)?) {
        state.columns = (0..=N_ROW_DIGESTS)
            .map(|col| {
                let evals: Vec<Fr> = all_values.iter().map(|v| v[col]).collect();
                domain_y.ifft(&evals)
            })
            .collect();
        let claims = state
            .columns
            .iter()
            .enumerate()
            .map(|(i, p)| column.commit(p).map_err(commitment_error("row claims", i)))
            .collect::<Result<Vec<_>>>()?;
        let digests = row_digests(
            verifier_params,
            &state.cm_w_vec,
            &state.cm_z,
            &state.cm_hx_vec,
            &alpha,
        );
        let r = derive_folding_challenge(&alpha, &digests, &claims[..N_ROW_DIGESTS])
            .map_err(commitment_error("row fold", 0))?;
        row_claims = Some((digests, claims, r));
    }
    let r_row = coordinator.share_scalar(row_claims.as_ref().map(|c| c.2))?;

    let folded = fold_elems(&row_polys, &r_row);
    let partial_h = share
        .open_share(&folded, &alpha)
        .map_err(commitment_error("row opening", 0))?;
    let partial_h_shifted = share
        .open_share(&z_poly, &alpha_omega)
        .map_err(commitment_error("row opening", 1))?;
    let proofs = coordinator.gather_sum(vec![partial_h, partial_h_shifted])?;
    end_timer!(row_timer);
    tracing::debug!(party = coordinator.party(), "round 4: opened the row axis");

    let (state, proofs, (digests, mut claims, _)) = match (authority, proofs, row_claims) {
        (Some(state), Some(proofs), Some(row_claims)) => (state, proofs, row_claims),
        _ => {
            // followers are done once beta is announced
            coordinator.challenge("beta")?;
            end_timer!(prover_timer);
            return Ok(None);
        }
    };

    // 5. the authority checks the row fold, then builds the column-axis quotient
    let zs_claim = claims.pop().ok_or_else(|| missing("beta"))?;
    let row_batched_proof = BatchOpeningProof {
        h: proofs[0],
        claimed_values: claims,
    };
    let z_shifted_row_proof = OpeningProof {
        h: proofs[1],
        claimed_value: zs_claim,
    };
    verify_row_openings(
        verifier_params,
        &digests,
        &state.cm_z,
        &row_batched_proof,
        &z_shifted_row_proof,
        &alpha,
    )?;
    coordinator.bind_commitments(
        "beta",
        &row_opening_bindings(&row_batched_proof, &z_shifted_row_proof),
    )?;

    let hy_timer = start_timer!(|| "Round 5: column quotient");
    let pi_evals = party_pi_evals(verifier_params, &state.public_inputs, &alpha);
    let pi_y = domain_y.ifft(&pi_evals);
    let hy = hy_poly(verifier_params, &state.columns, &state.w_poly, &pi_y, &challenges)?;
    let (cm_hy_vec, hy_polys) = split_t_and_commit(
        prng,
        |p| column.commit(p),
        &hy,
        N_HY_CHUNKS,
        nb_parties,
        "column quotient",
    )?;
    coordinator.bind_commitments("beta", &cm_hy_vec)?;
    end_timer!(hy_timer);
    tracing::debug!("round 5: committed the column quotient");
    challenges.beta = coordinator.challenge("beta")?;
    let beta = challenges.beta;

    // 6. the column-axis opening at \beta, and W at \omega_Y \beta
    let column_timer = start_timer!(|| "Round 6: column-axis opening");
    let hy_folded: FpPolynomial = fold_quotient(&hy_polys, &beta, nb_parties);
    let mut polys_to_open: Vec<&FpPolynomial> = state.columns.iter().collect();
    polys_to_open.push(&state.w_poly);
    polys_to_open.push(&hy_folded);
    let digests = column_digests(
        verifier_params,
        &row_batched_proof,
        &z_shifted_row_proof,
        &state.cm_w_product,
        &cm_hy_vec,
        &beta,
    );
    let column_batched_proof = column
        .batch_open_single_point(&polys_to_open, &digests, &beta)
        .map_err(commitment_error("column opening", 0))?;
    let w_shifted_proof = column
        .open(&state.w_poly, &(beta * domain_y.generator()))
        .map_err(commitment_error("column opening", 1))?;
    end_timer!(column_timer);
    end_timer!(prover_timer);
    tracing::debug!("round 6: opened the column axis");

    Ok(Some(DistributedProof {
        cm_w_vec: state.cm_w_vec,
        cm_z: state.cm_z,
        cm_w_product: state.cm_w_product,
        cm_hx_vec: state.cm_hx_vec,
        row_batched_proof,
        z_shifted_row_proof,
        cm_hy_vec,
        column_batched_proof,
        w_shifted_proof,
    }))
}
