use crate::distributed::indexer::{
    DistributedProverParams, DistributedVerifierParams, HX, N_ROW_DIGESTS, SELECTORS, SX, SY,
    W, WIRES, Y_BLOWUP, Z, ZS,
};
use crate::errors::{PlonkError, Result, SetupFault};
use crate::plonk::{
    constraint_system::N_WIRES_PER_GATE,
    helpers::{accumulate, fold_quotient},
    indexer::vanishing_coset_evals,
    transcript::Transcript,
};
use crate::poly_commit::{
    field_polynomial::{EvaluationDomain, FpPolynomial},
    kzg_poly_com::KZGCommitment,
    pcs::{BatchOpeningProof, OpeningProof},
};
use crate::Fr;
use ark_ff::{One, Zero};
use ark_std::cfg_into_iter;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Challenge labels of the two-axis protocol, in the order they are computed.
pub const DISTRIBUTED_LABELS: [&str; 6] = ["gamma", "etaY", "etaX", "lambda", "alpha", "beta"];

/// The challenges of the two-axis protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DistributedChallenges {
    pub(crate) gamma: Fr,
    pub(crate) eta_y: Fr,
    pub(crate) eta_x: Fr,
    pub(crate) lambda: Fr,
    pub(crate) alpha: Fr,
    pub(crate) beta: Fr,
}

/// Bind the verifying key and the public inputs of every party to `gamma`.
pub(crate) fn transcript_init_distributed(
    verifier_params: &DistributedVerifierParams,
    public_inputs: &[Vec<Fr>],
) -> Result<Transcript> {
    let group_order = verifier_params.cs_size.max(verifier_params.nb_parties());
    let mut transcript = Transcript::new(b"Distributed Proof", &DISTRIBUTED_LABELS, group_order);
    for cm in verifier_params
        .cm_sy_vec
        .iter()
        .chain(verifier_params.cm_sx_vec.iter())
        .chain(verifier_params.cm_q_vec.iter())
    {
        transcript.bind_commitment("gamma", cm)?;
    }
    for pi in public_inputs.iter().flatten() {
        transcript.bind_scalar("gamma", pi)?;
    }
    Ok(transcript)
}

/// Local accumulator of a party: `z[0] = 1`, `z[j+1] = z[j] f_j / g_j` with
/// f_j = \prod_c (w_c + \eta_X k_c \omega_X^j + \eta_Y \omega_Y^i + \gamma),
/// g_j = \prod_c (w_c + \eta_X sx_c(j) + \eta_Y sy_c(j) + \gamma),
/// and the ratio `z[N-1] f_{N-1} / g_{N-1}` handed to the next party.
pub(crate) fn party_z_evals(
    prover_params: &DistributedProverParams,
    lro: &[Vec<Fr>],
    challenges: &DistributedChallenges,
) -> (Vec<Fr>, Fr) {
    let verifier_params = &prover_params.verifier_params;
    let n = prover_params.domain_x.size();
    let group = prover_params.domain_x.elements();
    let k = &verifier_params.k;
    let DistributedChallenges {
        gamma, eta_y, eta_x, ..
    } = *challenges;
    let y_term = eta_y * verifier_params.domain_y.element(prover_params.party) + gamma;

    let (numerators, denominators): (Vec<Fr>, Vec<Fr>) = cfg_into_iter!(0..n)
        .map(|j| {
            let mut numerator = Fr::one();
            let mut denominator = Fr::one();
            for c in 0..lro.len() {
                numerator *= lro[c][j] + eta_x * k[c] * group[j] + y_term;
                denominator *= lro[c][j]
                    + eta_x * prover_params.sx_evals[c][j]
                    + eta_y * prover_params.sy_evals[c][j]
                    + gamma;
            }
            (numerator, denominator)
        })
        .unzip();
    accumulate(&numerators, denominators)
}

/// The party's row-axis quotient
/// Hx_i(X) = [gate + PI_i + \lambda perm_i + \lambda^2 L_0(X)(z_i(X) - 1)] / (X^N - 1),
/// perm_i = (1 - L_{N-1}(X))(z_i(\omega X) G - z_i(X) F) + L_{N-1}(X)(W_{i+1} G - W_i z_i(X) F).
pub(crate) fn hx_poly(
    prover_params: &DistributedProverParams,
    w_polys: &[FpPolynomial],
    z: &FpPolynomial,
    pi: &FpPolynomial,
    challenges: &DistributedChallenges,
    w_pair: &[Fr],
) -> FpPolynomial {
    let verifier_params = &prover_params.verifier_params;
    let n = prover_params.domain_x.size();
    let domain_m = &prover_params.domain_x_m;
    let m = domain_m.size();
    let factor = m / n;
    let k = &verifier_params.k;
    let DistributedChallenges {
        gamma,
        eta_y,
        eta_x,
        lambda,
        ..
    } = *challenges;
    let y_term = eta_y * verifier_params.domain_y.element(prover_params.party) + gamma;
    let (w_cur, w_next) = (w_pair[0], w_pair[1]);

    let w_coset_evals: Vec<Vec<Fr>> = w_polys.iter().map(|p| domain_m.coset_fft(p)).collect();
    let pi_coset_evals = domain_m.coset_fft(pi);
    let z_coset_evals = domain_m.coset_fft(z);
    let q = &prover_params.q_coset_evals;

    let hx_coset_evals: Vec<Fr> = cfg_into_iter!(0..m)
        .map(|point| {
            let (l, r, o) = (
                w_coset_evals[0][point],
                w_coset_evals[1][point],
                w_coset_evals[2][point],
            );
            let gate = q[0][point] * l
                + q[1][point] * r
                + q[2][point] * l * r
                + q[3][point] * o
                + q[4][point]
                + pi_coset_evals[point];

            let x = prover_params.coset_quotient[point];
            let mut f = Fr::one();
            let mut g = Fr::one();
            for c in 0..N_WIRES_PER_GATE {
                let w = w_coset_evals[c][point];
                f *= w + eta_x * k[c] * x + y_term;
                g *= w
                    + eta_x * prover_params.sx_coset_evals[c][point]
                    + eta_y * prover_params.sy_coset_evals[c][point]
                    + gamma;
            }
            let z_x = z_coset_evals[point];
            let z_wx = z_coset_evals[(point + factor) % m];
            let l_last = prover_params.l_last_coset_evals[point];
            let perm = (Fr::one() - l_last) * (z_wx * g - z_x * f)
                + l_last * (w_next * g - w_cur * z_x * f);
            let boundary = prover_params.l0_coset_evals[point] * (z_x - Fr::one());
            let numerator = gate + lambda * (perm + lambda * boundary);
            numerator * prover_params.z_h_inv_coset_evals[point % factor]
        })
        .collect();

    domain_m.coset_ifft(&hx_coset_evals)
}

/// The values at \alpha the column identity needs besides the opened polynomials.
pub(crate) struct AlphaTerms {
    l0: Fr,
    l_last: Fr,
    z_h: Fr,
    id: [Fr; N_WIRES_PER_GATE],
}

pub(crate) fn alpha_terms(
    verifier_params: &DistributedVerifierParams,
    challenges: &DistributedChallenges,
) -> AlphaTerms {
    let domain_x = &verifier_params.domain_x;
    let alpha = challenges.alpha;
    let lagrange = domain_x.lagrange_basis_at(&alpha);
    let mut id = [Fr::zero(); N_WIRES_PER_GATE];
    for (id_c, k_c) in id.iter_mut().zip(verifier_params.k.iter()) {
        *id_c = challenges.eta_x * k_c * alpha;
    }
    AlphaTerms {
        l0: lagrange[0],
        l_last: lagrange[domain_x.size() - 1],
        z_h: domain_x.evaluate_vanishing(&alpha),
        id,
    }
}

/// The two-axis identity at `(y, \alpha)` minus `Hx(y, \alpha)(\alpha^N - 1)`, from the values
/// of the column polynomials at `y` laid out as in the column opening (`values[W]` is `W(y)`)
/// and `ws = W(\omega_Y y)`. It vanishes on the column domain.
pub(crate) fn column_numerator(
    values: &[Fr],
    ws: Fr,
    pi: Fr,
    y: Fr,
    ly0: Fr,
    terms: &AlphaTerms,
    challenges: &DistributedChallenges,
) -> Fr {
    let DistributedChallenges {
        gamma,
        eta_y,
        eta_x,
        lambda,
        ..
    } = *challenges;
    let w = &values[WIRES..WIRES + N_WIRES_PER_GATE];
    let q = &values[SELECTORS..SELECTORS + 5];
    let gate = q[0] * w[0] + q[1] * w[1] + q[2] * w[0] * w[1] + q[3] * w[2] + q[4] + pi;

    let y_term = eta_y * y + gamma;
    let mut f = Fr::one();
    let mut g = Fr::one();
    for c in 0..N_WIRES_PER_GATE {
        f *= w[c] + terms.id[c] + y_term;
        g *= w[c] + eta_x * values[SX + c] + eta_y * values[SY + c] + gamma;
    }
    let (z, zs, w_y) = (values[Z], values[ZS], values[W]);
    let perm = (Fr::one() - terms.l_last) * (zs * g - z * f)
        + terms.l_last * (ws * g - w_y * z * f);
    let x_boundary = terms.l0 * (z - Fr::one());
    let y_boundary = ly0 * (w_y - Fr::one());

    gate + lambda * (perm + lambda * (x_boundary + lambda * y_boundary)) - values[HX] * terms.z_h
}

/// The column-axis quotient `Hy(Y)`, the column numerator divided by `Y^M - 1`.
/// `columns` are the row-axis claims and `Z(Y, \omega_X \alpha)` as polynomials in Y.
pub(crate) fn hy_poly(
    verifier_params: &DistributedVerifierParams,
    columns: &[FpPolynomial],
    w_poly: &FpPolynomial,
    pi: &FpPolynomial,
    challenges: &DistributedChallenges,
) -> Result<FpPolynomial> {
    let domain_y = &verifier_params.domain_y;
    let size = Y_BLOWUP * domain_y.size();
    let domain_m = EvaluationDomain::new(size)
        .ok_or(PlonkError::Setup(SetupFault::DomainUnsupported { size }))?;
    let coset = domain_m.coset_elements();
    let (ly0, z_h_inv) = vanishing_coset_evals(domain_y, &coset);
    let terms = alpha_terms(verifier_params, challenges);

    let column_evals: Vec<Vec<Fr>> = columns.iter().map(|p| domain_m.coset_fft(p)).collect();
    let w_evals = domain_m.coset_fft(w_poly);
    let pi_evals = domain_m.coset_fft(pi);

    let hy_coset_evals: Vec<Fr> = cfg_into_iter!(0..size)
        .map(|point| {
            let mut values = [Fr::zero(); W + 1];
            for (value, evals) in values.iter_mut().zip(column_evals.iter()) {
                *value = evals[point];
            }
            values[W] = w_evals[point];
            let ws = w_evals[(point + Y_BLOWUP) % size];
            let numerator = column_numerator(
                &values,
                ws,
                pi_evals[point],
                coset[point],
                ly0[point],
                &terms,
                challenges,
            );
            numerator * z_h_inv[point % Y_BLOWUP]
        })
        .collect();

    Ok(domain_m.coset_ifft(&hy_coset_evals))
}

/// `PI_i(\alpha) = \sum_j w_{ij} L_j(\alpha)` for every party.
pub(crate) fn party_pi_evals(
    verifier_params: &DistributedVerifierParams,
    public_inputs: &[Vec<Fr>],
    alpha: &Fr,
) -> Vec<Fr> {
    let lagrange = verifier_params.domain_x.lagrange_basis_at(alpha);
    public_inputs
        .iter()
        .map(|inputs| {
            inputs
                .iter()
                .zip(lagrange.iter())
                .fold(Fr::zero(), |acc, (w, l)| acc + *w * l)
        })
        .collect()
}

/// The party's PI polynomial in X, its public inputs on the first rows.
pub(crate) fn party_pi_poly(
    prover_params: &DistributedProverParams,
    public_inputs: &[Fr],
) -> FpPolynomial {
    let mut evals = public_inputs.to_vec();
    evals.resize(prover_params.domain_x.size(), Fr::zero());
    prover_params.domain_x.ifft(&evals)
}

/// The row-axis digests opened at \alpha:
/// `[foldedHx, L, R, O, Ql, Qr, Qm, Qo, Qk, Sy0, Sy1, Sy2, Sx0, Sx1, Sx2, Z]`.
pub(crate) fn row_digests(
    verifier_params: &DistributedVerifierParams,
    cm_w_vec: &[KZGCommitment],
    cm_z: &KZGCommitment,
    cm_hx_vec: &[KZGCommitment],
    alpha: &Fr,
) -> Vec<KZGCommitment> {
    let mut digests = Vec::with_capacity(N_ROW_DIGESTS);
    digests.push(fold_quotient(cm_hx_vec, alpha, verifier_params.cs_size + 2));
    digests.extend_from_slice(cm_w_vec);
    digests.extend_from_slice(&verifier_params.cm_q_vec);
    digests.extend_from_slice(&verifier_params.cm_sy_vec);
    digests.extend_from_slice(&verifier_params.cm_sx_vec);
    digests.push(*cm_z);
    digests
}

/// The column-axis digests opened at \beta: the row-axis claims, the shifted accumulator
/// claim, `W` and the folded `Hy`.
pub(crate) fn column_digests(
    verifier_params: &DistributedVerifierParams,
    row_batched_proof: &BatchOpeningProof<KZGCommitment>,
    z_shifted_row_proof: &OpeningProof<KZGCommitment>,
    cm_w_product: &KZGCommitment,
    cm_hy_vec: &[KZGCommitment],
    beta: &Fr,
) -> Vec<KZGCommitment> {
    let mut digests = row_batched_proof.claimed_values.clone();
    digests.push(z_shifted_row_proof.claimed_value);
    digests.push(*cm_w_product);
    digests.push(fold_quotient(cm_hy_vec, beta, verifier_params.nb_parties()));
    digests
}

/// What the row-axis openings bind to `beta`: the aggregate proof, the claims, the shifted
/// claim and the shifted proof.
pub(crate) fn row_opening_bindings(
    row_batched_proof: &BatchOpeningProof<KZGCommitment>,
    z_shifted_row_proof: &OpeningProof<KZGCommitment>,
) -> Vec<KZGCommitment> {
    let mut bindings = vec![row_batched_proof.h];
    bindings.extend_from_slice(&row_batched_proof.claimed_values);
    bindings.push(z_shifted_row_proof.claimed_value);
    bindings.push(z_shifted_row_proof.h);
    bindings
}
