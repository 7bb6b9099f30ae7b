use crate::errors::{commitment_error, Result};
use crate::plonk::indexer::{PlonkProverParams, PlonkVerifierParams};
use crate::poly_commit::{
    errors::PolyComSchemeError, field_polynomial::FpPolynomial, kzg_poly_com::KZGCommitment,
    pcs::HomomorphicPolyComElem,
};
use crate::utils::{join, pow_usize};
use crate::Fr;
use ark_ff::{batch_inversion, One, Zero};
use ark_std::{cfg_into_iter, UniformRand};
use rand_core::{CryptoRng, RngCore};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The challenges of the single-axis protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlonkChallenges {
    pub(crate) gamma: Fr,
    pub(crate) beta: Fr,
    pub(crate) alpha: Fr,
    pub(crate) zeta: Fr,
}

/// Add a random degree `num_hide_points` polynomial multiplied by X^{zeroing_degree} - 1.
/// The result keeps the values of `polynomial` on the subgroup of order `zeroing_degree`.
/// Eg, when num_hide_points is 1, then it adds (r1 + r2*X) * (X^zeroing_degree - 1).
pub(crate) fn hide_polynomial<R: CryptoRng + RngCore>(
    prng: &mut R,
    polynomial: &mut FpPolynomial,
    num_hide_points: usize,
    zeroing_degree: usize,
) {
    for i in 0..num_hide_points + 1 {
        let blind = Fr::rand(prng);
        polynomial.add_coef_assign(&-blind, i);
        polynomial.add_coef_assign(&blind, zeroing_degree + i);
    }
}

/// Running product `z[0] = 1`, `z[i+1] = z[i] * numerators[i] / denominators[i]`, plus the
/// ratio `z[len-1] * numerators[len-1] / denominators[len-1]` left after the last row.
/// The denominators are inverted with one batch inversion.
pub(crate) fn accumulate(numerators: &[Fr], mut denominators: Vec<Fr>) -> (Vec<Fr>, Fr) {
    batch_inversion(&mut denominators);
    let mut z_evals = Vec::with_capacity(numerators.len());
    let mut prev = Fr::one();
    for (num, den_inv) in numerators.iter().zip(denominators.iter()) {
        z_evals.push(prev);
        prev *= *num * den_inv;
    }
    (z_evals, prev)
}

/// Build the evaluations of the accumulator,
/// z(\omega^{i+1}) = z(\omega^i)\prod_{c}(f_c(\omega^i) + \beta k_c \omega^i + \gamma)
///                                 / (f_c(\omega^i) + \beta perm_c(\omega^i) + \gamma)
/// with z(1) = 1. Also return the final ratio, which is one for a consistent witness.
pub(crate) fn z_evals(
    prover_params: &PlonkProverParams,
    lro: &[Vec<Fr>],
    beta: &Fr,
    gamma: &Fr,
) -> (Vec<Fr>, Fr) {
    let n = prover_params.domain.size();
    let group = prover_params.domain.elements();
    let k = &prover_params.verifier_params.k;
    let s_evals = &prover_params.s_evals;

    let (numerators, denominators): (Vec<Fr>, Vec<Fr>) = cfg_into_iter!(0..n)
        .map(|i| {
            let mut numerator = Fr::one();
            let mut denominator = Fr::one();
            for c in 0..lro.len() {
                numerator *= lro[c][i] + *beta * k[c] * group[i] + gamma;
                denominator *= lro[c][i] + *beta * s_evals[c][i] + gamma;
            }
            (numerator, denominator)
        })
        .unzip();
    accumulate(&numerators, denominators)
}

/// Return the PI polynomial, taking the public inputs on the first rows.
pub(crate) fn pi_poly(prover_params: &PlonkProverParams, public_inputs: &[Fr]) -> FpPolynomial {
    let mut evals = public_inputs.to_vec();
    evals.resize(prover_params.domain.size(), Fr::zero());
    prover_params.domain.ifft(&evals)
}

/// Compute the quotient polynomial
/// t(X) = [gate(X) + PI(X) + \alpha (z(\omega X) G(X) - z(X) F(X)) + \alpha^2 L_1(X)(z(X) - 1)]
///        / (X^n - 1)
/// from its evaluations on the quotient coset.
pub(crate) fn t_poly(
    prover_params: &PlonkProverParams,
    w_polys: &[FpPolynomial],
    z: &FpPolynomial,
    pi: &FpPolynomial,
    challenges: &PlonkChallenges,
) -> FpPolynomial {
    let n = prover_params.domain.size();
    let domain_m = &prover_params.domain_m;
    let m = domain_m.size();
    let factor = m / n;
    let k = &prover_params.verifier_params.k;
    let PlonkChallenges {
        gamma, beta, alpha, ..
    } = *challenges;

    // Compute the evaluations of w/pi/z polynomials on the coset.
    let w_coset_evals: Vec<Vec<Fr>> = w_polys.iter().map(|p| domain_m.coset_fft(p)).collect();
    let (pi_coset_evals, z_coset_evals) =
        join(|| domain_m.coset_fft(pi), || domain_m.coset_fft(z));

    let q = &prover_params.q_coset_evals;
    let s = &prover_params.s_coset_evals;
    let t_coset_evals: Vec<Fr> = cfg_into_iter!(0..m)
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
            let mut f = z_coset_evals[point];
            let mut g = z_coset_evals[(point + factor) % m];
            for c in 0..w_coset_evals.len() {
                f *= w_coset_evals[c][point] + beta * k[c] * x + gamma;
                g *= w_coset_evals[c][point] + beta * s[c][point] + gamma;
            }

            let boundary = prover_params.l1_coset_evals[point] * (z_coset_evals[point] - Fr::one());
            let numerator = (boundary * alpha + (g - f)) * alpha + gate;
            numerator * prover_params.z_h_inv_coset_evals[point % factor]
        })
        .collect();

    domain_m.coset_ifft(&t_coset_evals)
}

/// Split the t polynomial into `n_chunks` polynomials of `chunk_len` coefficients and commit.
/// Consecutive chunks are blinded with a random `r X^{chunk_len}` on one and `-r` on the next,
/// which cancel in \sum_i X^{i chunk_len} t_i(X).
pub(crate) fn split_t_and_commit<R, C>(
    prng: &mut R,
    commit: C,
    t: &FpPolynomial,
    n_chunks: usize,
    chunk_len: usize,
    stage: &'static str,
) -> Result<(Vec<KZGCommitment>, Vec<FpPolynomial>)>
where
    R: CryptoRng + RngCore,
    C: Fn(&FpPolynomial) -> core::result::Result<KZGCommitment, PolyComSchemeError>,
{
    let coefs_len = t.get_coefs_ref().len();
    if coefs_len > n_chunks * chunk_len {
        tracing::warn!(
            stage,
            degree = t.degree(),
            "quotient exceeds its chunks, the witness does not satisfy the circuit"
        );
    }

    let mut cm_t_vec = Vec::with_capacity(n_chunks);
    let mut t_polys = Vec::with_capacity(n_chunks);
    let mut prev_blind = Fr::zero();
    for (i, mut chunk) in t.split(chunk_len, n_chunks).into_iter().enumerate() {
        chunk.add_coef_assign(&-prev_blind, 0);
        if i != n_chunks - 1 {
            let blind = Fr::rand(prng);
            chunk.add_coef_assign(&blind, chunk_len);
            prev_blind = blind;
        }
        let cm_t = commit(&chunk).map_err(commitment_error(stage, i))?;
        cm_t_vec.push(cm_t);
        t_polys.push(chunk);
    }
    Ok((cm_t_vec, t_polys))
}

/// Combine the quotient chunks (polynomials or commitments) into
/// \sum_i \zeta^{i chunk_len} t_i.
pub(crate) fn fold_quotient<E: HomomorphicPolyComElem>(
    t_polys_or_comms: &[E],
    zeta: &Fr,
    chunk_len: usize,
) -> E {
    crate::poly_commit::pcs::fold_elems(t_polys_or_comms, &pow_usize(zeta, chunk_len))
}

/// Compute r polynomial or commitment:
/// l ql + r qr + l r qm + o qo + qk
///   + \alpha [z(\zeta\omega)(l + \beta s1 + \gamma)(r + \beta s2 + \gamma) \beta s3(X)
///             - z(X)(l + \beta\zeta + \gamma)(r + \beta u\zeta + \gamma)(o + \beta u^2\zeta + \gamma)]
///   + \alpha^2 L_1(\zeta) z(X)
pub(crate) fn r_poly_or_comm<E: HomomorphicPolyComElem>(
    q_polys_or_comms: &[E],
    last_s_poly_or_comm: &E,
    z_poly_or_comm: &E,
    k: &[Fr],
    w_polys_eval_zeta: &[Fr],
    s_polys_eval_zeta: &[Fr],
    z_eval_zeta_omega: &Fr,
    challenges: &PlonkChallenges,
    l1_eval_zeta: &Fr,
) -> E {
    let PlonkChallenges {
        gamma,
        beta,
        alpha,
        zeta,
    } = *challenges;
    let (l, r, o) = (
        w_polys_eval_zeta[0],
        w_polys_eval_zeta[1],
        w_polys_eval_zeta[2],
    );

    // 1. the gate, selectors weighted by the wire values
    let mut res = q_polys_or_comms[0].exp(&l);
    res.op_assign(&q_polys_or_comms[1].exp(&r));
    res.op_assign(&q_polys_or_comms[2].exp(&(l * r)));
    res.op_assign(&q_polys_or_comms[3].exp(&o));
    res.op_assign(&q_polys_or_comms[4]);

    // 2. \alpha z(\zeta\omega) \beta (l + \beta s1 + \gamma)(r + \beta s2 + \gamma) s3(X)
    let (l_factor, r_factor) = join(
        || l + beta * s_polys_eval_zeta[0] + gamma,
        || r + beta * s_polys_eval_zeta[1] + gamma,
    );
    let s_scalar = alpha * z_eval_zeta_omega * beta * l_factor * r_factor;
    res.op_assign(&last_s_poly_or_comm.exp(&s_scalar));

    // 3. z(X) [\alpha^2 L_1(\zeta) - \alpha \prod_c (w_c + \beta k_c \zeta + \gamma)]
    let beta_zeta = beta * zeta;
    let mut id_product = Fr::one();
    for (w, k_c) in w_polys_eval_zeta.iter().zip(k) {
        id_product *= *w + beta_zeta * k_c + gamma;
    }
    let z_scalar = alpha * alpha * l1_eval_zeta - alpha * id_product;
    res.op_assign(&z_poly_or_comm.exp(&z_scalar));
    res
}

/// Compute the r polynomial.
pub(crate) fn r_poly(
    prover_params: &PlonkProverParams,
    z: &FpPolynomial,
    w_polys_eval_zeta: &[Fr],
    s_polys_eval_zeta: &[Fr],
    z_eval_zeta_omega: &Fr,
    challenges: &PlonkChallenges,
    l1_eval_zeta: &Fr,
) -> FpPolynomial {
    r_poly_or_comm(
        &prover_params.q_polys,
        &prover_params.s_polys[2],
        z,
        &prover_params.verifier_params.k,
        w_polys_eval_zeta,
        s_polys_eval_zeta,
        z_eval_zeta_omega,
        challenges,
        l1_eval_zeta,
    )
}

/// Derive the r commitment from the verifying key.
pub(crate) fn r_commitment(
    verifier_params: &PlonkVerifierParams,
    cm_z: &KZGCommitment,
    w_polys_eval_zeta: &[Fr],
    s_polys_eval_zeta: &[Fr],
    z_eval_zeta_omega: &Fr,
    challenges: &PlonkChallenges,
    l1_eval_zeta: &Fr,
) -> KZGCommitment {
    r_poly_or_comm(
        &verifier_params.cm_q_vec,
        &verifier_params.cm_s_vec[2],
        cm_z,
        &verifier_params.k,
        w_polys_eval_zeta,
        s_polys_eval_zeta,
        z_eval_zeta_omega,
        challenges,
        l1_eval_zeta,
    )
}

/// Return `(PI(\zeta), L_1(\zeta))` where PI(X) = \sum_i w_i L_i(X) over the public inputs.
pub(crate) fn eval_pi_poly(
    verifier_params: &PlonkVerifierParams,
    public_inputs: &[Fr],
    zeta: &Fr,
) -> (Fr, Fr) {
    let lagrange = verifier_params.domain.lagrange_basis_at(zeta);
    let pi = public_inputs
        .iter()
        .zip(lagrange.iter())
        .fold(Fr::zero(), |acc, (w, l)| acc + *w * l);
    (pi, lagrange[0])
}

/// The value at \zeta of the constraint identity with the linearization substituted,
/// r + PI + \alpha z(\zeta\omega)(l + \beta s1 + \gamma)(r + \beta s2 + \gamma)(o + \gamma)
///   - \alpha^2 L_1(\zeta) - t(\zeta)(\zeta^n - 1),
/// which is zero for an honest proof.
pub(crate) fn identity_residual(
    verifier_params: &PlonkVerifierParams,
    t_eval_zeta: &Fr,
    r_eval_zeta: &Fr,
    w_polys_eval_zeta: &[Fr],
    s_polys_eval_zeta: &[Fr],
    z_eval_zeta_omega: &Fr,
    challenges: &PlonkChallenges,
    pi_eval_zeta: &Fr,
    l1_eval_zeta: &Fr,
) -> Fr {
    let PlonkChallenges {
        gamma,
        beta,
        alpha,
        zeta,
    } = *challenges;
    let mut perm = alpha * z_eval_zeta_omega;
    for (w, s) in w_polys_eval_zeta.iter().zip(s_polys_eval_zeta) {
        perm *= *w + beta * s + gamma;
    }
    perm *= w_polys_eval_zeta[2] + gamma;

    let z_h_eval_zeta = verifier_params.domain.evaluate_vanishing(&zeta);
    *r_eval_zeta + pi_eval_zeta + perm
        - alpha * alpha * l1_eval_zeta
        - *t_eval_zeta * z_h_eval_zeta
}

#[cfg(test)]
mod test {
    use super::{accumulate, hide_polynomial, pi_poly, t_poly, z_evals, PlonkChallenges};
    use crate::plonk::{
        constraint_system::{Circuit, Permutation},
        indexer::indexer,
        witness::compute_lro,
    };
    use crate::poly_commit::{
        field_polynomial::{EvaluationDomain, FpPolynomial},
        kzg_poly_com::KZGCommitmentScheme,
    };
    use crate::Fr;
    use ark_ff::{One, Zero};
    use ark_std::UniformRand;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    fn sample() -> (Circuit, Vec<Fr>) {
        // x0 public, x1 secret, x2 = x0 + x1, x3 = x2 * x1, x4 = x3 + x0
        let mut cs = Circuit::new(1, 1, 3);
        cs.insert_add_gate(0, 1, 2).unwrap();
        cs.insert_mul_gate(2, 1, 3).unwrap();
        cs.insert_add_gate(3, 0, 4).unwrap();
        let witness = [2u64, 3, 5, 15, 17].map(Fr::from).to_vec();
        (cs, witness)
    }

    #[test]
    fn test_accumulate() {
        let nums = [2u64, 3, 5].map(Fr::from);
        let dens = [3u64, 5, 2].map(Fr::from).to_vec();
        let (z, ratio) = accumulate(&nums, dens);
        assert_eq!(z[0], Fr::one());
        assert_eq!(z[1], Fr::from(2u64) / Fr::from(3u64));
        assert_eq!(z[2], Fr::from(2u64) / Fr::from(5u64));
        assert_eq!(ratio, Fr::one());
    }

    #[test]
    fn test_hide_polynomial() {
        let mut prng = ChaChaRng::from_seed([7u8; 32]);
        let domain = EvaluationDomain::new(8).unwrap();
        let original = FpPolynomial::random(&mut prng, 7);
        let mut hidden = original.clone();
        hide_polynomial(&mut prng, &mut hidden, 2, 8);
        assert_eq!(hidden.degree(), 10);
        for x in domain.elements() {
            assert_eq!(hidden.eval(&x), original.eval(&x));
        }
        let x = Fr::rand(&mut prng);
        assert_ne!(hidden.eval(&x), original.eval(&x));
    }

    #[test]
    fn test_z_polynomial() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let (cs, witness) = sample();
        let n = cs.size();
        let perm = Permutation::from_wiring(&cs, n).unwrap();
        let pcs = KZGCommitmentScheme::new(n + 2, &mut prng);
        let params = indexer(&cs, &perm, &pcs).unwrap();
        let lro = compute_lro(&cs, &witness, n).unwrap();

        let beta = Fr::rand(&mut prng);
        let gamma = Fr::rand(&mut prng);
        let (z, ratio) = z_evals(&params, &lro, &beta, &gamma);
        assert_eq!(z[0], Fr::one());
        assert_eq!(ratio, Fr::one());

        // breaking a copy constraint breaks the final ratio
        let mut bad = lro.clone();
        bad[1][2] += Fr::one();
        let (z, ratio) = z_evals(&params, &bad, &beta, &gamma);
        assert_eq!(z[0], Fr::one());
        assert_ne!(ratio, Fr::one());
    }

    #[test]
    fn test_quotient_divisibility() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let (cs, witness) = sample();
        let n = cs.size();
        let perm = Permutation::from_wiring(&cs, n).unwrap();
        let pcs = KZGCommitmentScheme::new(n + 2, &mut prng);
        let params = indexer(&cs, &perm, &pcs).unwrap();
        let domain = params.domain;

        let lro = compute_lro(&cs, &witness, n).unwrap();
        let w_polys: Vec<FpPolynomial> = lro.iter().map(|e| domain.ifft(e)).collect();
        let challenges = PlonkChallenges {
            gamma: Fr::rand(&mut prng),
            beta: Fr::rand(&mut prng),
            alpha: Fr::rand(&mut prng),
            zeta: Fr::zero(),
        };
        let (z, _) = z_evals(&params, &lro, &challenges.beta, &challenges.gamma);
        let z = domain.ifft(&z);
        let pi = pi_poly(&params, &witness[..1]);
        let t = t_poly(&params, &w_polys, &z, &pi, &challenges);

        let x = Fr::rand(&mut prng);
        let k = &params.verifier_params.k;
        let w: Vec<Fr> = w_polys.iter().map(|p| p.eval(&x)).collect();
        let q: Vec<Fr> = params.q_polys.iter().map(|p| p.eval(&x)).collect();
        let s: Vec<Fr> = params.s_polys.iter().map(|p| p.eval(&x)).collect();
        let PlonkChallenges {
            gamma, beta, alpha, ..
        } = challenges;
        let gate =
            q[0] * w[0] + q[1] * w[1] + q[2] * w[0] * w[1] + q[3] * w[2] + q[4] + pi.eval(&x);
        let mut f = z.eval(&x);
        let mut g = z.eval(&(x * domain.generator()));
        for c in 0..3 {
            f *= w[c] + beta * k[c] * x + gamma;
            g *= w[c] + beta * s[c] + gamma;
        }
        let l1 = domain.lagrange_basis_at(&x)[0];
        let numerator = gate + alpha * (g - f) + alpha * alpha * l1 * (z.eval(&x) - Fr::one());
        assert_eq!(t.eval(&x) * domain.evaluate_vanishing(&x), numerator);
    }
}
