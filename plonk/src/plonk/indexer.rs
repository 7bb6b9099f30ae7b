use crate::errors::{commitment_error, PlonkError, Result, SetupFault};
use crate::plonk::constraint_system::{Circuit, Permutation, N_SELECTORS, N_WIRES_PER_GATE};
use crate::poly_commit::{
    field_polynomial::{EvaluationDomain, FpPolynomial},
    kzg_poly_com::{KZGCommitment, KZGCommitmentScheme},
    pcs::{BatchOpeningProof, OpeningProof, PolyComScheme},
};
use crate::Fr;
use ark_ff::{batch_inversion, FftField, One};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{end_timer, start_timer};

/// Degree of the random polynomial `b(X)` blinding each wire polynomial.
pub const WIRE_BLINDING_DEGREE: usize = 1;

/// Degree of the random polynomial `b(X)` blinding the accumulator.
pub const Z_BLINDING_DEGREE: usize = 2;

/// Number of chunks the quotient polynomial is split into.
pub const N_QUOTIENT_CHUNKS: usize = 3;

/// The data structure of a Plonk proof.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PlonkProof {
    /// The witness polynomial commitments `L, R, O`.
    pub cm_w_vec: Vec<KZGCommitment>,
    /// The permutation accumulator commitment.
    pub cm_z: KZGCommitment,
    /// The split quotient polynomial commitments.
    pub cm_t_vec: Vec<KZGCommitment>,
    /// The opening at \zeta of the folded quotient, the linearization polynomial,
    /// `L, R, O` and the first two permutation polynomials.
    pub batched_proof: BatchOpeningProof<Fr>,
    /// The opening of the accumulator at \zeta * \omega.
    pub z_shifted_proof: OpeningProof<Fr>,
}

/// Plonk prover parameters.
#[derive(Debug, Clone)]
pub struct PlonkProverParams {
    /// The evaluation domain of size n.
    pub domain: EvaluationDomain,
    /// The evaluation domain for computing the quotient polynomial.
    pub domain_m: EvaluationDomain,
    /// The polynomials of the selectors `ql, qr, qm, qo, qk`.
    pub q_polys: Vec<FpPolynomial>,
    /// The polynomials of perm1, perm2, perm3.
    pub s_polys: Vec<FpPolynomial>,
    /// The permuted coordinates `k_{c'} \omega^{i'}` of every slot.
    pub s_evals: Vec<Vec<Fr>>,
    /// The selector polynomials' evaluations on the quotient coset.
    pub q_coset_evals: Vec<Vec<Fr>>,
    /// The permutation polynomials' evaluations on the quotient coset.
    pub s_coset_evals: Vec<Vec<Fr>>,
    /// The first Lagrange polynomial's evaluations on the quotient coset.
    pub l1_coset_evals: Vec<Fr>,
    /// The distinct values of `1 / (X^n - 1)` on the quotient coset.
    pub z_h_inv_coset_evals: Vec<Fr>,
    /// The elements of the quotient coset.
    pub coset_quotient: Vec<Fr>,
    /// The commitment key.
    pub pcs: KZGCommitmentScheme,
    /// The Plonk verifier parameters.
    pub verifier_params: PlonkVerifierParams,
}

impl PlonkProverParams {
    /// Return the verifier parameters.
    pub fn get_verifier_params(self) -> PlonkVerifierParams {
        self.verifier_params
    }

    /// Return a reference of verifier parameters.
    pub fn get_verifier_params_ref(&self) -> &PlonkVerifierParams {
        &self.verifier_params
    }
}

/// Plonk verifier parameters.
#[derive(Debug, Clone)]
pub struct PlonkVerifierParams {
    /// The size of constraint system.
    pub cs_size: usize,
    /// The number of public inputs.
    pub nb_public: usize,
    /// The primitive evaluation domain.
    pub domain: EvaluationDomain,
    /// The coset representatives `[1, u, u^2]` of the wires.
    pub k: Vec<Fr>,
    /// The commitments of the selectors.
    pub cm_q_vec: Vec<KZGCommitment>,
    /// The commitments of perm1, perm2, perm3.
    pub cm_s_vec: Vec<KZGCommitment>,
    /// The verifier part of the commitment key.
    pub pcs: KZGCommitmentScheme,
}

/// The size of the coset on which the quotient is evaluated: it must exceed the
/// degree `3n + 5` of the quotient.
pub fn quotient_domain_size(n: usize) -> usize {
    (3 * n + 6).next_power_of_two()
}

/// The coset representatives `[1, u, u^2]` of the three wires, `u` the field generator.
pub fn choose_ks() -> Vec<Fr> {
    let u = Fr::GENERATOR;
    vec![Fr::one(), u, u * u]
}

/// The coordinates `k_{c'} \omega^{i'}` of the image of every slot, per wire.
pub fn encode_perm_to_group(
    domain: &EvaluationDomain,
    perm: &Permutation,
    k: &[Fr],
) -> Vec<Vec<Fr>> {
    let n = domain.size();
    let group = domain.elements();
    perm.as_slice()
        .chunks(n)
        .map(|column| column.iter().map(|s| k[s / n] * group[s % n]).collect())
        .collect()
}

/// Evaluations of `L_1(X) = (X^n - 1) / (n (X - 1))` and the distinct values of
/// `1 / (X^n - 1)` on the quotient coset.
pub(crate) fn vanishing_coset_evals(
    domain: &EvaluationDomain,
    coset: &[Fr],
) -> (Vec<Fr>, Vec<Fr>) {
    let n = domain.size();
    let factor = coset.len() / n;

    let z_h: Vec<Fr> = coset[..factor]
        .iter()
        .map(|x| domain.evaluate_vanishing(x))
        .collect();
    let mut z_h_inv = z_h.clone();
    batch_inversion(&mut z_h_inv);

    let mut l1: Vec<Fr> = coset.iter().map(|x| *x - Fr::one()).collect();
    batch_inversion(&mut l1);
    let size_inv = domain.size_inv();
    for (i, l) in l1.iter_mut().enumerate() {
        *l *= z_h[i % factor] * size_inv;
    }
    (l1, z_h_inv)
}

/// Run the preprocessing of a circuit with the given permutation, producing the proving
/// key (which contains the verifying key).
pub fn indexer(
    circuit: &Circuit,
    permutation: &Permutation,
    pcs: &KZGCommitmentScheme,
) -> Result<PlonkProverParams> {
    let indexer_timer = start_timer!(|| "Plonk::Indexer");
    let n = circuit.size();
    let domain = EvaluationDomain::new(n)
        .ok_or(PlonkError::Setup(SetupFault::DomainUnsupported { size: n }))?;
    if circuit.nb_rows() > n {
        return Err(PlonkError::Setup(SetupFault::TooManyRows {
            rows: circuit.nb_rows(),
            domain: n,
        }));
    }
    if permutation.len() != N_WIRES_PER_GATE * n {
        return Err(PlonkError::Setup(SetupFault::InvalidPermutation));
    }
    let required = n + Z_BLINDING_DEGREE;
    if pcs.max_degree() < required {
        return Err(PlonkError::Setup(SetupFault::SrsTooSmall {
            required,
            available: pcs.max_degree(),
        }));
    }
    let m = quotient_domain_size(n);
    let domain_m = EvaluationDomain::new(m)
        .ok_or(PlonkError::Setup(SetupFault::DomainUnsupported { size: m }))?;
    tracing::debug!(n, m, "plonk indexer");

    let q_polys: Vec<FpPolynomial> = circuit
        .selector_rows(n)
        .iter()
        .map(|evals| domain.ifft(evals))
        .collect();
    debug_assert_eq!(q_polys.len(), N_SELECTORS);

    let k = choose_ks();
    let s_evals = encode_perm_to_group(&domain, permutation, &k);
    let s_polys: Vec<FpPolynomial> = s_evals.iter().map(|evals| domain.ifft(evals)).collect();

    let cm_q_vec = q_polys
        .iter()
        .enumerate()
        .map(|(i, q)| pcs.commit(q).map_err(commitment_error("selectors", i)))
        .collect::<Result<Vec<_>>>()?;
    let cm_s_vec = s_polys
        .iter()
        .enumerate()
        .map(|(i, s)| pcs.commit(s).map_err(commitment_error("permutation", i)))
        .collect::<Result<Vec<_>>>()?;

    let q_coset_evals = q_polys.iter().map(|q| domain_m.coset_fft(q)).collect();
    let s_coset_evals = s_polys.iter().map(|s| domain_m.coset_fft(s)).collect();
    let coset_quotient = domain_m.coset_elements();
    let (l1_coset_evals, z_h_inv_coset_evals) = vanishing_coset_evals(&domain, &coset_quotient);

    let verifier_params = PlonkVerifierParams {
        cs_size: n,
        nb_public: circuit.nb_public,
        domain,
        k,
        cm_q_vec,
        cm_s_vec,
        pcs: pcs.shrink_to_verifier_only(),
    };
    end_timer!(indexer_timer);

    Ok(PlonkProverParams {
        domain,
        domain_m,
        q_polys,
        s_polys,
        s_evals,
        q_coset_evals,
        s_coset_evals,
        l1_coset_evals,
        z_h_inv_coset_evals,
        coset_quotient,
        pcs: pcs.clone(),
        verifier_params,
    })
}

#[cfg(test)]
mod test {
    use super::{indexer, quotient_domain_size, vanishing_coset_evals};
    use crate::errors::{PlonkError, SetupFault};
    use crate::plonk::constraint_system::{Circuit, Permutation};
    use crate::poly_commit::{field_polynomial::EvaluationDomain, kzg_poly_com::KZGCommitmentScheme};
    use crate::Fr;
    use ark_ff::One;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    #[test]
    fn test_vanishing_coset_evals() {
        let domain = EvaluationDomain::new(4).unwrap();
        let domain_m = EvaluationDomain::new(quotient_domain_size(4)).unwrap();
        let coset = domain_m.coset_elements();
        let (l1, z_h_inv) = vanishing_coset_evals(&domain, &coset);
        let factor = coset.len() / 4;
        for (i, x) in coset.iter().enumerate() {
            let z_h = domain.evaluate_vanishing(x);
            assert_eq!(z_h * z_h_inv[i % factor], Fr::one());
            assert_eq!(l1[i], domain.lagrange_basis_at(x)[0]);
        }
    }

    #[test]
    fn test_srs_too_small() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let mut cs = Circuit::new(1, 1, 1);
        cs.insert_mul_gate(0, 1, 2).unwrap();
        cs.pad(8);
        let perm = Permutation::from_wiring(&cs, 8).unwrap();
        let pcs = KZGCommitmentScheme::new(9, &mut prng);
        assert_eq!(
            indexer(&cs, &perm, &pcs).unwrap_err(),
            PlonkError::Setup(SetupFault::SrsTooSmall {
                required: 10,
                available: 9
            })
        );
        let pcs = KZGCommitmentScheme::new(10, &mut prng);
        assert!(indexer(&cs, &perm, &pcs).is_ok());
        assert_eq!(
            indexer(&cs, &Permutation::identity(4), &pcs).unwrap_err(),
            PlonkError::Setup(SetupFault::InvalidPermutation)
        );
    }
}
