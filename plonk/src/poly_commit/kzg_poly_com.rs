use crate::poly_commit::{
    errors::PolyComSchemeError,
    field_polynomial::FpPolynomial,
    pcs::{
        derive_folding_challenge, fold_elems, BatchOpeningProof, HomomorphicPolyComElem,
        OpeningProof, PolyComScheme, ToBytes,
    },
};
use crate::{Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, Group, VariableBaseMSM};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::UniformRand;
use rand_core::{CryptoRng, RngCore};

/// KZG commitment scheme over the BN254 G1 group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct KZGCommitment(pub G1Affine);

impl ToBytes for KZGCommitment {
    fn to_bytes(&self) -> Result<Vec<u8>, PolyComSchemeError> {
        let mut buf = Vec::with_capacity(32);
        self.0.serialize_compressed(&mut buf)?;
        Ok(buf)
    }
}

impl HomomorphicPolyComElem for KZGCommitment {
    fn get_identity() -> Self {
        KZGCommitment(G1Affine::identity())
    }

    fn op(&self, other: &Self) -> Self {
        KZGCommitment((self.0.into_group() + other.0).into_affine())
    }

    fn op_assign(&mut self, other: &Self) {
        self.0 = (self.0.into_group() + other.0).into_affine();
    }

    fn exp(&self, exp: &Fr) -> Self {
        KZGCommitment((self.0 * exp).into_affine())
    }

    fn inv(&self) -> Self {
        KZGCommitment(-self.0)
    }
}

/// KZG commitment scheme about `PairingEngine`.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct KZGCommitmentScheme {
    /// public parameter about G1, `[tau^i]_1` for `i` up to the max degree.
    pub public_parameter_group_1: Vec<G1Affine>,
    /// public parameter about G2, `[1]_2` and `[tau]_2`.
    pub public_parameter_group_2: Vec<G2Affine>,
}

impl KZGCommitmentScheme {
    /// Create a new instance of a KZG polynomial commitment scheme.
    /// `max_degree` - max degree of the polynomial,
    /// `prng` - pseudo-random generator.
    pub fn new<R: CryptoRng + RngCore>(max_degree: usize, prng: &mut R) -> KZGCommitmentScheme {
        let s = Fr::rand(prng);
        Self::from_secret(max_degree, &s)
    }

    /// Build the parameters from a known trapdoor. Only for setups that share the
    /// trapdoor with another commitment key.
    pub(crate) fn from_secret(max_degree: usize, s: &Fr) -> KZGCommitmentScheme {
        let mut public_parameter_group_1 = Vec::with_capacity(max_degree + 1);
        let mut elem_g1 = G1Projective::generator();
        for _ in 0..=max_degree {
            public_parameter_group_1.push(elem_g1);
            elem_g1 *= s;
        }

        let elem_g2 = G2Projective::generator();
        let public_parameter_group_2 = vec![elem_g2, elem_g2 * s];

        KZGCommitmentScheme {
            public_parameter_group_1: G1Projective::normalize_batch(&public_parameter_group_1),
            public_parameter_group_2: G2Projective::normalize_batch(&public_parameter_group_2),
        }
    }

    /// Commit to a polynomial of degree at most the max degree.
    pub fn commit(&self, polynomial: &FpPolynomial) -> Result<KZGCommitment, PolyComSchemeError> {
        let coefs = polynomial.get_coefs_ref();
        if coefs.len() > self.public_parameter_group_1.len() {
            return Err(PolyComSchemeError::DegreeError {
                degree: polynomial.degree(),
                max_degree: self.max_degree(),
            });
        }
        let commitment_value =
            G1Projective::msm_unchecked(&self.public_parameter_group_1[..coefs.len()], coefs);
        Ok(KZGCommitment(commitment_value.into_affine()))
    }

    /// Open a polynomial at `point`.
    pub fn open(
        &self,
        polynomial: &FpPolynomial,
        point: &Fr,
    ) -> Result<OpeningProof<Fr>, PolyComSchemeError> {
        let (quotient, claimed_value) = polynomial.div_by_linear(point);
        Ok(OpeningProof {
            h: self.commit(&quotient)?,
            claimed_value,
        })
    }

    /// Open several polynomials at the same point with one quotient commitment.
    pub fn batch_open_single_point(
        &self,
        polynomials: &[&FpPolynomial],
        digests: &[KZGCommitment],
        point: &Fr,
    ) -> Result<BatchOpeningProof<Fr>, PolyComSchemeError> {
        if polynomials.len() != digests.len() {
            return Err(PolyComSchemeError::LengthMismatch {
                expected: digests.len(),
                got: polynomials.len(),
            });
        }
        let claimed_values: Vec<Fr> = polynomials.iter().map(|p| p.eval(point)).collect();
        let r = derive_folding_challenge(point, digests, &claimed_values)?;
        let owned: Vec<FpPolynomial> = polynomials.iter().map(|p| (*p).clone()).collect();
        let folded = fold_elems(&owned, &r);
        let opening = self.open(&folded, point)?;
        Ok(BatchOpeningProof {
            h: opening.h,
            claimed_values,
        })
    }

    /// Keep only the parameters a verifier needs.
    pub fn shrink_to_verifier_only(&self) -> KZGCommitmentScheme {
        KZGCommitmentScheme {
            public_parameter_group_1: self
                .public_parameter_group_1
                .iter()
                .take(1)
                .copied()
                .collect(),
            public_parameter_group_2: self.public_parameter_group_2.clone(),
        }
    }
}

impl PolyComScheme for KZGCommitmentScheme {
    type Value = Fr;

    fn max_degree(&self) -> usize {
        self.public_parameter_group_1.len().saturating_sub(1)
    }

    fn lift_value(&self, value: &Fr) -> Result<G1Projective, PolyComSchemeError> {
        let g1 = self
            .public_parameter_group_1
            .first()
            .ok_or(PolyComSchemeError::MissingParameters)?;
        Ok(*g1 * value)
    }

    fn verifier_g2(&self) -> Result<(G2Affine, G2Affine), PolyComSchemeError> {
        match self.public_parameter_group_2.as_slice() {
            [g2, tau_g2, ..] => Ok((*g2, *tau_g2)),
            _ => Err(PolyComSchemeError::MissingParameters),
        }
    }
}

/// Evaluate the committed polynomial `[f(tau)]_1` in the clear, for tests.
#[cfg(test)]
pub(crate) fn commit_with_secret(poly: &FpPolynomial, s: &Fr) -> KZGCommitment {
    KZGCommitment((G1Affine::generator() * poly.eval(s)).into_affine())
}
