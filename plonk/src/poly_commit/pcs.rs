use crate::poly_commit::{
    errors::PolyComSchemeError, field_polynomial::FpPolynomial, kzg_poly_com::KZGCommitment,
    transcript::PolyComTranscript,
};
use crate::{Bn254, Fr, G1Projective, G2Affine};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{One, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use merlin::Transcript;

/// The trait for serialization to bytes
pub trait ToBytes {
    /// Convert to bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, PolyComSchemeError>;
}

/// Elements that can be combined linearly: commitments, evaluations and polynomials.
/// Linearization and folding are written once over this trait, so that the
/// prover works on polynomials and the verifier on their commitments.
pub trait HomomorphicPolyComElem: Clone {
    /// Get identity of the group.
    fn get_identity() -> Self;

    /// Add the underlying element with another element.
    fn op(&self, other: &Self) -> Self;

    /// Add assign the underlying element with another element.
    fn op_assign(&mut self, other: &Self);

    /// Multiply the underlying element by a scalar.
    fn exp(&self, exp: &Fr) -> Self;

    /// Negate the underlying element.
    fn inv(&self) -> Self;
}

impl ToBytes for Fr {
    fn to_bytes(&self) -> Result<Vec<u8>, PolyComSchemeError> {
        let mut buf = Vec::with_capacity(32);
        self.serialize_compressed(&mut buf)?;
        Ok(buf)
    }
}

impl HomomorphicPolyComElem for Fr {
    fn get_identity() -> Self {
        Fr::zero()
    }

    fn op(&self, other: &Self) -> Self {
        *self + other
    }

    fn op_assign(&mut self, other: &Self) {
        *self += other
    }

    fn exp(&self, exp: &Fr) -> Self {
        *self * exp
    }

    fn inv(&self) -> Self {
        -*self
    }
}

impl HomomorphicPolyComElem for FpPolynomial {
    fn get_identity() -> Self {
        FpPolynomial::zero()
    }

    fn op(&self, other: &Self) -> Self {
        self.add(other)
    }

    fn op_assign(&mut self, other: &Self) {
        self.add_assign(other)
    }

    fn exp(&self, exp: &Fr) -> Self {
        self.mul_scalar(exp)
    }

    fn inv(&self) -> Self {
        self.mul_scalar(&-Fr::one())
    }
}

/// A KZG opening proof together with the value it claims.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct OpeningProof<V: CanonicalSerialize + CanonicalDeserialize + Send + Sync> {
    /// Commitment to the quotient by `X - point`.
    pub h: KZGCommitment,
    /// The claimed evaluation.
    pub claimed_value: V,
}

/// One opening proof for several polynomials at the same point.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct BatchOpeningProof<V: CanonicalSerialize + CanonicalDeserialize + Send + Sync> {
    /// Commitment to the quotient of the folded polynomial.
    pub h: KZGCommitment,
    /// The claimed evaluations, in the order of the digests.
    pub claimed_values: Vec<V>,
}

/// Return `\sum_i r^i elems[i]`.
pub fn fold_elems<E: HomomorphicPolyComElem>(elems: &[E], r: &Fr) -> E {
    let mut res = E::get_identity();
    for elem in elems.iter().rev() {
        res = res.exp(r).op(elem);
    }
    res
}

/// Derive the coefficient folding a batch opening at `point`.
pub fn derive_folding_challenge<V: ToBytes>(
    point: &Fr,
    digests: &[KZGCommitment],
    values: &[V],
) -> Result<Fr, PolyComSchemeError> {
    let mut transcript = Transcript::new(b"Fold Opening Proofs");
    transcript.append_field_elem(point);
    for digest in digests {
        transcript.append_commitment(digest)?;
    }
    for value in values {
        transcript.append_message(b"claimed value", &value.to_bytes()?);
    }
    Ok(transcript.get_challenge_field_elem(b"folding coefficient"))
}

/// A KZG-style commitment scheme whose claimed values of type `Value` can be
/// lifted into G1, so that openings verify with a single pairing equation.
pub trait PolyComScheme {
    /// What an opening claims: a field element, or a commitment in the row axis.
    type Value: HomomorphicPolyComElem
        + ToBytes
        + CanonicalSerialize
        + CanonicalDeserialize
        + Clone
        + Send
        + Sync;

    /// Return maximal supported degree.
    fn max_degree(&self) -> usize;

    /// Map a claimed value to the G1 element its commitment would be.
    fn lift_value(&self, value: &Self::Value) -> Result<G1Projective, PolyComSchemeError>;

    /// Return `([1]_2, [tau]_2)`.
    fn verifier_g2(&self) -> Result<(G2Affine, G2Affine), PolyComSchemeError>;

    /// Fold a batch opening at one point into a single opening of the folded digest.
    fn fold_proof(
        &self,
        digests: &[KZGCommitment],
        proof: &BatchOpeningProof<Self::Value>,
        point: &Fr,
    ) -> Result<(OpeningProof<Self::Value>, KZGCommitment), PolyComSchemeError> {
        if digests.len() != proof.claimed_values.len() {
            return Err(PolyComSchemeError::LengthMismatch {
                expected: digests.len(),
                got: proof.claimed_values.len(),
            });
        }
        let r = derive_folding_challenge(point, digests, &proof.claimed_values)?;
        let claimed_value = fold_elems(&proof.claimed_values, &r);
        let digest = fold_elems(digests, &r);
        Ok((
            OpeningProof {
                h: proof.h,
                claimed_value,
            },
            digest,
        ))
    }

    /// Verify a single opening.
    fn verify(
        &self,
        digest: &KZGCommitment,
        proof: &OpeningProof<Self::Value>,
        point: &Fr,
    ) -> Result<(), PolyComSchemeError> {
        self.batch_verify_multi_points(
            core::slice::from_ref(digest),
            core::slice::from_ref(proof),
            core::slice::from_ref(point),
        )
    }

    /// Verify openings of several digests at several points with one pairing check.
    fn batch_verify_multi_points(
        &self,
        digests: &[KZGCommitment],
        proofs: &[OpeningProof<Self::Value>],
        points: &[Fr],
    ) -> Result<(), PolyComSchemeError> {
        if digests.len() != proofs.len() || digests.len() != points.len() {
            return Err(PolyComSchemeError::LengthMismatch {
                expected: digests.len(),
                got: proofs.len().min(points.len()),
            });
        }

        let mut transcript = Transcript::new(b"Batch Verify Multi Points");
        for ((digest, proof), point) in digests.iter().zip(proofs).zip(points) {
            transcript.append_commitment(digest)?;
            transcript.append_commitment(&proof.h)?;
            transcript.append_message(b"claimed value", &proof.claimed_value.to_bytes()?);
            transcript.append_field_elem(point);
        }
        let r = transcript.get_challenge_field_elem(b"random combination");

        // e(\sum r^k (D_k - [v_k] + p_k H_k), [1]) = e(\sum r^k H_k, [tau])
        let mut folded_digest = G1Projective::zero();
        let mut folded_quotient = G1Projective::zero();
        let mut r_k = Fr::one();
        for ((digest, proof), point) in digests.iter().zip(proofs).zip(points) {
            let mut term = digest.0.into_group() - self.lift_value(&proof.claimed_value)?;
            term += proof.h.0 * point;
            folded_digest += term * r_k;
            folded_quotient += proof.h.0 * r_k;
            r_k *= r;
        }

        let (g2, tau_g2) = self.verifier_g2()?;
        let check = Bn254::multi_pairing(
            [folded_digest.into_affine(), (-folded_quotient).into_affine()],
            [g2, tau_g2],
        );
        if check.0.is_one() {
            Ok(())
        } else {
            Err(PolyComSchemeError::PCSVerifyError)
        }
    }
}

#[cfg(test)]
mod test {
    use crate::poly_commit::{
        field_polynomial::FpPolynomial,
        kzg_poly_com::KZGCommitmentScheme,
        pcs::{fold_elems, HomomorphicPolyComElem, PolyComScheme},
    };
    use crate::Fr;
    use ark_std::UniformRand;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    #[test]
    fn test_fold_is_linear() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(10, &mut prng);
        let polys: Vec<FpPolynomial> = (0..4)
            .map(|_| FpPolynomial::random(&mut prng, 10))
            .collect();
        let r = Fr::rand(&mut prng);
        let folded_poly = fold_elems(&polys, &r);
        let digests: Vec<_> = polys.iter().map(|p| pcs.commit(p).unwrap()).collect();
        assert_eq!(pcs.commit(&folded_poly).unwrap(), fold_elems(&digests, &r));

        let x = Fr::rand(&mut prng);
        let evals: Vec<Fr> = polys.iter().map(|p| p.eval(&x)).collect();
        assert_eq!(folded_poly.eval(&x), fold_elems(&evals, &r));
        assert_eq!(
            digests[0].op(&digests[1].inv()),
            pcs.commit(&polys[0].sub(&polys[1])).unwrap()
        );
    }

    #[test]
    fn test_batch_open_single_point() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let pcs = KZGCommitmentScheme::new(16, &mut prng);
        let polys: Vec<FpPolynomial> = (0..5)
            .map(|i| FpPolynomial::random(&mut prng, 10 + i))
            .collect();
        let digests: Vec<_> = polys.iter().map(|p| pcs.commit(p).unwrap()).collect();
        let point = Fr::rand(&mut prng);
        let poly_refs: Vec<&FpPolynomial> = polys.iter().collect();
        let proof = pcs
            .batch_open_single_point(&poly_refs, &digests, &point)
            .unwrap();
        let (single, digest) = pcs.fold_proof(&digests, &proof, &point).unwrap();
        assert!(pcs.verify(&digest, &single, &point).is_ok());

        let mut bad = proof.clone();
        bad.claimed_values[2] += Fr::from(1u64);
        let (single, digest) = pcs.fold_proof(&digests, &bad, &point).unwrap();
        assert!(pcs.verify(&digest, &single, &point).is_err());
        assert!(pcs.fold_proof(&digests[1..], &proof, &point).is_err());
    }

    #[test]
    fn test_batch_verify_multi_points() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let pcs = KZGCommitmentScheme::new(8, &mut prng);
        let polys: Vec<FpPolynomial> = (0..3).map(|_| FpPolynomial::random(&mut prng, 8)).collect();
        let points: Vec<Fr> = (0..3).map(|_| Fr::rand(&mut prng)).collect();
        let digests: Vec<_> = polys.iter().map(|p| pcs.commit(p).unwrap()).collect();
        let proofs: Vec<_> = polys
            .iter()
            .zip(points.iter())
            .map(|(p, x)| pcs.open(p, x).unwrap())
            .collect();
        assert!(pcs
            .batch_verify_multi_points(&digests, &proofs, &points)
            .is_ok());

        let verifier = pcs.shrink_to_verifier_only();
        assert!(verifier
            .batch_verify_multi_points(&digests, &proofs, &points)
            .is_ok());

        let mut swapped = points.clone();
        swapped.swap(0, 1);
        assert!(pcs
            .batch_verify_multi_points(&digests, &proofs, &swapped)
            .is_err());
    }
}
