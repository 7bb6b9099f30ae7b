use crate::poly_commit::{
    errors::PolyComSchemeError,
    field_polynomial::{EvaluationDomain, FpPolynomial},
    kzg_poly_com::{KZGCommitment, KZGCommitmentScheme},
    pcs::PolyComScheme,
};
use crate::{Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, Group, VariableBaseMSM};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::UniformRand;
use rand_core::{CryptoRng, RngCore};

/// The share of a bivariate KZG key held by one party of the row axis.
///
/// Party `i` commits its polynomial `f_i(X)` to `[R_i(tau_y) f_i(tau_x)]_1`, where
/// `R_i` is the `i`-th Lagrange polynomial of the column domain. Summing the shares of
/// all parties gives the commitment of `f(Y, X) = \sum_i R_i(Y) f_i(X)`.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct DistributedKZG {
    /// Index of the party owning this share.
    pub party: u64,
    /// `[R_i(tau_y) tau_x^j]_1` for `j` up to the max degree.
    pub public_parameter_group_1: Vec<G1Affine>,
    /// `[1]_2` and `[tau_x]_2`.
    pub public_parameter_group_2: Vec<G2Affine>,
}

impl DistributedKZG {
    /// Commit to the party's polynomial.
    pub fn commit_share(
        &self,
        polynomial: &FpPolynomial,
    ) -> Result<KZGCommitment, PolyComSchemeError> {
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

    /// The party's share of the quotient commitment for an opening at `point`.
    pub fn open_share(
        &self,
        polynomial: &FpPolynomial,
        point: &Fr,
    ) -> Result<KZGCommitment, PolyComSchemeError> {
        let (quotient, _) = polynomial.div_by_linear(point);
        self.commit_share(&quotient)
    }

    /// Keep only the parameters a verifier needs.
    pub fn shrink_to_verifier_only(&self) -> DistributedKZG {
        DistributedKZG {
            party: self.party,
            public_parameter_group_1: vec![],
            public_parameter_group_2: self.public_parameter_group_2.clone(),
        }
    }
}

impl PolyComScheme for DistributedKZG {
    type Value = KZGCommitment;

    fn max_degree(&self) -> usize {
        self.public_parameter_group_1.len().saturating_sub(1)
    }

    fn lift_value(&self, value: &KZGCommitment) -> Result<G1Projective, PolyComSchemeError> {
        Ok(value.0.into_group())
    }

    fn verifier_g2(&self) -> Result<(G2Affine, G2Affine), PolyComSchemeError> {
        match self.public_parameter_group_2.as_slice() {
            [g2, tau_g2, ..] => Ok((*g2, *tau_g2)),
            _ => Err(PolyComSchemeError::MissingParameters),
        }
    }
}

/// Keys of a two-axis setup: one row share per party, and a column key sharing
/// the trapdoor `tau_y`.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct DistributedSRS {
    /// Row-axis key shares, indexed by party.
    pub shares: Vec<DistributedKZG>,
    /// Column-axis key `[tau_y^k]_1`.
    pub column: KZGCommitmentScheme,
}

impl DistributedSRS {
    /// Sample a setup for `y_domain.size()` parties.
    pub fn new<R: CryptoRng + RngCore>(
        y_domain: &EvaluationDomain,
        max_degree_x: usize,
        max_degree_y: usize,
        prng: &mut R,
    ) -> DistributedSRS {
        let tau_x = Fr::rand(prng);
        let tau_y = Fr::rand(prng);

        let column = KZGCommitmentScheme::from_secret(max_degree_y, &tau_y);

        let g2 = G2Projective::generator();
        let public_parameter_group_2 = G2Projective::normalize_batch(&[g2, g2 * tau_x]);

        let shares = y_domain
            .lagrange_basis_at(&tau_y)
            .into_iter()
            .enumerate()
            .map(|(party, lagrange)| {
                let mut elem_g1 = G1Projective::generator() * lagrange;
                let mut powers = Vec::with_capacity(max_degree_x + 1);
                for _ in 0..=max_degree_x {
                    powers.push(elem_g1);
                    elem_g1 *= tau_x;
                }
                DistributedKZG {
                    party: party as u64,
                    public_parameter_group_1: G1Projective::normalize_batch(&powers),
                    public_parameter_group_2: public_parameter_group_2.clone(),
                }
            })
            .collect();

        DistributedSRS { shares, column }
    }

    /// Number of parties.
    pub fn nb_parties(&self) -> usize {
        self.shares.len()
    }
}

#[cfg(test)]
mod test {
    use super::DistributedSRS;
    use crate::poly_commit::{
        field_polynomial::{EvaluationDomain, FpPolynomial},
        kzg_poly_com::KZGCommitment,
        pcs::{HomomorphicPolyComElem, OpeningProof, PolyComScheme},
    };
    use crate::Fr;
    use ark_std::UniformRand;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    #[test]
    fn test_row_opening() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let y_domain = EvaluationDomain::new(4).unwrap();
        let srs = DistributedSRS::new(&y_domain, 8, 8, &mut prng);
        let polys: Vec<FpPolynomial> = (0..4).map(|_| FpPolynomial::random(&mut prng, 8)).collect();
        let point = Fr::rand(&mut prng);

        let mut digest = KZGCommitment::get_identity();
        let mut h = KZGCommitment::get_identity();
        for (share, poly) in srs.shares.iter().zip(polys.iter()) {
            digest.op_assign(&share.commit_share(poly).unwrap());
            h.op_assign(&share.open_share(poly, &point).unwrap());
        }

        let evals: Vec<Fr> = polys.iter().map(|p| p.eval(&point)).collect();
        let claimed_value = srs.column.commit(&y_domain.ifft(&evals)).unwrap();
        let verifier = srs.shares[0].shrink_to_verifier_only();
        let proof = OpeningProof { h, claimed_value };
        assert!(verifier.verify(&digest, &proof, &point).is_ok());

        let mut wrong = evals.clone();
        wrong[1] += Fr::from(1u64);
        let proof = OpeningProof {
            h,
            claimed_value: srs.column.commit(&y_domain.ifft(&wrong)).unwrap(),
        };
        assert!(verifier.verify(&digest, &proof, &point).is_err());
    }
}
