use crate::errors::{commitment_error, PlonkError, Result, SetupFault};
use crate::plonk::{
    constraint_system::{Circuit, Permutation, VarIndex, N_WIRES_PER_GATE},
    indexer::{choose_ks, vanishing_coset_evals, Z_BLINDING_DEGREE},
};
use crate::poly_commit::{
    dkzg::{DistributedKZG, DistributedSRS},
    field_polynomial::{EvaluationDomain, FpPolynomial},
    kzg_poly_com::{KZGCommitment, KZGCommitmentScheme},
    pcs::{BatchOpeningProof, HomomorphicPolyComElem, OpeningProof, PolyComScheme},
};
use crate::Fr;
use ark_ff::batch_inversion;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{end_timer, start_timer};
use itertools::Itertools;

/// Number of chunks of the row-axis quotient `Hx`.
pub const N_HX_CHUNKS: usize = 4;

/// Number of chunks of the column-axis quotient `Hy`.
pub const N_HY_CHUNKS: usize = 4;

/// Blowup of the column coset on which `Hy` is evaluated.
pub const Y_BLOWUP: usize = 8;

/// Row-axis polynomials opened at \alpha:
/// `[foldedHx, L, R, O, Ql, Qr, Qm, Qo, Qk, Sy0, Sy1, Sy2, Sx0, Sx1, Sx2, Z]`.
pub const N_ROW_DIGESTS: usize = 16;

/// Column-axis polynomials opened at \beta: the row-axis claims, then
/// `Z(Y, \omega_X \alpha)`, `W` and the folded `Hy`.
pub const N_COLUMN_VALUES: usize = N_ROW_DIGESTS + 3;

/// Positions in the row and column openings.
pub(crate) const HX: usize = 0;
pub(crate) const WIRES: usize = 1;
pub(crate) const SELECTORS: usize = 4;
pub(crate) const SY: usize = 9;
pub(crate) const SX: usize = 12;
pub(crate) const Z: usize = 15;
pub(crate) const ZS: usize = 16;
pub(crate) const W: usize = 17;
pub(crate) const HY: usize = 18;

/// A copy constraint between a variable of one party and a variable of another,
/// `((party, variable), (party, variable))`.
pub type CopyLink = ((usize, VarIndex), (usize, VarIndex));

/// The size of the coset on which each party evaluates its share of `Hx`,
/// above the degree `5n + 4` of its numerator.
pub fn x_quotient_domain_size(n: usize) -> usize {
    (8 * n).max((5 * n + 5).next_power_of_two())
}

/// The data structure of a two-axis proof.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct DistributedProof {
    /// The wire commitments `L, R, O`, summed over the parties.
    pub cm_w_vec: Vec<KZGCommitment>,
    /// The local accumulators' commitment.
    pub cm_z: KZGCommitment,
    /// The cross-party product `W(Y)`, on the column-axis key.
    pub cm_w_product: KZGCommitment,
    /// The chunks of `Hx`.
    pub cm_hx_vec: Vec<KZGCommitment>,
    /// The row-axis opening at \alpha, whose claims are column-axis commitments.
    pub row_batched_proof: BatchOpeningProof<KZGCommitment>,
    /// The row-axis opening of the accumulator at \omega_X \alpha.
    pub z_shifted_row_proof: OpeningProof<KZGCommitment>,
    /// The chunks of `Hy`.
    pub cm_hy_vec: Vec<KZGCommitment>,
    /// The column-axis opening at \beta.
    pub column_batched_proof: BatchOpeningProof<Fr>,
    /// The opening of `W` at \omega_Y \beta.
    pub w_shifted_proof: OpeningProof<Fr>,
}

/// The proving key of one party.
#[derive(Debug, Clone)]
pub struct DistributedProverParams {
    /// The rank of the party.
    pub party: usize,
    /// The row-axis domain of size N.
    pub domain_x: EvaluationDomain,
    /// The domain whose coset carries the `Hx` evaluations.
    pub domain_x_m: EvaluationDomain,
    /// The party's selector polynomials `ql, qr, qm, qo, qk`.
    pub q_polys: Vec<FpPolynomial>,
    /// Column coordinates of the permuted slots, as polynomials in X.
    pub sy_polys: Vec<FpPolynomial>,
    /// Row coordinates of the permuted slots, as polynomials in X.
    pub sx_polys: Vec<FpPolynomial>,
    /// `\omega_Y^{p'}` of the image of every slot of the party.
    pub sy_evals: Vec<Vec<Fr>>,
    /// `k_{c'} \omega_X^{j'}` of the image of every slot of the party.
    pub sx_evals: Vec<Vec<Fr>>,
    /// The selectors on the coset of `domain_x_m`.
    pub q_coset_evals: Vec<Vec<Fr>>,
    /// The column coordinates on the coset of `domain_x_m`.
    pub sy_coset_evals: Vec<Vec<Fr>>,
    /// The row coordinates on the coset of `domain_x_m`.
    pub sx_coset_evals: Vec<Vec<Fr>>,
    /// `L_0(X)` on the coset.
    pub l0_coset_evals: Vec<Fr>,
    /// `L_{N-1}(X)` on the coset.
    pub l_last_coset_evals: Vec<Fr>,
    /// The distinct values of `1 / (X^N - 1)` on the coset.
    pub z_h_inv_coset_evals: Vec<Fr>,
    /// The points of the coset of `domain_x_m`.
    pub coset_quotient: Vec<Fr>,
    /// The party's share of the row-axis key.
    pub share: DistributedKZG,
    /// The column-axis key, used by the authority.
    pub column: KZGCommitmentScheme,
    /// The verifying key shared by every party.
    pub verifier_params: DistributedVerifierParams,
}

impl DistributedProverParams {
    /// Return a reference of verifier parameters.
    pub fn get_verifier_params_ref(&self) -> &DistributedVerifierParams {
        &self.verifier_params
    }
}

/// The verifying key of a two-axis circuit.
#[derive(Debug, Clone)]
pub struct DistributedVerifierParams {
    /// The size N of every party's sub-circuit.
    pub cs_size: usize,
    /// The number of public inputs of each party.
    pub nb_public: Vec<usize>,
    /// The row-axis domain of size N.
    pub domain_x: EvaluationDomain,
    /// The column-axis domain, one element per party.
    pub domain_y: EvaluationDomain,
    /// The coset representatives `[1, u, u^2]` of the wires.
    pub k: Vec<Fr>,
    /// Commitments to the selectors, summed over the row shares of all parties.
    pub cm_q_vec: Vec<KZGCommitment>,
    /// Commitments to the column coordinates of the permutation.
    pub cm_sy_vec: Vec<KZGCommitment>,
    /// Commitments to the row coordinates of the permutation.
    pub cm_sx_vec: Vec<KZGCommitment>,
    /// The verifier part of the row-axis key.
    pub row_pcs: DistributedKZG,
    /// The verifier part of the column-axis key.
    pub column_pcs: KZGCommitmentScheme,
}

impl DistributedVerifierParams {
    /// Number of parties M.
    pub fn nb_parties(&self) -> usize {
        self.domain_y.size()
    }
}

/// Evaluations of `L_{n-1}(X) = \omega^{-1} (X^n - 1) / (n (X - \omega^{-1}))` on the coset.
pub(crate) fn last_lagrange_coset_evals(domain: &EvaluationDomain, coset: &[Fr]) -> Vec<Fr> {
    let n = domain.size();
    let factor = coset.len() / n;
    let omega_inv = domain.generator_inv();
    let z_h: Vec<Fr> = coset[..factor]
        .iter()
        .map(|x| domain.evaluate_vanishing(x))
        .collect();
    let mut evals: Vec<Fr> = coset.iter().map(|x| *x - omega_inv).collect();
    batch_inversion(&mut evals);
    let scale = omega_inv * domain.size_inv();
    for (i, e) in evals.iter_mut().enumerate() {
        *e *= z_h[i % factor] * scale;
    }
    evals
}

fn find(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

/// Build the permutation of the `M * 3N` slots, slot `p * 3N + c * N + j` being wire `c` of
/// row `j` of party `p`. Slots referencing the same variable of a party, or variables joined
/// by a link, form one cycle.
pub fn global_permutation(
    circuits: &[Circuit],
    links: &[CopyLink],
    n: usize,
) -> Result<Permutation> {
    let offsets: Vec<usize> = circuits
        .iter()
        .scan(0, |acc, cs| {
            let offset = *acc;
            *acc += cs.nb_variables();
            Some(offset)
        })
        .collect();
    let nb_nodes: usize = circuits.iter().map(|cs| cs.nb_variables()).sum();
    let node = |party: usize, var: VarIndex| -> Result<usize> {
        let cs = circuits.get(party).ok_or(PlonkError::Setup(SetupFault::PartyCount {
            expected: circuits.len(),
            got: party + 1,
        }))?;
        if var >= cs.nb_variables() {
            return Err(PlonkError::Setup(SetupFault::InvalidWire { wire: var }));
        }
        Ok(offsets[party] + var)
    };

    let mut parent: Vec<usize> = (0..nb_nodes).collect();
    for ((pa, va), (pb, vb)) in links {
        let a = find(&mut parent, node(*pa, *va)?);
        let b = find(&mut parent, node(*pb, *vb)?);
        parent[a] = b;
    }

    let slot_width = N_WIRES_PER_GATE * n;
    let mut classes: Vec<Vec<usize>> = vec![vec![]; nb_nodes];
    for (party, cs) in circuits.iter().enumerate() {
        for (c, column) in cs.wire_rows(n).iter().enumerate() {
            for (j, var) in column.iter().enumerate() {
                let root = find(&mut parent, node(party, *var)?);
                classes[root].push(party * slot_width + c * n + j);
            }
        }
    }
    Permutation::from_classes(
        circuits.len() * slot_width,
        classes.into_iter().filter(|c| c.len() > 1),
    )
}

fn sum_shares(
    shares: &[DistributedKZG],
    polys_per_party: &[Vec<FpPolynomial>],
    index: usize,
    stage: &'static str,
) -> Result<KZGCommitment> {
    let mut sum = KZGCommitment::get_identity();
    for (share, polys) in shares.iter().zip(polys_per_party) {
        sum.op_assign(
            &share
                .commit_share(&polys[index])
                .map_err(commitment_error(stage, index))?,
        );
    }
    Ok(sum)
}

/// Run the preprocessing of a two-axis circuit: one sub-circuit per party, joined by
/// the copy `links`. Returns the proving key of every party, in rank order, and the
/// verifying key.
pub fn indexer(
    circuits: &[Circuit],
    links: &[CopyLink],
    srs: &DistributedSRS,
) -> Result<(Vec<DistributedProverParams>, DistributedVerifierParams)> {
    let indexer_timer = start_timer!(|| "Distributed::Indexer");
    let m = circuits.len();
    if m != srs.nb_parties() {
        return Err(PlonkError::Setup(SetupFault::PartyCount {
            expected: srs.nb_parties(),
            got: m,
        }));
    }
    let domain_y = EvaluationDomain::new(m)
        .ok_or(PlonkError::Setup(SetupFault::DomainUnsupported { size: m }))?;
    let n = circuits.iter().map(|cs| cs.size()).max().unwrap_or(1);
    let domain_x = EvaluationDomain::new(n)
        .ok_or(PlonkError::Setup(SetupFault::DomainUnsupported { size: n }))?;
    let m_x = x_quotient_domain_size(n);
    let domain_x_m = EvaluationDomain::new(m_x)
        .ok_or(PlonkError::Setup(SetupFault::DomainUnsupported { size: m_x }))?;

    let required = n + Z_BLINDING_DEGREE;
    let available = srs
        .shares
        .iter()
        .map(|s| s.max_degree())
        .min()
        .unwrap_or(0);
    if available < required {
        return Err(PlonkError::Setup(SetupFault::SrsTooSmall {
            required,
            available,
        }));
    }
    if srs.column.max_degree() < m {
        return Err(PlonkError::Setup(SetupFault::SrsTooSmall {
            required: m,
            available: srs.column.max_degree(),
        }));
    }
    tracing::debug!(parties = m, n, m_x, "distributed indexer");

    let permutation = global_permutation(circuits, links, n)?;
    let k = choose_ks();
    let x_group = domain_x.elements();
    let y_group = domain_y.elements();
    let slot_width = N_WIRES_PER_GATE * n;

    let q_polys: Vec<Vec<FpPolynomial>> = circuits
        .iter()
        .map(|cs| cs.selector_rows(n).iter().map(|e| domain_x.ifft(e)).collect())
        .collect();
    let (sy_evals, sx_evals): (Vec<Vec<Vec<Fr>>>, Vec<Vec<Vec<Fr>>>) = permutation
        .as_slice()
        .chunks(slot_width)
        .map(|party_slots| {
            party_slots
                .chunks(n)
                .map(|column| {
                    column
                        .iter()
                        .map(|s| {
                            let (party, rest) = (s / slot_width, s % slot_width);
                            (y_group[party], k[rest / n] * x_group[rest % n])
                        })
                        .unzip::<Fr, Fr, Vec<Fr>, Vec<Fr>>()
                })
                .unzip::<Vec<Fr>, Vec<Fr>, Vec<Vec<Fr>>, Vec<Vec<Fr>>>()
        })
        .unzip();
    let to_polys = |evals: &Vec<Vec<Vec<Fr>>>| -> Vec<Vec<FpPolynomial>> {
        evals
            .iter()
            .map(|party| party.iter().map(|e| domain_x.ifft(e)).collect())
            .collect()
    };
    let sy_polys = to_polys(&sy_evals);
    let sx_polys = to_polys(&sx_evals);

    let cm_q_vec = (0..q_polys[0].len())
        .map(|i| sum_shares(&srs.shares, &q_polys, i, "selectors"))
        .collect::<Result<Vec<_>>>()?;
    let cm_sy_vec = (0..N_WIRES_PER_GATE)
        .map(|i| sum_shares(&srs.shares, &sy_polys, i, "column permutation"))
        .collect::<Result<Vec<_>>>()?;
    let cm_sx_vec = (0..N_WIRES_PER_GATE)
        .map(|i| sum_shares(&srs.shares, &sx_polys, i, "row permutation"))
        .collect::<Result<Vec<_>>>()?;

    let verifier_params = DistributedVerifierParams {
        cs_size: n,
        nb_public: circuits.iter().map(|cs| cs.nb_public).collect(),
        domain_x,
        domain_y,
        k,
        cm_q_vec,
        cm_sy_vec,
        cm_sx_vec,
        row_pcs: srs.shares[0].shrink_to_verifier_only(),
        column_pcs: srs.column.shrink_to_verifier_only(),
    };

    let coset_quotient = domain_x_m.coset_elements();
    let (l0_coset_evals, z_h_inv_coset_evals) = vanishing_coset_evals(&domain_x, &coset_quotient);
    let l_last_coset_evals = last_lagrange_coset_evals(&domain_x, &coset_quotient);
    let coset_evals = |polys: &[FpPolynomial]| -> Vec<Vec<Fr>> {
        polys.iter().map(|p| domain_x_m.coset_fft(p)).collect()
    };

    let prover_params = q_polys
        .into_iter()
        .zip_eq(sy_polys)
        .zip_eq(sx_polys)
        .zip_eq(sy_evals.into_iter().zip_eq(sx_evals))
        .enumerate()
        .map(
            |(party, (((q_polys, sy_polys), sx_polys), (sy_evals, sx_evals)))| {
                DistributedProverParams {
                    party,
                    domain_x,
                    domain_x_m,
                    q_coset_evals: coset_evals(&q_polys),
                    sy_coset_evals: coset_evals(&sy_polys),
                    sx_coset_evals: coset_evals(&sx_polys),
                    q_polys,
                    sy_polys,
                    sx_polys,
                    sy_evals,
                    sx_evals,
                    l0_coset_evals: l0_coset_evals.clone(),
                    l_last_coset_evals: l_last_coset_evals.clone(),
                    z_h_inv_coset_evals: z_h_inv_coset_evals.clone(),
                    coset_quotient: coset_quotient.clone(),
                    share: srs.shares[party].clone(),
                    column: srs.column.clone(),
                    verifier_params: verifier_params.clone(),
                }
            },
        )
        .collect();
    end_timer!(indexer_timer);

    Ok((prover_params, verifier_params))
}

#[cfg(test)]
mod test {
    use super::{global_permutation, indexer, last_lagrange_coset_evals, x_quotient_domain_size};
    use crate::errors::{PlonkError, SetupFault};
    use crate::plonk::constraint_system::Circuit;
    use crate::poly_commit::{dkzg::DistributedSRS, field_polynomial::EvaluationDomain};
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    fn party_circuit() -> Circuit {
        let mut cs = Circuit::new(0, 2, 1);
        cs.insert_mul_gate(0, 1, 2).unwrap();
        cs.pad(4);
        cs
    }

    #[test]
    fn test_last_lagrange() {
        let domain = EvaluationDomain::new(4).unwrap();
        let domain_m = EvaluationDomain::new(x_quotient_domain_size(4)).unwrap();
        let coset = domain_m.coset_elements();
        let evals = last_lagrange_coset_evals(&domain, &coset);
        for (x, e) in coset.iter().zip(evals) {
            assert_eq!(e, domain.lagrange_basis_at(x)[3]);
        }
    }

    #[test]
    fn test_global_permutation() {
        let circuits = vec![party_circuit(), party_circuit()];
        // output of party 0 is the left input of party 1
        let perm = global_permutation(&circuits, &[((0, 2), (1, 0))], 4).unwrap();
        let slots = perm.as_slice();
        // o of row 0 of party 0 is slot 2 * 4, l of row 0 of party 1 is slot 12
        let mut cycle = vec![8];
        let mut s = slots[8];
        while s != 8 {
            cycle.push(s);
            s = slots[s];
        }
        assert!(cycle.contains(&12));
        assert!(cycle.iter().all(|s| *s == 8 || *s / 12 == 1));

        assert_eq!(
            global_permutation(&circuits, &[((0, 3), (1, 0))], 4).unwrap_err(),
            PlonkError::Setup(SetupFault::InvalidWire { wire: 3 })
        );
        assert!(global_permutation(&circuits, &[((2, 0), (1, 0))], 4).is_err());
    }

    #[test]
    fn test_setup_checks() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let y_domain = EvaluationDomain::new(2).unwrap();
        let circuits = vec![party_circuit(), party_circuit()];

        let srs = DistributedSRS::new(&y_domain, 5, 2, &mut prng);
        assert_eq!(
            indexer(&circuits, &[], &srs).unwrap_err(),
            PlonkError::Setup(SetupFault::SrsTooSmall {
                required: 6,
                available: 5
            })
        );
        let srs = DistributedSRS::new(&y_domain, 6, 2, &mut prng);
        let (pks, vk) = indexer(&circuits, &[], &srs).unwrap();
        assert_eq!(pks.len(), 2);
        assert_eq!(vk.nb_parties(), 2);
        assert_eq!(
            indexer(&circuits[..1], &[], &srs).unwrap_err(),
            PlonkError::Setup(SetupFault::PartyCount {
                expected: 2,
                got: 1
            })
        );
    }
}
