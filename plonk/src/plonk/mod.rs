//! The single-axis PLONK implementation.

/// Module for help functions.
pub(crate) mod helpers;

/// Module for the constraint system.
pub mod constraint_system;

/// Module for mapping witnesses to wire evaluations.
pub mod witness;

/// Module for prover.
pub mod prover;

/// Module for indexer.
pub mod indexer;

/// Module for transcript.
pub mod transcript;

/// Module for verifier.
pub mod verifier;

#[cfg(test)]
mod test {
    use crate::errors::{ConstraintFailure, PlonkError, SetupFault, Stage};
    use crate::plonk::{
        constraint_system::{Circuit, Permutation},
        indexer::{indexer, PlonkProof, PlonkProverParams},
        prover::{prover, ProverConfig},
        verifier::verifier,
    };
    use crate::poly_commit::{
        kzg_poly_com::{KZGCommitment, KZGCommitmentScheme},
        pcs::HomomorphicPolyComElem,
    };
    use crate::{Fr, G1Affine};
    use ark_ec::AffineRepr;
    use ark_ff::One;
    use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
    use rand_chacha::ChaChaRng;
    use rand_core::{CryptoRng, RngCore, SeedableRng};

    // circuit (x_0 + x_1) * (x_2 + 4) + x_0 * x_1 = x_8, x_0 and x_1 public
    // witness (1 + 2) * (3 + 4) + 1 * 2 = 23
    fn sample_circuit() -> (Circuit, Vec<Fr>) {
        let mut cs = Circuit::new(2, 1, 6);
        cs.insert_constant_gate(3, Fr::from(4u64)).unwrap();
        cs.insert_add_gate(0, 1, 4).unwrap();
        cs.insert_add_gate(2, 3, 5).unwrap();
        cs.insert_mul_gate(4, 5, 6).unwrap();
        cs.insert_mul_gate(0, 1, 7).unwrap();
        cs.insert_add_gate(6, 7, 8).unwrap();
        let witness = [1u64, 2, 3, 4, 3, 7, 21, 2, 23].map(Fr::from).to_vec();
        (cs, witness)
    }

    fn setup<R: CryptoRng + RngCore>(prng: &mut R, cs: &Circuit) -> PlonkProverParams {
        let n = cs.size();
        let pcs = KZGCommitmentScheme::new(n + 2, prng);
        let perm = Permutation::from_wiring(cs, n).unwrap();
        indexer(cs, &perm, &pcs).unwrap()
    }

    #[test]
    fn test_plonk_completeness() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let (cs, witness) = sample_circuit();
        let params = setup(&mut prng, &cs);
        let proof = prover(&mut prng, &cs, &params, &witness, &ProverConfig::default()).unwrap();
        let verifier_params = params.get_verifier_params_ref();
        assert!(verifier(verifier_params, &witness[..2], &proof).is_ok());

        let mut bytes = vec![];
        proof.serialize_compressed(&mut bytes).unwrap();
        let decoded = PlonkProof::deserialize_compressed(bytes.as_slice()).unwrap();
        assert_eq!(decoded, proof);

        // wrong public inputs
        let wrong = [Fr::from(2u64), Fr::from(2u64)];
        assert!(matches!(
            verifier(verifier_params, &wrong, &proof),
            Err(PlonkError::ConstraintFailure(ConstraintFailure::Residual {
                stage: Stage::SingleAxis,
                ..
            }))
        ));
        assert_eq!(
            verifier(verifier_params, &witness[..1], &proof),
            Err(PlonkError::Setup(SetupFault::PublicInputLength {
                expected: 2,
                got: 1
            }))
        );
    }

    #[test]
    fn test_plonk_completeness_across_sizes() {
        let mut prng = ChaChaRng::from_seed([3u8; 32]);
        for n in [2usize, 4, 8, 16, 32, 64, 128, 256] {
            // x_{i+1} = x_i * x_i, x_0 public
            let mut cs = Circuit::new(1, 0, n - 1);
            let mut witness = vec![Fr::from(3u64)];
            for i in 0..n - 1 {
                cs.insert_mul_gate(i, i, i + 1).unwrap();
                witness.push(witness[i] * witness[i]);
            }
            assert_eq!(cs.size(), n);
            let params = setup(&mut prng, &cs);
            let proof =
                prover(&mut prng, &cs, &params, &witness, &ProverConfig::default()).unwrap();
            assert!(verifier(params.get_verifier_params_ref(), &witness[..1], &proof).is_ok());
        }
    }

    #[test]
    fn test_plonk_rejects_every_altered_element() {
        let mut prng = ChaChaRng::from_seed([4u8; 32]);
        let (cs, witness) = sample_circuit();
        let params = setup(&mut prng, &cs);
        let proof = prover(&mut prng, &cs, &params, &witness, &ProverConfig::default()).unwrap();
        let verifier_params = params.get_verifier_params_ref();
        let shift = KZGCommitment(G1Affine::generator());

        let mut alterations: Vec<Box<dyn Fn(&mut PlonkProof)>> = vec![
            Box::new(|p: &mut PlonkProof| p.z_shifted_proof.claimed_value += Fr::one()),
            Box::new(move |p: &mut PlonkProof| p.z_shifted_proof.h.op_assign(&shift)),
            Box::new(move |p: &mut PlonkProof| p.batched_proof.h.op_assign(&shift)),
            Box::new(move |p: &mut PlonkProof| p.cm_z.op_assign(&shift)),
        ];
        for i in 0..proof.batched_proof.claimed_values.len() {
            alterations.push(Box::new(move |p: &mut PlonkProof| {
                p.batched_proof.claimed_values[i] += Fr::one()
            }));
        }
        for i in 0..proof.cm_w_vec.len() {
            alterations.push(Box::new(move |p: &mut PlonkProof| p.cm_w_vec[i].op_assign(&shift)));
        }
        for i in 0..proof.cm_t_vec.len() {
            alterations.push(Box::new(move |p: &mut PlonkProof| p.cm_t_vec[i].op_assign(&shift)));
        }
        assert_eq!(alterations.len(), 17);

        for alter in alterations.iter() {
            let mut bad = proof.clone();
            alter(&mut bad);
            assert!(verifier(verifier_params, &witness[..2], &bad).is_err());
        }
    }

    #[test]
    fn test_plonk_unsatisfied_witness() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let (cs, mut witness) = sample_circuit();
        let params = setup(&mut prng, &cs);
        witness[8] += Fr::one();
        assert_eq!(
            prover(&mut prng, &cs, &params, &witness, &ProverConfig::default()).unwrap_err(),
            PlonkError::WitnessUnsatisfied { gate: 5 }
        );

        let config = ProverConfig { force: true };
        let proof = prover(&mut prng, &cs, &params, &witness, &config).unwrap();
        assert!(verifier(params.get_verifier_params_ref(), &witness[..2], &proof).is_err());
    }

    #[test]
    fn test_plonk_tampered_proof() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let (cs, witness) = sample_circuit();
        let params = setup(&mut prng, &cs);
        let proof = prover(&mut prng, &cs, &params, &witness, &ProverConfig::default()).unwrap();
        let verifier_params = params.get_verifier_params_ref();

        let mut bad = proof.clone();
        bad.batched_proof.claimed_values[1] += Fr::one();
        assert!(matches!(
            verifier(verifier_params, &witness[..2], &bad),
            Err(PlonkError::ConstraintFailure(ConstraintFailure::Residual { .. }))
        ));

        let mut bad = proof.clone();
        bad.cm_w_vec.swap(0, 1);
        assert!(verifier(verifier_params, &witness[..2], &bad).is_err());

        let mut bad = proof;
        bad.cm_t_vec.pop();
        assert_eq!(
            verifier(verifier_params, &witness[..2], &bad),
            Err(PlonkError::Setup(SetupFault::MalformedProof))
        );
    }

    #[test]
    fn test_prover_config_serde() {
        let config = ProverConfig { force: true };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"force":true}"#);
        let back: ProverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert!(!ProverConfig::default().force);
    }
}
