#[cfg(test)]
mod smoke_distributed {
    use crate::tests::{identity_circuit, init_tracing, prove_distributed, squaring_chain};
    use ark_ec::{AffineRepr, CurveGroup};
    use ark_ff::One;
    use piano_plonk::distributed::verifier::verifier;
    use piano_plonk::errors::{ConstraintFailure, PlonkError, Stage};
    use piano_plonk::plonk::prover::ProverConfig;
    use piano_plonk::poly_commit::kzg_poly_com::KZGCommitment;
    use piano_plonk::{Fr, G1Affine};

    #[test]
    fn two_parties() {
        init_tracing();
        let parties = vec![identity_circuit(5), identity_circuit(9)];
        let inputs: Vec<Vec<Fr>> = parties.iter().map(|(_, w)| w[..1].to_vec()).collect();
        let mut run = prove_distributed(parties, &[], ProverConfig::default(), 0).unwrap();
        assert!(matches!(run.results[1], Ok(None)));
        let proof = run.results.remove(0).unwrap().unwrap();
        let vk = &run.verifier_params;
        assert!(verifier(vk, &inputs, &proof).is_ok());

        // scenario B on the row axis
        let mut bad = proof;
        bad.row_batched_proof.h =
            KZGCommitment((bad.row_batched_proof.h.0 + G1Affine::generator()).into_affine());
        assert_eq!(
            verifier(vk, &inputs, &bad),
            Err(PlonkError::ConstraintFailure(ConstraintFailure::Fold {
                stage: Stage::RowAxis
            }))
        );
    }

    #[test]
    fn four_party_chain() {
        init_tracing();
        // the output of each party is the input of the next one
        let mut parties = vec![squaring_chain(5, 2)];
        for p in 1..4 {
            let (_, prev) = &parties[p - 1];
            let output = prev[5];
            let (cs, mut witness) = squaring_chain(5, 0);
            witness[0] = output;
            for i in 0..5 {
                witness[i + 1] = witness[i] * witness[i];
            }
            parties.push((cs, witness));
        }
        let links: Vec<_> = (1..4).map(|p| ((p - 1, 5), (p, 0))).collect();
        let inputs: Vec<Vec<Fr>> = parties.iter().map(|(_, w)| w[..1].to_vec()).collect();

        let mut run =
            prove_distributed(parties.clone(), &links, ProverConfig::default(), 1).unwrap();
        let proof = run.results.remove(0).unwrap().unwrap();
        assert!(verifier(&run.verifier_params, &inputs, &proof).is_ok());

        // break the link between the last two parties
        let mut broken = parties;
        broken[3].1[0] += Fr::one();
        for i in 0..5 {
            broken[3].1[i + 1] = broken[3].1[i] * broken[3].1[i];
        }
        let inputs: Vec<Vec<Fr>> = broken.iter().map(|(_, w)| w[..1].to_vec()).collect();
        let mut run = prove_distributed(broken, &links, ProverConfig::default(), 2).unwrap();
        let proof = run.results.remove(0).unwrap().unwrap();
        assert!(matches!(
            verifier(&run.verifier_params, &inputs, &proof),
            Err(PlonkError::ConstraintFailure(_))
        ));
    }

    #[test]
    fn forced_witness_is_rejected() {
        let mut parties = vec![identity_circuit(3), identity_circuit(4)];
        parties[1].1[2] += Fr::one();
        let inputs: Vec<Vec<Fr>> = parties.iter().map(|(_, w)| w[..1].to_vec()).collect();
        let config = ProverConfig { force: true };
        let mut run = prove_distributed(parties, &[], config, 3).unwrap();
        let proof = run.results.remove(0).unwrap().unwrap();
        assert!(verifier(&run.verifier_params, &inputs, &proof).is_err());
    }
}
