use crate::errors::{BindingFault, PlonkError, Result};
use crate::plonk::indexer::PlonkVerifierParams;
use crate::poly_commit::{kzg_poly_com::KZGCommitment, pcs::ToBytes};
use crate::Fr;
use ark_ff::{BigInteger, Field, One, PrimeField};
use ark_std::UniformRand;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;

/// Challenge labels of the single-axis protocol, in the order they are computed.
pub const PLONK_LABELS: [&str; 4] = ["gamma", "beta", "alpha", "zeta"];

/// A Fiat-Shamir transcript whose challenges are declared up front.
///
/// Data bound under a label is absorbed right before the challenge of that label is
/// computed, so the order of `bind` calls across different labels does not matter.
/// Each challenge is computed at most once, in declaration order.
pub struct Transcript {
    inner: merlin::Transcript,
    labels: Vec<&'static str>,
    pending: Vec<Vec<Vec<u8>>>,
    computed: usize,
    group_order: usize,
}

impl Transcript {
    /// Create a transcript for the given challenge labels. Challenges are resampled
    /// while they are `group_order`-th roots of unity.
    pub fn new(
        domain_separator: &'static [u8],
        labels: &[&'static str],
        group_order: usize,
    ) -> Transcript {
        let mut inner = merlin::Transcript::new(b"PLONK");
        inner.append_message(b"New Domain", domain_separator);
        inner.append_u64(b"group order", group_order as u64);
        Transcript {
            inner,
            labels: labels.to_vec(),
            pending: vec![vec![]; labels.len()],
            computed: 0,
            group_order,
        }
    }

    fn position(&self, label: &'static str) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| *l == label)
            .ok_or(PlonkError::TranscriptBinding {
                label,
                fault: BindingFault::UnknownLabel,
            })
    }

    /// Bind bytes to the challenge `label`.
    pub fn bind(&mut self, label: &'static str, bytes: &[u8]) -> Result<()> {
        let index = self.position(label)?;
        if index < self.computed {
            return Err(PlonkError::TranscriptBinding {
                label,
                fault: BindingFault::AlreadyComputed,
            });
        }
        self.pending[index].push(bytes.to_vec());
        Ok(())
    }

    /// Bind a commitment to the challenge `label`.
    pub fn bind_commitment(
        &mut self,
        label: &'static str,
        commitment: &KZGCommitment,
    ) -> Result<()> {
        let bytes = commitment.to_bytes()?;
        self.bind(label, &bytes)
    }

    /// Bind a field element to the challenge `label`.
    pub fn bind_scalar(&mut self, label: &'static str, scalar: &Fr) -> Result<()> {
        self.bind(label, &scalar.into_bigint().to_bytes_le())
    }

    /// Compute the challenge `label` from everything bound so far.
    pub fn challenge(&mut self, label: &'static str) -> Result<Fr> {
        let index = self.position(label)?;
        if index < self.computed {
            return Err(PlonkError::TranscriptBinding {
                label,
                fault: BindingFault::AlreadyComputed,
            });
        }
        if index > self.computed {
            return Err(PlonkError::TranscriptBinding {
                label,
                fault: BindingFault::PreviousNotComputed,
            });
        }

        for bytes in core::mem::take(&mut self.pending[index]) {
            self.inner.append_message(label.as_bytes(), &bytes);
        }
        self.computed += 1;

        let mut buff = [0u8; 32];
        self.inner.challenge_bytes(label.as_bytes(), &mut buff);
        let mut prng = ChaChaRng::from_seed(buff);
        loop {
            let elem = Fr::rand(&mut prng);
            // elem should not be root-of-unity
            if elem.pow([self.group_order as u64]) != Fr::one() {
                return Ok(elem);
            }
        }
    }
}

/// Initialize the single-axis transcript: bind the verifying key and the public inputs
/// to `gamma`.
pub(crate) fn transcript_init_plonk(
    verifier_params: &PlonkVerifierParams,
    public_inputs: &[Fr],
) -> Result<Transcript> {
    let mut transcript = Transcript::new(b"Plonk Proof", &PLONK_LABELS, verifier_params.cs_size);
    for cm in verifier_params
        .cm_s_vec
        .iter()
        .chain(verifier_params.cm_q_vec.iter())
    {
        transcript.bind_commitment("gamma", cm)?;
    }
    for pi in public_inputs {
        transcript.bind_scalar("gamma", pi)?;
    }
    Ok(transcript)
}
