use crate::poly_commit::{errors::PolyComSchemeError, pcs::ToBytes};
use crate::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_std::UniformRand;
use merlin::Transcript;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;

/// The trait for polynomial commitment transcript.
pub trait PolyComTranscript {
    /// Append the commitment to the transcript.
    fn append_commitment<C: ToBytes>(&mut self, commitment: &C) -> Result<(), PolyComSchemeError>;

    /// Append the field to the transcript.
    fn append_field_elem(&mut self, point: &Fr);

    /// Get challenge result.
    fn get_challenge_field_elem(&mut self, label: &'static [u8]) -> Fr;
}

impl PolyComTranscript for Transcript {
    fn append_commitment<C: ToBytes>(&mut self, commitment: &C) -> Result<(), PolyComSchemeError> {
        self.append_message(b"append commitment", &commitment.to_bytes()?);
        Ok(())
    }

    fn append_field_elem(&mut self, point: &Fr) {
        self.append_message(b"append field point", &point.into_bigint().to_bytes_le());
    }

    fn get_challenge_field_elem(&mut self, label: &'static [u8]) -> Fr {
        let mut buff = [0u8; 32];
        self.challenge_bytes(label, &mut buff);
        let mut prng = ChaChaRng::from_seed(buff);
        Fr::rand(&mut prng)
    }
}
