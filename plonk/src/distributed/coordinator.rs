use crate::distributed::transport::{receive_elems, send_elems, Transport};
use crate::errors::{BindingFault, PlonkError, Result};
use crate::plonk::transcript::Transcript;
use crate::poly_commit::{kzg_poly_com::KZGCommitment, pcs::HomomorphicPolyComElem};
use crate::Fr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// Where a party gets its challenges from, chosen once per Prove call.
pub enum ChallengeSource<T: Transport> {
    /// Rank 0: binds the protocol data, derives every challenge and sends it to the others.
    Authority(T),
    /// Every other rank: receives each challenge from rank 0 and uses it verbatim.
    Follower(T),
}

impl<T: Transport> ChallengeSource<T> {
    /// Pick the role from the rank of the transport.
    pub fn new(transport: T) -> ChallengeSource<T> {
        if transport.self_id() == 0 {
            ChallengeSource::Authority(transport)
        } else {
            ChallengeSource::Follower(transport)
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        match self {
            ChallengeSource::Authority(t) | ChallengeSource::Follower(t) => t,
        }
    }

    /// Whether this party is rank 0.
    pub fn is_authority(&self) -> bool {
        matches!(self, ChallengeSource::Authority(_))
    }
}

/// Lock-step exchanges of one Prove call. Only the authority holds a transcript.
pub(crate) struct Coordinator<'a, T: Transport> {
    source: &'a ChallengeSource<T>,
    transcript: Option<Transcript>,
}

impl<'a, T: Transport> Coordinator<'a, T> {
    pub(crate) fn new(source: &'a ChallengeSource<T>) -> Self {
        Coordinator {
            source,
            transcript: None,
        }
    }

    /// Give the authority its transcript, once the data it starts from is gathered.
    pub(crate) fn set_transcript(&mut self, transcript: Transcript) {
        self.transcript = Some(transcript);
    }

    pub(crate) fn party(&self) -> usize {
        self.source.transport().self_id()
    }

    fn followers(&self) -> core::ops::Range<usize> {
        1..self.source.transport().party_count()
    }

    fn transcript_mut(&mut self, label: &'static str) -> Result<&mut Transcript> {
        self.transcript.as_mut().ok_or(PlonkError::TranscriptBinding {
            label,
            fault: BindingFault::MissingData,
        })
    }

    /// Bind commitments at the authority; followers have nothing to bind.
    pub(crate) fn bind_commitments(
        &mut self,
        label: &'static str,
        commitments: &[KZGCommitment],
    ) -> Result<()> {
        if let ChallengeSource::Authority(_) = self.source {
            let transcript = self.transcript_mut(label)?;
            for cm in commitments {
                transcript.bind_commitment(label, cm)?;
            }
        }
        Ok(())
    }

    /// Compute the challenge at the authority and send it to every follower, or
    /// receive it from the authority.
    pub(crate) fn challenge(&mut self, label: &'static str) -> Result<Fr> {
        match self.source {
            ChallengeSource::Authority(_) => {
                let challenge = self.transcript_mut(label)?.challenge(label)?;
                self.broadcast(&challenge)?;
                Ok(challenge)
            }
            ChallengeSource::Follower(transport) => {
                let challenge = receive_elems::<_, Fr>(transport, 0, 1)?;
                Ok(challenge[0])
            }
        }
    }

    /// Send a scalar the authority derived to every follower. Followers receive it.
    pub(crate) fn share_scalar(&self, scalar: Option<Fr>) -> Result<Fr> {
        match self.source {
            ChallengeSource::Authority(_) => {
                let scalar = scalar.ok_or(PlonkError::TranscriptBinding {
                    label: "folding coefficient",
                    fault: BindingFault::MissingData,
                })?;
                self.broadcast(&scalar)?;
                Ok(scalar)
            }
            ChallengeSource::Follower(transport) => Ok(receive_elems::<_, Fr>(transport, 0, 1)?[0]),
        }
    }

    fn broadcast(&self, scalar: &Fr) -> Result<()> {
        let transport = self.source.transport();
        for party in self.followers() {
            send_elems(transport, party, core::slice::from_ref(scalar))?;
        }
        Ok(())
    }

    /// Collect one list per party at the authority, in rank order. Followers send theirs
    /// and get `None`. `expected(p)` is the length of the list of party `p`.
    pub(crate) fn gather_with<V, L>(
        &self,
        local: Vec<V>,
        expected: L,
    ) -> Result<Option<Vec<Vec<V>>>>
    where
        V: CanonicalSerialize + CanonicalDeserialize,
        L: Fn(usize) -> usize,
    {
        match self.source {
            ChallengeSource::Authority(transport) => {
                let mut all = Vec::with_capacity(transport.party_count());
                all.push(local);
                for party in self.followers() {
                    all.push(receive_elems(transport, party, expected(party))?);
                }
                Ok(Some(all))
            }
            ChallengeSource::Follower(transport) => {
                send_elems(transport, 0, &local)?;
                Ok(None)
            }
        }
    }

    /// Collect lists of the same length as the local one.
    pub(crate) fn gather<V>(&self, local: Vec<V>) -> Result<Option<Vec<Vec<V>>>>
    where
        V: CanonicalSerialize + CanonicalDeserialize,
    {
        let len = local.len();
        self.gather_with(local, |_| len)
    }

    /// Collect the partial commitments of every party and sum them at the authority.
    pub(crate) fn gather_sum(
        &self,
        local: Vec<KZGCommitment>,
    ) -> Result<Option<Vec<KZGCommitment>>> {
        Ok(self.gather(local)?.map(|all| {
            let mut sums = vec![KZGCommitment::get_identity(); all[0].len()];
            for partials in all.iter() {
                for (sum, partial) in sums.iter_mut().zip(partials) {
                    sum.op_assign(partial);
                }
            }
            sums
        }))
    }

    /// The authority sends `parts[p]` to each follower `p` and keeps `parts[0]`;
    /// followers receive their part of length `len`.
    pub(crate) fn distribute<V>(&self, parts: Option<Vec<Vec<V>>>, len: usize) -> Result<Vec<V>>
    where
        V: CanonicalSerialize + CanonicalDeserialize,
    {
        match self.source {
            ChallengeSource::Authority(transport) => {
                let mut parts = parts
                    .ok_or(PlonkError::TranscriptBinding {
                        label: "distribute",
                        fault: BindingFault::MissingData,
                    })?
                    .into_iter();
                let own = parts.next().unwrap_or_default();
                for (party, part) in self.followers().zip(parts) {
                    send_elems(transport, party, &part)?;
                }
                Ok(own)
            }
            ChallengeSource::Follower(transport) => receive_elems(transport, 0, len),
        }
    }
}
