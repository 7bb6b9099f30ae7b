use crate::errors::{PlonkError, Result, TransportFault};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Point-to-point byte channels between numbered parties.
pub trait Transport {
    /// The rank of this party.
    fn self_id(&self) -> usize;

    /// Number of parties, ranks being `0..party_count`.
    fn party_count(&self) -> usize;

    /// Send one message to `to`.
    fn send_bytes(&self, bytes: Vec<u8>, to: usize) -> Result<()>;

    /// Block until the next message from `from` arrives. Messages keep their framing,
    /// so the length is checked by the caller once the message is decoded.
    fn receive_bytes(&self, from: usize) -> Result<Vec<u8>>;
}

/// In-process transport, one unbounded channel per ordered pair of parties.
pub struct LocalTransport {
    id: usize,
    senders: Vec<Sender<Vec<u8>>>,
    receivers: Vec<Receiver<Vec<u8>>>,
}

impl LocalTransport {
    /// Connect `party_count` parties with each other. The transport of rank `i` is at index `i`.
    pub fn mesh(party_count: usize) -> Vec<LocalTransport> {
        // channels[from][to]
        let mut senders: Vec<Vec<Sender<Vec<u8>>>> = (0..party_count).map(|_| vec![]).collect();
        let mut receivers: Vec<Vec<Option<Receiver<Vec<u8>>>>> = (0..party_count)
            .map(|_| (0..party_count).map(|_| None).collect())
            .collect();
        for (from, party_senders) in senders.iter_mut().enumerate() {
            for to_receivers in receivers.iter_mut() {
                let (tx, rx) = channel();
                party_senders.push(tx);
                to_receivers[from] = Some(rx);
            }
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(id, (senders, receivers))| LocalTransport {
                id,
                senders,
                receivers: receivers.into_iter().flatten().collect(),
            })
            .collect()
    }
}

impl Transport for LocalTransport {
    fn self_id(&self) -> usize {
        self.id
    }

    fn party_count(&self) -> usize {
        self.senders.len()
    }

    fn send_bytes(&self, bytes: Vec<u8>, to: usize) -> Result<()> {
        let sender = self.senders.get(to).ok_or(PlonkError::Transport {
            peer: to,
            fault: TransportFault::UnknownParty,
        })?;
        sender.send(bytes).map_err(|_| PlonkError::Transport {
            peer: to,
            fault: TransportFault::Disconnected,
        })
    }

    fn receive_bytes(&self, from: usize) -> Result<Vec<u8>> {
        let receiver = self.receivers.get(from).ok_or(PlonkError::Transport {
            peer: from,
            fault: TransportFault::UnknownParty,
        })?;
        receiver.recv().map_err(|_| PlonkError::Transport {
            peer: from,
            fault: TransportFault::Disconnected,
        })
    }
}

/// Send a list of elements to `to`.
pub fn send_elems<T: Transport, V: CanonicalSerialize>(
    transport: &T,
    to: usize,
    elems: &[V],
) -> Result<()> {
    let mut bytes = Vec::with_capacity(elems.compressed_size());
    elems.serialize_compressed(&mut bytes)?;
    transport.send_bytes(bytes, to)
}

/// Receive a list of exactly `expected` elements from `from`.
pub fn receive_elems<T: Transport, V: CanonicalDeserialize>(
    transport: &T,
    from: usize,
    expected: usize,
) -> Result<Vec<V>> {
    let bytes = transport.receive_bytes(from)?;
    let elems = Vec::<V>::deserialize_compressed(bytes.as_slice()).map_err(|_| {
        PlonkError::Transport {
            peer: from,
            fault: TransportFault::Malformed,
        }
    })?;
    if elems.len() != expected {
        return Err(PlonkError::Transport {
            peer: from,
            fault: TransportFault::LengthMismatch {
                expected,
                received: elems.len(),
            },
        });
    }
    Ok(elems)
}
