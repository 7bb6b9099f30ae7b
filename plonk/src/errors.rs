use crate::poly_commit::errors::PolyComSchemeError;
use crate::Fr;
use ark_serialize::SerializationError;
use std::{error, fmt};

pub(crate) type Result<T, E = PlonkError> = core::result::Result<T, E>;

/// The axis (or single-axis protocol) a verification failure belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Stage {
    /// The single-axis protocol.
    SingleAxis,
    /// The row axis (X) of the distributed protocol.
    RowAxis,
    /// The column axis (Y) of the distributed protocol.
    ColumnAxis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::SingleAxis => "single axis",
            Stage::RowAxis => "row axis",
            Stage::ColumnAxis => "column axis",
        })
    }
}

/// Why a transcript operation was rejected.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BindingFault {
    /// The label was not declared when the transcript was created.
    UnknownLabel,
    /// The challenge under this label has already been computed.
    AlreadyComputed,
    /// A challenge declared before this one has not been computed yet.
    PreviousNotComputed,
    /// The authority has no data to bind under this label.
    MissingData,
}

/// A proof that the verifier rejects.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConstraintFailure {
    /// The constraint identity does not vanish at the challenge point.
    Residual {
        /// Where the identity was checked.
        stage: Stage,
        /// The nonzero value of the identity.
        residual: Fr,
    },
    /// The folded opening failed its pairing check.
    Fold {
        /// Which fold failed.
        stage: Stage,
    },
}

/// Transport failures of the distributed protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransportFault {
    /// The peer hung up.
    Disconnected,
    /// The peer id is out of range.
    UnknownParty,
    /// The peer sent a list of the wrong length.
    LengthMismatch {
        /// Elements expected.
        expected: usize,
        /// Elements received.
        received: usize,
    },
    /// The buffer does not decode to a field or group element.
    Malformed,
}

/// Parameter errors detected at setup or at the entry of prove/verify.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SetupFault {
    /// No radix-2 domain of this size exists for the field.
    DomainUnsupported {
        /// The requested size.
        size: usize,
    },
    /// The circuit has more rows than the domain.
    TooManyRows {
        /// Public rows plus gates.
        rows: usize,
        /// The domain size.
        domain: usize,
    },
    /// The commitment parameters do not cover the blinded polynomial degrees.
    SrsTooSmall {
        /// The degree the protocol needs.
        required: usize,
        /// The degree the parameters support.
        available: usize,
    },
    /// The permutation is not a bijection on the wire slots.
    InvalidPermutation,
    /// A gate references a variable the circuit does not declare.
    InvalidWire {
        /// The offending variable index.
        wire: usize,
    },
    /// The witness does not have the length the circuit declares.
    WitnessLength {
        /// Expected length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// The public input list does not have the length the key declares.
    PublicInputLength {
        /// Expected length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// The number of parties does not match the key.
    PartyCount {
        /// Expected number of parties.
        expected: usize,
        /// Supplied number of parties.
        got: usize,
    },
    /// The transport rank of a party differs from the rank of its proving key.
    PartyRank {
        /// Rank of the proving key.
        expected: usize,
        /// Rank of the transport endpoint.
        got: usize,
    },
    /// The proof does not have the shape the key expects.
    MalformedProof,
}

/// Errors of the provers and verifiers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PlonkError {
    /// The witness does not satisfy the gate at this index.
    WitnessUnsatisfied {
        /// Index of the first unsatisfied gate.
        gate: usize,
    },
    /// A bind or challenge violated the protocol order.
    TranscriptBinding {
        /// The challenge label.
        label: &'static str,
        /// What went wrong.
        fault: BindingFault,
    },
    /// Committing or opening a polynomial failed.
    Commitment {
        /// The protocol stage.
        stage: &'static str,
        /// Which polynomial of the stage.
        index: usize,
        /// The commitment scheme error.
        fault: PolyComSchemeError,
    },
    /// The proof was rejected.
    ConstraintFailure(ConstraintFailure),
    /// Sending to or receiving from a peer failed.
    Transport {
        /// The peer.
        peer: usize,
        /// What went wrong.
        fault: TransportFault,
    },
    /// Invalid parameters.
    Setup(SetupFault),
}

impl fmt::Display for PlonkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlonkError::WitnessUnsatisfied { gate } => {
                write!(f, "Witness does not satisfy gate {}.", gate)
            }
            PlonkError::TranscriptBinding { label, fault } => {
                write!(f, "Transcript binding error on {}: {:?}.", label, fault)
            }
            PlonkError::Commitment {
                stage,
                index,
                fault,
            } => write!(
                f,
                "Commitment error at stage {} (polynomial {}): {}",
                stage, index, fault
            ),
            PlonkError::ConstraintFailure(ConstraintFailure::Residual { stage, residual }) => {
                write!(
                    f,
                    "Constraint identity does not hold on the {}: residual {}.",
                    stage, residual
                )
            }
            PlonkError::ConstraintFailure(ConstraintFailure::Fold { stage }) => {
                write!(f, "Batch verification failed at the {} fold.", stage)
            }
            PlonkError::Transport { peer, fault } => {
                write!(f, "Transport error with party {}: {:?}.", peer, fault)
            }
            PlonkError::Setup(fault) => write!(f, "Setup error: {:?}.", fault),
        }
    }
}

impl error::Error for PlonkError {}

impl From<SerializationError> for PlonkError {
    fn from(_: SerializationError) -> PlonkError {
        PlonkError::Commitment {
            stage: "serialization",
            index: 0,
            fault: PolyComSchemeError::SerializationError,
        }
    }
}

impl From<PolyComSchemeError> for PlonkError {
    fn from(fault: PolyComSchemeError) -> PlonkError {
        PlonkError::Commitment {
            stage: "transcript",
            index: 0,
            fault,
        }
    }
}

/// Wrap a commitment scheme error with the stage and polynomial index it happened at.
pub(crate) fn commitment_error(
    stage: &'static str,
    index: usize,
) -> impl FnOnce(PolyComSchemeError) -> PlonkError {
    move |fault| PlonkError::Commitment {
        stage,
        index,
        fault,
    }
}
