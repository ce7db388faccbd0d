use crate::identity::NodeId;
use crate::utils::Vec;

/// Errors that may happen during a DKG or threshold signing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Serialization error
    SerializationError,
    /// Deserialization error
    DeserializationError,
    /// Point compression error
    CompressionError,
    /// Hashing a message onto the signature group failed
    HashToCurveError,
    /// The threshold parameters are not usable
    InvalidParameters(u32, u32),
    /// An identity hashed to the zero identifier
    InvalidIdentifier,
    /// The same identifier appears twice in an interpolation set
    DuplicateIdentifier,
    /// A message was produced for another round, with (expected, received)
    RoundMismatch(u64, u64),
    /// Secret share verification failure
    ShareVerificationError,
    /// A master public key is malformed or carries an invalid signature
    InvalidCommitment(NodeId),
    /// A second master public key was received from the same proposer
    DuplicateCommitment(NodeId),
    /// The proposer is not known to this instance
    UnknownProposer(NodeId),
    /// A private share was addressed to another participant
    WrongRecipient(NodeId),
    /// A private share carries an invalid transport signature
    InvalidShareSignature(NodeId),
    /// A different private share was already accepted from this proposer
    DuplicatePrivateShare(NodeId),
    /// The private shares of this many qualified participants are missing
    IncompleteShares(usize),
    /// Fewer than the threshold of participants survived qualification
    InsufficientQualifiedParticipants(usize, u32),
    /// A partial signature was produced over another digest
    DigestMismatch,
    /// A partial signature was already recorded for this proposer
    DuplicateSignature(NodeId),
    /// A partial signature carries an invalid transport signature
    InvalidPartialSignatureSignature(NodeId),
    /// A transport signature could not be parsed or verified
    InvalidTransportSignature,
    /// Not enough partial signatures have been collected, with (collected, threshold)
    ThresholdNotReached(usize, u32),
    /// These participants provided invalid partial signatures
    MisbehavingParticipants(Vec<NodeId>),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::SerializationError => {
                write!(f, "An error happened while serializing.")
            }
            Error::DeserializationError => {
                write!(f, "An error happened while deserializing.")
            }
            Error::CompressionError => {
                write!(f, "An error happened while compressing a point.")
            }
            Error::HashToCurveError => {
                write!(f, "Could not hash the message onto the signature group.")
            }
            Error::InvalidParameters(n, t) => {
                write!(
                    f,
                    "Invalid threshold parameters: n = {}, t = {}, expected 0 < t <= n.",
                    n, t
                )
            }
            Error::InvalidIdentifier => {
                write!(f, "The identity maps to the zero identifier.")
            }
            Error::DuplicateIdentifier => {
                write!(f, "Duplicate identifiers provided for interpolation.")
            }
            Error::RoundMismatch(expected, received) => {
                write!(
                    f,
                    "Message is for round {}, but this instance runs round {}.",
                    received, expected
                )
            }
            Error::ShareVerificationError => {
                write!(f, "The secret share is not correct.")
            }
            Error::InvalidCommitment(id) => {
                write!(f, "The master public key from {} is invalid.", id)
            }
            Error::DuplicateCommitment(id) => {
                write!(f, "A master public key from {} was already processed.", id)
            }
            Error::UnknownProposer(id) => {
                write!(f, "The proposer {} is unknown.", id)
            }
            Error::WrongRecipient(id) => {
                write!(f, "The private share is addressed to {}.", id)
            }
            Error::InvalidShareSignature(id) => {
                write!(f, "The private share from {} is not correctly signed.", id)
            }
            Error::DuplicatePrivateShare(id) => {
                write!(
                    f,
                    "A different private share from {} was already accepted.",
                    id
                )
            }
            Error::IncompleteShares(missing) => {
                write!(
                    f,
                    "Missing private shares from {} qualified participants.",
                    missing
                )
            }
            Error::InsufficientQualifiedParticipants(qualified, t) => {
                write!(
                    f,
                    "Only {} participants are qualified, at least {} are required.",
                    qualified, t
                )
            }
            Error::DigestMismatch => {
                write!(f, "The partial signature is over another digest.")
            }
            Error::DuplicateSignature(id) => {
                write!(f, "A partial signature from {} was already recorded.", id)
            }
            Error::InvalidPartialSignatureSignature(id) => {
                write!(
                    f,
                    "The partial signature from {} is not correctly signed.",
                    id
                )
            }
            Error::InvalidTransportSignature => {
                write!(f, "The transport signature is not correct.")
            }
            Error::ThresholdNotReached(collected, t) => {
                write!(
                    f,
                    "Collected {} partial signatures, {} are required.",
                    collected, t
                )
            }
            Error::MisbehavingParticipants(ids) => {
                write!(
                    f,
                    "These participants provided invalid partial signatures: {:?}",
                    ids
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result alias used across the crate.
pub type DkgResult<T> = Result<T, Error>;
