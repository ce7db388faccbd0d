//! Capabilities supplied by the embedding node.
//!
//! The protocol core never signs with a validator key, talks to the network
//! or reads chain state by itself. Instead it is handed the following
//! capabilities at runtime, so that the signature backend and the transport
//! can be chosen by the caller.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::ciphersuite::CipherSuite;
use crate::dkg::{Complaint, MasterPublicKey, PrivateShare};
use crate::error::DkgResult;
use crate::identity::NodeId;
use crate::serialization::impl_serialization_traits;
use crate::utils::Vec;

/// An opaque signature produced by a validator's transport key over the
/// signing digest of a protocol message.
#[derive(Clone, Debug, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct TransportSignature(pub Vec<u8>);

impl_serialization_traits!(TransportSignature);

impl TransportSignature {
    /// Whether this signature has been filled in.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A validator's message signing key.
pub trait Signer: Send + Sync {
    /// The identity associated with this signing key.
    fn node_id(&self) -> NodeId;

    /// Sign a 32-byte message digest.
    fn sign(&self, digest: &[u8; 32]) -> DkgResult<TransportSignature>;
}

/// Recovery of the signer identity from a transport signature.
pub trait IdentityRecovery: Send + Sync {
    /// Return the identity which produced `signature` over `digest`, or an
    /// error if the signature is malformed or invalid.
    fn recover_identity(
        &self,
        digest: &[u8; 32],
        signature: &TransportSignature,
    ) -> DkgResult<NodeId>;
}

/// Sink for the messages emitted by a DKG participant.
///
/// Implementations are responsible for delivery. They must not block on
/// acknowledgements from peers.
pub trait Receiver<C: CipherSuite> {
    /// Broadcast a complaint against another participant.
    fn propose_complaint(&mut self, complaint: Complaint<C>);

    /// Broadcast this participant's master public key.
    fn propose_master_public_key(&mut self, master_public_key: MasterPublicKey<C>);

    /// Send a private share to its sole recipient `to`.
    fn propose_private_share(&mut self, to: NodeId, share: PrivateShare<C>);
}

/// Read access to the canonical per-round view of the protocol messages.
pub trait Governance<C: CipherSuite> {
    /// All master public keys recorded for `round`.
    fn master_public_keys(&self, round: u64) -> Vec<MasterPublicKey<C>>;

    /// All complaints recorded for `round`.
    fn complaints(&self, round: u64) -> Vec<Complaint<C>>;
}
