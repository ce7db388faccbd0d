//! Validator identities and their mapping onto DKG evaluation points.

use core::fmt;

use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use sha2::{Digest, Sha256};

use crate::ciphersuite::CipherSuite;
use crate::error::{DkgResult, Error};
use crate::serialization::impl_serialization_traits;
use crate::utils::Scalar;

/// The public identity of a validator: the SHA-256 hash of its public key
/// encoding.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, CanonicalSerialize, CanonicalDeserialize,
)]
pub struct NodeId(pub [u8; 32]);

impl_serialization_traits!(NodeId);

impl NodeId {
    /// Derive the identity of the holder of `public_key`.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(Sha256::digest(public_key).into())
    }

    /// The raw identity bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..")
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

/// The point at which every polynomial concerning a participant is evaluated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Identifier<C: CipherSuite>(pub(crate) Scalar<C>);

impl_serialization_traits!(Identifier<CipherSuite>);

impl<C: CipherSuite> Identifier<C> {
    /// Map a validator identity onto its identifier.
    ///
    /// The mapping is a hash-to-field, hence one-way and collision resistant.
    /// Zero is reserved for the group secret and is never a valid identifier.
    pub fn derive(node_id: &NodeId) -> DkgResult<Self> {
        let scalar = C::h0(node_id.as_bytes());

        if scalar.is_zero() {
            return Err(Error::InvalidIdentifier);
        }

        Ok(Self(scalar))
    }

    pub(crate) fn to_scalar(self) -> Scalar<C> {
        self.0
    }
}
