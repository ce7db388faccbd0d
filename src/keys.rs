//! The long-lived keys produced by a DKG session.

use ark_ec::pairing::Pairing;
use ark_ec::Group;
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use zeroize::Zeroize;

use crate::ciphersuite::CipherSuite;
use crate::dkg::secret_share::PolynomialCommitment;
use crate::error::{DkgResult, Error};
use crate::identity::{Identifier, NodeId};
use crate::parameters::ThresholdParameters;
use crate::serialization::impl_serialization_traits;
use crate::utils::{
    calculate_lagrange_coefficient, ensure_distinct, PublicPoint, Scalar, SignaturePoint, Vec,
};

/// A participant's long-lived secret share of the group signing key.
#[derive(Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ShareSecret<C: CipherSuite> {
    /// The identity of the holder.
    pub node_id: NodeId,
    /// The holder's evaluation point.
    pub identifier: Identifier<C>,
    /// The evaluation of the group polynomial at `identifier`.
    pub(crate) key: Scalar<C>,
}

impl_serialization_traits!(ShareSecret<CipherSuite>);

impl<C: CipherSuite> Drop for ShareSecret<C> {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl<C: CipherSuite> core::fmt::Debug for ShareSecret<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShareSecret")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

impl<C: CipherSuite> ShareSecret<C> {
    /// Produce this participant's partial BLS signature \\( s_i \cdot H(m) \\)
    /// over `digest`.
    pub fn sign(&self, digest: &[u8; 32]) -> DkgResult<SignaturePoint<C>> {
        Ok(C::hash_to_signature_group(digest)? * self.key)
    }

    /// Derive the corresponding public key \\( s_i \cdot G \\).
    pub fn public_key(&self) -> PublicPoint<C> {
        PublicPoint::<C>::generator() * self.key
    }
}

/// A qualified participant of a DKG round, along with its public key
/// share of the group key.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct QualifiedParticipant<C: CipherSuite> {
    /// The participant's identity.
    pub node_id: NodeId,
    /// The participant's evaluation point.
    pub identifier: Identifier<C>,
    /// The public half of the participant's [`ShareSecret`].
    pub public_key: PublicPoint<C>,
}

/// The public key of a DKG round, used to verify a signature made by a
/// threshold of its qualified participants.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct GroupPublicKey<C: CipherSuite> {
    /// The DKG round which produced this key.
    pub round: u64,
    /// The parameters the round was run with.
    pub parameters: ThresholdParameters,
    /// The group public key \\( \sum_j \lambda_j C_{j,0} \\).
    pub key: PublicPoint<C>,
    /// The qualified participants, ordered by [`NodeId`].
    pub(crate) participants: Vec<QualifiedParticipant<C>>,
}

impl_serialization_traits!(GroupPublicKey<CipherSuite>);

impl<C: CipherSuite> GroupPublicKey<C> {
    /// Combine the commitments of the qualified participants into the
    /// group public key and each participant's public key.
    ///
    /// Every qualified commitment is weighted by the Lagrange coefficient at
    /// zero of its proposer over the qualified identifiers, so that
    ///
    /// \\[
    /// Y = \sum_j \lambda_j C_j(0), \quad Y_i = \sum_j \lambda_j C_j(x_i)
    /// \\]
    pub(crate) fn from_commitments(
        round: u64,
        parameters: ThresholdParameters,
        qualified: &[(NodeId, Identifier<C>, &PolynomialCommitment<C>)],
    ) -> DkgResult<Self> {
        let identifiers: Vec<Identifier<C>> = qualified.iter().map(|(_, id, _)| *id).collect();
        ensure_distinct(&identifiers)?;

        let mut coefficients = Vec::with_capacity(qualified.len());
        for id in identifiers.iter() {
            coefficients.push(calculate_lagrange_coefficient(id, &identifiers)?);
        }

        let mut key = PublicPoint::<C>::zero();
        for ((_, _, commitment), lambda) in qualified.iter().zip(coefficients.iter()) {
            let constant = commitment.public_key().ok_or(Error::ShareVerificationError)?;
            key += *constant * lambda;
        }

        let mut participants: Vec<QualifiedParticipant<C>> = qualified
            .iter()
            .map(|(node_id, identifier, _)| {
                let mut public_key = PublicPoint::<C>::zero();
                for ((_, _, commitment), lambda) in qualified.iter().zip(coefficients.iter()) {
                    public_key += commitment.evaluate_hiding(identifier) * lambda;
                }

                QualifiedParticipant {
                    node_id: *node_id,
                    identifier: *identifier,
                    public_key,
                }
            })
            .collect();
        participants.sort_by_key(|p| p.node_id);

        Ok(Self {
            round,
            parameters,
            key,
            participants,
        })
    }

    /// Verify a BLS signature over `digest` against this group key, by
    /// checking \\( e(G, \sigma) = e(Y, H(m)) \\).
    pub fn verify_signature(&self, digest: &[u8; 32], signature: &SignaturePoint<C>) -> bool {
        verify_with_key::<C>(&self.key, digest, signature)
    }

    /// The qualified participants.
    pub fn participants(&self) -> &[QualifiedParticipant<C>] {
        &self.participants
    }

    /// The identifiers of the qualified participants.
    pub fn qualified_ids(&self) -> Vec<Identifier<C>> {
        self.participants.iter().map(|p| p.identifier).collect()
    }

    /// The identities of the qualified participants.
    pub fn qualified_node_ids(&self) -> Vec<NodeId> {
        self.participants.iter().map(|p| p.node_id).collect()
    }

    /// Look up a qualified participant.
    pub fn participant(&self, node_id: &NodeId) -> Option<&QualifiedParticipant<C>> {
        self.participants
            .binary_search_by_key(node_id, |p| p.node_id)
            .ok()
            .map(|index| &self.participants[index])
    }

    /// The public key of a qualified participant's share secret.
    pub fn participant_public_key(&self, node_id: &NodeId) -> Option<PublicPoint<C>> {
        self.participant(node_id).map(|p| p.public_key)
    }

    /// The number of partial signatures required to sign.
    pub fn threshold(&self) -> usize {
        self.parameters.threshold()
    }
}

/// Check a BLS signature over `digest` against `public_key`.
pub(crate) fn verify_with_key<C: CipherSuite>(
    public_key: &PublicPoint<C>,
    digest: &[u8; 32],
    signature: &SignaturePoint<C>,
) -> bool {
    let hashed = match C::hash_to_signature_group(digest) {
        Ok(point) => point,
        Err(_) => return false,
    };

    C::Engine::pairing(PublicPoint::<C>::generator(), *signature)
        == C::Engine::pairing(*public_key, hashed)
}
