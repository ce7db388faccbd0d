//! The messages exchanged during a DKG session, along with their canonical
//! signing digests.
//!
//! Every message is authenticated by its proposer's transport key over
//! `SHA-256(tag || encoding)`, where `encoding` is the compressed arkworks
//! serialization of every field but the signature. All participants must
//! agree on this encoding bit for bit.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use zeroize::Zeroize;

use crate::capabilities::{IdentityRecovery, Signer, TransportSignature};
use crate::ciphersuite::CipherSuite;
use crate::dkg::secret_share::PolynomialCommitment;
use crate::error::{DkgResult, Error};
use crate::identity::{Identifier, NodeId};
use crate::parameters::ThresholdParameters;
use crate::serialization::impl_serialization_traits;
use crate::utils::{hash_message, Scalar, Vec};

const MASTER_PUBLIC_KEY_TAG: &[u8] = b"DKG_MASTER_PUBLIC_KEY";
const PRIVATE_SHARE_TAG: &[u8] = b"DKG_PRIVATE_SHARE";
const COMPLAINT_TAG: &[u8] = b"DKG_COMPLAINT";

/// Serialize `value` into `bytes`, in compressed form.
pub(crate) fn write_canonical<T: CanonicalSerialize>(value: &T, bytes: &mut Vec<u8>) -> DkgResult<()> {
    value
        .serialize_compressed(bytes)
        .map_err(|_| Error::CompressionError)
}

/// Whether `signature` over `digest` recovers to `expected`.
pub(crate) fn is_signed_by(
    recovery: &dyn IdentityRecovery,
    digest: &[u8; 32],
    signature: &TransportSignature,
    expected: &NodeId,
) -> bool {
    match recovery.recover_identity(digest, signature) {
        Ok(id) => id == *expected,
        Err(_) => false,
    }
}

/// The public commitment of a participant to its secret polynomial for one round.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct MasterPublicKey<C: CipherSuite> {
    /// The participant which generated the polynomial.
    pub proposer_id: NodeId,
    /// The DKG round.
    pub round: u64,
    /// The proposer's evaluation point.
    pub identifier: Identifier<C>,
    /// The commitment to the proposer's secret coefficients.
    pub commitment: PolynomialCommitment<C>,
    /// The proposer's transport signature.
    pub signature: TransportSignature,
}

impl_serialization_traits!(MasterPublicKey<CipherSuite>);

impl<C: CipherSuite> MasterPublicKey<C> {
    /// The digest covered by the transport signature.
    pub fn signing_digest(&self) -> DkgResult<[u8; 32]> {
        let mut bytes = Vec::new();
        write_canonical(&self.proposer_id, &mut bytes)?;
        write_canonical(&self.round, &mut bytes)?;
        write_canonical(&self.identifier, &mut bytes)?;
        write_canonical(&self.commitment, &mut bytes)?;

        Ok(hash_message(MASTER_PUBLIC_KEY_TAG, &bytes))
    }

    /// Fill in the transport signature.
    pub fn sign(&mut self, signer: &dyn Signer) -> DkgResult<()> {
        self.signature = signer.sign(&self.signing_digest()?)?;
        Ok(())
    }

    /// Whether the transport signature was produced by the proposer.
    pub fn verify_signature(&self, recovery: &dyn IdentityRecovery) -> bool {
        match self.signing_digest() {
            Ok(digest) => is_signed_by(recovery, &digest, &self.signature, &self.proposer_id),
            Err(_) => false,
        }
    }

    /// Structural and authenticity checks independent of any protocol state:
    /// the identifier must be the proposer's, the commitment must hold
    /// exactly `t` points and the signature must recover to the proposer.
    pub fn is_well_formed(
        &self,
        parameters: &ThresholdParameters,
        recovery: &dyn IdentityRecovery,
    ) -> bool {
        let identifier_matches = Identifier::<C>::derive(&self.proposer_id)
            .map(|id| id == self.identifier)
            .unwrap_or(false);

        identifier_matches
            && self.commitment.check_degree(parameters)
            && self.verify_signature(recovery)
    }
}

/// A secret polynomial evaluation, addressed to exactly one recipient.
#[derive(Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PrivateShare<C: CipherSuite> {
    /// The participant which evaluated its polynomial.
    pub proposer_id: NodeId,
    /// The participant for which the polynomial was evaluated.
    pub receiver_id: NodeId,
    /// The DKG round.
    pub round: u64,
    /// The evaluation of the proposer's polynomial at the receiver's identifier.
    pub(crate) share: Scalar<C>,
    /// The proposer's transport signature.
    pub signature: TransportSignature,
}

impl_serialization_traits!(PrivateShare<CipherSuite>);

impl<C: CipherSuite> Drop for PrivateShare<C> {
    fn drop(&mut self) {
        self.share.zeroize();
    }
}

impl<C: CipherSuite> core::fmt::Debug for PrivateShare<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateShare")
            .field("proposer_id", &self.proposer_id)
            .field("receiver_id", &self.receiver_id)
            .field("round", &self.round)
            .finish_non_exhaustive()
    }
}

impl<C: CipherSuite> PrivateShare<C> {
    pub(crate) fn new(proposer_id: NodeId, receiver_id: NodeId, round: u64, share: Scalar<C>) -> Self {
        Self {
            proposer_id,
            receiver_id,
            round,
            share,
            signature: TransportSignature::default(),
        }
    }

    /// The digest covered by the transport signature.
    pub fn signing_digest(&self) -> DkgResult<[u8; 32]> {
        let mut bytes = Vec::new();
        write_canonical(&self.proposer_id, &mut bytes)?;
        write_canonical(&self.receiver_id, &mut bytes)?;
        write_canonical(&self.round, &mut bytes)?;
        write_canonical(&self.share, &mut bytes)?;

        Ok(hash_message(PRIVATE_SHARE_TAG, &bytes))
    }

    /// Fill in the transport signature.
    pub fn sign(&mut self, signer: &dyn Signer) -> DkgResult<()> {
        self.signature = signer.sign(&self.signing_digest()?)?;
        Ok(())
    }

    /// Whether the transport signature was produced by the proposer.
    pub fn verify_signature(&self, recovery: &dyn IdentityRecovery) -> bool {
        match self.signing_digest() {
            Ok(digest) => is_signed_by(recovery, &digest, &self.signature, &self.proposer_id),
            Err(_) => false,
        }
    }
}

/// A signed accusation against a participant of the round.
///
/// A complaint either carries the private share which failed verification,
/// which lets any third party check the fault on its own, or nothing at
/// all, in which case it only states that no share was received (a "nack").
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Complaint<C: CipherSuite> {
    /// The complaining participant.
    pub proposer_id: NodeId,
    /// The DKG round.
    pub round: u64,
    /// The accused participant.
    pub accused_id: NodeId,
    /// The offending share, signed by the accused.
    pub private_share: Option<PrivateShare<C>>,
    /// The complainer's transport signature.
    pub signature: TransportSignature,
}

impl_serialization_traits!(Complaint<CipherSuite>);

impl<C: CipherSuite> Complaint<C> {
    pub(crate) fn new(
        proposer_id: NodeId,
        round: u64,
        accused_id: NodeId,
        private_share: Option<PrivateShare<C>>,
    ) -> Self {
        Self {
            proposer_id,
            round,
            accused_id,
            private_share,
            signature: TransportSignature::default(),
        }
    }

    /// Whether this complaint only reports a missing share.
    pub fn is_nack(&self) -> bool {
        self.private_share.is_none()
    }

    /// The digest covered by the transport signature.
    pub fn signing_digest(&self) -> DkgResult<[u8; 32]> {
        let mut bytes = Vec::new();
        write_canonical(&self.proposer_id, &mut bytes)?;
        write_canonical(&self.round, &mut bytes)?;
        write_canonical(&self.accused_id, &mut bytes)?;
        write_canonical(&self.private_share, &mut bytes)?;

        Ok(hash_message(COMPLAINT_TAG, &bytes))
    }

    /// Fill in the transport signature.
    pub fn sign(&mut self, signer: &dyn Signer) -> DkgResult<()> {
        self.signature = signer.sign(&self.signing_digest()?)?;
        Ok(())
    }

    /// Whether the transport signature was produced by the complainer.
    pub fn verify_signature(&self, recovery: &dyn IdentityRecovery) -> bool {
        match self.signing_digest() {
            Ok(digest) => is_signed_by(recovery, &digest, &self.signature, &self.proposer_id),
            Err(_) => false,
        }
    }

    /// Check that this complaint proves a fault of the accused, given the
    /// accused's master public key and the complainer's identifier.
    ///
    /// A complaint is valid if:
    /// - the embedded share was signed by the accused, for this round,
    ///    and addressed to the complainer;
    /// - the share does not verify against the accused's commitment at the
    ///    complainer's identifier.
    ///
    /// The complaint's own signature is checked separately.
    pub fn proves_fault(
        &self,
        accused: &MasterPublicKey<C>,
        complainer_identifier: &Identifier<C>,
        recovery: &dyn IdentityRecovery,
    ) -> bool {
        let share = match &self.private_share {
            Some(share) => share,
            None => return false,
        };

        if accused.proposer_id != self.accused_id
            || share.proposer_id != self.accused_id
            || share.receiver_id != self.proposer_id
            || share.round != self.round
            || accused.round != self.round
        {
            return false;
        }

        if !share.verify_signature(recovery) {
            return false;
        }

        !accused
            .commitment
            .is_valid_share(complainer_identifier, &share.share)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dkg::secret_share::SecretPolynomial;
    use crate::testing::{
        corrupt_private_share, Bls12381Sha256, SchnorrIdentityRecovery, SchnorrSigner,
    };
    use crate::{FromBytes, ToBytes};

    use ark_bls12_381::Fr;
    use ark_ff::Field;
    use rand::rngs::OsRng;

    fn master_public_key(
        signer: &SchnorrSigner,
        params: &ThresholdParameters,
        polynomial: &SecretPolynomial<Bls12381Sha256>,
    ) -> MasterPublicKey<Bls12381Sha256> {
        let mut mpk = MasterPublicKey {
            proposer_id: signer.node_id(),
            round: 1,
            identifier: Identifier::derive(&signer.node_id()).unwrap(),
            commitment: polynomial.commit(),
            signature: TransportSignature::default(),
        };
        mpk.sign(signer).unwrap();
        assert!(mpk.commitment.check_degree(params));
        mpk
    }

    #[test]
    fn signed_master_public_key_is_well_formed() {
        let params = ThresholdParameters::new(3, 2).unwrap();
        let signer = SchnorrSigner::new(OsRng);
        let recovery = SchnorrIdentityRecovery;
        let polynomial = SecretPolynomial::random(&params, OsRng);

        let mut mpk = master_public_key(&signer, &params, &polynomial);
        assert!(mpk.is_well_formed(&params, &recovery));

        mpk.round = 2;
        assert!(!mpk.verify_signature(&recovery));
    }

    #[test]
    fn unsigned_messages_do_not_verify() {
        let signer = SchnorrSigner::new(OsRng);
        let share = PrivateShare::<Bls12381Sha256>::new(
            signer.node_id(),
            NodeId::default(),
            1,
            Fr::ONE,
        );

        assert!(!share.verify_signature(&SchnorrIdentityRecovery));
    }

    #[test]
    fn complaint_proves_fault_only_for_bad_shares() {
        let params = ThresholdParameters::new(3, 2).unwrap();
        let recovery = SchnorrIdentityRecovery;
        let accused = SchnorrSigner::new(OsRng);
        let complainer = SchnorrSigner::new(OsRng);
        let complainer_identifier =
            Identifier::<Bls12381Sha256>::derive(&complainer.node_id()).unwrap();

        let polynomial = SecretPolynomial::random(&params, OsRng);
        let mpk = master_public_key(&accused, &params, &polynomial);

        let mut good = PrivateShare::new(
            accused.node_id(),
            complainer.node_id(),
            1,
            polynomial.evaluate(&complainer_identifier),
        );
        good.sign(&accused).unwrap();

        let bad = corrupt_private_share(&good, &accused).unwrap();

        let mut unfounded = Complaint::new(complainer.node_id(), 1, accused.node_id(), Some(good));
        unfounded.sign(&complainer).unwrap();
        assert!(unfounded.verify_signature(&recovery));
        assert!(!unfounded.proves_fault(&mpk, &complainer_identifier, &recovery));

        let mut founded = Complaint::new(complainer.node_id(), 1, accused.node_id(), Some(bad));
        founded.sign(&complainer).unwrap();
        assert!(founded.proves_fault(&mpk, &complainer_identifier, &recovery));

        let nack = Complaint::<Bls12381Sha256>::new(complainer.node_id(), 1, accused.node_id(), None);
        assert!(nack.is_nack());
        assert!(!nack.proves_fault(&mpk, &complainer_identifier, &recovery));
    }

    #[test]
    fn forged_evidence_is_rejected() {
        let params = ThresholdParameters::new(3, 2).unwrap();
        let recovery = SchnorrIdentityRecovery;
        let accused = SchnorrSigner::new(OsRng);
        let complainer = SchnorrSigner::new(OsRng);
        let complainer_identifier =
            Identifier::<Bls12381Sha256>::derive(&complainer.node_id()).unwrap();

        let polynomial = SecretPolynomial::random(&params, OsRng);
        let mpk = master_public_key(&accused, &params, &polynomial);

        // The complainer cannot frame the accused with a share it signed itself.
        let mut forged = PrivateShare::new(accused.node_id(), complainer.node_id(), 1, Fr::ONE);
        forged.sign(&complainer).unwrap();

        let complaint = Complaint::new(complainer.node_id(), 1, accused.node_id(), Some(forged));
        assert!(!complaint.proves_fault(&mpk, &complainer_identifier, &recovery));
    }

    #[test]
    fn test_serialization() {
        let signer = SchnorrSigner::new(OsRng);
        let mut share =
            PrivateShare::<Bls12381Sha256>::new(signer.node_id(), NodeId([7; 32]), 3, Fr::ONE);
        share.sign(&signer).unwrap();

        let mut complaint = Complaint::new(signer.node_id(), 3, NodeId([7; 32]), Some(share));
        complaint.sign(&signer).unwrap();

        let bytes = complaint.to_bytes().unwrap();
        let decoded = Complaint::from_bytes(&bytes).unwrap();
        assert_eq!(complaint, decoded);
        assert!(decoded.verify_signature(&SchnorrIdentityRecovery));
    }
}
