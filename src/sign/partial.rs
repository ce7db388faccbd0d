//! Partial signatures, produced by each qualified participant over the
//! digest of a signing event.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::capabilities::{IdentityRecovery, Signer, TransportSignature};
use crate::ciphersuite::CipherSuite;
use crate::dkg::messages::{is_signed_by, write_canonical};
use crate::error::DkgResult;
use crate::identity::NodeId;
use crate::keys::ShareSecret;
use crate::serialization::impl_serialization_traits;
use crate::utils::{hash_message, SignaturePoint, Vec};

const PARTIAL_SIGNATURE_TAG: &[u8] = b"TSIG_PARTIAL_SIGNATURE";

/// A participant's BLS signature share \\( s_i \cdot H(m) \\) over a digest.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PartialSignature<C: CipherSuite> {
    /// The signing participant.
    pub proposer_id: NodeId,
    /// The DKG round of the key being used.
    pub round: u64,
    /// The digest being signed.
    pub digest: [u8; 32],
    /// The signature share.
    pub partial_signature: SignaturePoint<C>,
    /// The proposer's transport signature.
    pub signature: TransportSignature,
}

impl_serialization_traits!(PartialSignature<CipherSuite>);

impl<C: CipherSuite> PartialSignature<C> {
    /// Sign `digest` with `share_secret`, and authenticate the result with
    /// the holder's transport key.
    pub fn new(
        share_secret: &ShareSecret<C>,
        round: u64,
        digest: &[u8; 32],
        signer: &dyn Signer,
    ) -> DkgResult<Self> {
        let mut partial = Self {
            proposer_id: share_secret.node_id,
            round,
            digest: *digest,
            partial_signature: share_secret.sign(digest)?,
            signature: TransportSignature::default(),
        };
        partial.signature = signer.sign(&partial.signing_digest()?)?;

        Ok(partial)
    }

    /// The digest covered by the transport signature.
    pub fn signing_digest(&self) -> DkgResult<[u8; 32]> {
        let mut bytes = Vec::new();
        write_canonical(&self.proposer_id, &mut bytes)?;
        write_canonical(&self.round, &mut bytes)?;
        write_canonical(&self.digest, &mut bytes)?;
        write_canonical(&self.partial_signature, &mut bytes)?;

        Ok(hash_message(PARTIAL_SIGNATURE_TAG, &bytes))
    }

    /// Whether the transport signature was produced by the proposer.
    pub fn verify_signature(&self, recovery: &dyn IdentityRecovery) -> bool {
        match self.signing_digest() {
            Ok(digest) => is_signed_by(recovery, &digest, &self.signature, &self.proposer_id),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::Identifier;
    use crate::testing::{Bls12381Sha256, SchnorrIdentityRecovery, SchnorrSigner};
    use crate::{FromBytes, ToBytes};

    use ark_bls12_381::Fr;
    use ark_ff::UniformRand;
    use rand::rngs::OsRng;

    fn share_secret(signer: &SchnorrSigner) -> ShareSecret<Bls12381Sha256> {
        ShareSecret {
            node_id: signer.node_id(),
            identifier: Identifier::derive(&signer.node_id()).unwrap(),
            key: Fr::rand(&mut OsRng),
        }
    }

    #[test]
    fn transport_signature_binds_every_field() {
        let signer = SchnorrSigner::new(OsRng);
        let secret = share_secret(&signer);

        let partial = PartialSignature::new(&secret, 3, &[1u8; 32], &signer).unwrap();
        assert!(partial.verify_signature(&SchnorrIdentityRecovery));

        let mut other_digest = partial.clone();
        other_digest.digest = [2u8; 32];
        assert!(!other_digest.verify_signature(&SchnorrIdentityRecovery));

        let mut other_round = partial.clone();
        other_round.round = 4;
        assert!(!other_round.verify_signature(&SchnorrIdentityRecovery));

        let impostor = SchnorrSigner::new(OsRng);
        let mut stolen = partial.clone();
        stolen.signature = impostor.sign(&partial.signing_digest().unwrap()).unwrap();
        assert!(!stolen.verify_signature(&SchnorrIdentityRecovery));
    }

    #[test]
    fn test_serialization() {
        let signer = SchnorrSigner::new(OsRng);
        let partial =
            PartialSignature::new(&share_secret(&signer), 1, &[9u8; 32], &signer).unwrap();

        let bytes = partial.to_bytes().unwrap();
        assert_eq!(partial, PartialSignature::from_bytes(&bytes).unwrap());
    }
}
