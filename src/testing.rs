//! Reference instantiations of the cipher suite and of the node
//! capabilities, used by the tests and benchmarks of this crate.

use core::fmt;

use ark_bls12_381::{Bls12_381, G2Projective};
use ark_ec::bls12::Bls12Config;
use ark_ec::hashing::{curve_maps::wb, map_to_curve_hasher::MapToCurveBasedHasher, HashToCurve};
use ark_ec::{CurveGroup, Group};
use ark_ff::field_hashers::{DefaultFieldHasher, HashToField};
use ark_ff::{Field, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_secp256k1::{Fr as SchnorrScalar, Projective as SchnorrPoint};

use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::capabilities::{Governance, IdentityRecovery, Receiver, Signer, TransportSignature};
use crate::dkg::{Complaint, MasterPublicKey, PrivateShare};
use crate::identity::NodeId;
use crate::utils::{BTreeMap, Scalar, String, ToOwned, Vec};
use crate::{CipherSuite, DkgResult, Error};

type WBMap = wb::WBMap<<ark_bls12_381::Config as Bls12Config>::G2Config>;

const SIGNATURE_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Zeroize)]
/// An example instance of the DKG and threshold signing protocols over
/// BLS12-381 with SHA-256 as underlying hasher.
pub struct Bls12381Sha256;

impl CipherSuite for Bls12381Sha256 {
    type Engine = Bls12_381;

    type InnerHasher = Sha256;

    fn context_string() -> String {
        "DKG-TSIG_BLS12381G2_SHA256".to_owned()
    }

    fn hash_to_signature_group(message: &[u8]) -> DkgResult<G2Projective> {
        let hasher =
            MapToCurveBasedHasher::<G2Projective, DefaultFieldHasher<Sha256>, WBMap>::new(
                SIGNATURE_DST,
            )
            .map_err(|_| Error::HashToCurveError)?;

        let point = hasher.hash(message).map_err(|_| Error::HashToCurveError)?;

        Ok(point.into())
    }
}

/// A Schnorr signature over secp256k1, carrying the signer's public key so
/// that its identity can be recovered.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
struct SchnorrSignature {
    public_key: SchnorrPoint,
    r: SchnorrPoint,
    s: SchnorrScalar,
}

fn schnorr_hash(context: &[u8], message: &[u8]) -> SchnorrScalar {
    let hasher = <DefaultFieldHasher<Sha256> as HashToField<SchnorrScalar>>::new(context);
    hasher.hash_to_field(message, 1)[0]
}

fn schnorr_challenge(
    public_key: &SchnorrPoint,
    r: &SchnorrPoint,
    digest: &[u8; 32],
) -> DkgResult<SchnorrScalar> {
    let mut message = Vec::new();
    public_key
        .serialize_compressed(&mut message)
        .map_err(|_| Error::CompressionError)?;
    r.serialize_compressed(&mut message)
        .map_err(|_| Error::CompressionError)?;
    message.extend_from_slice(digest);

    Ok(schnorr_hash(b"DKG-TSIG_SCHNORR_CHALLENGE", &message))
}

fn node_id_of(public_key: &SchnorrPoint) -> DkgResult<NodeId> {
    let mut bytes = Vec::new();
    public_key
        .into_affine()
        .serialize_compressed(&mut bytes)
        .map_err(|_| Error::CompressionError)?;

    Ok(NodeId::from_public_key(&bytes))
}

/// A validator transport key, producing Schnorr signatures over secp256k1.
#[derive(Clone)]
pub struct SchnorrSigner {
    secret_key: SchnorrScalar,
    public_key: SchnorrPoint,
    node_id: NodeId,
}

impl SchnorrSigner {
    /// Generate a fresh transport key.
    pub fn new(mut rng: impl RngCore + CryptoRng) -> Self {
        let secret_key = SchnorrScalar::rand(&mut rng);
        let public_key = SchnorrPoint::generator() * secret_key;
        // Compressing a freshly generated point does not fail.
        let node_id = node_id_of(&public_key).unwrap_or_default();

        Self {
            secret_key,
            public_key,
            node_id,
        }
    }
}

impl fmt::Debug for SchnorrSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchnorrSigner")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

impl Drop for SchnorrSigner {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl Signer for SchnorrSigner {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn sign(&self, digest: &[u8; 32]) -> DkgResult<TransportSignature> {
        let mut seed = Vec::new();
        self.secret_key
            .serialize_compressed(&mut seed)
            .map_err(|_| Error::SerializationError)?;
        seed.extend_from_slice(digest);

        let mut k = schnorr_hash(b"DKG-TSIG_SCHNORR_NONCE", &seed);
        seed.zeroize();

        let r = SchnorrPoint::generator() * k;
        let s = k + self.secret_key * schnorr_challenge(&self.public_key, &r, digest)?;
        k.zeroize();

        let mut bytes = Vec::new();
        SchnorrSignature {
            public_key: self.public_key,
            r,
            s,
        }
        .serialize_compressed(&mut bytes)
        .map_err(|_| Error::SerializationError)?;

        Ok(TransportSignature(bytes))
    }
}

/// Identity recovery for [`SchnorrSigner`] signatures.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchnorrIdentityRecovery;

impl IdentityRecovery for SchnorrIdentityRecovery {
    fn recover_identity(
        &self,
        digest: &[u8; 32],
        signature: &TransportSignature,
    ) -> DkgResult<NodeId> {
        let signature = SchnorrSignature::deserialize_compressed(&signature.0[..])
            .map_err(|_| Error::InvalidTransportSignature)?;

        let challenge = schnorr_challenge(&signature.public_key, &signature.r, digest)?;
        if SchnorrPoint::generator() * signature.s != signature.r + signature.public_key * challenge {
            return Err(Error::InvalidTransportSignature);
        }

        node_id_of(&signature.public_key)
    }
}

/// Return a copy of `share` carrying a wrong evaluation, signed again with
/// the dealer's transport key `signer`, as a faulty dealer would send it.
pub fn corrupt_private_share<C: CipherSuite>(
    share: &PrivateShare<C>,
    signer: &dyn Signer,
) -> DkgResult<PrivateShare<C>> {
    let mut corrupted = share.clone();
    corrupted.share += Scalar::<C>::ONE;
    corrupted.sign(signer)?;

    Ok(corrupted)
}

/// A [`Receiver`] keeping the last proposed messages in memory.
#[derive(Clone, Debug)]
pub struct RecordingReceiver<C: CipherSuite> {
    /// The proposed master public key.
    pub master_public_key: Option<MasterPublicKey<C>>,
    /// The dispatched private shares, by recipient.
    pub shares: BTreeMap<NodeId, PrivateShare<C>>,
    /// The proposed complaints.
    pub complaints: Vec<Complaint<C>>,
}

impl<C: CipherSuite> Default for RecordingReceiver<C> {
    fn default() -> Self {
        Self {
            master_public_key: None,
            shares: BTreeMap::new(),
            complaints: Vec::new(),
        }
    }
}

impl<C: CipherSuite> Receiver<C> for RecordingReceiver<C> {
    fn propose_complaint(&mut self, complaint: Complaint<C>) {
        self.complaints.push(complaint);
    }

    fn propose_master_public_key(&mut self, master_public_key: MasterPublicKey<C>) {
        self.master_public_key = Some(master_public_key);
    }

    fn propose_private_share(&mut self, to: NodeId, share: PrivateShare<C>) {
        self.shares.insert(to, share);
    }
}

/// An in-memory [`Governance`] view, by round.
#[derive(Clone, Debug)]
pub struct MemoryGovernance<C: CipherSuite> {
    master_public_keys: BTreeMap<u64, Vec<MasterPublicKey<C>>>,
    complaints: BTreeMap<u64, Vec<Complaint<C>>>,
}

impl<C: CipherSuite> Default for MemoryGovernance<C> {
    fn default() -> Self {
        Self {
            master_public_keys: BTreeMap::new(),
            complaints: BTreeMap::new(),
        }
    }
}

impl<C: CipherSuite> MemoryGovernance<C> {
    /// Record a master public key under its round.
    pub fn add_master_public_key(&mut self, mpk: MasterPublicKey<C>) {
        self.master_public_keys.entry(mpk.round).or_default().push(mpk);
    }

    /// Record a complaint under its round.
    pub fn add_complaint(&mut self, complaint: Complaint<C>) {
        self.complaints
            .entry(complaint.round)
            .or_default()
            .push(complaint);
    }

    /// Record everything broadcast through `receiver`.
    pub fn publish(&mut self, receiver: &RecordingReceiver<C>) {
        if let Some(mpk) = &receiver.master_public_key {
            self.add_master_public_key(mpk.clone());
        }
        for complaint in receiver.complaints.iter() {
            self.add_complaint(complaint.clone());
        }
    }
}

impl<C: CipherSuite> Governance<C> for MemoryGovernance<C> {
    fn master_public_keys(&self, round: u64) -> Vec<MasterPublicKey<C>> {
        self.master_public_keys
            .get(&round)
            .cloned()
            .unwrap_or_default()
    }

    fn complaints(&self, round: u64) -> Vec<Complaint<C>> {
        self.complaints.get(&round).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn schnorr_signature_recovers_signer() {
        let signer = SchnorrSigner::new(OsRng);
        let digest = [3u8; 32];

        let signature = signer.sign(&digest).unwrap();
        assert_eq!(
            SchnorrIdentityRecovery.recover_identity(&digest, &signature),
            Ok(signer.node_id())
        );
        // Nonces are derived from the key and digest.
        assert_eq!(signature, signer.sign(&digest).unwrap());
    }

    #[test]
    fn schnorr_signature_rejects_other_digests() {
        let signer = SchnorrSigner::new(OsRng);
        let signature = signer.sign(&[3u8; 32]).unwrap();

        assert_eq!(
            SchnorrIdentityRecovery.recover_identity(&[4u8; 32], &signature),
            Err(Error::InvalidTransportSignature)
        );
        assert_eq!(
            SchnorrIdentityRecovery.recover_identity(&[3u8; 32], &TransportSignature::default()),
            Err(Error::InvalidTransportSignature)
        );
    }

    #[test]
    fn corrupted_share_is_signed_by_the_dealer() {
        let dealer = SchnorrSigner::new(OsRng);
        let mut share = PrivateShare::<Bls12381Sha256>::new(
            dealer.node_id(),
            NodeId([1; 32]),
            2,
            Scalar::<Bls12381Sha256>::ONE,
        );
        share.sign(&dealer).unwrap();

        let corrupted = corrupt_private_share(&share, &dealer).unwrap();

        assert_ne!(corrupted.share, share.share);
        assert_eq!(corrupted.proposer_id, share.proposer_id);
        assert_eq!(corrupted.receiver_id, share.receiver_id);
        assert!(corrupted.verify_signature(&SchnorrIdentityRecovery));
    }

    #[test]
    fn hash_to_signature_group_is_deterministic() {
        let a = Bls12381Sha256::hash_to_signature_group(b"message").unwrap();
        let b = Bls12381Sha256::hash_to_signature_group(b"message").unwrap();
        let c = Bls12381Sha256::hash_to_signature_group(b"other").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
