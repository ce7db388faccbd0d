//! Threshold signatures and their aggregation.

use core::fmt;

use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use tracing::{debug, warn};

use crate::capabilities::IdentityRecovery;
use crate::ciphersuite::CipherSuite;
use crate::error::{DkgResult, Error};
use crate::identity::{Identifier, NodeId};
use crate::keys::{verify_with_key, GroupPublicKey};
use crate::serialization::impl_serialization_traits;
use crate::sign::partial::PartialSignature;
use crate::utils::{
    calculate_lagrange_coefficient, Arc, BTreeMap, PublicPoint, SignaturePoint, Vec,
};

/// A complete, aggregated threshold signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ThresholdSignature<C: CipherSuite>(pub SignaturePoint<C>);

impl_serialization_traits!(ThresholdSignature<CipherSuite>);

impl<C: CipherSuite> ThresholdSignature<C> {
    /// Verify this [`ThresholdSignature`] over `digest` against `group_key`.
    pub fn verify(&self, group_key: &GroupPublicKey<C>, digest: &[u8; 32]) -> bool {
        group_key.verify_signature(digest, &self.0)
    }
}

/// The aggregator of a single signing event, bound to a group public key
/// and a digest.
///
/// Partial signatures are only authenticated on receipt. Their correctness
/// is checked once, on the interpolated signature, and each of them is only
/// verified individually if the latter is invalid.
pub struct TsigProtocol<C: CipherSuite> {
    group_key: GroupPublicKey<C>,
    digest: [u8; 32],
    recovery: Arc<dyn IdentityRecovery>,
    partial_signatures: BTreeMap<NodeId, SignaturePoint<C>>,
}

impl<C: CipherSuite> fmt::Debug for TsigProtocol<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigProtocol")
            .field("round", &self.group_key.round)
            .field("digest", &self.digest)
            .field("signers", &self.partial_signatures.keys())
            .finish_non_exhaustive()
    }
}

impl<C: CipherSuite> TsigProtocol<C> {
    /// Start aggregating signatures over `digest` under `group_key`.
    pub fn new(
        group_key: GroupPublicKey<C>,
        digest: [u8; 32],
        recovery: Arc<dyn IdentityRecovery>,
    ) -> Self {
        Self {
            group_key,
            digest,
            recovery,
            partial_signatures: BTreeMap::new(),
        }
    }

    /// The group public key signatures are aggregated under.
    pub fn group_key(&self) -> &GroupPublicKey<C> {
        &self.group_key
    }

    /// The signers whose partial signature was recorded.
    pub fn signers(&self) -> Vec<NodeId> {
        self.partial_signatures.keys().copied().collect()
    }

    /// Record a partial signature over `digest`.
    pub fn process_partial_signature(
        &mut self,
        digest: &[u8; 32],
        partial: &PartialSignature<C>,
    ) -> DkgResult<()> {
        if *digest != self.digest || partial.digest != self.digest {
            return Err(Error::DigestMismatch);
        }
        if partial.round != self.group_key.round {
            return Err(Error::RoundMismatch(self.group_key.round, partial.round));
        }
        if self.group_key.participant(&partial.proposer_id).is_none() {
            return Err(Error::UnknownProposer(partial.proposer_id));
        }
        if self.partial_signatures.contains_key(&partial.proposer_id) {
            return Err(Error::DuplicateSignature(partial.proposer_id));
        }
        if !partial.verify_signature(self.recovery.as_ref()) {
            return Err(Error::InvalidPartialSignatureSignature(partial.proposer_id));
        }

        self.partial_signatures
            .insert(partial.proposer_id, partial.partial_signature);

        Ok(())
    }

    /// Interpolate the recorded partial signatures at zero into a signature
    /// under the group public key.
    ///
    /// If the result does not verify, every recorded partial signature is
    /// checked against its signer's public key. The faulty ones are left out
    /// and the remaining ones interpolated again, provided at least `t` of
    /// them are left. Otherwise the faulty signers are reported.
    pub fn signature(&self) -> DkgResult<ThresholdSignature<C>> {
        if self.partial_signatures.len() < self.group_key.threshold() {
            return Err(Error::ThresholdNotReached(
                self.partial_signatures.len(),
                self.group_key.parameters.t,
            ));
        }

        let mut signers = Vec::with_capacity(self.partial_signatures.len());
        for (node_id, partial) in self.partial_signatures.iter() {
            let participant = self
                .group_key
                .participant(node_id)
                .ok_or(Error::UnknownProposer(*node_id))?;
            signers.push((*node_id, participant.identifier, participant.public_key, *partial));
        }

        let signature = self.interpolate(&signers)?;
        if signature.verify(&self.group_key, &self.digest) {
            debug!(
                round = self.group_key.round,
                signers = signers.len(),
                "aggregated threshold signature"
            );
            return Ok(signature);
        }

        let (valid, invalid): (Vec<_>, Vec<_>) =
            signers.into_iter().partition(|(_, _, public_key, partial)| {
                verify_with_key::<C>(public_key, &self.digest, partial)
            });
        let misbehaving: Vec<NodeId> = invalid.iter().map(|(node_id, _, _, _)| *node_id).collect();

        warn!(
            round = self.group_key.round,
            ?misbehaving,
            valid = valid.len(),
            "discarding invalid partial signatures"
        );

        if valid.len() < self.group_key.threshold() || misbehaving.is_empty() {
            return Err(Error::MisbehavingParticipants(misbehaving));
        }

        let signature = self.interpolate(&valid)?;
        if !signature.verify(&self.group_key, &self.digest) {
            return Err(Error::MisbehavingParticipants(misbehaving));
        }

        Ok(signature)
    }

    fn interpolate(
        &self,
        signers: &[(NodeId, Identifier<C>, PublicPoint<C>, SignaturePoint<C>)],
    ) -> DkgResult<ThresholdSignature<C>> {
        let identifiers: Vec<Identifier<C>> = signers.iter().map(|s| s.1).collect();

        let mut aggregate = SignaturePoint::<C>::zero();
        for (_, identifier, _, partial) in signers.iter() {
            aggregate += *partial * calculate_lagrange_coefficient(identifier, &identifiers)?;
        }

        Ok(ThresholdSignature(aggregate))
    }
}
