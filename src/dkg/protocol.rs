//! The per-participant state machine of a DKG round.

use core::fmt;

use ark_ff::Zero;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::capabilities::{IdentityRecovery, Receiver, Signer, TransportSignature};
use crate::ciphersuite::CipherSuite;
use crate::dkg::messages::{Complaint, MasterPublicKey, PrivateShare};
use crate::dkg::secret_share::SecretPolynomial;
use crate::error::{DkgResult, Error};
use crate::identity::{Identifier, NodeId};
use crate::keys::ShareSecret;
use crate::parameters::ThresholdParameters;
use crate::utils::{
    calculate_lagrange_coefficient, ensure_distinct, Arc, BTreeMap, BTreeSet, Box, Scalar, Vec,
};

/// The progress of a [`DkgProtocol`] instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DkgPhase {
    /// The own master public key was proposed, waiting for the others.
    CollectingCommitments,
    /// Private shares were dispatched, waiting for the others' shares.
    CollectingShares,
    /// The share secret was recovered.
    Finalized,
}

/// One participant's view of a DKG round.
///
/// The instance publishes its master public key on construction, deals a
/// private share to every accepted proposer, verifies the shares it
/// receives and complains about the invalid ones. Once the qualified set is
/// known, it recovers its share secret of the group key.
pub struct DkgProtocol<C: CipherSuite> {
    node_id: NodeId,
    identifier: Identifier<C>,
    round: u64,
    parameters: ThresholdParameters,
    polynomial: SecretPolynomial<C>,
    signer: Box<dyn Signer>,
    recovery: Arc<dyn IdentityRecovery>,
    commitments: BTreeMap<NodeId, MasterPublicKey<C>>,
    shares: BTreeMap<NodeId, Scalar<C>>,
    complained: BTreeSet<NodeId>,
    phase: DkgPhase,
}

impl<C: CipherSuite> fmt::Debug for DkgProtocol<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DkgProtocol")
            .field("node_id", &self.node_id)
            .field("round", &self.round)
            .field("parameters", &self.parameters)
            .field("commitments", &self.commitments.len())
            .field("shares", &self.shares.len())
            .field("complained", &self.complained)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<C: CipherSuite> Drop for DkgProtocol<C> {
    fn drop(&mut self) {
        self.shares.values_mut().for_each(|share| share.zeroize());
    }
}

impl<C: CipherSuite> DkgProtocol<C> {
    /// Start a DKG round: sample a secret polynomial of degree `t - 1`,
    /// then sign and propose the corresponding master public key.
    pub fn new(
        parameters: ThresholdParameters,
        round: u64,
        signer: Box<dyn Signer>,
        recovery: Arc<dyn IdentityRecovery>,
        receiver: &mut dyn Receiver<C>,
        rng: impl RngCore + CryptoRng,
    ) -> DkgResult<Self> {
        let node_id = signer.node_id();
        let identifier = Identifier::derive(&node_id)?;

        let protocol = Self {
            node_id,
            identifier,
            round,
            parameters,
            polynomial: SecretPolynomial::random(&parameters, rng),
            signer,
            recovery,
            commitments: BTreeMap::new(),
            shares: BTreeMap::new(),
            complained: BTreeSet::new(),
            phase: DkgPhase::CollectingCommitments,
        };

        let mut mpk = MasterPublicKey {
            proposer_id: node_id,
            round,
            identifier,
            commitment: protocol.polynomial.commit(),
            signature: TransportSignature::default(),
        };
        mpk.sign(protocol.signer.as_ref())?;

        debug!(round, node = ?node_id, "proposing master public key");
        receiver.propose_master_public_key(mpk);

        Ok(protocol)
    }

    /// This participant's identity.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// This participant's evaluation point.
    pub fn identifier(&self) -> Identifier<C> {
        self.identifier
    }

    /// The round this instance runs.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// The current phase.
    pub fn phase(&self) -> DkgPhase {
        self.phase
    }

    /// The proposers whose master public key was accepted.
    pub fn proposers(&self) -> Vec<NodeId> {
        self.commitments.keys().copied().collect()
    }

    /// The proposers this instance complained about.
    pub fn complaints(&self) -> Vec<NodeId> {
        self.complained.iter().copied().collect()
    }

    /// Accept master public keys and deal a signed private share to each
    /// of their proposers, this participant included.
    ///
    /// Processing stops at the first invalid commitment. The commitments
    /// accepted before it stay stored and their shares dispatched.
    pub fn process_master_public_keys(
        &mut self,
        mpks: &[MasterPublicKey<C>],
        receiver: &mut dyn Receiver<C>,
    ) -> DkgResult<()> {
        for mpk in mpks.iter() {
            if mpk.round != self.round {
                return Err(Error::RoundMismatch(self.round, mpk.round));
            }
            if !mpk.is_well_formed(&self.parameters, self.recovery.as_ref()) {
                return Err(Error::InvalidCommitment(mpk.proposer_id));
            }
            if self.commitments.contains_key(&mpk.proposer_id) {
                return Err(Error::DuplicateCommitment(mpk.proposer_id));
            }

            let mut share = PrivateShare::new(
                self.node_id,
                mpk.proposer_id,
                self.round,
                self.polynomial.evaluate(&mpk.identifier),
            );
            share.sign(self.signer.as_ref())?;

            if mpk.proposer_id == self.node_id {
                self.shares.insert(self.node_id, share.share);
            }
            self.commitments.insert(mpk.proposer_id, mpk.clone());

            debug!(round = self.round, to = ?mpk.proposer_id, "dispatching private share");
            receiver.propose_private_share(mpk.proposer_id, share);
        }

        self.phase = DkgPhase::CollectingShares;

        Ok(())
    }

    /// Verify a private share against its proposer's commitment.
    ///
    /// A share which does not match the commitment is not an error: it is
    /// dropped and a complaint carrying it is proposed instead, at most once
    /// per proposer.
    pub fn process_private_share(
        &mut self,
        share: &PrivateShare<C>,
        receiver: &mut dyn Receiver<C>,
    ) -> DkgResult<()> {
        if share.round != self.round {
            return Err(Error::RoundMismatch(self.round, share.round));
        }
        if share.receiver_id != self.node_id {
            return Err(Error::WrongRecipient(share.receiver_id));
        }

        let commitment = match self.commitments.get(&share.proposer_id) {
            Some(mpk) => &mpk.commitment,
            None => return Err(Error::UnknownProposer(share.proposer_id)),
        };

        if !share.verify_signature(self.recovery.as_ref()) {
            return Err(Error::InvalidShareSignature(share.proposer_id));
        }

        if let Some(accepted) = self.shares.get(&share.proposer_id) {
            if *accepted == share.share {
                return Ok(());
            }
            return Err(Error::DuplicatePrivateShare(share.proposer_id));
        }

        if commitment.is_valid_share(&self.identifier, &share.share) {
            self.shares.insert(share.proposer_id, share.share);
            return Ok(());
        }

        if !self.complained.insert(share.proposer_id) {
            return Ok(());
        }

        warn!(
            round = self.round,
            accused = ?share.proposer_id,
            "private share does not match its commitment"
        );

        let mut complaint = Complaint::new(
            self.node_id,
            self.round,
            share.proposer_id,
            Some(share.clone()),
        );
        complaint.sign(self.signer.as_ref())?;
        receiver.propose_complaint(complaint);

        Ok(())
    }

    /// Propose a nack complaint against every accepted proposer whose
    /// private share never arrived, and return the accused proposers.
    pub fn propose_nack_complaints(
        &mut self,
        receiver: &mut dyn Receiver<C>,
    ) -> DkgResult<Vec<NodeId>> {
        let missing: Vec<NodeId> = self
            .commitments
            .keys()
            .filter(|id| !self.shares.contains_key(id) && !self.complained.contains(id))
            .copied()
            .collect();

        for accused in missing.iter() {
            let mut complaint = Complaint::new(self.node_id, self.round, *accused, None);
            complaint.sign(self.signer.as_ref())?;

            debug!(round = self.round, ?accused, "no private share received");
            self.complained.insert(*accused);
            receiver.propose_complaint(complaint);
        }

        Ok(missing)
    }

    /// Recover this participant's share secret of the group key.
    ///
    /// For the qualified identifiers \\( x_j \\), with Lagrange coefficients
    /// at zero \\( \lambda_j \\), the share secret is
    /// \\( s = \sum_j \lambda_j f_j(x_{self}) \\), the evaluation at this
    /// participant's identifier of the group polynomial whose constant term
    /// is the group secret.
    pub fn recover_share_secret(
        &mut self,
        qualified_ids: &[Identifier<C>],
    ) -> DkgResult<ShareSecret<C>> {
        ensure_distinct(qualified_ids)?;

        let mut evaluations = Vec::with_capacity(qualified_ids.len());
        let mut missing = 0;
        for id in qualified_ids.iter() {
            let share = self
                .commitments
                .iter()
                .find(|(_, mpk)| mpk.identifier == *id)
                .and_then(|(node_id, _)| self.shares.get(node_id));

            match share {
                Some(share) => evaluations.push((*id, *share)),
                None => missing += 1,
            }
        }

        if missing > 0 {
            warn!(round = self.round, missing, "cannot recover share secret");
            return Err(Error::IncompleteShares(missing));
        }

        let mut key = Scalar::<C>::zero();
        for (id, share) in evaluations.iter() {
            key += calculate_lagrange_coefficient(id, qualified_ids)? * share;
        }
        evaluations.iter_mut().for_each(|(_, share)| share.zeroize());

        self.phase = DkgPhase::Finalized;
        debug!(round = self.round, qualified = qualified_ids.len(), "recovered share secret");

        Ok(ShareSecret {
            node_id: self.node_id,
            identifier: self.identifier,
            key,
        })
    }
}
