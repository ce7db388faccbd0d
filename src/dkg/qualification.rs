//! Derivation of the qualified set and group public key of a DKG round.
//!
//! The qualified set only depends on the publicly verifiable master public
//! keys and complaints recorded for the round, so that every honest
//! participant reaching the same governance view computes the same group key.

use tracing::debug;

use crate::capabilities::{Governance, IdentityRecovery};
use crate::ciphersuite::CipherSuite;
use crate::dkg::messages::{Complaint, MasterPublicKey};
use crate::error::{DkgResult, Error};
use crate::identity::NodeId;
use crate::keys::GroupPublicKey;
use crate::parameters::ThresholdParameters;
use crate::utils::{BTreeMap, BTreeSet, Vec};

/// Build the group public key of `round` from the recorded master public
/// keys and complaints.
///
/// Master public keys for another round, malformed or badly signed are
/// ignored, and only the first valid one of each proposer is kept.
///
/// A proposer is then excluded if either:
/// - a single valid complaint proves that it dealt an invalid share;
/// - at least `t` distinct proposers filed a nack against it.
///
/// Complaints only count when signed by a proposer of a valid master
/// public key, for the same round.
pub fn build_group_public_key<C: CipherSuite>(
    round: u64,
    mpks: &[MasterPublicKey<C>],
    complaints: &[Complaint<C>],
    parameters: &ThresholdParameters,
    recovery: &dyn IdentityRecovery,
) -> DkgResult<GroupPublicKey<C>> {
    let mut valid: BTreeMap<NodeId, &MasterPublicKey<C>> = BTreeMap::new();
    for mpk in mpks.iter() {
        if mpk.round != round || valid.contains_key(&mpk.proposer_id) {
            continue;
        }
        if !mpk.is_well_formed(parameters, recovery) {
            debug!(round, proposer = ?mpk.proposer_id, "ignoring invalid master public key");
            continue;
        }
        valid.insert(mpk.proposer_id, mpk);
    }

    let mut excluded: BTreeSet<NodeId> = BTreeSet::new();
    let mut nacks: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();

    for complaint in complaints.iter() {
        if complaint.round != round || complaint.proposer_id == complaint.accused_id {
            continue;
        }
        let (complainer, accused) = match (
            valid.get(&complaint.proposer_id),
            valid.get(&complaint.accused_id),
        ) {
            (Some(complainer), Some(accused)) => (complainer, accused),
            _ => continue,
        };
        if !complaint.verify_signature(recovery) {
            continue;
        }

        if complaint.is_nack() {
            nacks
                .entry(complaint.accused_id)
                .or_default()
                .insert(complaint.proposer_id);
        } else if complaint.proves_fault(accused, &complainer.identifier, recovery) {
            debug!(
                round,
                accused = ?complaint.accused_id,
                complainer = ?complaint.proposer_id,
                "excluding proposer on verified complaint"
            );
            excluded.insert(complaint.accused_id);
        }
    }

    for (accused, complainers) in nacks.iter() {
        if complainers.len() >= parameters.threshold() && excluded.insert(*accused) {
            debug!(round, ?accused, nacks = complainers.len(), "excluding unresponsive proposer");
        }
    }

    let qualified: Vec<_> = valid
        .iter()
        .filter(|(node_id, _)| !excluded.contains(node_id))
        .map(|(node_id, mpk)| (*node_id, mpk.identifier, &mpk.commitment))
        .collect();

    if qualified.len() < parameters.threshold() {
        return Err(Error::InsufficientQualifiedParticipants(
            qualified.len(),
            parameters.t,
        ));
    }

    GroupPublicKey::from_commitments(round, *parameters, &qualified)
}

/// Build the group public key of `round` from the governance view.
pub fn build_group_public_key_from_governance<C: CipherSuite>(
    governance: &dyn Governance<C>,
    round: u64,
    parameters: &ThresholdParameters,
    recovery: &dyn IdentityRecovery,
) -> DkgResult<GroupPublicKey<C>> {
    build_group_public_key(
        round,
        &governance.master_public_keys(round),
        &governance.complaints(round),
        parameters,
        recovery,
    )
}
