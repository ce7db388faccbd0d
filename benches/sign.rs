//! Benchmarks for threshold signing sessions.

#[macro_use]
extern crate criterion;

use std::sync::Arc;

use criterion::{BatchSize, Criterion};

use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use dkg_tsig::dkg::{build_group_public_key, DkgProtocol};
use dkg_tsig::keys::{GroupPublicKey, ShareSecret};
use dkg_tsig::parameters::ThresholdParameters;
use dkg_tsig::sign::{PartialSignature, TsigProtocol};
use dkg_tsig::testing::{Bls12381Sha256, RecordingReceiver, SchnorrIdentityRecovery, SchnorrSigner};

type Suite = Bls12381Sha256;

const NUMBER_OF_PARTICIPANTS: u32 = 10;
const THRESHOLD_OF_PARTICIPANTS: u32 = 7;
const ROUND: u64 = 1;

/// Run an honest key generation, returning the group public key and the
/// share secret of every participant.
fn run_dkg(
    params: ThresholdParameters,
    signers: &[SchnorrSigner],
) -> (GroupPublicKey<Suite>, Vec<ShareSecret<Suite>>) {
    let mut participants = Vec::new();
    for signer in signers.iter() {
        let mut receiver = RecordingReceiver::<Suite>::default();
        let protocol = DkgProtocol::<Suite>::new(
            params,
            ROUND,
            Box::new(signer.clone()),
            Arc::new(SchnorrIdentityRecovery),
            &mut receiver,
            OsRng,
        )
        .unwrap();
        participants.push((protocol, receiver));
    }

    let mpks: Vec<_> = participants
        .iter()
        .map(|(_, receiver)| receiver.master_public_key.clone().unwrap())
        .collect();
    for (protocol, receiver) in participants.iter_mut() {
        protocol.process_master_public_keys(&mpks, receiver).unwrap();
    }

    let shares: Vec<_> = participants
        .iter()
        .flat_map(|(_, receiver)| receiver.shares.values().cloned())
        .collect();
    for (protocol, receiver) in participants.iter_mut() {
        let me = protocol.node_id();
        for share in shares.iter().filter(|s| s.receiver_id == me) {
            protocol.process_private_share(share, receiver).unwrap();
        }
    }

    let group_key =
        build_group_public_key(ROUND, &mpks, &[], &params, &SchnorrIdentityRecovery).unwrap();
    let qualified_ids = group_key.qualified_ids();
    let share_secrets = participants
        .iter_mut()
        .map(|(protocol, _)| protocol.recover_share_secret(&qualified_ids).unwrap())
        .collect();

    (group_key, share_secrets)
}

fn criterion_benchmark(c: &mut Criterion) {
    let params =
        ThresholdParameters::new(NUMBER_OF_PARTICIPANTS, THRESHOLD_OF_PARTICIPANTS).unwrap();

    let signers: Vec<SchnorrSigner> = (0..NUMBER_OF_PARTICIPANTS)
        .map(|_| SchnorrSigner::new(OsRng))
        .collect();

    let (group_key, share_secrets) = run_dkg(params, &signers);

    let digest: [u8; 32] =
        Sha256::digest(b"This is a test of the tsunami alert system. This is only a test.").into();

    let p1_share_secret = share_secrets[0].clone();
    let p1_signer = signers[0].clone();
    c.bench_function("Partial signature creation", move |b| {
        b.iter(|| PartialSignature::new(&p1_share_secret, ROUND, &digest, &p1_signer))
    });

    let partial_signatures: Vec<PartialSignature<Suite>> = share_secrets
        .iter()
        .zip(signers.iter())
        .take(THRESHOLD_OF_PARTICIPANTS as usize)
        .map(|(share_secret, signer)| {
            PartialSignature::new(share_secret, ROUND, &digest, signer).unwrap()
        })
        .collect();

    let group_key_copy = group_key.clone();
    let p1_partial = partial_signatures[0].clone();
    c.bench_function("Partial signature processing", move |b| {
        b.iter_batched(
            || TsigProtocol::new(group_key_copy.clone(), digest, Arc::new(SchnorrIdentityRecovery)),
            |mut aggregator| aggregator.process_partial_signature(&digest, &p1_partial),
            BatchSize::SmallInput,
        )
    });

    let mut aggregator =
        TsigProtocol::new(group_key.clone(), digest, Arc::new(SchnorrIdentityRecovery));
    for partial in partial_signatures.iter() {
        aggregator.process_partial_signature(&digest, partial).unwrap();
    }
    assert_eq!(aggregator.signers().len(), THRESHOLD_OF_PARTICIPANTS as usize);

    c.bench_function("Signature aggregation", |b| b.iter(|| aggregator.signature()));

    let signature = aggregator.signature().unwrap();
    c.bench_function("Signature verification", move |b| {
        b.iter(|| signature.verify(&group_key, &digest))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = criterion_benchmark);
criterion_main!(benches);
