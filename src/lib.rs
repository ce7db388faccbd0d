//!
// -*- mode: rust; -*-
//
// This file is part of dkg-tsig.
// See LICENSE for licensing information.

//! This library provides a Rust implementation of a (t, n)-threshold
//! **distributed key generation** (DKG) coupled with a **threshold BLS
//! signature** (TSIG) protocol.
//!
//! A set of `n` validators jointly creates a group public key without any of
//! them ever learning the group secret. Each qualified validator ends up
//! holding a share of this secret, and any `t` of them can later produce a
//! single signature verifiable against the group public key.
//!
//! The key generation is a Pedersen-style joint Feldman VSS: every
//! participant deals the evaluations of a random polynomial of degree
//! `t - 1` to all the others, along with a public commitment to its
//! coefficients. Participants dealing invalid shares are accused through
//! publicly verifiable complaints, and excluded from the qualified set.
//!
//! The protocol core does not deal with message transport, validator keys
//! or consensus. These are supplied by the caller through the
//! [`capabilities`] traits.
//!
//! # Usage
//!
//! The cryptographic backend is fixed by a [`CipherSuite`]. The
//! [`testing`] module provides one over BLS12-381, along with in-memory
//! capabilities. Alice, Bob and Carol run a 2-out-of-3 key generation for
//! round 1 as follows.
//!
//! ```rust
//! use dkg_tsig::dkg::{build_group_public_key, DkgProtocol};
//! use dkg_tsig::parameters::ThresholdParameters;
//! use dkg_tsig::testing::{Bls12381Sha256, RecordingReceiver, SchnorrIdentityRecovery, SchnorrSigner};
//! use dkg_tsig::DkgResult;
//!
//! use rand::rngs::OsRng;
//! use std::sync::Arc;
//!
//! # fn do_test() -> DkgResult<()> {
//! let params = ThresholdParameters::new(3, 2)?;
//! let recovery = Arc::new(SchnorrIdentityRecovery);
//! let signers: Vec<SchnorrSigner> = (0..3).map(|_| SchnorrSigner::new(OsRng)).collect();
//!
//! // Each participant publishes the commitment to its secret polynomial.
//! let mut participants = Vec::new();
//! for signer in signers.iter() {
//!     let mut receiver = RecordingReceiver::<Bls12381Sha256>::default();
//!     let protocol = DkgProtocol::<Bls12381Sha256>::new(
//!         params,
//!         1,
//!         Box::new(signer.clone()),
//!         recovery.clone(),
//!         &mut receiver,
//!         OsRng,
//!     )?;
//!     participants.push((protocol, receiver));
//! }
//!
//! // They deal a private share to every participant whose commitment they accepted...
//! let mpks: Vec<_> = participants
//!     .iter()
//!     .filter_map(|(_, receiver)| receiver.master_public_key.clone())
//!     .collect();
//! for (protocol, receiver) in participants.iter_mut() {
//!     protocol.process_master_public_keys(&mpks, receiver)?;
//! }
//!
//! // ... and verify the shares dealt to them.
//! let shares: Vec<_> = participants
//!     .iter()
//!     .flat_map(|(_, receiver)| receiver.shares.values().cloned())
//!     .collect();
//! for (protocol, receiver) in participants.iter_mut() {
//!     let me = protocol.node_id();
//!     for share in shares.iter().filter(|s| s.receiver_id == me) {
//!         protocol.process_private_share(share, receiver)?;
//!     }
//! }
//!
//! // Anyone can derive the group public key from the public messages of the round.
//! let group_key = build_group_public_key(1, &mpks, &[], &params, recovery.as_ref())?;
//! assert_eq!(group_key.qualified_node_ids().len(), 3);
//! # Ok(()) } fn main() { assert!(do_test().is_ok()); }
//! ```
//!
//! Any two of them then recover their share secret, and sign a digest:
//!
//! ```rust
//! # use dkg_tsig::dkg::{build_group_public_key, DkgProtocol};
//! # use dkg_tsig::parameters::ThresholdParameters;
//! # use dkg_tsig::sign::{PartialSignature, TsigProtocol};
//! # use dkg_tsig::testing::{Bls12381Sha256, RecordingReceiver, SchnorrIdentityRecovery, SchnorrSigner};
//! # use dkg_tsig::DkgResult;
//! # use rand::rngs::OsRng;
//! # use sha2::{Digest, Sha256};
//! # use std::sync::Arc;
//! #
//! # fn do_test() -> DkgResult<()> {
//! # let params = ThresholdParameters::new(3, 2)?;
//! # let recovery = Arc::new(SchnorrIdentityRecovery);
//! # let signers: Vec<SchnorrSigner> = (0..3).map(|_| SchnorrSigner::new(OsRng)).collect();
//! # let mut participants = Vec::new();
//! # for signer in signers.iter() {
//! #     let mut receiver = RecordingReceiver::<Bls12381Sha256>::default();
//! #     let protocol = DkgProtocol::<Bls12381Sha256>::new(params, 1, Box::new(signer.clone()), recovery.clone(), &mut receiver, OsRng)?;
//! #     participants.push((protocol, receiver));
//! # }
//! # let mpks: Vec<_> = participants.iter().filter_map(|(_, r)| r.master_public_key.clone()).collect();
//! # for (protocol, receiver) in participants.iter_mut() {
//! #     protocol.process_master_public_keys(&mpks, receiver)?;
//! # }
//! # let shares: Vec<_> = participants.iter().flat_map(|(_, r)| r.shares.values().cloned()).collect();
//! # for (protocol, receiver) in participants.iter_mut() {
//! #     let me = protocol.node_id();
//! #     for share in shares.iter().filter(|s| s.receiver_id == me) {
//! #         protocol.process_private_share(share, receiver)?;
//! #     }
//! # }
//! # let group_key = build_group_public_key(1, &mpks, &[], &params, recovery.as_ref())?;
//! let digest: [u8; 32] = Sha256::digest(b"message to sign").into();
//! let mut aggregator = TsigProtocol::new(group_key.clone(), digest, recovery.clone());
//!
//! for ((protocol, _), signer) in participants.iter_mut().zip(signers.iter()).take(2) {
//!     let share_secret = protocol.recover_share_secret(&group_key.qualified_ids())?;
//!     let partial = PartialSignature::new(&share_secret, 1, &digest, signer)?;
//!     aggregator.process_partial_signature(&digest, &partial)?;
//! }
//!
//! let signature = aggregator.signature()?;
//! assert!(signature.verify(&group_key, &digest));
//! # Ok(()) } fn main() { assert!(do_test().is_ok()); }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(future_incompatible)]
#![allow(clippy::type_complexity)]

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

mod error;
pub use error::{DkgResult, Error};

mod ciphersuite;
pub use ciphersuite::CipherSuite;

mod serialization;
pub use serialization::{FromBytes, ToBytes};

pub(crate) mod utils;

/// A module defining validator identities and their evaluation points.
pub mod identity;
/// A module defining the [`ThresholdParameters`](crate::parameters::ThresholdParameters) of a DKG round.
pub mod parameters;
/// A module defining the capabilities an embedding node provides to the protocols.
pub mod capabilities;
/// A module defining the key types produced by a DKG round.
pub mod keys;

/// A module defining the logic of a participant of a distributed key generation round,
/// and the derivation of the group public key.
pub mod dkg;
/// A module defining the logic of a threshold signing session.
pub mod sign;

/// This module provides a concrete implementation of a CipherSuite over BLS12-381,
/// with SHA-256 as underlying base hash function, along with in-memory capabilities.
/// It is made available for testing and benchmarking purposes.
pub mod testing;
