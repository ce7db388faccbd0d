//! Threshold signing with the share secrets of a DKG round.

pub(crate) mod partial;
pub(crate) mod signature;

pub use partial::PartialSignature;
pub use signature::{ThresholdSignature, TsigProtocol};
