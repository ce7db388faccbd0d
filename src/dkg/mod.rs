//! The distributed key generation of a threshold group key.

pub(crate) mod messages;
pub(crate) mod protocol;
pub(crate) mod qualification;
pub(crate) mod secret_share;

pub use messages::{Complaint, MasterPublicKey, PrivateShare};
pub use protocol::{DkgPhase, DkgProtocol};
pub use qualification::{build_group_public_key, build_group_public_key_from_governance};
pub use secret_share::{PolynomialCommitment, SecretPolynomial};
