//! Configurable parameters for an instance of a DKG and threshold signing protocol.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::error::{DkgResult, Error};
use crate::serialization::impl_serialization_traits;

/// The configuration parameters for conducting the process of creating a
/// threshold signature.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ThresholdParameters {
    /// The number of participants in the scheme.
    pub n: u32,
    /// The threshold required for a successful signature. Secret
    /// polynomials have degree `t - 1`.
    pub t: u32,
}

impl_serialization_traits!(ThresholdParameters);

impl ThresholdParameters {
    /// Initialize a new set of threshold parameters.
    ///
    /// Fails if one of the following condition is met:
    ///  - n equals 0
    ///  - t equals 0
    ///  - n < t
    pub fn new(n: u32, t: u32) -> DkgResult<Self> {
        if n == 0 || t == 0 || n < t {
            return Err(Error::InvalidParameters(n, t));
        }

        Ok(Self { n, t })
    }

    /// The threshold as a collection size.
    pub fn threshold(&self) -> usize {
        self.t as usize
    }
}
