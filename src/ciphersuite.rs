use core::fmt::Debug;
use core::marker::{Send, Sync};

use zeroize::Zeroize;

use ark_ec::pairing::Pairing;
use digest::{Digest, FixedOutputReset};

use crate::error::DkgResult;
use crate::utils::{Scalar, SignaturePoint, String};

/// A trait defining the pairing-friendly curve and hash function details
/// of a DKG / threshold signing instantiation.
///
/// Commitments and public keys live in `G1`, partial and final signatures
/// live in `G2`. Partial signatures are BLS signatures, which are linear in
/// the signing share, so that a Lagrange interpolation of `t` of them yields
/// a signature under the group key.
pub trait CipherSuite: Copy + Clone + PartialEq + Eq + Debug + Send + Sync + Zeroize {
    /// The pairing engine on which this [`CipherSuite`] operates.
    type Engine: Pairing;

    /// The underlying hasher used to construct all random oracles of this [`CipherSuite`].
    type InnerHasher: Default + Clone + Digest + FixedOutputReset + 'static;

    //////////////////////////////////////////////////////////////////////////////////////////////

    // Required methods

    /// A method returning this [`CipherSuite`]'s custom context string, to be used in the different
    /// random oracles of the protocol.
    fn context_string() -> String;

    /// Hash a message digest onto the signature group.
    ///
    /// Implementations must use a hash-to-curve construction for which no
    /// discrete logarithm relation with the generator is known.
    fn hash_to_signature_group(message: &[u8]) -> DkgResult<SignaturePoint<Self>>;

    ///////////////////////////////////////////////////////////////////////////////////////////////

    // Provided methods

    /// `h0` hash for this [`CipherSuite`].
    ///
    /// The context string for `h0` is this [`CipherSuite`]'s context string,
    /// concatenated with "identifier".
    ///
    /// It maps a validator identity onto its evaluation point.
    fn h0(m: &[u8]) -> Scalar<Self> {
        crate::utils::hash_to_field::<Self>((Self::context_string() + "identifier").as_bytes(), m)
    }
}
