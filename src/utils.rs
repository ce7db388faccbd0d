use ark_ec::pairing::Pairing;
use ark_ff::field_hashers::{DefaultFieldHasher, HashToField};
use ark_ff::Field;

#[cfg(not(feature = "std"))]
pub use alloc::{
    borrow::ToOwned,
    boxed::Box,
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::String,
    sync::Arc,
    vec::Vec,
};

#[cfg(feature = "std")]
pub use std::{
    borrow::ToOwned,
    boxed::Box,
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::String,
    sync::Arc,
    vec::Vec,
};

use sha2::{Digest, Sha256};

use crate::ciphersuite::CipherSuite;
use crate::error::{DkgResult, Error};
use crate::identity::Identifier;

/// The scalar field shared by secret polynomials, shares and identifiers.
pub type Scalar<C> = <<C as CipherSuite>::Engine as Pairing>::ScalarField;

/// The group holding polynomial commitments and public keys.
pub type PublicPoint<C> = <<C as CipherSuite>::Engine as Pairing>::G1;

/// The group holding partial and final signatures.
pub type SignaturePoint<C> = <<C as CipherSuite>::Engine as Pairing>::G2;

/// Fails if any identifier appears more than once in `identifiers`.
pub(crate) fn ensure_distinct<C: CipherSuite>(identifiers: &[Identifier<C>]) -> DkgResult<()> {
    for (i, a) in identifiers.iter().enumerate() {
        if identifiers[i + 1..].iter().any(|b| a == b) {
            return Err(Error::DuplicateIdentifier);
        }
    }

    Ok(())
}

/// Compute the Lagrange coefficient of `my_id` for an interpolation at zero
/// over the points `all_ids`.
pub(crate) fn calculate_lagrange_coefficient<C: CipherSuite>(
    my_id: &Identifier<C>,
    all_ids: &[Identifier<C>],
) -> DkgResult<Scalar<C>> {
    let mut numerator = Scalar::<C>::ONE;
    let mut denominator = Scalar::<C>::ONE;

    let x_i = my_id.to_scalar();

    for id in all_ids.iter() {
        if id == my_id {
            continue;
        }
        let x_j = id.to_scalar();

        numerator *= x_j;
        denominator *= x_j - x_i;
    }

    let inverse = denominator.inverse().ok_or(Error::DuplicateIdentifier)?;

    Ok(numerator * inverse)
}

/// Hash `message_to_hash` into the scalar field, under `context_string`.
pub(crate) fn hash_to_field<C: CipherSuite>(
    context_string: &[u8],
    message_to_hash: &[u8],
) -> Scalar<C> {
    let h = <DefaultFieldHasher<C::InnerHasher, 128> as HashToField<Scalar<C>>>::new(
        context_string,
    );

    h.hash_to_field(message_to_hash, 1)[0]
}

/// Domain separated SHA-256 of a canonical encoding.
pub(crate) fn hash_message(domain: &[u8], payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain);
    hasher.update(payload);

    hasher.finalize().into()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::NodeId;
    use crate::testing::Bls12381Sha256;

    use ark_bls12_381::Fr;
    use ark_ff::Zero;

    fn identifiers(count: u8) -> Vec<Identifier<Bls12381Sha256>> {
        (1..=count)
            .map(|i| Identifier::derive(&NodeId::from_public_key(&[i])).unwrap())
            .collect()
    }

    #[test]
    fn lagrange_coefficients_sum_to_one() {
        let ids = identifiers(5);

        let mut sum = Fr::zero();
        for id in ids.iter() {
            sum += calculate_lagrange_coefficient(id, &ids).unwrap();
        }

        assert_eq!(sum, Fr::ONE);
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let mut ids = identifiers(3);
        ids.push(ids[1]);

        assert_eq!(ensure_distinct(&ids), Err(Error::DuplicateIdentifier));
        assert!(ensure_distinct(&ids[..3]).is_ok());
    }

    #[test]
    fn message_hash_is_domain_separated() {
        assert_ne!(hash_message(b"a", b"bc"), hash_message(b"ab", b"c"));
        assert_eq!(hash_message(b"a", b"bc"), hash_message(b"a", b"bc"));
    }
}
