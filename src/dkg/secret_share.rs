//! The secret sharing module, defining a participant's secret polynomial
//! and its public Feldman commitment.

use ark_ec::{CurveGroup, Group};
use ark_ff::{Field, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use rand::{CryptoRng, RngCore};

use zeroize::Zeroize;

use crate::ciphersuite::CipherSuite;
use crate::error::{DkgResult, Error};
use crate::identity::Identifier;
use crate::parameters::ThresholdParameters;
use crate::serialization::impl_serialization_traits;
use crate::utils::{PublicPoint, Scalar, Vec};

/// The secret coefficients \\( (a_0, \dots, a_{t-1}) \\) of a participant's
/// polynomial \\( f(x) = \sum_j a_j x^j \\), overwritten with zeroes when
/// they fall out of scope.
///
/// There is intentionally no serialization for this type: it never leaves
/// its owner.
#[derive(Clone, Zeroize)]
pub struct SecretPolynomial<C: CipherSuite>(pub(crate) Vec<Scalar<C>>);

impl<C: CipherSuite> Drop for SecretPolynomial<C> {
    fn drop(&mut self) {
        self.0.iter_mut().zeroize();
    }
}

impl<C: CipherSuite> core::fmt::Debug for SecretPolynomial<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretPolynomial {{ degree: {} }}", self.degree())
    }
}

impl<C: CipherSuite> SecretPolynomial<C> {
    /// Sample `t` random coefficients, defining a polynomial of degree `t - 1`.
    pub fn random(parameters: &ThresholdParameters, mut rng: impl RngCore + CryptoRng) -> Self {
        let coefficients = (0..parameters.t)
            .map(|_| Scalar::<C>::rand(&mut rng))
            .collect();

        Self(coefficients)
    }

    /// The degree of this polynomial.
    pub fn degree(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Evaluate the polynomial at `identifier`.
    pub(crate) fn evaluate(&self, identifier: &Identifier<C>) -> Scalar<C> {
        let term = identifier.to_scalar();
        let mut sum = Scalar::<C>::ZERO;

        // Evaluate using Horner's method.
        for (index, coefficient) in self.0.iter().rev().enumerate() {
            // The secret is the constant term in the polynomial
            sum += coefficient;

            if index != (self.0.len() - 1) {
                sum *= term;
            }
        }

        sum
    }

    /// Compute the public commitment
    /// \\( C = [\phi_0, ..., \phi_{t-1}] \\), where \\( \phi_j = g^{a_j} \\).
    pub fn commit(&self) -> PolynomialCommitment<C> {
        PolynomialCommitment {
            points: self
                .0
                .iter()
                .map(|coefficient| PublicPoint::<C>::generator() * coefficient)
                .collect(),
        }
    }
}

/// A commitment to a participant's secret polynomial coefficients for
/// Feldman's verifiable secret sharing scheme.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PolynomialCommitment<C: CipherSuite> {
    /// The commitments to the participant's secret coefficients.
    pub points: Vec<PublicPoint<C>>,
}

impl_serialization_traits!(PolynomialCommitment<CipherSuite>);

impl<C: CipherSuite> PolynomialCommitment<C> {
    /// Retrieve \\( a_0 \cdot G \\), the public half of this participant's
    /// contribution to the group secret.
    pub fn public_key(&self) -> Option<&PublicPoint<C>> {
        self.points.first()
    }

    /// Evaluate \\( g^{f(x)} \\) without knowing the secret coefficients of the polynomial.
    pub fn evaluate_hiding(&self, identifier: &Identifier<C>) -> PublicPoint<C> {
        let term = identifier.to_scalar();
        let mut sum = PublicPoint::<C>::zero();

        // Evaluate using Horner's method.
        for (index, point) in self.points.iter().rev().enumerate() {
            sum += point;

            if index != (self.points.len() - 1) {
                sum *= term;
            }
        }

        sum
    }

    /// Verify that `share` is the evaluation at `identifier` of the
    /// polynomial attested to by this commitment.
    pub fn verify_share(&self, identifier: &Identifier<C>, share: &Scalar<C>) -> DkgResult<()> {
        let lhs = PublicPoint::<C>::generator() * share;
        let rhs = self.evaluate_hiding(identifier);

        if lhs.into_affine() == rhs.into_affine() {
            Ok(())
        } else {
            Err(Error::ShareVerificationError)
        }
    }

    /// Whether `share` is consistent with this commitment at `identifier`.
    pub fn is_valid_share(&self, identifier: &Identifier<C>, share: &Scalar<C>) -> bool {
        self.verify_share(identifier, share).is_ok()
    }

    /// Enforces that the number of points of this commitment matches the
    /// threshold parameter `t`.
    pub fn check_degree(&self, parameters: &ThresholdParameters) -> bool {
        self.points.len() == parameters.threshold()
    }
}
