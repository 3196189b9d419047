//! ECDSA over a caller-supplied curve, with a full trace.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, PointRole};
use crate::math::curve::{Curve, CurvePoint};
use crate::math::modular::{ensure_modulus, modulo};
use crate::signature::{
    Component, ECDSA_VERIFY_SUMMARY, EDUCATIONAL_WARNING, EcdsaSignOutput, Signature, Verification,
};
use crate::stages::{
    check_range, record_hash, record_inverse, record_scalar_multiply, record_verdict,
    require_finite,
};
use crate::trace::{Stage, Trace, Traced};

/// Setup steps are numbered 0 so the algorithm proper starts at 1.
const SETUP_INDEX: usize = 0;

/// Curve, generator `G` and its order `n`.
///
/// `n` is trusted to be the order of `G`; only its sign is checked. Whether
/// `G` lies on the curve is checked by each operation so the failure can be
/// reported as a [`EngineError::Curve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcdsaParams {
    pub curve: Curve,
    pub generator: CurvePoint,
    #[serde(with = "crate::decimal")]
    pub order: BigInt,
}

impl EcdsaParams {
    pub fn new(curve: Curve, generator: CurvePoint, order: BigInt) -> EngineResult<Self> {
        ensure_modulus(&order)?;
        Ok(Self {
            curve,
            generator,
            order,
        })
    }
}

/// Instrumented ECDSA signer and verifier.
pub struct Ecdsa {
    params: EcdsaParams,
    config: EngineConfig,
}

impl Ecdsa {
    pub fn new(params: EcdsaParams) -> Self {
        Self {
            params,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn params(&self) -> &EcdsaParams {
        &self.params
    }

    /// Signs `message` with private key `d` and nonce `k`.
    ///
    /// # Arguments
    ///
    /// * `d` - private key
    /// * `k` - nonce, must never be reused with the same key
    /// * `message` - text to sign
    ///
    /// # Returns
    ///
    /// The signature, `Q = d·G` and the trace. An off-curve generator is
    /// rejected before any step is recorded. A nonce point at infinity or a
    /// zero `r`/`s` stops the run with the steps recorded so far.
    pub fn sign(&self, d: &BigInt, k: &BigInt, message: &str) -> Traced<EcdsaSignOutput> {
        log::debug!(
            "ecdsa sign: {} G={} n={}",
            self.params.curve,
            self.params.generator,
            self.params.order
        );
        Traced::capture(Trace::starting_at(SETUP_INDEX), |trace| {
            self.sign_stages(d, k, message, trace)
        })
    }

    /// Verifies `signature` on `message` against public key point `Q`.
    ///
    /// `G` and `Q` are checked against the curve first. An `r` or `s` outside
    /// `[1, n)` gives `valid = false` right after the setup step. A
    /// non-invertible `s`,
    /// or `u₁×G`, `u₂×Q` or their sum collapsing to the identity, stops the
    /// run; otherwise the result carries `valid` and the verification point.
    pub fn verify(
        &self,
        public_key: &CurvePoint,
        signature: &Signature,
        message: &str,
    ) -> Traced<Verification> {
        log::debug!(
            "ecdsa verify: {} G={} n={} Q={public_key}",
            self.params.curve,
            self.params.generator,
            self.params.order
        );
        Traced::capture(Trace::starting_at(SETUP_INDEX), |trace| {
            self.verify_stages(public_key, signature, message, trace)
        })
    }

    fn ensure_on_curve(&self, point: &CurvePoint, role: PointRole) -> EngineResult<()> {
        if self.params.curve.is_on_curve(point) {
            return Ok(());
        }
        Err(EngineError::Curve {
            role,
            point: point.clone(),
            equation: self.params.curve.to_string(),
        })
    }

    fn sign_stages(
        &self,
        d: &BigInt,
        k: &BigInt,
        message: &str,
        trace: &mut Trace,
    ) -> EngineResult<EcdsaSignOutput> {
        let EcdsaParams {
            curve,
            generator,
            order: n,
        } = &self.params;
        let preview = self.config.scalar_step_preview;

        self.ensure_on_curve(generator, PointRole::Generator)?;
        trace.record(
            "Curve Definition",
            "y² = x³ + ax + b (mod p)",
            format!("{curve}, G = {generator}, n = {n}"),
            "The curve and generator point define the group the signature lives in.",
            Stage::CurveSetup {
                curve: curve.clone(),
                generator: generator.clone(),
                order: n.clone(),
            },
        );

        let q = record_scalar_multiply(
            trace,
            curve,
            "Compute Public Key",
            "Q = d × G",
            "Q is the generator multiplied by the private key. Recovering d from Q is \
             the elliptic curve discrete logarithm problem.",
            d,
            generator,
            preview,
        )?;

        let e = record_hash(trace, message, n, "e = H(m) mod n");

        let kg = record_scalar_multiply(
            trace,
            curve,
            "Compute k × G",
            "k × G = (x₁, y₁)",
            "The nonce point. Computing k×G is easy; finding k from it is infeasible.",
            k,
            generator,
            preview,
        )?;
        let (x1, _) = require_finite(&kg, "k × G")?;

        let r = modulo(x1, n);
        trace.record(
            "Compute r",
            "r = x₁ mod n",
            format!("r = {x1} mod {n}"),
            "The x-coordinate of the nonce point becomes the first signature component.",
            Stage::R {
                source: x1.clone(),
                r: r.clone(),
            },
        );
        if r.is_zero() {
            return Err(EngineError::ZeroSignatureComponent(Component::R));
        }

        let k_inv = record_inverse(
            trace,
            "Compute Modular Inverse of k",
            "k⁻¹ mod n",
            "The inverse of k is needed to compute s. This is why k must never be reused.",
            k,
            n,
        )?;

        let dr = modulo(&(d * &r), n);
        let sum = modulo(&(&e + &dr), n);
        let s = modulo(&(&k_inv * &sum), n);
        trace.record(
            "Compute s",
            "s = k⁻¹(e + d×r) mod n",
            format!("s = {k_inv}×({e} + {d}×{r}) mod {n}; d×r = {dr}, e + d×r = {sum}, s = {s}"),
            "s binds the hash, the private key and r together. Only the holder of d can \
             compute it.",
            Stage::S {
                product: dr,
                sum,
                s: s.clone(),
            },
        );
        if s.is_zero() {
            return Err(EngineError::ZeroSignatureComponent(Component::S));
        }

        Ok(EcdsaSignOutput {
            signature: Signature { r, s },
            public_key: q,
            curve: curve.clone(),
            generator: generator.clone(),
            order: n.clone(),
            summary: ECDSA_VERIFY_SUMMARY,
            warning: EDUCATIONAL_WARNING,
        })
    }

    fn verify_stages(
        &self,
        public_key: &CurvePoint,
        signature: &Signature,
        message: &str,
        trace: &mut Trace,
    ) -> EngineResult<Verification> {
        let EcdsaParams {
            curve,
            generator,
            order: n,
        } = &self.params;
        let Signature { r, s } = signature;
        let preview = self.config.scalar_step_preview;

        self.ensure_on_curve(generator, PointRole::Generator)?;
        self.ensure_on_curve(public_key, PointRole::PublicKey)?;
        trace.record(
            "Setup",
            "y² = x³ + ax + b (mod p)",
            format!("{curve}, G = {generator}, Q = {public_key}"),
            "Both points were checked against the curve equation.",
            Stage::VerifySetup {
                curve: curve.clone(),
                generator: generator.clone(),
                public_key: public_key.clone(),
            },
        );

        if let Some(rejected) = check_range(trace, signature, n, "0 < r < n, 0 < s < n") {
            return Ok(rejected);
        }

        let e = record_hash(trace, message, n, "e = H(m) mod n");

        let w = record_inverse(
            trace,
            "Compute w = s^(-1) mod n",
            "w = s^(-1) mod n",
            "The inverse of s undoes its effect.",
            s,
            n,
        )?;

        let u1 = modulo(&(&e * &w), n);
        trace.record(
            "Compute u₁",
            "u₁ = e × w mod n",
            format!("u₁ = {e} × {w} mod {n}"),
            "First verification component, combining the message hash and w.",
            Stage::Scalar { value: u1.clone() },
        );

        let u2 = modulo(&(r * &w), n);
        trace.record(
            "Compute u₂",
            "u₂ = r × w mod n",
            format!("u₂ = {r} × {w} mod {n}"),
            "Second verification component, combining r and w.",
            Stage::Scalar { value: u2.clone() },
        );

        let u1g = record_scalar_multiply(
            trace,
            curve,
            "Compute u₁×G",
            "u₁ × G",
            "First point component for verification.",
            &u1,
            generator,
            preview,
        )?;
        require_finite(&u1g, "u₁×G")?;

        let u2q = record_scalar_multiply(
            trace,
            curve,
            "Compute u₂×Q",
            "u₂ × Q",
            "Second point component for verification.",
            &u2,
            public_key,
            preview,
        )?;
        require_finite(&u2q, "u₂×Q")?;

        let point = curve.point_add(&u1g, &u2q)?;
        trace.record(
            "Compute Verification Point",
            "(x, y) = u₁×G + u₂×Q",
            format!("(x, y) = {u1g} + {u2q} = {point}"),
            "Adding the two components gives the verification point.",
            Stage::PointAdd {
                lhs: u1g.clone(),
                rhs: u2q.clone(),
                sum: point.clone(),
            },
        );
        let (x, _) = require_finite(&point, "u₁×G + u₂×Q")?;

        let v = modulo(x, n);
        let substitution = format!("{x} mod {n} = {r}?");
        let verification = Verification::new(v, r.clone(), Some(point.clone()));
        record_verdict(trace, "x mod n = r?", substitution, &verification);
        Ok(verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    fn tiny() -> Ecdsa {
        let curve = Curve::new(int(2), int(3), int(97)).unwrap();
        Ecdsa::new(EcdsaParams::new(curve, CurvePoint::finite(3, 6), int(5)).unwrap())
    }

    #[test]
    fn test_sign_values() {
        let traced = tiny().sign(&int(3), &int(4), "Hello");
        let out = traced.value().unwrap();
        assert_eq!(out.signature, Signature::new(3, 2));
        assert_eq!(out.public_key, CurvePoint::finite(80, 87));

        let indices: Vec<_> = traced.trace.iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(
            traced.trace.steps()[4].stage,
            Stage::R {
                source: int(3),
                r: int(3)
            }
        );
    }

    #[test]
    fn test_verify_values() {
        let traced = tiny().verify(&CurvePoint::finite(80, 87), &Signature::new(3, 2), "Hello");
        let verification = traced.value().unwrap();
        assert!(verification.valid);
        assert_eq!(verification.point, Some(CurvePoint::finite(3, 91)));
        assert_eq!(traced.trace.len(), 9);
        assert_eq!(
            traced.trace.steps()[7].stage,
            Stage::PointAdd {
                lhs: CurvePoint::finite(80, 10),
                rhs: CurvePoint::finite(80, 10),
                sum: CurvePoint::finite(3, 91),
            }
        );
    }

    #[test]
    fn test_nonce_point_at_infinity() {
        let traced = tiny().sign(&int(3), &int(5), "Hello");
        assert_eq!(traced.error(), Some(&EngineError::PointAtInfinity("k × G")));
        // setup, public key, hash, k × G
        assert_eq!(traced.trace.len(), 4);
    }

    #[test]
    fn test_negative_private_key() {
        let traced = tiny().sign(&int(-3), &int(4), "Hello");
        assert!(matches!(
            traced.error(),
            Some(EngineError::UnsupportedOperation(_))
        ));
        assert_eq!(traced.trace.len(), 1);
    }

    #[test]
    fn test_scalar_preview_is_bounded() {
        let ecdsa = tiny().with_config(EngineConfig::default().with_scalar_step_preview(1));
        let traced = ecdsa.sign(&int(3), &int(4), "Hello");
        match &traced.trace.steps()[1].stage {
            Stage::ScalarMultiply { bits, result, .. } => {
                assert_eq!(bits.steps.len(), 1);
                assert_eq!(bits.total_operations, 2);
                assert_eq!(result, &CurvePoint::finite(80, 87));
            }
            other => panic!("unexpected stage {other:?}"),
        }
    }
}
