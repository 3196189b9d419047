//! DSA over the order-`q` subgroup of `(Z/pZ)*`, with a full trace.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::math::modular::{ensure_modulus, mod_pow, modulo};
use crate::signature::{
    Component, DSA_VERIFY_SUMMARY, DsaSignOutput, EDUCATIONAL_WARNING, Signature, Verification,
};
use crate::stages::{check_range, record_hash, record_inverse, record_verdict};
use crate::trace::{Stage, Trace, Traced};

/// Domain parameters `(p, q, g)`.
///
/// `q` should divide `p - 1` and `g` should generate the order-`q` subgroup;
/// neither is checked. Both moduli must be positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DsaParams {
    #[serde(with = "crate::decimal")]
    pub p: BigInt,
    #[serde(with = "crate::decimal")]
    pub q: BigInt,
    #[serde(with = "crate::decimal")]
    pub g: BigInt,
}

impl DsaParams {
    pub fn new(p: BigInt, q: BigInt, g: BigInt) -> EngineResult<Self> {
        ensure_modulus(&p)?;
        ensure_modulus(&q)?;
        Ok(Self { p, q, g })
    }
}

/// Instrumented DSA signer and verifier.
pub struct Dsa {
    params: DsaParams,
}

impl Dsa {
    pub fn new(params: DsaParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DsaParams {
        &self.params
    }

    /// `y = g^x mod p`.
    pub fn public_key(&self, x: &BigInt) -> EngineResult<BigInt> {
        mod_pow(&self.params.g, x, &self.params.p)
    }

    /// Signs `message` with private key `x` and nonce `k`.
    ///
    /// Records five steps: public key, hash, `r`, `k⁻¹` and `s`. A zero `r`
    /// or `s` stops the run after the step that produced it; the caller can
    /// retry with another nonce.
    pub fn sign(&self, x: &BigInt, k: &BigInt, message: &str) -> Traced<DsaSignOutput> {
        log::debug!("dsa sign: p={} q={} g={}", self.params.p, self.params.q, self.params.g);
        Traced::capture(Trace::new(), |trace| self.sign_stages(x, k, message, trace))
    }

    /// Verifies `signature` on `message` against public key `y`.
    ///
    /// Records six steps: hash, `w`, `u₁`, `u₂`, `v` and the verdict. An `r`
    /// or `s` outside `[1, q)` is rejected as `valid = false` after a single
    /// range step. A non-invertible `s` stops the run with an error; a
    /// mismatch is a normal `valid = false` result.
    pub fn verify(&self, y: &BigInt, signature: &Signature, message: &str) -> Traced<Verification> {
        log::debug!("dsa verify: p={} q={} g={}", self.params.p, self.params.q, self.params.g);
        Traced::capture(Trace::new(), |trace| {
            self.verify_stages(y, signature, message, trace)
        })
    }

    fn sign_stages(
        &self,
        x: &BigInt,
        k: &BigInt,
        message: &str,
        trace: &mut Trace,
    ) -> EngineResult<DsaSignOutput> {
        let DsaParams { p, q, g } = &self.params;

        let y = self.public_key(x)?;
        trace.record(
            "Compute Public Key",
            "y = g^x mod p",
            format!("y = {g}^{x} mod {p}"),
            "The public key is derived from the private key by modular exponentiation, \
             which is easy to compute and hard to invert.",
            Stage::PublicKey { y: y.clone() },
        );

        let h = record_hash(trace, message, q, "H(m) mod q");

        let g_k = mod_pow(g, k, p)?;
        let r = modulo(&g_k, q);
        trace.record(
            "Compute r",
            "r = (g^k mod p) mod q",
            format!("r = ({g}^{k} mod {p}) mod {q} = {g_k} mod {q}"),
            "The nonce k makes every signature different, even for the same message.",
            Stage::R {
                source: g_k,
                r: r.clone(),
            },
        );
        if r.is_zero() {
            return Err(EngineError::ZeroSignatureComponent(Component::R));
        }

        let k_inv = record_inverse(
            trace,
            "Compute Modular Inverse of k",
            "k^(-1) mod q",
            "The inverse of k is needed to compute s. This is why k must never be reused.",
            k,
            q,
        )?;

        let xr = modulo(&(x * &r), q);
        let sum = modulo(&(&h + &xr), q);
        let s = modulo(&(&k_inv * &sum), q);
        trace.record(
            "Compute s",
            "s = k^(-1) × (H(m) + x×r) mod q",
            format!(
                "s = {k_inv} × ({h} + {x}×{r}) mod {q}; x×r = {xr}, H(m) + x×r = {sum}, s = {s}"
            ),
            "s binds together the hash, the private key and r. Without x an attacker \
             cannot produce a valid s.",
            Stage::S {
                product: xr,
                sum,
                s: s.clone(),
            },
        );
        if s.is_zero() {
            return Err(EngineError::ZeroSignatureComponent(Component::S));
        }

        Ok(DsaSignOutput {
            signature: Signature { r, s },
            public_key: y,
            summary: DSA_VERIFY_SUMMARY,
            warning: EDUCATIONAL_WARNING,
        })
    }

    fn verify_stages(
        &self,
        y: &BigInt,
        signature: &Signature,
        message: &str,
        trace: &mut Trace,
    ) -> EngineResult<Verification> {
        let DsaParams { p, q, g } = &self.params;
        let Signature { r, s } = signature;

        if let Some(rejected) = check_range(trace, signature, q, "0 < r < q, 0 < s < q") {
            return Ok(rejected);
        }

        let h = record_hash(trace, message, q, "H(m) mod q");

        let w = record_inverse(
            trace,
            "Compute w = s^(-1) mod q",
            "w = s^(-1) mod q",
            "The inverse of s undoes its effect.",
            s,
            q,
        )?;

        let u1 = modulo(&(&h * &w), q);
        trace.record(
            "Compute u₁",
            "u₁ = H(m) × w mod q",
            format!("u₁ = {h} × {w} mod {q}"),
            "First verification component, combining the message hash and w.",
            Stage::Scalar { value: u1.clone() },
        );

        let u2 = modulo(&(r * &w), q);
        trace.record(
            "Compute u₂",
            "u₂ = r × w mod q",
            format!("u₂ = {r} × {w} mod {q}"),
            "Second verification component, combining r and w.",
            Stage::Scalar { value: u2.clone() },
        );

        let g_u1 = mod_pow(g, &u1, p)?;
        let y_u2 = mod_pow(y, &u2, p)?;
        let product = modulo(&(&g_u1 * &y_u2), p);
        let v = modulo(&product, q);
        trace.record(
            "Compute v",
            "v = (g^(u₁) × y^(u₂) mod p) mod q",
            format!(
                "v = ({g}^{u1} × {y}^{u2} mod {p}) mod {q}; g^(u₁) = {g_u1}, y^(u₂) = {y_u2}, \
                 product = {product}, v = {v}"
            ),
            "This reconstructs r from the signature and the public key.",
            Stage::V {
                g_u1,
                y_u2,
                product,
                v: v.clone(),
            },
        );

        let verification = Verification::new(v, r.clone(), None);
        record_verdict(trace, "v = r?", format!("{} = {r}?", verification.computed), &verification);
        Ok(verification)
    }
}
