//! Signature values and the payloads returned by successful operations.

use std::fmt;

use num_bigint::BigInt;
use serde::Serialize;

use crate::math::curve::{Curve, CurvePoint};

pub const EDUCATIONAL_WARNING: &str =
    "EDUCATIONAL MODE ONLY - these parameters are NOT cryptographically secure";

pub const DSA_VERIFY_SUMMARY: &str = "To verify, compute w = s^(-1) mod q, u₁ = H(m)×w mod q, \
u₂ = r×w mod q and v = (g^(u₁) × y^(u₂) mod p) mod q. The signature is valid if v = r.";

pub const ECDSA_VERIFY_SUMMARY: &str = "To verify, compute w = s⁻¹ mod n, u₁ = e×w mod n, \
u₂ = r×w mod n and the point (x, y) = u₁×G + u₂×Q. The signature is valid if x mod n = r.";

/// One of the two signature scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    R,
    S,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::R => write!(f, "r"),
            Component::S => write!(f, "s"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    #[serde(with = "crate::decimal")]
    pub r: BigInt,
    #[serde(with = "crate::decimal")]
    pub s: BigInt,
}

impl Signature {
    pub fn new(r: impl Into<BigInt>, s: impl Into<BigInt>) -> Self {
        Self {
            r: r.into(),
            s: s.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DsaSignOutput {
    pub signature: Signature,
    #[serde(with = "crate::decimal")]
    pub public_key: BigInt,
    pub summary: &'static str,
    pub warning: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcdsaSignOutput {
    pub signature: Signature,
    pub public_key: CurvePoint,
    pub curve: Curve,
    pub generator: CurvePoint,
    #[serde(with = "crate::decimal")]
    pub order: BigInt,
    pub summary: &'static str,
    pub warning: &'static str,
}

/// Result of a completed verification, valid or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub valid: bool,
    /// `v` for DSA, `x mod n` for ECDSA, or the offending component when
    /// `out_of_range` is set.
    #[serde(with = "crate::decimal")]
    pub computed: BigInt,
    /// The `r` component being checked.
    #[serde(with = "crate::decimal")]
    pub expected: BigInt,
    /// `u₁×G + u₂×Q`, ECDSA only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<CurvePoint>,
    /// Component rejected for lying outside `[1, order)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_range: Option<Component>,
    pub summary: &'static str,
    pub warning: &'static str,
}

impl Verification {
    pub(crate) fn new(computed: BigInt, expected: BigInt, point: Option<CurvePoint>) -> Self {
        let valid = computed == expected;
        let summary = if valid {
            "Signature is VALID"
        } else {
            "Signature is INVALID"
        };
        Self {
            valid,
            computed,
            expected,
            point,
            out_of_range: None,
            summary,
            warning: EDUCATIONAL_WARNING,
        }
    }

    /// Rejection before any arithmetic: `value` is the component outside
    /// `[1, order)`.
    pub(crate) fn out_of_range(component: Component, value: BigInt, expected: BigInt) -> Self {
        Self {
            valid: false,
            computed: value,
            expected,
            point: None,
            out_of_range: Some(component),
            summary: "Signature is INVALID",
            warning: EDUCATIONAL_WARNING,
        }
    }
}
