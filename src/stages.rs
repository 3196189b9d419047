//! Trace stages shared by the DSA and ECDSA pipelines.

use num_bigint::BigInt;
use num_traits::{One, Signed};

use crate::error::{EngineError, EngineResult};
use crate::math::curve::{Curve, CurvePoint};
use crate::math::modular::{hash_to_integer, mod_inverse, modulo};
use crate::signature::{Component, Signature, Verification};
use crate::trace::{Stage, Trace};

/// Records `H(message) mod modulus` and returns the reduced hash.
pub(crate) fn record_hash(
    trace: &mut Trace,
    message: &str,
    modulus: &BigInt,
    formula: &'static str,
) -> BigInt {
    let digest = hash_to_integer(message);
    let reduced = modulo(&digest, modulus);
    trace.record(
        "Hash Message",
        formula,
        format!("SHA-256(\"{message}\") mod {modulus}"),
        "The message is hashed with SHA-256 and reduced modulo the group order.",
        Stage::Hash {
            digest_hex: format!("{digest:#x}"),
            digest,
            reduced: reduced.clone(),
        },
    );
    reduced
}

/// Checks `r, s ∈ [1, order)`. The first component outside the range is
/// recorded and returned as an invalid verification; nothing is recorded
/// otherwise.
pub(crate) fn check_range(
    trace: &mut Trace,
    signature: &Signature,
    order: &BigInt,
    formula: &'static str,
) -> Option<Verification> {
    let (component, value) = [(Component::R, &signature.r), (Component::S, &signature.s)]
        .into_iter()
        .find(|(_, value)| !value.is_positive() || *value >= order)?;
    log::debug!("{component} = {value} outside [1, {order})");
    trace.record(
        "Check Signature Range",
        formula,
        format!("{component} = {value} is not in [1, {}]", order - BigInt::one()),
        "Both components must lie in [1, order - 1]. Anything else is rejected \
         before any arithmetic, since r = 0 would remove the public key from the check.",
        Stage::RangeCheck {
            component,
            value: value.clone(),
            order: order.clone(),
        },
    );
    Some(Verification::out_of_range(
        component,
        value.clone(),
        signature.r.clone(),
    ))
}

/// Records `value⁻¹ mod modulus`. Nothing is recorded when the inverse does
/// not exist.
pub(crate) fn record_inverse(
    trace: &mut Trace,
    title: &'static str,
    formula: &'static str,
    explanation: &'static str,
    value: &BigInt,
    modulus: &BigInt,
) -> EngineResult<BigInt> {
    let inverse = mod_inverse(value, modulus)?;
    let check = modulo(&(value * &inverse), modulus);
    trace.record(
        title,
        formula,
        format!(
            "{value}^(-1) mod {modulus} = {inverse}; \
             ({value} × {inverse}) mod {modulus} = {check}"
        ),
        explanation,
        Stage::Inverse {
            value: value.clone(),
            inverse: inverse.clone(),
            check,
        },
    );
    Ok(inverse)
}

/// Records `scalar·point` with up to `preview` double-and-add records. The
/// step is recorded even when the product is the identity.
#[allow(clippy::too_many_arguments)]
pub(crate) fn record_scalar_multiply(
    trace: &mut Trace,
    curve: &Curve,
    title: &'static str,
    formula: &'static str,
    explanation: &'static str,
    scalar: &BigInt,
    point: &CurvePoint,
    preview: usize,
) -> EngineResult<CurvePoint> {
    let (result, bits) = curve.scalar_multiply_traced(scalar, point)?;
    trace.record(
        title,
        formula,
        format!("{scalar} × {point} = {result}"),
        explanation,
        Stage::ScalarMultiply {
            scalar: scalar.clone(),
            result: result.clone(),
            bits: bits.truncated(preview),
        },
    );
    Ok(result)
}

/// Coordinates of `point`, or `PointAtInfinity` naming `what`.
pub(crate) fn require_finite<'a>(
    point: &'a CurvePoint,
    what: &'static str,
) -> EngineResult<(&'a BigInt, &'a BigInt)> {
    match point {
        CurvePoint::Finite { x, y } => Ok((x, y)),
        CurvePoint::Infinity => Err(EngineError::PointAtInfinity(what)),
    }
}

pub(crate) fn record_verdict(
    trace: &mut Trace,
    formula: &'static str,
    substitution: String,
    verification: &Verification,
) {
    trace.record(
        "Verify Signature",
        formula,
        substitution,
        "The signature is valid exactly when the reconstructed value equals r.",
        Stage::Verdict {
            computed: verification.computed.clone(),
            expected: verification.expected.clone(),
            valid: verification.valid,
        },
    );
}
