use num_bigint::BigInt;
use serde::Serialize;
use thiserror::Error;

use crate::math::curve::CurvePoint;
use crate::signature::Component;

/// Which caller-supplied point failed the curve-membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointRole {
    Generator,
    PublicKey,
}

impl std::fmt::Display for PointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointRole::Generator => write!(f, "generator point G"),
            PointRole::PublicKey => write!(f, "public key point Q"),
        }
    }
}

/// Errors raised by the arithmetic layer and the signature engines.
///
/// Every variant is recoverable: engines hand it back together with the
/// partial trace accumulated before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("modular inverse does not exist for {value} mod {modulus}")]
    NoInverse { value: BigInt, modulus: BigInt },

    #[error("invalid signature: {0} = 0, choose a different k")]
    ZeroSignatureComponent(Component),

    #[error("{role} {point} is not on the curve {equation}")]
    Curve {
        role: PointRole,
        point: CurvePoint,
        equation: String,
    },

    #[error("{0} resulted in the point at infinity")]
    PointAtInfinity(&'static str),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("modulus must be positive, got {0}")]
    InvalidModulus(BigInt),
}

/// Coarse error tag for callers mapping failures onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoInverse,
    ZeroSignatureComponent,
    Curve,
    PointAtInfinity,
    UnsupportedOperation,
    InvalidModulus,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NoInverse { .. } => ErrorKind::NoInverse,
            EngineError::ZeroSignatureComponent(_) => ErrorKind::ZeroSignatureComponent,
            EngineError::Curve { .. } => ErrorKind::Curve,
            EngineError::PointAtInfinity(_) => ErrorKind::PointAtInfinity,
            EngineError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            EngineError::InvalidModulus(_) => ErrorKind::InvalidModulus,
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
