//! Instructional DSA and ECDSA with a step-by-step numeric trace.
//!
//! Parameters are caller supplied and usually tiny. Nothing here is meant to
//! protect real keys.

use sha2::{Digest, Sha256};

pub mod config;
pub mod decimal;
pub mod dsa;
pub mod ecdsa;
pub mod error;
pub mod math;
pub mod request;
pub mod signature;
mod stages;
pub mod trace;

pub use config::EngineConfig;
pub use dsa::{Dsa, DsaParams};
pub use ecdsa::{Ecdsa, EcdsaParams};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use math::curve::{Curve, CurvePoint};
pub use request::{dsa_sign, dsa_verify, ecdsa_sign, ecdsa_verify};
pub use signature::Signature;
pub use trace::{Stage, Trace, TraceStep, Traced};

pub fn digest_sha2(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
