//! Typed inputs for the four operations and the entry points that run them.
//!
//! Integers deserialize from JSON numbers or decimal strings, so parameters
//! of any size can be sent. A missing or non-integer field fails
//! deserialization, before any step runs.

use num_bigint::BigInt;
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::dsa::{Dsa, DsaParams};
use crate::ecdsa::{Ecdsa, EcdsaParams};
use crate::error::EngineResult;
use crate::math::curve::{Curve, CurvePoint};
use crate::signature::{DsaSignOutput, EcdsaSignOutput, Signature, Verification};
use crate::trace::Traced;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DsaSignRequest {
    #[serde(with = "crate::decimal")]
    pub p: BigInt,
    #[serde(with = "crate::decimal")]
    pub q: BigInt,
    #[serde(with = "crate::decimal")]
    pub g: BigInt,
    #[serde(with = "crate::decimal")]
    pub x: BigInt,
    #[serde(with = "crate::decimal")]
    pub k: BigInt,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DsaVerifyRequest {
    #[serde(with = "crate::decimal")]
    pub p: BigInt,
    #[serde(with = "crate::decimal")]
    pub q: BigInt,
    #[serde(with = "crate::decimal")]
    pub g: BigInt,
    #[serde(with = "crate::decimal")]
    pub y: BigInt,
    #[serde(with = "crate::decimal")]
    pub r: BigInt,
    #[serde(with = "crate::decimal")]
    pub s: BigInt,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EcdsaSignRequest {
    #[serde(with = "crate::decimal")]
    pub a: BigInt,
    #[serde(with = "crate::decimal")]
    pub b: BigInt,
    #[serde(with = "crate::decimal")]
    pub p: BigInt,
    #[serde(rename = "Gx", with = "crate::decimal")]
    pub gx: BigInt,
    #[serde(rename = "Gy", with = "crate::decimal")]
    pub gy: BigInt,
    #[serde(with = "crate::decimal")]
    pub n: BigInt,
    #[serde(with = "crate::decimal")]
    pub d: BigInt,
    #[serde(with = "crate::decimal")]
    pub k: BigInt,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EcdsaVerifyRequest {
    #[serde(with = "crate::decimal")]
    pub a: BigInt,
    #[serde(with = "crate::decimal")]
    pub b: BigInt,
    #[serde(with = "crate::decimal")]
    pub p: BigInt,
    #[serde(rename = "Gx", with = "crate::decimal")]
    pub gx: BigInt,
    #[serde(rename = "Gy", with = "crate::decimal")]
    pub gy: BigInt,
    #[serde(with = "crate::decimal")]
    pub n: BigInt,
    #[serde(rename = "Qx", with = "crate::decimal")]
    pub qx: BigInt,
    #[serde(rename = "Qy", with = "crate::decimal")]
    pub qy: BigInt,
    #[serde(with = "crate::decimal")]
    pub r: BigInt,
    #[serde(with = "crate::decimal")]
    pub s: BigInt,
    pub message: String,
}

fn ecdsa_engine(
    a: &BigInt,
    b: &BigInt,
    p: &BigInt,
    generator: CurvePoint,
    n: &BigInt,
    config: &EngineConfig,
) -> EngineResult<Ecdsa> {
    let curve = Curve::new(a.clone(), b.clone(), p.clone())?;
    let params = EcdsaParams::new(curve, generator, n.clone())?;
    Ok(Ecdsa::new(params).with_config(config.clone()))
}

pub fn dsa_sign(request: &DsaSignRequest) -> Traced<DsaSignOutput> {
    match DsaParams::new(request.p.clone(), request.q.clone(), request.g.clone()) {
        Ok(params) => Dsa::new(params).sign(&request.x, &request.k, &request.message),
        Err(err) => Traced::rejected(err),
    }
}

pub fn dsa_verify(request: &DsaVerifyRequest) -> Traced<Verification> {
    let signature = Signature::new(request.r.clone(), request.s.clone());
    match DsaParams::new(request.p.clone(), request.q.clone(), request.g.clone()) {
        Ok(params) => Dsa::new(params).verify(&request.y, &signature, &request.message),
        Err(err) => Traced::rejected(err),
    }
}

/// `config` sets how many double-and-add records each scalar step keeps.
pub fn ecdsa_sign(request: &EcdsaSignRequest, config: &EngineConfig) -> Traced<EcdsaSignOutput> {
    let generator = CurvePoint::finite(request.gx.clone(), request.gy.clone());
    match ecdsa_engine(&request.a, &request.b, &request.p, generator, &request.n, config) {
        Ok(engine) => engine.sign(&request.d, &request.k, &request.message),
        Err(err) => Traced::rejected(err),
    }
}

pub fn ecdsa_verify(request: &EcdsaVerifyRequest, config: &EngineConfig) -> Traced<Verification> {
    let generator = CurvePoint::finite(request.gx.clone(), request.gy.clone());
    let public_key = CurvePoint::finite(request.qx.clone(), request.qy.clone());
    let signature = Signature::new(request.r.clone(), request.s.clone());
    match ecdsa_engine(&request.a, &request.b, &request.p, generator, &request.n, config) {
        Ok(engine) => engine.verify(&public_key, &signature, &request.message),
        Err(err) => Traced::rejected(err),
    }
}
