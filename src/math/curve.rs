//! Short Weierstrass curves `y² = x³ + ax + b` over `Z/pZ`.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{EngineError, EngineResult};
use crate::math::modular::{ensure_modulus, mod_inverse, modulo};

/// A point of the curve group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CurvePoint {
    Finite { x: BigInt, y: BigInt },
    /// The group identity.
    Infinity,
}

impl CurvePoint {
    pub fn finite(x: impl Into<BigInt>, y: impl Into<BigInt>) -> Self {
        CurvePoint::Finite {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, CurvePoint::Infinity)
    }

    pub fn x(&self) -> Option<&BigInt> {
        match self {
            CurvePoint::Finite { x, .. } => Some(x),
            CurvePoint::Infinity => None,
        }
    }

    pub fn y(&self) -> Option<&BigInt> {
        match self {
            CurvePoint::Finite { y, .. } => Some(y),
            CurvePoint::Infinity => None,
        }
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurvePoint::Finite { x, y } => write!(f, "({x}, {y})"),
            CurvePoint::Infinity => write!(f, "∞"),
        }
    }
}

impl Serialize for CurvePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CurvePoint::Finite { x, y } => {
                let mut state = serializer.serialize_struct("CurvePoint", 2)?;
                state.serialize_field("x", &x.to_string())?;
                state.serialize_field("y", &y.to_string())?;
                state.end()
            }
            CurvePoint::Infinity => serializer.serialize_str("infinity"),
        }
    }
}

/// What happened to the accumulator for one bit of the scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOperation {
    Add,
    Skip,
}

/// One iteration of double-and-add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarMulBitStep {
    /// Bit index, least significant first.
    pub iteration: usize,
    pub bit: u8,
    pub operation: BitOperation,
    /// Accumulator after this bit was processed.
    pub accumulator: CurvePoint,
}

/// Record of a traced scalar multiplication.
///
/// `steps` may be a prefix of the full run (see [`ScalarTrace::truncated`]);
/// `total_operations` always counts every processed bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarTrace {
    /// Binary expansion of the scalar, most significant bit first.
    pub binary: String,
    pub steps: Vec<ScalarMulBitStep>,
    pub total_operations: usize,
}

impl ScalarTrace {
    fn new(binary: String) -> Self {
        Self {
            binary,
            steps: Vec::new(),
            total_operations: 0,
        }
    }

    fn push(&mut self, step: ScalarMulBitStep) {
        self.steps.push(step);
        self.total_operations += 1;
    }

    /// Keeps the first `limit` bit records; the count is left untouched.
    pub fn truncated(mut self, limit: usize) -> Self {
        self.steps.truncate(limit);
        self
    }
}

/// Elliptic curve `y² = x³ + ax + b (mod p)`.
///
/// `p` is assumed prime; only its sign is checked. With a composite modulus a
/// nonzero slope denominator can still be non-invertible, which surfaces as
/// [`EngineError::NoInverse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Curve {
    #[serde(with = "crate::decimal")]
    a: BigInt,
    #[serde(with = "crate::decimal")]
    b: BigInt,
    #[serde(with = "crate::decimal")]
    p: BigInt,
}

impl Curve {
    pub fn new(a: BigInt, b: BigInt, p: BigInt) -> EngineResult<Self> {
        ensure_modulus(&p)?;
        Ok(Self { a, b, p })
    }

    pub fn a(&self) -> &BigInt {
        &self.a
    }

    pub fn b(&self) -> &BigInt {
        &self.b
    }

    pub fn p(&self) -> &BigInt {
        &self.p
    }

    /// Checks `y² ≡ x³ + ax + b (mod p)`. The identity is always on the curve.
    pub fn is_on_curve(&self, point: &CurvePoint) -> bool {
        match point {
            CurvePoint::Infinity => true,
            CurvePoint::Finite { x, y } => {
                let lhs = y * y;
                let rhs = x * x * x + &self.a * x + &self.b;
                modulo(&(lhs - rhs), &self.p).is_zero()
            }
        }
    }

    /// Group law. Coordinates are compared after reduction modulo `p` and
    /// every finite result lies in `[0, p)`.
    pub fn point_add(&self, lhs: &CurvePoint, rhs: &CurvePoint) -> EngineResult<CurvePoint> {
        let p = &self.p;
        let ((x1, y1), (x2, y2)) = match (lhs, rhs) {
            (CurvePoint::Infinity, _) => return Ok(self.reduce(rhs)),
            (_, CurvePoint::Infinity) => return Ok(self.reduce(lhs)),
            (CurvePoint::Finite { x: x1, y: y1 }, CurvePoint::Finite { x: x2, y: y2 }) => (
                (modulo(x1, p), modulo(y1, p)),
                (modulo(x2, p), modulo(y2, p)),
            ),
        };

        let lambda = if x1 == x2 && y1 == y2 {
            let denominator = modulo(&(&y1 * 2u32), p);
            // vertical tangent
            if denominator.is_zero() {
                return Ok(CurvePoint::Infinity);
            }
            let numerator = modulo(&(&x1 * &x1 * 3u32 + &self.a), p);
            modulo(&(numerator * mod_inverse(&denominator, p)?), p)
        } else {
            // vertical chord: x1 = x2 forces y1 = -y2 for points on the curve
            if x1 == x2 {
                return Ok(CurvePoint::Infinity);
            }
            let numerator = modulo(&(&y2 - &y1), p);
            let denominator = modulo(&(&x2 - &x1), p);
            modulo(&(numerator * mod_inverse(&denominator, p)?), p)
        };

        let x3 = modulo(&(&lambda * &lambda - &x1 - &x2), p);
        let y3 = modulo(&(&lambda * (&x1 - &x3) - &y1), p);
        Ok(CurvePoint::Finite { x: x3, y: y3 })
    }

    /// Canonical representative with both coordinates in `[0, p)`.
    pub fn reduce(&self, point: &CurvePoint) -> CurvePoint {
        match point {
            CurvePoint::Finite { x, y } => CurvePoint::Finite {
                x: modulo(x, &self.p),
                y: modulo(y, &self.p),
            },
            CurvePoint::Infinity => CurvePoint::Infinity,
        }
    }

        pub fn double(&self, point: &CurvePoint) -> EngineResult<CurvePoint> {
        self.point_add(point, point)
    }

    /// Computes `k·P` by double-and-add over the bits of `k`, least
    /// significant first. Negative scalars are rejected.
    pub fn scalar_multiply(&self, k: &BigInt, point: &CurvePoint) -> EngineResult<CurvePoint> {
        self.double_and_add(k, point, None)
    }

    /// Like [`Curve::scalar_multiply`], also returning one record per bit.
    pub fn scalar_multiply_traced(
        &self,
        k: &BigInt,
        point: &CurvePoint,
    ) -> EngineResult<(CurvePoint, ScalarTrace)> {
        let mut trace = ScalarTrace::new(k.to_str_radix(2));
        let result = self.double_and_add(k, point, Some(&mut trace))?;
        Ok((result, trace))
    }

    fn double_and_add(
        &self,
        k: &BigInt,
        point: &CurvePoint,
        mut trace: Option<&mut ScalarTrace>,
    ) -> EngineResult<CurvePoint> {
        if k.is_zero() || point.is_infinity() {
            return Ok(CurvePoint::Infinity);
        }
        if k.is_negative() {
            return Err(EngineError::UnsupportedOperation(format!(
                "negative scalar {k} in scalar multiplication"
            )));
        }

        let binary = k.to_str_radix(2);
        let last = binary.len() - 1;
        let mut result = CurvePoint::Infinity;
        let mut running = point.clone();

        for (i, bit) in binary.bytes().rev().enumerate() {
            let set = bit == b'1';
            if set {
                result = self.point_add(&result, &running)?;
            }
            log::trace!("double-and-add bit {i} = {}: accumulator {result}", set as u8);
            if let Some(trace) = trace.as_deref_mut() {
                trace.push(ScalarMulBitStep {
                    iteration: i,
                    bit: set as u8,
                    operation: if set {
                        BitOperation::Add
                    } else {
                        BitOperation::Skip
                    },
                    accumulator: result.clone(),
                });
            }
            if i < last {
                running = self.double(&running)?;
            }
        }

        Ok(result)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y² = x³ + {}x + {} (mod {})", self.a, self.b, self.p)
    }
}
