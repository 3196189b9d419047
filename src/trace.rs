//! Step-by-step record of a signing or verification run.
//!
//! Every engine stage appends one [`TraceStep`] to a [`Trace`]. The trace is
//! built fresh per call and handed back whole inside a [`Traced`], whether the
//! run finished or stopped early.

use num_bigint::BigInt;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{EngineError, EngineResult};
use crate::math::curve::{Curve, CurvePoint, ScalarTrace};
use crate::signature::Component;

/// Typed payload of a trace step, one variant per kind of stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    /// Curve, generator and order used for signing.
    CurveSetup {
        curve: Curve,
        generator: CurvePoint,
        #[serde(with = "crate::decimal")]
        order: BigInt,
    },
    /// Curve and the two points checked before verification.
    VerifySetup {
        curve: Curve,
        generator: CurvePoint,
        public_key: CurvePoint,
    },
    /// `y = g^x mod p`.
    PublicKey {
        #[serde(with = "crate::decimal")]
        y: BigInt,
    },
    /// `k·P` with a bounded prefix of its double-and-add run.
    ScalarMultiply {
        #[serde(with = "crate::decimal")]
        scalar: BigInt,
        result: CurvePoint,
        bits: ScalarTrace,
    },
    Hash {
        #[serde(with = "crate::decimal")]
        digest: BigInt,
        digest_hex: String,
        #[serde(with = "crate::decimal")]
        reduced: BigInt,
    },
    /// `r = source mod order`, where `source` is `g^k mod p` or `x(kG)`.
    R {
        #[serde(with = "crate::decimal")]
        source: BigInt,
        #[serde(with = "crate::decimal")]
        r: BigInt,
    },
    /// `inverse = value⁻¹ mod m`; `check` is `value·inverse mod m`.
    Inverse {
        #[serde(with = "crate::decimal")]
        value: BigInt,
        #[serde(with = "crate::decimal")]
        inverse: BigInt,
        #[serde(with = "crate::decimal")]
        check: BigInt,
    },
    /// `s = k⁻¹·(h + x·r)`; `product` is `x·r`, `sum` is `h + x·r`.
    S {
        #[serde(with = "crate::decimal")]
        product: BigInt,
        #[serde(with = "crate::decimal")]
        sum: BigInt,
        #[serde(with = "crate::decimal")]
        s: BigInt,
    },
    /// A reduced scalar such as `u₁` or `u₂`.
    Scalar {
        #[serde(with = "crate::decimal")]
        value: BigInt,
    },
    /// `v = (g^u₁ · y^u₂ mod p) mod q`.
    V {
        #[serde(with = "crate::decimal")]
        g_u1: BigInt,
        #[serde(with = "crate::decimal")]
        y_u2: BigInt,
        #[serde(with = "crate::decimal")]
        product: BigInt,
        #[serde(with = "crate::decimal")]
        v: BigInt,
    },
    /// A signature component outside `[1, order)`.
    RangeCheck {
        component: Component,
        #[serde(with = "crate::decimal")]
        value: BigInt,
        #[serde(with = "crate::decimal")]
        order: BigInt,
    },
    PointAdd {
        lhs: CurvePoint,
        rhs: CurvePoint,
        sum: CurvePoint,
    },
    Verdict {
        #[serde(with = "crate::decimal")]
        computed: BigInt,
        #[serde(with = "crate::decimal")]
        expected: BigInt,
        valid: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub index: usize,
    pub title: &'static str,
    pub formula: &'static str,
    /// The formula with the actual numbers substituted in.
    pub substitution: String,
    pub explanation: &'static str,
    pub stage: Stage,
}

/// Ordered, append-only list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<TraceStep>,
    next_index: usize,
}

impl Trace {
    /// Empty trace whose first step gets index 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first_index: usize) -> Self {
        Self {
            steps: Vec::new(),
            next_index: first_index,
        }
    }

    pub fn record(
        &mut self,
        title: &'static str,
        formula: &'static str,
        substitution: String,
        explanation: &'static str,
        stage: Stage,
    ) {
        log::trace!("step {}: {title}: {substitution}", self.next_index);
        self.steps.push(TraceStep {
            index: self.next_index,
            title,
            formula,
            substitution,
            explanation,
            stage,
        });
        self.next_index += 1;
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&TraceStep> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceStep> {
        self.steps.iter()
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceStep;
    type IntoIter = std::slice::Iter<'a, TraceStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.steps.serialize(serializer)
    }
}

/// Outcome of an engine operation together with the trace recorded so far.
///
/// On failure `trace` holds every step completed before the error, including
/// the step that produced the offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traced<T> {
    pub outcome: EngineResult<T>,
    pub trace: Trace,
}

impl<T> Traced<T> {
    /// Runs `stages` against `trace`, keeping whatever was recorded even when
    /// a stage fails.
    pub fn capture(mut trace: Trace, stages: impl FnOnce(&mut Trace) -> EngineResult<T>) -> Self {
        let outcome = stages(&mut trace);
        match &outcome {
            Ok(_) => log::debug!("completed after {} steps", trace.len()),
            Err(err) => log::warn!("stopped after {} steps: {err}", trace.len()),
        }
        Self { outcome, trace }
    }

    /// Failure before any stage ran.
    pub fn rejected(err: EngineError) -> Self {
        log::warn!("rejected before any step: {err}");
        Self {
            outcome: Err(err),
            trace: Trace::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.outcome.as_ref().err()
    }

    /// Drops the trace.
    pub fn into_result(self) -> EngineResult<T> {
        self.outcome
    }
}

impl<T: Serialize> Serialize for Traced<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Success<'a, T: Serialize> {
            status: &'static str,
            #[serde(flatten)]
            payload: &'a T,
            steps: &'a Trace,
        }

        match &self.outcome {
            Ok(payload) => Success {
                status: "success",
                payload,
                steps: &self.trace,
            }
            .serialize(serializer),
            Err(err) => {
                let mut state = serializer.serialize_struct("Traced", 4)?;
                state.serialize_field("status", "error")?;
                state.serialize_field("kind", &err.kind())?;
                state.serialize_field("message", &err.to_string())?;
                state.serialize_field("steps", &self.trace)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_value(trace: &mut Trace, value: i64) {
        trace.record(
            "Compute u₁",
            "u₁ = H(m) × w mod q",
            format!("u₁ = {value}"),
            "",
            Stage::Scalar {
                value: BigInt::from(value),
            },
        );
    }

    #[test]
    fn test_indices_are_sequential() {
        let mut trace = Trace::starting_at(0);
        for v in 0..3 {
            record_value(&mut trace, v);
        }
        let indices: Vec<_> = trace.iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2]);

        let mut trace = Trace::new();
        record_value(&mut trace, 9);
        assert_eq!(trace.last().unwrap().index, 1);
    }

    #[test]
    fn test_capture_keeps_partial_trace() {
        let traced: Traced<()> = Traced::capture(Trace::new(), |trace| {
            record_value(trace, 1);
            record_value(trace, 0);
            Err(EngineError::ZeroSignatureComponent(Component::R))
        });
        assert!(!traced.is_success());
        assert_eq!(traced.trace.len(), 2);
        assert_eq!(
            traced.error(),
            Some(&EngineError::ZeroSignatureComponent(Component::R))
        );
    }

    #[test]
    fn test_rejected_has_empty_trace() {
        let traced: Traced<()> = Traced::rejected(EngineError::InvalidModulus(BigInt::from(0)));
        assert!(traced.trace.is_empty());
        assert!(traced.value().is_none());
    }
}
