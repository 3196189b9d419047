use serde::{Deserialize, Serialize};

/// Number of double-and-add records kept per scalar multiplication step.
pub const DEFAULT_SCALAR_STEP_PREVIEW: usize = 5;

/// Tunables shared by the DSA and ECDSA engines.
///
/// These only shape the recorded trace, never the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many bit records of each scalar multiplication are kept in the
    /// trace. The total bit count is always reported.
    pub scalar_step_preview: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scalar_step_preview: DEFAULT_SCALAR_STEP_PREVIEW,
        }
    }
}

impl EngineConfig {
    pub fn with_scalar_step_preview(mut self, limit: usize) -> Self {
        self.scalar_step_preview = limit;
        self
    }
}
