//! Optimizer settings.

/// Default ceiling on optimization passes per module.
pub const DEFAULT_MAX_PASSES: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Passes allowed before the optimizer gives up with
    /// [`OptimizationError::NoFixpoint`](crate::OptimizationError::NoFixpoint).
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl OptimizerConfig {
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}
