//! Execution configuration

/// Default number of rows between cancellation checks in long loops
pub const DEFAULT_CANCEL_CHECK_INTERVAL: u64 = 64;

/// Configuration shared by every iterator of a query
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Rows between cancellation checks in discard and materialisation loops.
    /// The first row is always checked.
    pub cancel_check_interval: u64,

    /// Measure per-row latency in traced iterators
    pub record_row_timings: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
            record_row_timings: true,
        }
    }
}

impl ExecConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cancellation check interval (at least 1)
    pub fn with_cancel_check_interval(mut self, rows: u64) -> Self {
        self.cancel_check_interval = rows.max(1);
        self
    }

    /// Enable or disable per-row timings
    pub fn with_row_timings(mut self, enabled: bool) -> Self {
        self.record_row_timings = enabled;
        self
    }
}
