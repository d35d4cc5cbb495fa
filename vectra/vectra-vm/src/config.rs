//! Interpreter configuration.

/// Default marker the entry method's name must end with.
pub const DEFAULT_ENTRY_SUFFIX: &str = "::Main()";

/// Default limit on nested CALL/CALL_CTOR invocations.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// `run` starts at the first Method constant whose name ends with this.
    pub entry_suffix: String,
    /// Calls nested deeper than this fail with `Trap::CallDepthExceeded`.
    pub max_call_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            entry_suffix: DEFAULT_ENTRY_SUFFIX.to_string(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl VmConfig {
    pub fn with_entry_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.entry_suffix = suffix.into();
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
