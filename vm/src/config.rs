use serde::{Deserialize, Serialize};

/// Default upper bound for memory offsets and lengths.
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 32 * 1024 * 1024;

/// Limits applied by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Offsets or regions ending past this many bytes raise an internal error.
    pub max_memory_bytes: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
        }
    }
}

impl VmConfig {
    pub fn with_max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.max_memory_bytes = max_memory_bytes;
        self
    }
}
