//! Environment variable-based configuration for the coroutine runtime.
//!
//! ## `TRELLIS_STACK_SIZE`
//!
//! Stack size in bytes for handler coroutines, accepted in decimal
//! (`16384`) or hexadecimal (`0x4000`). Default: `0x4000` (16 KB).
//!
//! Memory usage scales as stack size times concurrent coroutines, so tune
//! this to handler complexity rather than leaving it large.

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes.
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from the environment, falling back to defaults on
    /// missing or unparsable values.
    pub fn from_env() -> Self {
        let stack_size = match env::var("TRELLIS_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(DEFAULT_STACK_SIZE)
                } else {
                    val.parse().unwrap_or(DEFAULT_STACK_SIZE)
                }
            }
            Err(_) => DEFAULT_STACK_SIZE,
        };
        RuntimeConfig { stack_size }
    }

    /// Apply this configuration to the coroutine runtime.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}
