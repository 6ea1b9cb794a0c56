//! Environment-based runtime configuration.
//!
//! - `SWB_STACK_SIZE`: stack size for request coroutines, decimal or
//!   `0x`-prefixed hex. Default `0x4000` (16 KB). Larger stacks support
//!   deeper handler call chains; smaller stacks reduce memory per
//!   concurrent request.
//! - `SWB_POOL_RESERVE`: number of contexts to pre-warm in the pool at
//!   startup. Default 0 (grow on demand).

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for request coroutines in bytes.
    pub stack_size: usize,
    /// Contexts to pre-warm in the dispatcher pool.
    pub pool_reserve: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = match env::var("SWB_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(0x4000)
                } else {
                    val.parse().unwrap_or(0x4000)
                }
            }
            Err(_) => 0x4000,
        };
        let pool_reserve = env::var("SWB_POOL_RESERVE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        RuntimeConfig {
            stack_size,
            pool_reserve,
        }
    }

    /// Apply the coroutine settings to the `may` runtime. Call once at
    /// startup before serving.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}
