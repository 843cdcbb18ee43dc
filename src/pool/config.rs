//! Buffer pool configuration

use serde::{Deserialize, Serialize};

/// Configuration for the buffer pool
///
/// The count and memory ceilings are soft limits: reaching one makes
/// [`acquire`](super::BufferPool::acquire) attempt an eviction before
/// allocating, but the pool grows past them rather than reject a caller when
/// every entry is busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of buffers created at pool construction
    pub warm_count: usize,
    /// Capacity of each pre-warmed buffer in bytes
    pub default_buffer_size: usize,
    /// Entry-count ceiling before eviction is attempted
    pub max_buffer_count: usize,
    /// Aggregate-capacity ceiling in bytes before eviction is attempted
    pub max_aggregate_memory: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            warm_count: 4,
            default_buffer_size: 1024 * 1024,
            max_buffer_count: 32,
            max_aggregate_memory: 256 * 1024 * 1024,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the number of pre-warmed buffers
    pub fn with_warm_count(mut self, count: usize) -> Self {
        self.warm_count = count;
        self
    }

    /// Set the pre-warm buffer size
    pub fn with_default_buffer_size(mut self, size: usize) -> Self {
        self.default_buffer_size = size;
        self
    }

    /// Set the entry-count ceiling
    pub fn with_max_buffer_count(mut self, count: usize) -> Self {
        self.max_buffer_count = count;
        self
    }

    /// Set the aggregate-memory ceiling
    pub fn with_max_aggregate_memory(mut self, bytes: usize) -> Self {
        self.max_aggregate_memory = bytes;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::BridgeError;

        if self.default_buffer_size == 0 {
            return Err(BridgeError::invalid_parameter(
                "default_buffer_size",
                "Default buffer size cannot be zero",
            ));
        }

        if self.max_buffer_count == 0 {
            return Err(BridgeError::invalid_parameter(
                "max_buffer_count",
                "Max buffer count cannot be zero",
            ));
        }

        if self.max_aggregate_memory == 0 {
            return Err(BridgeError::invalid_parameter(
                "max_aggregate_memory",
                "Max aggregate memory cannot be zero",
            ));
        }

        if self.warm_count > self.max_buffer_count {
            return Err(BridgeError::invalid_parameter(
                "warm_count",
                "Warm count cannot exceed max buffer count",
            ));
        }

        Ok(())
    }
}
