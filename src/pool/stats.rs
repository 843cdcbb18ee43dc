//! Buffer pool statistics tracking

use serde::{Deserialize, Serialize};

/// Snapshot of pool state for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of entries currently in the registry
    pub total_buffers: usize,
    /// Number of free entries
    pub available_buffers: usize,
    /// Number of entries currently on loan
    pub buffers_in_use: usize,
    /// Sum of capacities over all entries in bytes
    pub total_memory: usize,
    /// Sum of capacities over in-use entries in bytes
    pub used_memory: usize,
    /// Acquisitions satisfied by reusing a free entry
    pub hits: u64,
    /// Acquisitions that required a new allocation
    pub misses: u64,
}

impl PoolStats {
    /// Total number of acquisition requests
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of requests satisfied by reuse, 0.0 before any request
    pub fn hit_rate(&self) -> f64 {
        let total = self.requests();
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "PoolStats {{ buffers: {} ({} free, {} in use), memory: {}/{} bytes, \
             hits: {}, misses: {}, hit_rate: {:.2}% }}",
            self.total_buffers,
            self.available_buffers,
            self.buffers_in_use,
            self.used_memory,
            self.total_memory,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}
