//! Shared-region statistics

use serde::{Deserialize, Serialize};

/// Snapshot of region-manager state for the diagnostic surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Number of regions in the registry
    pub total_regions: usize,
    /// Regions with at least one outstanding holder
    pub active_regions: usize,
    /// Sum of declared region sizes in bytes
    pub total_bytes: usize,
    /// Configured advisory ceiling in bytes
    pub advisory_limit_bytes: usize,
}

impl RegionStats {
    /// Fraction of the advisory ceiling currently in use
    pub fn utilization(&self) -> f64 {
        if self.advisory_limit_bytes == 0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.advisory_limit_bytes as f64
    }
}
