//! Composition-root context over the buffer pool and region manager
//!
//! The original system reached both components through process-wide
//! singletons; here they hang off an explicit [`Bridge`] handle constructed
//! once and passed by reference into request handlers, so tests get isolated
//! instances and there is no hidden global state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    error::{BridgeError, Result},
    pool::{BufferLease, BufferPool, PoolConfig, PoolStats},
    region::{RegionConfig, RegionHandle, RegionManager, RegionStats},
};

/// Combined configuration for a [`Bridge`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub pool: PoolConfig,
    pub region: RegionConfig,
}

/// Combined statistics snapshot for health/metrics collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeStats {
    pub pool: PoolStats,
    pub regions: RegionStats,
}

/// A payload staged for worker handoff: a pooled buffer holding the bytes,
/// plus an optional mirrored region consumable by path
#[derive(Debug)]
pub struct StagedPayload {
    lease: BufferLease,
    region: Option<RegionHandle>,
}

impl StagedPayload {
    /// The pooled buffer holding the payload bytes
    pub fn lease(&self) -> &BufferLease {
        &self.lease
    }

    /// Mutable access to the pooled buffer
    pub fn lease_mut(&mut self) -> &mut BufferLease {
        &mut self.lease
    }

    /// The mirrored region, when one was requested
    pub fn region(&self) -> Option<&RegionHandle> {
        self.region.as_ref()
    }

    /// File path to hand to an external worker, when mirrored
    pub fn worker_path(&self) -> Option<&Path> {
        self.region.as_ref().map(|r| r.path())
    }

    /// The staged bytes
    pub fn bytes(&self) -> &[u8] {
        self.lease.as_slice()
    }
}

/// Context owning one buffer pool and one region manager
#[derive(Debug)]
pub struct Bridge {
    pool: BufferPool,
    regions: RegionManager,
}

impl Bridge {
    /// Create a bridge from combined configuration
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            pool: BufferPool::new(config.pool)?,
            regions: RegionManager::new(config.region)?,
        })
    }

    /// The buffer pool
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// The shared-region manager
    pub fn regions(&self) -> &RegionManager {
        &self.regions
    }

    /// Stage an inbound payload for worker handoff
    ///
    /// Acquires a buffer sized to the payload and copies the bytes in; with
    /// `mirror` set, additionally persists them to a shared region whose path
    /// a worker process can consume.
    pub fn stage_payload(&self, payload: &[u8], mirror: bool) -> Result<StagedPayload> {
        if payload.is_empty() {
            return Err(BridgeError::invalid_parameter(
                "payload",
                "Payload cannot be empty",
            ));
        }
        let mut lease = self.pool.acquire(payload.len());
        lease.copy_from_slice(payload);
        let region = if mirror {
            match self.regions.create_region(payload.len(), Some(payload)) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    // The caller never sees a lease to release; hand the
                    // buffer back here or it stays in-use forever
                    self.pool.release(lease.id());
                    return Err(e);
                }
            }
        } else {
            None
        };
        Ok(StagedPayload { lease, region })
    }

    /// Release a staged payload's buffer and region reference
    pub fn release_staged(&self, staged: StagedPayload) -> Result<()> {
        self.pool.release(staged.lease.id());
        if let Some(region) = staged.region {
            self.regions.release_region(region.id())?;
        }
        Ok(())
    }

    /// Combined statistics snapshot
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            pool: self.pool.stats(),
            regions: self.regions.stats(),
        }
    }
}
