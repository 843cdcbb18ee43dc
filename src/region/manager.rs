//! Reference-counted registry of file-backed shared regions

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, SystemTime},
};

use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

use super::{
    config::RegionConfig,
    region::{RegionHandle, SharedRegion},
    scratch,
    stats::RegionStats,
};

/// Manager for file-backed shared regions
///
/// Regions are created with reference count 1; each [`get_region`] increments
/// it, each [`release_region`] decrements it, and reaching zero deletes both
/// the registry entry and the backing file synchronously. A region is present
/// in the registry and on disk together — no orphaned state survives a clean
/// release. [`cleanup`] is the defensive sweep for everything else.
///
/// [`get_region`]: RegionManager::get_region
/// [`release_region`]: RegionManager::release_region
/// [`cleanup`]: RegionManager::cleanup
#[derive(Debug)]
pub struct RegionManager {
    config: RegionConfig,
    scratch_dir: PathBuf,
    regions: Mutex<HashMap<String, SharedRegion>>,
}

impl RegionManager {
    /// Create a new region manager
    ///
    /// The scratch directory is created lazily on first region creation.
    pub fn new(config: RegionConfig) -> Result<Self> {
        config.validate()?;
        let scratch_dir = config.resolve_scratch_dir();
        Ok(Self {
            config,
            scratch_dir,
            regions: Mutex::new(HashMap::new()),
        })
    }

    /// Create a region of `size` bytes, optionally seeded with `data`
    ///
    /// Generates a fresh random identifier, persists the region to a uniquely
    /// named file in the scratch directory, and registers it with reference
    /// count 1. I/O failure is the only hard-failure path in this subsystem
    /// and propagates to the caller.
    pub fn create_region(&self, size: usize, data: Option<&[u8]>) -> Result<RegionHandle> {
        self.ensure_scratch_dir()?;

        let id = generate_region_id();
        let path = self.region_path(&id);
        let region = SharedRegion::create(id.clone(), size, path, data)?;
        let handle = region.handle();

        let mut regions = self.regions.lock().unwrap();
        let total_bytes: usize = regions.values().map(|r| r.size()).sum::<usize>() + size;
        if total_bytes > self.config.max_shared_memory_bytes {
            warn!(
                total_bytes,
                limit = self.config.max_shared_memory_bytes,
                "shared regions exceed advisory memory ceiling"
            );
        }
        debug!(id = %id, size, path = %handle.path().display(), "created shared region");
        regions.insert(id, region);
        Ok(handle)
    }

    /// Look up a region, taking an additional reference
    ///
    /// Increments the reference count and refreshes the last-accessed time.
    /// Unknown identifiers yield `None`, never an error.
    pub fn get_region(&self, id: &str) -> Option<RegionHandle> {
        let mut regions = self.regions.lock().unwrap();
        let region = regions.get_mut(id)?;
        region.ref_count += 1;
        region.last_accessed = SystemTime::now();
        Some(region.handle())
    }

    /// Drop one reference to a region
    ///
    /// Unknown identifiers return `Ok(false)` (idempotent). When the count
    /// reaches zero the backing file and the registry entry are deleted
    /// synchronously. A failed file deletion propagates as an error and
    /// leaves the zero-reference entry registered so a later [`cleanup`]
    /// can retry it.
    ///
    /// [`cleanup`]: RegionManager::cleanup
    pub fn release_region(&self, id: &str) -> Result<bool> {
        let mut regions = self.regions.lock().unwrap();
        let Some(region) = regions.get_mut(id) else {
            return Ok(false);
        };
        region.ref_count = region.ref_count.saturating_sub(1);
        if region.ref_count == 0 {
            region.delete_file()?;
            regions.remove(id);
            debug!(id = %id, "released and deleted shared region");
        }
        Ok(true)
    }

    /// Bounds-checked write into a region's mirror at `offset`
    ///
    /// Returns `Ok(false)` when the identifier is unknown or the range
    /// exceeds the declared size; on success the whole region is re-persisted
    /// so any external reader observes a consistent file image.
    pub fn write_buffer(&self, id: &str, data: &[u8], offset: usize) -> Result<bool> {
        let mut regions = self.regions.lock().unwrap();
        match regions.get_mut(id) {
            Some(region) => region.write(data, offset),
            None => Ok(false),
        }
    }

    /// Bounded read out of a region's mirror
    ///
    /// `len` defaults to everything after `offset`. Does not alter the
    /// reference count or the last-accessed time: read access is not
    /// ownership-extending, asymmetric with [`get_region`] by design.
    ///
    /// [`get_region`]: RegionManager::get_region
    pub fn read_buffer(&self, id: &str, offset: usize, len: Option<usize>) -> Option<Vec<u8>> {
        let regions = self.regions.lock().unwrap();
        regions.get(id)?.read(offset, len)
    }

    /// Defensive sweep against callers that never released correctly
    ///
    /// Reaps registered regions whose reference count is already zero and
    /// whose last-accessed time is older than `max_age`, then removes orphan
    /// files in the scratch directory with no registry entry (leftovers from
    /// a crashed predecessor process). Returns the total reaped count.
    pub fn cleanup(&self, max_age: Duration) -> Result<usize> {
        let mut reaped = 0;

        {
            let mut regions = self.regions.lock().unwrap();
            let stale: Vec<String> = regions
                .values()
                .filter(|r| {
                    r.ref_count == 0 && r.last_accessed.elapsed().unwrap_or_default() >= max_age
                })
                .map(|r| r.id().to_string())
                .collect();
            for id in stale {
                if let Some(region) = regions.get(&id) {
                    region.delete_file()?;
                    regions.remove(&id);
                    debug!(id = %id, "reaped stale shared region");
                    reaped += 1;
                }
            }
        }

        reaped += self.sweep_orphan_files()?;
        Ok(reaped)
    }

    /// Force-delete every region and its file regardless of reference count
    ///
    /// Called on process termination; returns the number purged.
    pub fn purge_all(&self) -> Result<usize> {
        let mut regions = self.regions.lock().unwrap();
        let ids: Vec<String> = regions.keys().cloned().collect();
        let mut purged = 0;
        for id in ids {
            if let Some(region) = regions.get(&id) {
                region.delete_file()?;
                regions.remove(&id);
                purged += 1;
            }
        }
        Ok(purged)
    }

    /// Get current statistics
    pub fn stats(&self) -> RegionStats {
        let regions = self.regions.lock().unwrap();
        RegionStats {
            total_regions: regions.len(),
            active_regions: regions.values().filter(|r| r.ref_count > 0).count(),
            total_bytes: regions.values().map(|r| r.size()).sum(),
            advisory_limit_bytes: self.config.max_shared_memory_bytes,
        }
    }

    /// Number of registered regions
    pub fn len(&self) -> usize {
        self.regions.lock().unwrap().len()
    }

    /// Check if no regions are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a region is registered
    pub fn contains(&self, id: &str) -> bool {
        self.regions.lock().unwrap().contains_key(id)
    }

    /// The scratch directory backing this manager's regions
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Get the manager configuration
    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Register this manager's scratch directory for removal when the
    /// process receives SIGINT or SIGTERM
    pub fn install_termination_hooks(&self) -> Result<()> {
        scratch::register_for_termination_cleanup(&self.scratch_dir)
    }

    fn ensure_scratch_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.scratch_dir)
            .map_err(|e| BridgeError::from_io(e, "Failed to create scratch directory"))
    }

    fn region_path(&self, id: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{}{}.bin", self.config.file_prefix, id))
    }

    /// Remove scratch files that have no registry entry
    fn sweep_orphan_files(&self) -> Result<usize> {
        if !self.scratch_dir.is_dir() {
            return Ok(0);
        }
        let live_paths: Vec<PathBuf> = {
            let regions = self.regions.lock().unwrap();
            regions.values().map(|r| r.path().to_path_buf()).collect()
        };
        let entries = std::fs::read_dir(&self.scratch_dir)
            .map_err(|e| BridgeError::from_io(e, "Failed to read scratch directory"))?;
        let mut swept = 0;
        for entry in entries {
            let entry = entry.map_err(|e| BridgeError::from_io(e, "Failed to read scratch entry"))?;
            let path = entry.path();
            let name = entry.file_name();
            let is_region_file = name
                .to_str()
                .is_some_and(|n| n.starts_with(&self.config.file_prefix) && n.ends_with(".bin"));
            if is_region_file && !live_paths.contains(&path) {
                std::fs::remove_file(&path)
                    .map_err(|e| BridgeError::from_io(e, "Failed to delete orphan region file"))?;
                debug!(path = %path.display(), "swept orphan region file");
                swept += 1;
            }
        }
        Ok(swept)
    }
}

impl Drop for RegionManager {
    fn drop(&mut self) {
        // Best-effort: nothing useful to do with errors on the way out
        if self.purge_all().is_ok() {
            let _ = std::fs::remove_dir(&self.scratch_dir);
        }
    }
}

/// Fresh random 128-bit identifier, hex encoded
fn generate_region_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
