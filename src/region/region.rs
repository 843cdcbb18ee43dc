//! A single file-backed shared region with an in-process mirror

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    time::SystemTime,
};

use memmap2::{MmapMut, MmapOptions};

use crate::error::{BridgeError, Result};

/// Caller-facing view of a region: everything needed to hand the payload to
/// an out-of-process worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHandle {
    id: String,
    size: usize,
    path: PathBuf,
}

impl RegionHandle {
    /// Region identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared size of the region in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Path of the backing file, consumable by an external worker
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Registry entry for one shared region
///
/// The memory mapping doubles as the in-process mirror buffer; flushing it
/// after a mutation persists the whole region so by-path readers see a
/// consistent file image.
#[derive(Debug)]
pub(crate) struct SharedRegion {
    id: String,
    size: usize,
    path: PathBuf,
    mirror: MmapMut,
    pub(crate) created_at: SystemTime,
    pub(crate) last_accessed: SystemTime,
    pub(crate) ref_count: u32,
}

impl SharedRegion {
    /// Create the backing file sized to `size`, map it, and copy in `data`
    /// if supplied (the file starts zero-filled)
    pub(crate) fn create(
        id: String,
        size: usize,
        path: PathBuf,
        data: Option<&[u8]>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(BridgeError::invalid_parameter(
                "size",
                "Region size must be greater than 0",
            ));
        }
        if let Some(data) = data {
            if data.len() > size {
                return Err(BridgeError::invalid_parameter(
                    "data",
                    "Initial data exceeds declared region size",
                ));
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| BridgeError::from_io(e, "Failed to create region file"))?;
        file.set_len(size as u64)
            .map_err(|e| BridgeError::from_io(e, "Failed to size region file"))?;

        let mut mirror = unsafe {
            MmapOptions::new()
                .len(size)
                .map_mut(&file)
                .map_err(|e| BridgeError::from_io(e, "Failed to map region file"))?
        };

        if let Some(data) = data {
            mirror[..data.len()].copy_from_slice(data);
            mirror
                .flush()
                .map_err(|e| BridgeError::from_io(e, "Failed to flush region file"))?;
        }

        let now = SystemTime::now();
        Ok(Self {
            id,
            size,
            path,
            mirror,
            created_at: now,
            last_accessed: now,
            ref_count: 1,
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn handle(&self) -> RegionHandle {
        RegionHandle {
            id: self.id.clone(),
            size: self.size,
            path: self.path.clone(),
        }
    }

    /// Bounds-checked write into the mirror, re-persisting the whole region
    ///
    /// Returns `Ok(false)` when `offset + data.len()` exceeds the declared
    /// size; the mirror and file are untouched in that case.
    pub(crate) fn write(&mut self, data: &[u8], offset: usize) -> Result<bool> {
        let end = match offset.checked_add(data.len()) {
            Some(end) if end <= self.size => end,
            _ => return Ok(false),
        };
        self.mirror[offset..end].copy_from_slice(data);
        self.mirror
            .flush()
            .map_err(|e| BridgeError::from_io(e, "Failed to flush region file"))?;
        Ok(true)
    }

    /// Bounded copy out of the mirror; `len` defaults to the remainder after
    /// `offset`. `None` when the range falls outside the declared size.
    pub(crate) fn read(&self, offset: usize, len: Option<usize>) -> Option<Vec<u8>> {
        if offset > self.size {
            return None;
        }
        let len = len.unwrap_or(self.size - offset);
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        Some(self.mirror[offset..end].to_vec())
    }

    /// Remove the backing file from disk
    pub(crate) fn delete_file(&self) -> Result<()> {
        std::fs::remove_file(&self.path)
            .map_err(|e| BridgeError::from_io(e, "Failed to delete region file"))
    }
}
