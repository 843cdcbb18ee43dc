//! First-fit recycling buffer pool with LRU eviction

use std::{
    sync::{Arc, Mutex},
    time::SystemTime,
};

use tracing::{debug, warn};

use crate::error::Result;

use super::{
    block::{Block, BufferLease},
    config::PoolConfig,
    stats::PoolStats,
};

/// One registry entry: a block plus its loan-tracking metadata
#[derive(Debug)]
struct PoolEntry {
    id: u64,
    block: Arc<Block>,
    in_use: bool,
    created_at: SystemTime,
    last_used: SystemTime,
    use_count: u64,
}

impl PoolEntry {
    fn capacity(&self) -> usize {
        self.block.capacity()
    }
}

/// Registry state behind the pool mutex
#[derive(Debug)]
struct PoolState {
    /// Entries in registration order (first-fit scans this order)
    entries: Vec<PoolEntry>,
    /// Next identifier; strictly increasing, never reused
    next_id: u64,
    hits: u64,
    misses: u64,
}

impl PoolState {
    fn total_memory(&self) -> usize {
        self.entries.iter().map(|e| e.capacity()).sum()
    }

    fn register(&mut self, capacity: usize, in_use: bool) -> (u64, Arc<Block>) {
        let id = self.next_id;
        self.next_id += 1;
        let block = Arc::new(Block::new(capacity));
        let now = SystemTime::now();
        self.entries.push(PoolEntry {
            id,
            block: Arc::clone(&block),
            in_use,
            created_at: now,
            last_used: now,
            use_count: if in_use { 1 } else { 0 },
        });
        (id, block)
    }

    /// Index of the least-recently-used free entry, if any
    fn lru_free_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.in_use)
            .min_by_key(|(_, e)| e.last_used)
            .map(|(idx, _)| idx)
    }

    /// Remove the LRU free entry outright; no-op when every entry is busy
    fn evict_lru(&mut self) -> bool {
        match self.lru_free_index() {
            Some(idx) => {
                let entry = self.entries.remove(idx);
                debug!(
                    id = entry.id,
                    capacity = entry.capacity(),
                    "evicted LRU buffer"
                );
                true
            }
            None => false,
        }
    }
}

/// Snapshot of one pool entry for diagnostics and tests
#[derive(Debug, Clone)]
pub struct BufferInfo {
    pub id: u64,
    pub capacity: usize,
    pub in_use: bool,
    pub use_count: u64,
    pub created_at: SystemTime,
    pub last_used: SystemTime,
}

/// A pool of reusable byte buffers for payload staging
///
/// `acquire` never fails and never blocks: when the configured ceilings are
/// reached the pool attempts one LRU eviction, and if every entry is busy it
/// grows past the ceilings instead of rejecting the caller. The ceilings are
/// soft limits by design.
#[derive(Debug)]
pub struct BufferPool {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

impl BufferPool {
    /// Create a pool, pre-warming `warm_count` entries of `default_buffer_size`
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let mut state = PoolState {
            entries: Vec::new(),
            next_id: 1,
            hits: 0,
            misses: 0,
        };
        for _ in 0..config.warm_count {
            state.register(config.default_buffer_size, false);
        }

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    /// Acquire a buffer of exactly `size` bytes
    ///
    /// First-fit scan in registration order over free entries with capacity
    /// `>= size`; on a miss a new entry with capacity exactly `size` is
    /// allocated, its contents garbage until overwritten.
    ///
    /// Panics if `size` is zero (caller contract violation).
    pub fn acquire(&self, size: usize) -> BufferLease {
        assert!(size > 0, "buffer size must be positive");

        let mut state = self.state.lock().unwrap();

        if let Some(idx) = state
            .entries
            .iter()
            .position(|e| !e.in_use && e.capacity() >= size)
        {
            let entry = &mut state.entries[idx];
            entry.in_use = true;
            entry.use_count += 1;
            entry.last_used = SystemTime::now();
            let lease = BufferLease::new(entry.id, Arc::clone(&entry.block), size, true);
            state.hits += 1;
            return lease;
        }

        state.misses += 1;

        let at_count_ceiling = state.entries.len() >= self.config.max_buffer_count;
        let at_memory_ceiling = state.total_memory() + size > self.config.max_aggregate_memory;
        if at_count_ceiling || at_memory_ceiling {
            // One attempt; every-entry-busy means the pool grows instead
            if !state.evict_lru() {
                warn!(
                    entries = state.entries.len(),
                    total_memory = state.total_memory(),
                    requested = size,
                    "buffer pool growing past configured ceiling, all entries busy"
                );
            }
        }

        let (id, block) = state.register(size, true);
        BufferLease::new(id, block, size, false)
    }

    /// Return a buffer to the pool
    ///
    /// Idempotent: unknown identifiers return `false` with no side effect.
    /// The underlying allocation stays resident for future reuse.
    pub fn release(&self, id: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.in_use = false;
                entry.last_used = SystemTime::now();
                true
            }
            None => false,
        }
    }

    /// Remove free entries in ascending last-used order until the registry
    /// holds `target_count` entries or no free entries remain
    ///
    /// Never touches in-use entries. Returns the number removed.
    pub fn shrink(&self, target_count: usize) -> usize {
        let mut state = self.state.lock().unwrap();
        let mut removed = 0;
        while state.entries.len() > target_count {
            if !state.evict_lru() {
                break;
            }
            removed += 1;
        }
        removed
    }

    /// Drop every currently-free entry, keeping in-use ones
    pub fn cleanup(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        state.entries.retain(|e| e.in_use);
        before - state.entries.len()
    }

    /// Get current statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock().unwrap();
        let buffers_in_use = state.entries.iter().filter(|e| e.in_use).count();
        let used_memory = state
            .entries
            .iter()
            .filter(|e| e.in_use)
            .map(|e| e.capacity())
            .sum();
        PoolStats {
            total_buffers: state.entries.len(),
            available_buffers: state.entries.len() - buffers_in_use,
            buffers_in_use,
            total_memory: state.total_memory(),
            used_memory,
            hits: state.hits,
            misses: state.misses,
        }
    }

    /// Reset the hit/miss counters
    pub fn reset_stats(&self) {
        let mut state = self.state.lock().unwrap();
        state.hits = 0;
        state.misses = 0;
    }

    /// Snapshot every entry for diagnostics
    pub fn buffers(&self) -> Vec<BufferInfo> {
        let state = self.state.lock().unwrap();
        state
            .entries
            .iter()
            .map(|e| BufferInfo {
                id: e.id,
                capacity: e.capacity(),
                in_use: e.in_use,
                use_count: e.use_count,
                created_at: e.created_at,
                last_used: e.last_used,
            })
            .collect()
    }

    /// Number of entries in the registry
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
