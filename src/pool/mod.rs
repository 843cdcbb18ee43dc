//! Recycling buffer pool for large payload staging
//!
//! The pool keeps a registry of fixed-capacity heap blocks tagged in-use or
//! free and satisfies size-based acquisition requests by reuse (first-fit)
//! when possible, else by growth with LRU eviction at the configured soft
//! ceilings. Entries are addressed by identifiers that are never reused, so a
//! stale identifier always resolves to not-found rather than a dangling
//! reference.

pub mod block;
pub mod config;
pub mod pool;
pub mod stats;

pub use block::BufferLease;
pub use config::PoolConfig;
pub use pool::{BufferInfo, BufferPool};
pub use stats::PoolStats;
