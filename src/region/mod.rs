//! File-backed shared regions for cross-process payload handoff
//!
//! A region is a named byte block persisted to a file in a process-local
//! scratch directory, with an in-process memory-mapped mirror and a reference
//! count. Workers consume regions by path; the orchestrator reads and writes
//! through the mirror. Every mutation re-persists the full mapping so an
//! external reader always observes a consistent file image.

pub mod config;
pub mod manager;
pub mod region;
pub mod scratch;
pub mod stats;

pub use config::RegionConfig;
pub use manager::RegionManager;
pub use region::RegionHandle;
pub use stats::RegionStats;
