//! # Framebridge - Reusable Payload Staging
//!
//! Framebridge moves large binary payloads (image/video frames) between an
//! orchestrating process and out-of-process workers without repeated
//! allocation or text-based serialization per request. It has two cooperating
//! components:
//!
//! - **Buffer pool**: a registry of recycled fixed-capacity memory blocks,
//!   handed out first-fit by size with LRU eviction at soft ceilings.
//! - **Region manager**: named, file-backed regions with an in-process
//!   memory-mapped mirror and reference counting, so a worker can consume a
//!   payload by path while the orchestrator keeps a live view.
//!
//! ## Architecture
//!
//! ```text
//! inbound payload
//!       │
//!       ▼
//! ┌──────────────┐   optional mirror   ┌─────────────────────┐
//! │  BufferPool  │────────────────────▶│    RegionManager    │
//! │  (acquire /  │                     │ (create / refcount /│
//! │   release)   │                     │  cleanup / purge)   │
//! └──────────────┘                     └─────────────────────┘
//!       │                                        │
//!       ▼                                        ▼
//!  raw bytes to worker                 file path to worker
//! ```
//!
//! Both components hang off a [`Bridge`] context built once at the
//! application's composition root. All state is process-local: the pool and
//! the regions are caches/IPC staging areas, not systems of record.

pub mod bridge;
pub mod error;
pub mod pool;
pub mod region;

pub use bridge::{Bridge, BridgeConfig, BridgeStats, StagedPayload};
pub use error::{BridgeError, Result};
pub use pool::{BufferInfo, BufferLease, BufferPool, PoolConfig, PoolStats};
pub use region::{RegionConfig, RegionHandle, RegionManager, RegionStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
