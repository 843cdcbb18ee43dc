//! Basic usage of the framebridge staging subsystem

use framebridge::{Bridge, BridgeConfig, PoolConfig, RegionConfig, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("Framebridge Payload Staging Example");
    println!("===================================");

    let config = BridgeConfig {
        pool: PoolConfig::default()
            .with_warm_count(4)
            .with_default_buffer_size(1024 * 1024),
        region: RegionConfig::default(),
    };
    let bridge = Bridge::new(config)?;
    bridge.regions().install_termination_hooks()?;

    // A fake 1280x720 grayscale frame arriving from a capture source
    let frame = vec![0x80u8; 1280 * 720];
    println!("Staging a {} byte frame...", frame.len());

    let staged = bridge.stage_payload(&frame, true)?;
    let path = staged.worker_path().expect("mirror was requested");
    println!("  buffer id:   {}", staged.lease().id());
    println!("  reused:      {}", staged.lease().reused());
    println!("  worker path: {}", path.display());

    // A worker process would consume the region by path; simulate it here
    let worker_view = std::fs::read(path)
        .map_err(|e| framebridge::BridgeError::from_io(e, "Worker failed to read region"))?;
    println!("  worker read {} bytes back", worker_view.len());
    assert_eq!(worker_view, frame);

    bridge.release_staged(staged)?;

    // A second frame of the same size reuses the pooled buffer
    let staged = bridge.stage_payload(&frame, false)?;
    println!(
        "Second frame reused a pooled buffer: {}",
        staged.lease().reused()
    );
    bridge.release_staged(staged)?;

    let stats = bridge.stats();
    println!("\n{}", stats.pool.summary());
    println!(
        "Regions: {} total, {} active, {} bytes",
        stats.regions.total_regions, stats.regions.active_regions, stats.regions.total_bytes
    );

    Ok(())
}
