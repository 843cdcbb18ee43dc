//! Integration tests for the shared-region manager

use std::time::Duration;

use tempfile::TempDir;

use framebridge::{RegionConfig, RegionManager};

fn test_manager(dir: &TempDir) -> RegionManager {
    let config = RegionConfig::default().with_scratch_dir(dir.path().join("scratch"));
    RegionManager::new(config).unwrap()
}

#[test]
fn create_then_read_roundtrip() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let data: Vec<u8> = (0..255).collect();
    let handle = manager.create_region(data.len(), Some(&data)).unwrap();

    assert_eq!(handle.size(), data.len());
    let read = manager.read_buffer(handle.id(), 0, Some(data.len())).unwrap();
    assert_eq!(read, data);
}

#[test]
fn worker_observes_region_by_path() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let payload = vec![0x42u8; 4096];
    let handle = manager.create_region(payload.len(), Some(&payload)).unwrap();

    // A worker process consumes the region by reading the file path
    let on_disk = std::fs::read(handle.path()).unwrap();
    assert_eq!(on_disk, payload);
}

#[test]
fn create_without_data_is_zero_filled() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let handle = manager.create_region(1024, None).unwrap();
    let read = manager.read_buffer(handle.id(), 0, None).unwrap();
    assert_eq!(read, vec![0u8; 1024]);
    assert_eq!(std::fs::metadata(handle.path()).unwrap().len(), 1024);
}

#[test]
fn create_rejects_oversized_data() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);
    assert!(manager.create_region(4, Some(&[0u8; 8])).is_err());
    assert!(manager.create_region(0, None).is_err());
}

#[test]
fn reference_counting_deletes_at_zero() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let handle = manager.create_region(1024, None).unwrap(); // ref = 1
    let again = manager.get_region(handle.id()).unwrap(); // ref = 2
    assert_eq!(again.id(), handle.id());
    assert_eq!(again.path(), handle.path());

    assert!(manager.release_region(handle.id()).unwrap()); // ref = 1
    assert!(handle.path().exists());
    assert!(manager.contains(handle.id()));

    assert!(manager.release_region(handle.id()).unwrap()); // ref = 0, deleted
    assert!(!handle.path().exists());
    assert!(!manager.contains(handle.id()));
    assert!(manager.get_region(handle.id()).is_none());
}

#[test]
fn release_unknown_region_is_false() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);
    assert!(!manager.release_region("no-such-region").unwrap());
}

#[test]
fn stale_id_after_deletion_is_not_found() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let handle = manager.create_region(64, None).unwrap();
    let id = handle.id().to_string();
    manager.release_region(&id).unwrap();

    assert!(manager.get_region(&id).is_none());
    assert!(!manager.release_region(&id).unwrap());
    assert!(manager.read_buffer(&id, 0, None).is_none());
    assert!(!manager.write_buffer(&id, &[1], 0).unwrap());
}

#[test]
fn write_buffer_updates_mirror_and_file() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let handle = manager.create_region(16, None).unwrap();
    assert!(manager.write_buffer(handle.id(), &[1, 2, 3, 4], 4).unwrap());

    let mirror = manager.read_buffer(handle.id(), 0, None).unwrap();
    let mut expected = vec![0u8; 16];
    expected[4..8].copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(mirror, expected);

    // Whole-file rewrite keeps the on-disk image consistent for readers
    let on_disk = std::fs::read(handle.path()).unwrap();
    assert_eq!(on_disk, expected);
}

#[test]
fn write_buffer_out_of_bounds_is_false_and_untouched() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let handle = manager.create_region(16, Some(&[0xFFu8; 16])).unwrap();
    assert!(!manager.write_buffer(handle.id(), &[0u8; 8], 12).unwrap());
    assert!(!manager.write_buffer(handle.id(), &[0u8; 32], 0).unwrap());

    let mirror = manager.read_buffer(handle.id(), 0, None).unwrap();
    assert_eq!(mirror, vec![0xFFu8; 16]);
    assert_eq!(std::fs::read(handle.path()).unwrap(), vec![0xFFu8; 16]);
}

#[test]
fn read_buffer_bounds_and_default_length() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let data: Vec<u8> = (0..16).collect();
    let handle = manager.create_region(16, Some(&data)).unwrap();

    assert_eq!(
        manager.read_buffer(handle.id(), 4, Some(4)).unwrap(),
        vec![4, 5, 6, 7]
    );
    assert_eq!(manager.read_buffer(handle.id(), 12, None).unwrap(), vec![12, 13, 14, 15]);
    assert!(manager.read_buffer(handle.id(), 12, Some(8)).is_none());
    assert!(manager.read_buffer(handle.id(), 17, None).is_none());
}

#[test]
fn read_does_not_extend_ownership() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let handle = manager.create_region(8, None).unwrap();
    manager.read_buffer(handle.id(), 0, None).unwrap();

    // A single release still reaches zero: reads took no reference
    assert!(manager.release_region(handle.id()).unwrap());
    assert!(!manager.contains(handle.id()));
}

#[test]
fn cleanup_sweeps_orphan_scratch_files() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let live = manager.create_region(1024, None).unwrap();

    // Orphans left behind by a crashed predecessor process
    let scratch = manager.scratch_dir();
    std::fs::write(scratch.join("region_deadbeef.bin"), [0u8; 32]).unwrap();
    std::fs::write(scratch.join("region_cafebabe.bin"), [0u8; 32]).unwrap();
    // Unrelated files are not touched
    std::fs::write(scratch.join("notes.txt"), b"keep").unwrap();

    let reaped = manager.cleanup(Duration::from_secs(3600)).unwrap();
    assert_eq!(reaped, 2);
    assert!(manager.contains(live.id()));
    assert!(live.path().exists());
    assert!(scratch.join("notes.txt").exists());
}

#[test]
fn cleanup_leaves_referenced_regions_intact() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let a = manager.create_region(1024, None).unwrap();
    let b = manager.create_region(1024, None).unwrap();
    let c = manager.create_region(1024, None).unwrap();
    manager.release_region(a.id()).unwrap();
    manager.release_region(b.id()).unwrap();

    let reaped = manager.cleanup(Duration::ZERO).unwrap();
    assert_eq!(reaped, 0); // a and b were already deleted at release
    assert!(manager.contains(c.id()));
    assert!(c.path().exists());
    assert_eq!(manager.len(), 1);
}

#[test]
fn cleanup_reaps_zero_ref_entries_left_by_failed_deletes() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let a = manager.create_region(64, None).unwrap();
    let b = manager.create_region(64, None).unwrap();
    let keep = manager.create_region(64, None).unwrap();

    // Swap the backing files for directories: unlink fails with EISDIR, so
    // releasing to zero leaves the entries registered at reference count 0
    for stale in [&a, &b] {
        std::fs::remove_file(stale.path()).unwrap();
        std::fs::create_dir(stale.path()).unwrap();
        assert!(manager.release_region(stale.id()).is_err());
        assert!(manager.contains(stale.id()));
    }
    let stats = manager.stats();
    assert_eq!(stats.total_regions, 3);
    assert_eq!(stats.active_regions, 1);

    // Restore regular files; the sweep retries the deletions
    for stale in [&a, &b] {
        std::fs::remove_dir(stale.path()).unwrap();
        std::fs::write(stale.path(), [0u8; 64]).unwrap();
    }

    let reaped = manager.cleanup(Duration::ZERO).unwrap();
    assert_eq!(reaped, 2);
    assert!(!manager.contains(a.id()));
    assert!(!manager.contains(b.id()));
    assert!(!a.path().exists());
    assert!(manager.contains(keep.id()));
    assert!(keep.path().exists());
}

#[test]
fn purge_all_force_deletes_held_regions() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let a = manager.create_region(64, None).unwrap();
    let b = manager.create_region(64, None).unwrap();
    manager.get_region(a.id()).unwrap(); // extra holder does not protect it

    assert_eq!(manager.purge_all().unwrap(), 2);
    assert!(manager.is_empty());
    assert!(!a.path().exists());
    assert!(!b.path().exists());
}

#[test]
fn drop_removes_region_files_and_scratch_dir() {
    let dir = TempDir::new().unwrap();
    let scratch = dir.path().join("scratch");
    let path = {
        let manager =
            RegionManager::new(RegionConfig::default().with_scratch_dir(&scratch)).unwrap();
        let handle = manager.create_region(256, None).unwrap();
        handle.path().to_path_buf()
    };
    assert!(!path.exists());
    assert!(!scratch.exists());
}

#[test]
fn advisory_memory_ceiling_is_not_enforced() {
    let dir = TempDir::new().unwrap();
    let config = RegionConfig::default()
        .with_scratch_dir(dir.path().join("scratch"))
        .with_max_shared_memory_bytes(16);
    let manager = RegionManager::new(config).unwrap();

    let handle = manager.create_region(1024, None).unwrap();
    assert!(manager.contains(handle.id()));
    assert!(manager.stats().utilization() > 1.0);
}

#[test]
fn stats_track_totals_and_active_counts() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let a = manager.create_region(100, None).unwrap();
    let _b = manager.create_region(200, None).unwrap();
    manager.get_region(a.id()).unwrap();

    let stats = manager.stats();
    assert_eq!(stats.total_regions, 2);
    assert_eq!(stats.active_regions, 2);
    assert_eq!(stats.total_bytes, 300);
}

#[test]
fn region_files_use_configured_prefix() {
    let dir = TempDir::new().unwrap();
    let config = RegionConfig::default()
        .with_scratch_dir(dir.path().join("scratch"))
        .with_file_prefix("frame_");
    let manager = RegionManager::new(config).unwrap();

    let handle = manager.create_region(32, None).unwrap();
    let name = handle.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("frame_"));
    assert!(name.ends_with(".bin"));
    assert!(handle.path().starts_with(manager.scratch_dir()));
}

#[test]
fn region_ids_are_unique_across_creates() {
    let dir = TempDir::new().unwrap();
    let manager = test_manager(&dir);

    let a = manager.create_region(16, None).unwrap();
    let b = manager.create_region(16, None).unwrap();
    assert_ne!(a.id(), b.id());
    assert_ne!(a.path(), b.path());
}
