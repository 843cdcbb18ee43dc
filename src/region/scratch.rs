//! Scratch-directory lifecycle and termination cleanup
//!
//! Region files must not outlive the process. Normal termination is covered
//! by `Drop` on [`RegionManager`](super::RegionManager); this module covers
//! interrupt/terminate signals by removing every registered scratch directory
//! before re-raising the signal with its default disposition.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use crate::error::Result;

static CLEANUP_DIRS: OnceLock<Mutex<Vec<PathBuf>>> = OnceLock::new();

/// Register a scratch directory for removal on SIGINT/SIGTERM
///
/// Handlers are installed on the first call and shared by every registered
/// directory. Best-effort: the handler runs file removal, which is not
/// async-signal-safe, on the way out of the process.
pub fn register_for_termination_cleanup(dir: &Path) -> Result<()> {
    let dirs = CLEANUP_DIRS.get_or_init(|| Mutex::new(Vec::new()));
    {
        let mut dirs = dirs.lock().unwrap();
        if !dirs.iter().any(|d| d == dir) {
            dirs.push(dir.to_path_buf());
        }
    }
    install_handlers_once()
}

/// Remove every registered scratch directory
pub(crate) fn remove_registered_dirs() {
    if let Some(dirs) = CLEANUP_DIRS.get() {
        if let Ok(dirs) = dirs.lock() {
            for dir in dirs.iter() {
                let _ = std::fs::remove_dir_all(dir);
            }
        }
    }
}

#[cfg(unix)]
fn install_handlers_once() -> Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};

    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

    use crate::error::BridgeError;

    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let action = SigAction::new(
        SigHandler::Handler(handle_termination),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        unsafe { sigaction(sig, &action) }
            .map_err(|e| BridgeError::platform(format!("Failed to install {sig} handler: {e}")))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn install_handlers_once() -> Result<()> {
    Ok(())
}

#[cfg(unix)]
extern "C" fn handle_termination(sig: libc::c_int) {
    remove_registered_dirs();
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
        libc::raise(sig);
    }
}
