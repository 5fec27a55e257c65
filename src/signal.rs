/*!
 * Ctrl-C handling
 */

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CodepackError, Result};

/// Install a Ctrl-C handler and return the flag it sets
///
/// The scanner polls the flag between files and directories and stops with
/// [`crate::error::CodepackError::Interrupted`] once it is set.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| crate::error!(Unexpected, "Failed to set Ctrl-C handler: {}", e))?;

    debug!("Ctrl-C handler installed");
    Ok(interrupted)
}

/// Fail with `Interrupted` if the flag is set, removing `written` first
///
/// Called between output stages so a cancelled run does not leave behind
/// files it already produced.
pub fn ensure_running(interrupted: &AtomicBool, written: &[&Path]) -> Result<()> {
    if !interrupted.load(Ordering::SeqCst) {
        return Ok(());
    }

    for path in written {
        match fs::remove_file(path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", path.display(), e),
        }
    }
    Err(CodepackError::Interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_running_keeps_outputs() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.md");
        fs::write(&output, "doc").unwrap();

        assert!(ensure_running(&AtomicBool::new(false), &[&output]).is_ok());
        assert!(output.exists());
    }

    #[test]
    fn test_interrupt_removes_outputs() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.md");
        let archive = dir.path().join("out.zip");
        fs::write(&output, "doc").unwrap();

        // The archive was never written; a missing file is not an error
        let res = ensure_running(&AtomicBool::new(true), &[&output, &archive]);
        assert!(matches!(res, Err(CodepackError::Interrupted)));
        assert!(!output.exists());
        assert!(!archive.exists());
    }
}
