// Launch the desktop's default document viewer

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Open `path` in the platform viewer without waiting for it.
///
/// Returns whether the viewer process started. Failures are only logged.
pub fn open(path: &Path) -> bool {
    let mut cmd = viewer_command(path);
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    match cmd.spawn() {
        Ok(child) => {
            debug!(pid = child.id(), path = %path.display(), "Started viewer");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not start document viewer");
            false
        }
    }
}
