/// Hand URLs and paths to the operating system's default handler
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::state::error::{LedgerError, LedgerResult};

pub fn open_url(url: &str) -> LedgerResult<()> {
    launch(OsStr::new(url))
}

/// Open a proof file or folder. The path must exist.
pub fn open_path(path: &Path) -> LedgerResult<()> {
    if !path.exists() {
        return Err(LedgerError::MissingPath(path.to_path_buf()));
    }
    launch(path.as_os_str())
}

fn launch(target: &OsStr) -> LedgerResult<()> {
    let mut command = opener()?;
    command.arg(target);
    command.spawn().map_err(|e| {
        LedgerError::io(format!("Could not open {}", target.to_string_lossy()), e)
    })?;
    info!(target = %target.to_string_lossy(), "opened with system handler");
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener() -> LedgerResult<Command> {
    let mut command = Command::new("cmd");
    // The empty argument is the window title `start` expects first
    command.args(["/C", "start", ""]);
    Ok(command)
}

#[cfg(target_os = "macos")]
fn opener() -> LedgerResult<Command> {
    Ok(Command::new("open"))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener() -> LedgerResult<Command> {
    Ok(Command::new("xdg-open"))
}

#[cfg(not(any(unix, target_os = "windows")))]
fn opener() -> LedgerResult<Command> {
    Err(LedgerError::Unsupported(
        "Could not open this path automatically on this system.".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_proof_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("proof.zip");
        match open_path(&missing) {
            Err(LedgerError::MissingPath(path)) => assert_eq!(path, missing),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
