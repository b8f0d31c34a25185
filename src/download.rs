use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::warn;

use crate::error::Result;

/// Fixed name of the in-flight capture file, in the working directory.
pub const CAPTURE_TEMP_FILE: &str = "sponge.temp";

pub const CAPTURE_BIN: &str = "/usr/local/bin/rtmpdump";

pub const SCANNER_BIN: &str =
    "/Applications/Plex Media Server.app/Contents/MacOS/Plex Media Scanner";

/// Library section the scanner is pointed at.
const SCANNER_SECTION: &str = "4";

/// Removes the capture file when it goes out of scope, on every exit path.
struct TempCapture {
    path: PathBuf,
}

impl Drop for TempCapture {
    fn drop(&mut self) {
        if self.path.is_file() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Captures `source` into `temp_path` and moves the result to `dest`.
///
/// The capture tool is invoked with an argument vector, never through a
/// shell. Success is exit code zero, upon which the temp file is renamed
/// into place; `Ok(false)` reports a nonzero exit. The temp file does not
/// survive this call either way.
pub fn download_stream(
    capture_bin: &Path,
    source: &str,
    temp_path: &Path,
    dest: &Path,
) -> Result<bool> {
    let temp = TempCapture {
        path: temp_path.to_path_buf(),
    };

    let status = Command::new(capture_bin)
        .arg("--quiet")
        .arg("--url")
        .arg(source)
        .arg("--flv")
        .arg(&temp.path)
        .status()?;

    if !status.success() {
        return Ok(false);
    }

    fs::rename(&temp.path, dest)?;
    Ok(true)
}

/// Asks the media server to rescan `dest_dir`. Fire-and-forget: the call
/// waits for the scanner but its exit code is ignored.
pub fn trigger_library_scan(scanner_bin: &Path, dest_dir: &Path) {
    let result = Command::new(scanner_bin)
        .arg("--verbose")
        .arg("--section")
        .arg(SCANNER_SECTION)
        .arg("--scan")
        .arg("--directory")
        .arg(dest_dir)
        .status();

    if let Err(err) = result {
        warn!("could not run library scanner {}: {err}", scanner_bin.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in for the capture tool. It receives the same argument vector
    /// (`--quiet --url <src> --flv <temp>`), so `$5` is the temp file.
    fn fake_capture(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("fake-rtmpdump");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn successful_capture_is_moved_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_capture(dir.path(), "#!/bin/sh\nprintf stream-bytes > \"$5\"\n");
        let temp = dir.path().join("sponge.temp");
        let dest = dir.path().join("SpongeBob - S01E01.mp4");

        let ok = download_stream(&bin, "rtmp://example/stream", &temp, &dest).unwrap();

        assert!(ok);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "stream-bytes");
        assert!(!temp.exists());
    }

    #[test]
    fn failed_capture_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_capture(dir.path(), "#!/bin/sh\nprintf partial > \"$5\"\nexit 3\n");
        let temp = dir.path().join("sponge.temp");
        let dest = dir.path().join("SpongeBob - S01E02.mp4");

        let ok = download_stream(&bin, "rtmp://example/stream", &temp, &dest).unwrap();

        assert!(!ok);
        assert!(!dest.exists());
        assert!(!temp.exists());
    }

    #[test]
    fn capture_tool_failing_to_write_reports_failure_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_capture(dir.path(), "#!/bin/sh\nexit 1\n");
        let temp = dir.path().join("sponge.temp");
        let dest = dir.path().join("SpongeBob - S01E03.mp4");

        let ok = download_stream(&bin, "rtmp://example/stream", &temp, &dest).unwrap();

        assert!(!ok);
        assert!(!dest.exists());
    }

    #[test]
    fn missing_capture_tool_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("sponge.temp");
        let dest = dir.path().join("SpongeBob - S01E04.mp4");

        let result = download_stream(
            Path::new("/nonexistent/rtmpdump"),
            "rtmp://example/stream",
            &temp,
            &dest,
        );

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn scanner_failures_are_ignored() {
        // Nonexistent binary: the trigger logs and returns, nothing more.
        trigger_library_scan(Path::new("/nonexistent/scanner"), Path::new("/tmp"));
    }
}
