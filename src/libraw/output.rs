//! Write-then-rename handling for files produced by the native writers.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::libraw::common::cstr::path_to_cstring;
use crate::libraw::common::error::{DecodeError, Result};

/// A scratch file next to the final destination.
///
/// The native writer fills the scratch path; [`StagedOutput::commit`] moves
/// it into place without clobbering. Dropping an uncommitted output deletes
/// the scratch file, so a failed write leaves nothing behind.
pub struct StagedOutput {
    temp: NamedTempFile,
    target: PathBuf,
    native_path: CString,
}

impl StagedOutput {
    pub fn new(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".libraw-").suffix(".partial");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // umask still applies, matching a plain fopen of the target
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let temp = builder.tempfile_in(dir)?;
        let native_path = path_to_cstring(temp.path())?;
        debug!(scratch = %temp.path().display(), target = %target.display(), "Staging output");

        Ok(Self {
            temp,
            target: target.to_path_buf(),
            native_path,
        })
    }

    /// Path handed to the native writer.
    pub fn native_path(&self) -> &CString {
        &self.native_path
    }

    pub fn scratch_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.temp.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                DecodeError::OutputExists(target.clone())
            } else {
                DecodeError::IoError(e.error)
            }
        })?;
        debug!(target = %target.display(), "Output committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_moves_scratch_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.ppm");

        let staged = StagedOutput::new(&target).unwrap();
        std::fs::write(staged.scratch_path(), b"P6\n1 1\n255\n\0\0\0").unwrap();
        staged.commit().unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"P6\n1 1\n255\n\0\0\0");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_drop_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.jpg");

        {
            let staged = StagedOutput::new(&target).unwrap();
            std::fs::write(staged.scratch_path(), b"partial").unwrap();
        }

        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_commit_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.ppm");

        let staged = StagedOutput::new(&target).unwrap();
        std::fs::write(&target, b"keep me").unwrap();
        std::fs::write(staged.scratch_path(), b"new").unwrap();

        assert!(matches!(staged.commit(), Err(DecodeError::OutputExists(_))));
        assert_eq!(std::fs::read(&target).unwrap(), b"keep me");
    }
}
