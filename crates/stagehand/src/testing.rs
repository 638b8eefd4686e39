//! Test doubles.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use rustix::mount::MountFlags;

use crate::filesystem::Mounter;

/// A recorded mount table operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountCall {
    Mount {
        source: PathBuf,
        target: PathBuf,
        fstype: String,
        flags: MountFlags,
        data: String,
    },
    MakePrivate(PathBuf),
    Unmount(PathBuf),
}

impl MountCall {
    pub fn mount(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> Self {
        Self::Mount {
            source: source.into(),
            target: target.into(),
            fstype: fstype.to_string(),
            flags,
            data: data.to_string(),
        }
    }
}

/// Records calls instead of touching the mount table.
#[derive(Debug, Default)]
pub struct RecordingMounter {
    calls: RefCell<Vec<MountCall>>,
    fail_target: Option<PathBuf>,
    fail_all: bool,
    fail_private: bool,
}

impl RecordingMounter {
    /// Fail any operation on `target`.
    pub fn failing_on(target: &Path) -> Self {
        Self {
            fail_target: Some(target.to_path_buf()),
            ..Self::default()
        }
    }

    /// Fail every operation.
    pub fn failing_all() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Fail only `make_private`; mounts on the same target succeed.
    pub fn failing_make_private() -> Self {
        Self {
            fail_private: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<MountCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, target: &Path, call: MountCall) -> io::Result<()> {
        self.calls.borrow_mut().push(call);
        if self.fail_all || self.fail_target.as_deref() == Some(target) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(())
    }
}

impl Mounter for RecordingMounter {
    fn mount(
        &self,
        source: &Path,
        target: &Path,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> io::Result<()> {
        self.record(target, MountCall::mount(source, target, fstype, flags, data))
    }

    fn make_private(&self, target: &Path) -> io::Result<()> {
        self.record(target, MountCall::MakePrivate(target.to_path_buf()))?;
        if self.fail_private {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        Ok(())
    }

    fn unmount(&self, target: &Path) -> io::Result<()> {
        self.record(target, MountCall::Unmount(target.to_path_buf()))
    }
}
