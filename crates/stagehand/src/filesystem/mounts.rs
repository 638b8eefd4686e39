//! Mount operations.

use std::io;
use std::path::Path;

use rustix::mount::MountFlags;

/// The mount table operations needed to prepare a container.
///
/// Every call maps to a single syscall. Nothing is retried.
pub trait Mounter {
    /// Mount `source` on `target`.
    fn mount(
        &self,
        source: &Path,
        target: &Path,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> io::Result<()>;

    /// Make the mount at `target` private (no propagation in either direction).
    fn make_private(&self, target: &Path) -> io::Result<()>;

    /// Unmount `target`.
    fn unmount(&self, target: &Path) -> io::Result<()>;

    /// Bind mount `source` on `target`.
    fn bind(&self, source: &Path, target: &Path) -> io::Result<()> {
        self.mount(source, target, "", MountFlags::BIND, "")
    }
}

/// [`Mounter`] that issues the real syscalls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysMounter;

impl Mounter for SysMounter {
    fn mount(
        &self,
        source: &Path,
        target: &Path,
        fstype: &str,
        flags: MountFlags,
        data: &str,
    ) -> io::Result<()> {
        use std::ffi::CString;

        tracing::debug!(
            source = %source.display(),
            target = %target.display(),
            fstype,
            ?flags,
            data,
            "Mounting filesystem"
        );

        let fstype = CString::new(fstype)?;
        let data = CString::new(data)?;

        rustix::mount::mount(source, target, fstype.as_c_str(), flags, data.as_c_str())?;
        Ok(())
    }

    fn make_private(&self, target: &Path) -> io::Result<()> {
        use rustix::mount::{MountPropagationFlags, mount_change};

        tracing::debug!(target = %target.display(), "Making mount private");

        mount_change(target, MountPropagationFlags::PRIVATE)?;
        Ok(())
    }

    fn unmount(&self, target: &Path) -> io::Result<()> {
        use rustix::mount::{UnmountFlags, unmount};

        tracing::debug!(target = %target.display(), "Unmounting filesystem");

        unmount(target, UnmountFlags::empty())?;
        Ok(())
    }
}

