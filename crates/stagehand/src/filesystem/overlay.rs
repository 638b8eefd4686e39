//! OverlayFS setup for writable containers.

use std::io;
use std::path::{Path, PathBuf};

use rustix::mount::MountFlags;
use stagehand_common::ContainerPaths;

use super::Mounter;

/// OverlayFS configuration.
#[derive(Debug, Clone)]
pub struct OverlayFs {
    /// Lower directory (read-only layer).
    pub lower_dir: PathBuf,
    /// Upper directory (writable layer).
    pub upper_dir: PathBuf,
    /// Work directory (required by overlayfs).
    pub work_dir: PathBuf,
    /// Merged mount point.
    pub merged_dir: PathBuf,
}

impl OverlayFs {
    /// Overlay of a container's `lower` with upper and work dirs in its
    /// scratch tmpfs, merged onto `rootfs`.
    #[must_use]
    pub fn for_container(paths: &ContainerPaths) -> Self {
        Self {
            lower_dir: paths.lower(),
            upper_dir: paths.upper(),
            work_dir: paths.work(),
            merged_dir: paths.rootfs(),
        }
    }

    /// Get the mount options string.
    #[must_use]
    pub fn mount_options(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower_dir.display(),
            self.upper_dir.display(),
            self.work_dir.display()
        )
    }

    /// Mount the overlay filesystem. Upper and work dirs must exist.
    pub fn mount<M: Mounter + ?Sized>(&self, mounter: &M) -> io::Result<()> {
        let options = self.mount_options();

        tracing::debug!(
            merged = %self.merged_dir.display(),
            options = %options,
            "Mounting overlayfs"
        );

        mounter.mount(
            Path::new("overlay"),
            &self.merged_dir,
            "overlay",
            MountFlags::empty(),
            &options,
        )?;

        tracing::info!(merged = %self.merged_dir.display(), "OverlayFS mounted successfully");
        Ok(())
    }
}
