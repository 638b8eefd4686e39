//! Filesystem preparation for containers.
//!
//! This module handles:
//! - fstab-style option parsing
//! - Mount operations
//! - Root filesystem setup (read-only bind or writable overlay)
//! - Teardown

mod cleanup;
mod mounts;
mod options;
mod overlay;
mod rootfs;

use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

pub use cleanup::cleanup;
pub use mounts::{Mounter, SysMounter};
pub use options::MountOptions;
pub use overlay::OverlayFs;
pub use rootfs::{RootfsMode, prepare_filesystem};

/// `mkdir -p` with mode 0755.
pub(crate) fn create_dir_all(path: &Path) -> io::Result<()> {
    DirBuilder::new().recursive(true).mode(0o755).create(path)
}
