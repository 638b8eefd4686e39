//! Root filesystem setup.
//!
//! A container state directory holds either a plain `rootfs` (read-only
//! container) or a `lower` layer that gets an overlay with a tmpfs-backed
//! upper layer mounted on `rootfs` (writable container). Which one applies
//! is decided by looking for `lower`; nothing is recorded between prepare
//! and cleanup.

use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use rustix::mount::MountFlags;
use stagehand_common::{ContainerPaths, RuntimeConfig, StagehandError, StagehandResult};

use super::{MountOptions, Mounter, OverlayFs, create_dir_all};

/// Size cap of the scratch tmpfs, relative to memory.
const TMPFS_SIZE: &str = "size=10%";

/// How the container root filesystem is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootfsMode {
    /// `rootfs` is used as is, bind mounted onto itself.
    ReadOnly,
    /// An overlay of `lower` and a tmpfs upper is mounted on `rootfs`.
    Writable,
}

impl RootfsMode {
    /// Decide the mode from the presence of `lower`.
    pub fn probe(paths: &ContainerPaths) -> io::Result<Self> {
        match std::fs::metadata(paths.lower()) {
            Ok(_) => Ok(Self::Writable),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::ReadOnly),
            Err(e) => Err(e),
        }
    }
}

/// Prepare the filesystem before the container is created.
///
/// Runs the configured mounts, then the configured mkdirs (so a directory
/// can be made under a mount), then sets up `rootfs`. Stops at the first
/// failure; the caller is expected to run [`cleanup`](super::cleanup) after
/// a failure since earlier steps are not undone.
pub fn prepare_filesystem<M: Mounter + ?Sized>(
    paths: &ContainerPaths,
    config: &RuntimeConfig,
    mounter: &M,
) -> StagehandResult<RootfsMode> {
    for spec in &config.mounts {
        create_dir_all(&spec.destination).map_err(|e| {
            StagehandError::filesystem("create mount destination", &spec.destination, e)
        })?;

        let options = MountOptions::parse(spec.options.as_slice());
        mounter
            .mount(
                Path::new(&spec.source),
                &spec.destination,
                &spec.fs_type,
                options.flags,
                &options.data,
            )
            .map_err(|e| {
                StagehandError::filesystem(format!("mount {}", spec.source), &spec.destination, e)
            })?;
    }

    for dir in &config.mkdir {
        create_dir_all(dir).map_err(|e| StagehandError::filesystem("mkdir", dir, e))?;
    }

    let mode = RootfsMode::probe(paths)
        .map_err(|e| StagehandError::filesystem("stat", paths.lower(), e))?;

    tracing::debug!(root = %paths.root().display(), ?mode, "Preparing root filesystem");

    match mode {
        RootfsMode::ReadOnly => prepare_readonly(paths, mounter)?,
        RootfsMode::Writable => prepare_writable(paths, mounter)?,
    }

    Ok(mode)
}

/// Make `rootfs` a mount point; OCI runtimes refuse a root that is not one.
fn prepare_readonly<M: Mounter + ?Sized>(
    paths: &ContainerPaths,
    mounter: &M,
) -> StagehandResult<()> {
    let rootfs = paths.rootfs();
    mounter
        .bind(&rootfs, &rootfs)
        .map_err(|e| StagehandError::filesystem("bind mount", &rootfs, e))
}

fn prepare_writable<M: Mounter + ?Sized>(
    paths: &ContainerPaths,
    mounter: &M,
) -> StagehandResult<()> {
    let tmp = paths.tmp();
    create_dir_all(&tmp).map_err(|e| StagehandError::filesystem("mkdir", &tmp, e))?;

    mount_tmpfs(&tmp, mounter)?;

    // Not recursive: both must be new on the fresh tmpfs.
    for dir in [paths.upper(), paths.work()] {
        DirBuilder::new()
            .mode(0o755)
            .create(&dir)
            .map_err(|e| StagehandError::filesystem("mkdir", &dir, e))?;
    }

    let overlay = OverlayFs::for_container(paths);
    overlay
        .mount(mounter)
        .map_err(|e| StagehandError::filesystem("overlay mount", &overlay.merged_dir, e))
}

/// Mount the scratch tmpfs, private to this mount namespace.
fn mount_tmpfs<M: Mounter + ?Sized>(target: &Path, mounter: &M) -> StagehandResult<()> {
    tracing::debug!(target = %target.display(), options = TMPFS_SIZE, "Mounting tmpfs");

    mounter
        .mount(
            Path::new("tmpfs"),
            target,
            "tmpfs",
            MountFlags::empty(),
            TMPFS_SIZE,
        )
        .map_err(|e| StagehandError::filesystem("tmpfs mount", target, e))?;

    mounter
        .make_private(target)
        .map_err(|e| StagehandError::filesystem("make private", target, e))
}
