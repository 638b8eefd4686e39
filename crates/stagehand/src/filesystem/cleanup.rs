//! Best effort teardown of a prepared root filesystem.

use std::io;
use std::path::Path;

use stagehand_common::ContainerPaths;

use super::{Mounter, RootfsMode};

/// Undo [`prepare_filesystem`](super::prepare_filesystem) for a container.
///
/// Works on fully prepared, partially prepared and already cleaned up
/// state directories alike: every step is attempted and failures are only
/// logged.
pub fn cleanup<M: Mounter + ?Sized>(paths: &ContainerPaths, mounter: &M) {
    let mode = RootfsMode::probe(paths).unwrap_or_else(|e| {
        tracing::debug!(root = %paths.root().display(), error = %e, "Cannot probe lower, assuming read-only");
        RootfsMode::ReadOnly
    });

    tracing::debug!(root = %paths.root().display(), ?mode, "Cleaning up root filesystem");

    let rootfs = paths.rootfs();
    match mode {
        RootfsMode::ReadOnly => {
            discard("unmount", &rootfs, mounter.unmount(&rootfs));
        }
        RootfsMode::Writable => {
            let tmp = paths.tmp();
            discard("remove", &rootfs, std::fs::remove_dir_all(&rootfs));
            discard("unmount", &rootfs, mounter.unmount(&rootfs));
            discard("remove", &tmp, std::fs::remove_dir_all(&tmp));
            discard("unmount", &tmp, mounter.unmount(&tmp));
        }
    }
}

fn discard(operation: &str, path: &Path, result: io::Result<()>) {
    if let Err(e) = result {
        tracing::debug!(operation, path = %path.display(), error = %e, "Cleanup step failed");
    }
}
