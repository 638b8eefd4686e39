//! Standard filesystem paths for stagehand.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use crate::config::{NamespaceKind, RUNTIME_CONFIG_FILE};

/// Default procfs mount point, overridable with `STAGEHAND_PROC_ROOT`.
pub static PROC_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("STAGEHAND_PROC_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/proc"))
});

/// Well-known host locations used while preparing a container.
#[derive(Debug, Clone)]
pub struct HostPaths {
    /// Where procfs is mounted (default: /proc).
    pub proc_root: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self {
            proc_root: PROC_ROOT.clone(),
        }
    }
}

impl HostPaths {
    /// Create paths with default locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom procfs root.
    #[must_use]
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    /// The namespace file of `kind` for process `pid`.
    #[must_use]
    pub fn namespace_file(&self, pid: u32, kind: NamespaceKind) -> PathBuf {
        self.proc_root
            .join(pid.to_string())
            .join("ns")
            .join(kind.as_str())
    }
}

/// Layout of a container state directory.
///
/// ```text
/// <root>/
///   runtime.json   optional runtime config
///   lower/         read-only base layer; present means writable mode
///   rootfs/        container root, always made a mount point
///   tmp/           tmpfs scratch space (writable mode only)
///     upper/
///     work/
/// ```
#[derive(Debug, Clone)]
pub struct ContainerPaths {
    root: PathBuf,
}

impl ContainerPaths {
    /// Paths for the state directory at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The state directory itself.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runtime config file.
    #[must_use]
    pub fn runtime_config(&self) -> PathBuf {
        self.root.join(RUNTIME_CONFIG_FILE)
    }

    /// Read-only lower layer.
    #[must_use]
    pub fn lower(&self) -> PathBuf {
        self.root.join("lower")
    }

    /// Container root filesystem mount point.
    #[must_use]
    pub fn rootfs(&self) -> PathBuf {
        self.root.join("rootfs")
    }

    /// Scratch tmpfs mount point.
    #[must_use]
    pub fn tmp(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Overlay upper directory (inside the tmpfs).
    #[must_use]
    pub fn upper(&self) -> PathBuf {
        self.tmp().join("upper")
    }

    /// Overlay work directory (inside the tmpfs).
    #[must_use]
    pub fn work(&self) -> PathBuf {
        self.tmp().join("work")
    }
}
