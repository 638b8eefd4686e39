//! Runtime configuration.
//!
//! The runtime configuration lives in `runtime.json` inside a container's
//! state directory. It describes work done around the container process
//! rather than inside it: extra host mounts, directories to create,
//! network interfaces to hand to the container and namespaces to expose on
//! the host.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StagehandError, StagehandResult};
use crate::paths::ContainerPaths;

/// File name of the runtime configuration inside a state directory.
pub const RUNTIME_CONFIG_FILE: &str = "runtime.json";

/// Runtime configuration for one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Mounts performed before the container is created, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<MountSpec>,
    /// Directories created after the mounts, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mkdir: Vec<PathBuf>,
    /// Interfaces placed into the container network namespace, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceSpec>,
    /// Host paths the container namespaces are bound to.
    #[serde(default, rename = "bindNS")]
    pub bind_ns: NamespaceBinds,
}

impl RuntimeConfig {
    /// Load the runtime configuration from a container state directory.
    ///
    /// A missing `runtime.json` is not an error and yields an empty
    /// configuration.
    pub fn load(paths: &ContainerPaths) -> StagehandResult<Self> {
        Self::from_file(&paths.runtime_config())
    }

    /// Load the runtime configuration from an explicit file.
    pub fn from_file(path: &Path) -> StagehandResult<Self> {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No runtime config, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(StagehandError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        let config: Self =
            serde_json::from_slice(&content).map_err(|e| StagehandError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            mounts = config.mounts.len(),
            mkdir = config.mkdir.len(),
            interfaces = config.interfaces.len(),
            "Loaded runtime config"
        );
        Ok(config)
    }
}

/// A host mount, in OCI `mounts[]` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    /// Mount source (device, path or pseudo source such as `tmpfs`).
    #[serde(default)]
    pub source: String,
    /// Mount target. Created if missing.
    #[serde(default)]
    pub destination: PathBuf,
    /// Filesystem type.
    #[serde(default, rename = "type")]
    pub fs_type: String,
    /// fstab-style options such as `ro`, `nosuid` or `size=10%`.
    #[serde(default)]
    pub options: Vec<String>,
}

/// A network interface to place into the container network namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceSpec {
    /// Interface name. Required.
    #[serde(default)]
    pub name: String,
    /// Link kind to create; empty moves an existing link instead.
    #[serde(default)]
    pub add: String,
    /// Peer name for a veth pair.
    #[serde(default)]
    pub peer: String,
    /// Create the link in the root namespace and move it afterwards.
    #[serde(default)]
    pub create_in_root: bool,
}

/// Namespaces that can be bound onto a host path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    /// Cgroup namespace.
    Cgroup,
    /// IPC namespace.
    Ipc,
    /// Mount namespace.
    Mnt,
    /// Network namespace.
    Net,
    /// PID namespace.
    Pid,
    /// User namespace.
    User,
    /// UTS namespace.
    Uts,
}

impl NamespaceKind {
    /// All kinds, in the order they are bound.
    pub const ALL: [Self; 7] = [
        Self::Cgroup,
        Self::Ipc,
        Self::Mnt,
        Self::Net,
        Self::Pid,
        Self::User,
        Self::Uts,
    ];

    /// Name of the namespace file under `/proc/<pid>/ns`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cgroup => "cgroup",
            Self::Ipc => "ipc",
            Self::Mnt => "mnt",
            Self::Net => "net",
            Self::Pid => "pid",
            Self::User => "user",
            Self::Uts => "uts",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host paths to bind each namespace onto. Unset or empty means the
/// namespace is not exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBinds {
    /// Cgroup namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cgroup: Option<PathBuf>,
    /// IPC namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipc: Option<PathBuf>,
    /// Mount namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnt: Option<PathBuf>,
    /// Network namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<PathBuf>,
    /// PID namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<PathBuf>,
    /// User namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PathBuf>,
    /// UTS namespace target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uts: Option<PathBuf>,
}

impl NamespaceBinds {
    /// The configured target for `kind`, treating an empty path as unset.
    #[must_use]
    pub fn get(&self, kind: NamespaceKind) -> Option<&Path> {
        let path = match kind {
            NamespaceKind::Cgroup => &self.cgroup,
            NamespaceKind::Ipc => &self.ipc,
            NamespaceKind::Mnt => &self.mnt,
            NamespaceKind::Net => &self.net,
            NamespaceKind::Pid => &self.pid,
            NamespaceKind::User => &self.user,
            NamespaceKind::Uts => &self.uts,
        };
        path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Every kind paired with its target, in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (NamespaceKind, Option<&Path>)> + '_ {
        NamespaceKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }
}
