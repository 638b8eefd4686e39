//! Common error types for stagehand.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`StagehandError`].
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Errors raised while preparing a container.
#[derive(Error, Diagnostic, Debug)]
pub enum StagehandError {
    /// The runtime configuration exists but could not be read or parsed.
    #[error("Cannot load runtime config {}: {message}", .path.display())]
    #[diagnostic(
        code(stagehand::config),
        help("runtime.json must be a JSON object with optional mounts, mkdir, interfaces and bindNS fields")
    )]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A mkdir, mount or probe failed while preparing the filesystem.
    #[error("{operation} failed for {}: {source}", .path.display())]
    #[diagnostic(code(stagehand::filesystem))]
    Filesystem {
        /// The operation that failed.
        operation: String,
        /// The path the operation targeted.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// An interface could not be created, found or moved.
    #[error("Interface {interface}: {message}")]
    #[diagnostic(code(stagehand::network))]
    Network {
        /// The interface name.
        interface: String,
        /// What went wrong.
        message: String,
    },

    /// A namespace file could not be bound onto its host path.
    #[error("Cannot bind {namespace} namespace at {}: {source}", .path.display())]
    #[diagnostic(
        code(stagehand::namespace_bind),
        help("The target must be creatable as a regular file and the process must still exist")
    )]
    NamespaceBind {
        /// The namespace kind (net, pid, ...).
        namespace: String,
        /// The host path the namespace was bound to.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// An interface entry has no name.
    #[error("Interface requires a name")]
    #[diagnostic(code(stagehand::network))]
    UnnamedInterface,
}

impl StagehandError {
    /// Wrap an I/O error from a filesystem operation on `path`.
    pub fn filesystem(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Build a network error for `interface`.
    pub fn network(interface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            interface: interface.into(),
            message: message.into(),
        }
    }
}
