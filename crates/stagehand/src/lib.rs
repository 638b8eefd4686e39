//! # stagehand
//!
//! Prepares the host side of a container around its runtime: the window
//! between namespace creation and the workload starting, and the teardown
//! after it exits. Linux only; requires root.
//!
//! ## Phases
//!
//! - **Filesystem** ([`filesystem::prepare_filesystem`]): extra host mounts
//!   and directories from `runtime.json`, then the container root, either a
//!   read-only bind of `rootfs` or a writable overlay over `lower`.
//! - **Process** ([`process::prepare_process`]): once the container pid is
//!   known, hand network interfaces to its network namespace and bind its
//!   namespaces onto host paths.
//! - **Cleanup** ([`filesystem::cleanup`]): best effort undo of the
//!   filesystem phase.
//!
//! ## Usage
//!
//! ```no_run
//! use stagehand::filesystem::{SysMounter, prepare_filesystem};
//! use stagehand_common::{ContainerPaths, RuntimeConfig};
//!
//! # fn example() -> stagehand_common::StagehandResult<()> {
//! let paths = ContainerPaths::new("/containers/services/sshd");
//! let config = RuntimeConfig::load(&paths)?;
//! prepare_filesystem(&paths, &config, &SysMounter)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod filesystem;
pub mod namespace;
pub mod process;

#[cfg(test)]
mod testing;

pub use filesystem::{Mounter, RootfsMode, SysMounter, cleanup, prepare_filesystem};
pub use process::prepare_process;
