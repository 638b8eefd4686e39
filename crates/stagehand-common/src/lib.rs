//! # stagehand-common
//!
//! Shared types for the stagehand crates.
//!
//! This crate provides:
//! - The runtime configuration read from a container's state directory
//! - The on-disk layout of a container state directory
//! - Host paths that can be overridden for testing
//! - The common error type

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod paths;

pub use config::{InterfaceSpec, MountSpec, NamespaceBinds, NamespaceKind, RuntimeConfig};
pub use error::{StagehandError, StagehandResult};
pub use paths::{ContainerPaths, HostPaths};
