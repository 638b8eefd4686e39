//! Exposing container namespaces on the host.
//!
//! Namespaces are created elsewhere; this module only binds the namespace
//! files of a running process onto host paths so that other tools
//! (`ip netns`, `nsenter`, ...) can reach them by path.

mod bind;

pub use bind::{bind_namespace, bind_namespaces};
