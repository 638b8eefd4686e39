//! # stagehand-network
//!
//! Places network interfaces into a container's network namespace.
//!
//! Interfaces are either created (veth pairs or any other link kind the
//! kernel knows) or taken from the host, and end up in the network
//! namespace of the container process. Link operations go through the
//! [`LinkOps`] trait; [`NetlinkLinks`] implements it over rtnetlink.

#![warn(missing_docs)]

pub mod link;
pub mod provision;

pub use link::{LinkError, LinkKind, LinkOps, NetlinkLinks, Netns};
pub use provision::{LinkPlan, LinkSource, LinkStage, Placement, provision_interfaces};
