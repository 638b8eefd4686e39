//! Interface provisioning.
//!
//! Each configured interface becomes a [`LinkPlan`]: where the link comes
//! from ([`LinkSource`]) and where it is created ([`Placement`]). Applying
//! a plan walks the link through its [`LinkStage`]s until it sits in the
//! container network namespace.
//!
//! Veth pairs and links flagged `createInRoot` are created in the root
//! namespace and moved afterwards, so that the peer (or whatever the link
//! is attached to) stays on the host side.

use stagehand_common::{InterfaceSpec, StagehandError, StagehandResult};

use crate::link::{LinkKind, LinkOps, Netns};

/// Where a link comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSource {
    /// An existing link in the root namespace.
    Existing,
    /// A new link of the given kind.
    Create(LinkKind),
}

/// Where a new link is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Directly in the container network namespace.
    Target,
    /// In the root namespace, then moved into the container.
    RootThenMove,
}

/// Where a link currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    /// In the root namespace; still has to be moved.
    InRoot,
    /// In the container network namespace.
    InTarget,
}

/// A validated plan for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// Interface name.
    pub name: String,
    /// Where the link comes from.
    pub source: LinkSource,
    /// Where the link is created.
    pub placement: Placement,
}

impl LinkPlan {
    /// Validate an interface spec and turn it into a plan.
    ///
    /// A `peer` without an `add` kind implies a veth pair.
    pub fn from_spec(spec: &InterfaceSpec) -> StagehandResult<Self> {
        if spec.name.is_empty() {
            return Err(StagehandError::UnnamedInterface);
        }

        let add = if !spec.peer.is_empty() && spec.add.is_empty() {
            "veth"
        } else {
            spec.add.as_str()
        };

        let source = match add {
            "" => LinkSource::Existing,
            "veth" => {
                if spec.peer.is_empty() {
                    return Err(StagehandError::network(
                        &spec.name,
                        "Creating a veth pair requires a peer to be set",
                    ));
                }
                LinkSource::Create(LinkKind::Veth {
                    peer: spec.peer.clone(),
                })
            }
            other => LinkSource::Create(LinkKind::Other(other.to_string())),
        };

        let placement = match &source {
            LinkSource::Existing | LinkSource::Create(LinkKind::Veth { .. }) => {
                Placement::RootThenMove
            }
            LinkSource::Create(_) if spec.create_in_root => Placement::RootThenMove,
            LinkSource::Create(_) => Placement::Target,
        };

        Ok(Self {
            name: spec.name.clone(),
            source,
            placement,
        })
    }

    /// First phase: create the link, or locate the existing one.
    pub async fn acquire<L>(&self, links: &L, pid: u32) -> StagehandResult<LinkStage>
    where
        L: LinkOps + ?Sized,
    {
        match &self.source {
            LinkSource::Existing => {
                links.find(&self.name).await.map_err(|e| {
                    StagehandError::network(&self.name, format!("Cannot find interface: {e}"))
                })?;
                Ok(LinkStage::InRoot)
            }
            LinkSource::Create(kind) => {
                let netns = match self.placement {
                    Placement::Target => Netns::Pid(pid),
                    Placement::RootThenMove => Netns::Root,
                };
                links.create(&self.name, kind, netns).await.map_err(|e| {
                    StagehandError::network(
                        &self.name,
                        format!("Link add of type {} failed: {e}", kind.as_str()),
                    )
                })?;
                tracing::info!(interface = %self.name, kind = kind.as_str(), "Created interface");

                Ok(match netns {
                    Netns::Root => LinkStage::InRoot,
                    Netns::Pid(_) => LinkStage::InTarget,
                })
            }
        }
    }

    /// Second phase: move a root-namespace link into the container.
    pub async fn settle<L>(&self, stage: LinkStage, links: &L, pid: u32) -> StagehandResult<LinkStage>
    where
        L: LinkOps + ?Sized,
    {
        if stage == LinkStage::InTarget {
            return Ok(stage);
        }

        links.move_to_netns(&self.name, pid).await.map_err(|e| {
            StagehandError::network(
                &self.name,
                format!("Cannot move interface into namespace: {e}"),
            )
        })?;
        tracing::info!(interface = %self.name, pid, "Moved interface");

        Ok(LinkStage::InTarget)
    }

    /// Run both phases.
    pub async fn apply<L>(&self, links: &L, pid: u32) -> StagehandResult<()>
    where
        L: LinkOps + ?Sized,
    {
        let stage = self.acquire(links, pid).await?;
        self.settle(stage, links, pid).await?;
        Ok(())
    }
}

/// Place every interface into the network namespace of `pid`, in order.
///
/// Stops at the first failure. Interfaces handled before the failure are
/// left where they are.
pub async fn provision_interfaces<L>(
    interfaces: &[InterfaceSpec],
    pid: u32,
    links: &L,
) -> StagehandResult<()>
where
    L: LinkOps + ?Sized,
{
    for spec in interfaces {
        LinkPlan::from_spec(spec)?.apply(links, pid).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::link::LinkError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(String, String, Netns),
        Find(String),
        Move(String, u32),
    }

    /// Records link calls; `host` holds the links present in the root namespace.
    #[derive(Default)]
    struct FakeLinks {
        host: HashSet<String>,
        fail_create: HashSet<String>,
        fail_move: HashSet<String>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeLinks {
        fn with_host(names: &[&str]) -> Self {
            Self {
                host: names.iter().map(ToString::to_string).collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LinkOps for FakeLinks {
        async fn create(&self, name: &str, kind: &LinkKind, netns: Netns) -> Result<(), LinkError> {
            self.calls.lock().unwrap().push(Call::Create(
                name.to_string(),
                kind.as_str().to_string(),
                netns,
            ));
            if self.fail_create.contains(name) {
                return Err(LinkError::Io(std::io::Error::from(
                    std::io::ErrorKind::AlreadyExists,
                )));
            }
            Ok(())
        }

        async fn find(&self, name: &str) -> Result<u32, LinkError> {
            self.calls.lock().unwrap().push(Call::Find(name.to_string()));
            if self.host.contains(name) {
                Ok(7)
            } else {
                Err(LinkError::NotFound(name.to_string()))
            }
        }

        async fn move_to_netns(&self, name: &str, pid: u32) -> Result<(), LinkError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Move(name.to_string(), pid));
            if self.fail_move.contains(name) {
                return Err(LinkError::NotFound(name.to_string()));
            }
            Ok(())
        }
    }

    fn iface(name: &str, add: &str, peer: &str, create_in_root: bool) -> InterfaceSpec {
        InterfaceSpec {
            name: name.to_string(),
            add: add.to_string(),
            peer: peer.to_string(),
            create_in_root,
        }
    }

    #[test]
    fn peer_implies_veth_in_root() {
        let plan = LinkPlan::from_spec(&iface("eth0", "", "veth-host", false)).unwrap();
        assert_eq!(
            plan.source,
            LinkSource::Create(LinkKind::Veth {
                peer: "veth-host".to_string()
            })
        );
        assert_eq!(plan.placement, Placement::RootThenMove);
    }

    #[test]
    fn other_kind_placement_follows_create_in_root() {
        let direct = LinkPlan::from_spec(&iface("wg0", "wireguard", "", false)).unwrap();
        assert_eq!(direct.placement, Placement::Target);

        let rooted = LinkPlan::from_spec(&iface("wg0", "wireguard", "", true)).unwrap();
        assert_eq!(rooted.placement, Placement::RootThenMove);
    }

    #[tokio::test]
    async fn veth_is_created_in_root_then_moved() {
        let links = FakeLinks::default();
        provision_interfaces(&[iface("eth0", "veth", "veth0", false)], 100, &links)
            .await
            .unwrap();

        assert_eq!(
            links.calls(),
            vec![
                Call::Create("eth0".into(), "veth".into(), Netns::Root),
                Call::Move("eth0".into(), 100),
            ]
        );
    }

    #[tokio::test]
    async fn other_kind_is_created_in_target() {
        let links = FakeLinks::default();
        provision_interfaces(&[iface("dummy0", "dummy", "", false)], 100, &links)
            .await
            .unwrap();

        assert_eq!(
            links.calls(),
            vec![Call::Create("dummy0".into(), "dummy".into(), Netns::Pid(100))]
        );
    }

    #[tokio::test]
    async fn existing_link_is_found_and_moved() {
        let links = FakeLinks::with_host(&["eth1"]);
        provision_interfaces(&[iface("eth1", "", "", false)], 9, &links)
            .await
            .unwrap();

        assert_eq!(
            links.calls(),
            vec![Call::Find("eth1".into()), Call::Move("eth1".into(), 9)]
        );
    }

    #[tokio::test]
    async fn missing_existing_link_fails_without_move() {
        let links = FakeLinks::default();
        let err = provision_interfaces(&[iface("eth1", "", "", false)], 9, &links)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Interface eth1: Cannot find interface: no such link: eth1"
        );
        assert_eq!(links.calls(), vec![Call::Find("eth1".into())]);
    }

    #[tokio::test]
    async fn veth_without_peer_fails_before_any_link_call() {
        let links = FakeLinks::default();
        let err = provision_interfaces(&[iface("eth0", "veth", "", false)], 1, &links)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("requires a peer"));
        assert!(links.calls().is_empty());
    }

    #[tokio::test]
    async fn create_failure_names_interface_and_kind() {
        let mut links = FakeLinks::default();
        links.fail_create.insert("wg0".to_string());

        let err = provision_interfaces(&[iface("wg0", "wireguard", "", true)], 1, &links)
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("wg0"));
        assert!(msg.contains("wireguard"));
        // Nothing to move after a failed create.
        assert_eq!(links.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_in_root_creates_in_root_then_moves() {
        let links = FakeLinks::default();
        provision_interfaces(&[iface("wg0", "wireguard", "", true)], 77, &links)
            .await
            .unwrap();

        assert_eq!(
            links.calls(),
            vec![
                Call::Create("wg0".into(), "wireguard".into(), Netns::Root),
                Call::Move("wg0".into(), 77),
            ]
        );
    }

    #[tokio::test]
    async fn move_failure_stops_remaining_interfaces() {
        let mut links = FakeLinks::default();
        links.fail_move.insert("wg0".to_string());
        let interfaces = [
            iface("wg0", "wireguard", "", true),
            iface("d1", "dummy", "", false),
        ];

        let err = provision_interfaces(&interfaces, 12, &links).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Interface wg0: Cannot move interface into namespace: no such link: wg0"
        );
        assert_eq!(
            links.calls(),
            vec![
                Call::Create("wg0".into(), "wireguard".into(), Netns::Root),
                Call::Move("wg0".into(), 12),
            ]
        );
    }

    #[tokio::test]
    async fn empty_name_stops_processing_without_rollback() {
        let links = FakeLinks::default();
        let interfaces = [
            iface("eth0", "", "veth0", false),
            iface("", "dummy", "", false),
            iface("dummy1", "dummy", "", false),
        ];

        let err = provision_interfaces(&interfaces, 5, &links).await.unwrap_err();

        assert!(matches!(err, StagehandError::UnnamedInterface));
        // The first interface stays in place, the third is never touched.
        assert_eq!(
            links.calls(),
            vec![
                Call::Create("eth0".into(), "veth".into(), Netns::Root),
                Call::Move("eth0".into(), 5),
            ]
        );
    }

    #[tokio::test]
    async fn settle_is_a_no_op_in_target() {
        let links = FakeLinks::default();
        let plan = LinkPlan::from_spec(&iface("dummy0", "dummy", "", false)).unwrap();

        let stage = plan.settle(LinkStage::InTarget, &links, 3).await.unwrap();

        assert_eq!(stage, LinkStage::InTarget);
        assert!(links.calls().is_empty());
    }
}
