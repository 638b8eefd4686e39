//! Link operations.

use async_trait::async_trait;
use futures::TryStreamExt;
use rtnetlink::packet_route::link::InfoKind;
use rtnetlink::{Handle, LinkMessageBuilder, LinkUnspec, LinkVeth};
use thiserror::Error;

/// Errors from the link layer.
#[derive(Debug, Error)]
pub enum LinkError {
    /// No link with this name exists in the root namespace.
    #[error("no such link: {0}")]
    NotFound(String),

    /// The kernel rejected a netlink request.
    #[error(transparent)]
    Netlink(#[from] rtnetlink::Error),

    /// The netlink socket could not be opened.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Kind of link to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// A veth pair; the named end is the one handed to the container.
    Veth {
        /// Name of the other end.
        peer: String,
    },
    /// Any other kind (`dummy`, `wireguard`, `bridge`, ...), created with
    /// no kind-specific attributes.
    Other(String),
}

impl LinkKind {
    /// The kernel kind string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Veth { .. } => "veth",
            Self::Other(kind) => kind,
        }
    }
}

/// Network namespace a link is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Netns {
    /// The namespace of the calling process.
    Root,
    /// The network namespace of a process.
    Pid(u32),
}

/// Link capability needed to provision interfaces.
#[async_trait]
pub trait LinkOps: Send + Sync {
    /// Create link `name` of `kind` in `netns`.
    async fn create(&self, name: &str, kind: &LinkKind, netns: Netns) -> Result<(), LinkError>;

    /// Find a link in the root namespace, returning its index.
    async fn find(&self, name: &str) -> Result<u32, LinkError>;

    /// Move a root-namespace link into the network namespace of `pid`.
    async fn move_to_netns(&self, name: &str, pid: u32) -> Result<(), LinkError>;
}

/// [`LinkOps`] over an rtnetlink connection.
#[derive(Clone)]
pub struct NetlinkLinks {
    handle: Handle,
}

impl NetlinkLinks {
    /// Open a netlink connection. Must be called within a tokio runtime.
    pub fn connect() -> Result<Self, LinkError> {
        let (connection, handle, _) = rtnetlink::new_connection()?;
        tokio::spawn(connection);
        Ok(Self { handle })
    }
}

fn in_netns<T>(builder: LinkMessageBuilder<T>, netns: Netns) -> LinkMessageBuilder<T> {
    match netns {
        Netns::Root => builder,
        Netns::Pid(pid) => builder.setns_by_pid(pid),
    }
}

#[async_trait]
impl LinkOps for NetlinkLinks {
    async fn create(&self, name: &str, kind: &LinkKind, netns: Netns) -> Result<(), LinkError> {
        tracing::debug!(name, kind = kind.as_str(), ?netns, "Adding link");

        let message = match kind {
            LinkKind::Veth { peer } => in_netns(LinkVeth::new(name, peer), netns).build(),
            LinkKind::Other(kind) => in_netns(
                LinkMessageBuilder::<LinkUnspec>::new_with_info_kind(InfoKind::Other(
                    kind.clone(),
                ))
                .name(name.to_string()),
                netns,
            )
            .build(),
        };

        self.handle.link().add(message).execute().await?;
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<u32, LinkError> {
        tracing::debug!(name, "Looking up link");

        let mut links = self
            .handle
            .link()
            .get()
            .match_name(name.to_string())
            .execute();

        match links.try_next().await? {
            Some(link) => Ok(link.header.index),
            None => Err(LinkError::NotFound(name.to_string())),
        }
    }

    async fn move_to_netns(&self, name: &str, pid: u32) -> Result<(), LinkError> {
        tracing::debug!(name, pid, "Moving link to netns");

        let message = LinkUnspec::new_with_name(name).setns_by_pid(pid).build();
        self.handle.link().set(message).execute().await?;
        Ok(())
    }
}
