//! Preparation once the container process exists.

use stagehand_common::{HostPaths, RuntimeConfig, StagehandResult};
use stagehand_network::{LinkOps, provision_interfaces};

use crate::filesystem::Mounter;
use crate::namespace::bind_namespaces;

/// Set up what needs the container process but must happen before it runs:
/// interfaces first, then namespace binds.
pub async fn prepare_process<L, M>(
    pid: u32,
    config: &RuntimeConfig,
    links: &L,
    host: &HostPaths,
    mounter: &M,
) -> StagehandResult<()>
where
    L: LinkOps + ?Sized,
    M: Mounter + ?Sized,
{
    tracing::debug!(
        pid,
        interfaces = config.interfaces.len(),
        "Preparing container process"
    );

    provision_interfaces(&config.interfaces, pid, links).await?;
    bind_namespaces(&config.bind_ns, pid, host, mounter)
}
