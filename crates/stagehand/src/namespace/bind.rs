//! Namespace bind mounts.

use std::fs::File;
use std::path::Path;

use stagehand_common::{HostPaths, NamespaceBinds, NamespaceKind, StagehandError, StagehandResult};

use crate::filesystem::{Mounter, create_dir_all};

fn bind_error(kind: NamespaceKind, target: &Path, source: std::io::Error) -> StagehandError {
    StagehandError::NamespaceBind {
        namespace: kind.to_string(),
        path: target.to_path_buf(),
        source,
    }
}

/// Bind the `kind` namespace of `pid` onto `target`.
///
/// No target (or an empty one) means the namespace is not exposed and
/// nothing is touched. Otherwise the target is created as an empty file,
/// along with its parent directories, since a namespace file can only be
/// bind mounted onto a file.
pub fn bind_namespace<M: Mounter + ?Sized>(
    kind: NamespaceKind,
    target: Option<&Path>,
    pid: u32,
    host: &HostPaths,
    mounter: &M,
) -> StagehandResult<()> {
    let Some(target) = target.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if let Some(parent) = target.parent() {
        create_dir_all(parent).map_err(|e| bind_error(kind, target, e))?;
    }
    File::create(target).map_err(|e| bind_error(kind, target, e))?;

    let source = host.namespace_file(pid, kind);
    tracing::debug!(
        namespace = %kind,
        source = %source.display(),
        target = %target.display(),
        "Binding namespace"
    );

    mounter
        .bind(&source, target)
        .map_err(|e| bind_error(kind, target, e))
}

/// Bind every configured namespace of `pid`, in a fixed order.
pub fn bind_namespaces<M: Mounter + ?Sized>(
    binds: &NamespaceBinds,
    pid: u32,
    host: &HostPaths,
    mounter: &M,
) -> StagehandResult<()> {
    for (kind, target) in binds.iter() {
        bind_namespace(kind, target, pid, host, mounter)?;
    }
    Ok(())
}
