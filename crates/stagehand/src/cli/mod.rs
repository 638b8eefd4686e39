//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use stagehand_common::{ContainerPaths, HostPaths, RuntimeConfig};
use stagehand_network::NetlinkLinks;

use crate::filesystem::{SysMounter, cleanup, prepare_filesystem};
use crate::process::prepare_process;

/// stagehand - container filesystem and network preparation
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Where procfs is mounted [default: $STAGEHAND_PROC_ROOT or /proc]
    #[arg(long, global = true)]
    pub proc_root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Preparation phases.
#[derive(Subcommand)]
pub enum Commands {
    /// Set up mounts and the root filesystem before the container is created
    Prepare {
        /// Container state directory
        path: PathBuf,
    },

    /// Set up interfaces and namespace binds for a created container
    Process {
        /// Container state directory
        path: PathBuf,

        /// PID of the container process
        #[arg(long)]
        pid: u32,
    },

    /// Tear down the root filesystem (never fails)
    Cleanup {
        /// Container state directory
        path: PathBuf,
    },
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let mounter = SysMounter;

        match self.command {
            Commands::Prepare { path } => {
                let paths = ContainerPaths::new(path);
                let config = RuntimeConfig::load(&paths)?;
                let mode = prepare_filesystem(&paths, &config, &mounter)?;
                tracing::info!(root = %paths.root().display(), ?mode, "Filesystem prepared");
            }
            Commands::Process { path, pid } => {
                let paths = ContainerPaths::new(path);
                let config = RuntimeConfig::load(&paths)?;
                let host = self
                    .proc_root
                    .map_or_else(HostPaths::default, HostPaths::with_proc_root);
                let links = NetlinkLinks::connect()?;
                prepare_process(pid, &config, &links, &host, &mounter).await?;
                tracing::info!(root = %paths.root().display(), pid, "Process prepared");
            }
            Commands::Cleanup { path } => {
                cleanup(&ContainerPaths::new(path), &mounter);
            }
        }

        Ok(())
    }
}
