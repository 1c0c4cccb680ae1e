//! CLI command definitions and dispatch.

pub mod add;
pub mod clear;
pub mod list;
pub mod lookup;
pub mod version;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hcnproxy_common::types::EndpointId;
use hcnproxy_hcn::ControlPlane;

/// hcnproxyctl — program layer-4 proxy policies through HNS.
#[derive(Parser, Debug)]
#[command(name = "hcnproxyctl", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a proxy policy to an endpoint.
    Add(add::AddArgs),
    /// Remove all proxy policies from an endpoint.
    Clear(clear::ClearArgs),
    /// List the proxy policies on an endpoint.
    List(list::ListArgs),
    /// Report the ID of the HNS endpoint to which the specified container is attached.
    Lookup(lookup::LookupArgs),
    /// Show the hcnproxyctl version.
    Version,
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Add(args) => add::execute(args, hcnproxy_hcn::detect_control_plane().as_ref()),
        Command::Clear(args) => clear::execute(&args, hcnproxy_hcn::detect_control_plane().as_ref()),
        Command::List(args) => list::execute(&args, hcnproxy_hcn::detect_control_plane().as_ref()),
        Command::Lookup(args) => {
            lookup::execute(args, hcnproxy_hcn::detect_control_plane().as_ref())
        }
        Command::Version => {
            version::execute();
            Ok(())
        }
    }
}

/// Parses an HNS endpoint ID argument.
fn parse_endpoint(id: &str) -> anyhow::Result<EndpointId> {
    EndpointId::parse(id).context("expected the GUID of an HNS endpoint")
}

/// Fails before any remote call when HNS cannot be reached from this host.
fn ensure_available(control_plane: &dyn ControlPlane) -> anyhow::Result<()> {
    anyhow::ensure!(
        control_plane.is_available(),
        "the Host Networking Service is not available on this host; {} must run on Windows",
        hcnproxy_common::constants::BIN_NAME
    );
    Ok(())
}
