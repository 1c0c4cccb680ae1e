//! `hcnproxyctl lookup` — Report the HNS endpoint a container is attached to.

use std::time::Duration;

use anyhow::Context;
use clap::Args;
use hcnproxy_common::config::HcnProxyConfig;
use hcnproxy_common::constants::{CONNECT_TIMEOUT_ENV, RUNTIME_ENDPOINT_ENV};
use hcnproxy_common::types::{ContainerId, EndpointId};
use hcnproxy_cri::CriParameters;
use hcnproxy_hcn::ControlPlane;

/// Arguments for the `lookup` command.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Container ID as reported by the container runtime.
    pub container: String,

    /// CRI runtime endpoint to query container information from.
    #[arg(long, env = RUNTIME_ENDPOINT_ENV)]
    pub runtimeendpoint: Option<String>,

    /// Connect timeout for the runtime endpoint, in seconds.
    #[arg(long, env = CONNECT_TIMEOUT_ENV)]
    pub timeout: Option<u64>,
}

impl LookupArgs {
    /// Builds the runtime connection parameters from the defaults and flags.
    fn cri_parameters(&self) -> CriParameters {
        let mut config =
            HcnProxyConfig::default().with_runtime_endpoint(self.runtimeendpoint.as_deref());
        if let Some(secs) = self.timeout {
            config.connect_timeout = Duration::from_secs(secs);
        }
        config.into()
    }
}

/// Executes the `lookup` command.
///
/// # Errors
///
/// Returns an error if the runtime cannot be reached, the container is
/// unknown or has no namespace, or no endpoint is attached to it.
pub fn execute(args: LookupArgs, control_plane: &dyn ControlPlane) -> anyhow::Result<()> {
    super::ensure_available(control_plane)?;
    let params = args.cri_parameters();
    let container = ContainerId::new(args.container);
    tracing::info!(
        container = %container,
        runtime_endpoint = %params.runtime_endpoint,
        "looking up container endpoints"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let endpoints = runtime.block_on(hcnproxy_core::proxy::lookup_endpoints(
        control_plane,
        &container,
        &params,
    ))?;

    println!("{}", join_endpoints(&endpoints));
    Ok(())
}

fn join_endpoints(endpoints: &[EndpointId]) -> String {
    endpoints
        .iter()
        .map(EndpointId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
