//! `hcnproxyctl add` — Add a proxy policy to an endpoint.

use anyhow::Context;
use clap::Args;
use hcnproxy_core::PolicyBuilder;
use hcnproxy_hcn::ControlPlane;

/// Arguments for the `add` command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// HNS endpoint ID.
    pub endpoint: String,

    /// Port the proxy is listening on.
    #[arg(long)]
    pub port: String,

    /// Ignore traffic originating from the specified user SID (pass "system"
    /// to use the Local System SID).
    #[arg(long)]
    pub usersid: Option<String>,

    /// Only proxy traffic originating from the specified address.
    #[arg(long)]
    pub localaddr: Option<String>,

    /// Only proxy traffic destined to the specified address.
    #[arg(long)]
    pub remoteaddr: Option<String>,

    /// Only proxy traffic originating from the specified port or port range.
    #[arg(long)]
    pub localports: Option<String>,

    /// Only proxy traffic destined to the specified port or port range.
    #[arg(long)]
    pub remoteports: Option<String>,

    /// The priority of this policy.
    #[arg(long, default_value_t = 0)]
    pub priority: u16,
}

/// Executes the `add` command.
///
/// # Errors
///
/// Returns an error if the policy is invalid or HNS refuses it.
pub fn execute(args: AddArgs, control_plane: &dyn ControlPlane) -> anyhow::Result<()> {
    let endpoint = super::parse_endpoint(&args.endpoint)?;
    let policy = PolicyBuilder::new(args.port)
        .user_sid(args.usersid.unwrap_or_default())
        .local_addresses(args.localaddr.unwrap_or_default())
        .remote_addresses(args.remoteaddr.unwrap_or_default())
        .local_ports(args.localports.unwrap_or_default())
        .remote_ports(args.remoteports.unwrap_or_default())
        .priority(args.priority)
        .build()?;
    super::ensure_available(control_plane)?;

    tracing::info!(endpoint = %endpoint, port = %policy.proxy_port, "adding proxy policy");
    hcnproxy_core::proxy::add_policy(control_plane, &endpoint, &policy)
        .with_context(|| format!("failed to add the policy to endpoint {endpoint}"))?;

    println!("Successfully added the policy");
    Ok(())
}
