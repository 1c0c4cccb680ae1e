//! `hcnproxyctl list` — List the proxy policies on an endpoint.

use clap::Args;
use hcnproxy_hcn::ControlPlane;

use crate::output;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// HNS endpoint ID.
    pub endpoint: String,

    /// Print the policies as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be queried or one of its
/// proxy policies cannot be decoded.
pub fn execute(args: &ListArgs, control_plane: &dyn ControlPlane) -> anyhow::Result<()> {
    let endpoint = super::parse_endpoint(&args.endpoint)?;
    super::ensure_available(control_plane)?;

    let policies = hcnproxy_core::proxy::list_policies(control_plane, &endpoint)?;
    tracing::debug!(endpoint = %endpoint, count = policies.len(), "listed proxy policies");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&policies)?);
    } else if policies.is_empty() {
        println!("No proxy policies found.");
    } else {
        print!("{}", output::policy_table(&policies));
    }
    Ok(())
}
