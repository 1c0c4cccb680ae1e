//! `hcnproxyctl clear` — Remove all proxy policies from an endpoint.

use clap::Args;
use hcnproxy_hcn::ControlPlane;

/// Arguments for the `clear` command.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// HNS endpoint ID.
    pub endpoint: String,
}

/// Executes the `clear` command.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be queried or the removal
/// fails. A failed removal still names how many policies were targeted.
pub fn execute(args: &ClearArgs, control_plane: &dyn ControlPlane) -> anyhow::Result<()> {
    let endpoint = super::parse_endpoint(&args.endpoint)?;
    super::ensure_available(control_plane)?;

    tracing::info!(endpoint = %endpoint, "clearing proxy policies");
    let removed = hcnproxy_core::proxy::clear_policies(control_plane, &endpoint)
        .inspect_err(|e| {
            if let Some(attempted) = e.attempted() {
                tracing::warn!(endpoint = %endpoint, attempted, "removal failed");
            }
        })?;
    println!("Removed {removed} policies");
    Ok(())
}
