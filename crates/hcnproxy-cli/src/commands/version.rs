//! `hcnproxyctl version` — Show the version.

use hcnproxy_common::constants::BIN_NAME;

/// Executes the `version` command.
pub fn execute() {
    println!("{BIN_NAME} {}", env!("CARGO_PKG_VERSION"));
}
