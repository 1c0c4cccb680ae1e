//! System-wide constants and defaults.

use std::time::Duration;

/// SID of the Windows "Local System" account.
///
/// Sidecar proxies usually run under this SID. Exempting it from a proxy
/// policy keeps the proxy's own outbound traffic from being redirected
/// back into the proxy.
pub const LOCAL_SYSTEM_SID: &str = "S-1-5-18";

/// Alias accepted on the command line in place of [`LOCAL_SYSTEM_SID`].
pub const LOCAL_SYSTEM_ALIAS: &str = "system";

/// Default CRI runtime endpoint (containerd on Windows).
pub const DEFAULT_RUNTIME_ENDPOINT: &str = "tcp://127.0.0.1:2376";

/// Default connect timeout for the CRI runtime endpoint.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Environment variable overriding the CRI runtime endpoint.
pub const RUNTIME_ENDPOINT_ENV: &str = "HCNPROXY_RUNTIME_ENDPOINT";

/// Environment variable overriding the connect timeout, in seconds.
pub const CONNECT_TIMEOUT_ENV: &str = "HCNPROXY_CONNECT_TIMEOUT";

/// IANA protocol number for TCP, as the control plane expects it.
pub const PROTOCOL_TCP: &str = "6";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "hcnproxyctl";
