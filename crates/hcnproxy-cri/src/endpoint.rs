//! Parsing of CRI runtime endpoint addresses.
//!
//! Accepts the address forms `crictl` understands:
//! `tcp://host:port`, `unix:///path/to.sock`, `npipe:////./pipe/name`,
//! and a bare `host:port`.

use std::fmt;
use std::path::PathBuf;

use hcnproxy_common::error::{HcnProxyError, Result};

/// A parsed runtime endpoint address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEndpoint {
    /// TCP socket, as `host:port`.
    Tcp(String),
    /// Unix domain socket path.
    Unix(PathBuf),
    /// Windows named pipe, as `\\.\pipe\name`.
    NamedPipe(String),
}

impl RuntimeEndpoint {
    /// Parses a runtime endpoint address.
    ///
    /// # Errors
    ///
    /// Returns [`HcnProxyError::InvalidArgument`] for an empty address, an
    /// unknown scheme, or a scheme with an empty target.
    pub fn parse(address: &str) -> Result<Self> {
        let invalid = |message: String| HcnProxyError::InvalidArgument {
            what: "runtime endpoint",
            message,
        };
        let address = address.trim();
        if address.is_empty() {
            return Err(invalid("address is empty".into()));
        }

        let Some((scheme, rest)) = address.split_once("://") else {
            return Ok(Self::Tcp(address.to_owned()));
        };
        if rest.is_empty() {
            return Err(invalid(format!("{address:?} has no target")));
        }
        match scheme {
            "tcp" => Ok(Self::Tcp(rest.trim_end_matches('/').to_owned())),
            "unix" => Ok(Self::Unix(PathBuf::from(rest))),
            "npipe" => Ok(Self::NamedPipe(pipe_path(rest))),
            other => Err(invalid(format!(
                "unsupported scheme {other:?} (expected tcp, unix or npipe)"
            ))),
        }
    }

    /// Returns the URI tonic dials. Non-TCP endpoints use a placeholder
    /// authority since their connector ignores it.
    #[must_use]
    pub fn uri(&self) -> String {
        match self {
            Self::Tcp(addr) => format!("http://{addr}"),
            Self::Unix(_) | Self::NamedPipe(_) => "http://[::]:50051".to_owned(),
        }
    }
}

/// Converts `//./pipe/name` or `./pipe/name` into `\\.\pipe\name`.
fn pipe_path(rest: &str) -> String {
    let trimmed = rest.trim_start_matches('/');
    format!(r"\\{}", trimmed.replace('/', r"\"))
}

impl fmt::Display for RuntimeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::NamedPipe(pipe) => write!(f, "npipe://{}", pipe.replace('\\', "/")),
        }
    }
}
