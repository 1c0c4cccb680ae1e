//! gRPC client for the CRI runtime service.

use std::future::Future;
use std::time::Duration;

use hcnproxy_common::config::HcnProxyConfig;
use hcnproxy_common::error::{HcnProxyError, Result};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

use crate::api::{
    Container, ContainerStatusRequest, ContainerStatusResponse, ListContainersRequest,
    ListContainersResponse,
};
use crate::endpoint::RuntimeEndpoint;

const LIST_CONTAINERS: &str = "/runtime.v1.RuntimeService/ListContainers";
const CONTAINER_STATUS: &str = "/runtime.v1.RuntimeService/ContainerStatus";

/// Connection parameters for the CRI runtime endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriParameters {
    /// Address of the runtime endpoint.
    pub runtime_endpoint: String,
    /// Connect timeout.
    pub timeout: Duration,
}

impl Default for CriParameters {
    fn default() -> Self {
        HcnProxyConfig::default().into()
    }
}

impl From<HcnProxyConfig> for CriParameters {
    fn from(config: HcnProxyConfig) -> Self {
        Self {
            runtime_endpoint: config.runtime_endpoint,
            timeout: config.connect_timeout,
        }
    }
}

/// The subset of the CRI runtime service hcnproxy relies on.
pub trait RuntimeApi {
    /// Lists every container known to the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn list_containers(&mut self) -> impl Future<Output = Result<Vec<Container>>> + Send;

    /// Fetches the status of one container. With `verbose` set, the runtime
    /// fills the `info` map.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn container_status(
        &mut self,
        container_id: &str,
        verbose: bool,
    ) -> impl Future<Output = Result<ContainerStatusResponse>> + Send;
}

/// A connected CRI runtime client. The connection closes when the client
/// is dropped.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    inner: tonic::client::Grpc<Channel>,
}

impl RuntimeClient {
    /// Wraps an established channel.
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    async fn unary<Req, Resp>(
        &mut self,
        operation: &'static str,
        path: &'static str,
        request: Req,
    ) -> Result<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner.ready().await.map_err(|e| HcnProxyError::Runtime {
            operation,
            message: format!("service was not ready: {e}"),
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let response = self
            .inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                codec,
            )
            .await
            .map_err(|status| runtime_error(operation, &status))?;
        Ok(response.into_inner())
    }
}

impl RuntimeApi for RuntimeClient {
    async fn list_containers(&mut self) -> Result<Vec<Container>> {
        let response: ListContainersResponse = self
            .unary("ListContainers", LIST_CONTAINERS, ListContainersRequest {})
            .await?;
        tracing::debug!(count = response.containers.len(), "listed containers");
        Ok(response.containers)
    }

    async fn container_status(
        &mut self,
        container_id: &str,
        verbose: bool,
    ) -> Result<ContainerStatusResponse> {
        let request = ContainerStatusRequest {
            container_id: container_id.to_owned(),
            verbose,
        };
        self.unary("ContainerStatus", CONTAINER_STATUS, request)
            .await
    }
}

fn runtime_error(operation: &'static str, status: &tonic::Status) -> HcnProxyError {
    HcnProxyError::Runtime {
        operation,
        message: format!("{:?}: {}", status.code(), status.message()),
    }
}

fn connect_error(endpoint: &RuntimeEndpoint, e: &dyn std::fmt::Display) -> HcnProxyError {
    HcnProxyError::Runtime {
        operation: "connect",
        message: format!(
            "failed to connect to {endpoint}, make sure you are running as administrator \
             and the runtime has been started: {e}"
        ),
    }
}

/// Opens a connection to the runtime endpoint named in `params`.
///
/// The connection is established eagerly and fails after `params.timeout`.
///
/// # Errors
///
/// Returns an error if the address is invalid or the runtime cannot be
/// reached in time.
pub async fn connect(params: &CriParameters) -> Result<RuntimeClient> {
    let target = RuntimeEndpoint::parse(&params.runtime_endpoint)?;
    tracing::debug!(endpoint = %target, timeout = ?params.timeout, "connecting to runtime");

    let endpoint = Endpoint::from_shared(target.uri())
        .map_err(|e| HcnProxyError::InvalidArgument {
            what: "runtime endpoint",
            message: e.to_string(),
        })?
        .connect_timeout(params.timeout);

    let connecting = dial(&target, endpoint);
    let channel = tokio::time::timeout(params.timeout, connecting)
        .await
        .map_err(|e| connect_error(&target, &e))?
        .map_err(|e| connect_error(&target, &e))?;
    Ok(RuntimeClient::new(channel))
}

async fn dial(
    target: &RuntimeEndpoint,
    endpoint: Endpoint,
) -> std::result::Result<Channel, tonic::transport::Error> {
    match target {
        RuntimeEndpoint::Tcp(_) => endpoint.connect().await,
        #[cfg(unix)]
        RuntimeEndpoint::Unix(path) => {
            let path = path.clone();
            endpoint
                .connect_with_connector(tower::service_fn(move |_: tonic::transport::Uri| {
                    let path = path.clone();
                    async move {
                        let stream = tokio::net::UnixStream::connect(path).await?;
                        Ok::<_, std::io::Error>(hyper_util::rt::TokioIo::new(stream))
                    }
                }))
                .await
        }
        #[cfg(windows)]
        RuntimeEndpoint::NamedPipe(pipe) => {
            let pipe = pipe.clone();
            endpoint
                .connect_with_connector(tower::service_fn(move |_: tonic::transport::Uri| {
                    let pipe = pipe.clone();
                    async move {
                        let client =
                            tokio::net::windows::named_pipe::ClientOptions::new().open(&pipe)?;
                        Ok::<_, std::io::Error>(hyper_util::rt::TokioIo::new(client))
                    }
                }))
                .await
        }
        #[allow(unreachable_patterns)]
        _ => {
            endpoint
                .connect_with_connector(tower::service_fn(|_: tonic::transport::Uri| async {
                    Err::<hyper_util::rt::TokioIo<tokio::net::TcpStream>, _>(
                        std::io::Error::new(
                            std::io::ErrorKind::Unsupported,
                            "endpoint type not supported on this platform",
                        ),
                    )
                }))
                .await
        }
    }
}
