//! # hcnproxy-cri
//!
//! A small client for the Kubernetes Container Runtime Interface.
//!
//! Only the calls needed to map a container to its network namespace are
//! implemented: `ListContainers` and a verbose `ContainerStatus`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod api;
pub mod client;
pub mod endpoint;
pub mod namespace;

pub use client::{CriParameters, RuntimeApi, RuntimeClient, connect};
pub use endpoint::RuntimeEndpoint;
pub use namespace::resolve_namespace;
