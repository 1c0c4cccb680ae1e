//! # hcnproxy-core
//!
//! Programs layer-4 proxy policies on Windows through the Host Networking
//! Service, so a sidecar proxy can transparently intercept the traffic of
//! a container.
//!
//! - [`policy`]: the [`Policy`] record and its translation to HNS settings.
//! - [`builder`]: fluent construction of policies.
//! - [`proxy`]: add, list and clear policies on an endpoint, and find the
//!   endpoint of a container.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod policy;
pub mod proxy;

pub use builder::PolicyBuilder;
pub use policy::{Policy, Protocol};
