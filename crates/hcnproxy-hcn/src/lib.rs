//! # hcnproxy-hcn
//!
//! Access to the Windows Host Networking Service (HNS) through the Host
//! Compute Network API.
//!
//! - **Schema**: serde models of the JSON documents HNS accepts and returns.
//! - **Backends**: the [`ControlPlane`] trait, a native Windows backend
//!   over `computenetwork.dll`, and a fallback for other platforms.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod schema;

pub use backend::{ControlPlane, detect_control_plane};
