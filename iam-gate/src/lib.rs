//! # iam-gate
//!
//! Access control for HTTP services backed by an external IAM backend.
//!
//! Every request first goes through an authentication gateway, which either lets
//! it through with a [`Principal`] or ends it with a challenge, a redirect, a denial
//! or an error. Allowed requests are then checked against a static permission
//! matrix by the [`PermissionResolver`].
//!
//! ## Components
//!
//! - **gateway:** [`AuthenticationGateway`] (access keys and session cookies) and
//!   [`SimpleAuthenticationGateway`] (session validity only).
//! - **permissions:** permission matrix, scope matching and route template resolution.
//! - **cookies:** session cookies written after login.
//! - **middleware:** axum layers and the `Principal` extractor.

pub mod api;
pub mod config;
pub mod cookies;
pub mod decision;
pub mod errors;
pub mod gateway;
pub mod middleware;
pub mod permissions;
pub mod state;
#[cfg(test)]
mod test_utils;

pub use crate::decision::{AuthDecision, Principal};
pub use crate::gateway::{
    AuthenticationGateway, GatewayConfig, SimpleAuthenticationGateway, UserIdSource,
};
pub use crate::permissions::{PermissionPolicy, PermissionResolver};
