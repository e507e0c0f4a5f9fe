//! `DigitalOcean` droplet provider.
//!
//! Implements the [`Provider`](super::Provider) trait against the public
//! v2 REST API. Each call is a single authenticated request (or a run of
//! page requests for listings); nothing is cached and nothing is retried.
//!
//! ## Status codes
//!
//! - **create**: 202 Accepted
//! - **delete**: 204 No Content
//! - **actions**: 201 Created
//!
//! Any other code is reported as [`ProviderError::Api`](super::ProviderError::Api)
//! with the response body attached.

mod client;
mod models;

pub use client::DigitalOcean;
pub use models::*;
