//! Batch lifecycle management for DigitalOcean droplets.
//!
//! This crate provisions batches of identically-configured droplets,
//! resolves droplets by network address, and drives the delete, reboot
//! and power-cycle workflows against the live provider inventory. No state
//! is kept between invocations: every command starts from a fresh listing.
//!
//! # Example
//!
//! ```rust,ignore
//! use dropfleet::config::ClientConfig;
//! use dropfleet::lifecycle::Orchestrator;
//! use dropfleet::providers::digitalocean::DigitalOcean;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = DigitalOcean::new(ClientConfig::new("token")?)?;
//!     let fleet = Orchestrator::new(provider);
//!
//!     // Delete every droplet in the account, one report line per droplet
//!     let report = fleet.delete_all().await?;
//!     println!("{} deleted, {} failed", report.accepted(), report.failed());
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod poll;
pub mod providers;
pub mod resolver;

pub use config::{ClientConfig, CredentialConfig, PollConfig};
pub use error::{FleetError, Result};
pub use inventory::{InventoryView, MachineView};
pub use lifecycle::{ActionResult, BatchReport, Orchestrator, Outcome, RebootReport};
pub use providers::digitalocean::DigitalOcean;
pub use providers::{
    ActionKind, BootstrapKeyMaterial, ImageInfo, MachineAddress, MachineId, MachineRecord,
    MachineStatus, NetworkRole, Provider, ProviderError, ProvisioningSpec, RegionInfo,
};
