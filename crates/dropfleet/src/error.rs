//! Orchestration-level errors.

use thiserror::Error;

use crate::providers::{MachineId, ProviderError};

/// Errors surfaced by the resolver and lifecycle workflows.
#[derive(Error, Debug)]
pub enum FleetError {
    /// Provider call failed (transport, API status, malformed record).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No droplet in the inventory carries this address.
    #[error("No droplet found with address {0}")]
    AddressNotFound(String),

    /// More than one droplet carries this address.
    #[error("Address {address} is assigned to multiple droplets: {}", format_ids(.ids))]
    AmbiguousAddress { address: String, ids: Vec<MachineId> },

    /// Missing or invalid operator configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The operation was cancelled before it could complete.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result alias for orchestration calls.
pub type Result<T> = std::result::Result<T, FleetError>;

fn format_ids(ids: &[MachineId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
