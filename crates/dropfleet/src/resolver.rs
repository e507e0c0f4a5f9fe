//! Address to droplet resolution.
//!
//! Addresses are only unique within one inventory snapshot, and even that
//! is not guaranteed by the provider. A lookup that matches more than one
//! droplet is reported as [`FleetError::AmbiguousAddress`] rather than
//! settled by picking one.

use tracing::debug;

use crate::error::{FleetError, Result};
use crate::providers::{MachineId, MachineRecord, Provider};

/// Resolve an address against the live inventory (all pages).
///
/// # Errors
/// Returns `AddressNotFound` when nothing matches, `AmbiguousAddress` when
/// several droplets match, or the provider error if listing fails.
pub async fn resolve<P: Provider + ?Sized>(provider: &P, address: &str) -> Result<MachineId> {
    let snapshot = provider.list_machines().await?;
    debug!(address, machines = snapshot.len(), "Resolving address");
    resolve_in(&snapshot, address)
}

/// Resolve an address against an existing snapshot.
///
/// # Errors
/// Returns `AddressNotFound` when nothing matches and `AmbiguousAddress`
/// when several droplets match.
pub fn resolve_in(snapshot: &[MachineRecord], address: &str) -> Result<MachineId> {
    let mut ids: Vec<MachineId> = snapshot
        .iter()
        .filter(|record| record.has_address(address))
        .map(|record| record.id)
        .collect();

    match ids.len() {
        0 => Err(FleetError::AddressNotFound(address.to_string())),
        1 => Ok(ids[0]),
        _ => {
            // A droplet can show up on two pages when the inventory shifts mid-listing.
            ids.sort_unstable();
            ids.dedup();
            if ids.len() == 1 {
                return Ok(ids[0]);
            }
            Err(FleetError::AmbiguousAddress {
                address: address.to_string(),
                ids,
            })
        }
    }
}
