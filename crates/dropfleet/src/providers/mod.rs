//! Provider abstractions for droplet hosting.

pub mod digitalocean;
mod traits;

#[cfg(test)]
pub use traits::MockProvider;
pub use traits::{
    ActionKind, BootstrapKeyMaterial, CreateMachineRequest, ImageInfo, MachineAddress, MachineId,
    MachineRecord, MachineStatus, NetworkRole, Provider, ProviderError, ProvisioningSpec,
    RegionInfo,
};
