//! Provider trait and common types for droplet providers.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Request never produced a response (timeout, DNS, connection refused).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API answered with a status the operation does not accept.
    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record is missing data the inventory model depends on.
    #[error("Malformed record for droplet {id}: {reason}")]
    MalformedRecord { id: MachineId, reason: String },

    /// Listing kept reporting a next page past the page cap.
    #[error("{operation} did not finish paginating after {pages} pages")]
    Pagination { operation: &'static str, pages: u32 },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Provider-assigned droplet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(pub i64);

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Droplet status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    /// Droplet is being created.
    New,
    /// Droplet is running.
    Active,
    /// Droplet is powered off.
    Off,
    /// Droplet has been archived.
    Archive,
    /// Unknown status.
    #[serde(other)]
    Unknown,
}

impl MachineStatus {
    /// Map a raw status string; unrecognised values become `Unknown`.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "new" => Self::New,
            "active" => Self::Active,
            "off" => Self::Off,
            "archive" => Self::Archive,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Active => write!(f, "active"),
            Self::Off => write!(f, "off"),
            Self::Archive => write!(f, "archive"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Role of a network interface address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRole {
    /// Internet-facing address.
    Public,
    /// VPC address.
    Private,
}

impl fmt::Display for NetworkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// One address attached to a droplet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineAddress {
    /// IP address as reported by the provider.
    pub address: String,
    /// Network role.
    pub role: NetworkRole,
}

impl MachineAddress {
    pub fn new(address: impl Into<String>, role: NetworkRole) -> Self {
        Self {
            address: address.into(),
            role,
        }
    }
}

/// A droplet in the live inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRecord {
    /// Provider identifier.
    pub id: MachineId,
    /// Droplet name.
    pub name: String,
    /// Current status.
    pub status: MachineStatus,
    /// IPv4 addresses in provider order.
    pub addresses: Vec<MachineAddress>,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Image slug, when the image has one.
    pub image: Option<String>,
    /// When the droplet was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl MachineRecord {
    /// Whether any interface carries exactly this address.
    #[must_use]
    pub fn has_address(&self, address: &str) -> bool {
        self.addresses.iter().any(|a| a.address == address)
    }
}

/// Power action submitted through the actions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Graceful reboot.
    Reboot,
    /// Hard reset.
    PowerCycle,
}

impl ActionKind {
    /// Wire value of the action type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reboot => "reboot",
            Self::PowerCycle => "power_cycle",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input contract for a batch of identical droplets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningSpec {
    /// Name prefix; unit `i` is named `{name_prefix}{i}`.
    pub name_prefix: String,
    /// Number of droplets, at least one.
    pub count: u32,
    /// Region slug (e.g., "nyc3").
    pub region: String,
    /// Size slug (e.g., "s-4vcpu-8gb").
    pub size: String,
    /// Image slug (e.g., "ubuntu-22-04-x64").
    pub image: String,
    /// Fingerprint of the SSH key to install, resolved at create time if unset.
    pub ssh_key_ref: Option<String>,
    /// Cloud-init user data.
    pub init_payload: String,
}

impl ProvisioningSpec {
    /// Names of every unit in the batch, `prefix1..prefixN`.
    #[must_use]
    pub fn unit_names(&self) -> Vec<String> {
        (1..=self.count)
            .map(|i| format!("{}{i}", self.name_prefix))
            .collect()
    }

    /// Create request for a single named unit of this batch.
    #[must_use]
    pub fn unit(&self, name: impl Into<String>) -> CreateMachineRequest {
        CreateMachineRequest {
            name: name.into(),
            region: self.region.clone(),
            size: self.size.clone(),
            image: self.image.clone(),
            ssh_keys: self.ssh_key_ref.iter().cloned().collect(),
            user_data: Some(self.init_payload.clone()),
        }
    }
}

/// Request to create one droplet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMachineRequest {
    /// Droplet name.
    pub name: String,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Image slug.
    pub image: String,
    /// SSH key fingerprints.
    pub ssh_keys: Vec<String>,
    /// Cloud-init user data.
    pub user_data: Option<String>,
}

/// A region offered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Region slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Whether new droplets can be placed here.
    pub available: bool,
}

/// An image offered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image slug; private snapshots have none.
    pub slug: Option<String>,
    /// Distribution name.
    pub distribution: String,
    /// Image name.
    pub name: String,
}

/// SSH key registered with the provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapKeyMaterial {
    /// OpenSSH public key.
    pub public_key: String,
    /// Provider fingerprint used to reference the key.
    pub fingerprint: String,
}

/// Trait for droplet providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// List every droplet, following all pages.
    async fn list_machines(&self) -> Result<Vec<MachineRecord>, ProviderError>;

    /// Get droplet by ID.
    async fn get_machine(&self, id: MachineId) -> Result<MachineRecord, ProviderError>;

    /// Create a droplet; returns its ID once the provider accepted the request.
    async fn create_machine(
        &self,
        req: &CreateMachineRequest,
    ) -> Result<MachineId, ProviderError>;

    /// Delete a droplet.
    async fn delete_machine(&self, id: MachineId) -> Result<(), ProviderError>;

    /// Submit a power action.
    async fn perform_action(&self, id: MachineId, kind: ActionKind) -> Result<(), ProviderError>;

    /// List all regions.
    async fn list_regions(&self) -> Result<Vec<RegionInfo>, ProviderError>;

    /// List all images.
    async fn list_images(&self) -> Result<Vec<ImageInfo>, ProviderError>;

    /// List SSH keys registered with the account.
    async fn list_ssh_keys(&self) -> Result<Vec<BootstrapKeyMaterial>, ProviderError>;

    /// Register a new SSH key with the account.
    async fn register_ssh_key(
        &self,
        name: &str,
        public_key: &str,
    ) -> Result<BootstrapKeyMaterial, ProviderError>;
}
