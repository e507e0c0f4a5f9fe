//! `DigitalOcean` v2 wire models.
//!
//! Only the fields the inventory and lifecycle code read are modelled;
//! serde skips the rest of each payload.

use serde::{Deserialize, Serialize};

// ============================================================================
// Droplets
// ============================================================================

/// Droplet as returned by `/droplets` and `/droplets/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Droplet {
    pub id: i64,
    pub name: String,
    /// "new", "active", "off" or "archive".
    pub status: String,
    pub region: Region,
    pub size_slug: String,
    #[serde(default)]
    pub networks: Networks,
    #[serde(default)]
    pub image: Option<Image>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One page of `GET /droplets`.
#[derive(Debug, Deserialize)]
pub struct DropletListResponse {
    pub droplets: Vec<Droplet>,
    #[serde(default)]
    pub links: Option<Links>,
}

/// Envelope for a single droplet.
#[derive(Debug, Deserialize)]
pub struct DropletResponse {
    pub droplet: Droplet,
}

/// Body of a 202 from `POST /droplets`. Only the ID is relied on.
#[derive(Debug, Deserialize)]
pub struct CreatedDropletResponse {
    pub droplet: CreatedDroplet,
}

#[derive(Debug, Deserialize)]
pub struct CreatedDroplet {
    pub id: i64,
}

/// Interfaces attached to a droplet. IPv6 is not modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Networks {
    #[serde(default)]
    pub v4: Vec<NetworkAddress>,
}

/// One IPv4 interface.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkAddress {
    pub ip_address: String,
    /// "public" or "private".
    #[serde(rename = "type")]
    pub address_type: String,
}

/// Body of `POST /droplets`.
#[derive(Debug, Serialize)]
pub struct CreateDropletRequest {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: String,
    /// Fingerprints of account keys to install.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<String>,
    pub backups: bool,
    pub ipv6: bool,
    pub monitoring: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Region, both standalone and embedded in a droplet.
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub available: bool,
}

/// One page of `GET /regions`.
#[derive(Debug, Deserialize)]
pub struct RegionListResponse {
    pub regions: Vec<Region>,
    #[serde(default)]
    pub links: Option<Links>,
}

/// Image, both standalone and embedded in a droplet.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub name: String,
    /// Absent for private snapshots and backups.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub distribution: String,
}

/// One page of `GET /images`.
#[derive(Debug, Deserialize)]
pub struct ImageListResponse {
    pub images: Vec<Image>,
    #[serde(default)]
    pub links: Option<Links>,
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub pages: Option<Pages>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pages {
    /// URL of the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// A list response that may continue on another page.
pub trait Page {
    type Item;

    /// Split into the items and whether a next page exists.
    fn into_parts(self) -> (Vec<Self::Item>, bool);
}

fn has_next(links: Option<&Links>) -> bool {
    links
        .and_then(|l| l.pages.as_ref())
        .and_then(|p| p.next.as_ref())
        .is_some()
}

impl Page for DropletListResponse {
    type Item = Droplet;

    fn into_parts(self) -> (Vec<Droplet>, bool) {
        let next = has_next(self.links.as_ref());
        (self.droplets, next)
    }
}

impl Page for RegionListResponse {
    type Item = Region;

    fn into_parts(self) -> (Vec<Region>, bool) {
        let next = has_next(self.links.as_ref());
        (self.regions, next)
    }
}

impl Page for ImageListResponse {
    type Item = Image;

    fn into_parts(self) -> (Vec<Image>, bool) {
        let next = has_next(self.links.as_ref());
        (self.images, next)
    }
}

impl Page for SshKeyListResponse {
    type Item = SshKey;

    fn into_parts(self) -> (Vec<SshKey>, bool) {
        let next = has_next(self.links.as_ref());
        (self.ssh_keys, next)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Body of `POST /droplets/{id}/actions`.
#[derive(Debug, Serialize)]
pub struct PowerActionRequest {
    /// `reboot` or `power_cycle`.
    #[serde(rename = "type")]
    pub action_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionResponse {
    pub action: Action,
}

/// Submitted action as echoed back by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub id: i64,
    /// "in-progress", "completed" or "errored".
    pub status: String,
}

// ============================================================================
// Account SSH keys
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SshKey {
    pub fingerprint: String,
    pub public_key: String,
}

/// One page of `GET /account/keys`.
#[derive(Debug, Deserialize)]
pub struct SshKeyListResponse {
    pub ssh_keys: Vec<SshKey>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Deserialize)]
pub struct SshKeyResponse {
    pub ssh_key: SshKey,
}

/// Body of `POST /account/keys`.
#[derive(Debug, Serialize)]
pub struct CreateSshKeyRequest {
    pub name: String,
    pub public_key: String,
}
