//! Normalized inventory view over live droplet records.
//!
//! Addresses are looked up by network role instead of list position, so a
//! droplet with one interface, or with several of each role, renders the
//! same way as the common public + private pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::providers::{MachineAddress, MachineId, MachineRecord, MachineStatus, NetworkRole};

/// SSH port advertised in login lines.
pub const SSH_PORT: u16 = 22;

/// One droplet as shown by `--check` and consumed by delete-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineView {
    /// Provider identifier.
    pub id: MachineId,
    /// Droplet name.
    pub name: String,
    /// Current status.
    pub status: MachineStatus,
    /// Addresses in provider order.
    pub addresses: Vec<MachineAddress>,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
}

impl MachineView {
    /// Addresses with the given role, in provider order.
    pub fn addresses_with(&self, role: NetworkRole) -> impl Iterator<Item = &str> {
        self.addresses
            .iter()
            .filter(move |a| a.role == role)
            .map(|a| a.address.as_str())
    }

    /// First public address.
    #[must_use]
    pub fn public(&self) -> Option<&str> {
        self.addresses_with(NetworkRole::Public).next()
    }

    /// First private address.
    #[must_use]
    pub fn private(&self) -> Option<&str> {
        self.addresses_with(NetworkRole::Private).next()
    }

    /// Address the droplet is identified by: public first, else anything.
    #[must_use]
    pub fn primary_address(&self) -> Option<&str> {
        self.public()
            .or_else(|| self.addresses.first().map(|a| a.address.as_str()))
    }

    /// Address used for root login lines: private first, else primary.
    #[must_use]
    pub fn login_address(&self) -> Option<&str> {
        self.private().or_else(|| self.primary_address())
    }

    /// Comma-separated address list for table output.
    #[must_use]
    pub fn address_list(&self) -> String {
        if self.addresses.is_empty() {
            return "-".to_string();
        }
        self.addresses
            .iter()
            .map(|a| a.address.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<MachineRecord> for MachineView {
    fn from(record: MachineRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            status: record.status,
            addresses: record.addresses,
            region: record.region,
            size: record.size,
        }
    }
}

/// Inventory snapshot in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryView {
    /// Droplets.
    pub machines: Vec<MachineView>,
}

impl InventoryView {
    /// Build the view from one listing.
    #[must_use]
    pub fn build(records: Vec<MachineRecord>) -> Self {
        Self {
            machines: records.into_iter().map(MachineView::from).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MachineView> {
        self.machines.iter()
    }

    /// Name to ID mapping. Names are not unique, so each name keeps every ID.
    #[must_use]
    pub fn ids_by_name(&self) -> HashMap<&str, Vec<MachineId>> {
        let mut map: HashMap<&str, Vec<MachineId>> = HashMap::new();
        for machine in &self.machines {
            map.entry(machine.name.as_str()).or_default().push(machine.id);
        }
        map
    }

    /// `root:<password>||<address>:22` per droplet that has an address.
    #[must_use]
    pub fn login_lines(&self, password: &str) -> Vec<String> {
        self.machines
            .iter()
            .filter_map(MachineView::login_address)
            .map(|address| format!("root:{password}||{address}:{SSH_PORT}"))
            .collect()
    }
}
