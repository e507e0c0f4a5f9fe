//! `DigitalOcean` API client implementation.
//!
//! API Documentation: <https://docs.digitalocean.com/reference/api/>

use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::models::{
    ActionResponse, CreateDropletRequest, CreateSshKeyRequest, CreatedDropletResponse, Droplet,
    DropletListResponse, DropletResponse, ImageListResponse, Page, PowerActionRequest,
    RegionListResponse, SshKey, SshKeyListResponse, SshKeyResponse,
};
use crate::config::ClientConfig;
use crate::providers::traits::{
    ActionKind, BootstrapKeyMaterial, CreateMachineRequest, ImageInfo, MachineAddress, MachineId,
    MachineRecord, MachineStatus, NetworkRole, Provider, ProviderError, RegionInfo,
};

/// Items requested per listing page.
const PER_PAGE: u32 = 200;

/// Upper bound on pages followed for a single listing.
const MAX_PAGES: u32 = 500;

/// `DigitalOcean` provider.
#[derive(Clone)]
pub struct DigitalOcean {
    /// HTTP client.
    client: Client,
    /// Endpoint and credentials.
    config: ClientConfig,
}

impl DigitalOcean {
    /// Create a new `DigitalOcean` provider.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Attach credentials and send.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        Ok(request
            .bearer_auth(&self.config.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await?)
    }

    /// Fail with the response body unless the status matches.
    async fn expect_status(
        operation: &'static str,
        response: Response,
        expected: StatusCode,
    ) -> Result<Response, ProviderError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(format!("{operation}: {body}")));
        }
        Err(ProviderError::Api {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a JSON body, logging it when it does not match the model.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse response");
            ProviderError::Serialization(e)
        })
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<T, ProviderError> {
        let url = self.url(path);
        debug!(url = %url, "GET request");

        let response = self.send(self.client.get(&url)).await?;
        let response = Self::expect_status(operation, response, StatusCode::OK).await?;
        Self::decode(response).await
    }

    /// GET every page of a listing.
    async fn get_all<P>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<Vec<P::Item>, ProviderError>
    where
        P: Page + DeserializeOwned,
    {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let page_path = format!("{path}?page={page}&per_page={PER_PAGE}");
            let (mut batch, has_next) = self.get::<P>(operation, &page_path).await?.into_parts();
            let exhausted = batch.is_empty();
            items.append(&mut batch);

            if !has_next || exhausted {
                debug!(operation, pages = page, items = items.len(), "Listing complete");
                return Ok(items);
            }
        }

        Err(ProviderError::Pagination {
            operation,
            pages: MAX_PAGES,
        })
    }

    /// Make an authenticated POST request and check the status.
    async fn post<B: serde::Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
        expected: StatusCode,
    ) -> Result<Response, ProviderError> {
        let url = self.url(path);
        debug!(url = %url, "POST request");

        let response = self.send(self.client.post(&url).json(body)).await?;
        Self::expect_status(operation, response, expected).await
    }

    /// Convert a `DigitalOcean` droplet to our record type.
    ///
    /// Fails on addresses that do not parse as IPs and on unknown network
    /// roles instead of passing them through to the inventory view.
    fn to_record(droplet: Droplet) -> Result<MachineRecord, ProviderError> {
        let id = MachineId(droplet.id);

        let addresses = droplet
            .networks
            .v4
            .iter()
            .map(|net| {
                if net.ip_address.parse::<IpAddr>().is_err() {
                    return Err(ProviderError::MalformedRecord {
                        id,
                        reason: format!("invalid address '{}'", net.ip_address),
                    });
                }
                let role = match net.address_type.as_str() {
                    "public" => NetworkRole::Public,
                    "private" => NetworkRole::Private,
                    other => {
                        return Err(ProviderError::MalformedRecord {
                            id,
                            reason: format!(
                                "unknown network type '{other}' for {}",
                                net.ip_address
                            ),
                        })
                    }
                };
                Ok(MachineAddress::new(net.ip_address.clone(), role))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MachineRecord {
            id,
            name: droplet.name,
            status: MachineStatus::from_wire(&droplet.status),
            addresses,
            region: droplet.region.slug,
            size: droplet.size_slug,
            image: droplet.image.and_then(|image| image.slug),
            created_at: droplet
                .created_at
                .as_deref()
                .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
        })
    }

    fn to_key_material(key: SshKey) -> BootstrapKeyMaterial {
        BootstrapKeyMaterial {
            public_key: key.public_key,
            fingerprint: key.fingerprint,
        }
    }
}

#[async_trait]
impl Provider for DigitalOcean {
    async fn list_machines(&self) -> Result<Vec<MachineRecord>, ProviderError> {
        let droplets = self
            .get_all::<DropletListResponse>("list droplets", "/droplets")
            .await?;
        droplets.into_iter().map(Self::to_record).collect()
    }

    async fn get_machine(&self, id: MachineId) -> Result<MachineRecord, ProviderError> {
        let response: DropletResponse = self.get("get droplet", &format!("/droplets/{id}")).await?;
        Self::to_record(response.droplet)
    }

    async fn create_machine(
        &self,
        req: &CreateMachineRequest,
    ) -> Result<MachineId, ProviderError> {
        info!(
            name = %req.name,
            size = %req.size,
            region = %req.region,
            "Creating droplet"
        );

        let body = CreateDropletRequest {
            name: req.name.clone(),
            region: req.region.clone(),
            size: req.size.clone(),
            image: req.image.clone(),
            ssh_keys: req.ssh_keys.clone(),
            backups: false,
            ipv6: false,
            monitoring: false,
            user_data: req.user_data.clone(),
        };

        let response = self
            .post("create droplet", "/droplets", &body, StatusCode::ACCEPTED)
            .await?;
        let created: CreatedDropletResponse = Self::decode(response).await?;

        info!(droplet_id = %created.droplet.id, name = %req.name, "Droplet accepted");
        Ok(MachineId(created.droplet.id))
    }

    async fn delete_machine(&self, id: MachineId) -> Result<(), ProviderError> {
        info!(droplet_id = %id, "Deleting droplet");

        let url = self.url(&format!("/droplets/{id}"));
        debug!(url = %url, "DELETE request");

        let response = self.send(self.client.delete(&url)).await?;
        Self::expect_status("delete droplet", response, StatusCode::NO_CONTENT).await?;

        info!(droplet_id = %id, "Droplet deleted");
        Ok(())
    }

    async fn perform_action(&self, id: MachineId, kind: ActionKind) -> Result<(), ProviderError> {
        info!(droplet_id = %id, action = %kind, "Submitting droplet action");

        let body = PowerActionRequest {
            action_type: kind.as_str().to_string(),
        };
        let response = self
            .post(
                "droplet action",
                &format!("/droplets/{id}/actions"),
                &body,
                StatusCode::CREATED,
            )
            .await?;

        // The action body is informational; acceptance is the 201 itself.
        match Self::decode::<ActionResponse>(response).await {
            Ok(action) => debug!(
                droplet_id = %id,
                action_id = action.action.id,
                status = %action.action.status,
                "Action accepted"
            ),
            Err(e) => debug!(droplet_id = %id, error = %e, "Action accepted without body"),
        }
        Ok(())
    }

    async fn list_regions(&self) -> Result<Vec<RegionInfo>, ProviderError> {
        let regions = self
            .get_all::<RegionListResponse>("list regions", "/regions")
            .await?;
        Ok(regions
            .into_iter()
            .map(|r| RegionInfo {
                slug: r.slug,
                name: r.name,
                available: r.available,
            })
            .collect())
    }

    async fn list_images(&self) -> Result<Vec<ImageInfo>, ProviderError> {
        let images = self
            .get_all::<ImageListResponse>("list images", "/images")
            .await?;
        Ok(images
            .into_iter()
            .map(|i| ImageInfo {
                slug: i.slug,
                distribution: i.distribution,
                name: i.name,
            })
            .collect())
    }

    async fn list_ssh_keys(&self) -> Result<Vec<BootstrapKeyMaterial>, ProviderError> {
        let keys = self
            .get_all::<SshKeyListResponse>("list ssh keys", "/account/keys")
            .await?;
        Ok(keys.into_iter().map(Self::to_key_material).collect())
    }

    async fn register_ssh_key(
        &self,
        name: &str,
        public_key: &str,
    ) -> Result<BootstrapKeyMaterial, ProviderError> {
        info!(name = %name, "Registering SSH key");

        let body = CreateSshKeyRequest {
            name: name.to_string(),
            public_key: public_key.to_string(),
        };
        let response = self
            .post("register ssh key", "/account/keys", &body, StatusCode::CREATED)
            .await?;
        let created: SshKeyResponse = Self::decode(response).await?;

        info!(fingerprint = %created.ssh_key.fingerprint, "SSH key registered");
        Ok(Self::to_key_material(created.ssh_key))
    }
}
