//! Lifecycle orchestration over a [`Provider`].
//!
//! Every workflow starts from a fresh listing. Batch workflows (create,
//! delete-all) record one [`ActionResult`] per unit and keep going when a
//! unit fails; single-target workflows surface errors directly.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bootstrap;
use crate::config::{CredentialConfig, PollConfig};
use crate::error::{FleetError, Result};
use crate::inventory::InventoryView;
use crate::poll::poll_until;
use crate::providers::{
    ActionKind, ImageInfo, MachineId, MachineRecord, MachineStatus, Provider, ProvisioningSpec,
};
use crate::resolver;

/// Detail recorded for units skipped after cancellation.
const CANCELLED_DETAIL: &str = "cancelled";

/// Outcome of one unit in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Provider accepted the request.
    Accepted,
    /// Request failed or was never sent.
    Failed,
}

/// Per-unit result of a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Droplet name the action was aimed at.
    pub target: String,
    /// Droplet ID, when known.
    pub id: Option<MachineId>,
    /// Accepted or failed.
    pub outcome: Outcome,
    /// Provider message or error body.
    pub detail: String,
}

impl ActionResult {
    pub fn accepted(target: impl Into<String>, id: MachineId, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            id: Some(id),
            outcome: Outcome::Accepted,
            detail: detail.into(),
        }
    }

    pub fn failed(
        target: impl Into<String>,
        id: Option<MachineId>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            id,
            outcome: Outcome::Failed,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

/// Ordered per-unit results of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<ActionResult>,
}

impl BatchReport {
    /// Number of accepted units.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.results.iter().filter(|r| r.is_accepted()).count()
    }

    /// Number of failed units.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.accepted()
    }

    /// True when no unit failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Result of a reboot, reported once after polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebootReport {
    /// Address the reboot was requested for.
    pub target: String,
    /// Resolved droplet ID.
    pub id: MachineId,
    /// Last status read, `None` if every read failed.
    pub observed_status: Option<MachineStatus>,
    /// Whether the droplet was seen active again within the poll budget.
    pub converged: bool,
    /// Number of status reads.
    pub attempts: u32,
}

/// Runs lifecycle workflows against a provider.
pub struct Orchestrator<P: Provider> {
    provider: P,
    cancel: CancellationToken,
    poll: PollConfig,
    parallelism: usize,
}

impl<P: Provider> Orchestrator<P> {
    /// Sequential orchestrator with default polling.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cancel: CancellationToken::new(),
            poll: PollConfig::default(),
            parallelism: 1,
        }
    }

    /// Share a cancellation token (e.g., one cancelled on Ctrl-C).
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Bound on concurrent create requests; zero is treated as one.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Create `spec.count` droplets named `prefix1..prefixN`.
    ///
    /// An empty `init_payload` is rendered from the root password in
    /// `credentials`. When `ssh_key_ref` is unset, the account key is
    /// resolved (or registered) once for the whole batch. Exactly `count`
    /// units are reported, in completion order.
    ///
    /// # Errors
    /// Returns an error for an empty batch, a missing or unusable root
    /// password, SSH key resolution failure, or cancellation before the
    /// first unit. Unit failures are recorded in the report instead.
    pub async fn create(
        &self,
        spec: &ProvisioningSpec,
        credentials: &CredentialConfig,
    ) -> Result<BatchReport> {
        if spec.count == 0 {
            return Err(FleetError::Config("batch size must be at least 1".to_string()));
        }
        if self.cancel.is_cancelled() {
            return Err(FleetError::Cancelled);
        }

        let mut spec = spec.clone();
        if spec.init_payload.is_empty() {
            spec.init_payload = bootstrap::init_payload(credentials.require_root_password()?)?;
        }
        if spec.ssh_key_ref.is_none() {
            let key =
                bootstrap::ensure_ssh_key(&self.provider, credentials.ssh_public_key.as_deref())
                    .await?;
            spec.ssh_key_ref = Some(key.fingerprint);
        }

        info!(
            prefix = %spec.name_prefix,
            count = spec.count,
            region = %spec.region,
            size = %spec.size,
            image = %spec.image,
            parallelism = self.parallelism,
            "Creating droplets"
        );

        let provider = &self.provider;
        let cancel = &self.cancel;
        let results: Vec<ActionResult> = stream::iter(spec.unit_names())
            .map(|name| {
                let request = spec.unit(name.as_str());
                async move {
                    if cancel.is_cancelled() {
                        return ActionResult::failed(name, None, CANCELLED_DETAIL);
                    }
                    match provider.create_machine(&request).await {
                        Ok(id) => {
                            info!(droplet_id = %id, name = %name, "Droplet create accepted");
                            ActionResult::accepted(name, id, "created")
                        }
                        Err(e) => {
                            warn!(name = %name, error = %e, "Droplet create failed");
                            ActionResult::failed(name, None, e.to_string())
                        }
                    }
                }
            })
            .buffer_unordered(self.parallelism)
            .collect()
            .await;

        Ok(BatchReport { results })
    }

    /// Delete the droplet holding `address`.
    ///
    /// # Errors
    /// Returns resolution errors, or the provider error when the delete is
    /// not accepted.
    pub async fn delete_one(&self, address: &str) -> Result<MachineId> {
        let id = resolver::resolve(&self.provider, address).await?;
        self.provider.delete_machine(id).await?;
        info!(droplet_id = %id, address, "Droplet deleted");
        Ok(id)
    }

    /// Delete every droplet in one inventory snapshot, directly by ID.
    ///
    /// # Errors
    /// Returns an error only if the listing fails or the run was cancelled
    /// before it started.
    pub async fn delete_all(&self) -> Result<BatchReport> {
        if self.cancel.is_cancelled() {
            return Err(FleetError::Cancelled);
        }

        let snapshot = self.provider.list_machines().await?;
        info!(count = snapshot.len(), "Deleting all droplets");

        let mut report = BatchReport::default();
        for MachineRecord { id, name, .. } in snapshot {
            if self.cancel.is_cancelled() {
                report
                    .results
                    .push(ActionResult::failed(name, Some(id), CANCELLED_DETAIL));
                continue;
            }
            let result = match self.provider.delete_machine(id).await {
                Ok(()) => {
                    info!(droplet_id = %id, name = %name, "Droplet deleted");
                    ActionResult::accepted(name, id, "deleted")
                }
                Err(e) => {
                    warn!(droplet_id = %id, name = %name, error = %e, "Droplet delete failed");
                    ActionResult::failed(name, Some(id), e.to_string())
                }
            };
            report.results.push(result);
        }

        Ok(report)
    }

    /// Reboot the droplet holding `address` and wait for it to report active.
    ///
    /// # Errors
    /// Returns resolution errors, the provider error if the action is not
    /// accepted, or `Cancelled` if cancelled while polling.
    pub async fn reboot(&self, address: &str) -> Result<RebootReport> {
        let id = self.power_action(address, ActionKind::Reboot).await?;

        let provider = &self.provider;
        let outcome = poll_until(
            &self.poll,
            &self.cancel,
            move || provider.get_machine(id),
            |record: &MachineRecord| record.status == MachineStatus::Active,
        )
        .await?;

        let observed_status = outcome.last.map(|record| record.status);
        info!(
            droplet_id = %id,
            status = ?observed_status,
            converged = outcome.converged,
            attempts = outcome.attempts,
            "Reboot status"
        );

        Ok(RebootReport {
            target: address.to_string(),
            id,
            observed_status,
            converged: outcome.converged,
            attempts: outcome.attempts,
        })
    }

    /// Power-cycle the droplet holding `address`.
    ///
    /// # Errors
    /// Returns resolution errors or the provider error if the action is not
    /// accepted.
    pub async fn power_cycle(&self, address: &str) -> Result<MachineId> {
        self.power_action(address, ActionKind::PowerCycle).await
    }

    async fn power_action(&self, address: &str, kind: ActionKind) -> Result<MachineId> {
        let id = resolver::resolve(&self.provider, address).await?;
        self.provider.perform_action(id, kind).await?;
        info!(droplet_id = %id, address, action = %kind, "Action accepted");
        Ok(id)
    }

    /// Current inventory.
    ///
    /// # Errors
    /// Returns the provider error if listing fails.
    pub async fn check(&self) -> Result<InventoryView> {
        Ok(InventoryView::build(self.provider.list_machines().await?))
    }

    /// All images, sorted by slug; images without a slug come last.
    ///
    /// # Errors
    /// Returns the provider error if listing fails.
    pub async fn images(&self) -> Result<Vec<ImageInfo>> {
        let mut images = self.provider.list_images().await?;
        images.sort_by(|a, b| match (&a.slug, &b.slug) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        Ok(images)
    }

    /// Slugs of regions accepting new droplets, in provider order.
    ///
    /// # Errors
    /// Returns the provider error if listing fails.
    pub async fn regions(&self) -> Result<Vec<String>> {
        Ok(self
            .provider
            .list_regions()
            .await?
            .into_iter()
            .filter(|r| r.available)
            .map(|r| r.slug)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::providers::{
        BootstrapKeyMaterial, MachineAddress, MockProvider, NetworkRole, ProviderError, RegionInfo,
    };

    fn spec(count: u32) -> ProvisioningSpec {
        ProvisioningSpec {
            name_prefix: "kvm".to_string(),
            count,
            region: "nyc3".to_string(),
            size: "s-4vcpu-8gb".to_string(),
            image: "ubuntu-22-04-x64".to_string(),
            ssh_key_ref: None,
            init_payload: String::new(),
        }
    }

    fn credentials() -> CredentialConfig {
        CredentialConfig {
            root_password: Some("Passw0rd".to_string()),
            ssh_public_key: None,
        }
    }

    fn record(id: i64, name: &str, private: &str, status: MachineStatus) -> MachineRecord {
        MachineRecord {
            id: MachineId(id),
            name: name.to_string(),
            status,
            addresses: vec![MachineAddress::new(private, NetworkRole::Private)],
            region: "nyc3".to_string(),
            size: "s-4vcpu-8gb".to_string(),
            image: None,
            created_at: None,
        }
    }

    fn api_error(status: u16) -> ProviderError {
        ProviderError::Api {
            operation: "test",
            status,
            body: r#"{"id":"unprocessable_entity"}"#.to_string(),
        }
    }

    fn with_account_key(provider: &mut MockProvider) {
        provider.expect_list_ssh_keys().times(1).returning(|| {
            Ok(vec![BootstrapKeyMaterial {
                public_key: "ssh-ed25519 AAAA".to_string(),
                fingerprint: "aa:bb".to_string(),
            }])
        });
    }

    #[tokio::test]
    async fn test_create_issues_one_request_per_unit() {
        let mut provider = MockProvider::new();
        with_account_key(&mut provider);
        provider
            .expect_create_machine()
            .withf(|req| {
                req.ssh_keys == vec!["aa:bb".to_string()]
                    && req
                        .user_data
                        .as_deref()
                        .is_some_and(|d| d.contains("root:Passw0rd"))
            })
            .times(3)
            .returning(|req| Ok(MachineId(req.name.trim_start_matches("kvm").parse().unwrap())));

        let report = Orchestrator::new(provider)
            .create(&spec(3), &credentials())
            .await
            .unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(names, vec!["kvm1", "kvm2", "kvm3"]);
        assert_eq!(report.results[2].id, Some(MachineId(3)));
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_create_continues_after_unit_failure() {
        let mut provider = MockProvider::new();
        with_account_key(&mut provider);
        provider.expect_create_machine().times(3).returning(|req| {
            if req.name == "kvm2" {
                Err(api_error(422))
            } else {
                Ok(MachineId(1))
            }
        });

        let report = Orchestrator::new(provider)
            .with_parallelism(2)
            .create(&spec(3), &credentials())
            .await
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.failed(), 1);
        let failed = report.results.iter().find(|r| !r.is_accepted()).unwrap();
        assert_eq!(failed.target, "kvm2");
        assert!(failed.detail.contains("unprocessable_entity"));
    }

    #[tokio::test]
    async fn test_create_uses_given_key_without_lookup() {
        let mut provider = MockProvider::new();
        provider.expect_list_ssh_keys().never();
        provider
            .expect_create_machine()
            .withf(|req| req.ssh_keys == vec!["ff:ff".to_string()])
            .times(1)
            .returning(|_| Ok(MachineId(9)));

        let mut spec = spec(1);
        spec.ssh_key_ref = Some("ff:ff".to_string());
        let report = Orchestrator::new(provider)
            .create(&spec, &credentials())
            .await
            .unwrap();
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_create_requires_root_password() {
        let mut provider = MockProvider::new();
        provider.expect_create_machine().never();

        let err = Orchestrator::new(provider)
            .create(&spec(1), &CredentialConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Config(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_batch() {
        let provider = MockProvider::new();
        let err = Orchestrator::new(provider)
            .create(&spec(0), &credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Config(_)));
    }

    #[tokio::test]
    async fn test_create_cancelled_before_start() {
        let mut provider = MockProvider::new();
        provider.expect_create_machine().never();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = Orchestrator::new(provider)
            .with_cancellation(cancel)
            .create(&spec(2), &credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Cancelled));
    }

    #[tokio::test]
    async fn test_create_stops_issuing_after_cancellation() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut provider = MockProvider::new();
        with_account_key(&mut provider);
        provider.expect_create_machine().times(1).returning(move |_| {
            trigger.cancel();
            Ok(MachineId(1))
        });

        let report = Orchestrator::new(provider)
            .with_cancellation(cancel)
            .create(&spec(3), &credentials())
            .await
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.accepted(), 1);
        assert_eq!(report.results[0].target, "kvm1");
        for skipped in &report.results[1..] {
            assert!(!skipped.is_accepted());
            assert_eq!(skipped.detail, CANCELLED_DETAIL);
            assert_eq!(skipped.id, None);
        }
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_delete_all_stops_after_cancellation() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut provider = MockProvider::new();
        provider.expect_list_machines().times(1).returning(|| {
            Ok(vec![
                record(1, "kvm1", "10.0.0.1", MachineStatus::Active),
                record(2, "kvm2", "10.0.0.2", MachineStatus::Active),
            ])
        });
        provider
            .expect_delete_machine()
            .withf(|id| *id == MachineId(1))
            .times(1)
            .returning(move |_| {
                trigger.cancel();
                Ok(())
            });

        let report = Orchestrator::new(provider)
            .with_cancellation(cancel)
            .delete_all()
            .await
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].is_accepted());
        assert_eq!(report.results[1].id, Some(MachineId(2)));
        assert_eq!(report.results[1].detail, CANCELLED_DETAIL);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_delete_all_uses_one_snapshot() {
        let mut provider = MockProvider::new();
        provider.expect_list_machines().times(1).returning(|| {
            Ok(vec![
                record(1, "kvm1", "10.0.0.1", MachineStatus::Active),
                record(2, "kvm2", "10.0.0.2", MachineStatus::New),
            ])
        });
        provider.expect_delete_machine().times(2).returning(|id| {
            if id == MachineId(2) {
                Err(api_error(500))
            } else {
                Ok(())
            }
        });

        let report = Orchestrator::new(provider).delete_all().await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].is_accepted());
        assert_eq!(report.results[1].id, Some(MachineId(2)));
        assert!(!report.results[1].is_accepted());
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_delete_all_on_empty_account() {
        let mut provider = MockProvider::new();
        provider.expect_list_machines().returning(|| Ok(vec![]));
        provider.expect_delete_machine().never();

        let report = Orchestrator::new(provider).delete_all().await.unwrap();
        assert!(report.results.is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_delete_one_resolves_then_deletes() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_machines()
            .returning(|| Ok(vec![record(7, "kvm1", "10.0.0.7", MachineStatus::Active)]));
        provider
            .expect_delete_machine()
            .withf(|id| *id == MachineId(7))
            .times(1)
            .returning(|_| Ok(()));

        let id = Orchestrator::new(provider)
            .delete_one("10.0.0.7")
            .await
            .unwrap();
        assert_eq!(id, MachineId(7));
    }

    #[tokio::test]
    async fn test_delete_one_unknown_address() {
        let mut provider = MockProvider::new();
        provider.expect_list_machines().returning(|| Ok(vec![]));
        provider.expect_delete_machine().never();

        let err = Orchestrator::new(provider)
            .delete_one("10.9.9.9")
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::AddressNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reboot_single_read_reports_once() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_machines()
            .returning(|| Ok(vec![record(3, "kvm3", "10.0.0.3", MachineStatus::Active)]));
        provider
            .expect_perform_action()
            .withf(|id, kind| *id == MachineId(3) && *kind == ActionKind::Reboot)
            .times(1)
            .returning(|_, _| Ok(()));
        provider
            .expect_get_machine()
            .times(1)
            .returning(|_| Ok(record(3, "kvm3", "10.0.0.3", MachineStatus::Off)));

        let report = Orchestrator::new(provider)
            .with_poll_config(PollConfig::single_read(Duration::from_secs(10)))
            .reboot("10.0.0.3")
            .await
            .unwrap();

        assert_eq!(report.id, MachineId(3));
        assert_eq!(report.observed_status, Some(MachineStatus::Off));
        assert!(!report.converged);
        assert_eq!(report.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reboot_polls_until_active() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_machines()
            .returning(|| Ok(vec![record(3, "kvm3", "10.0.0.3", MachineStatus::Active)]));
        provider.expect_perform_action().returning(|_, _| Ok(()));
        let mut seq = mockall::Sequence::new();
        provider
            .expect_get_machine()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(record(3, "kvm3", "10.0.0.3", MachineStatus::Off)));
        provider
            .expect_get_machine()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(record(3, "kvm3", "10.0.0.3", MachineStatus::Active)));

        let report = Orchestrator::new(provider)
            .reboot("10.0.0.3")
            .await
            .unwrap();

        assert!(report.converged);
        assert_eq!(report.attempts, 2);
        assert_eq!(report.observed_status, Some(MachineStatus::Active));
    }

    #[tokio::test]
    async fn test_reboot_rejected_action_surfaces_error() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_machines()
            .returning(|| Ok(vec![record(3, "kvm3", "10.0.0.3", MachineStatus::Active)]));
        provider
            .expect_perform_action()
            .returning(|_, _| Err(api_error(422)));
        provider.expect_get_machine().never();

        let err = Orchestrator::new(provider)
            .reboot("10.0.0.3")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FleetError::Provider(ProviderError::Api { status: 422, .. })
        ));
    }

    #[tokio::test]
    async fn test_power_cycle_submits_power_cycle() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_machines()
            .returning(|| Ok(vec![record(5, "kvm5", "10.0.0.5", MachineStatus::Active)]));
        provider
            .expect_perform_action()
            .withf(|id, kind| *id == MachineId(5) && *kind == ActionKind::PowerCycle)
            .times(1)
            .returning(|_, _| Ok(()));

        let id = Orchestrator::new(provider)
            .power_cycle("10.0.0.5")
            .await
            .unwrap();
        assert_eq!(id, MachineId(5));
    }

    #[tokio::test]
    async fn test_images_sorted_by_slug_unslugged_last() {
        let mut provider = MockProvider::new();
        provider.expect_list_images().returning(|| {
            Ok(vec![
                ImageInfo {
                    slug: None,
                    distribution: "Ubuntu".to_string(),
                    name: "my-snapshot".to_string(),
                },
                ImageInfo {
                    slug: Some("ubuntu-22-04-x64".to_string()),
                    distribution: "Ubuntu".to_string(),
                    name: "22.04 (LTS) x64".to_string(),
                },
                ImageInfo {
                    slug: Some("debian-12-x64".to_string()),
                    distribution: "Debian".to_string(),
                    name: "12 x64".to_string(),
                },
            ])
        });

        let images = Orchestrator::new(provider).images().await.unwrap();
        let slugs: Vec<_> = images.iter().map(|i| i.slug.as_deref()).collect();
        assert_eq!(
            slugs,
            vec![Some("debian-12-x64"), Some("ubuntu-22-04-x64"), None]
        );
    }

    #[tokio::test]
    async fn test_regions_lists_available_slugs() {
        let mut provider = MockProvider::new();
        provider.expect_list_regions().returning(|| {
            Ok(vec![
                RegionInfo {
                    slug: "nyc3".to_string(),
                    name: "New York 3".to_string(),
                    available: true,
                },
                RegionInfo {
                    slug: "nyc2".to_string(),
                    name: "New York 2".to_string(),
                    available: false,
                },
                RegionInfo {
                    slug: "ams3".to_string(),
                    name: "Amsterdam 3".to_string(),
                    available: true,
                },
            ])
        });

        let regions = Orchestrator::new(provider).regions().await.unwrap();
        assert_eq!(regions, vec!["nyc3", "ams3"]);
    }

    #[tokio::test]
    async fn test_check_builds_view() {
        let mut provider = MockProvider::new();
        provider.expect_list_machines().times(1).returning(|| {
            Ok(vec![
                record(1, "kvm1", "10.0.0.1", MachineStatus::Active),
                record(2, "kvm2", "10.0.0.2", MachineStatus::New),
            ])
        });

        let view = Orchestrator::new(provider).check().await.unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(
            view.login_lines("pw"),
            vec!["root:pw||10.0.0.1:22", "root:pw||10.0.0.2:22"]
        );
    }
}
