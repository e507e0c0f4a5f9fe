//! dropfleet CLI - batch lifecycle management for DigitalOcean droplets.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dropfleet::config::DEFAULT_API_URL;
use dropfleet::lifecycle::{BatchReport, Orchestrator, RebootReport};
use dropfleet::{
    ClientConfig, CredentialConfig, DigitalOcean, InventoryView, MachineStatus, PollConfig,
    ProvisioningSpec,
};

/// dropfleet - provision and manage batches of DigitalOcean droplets.
///
/// Without a mode flag, creates `--total` droplets named `<name>1..<name>N`.
#[derive(Parser)]
#[command(name = "dropfleet", version)]
#[command(about = "Provision and manage batches of DigitalOcean droplets")]
#[command(group(
    ArgGroup::new("mode")
        .args(["check", "images", "region", "delete", "reboot", "power"])
        .multiple(false)
))]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Droplet name prefix.
    #[arg(short = 'n', long = "name", default_value = "kvm")]
    name: String,

    /// Region slug for new droplets.
    #[arg(short = 'r', value_name = "REGION", default_value = "nyc3")]
    location: String,

    /// Size slug for new droplets.
    #[arg(short = 's', long = "size", default_value = "s-4vcpu-8gb")]
    size: String,

    /// Image slug for new droplets.
    #[arg(short = 'i', long = "image", default_value = "ubuntu-22-04-x64")]
    image: String,

    /// DigitalOcean API token (or set `DIGITALOCEAN_TOKEN` env var).
    #[arg(long = "api", env = "DIGITALOCEAN_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Number of droplets to create.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    total: u32,

    /// Root password set on created droplets and shown in login lines.
    #[arg(long, env = "DROPFLEET_ROOT_PASSWORD", hide_env_values = true)]
    root_password: Option<String>,

    /// OpenSSH public key to register when the account has none.
    #[arg(long, env = "DROPFLEET_SSH_PUBLIC_KEY", conflicts_with = "ssh_public_key_file")]
    ssh_public_key: Option<String>,

    /// File containing the OpenSSH public key to register.
    #[arg(long)]
    ssh_public_key_file: Option<PathBuf>,

    /// Maximum number of concurrent create requests.
    #[arg(long, default_value = "1")]
    parallel: NonZeroUsize,

    /// API base URL.
    #[arg(long, default_value = DEFAULT_API_URL, hide = true)]
    api_url: String,

    /// Timeout in seconds for a single API request.
    #[arg(long, default_value = "30")]
    request_timeout: u64,

    /// Seconds to wait for a rebooted droplet to report active.
    #[arg(long, default_value = "180")]
    poll_timeout: u64,

    /// List droplets and print root login lines.
    #[arg(long)]
    check: bool,

    /// List images sorted by slug.
    #[arg(long)]
    images: bool,

    /// List available region slugs.
    #[arg(long)]
    region: bool,

    /// Delete the droplet with this address, or every droplet with `all`.
    #[arg(long, value_name = "ADDRESS|all")]
    delete: Option<String>,

    /// Reboot the droplet with this address and report its status.
    #[arg(long, value_name = "ADDRESS")]
    reboot: Option<String>,

    /// Power-cycle the droplet with this address.
    #[arg(long, value_name = "ADDRESS")]
    power: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

/// The single command selected for this invocation.
enum Mode {
    Create,
    Check,
    Images,
    Regions,
    DeleteAll,
    Delete(String),
    Reboot(String),
    Power(String),
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.images {
            Mode::Images
        } else if self.region {
            Mode::Regions
        } else if let Some(target) = &self.delete {
            if target.eq_ignore_ascii_case("all") {
                Mode::DeleteAll
            } else {
                Mode::Delete(target.clone())
            }
        } else if let Some(address) = &self.reboot {
            Mode::Reboot(address.clone())
        } else if let Some(address) = &self.power {
            Mode::Power(address.clone())
        } else {
            Mode::Create
        }
    }

    fn credentials(&self) -> Result<CredentialConfig> {
        let ssh_public_key = match &self.ssh_public_key_file {
            Some(path) => Some(read_public_key(path)?),
            None => self.ssh_public_key.clone(),
        };

        Ok(CredentialConfig {
            root_password: self.root_password.clone(),
            ssh_public_key,
        })
    }

    fn poll_config(&self) -> PollConfig {
        PollConfig {
            timeout: Duration::from_secs(self.poll_timeout),
            ..PollConfig::default()
        }
    }

    fn provisioning_spec(&self) -> ProvisioningSpec {
        ProvisioningSpec {
            name_prefix: self.name.clone(),
            count: self.total,
            region: self.location.clone(),
            size: self.size.clone(),
            image: self.image.clone(),
            ssh_key_ref: None,
            init_payload: String::new(),
        }
    }
}

fn read_public_key(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read SSH public key from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let credentials = cli.credentials()?;
    let config = ClientConfig::new(cli.api_token.clone())
        .context("Invalid API token")?
        .with_base_url(cli.api_url.clone())
        .with_request_timeout(Duration::from_secs(cli.request_timeout));
    let provider = DigitalOcean::new(config).context("Failed to create DigitalOcean client")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, not starting further requests");
                cancel.cancel();
            }
        }
    });

    let fleet = Orchestrator::new(provider)
        .with_cancellation(cancel)
        .with_poll_config(cli.poll_config())
        .with_parallelism(cli.parallel.get());

    let success = match cli.mode() {
        Mode::Create => {
            let spec = cli.provisioning_spec();
            let report = fleet
                .create(&spec, &credentials)
                .await
                .context("Failed to create droplets")?;
            print_batch("Created", &report);
            report.is_success()
        }

        Mode::Check => {
            let view = fleet.check().await.context("Failed to list droplets")?;
            print_inventory(&view, credentials.root_password.as_deref());
            true
        }

        Mode::Images => {
            let images = fleet.images().await.context("Failed to list images")?;
            println!("\n{:<32} {:<16} NAME", "SLUG", "DISTRIBUTION");
            println!("{}", "-".repeat(70));
            for image in images {
                println!(
                    "{:<32} {:<16} {}",
                    image.slug.as_deref().unwrap_or("-"),
                    image.distribution,
                    image.name
                );
            }
            true
        }

        Mode::Regions => {
            for slug in fleet.regions().await.context("Failed to list regions")? {
                println!("{slug}");
            }
            true
        }

        Mode::DeleteAll => {
            let report = fleet.delete_all().await.context("Failed to delete droplets")?;
            if report.results.is_empty() {
                println!("No droplets to delete");
            }
            print_batch("Deleted", &report);
            report.is_success()
        }

        Mode::Delete(address) => {
            let id = fleet
                .delete_one(&address)
                .await
                .with_context(|| format!("Failed to delete droplet at {address}"))?;
            println!("{} {address} (id {id}) deleted", "●".green());
            true
        }

        Mode::Reboot(address) => {
            let report = fleet
                .reboot(&address)
                .await
                .with_context(|| format!("Failed to reboot droplet at {address}"))?;
            print_reboot(&report);
            true
        }

        Mode::Power(address) => {
            let id = fleet
                .power_cycle(&address)
                .await
                .with_context(|| format!("Failed to power-cycle droplet at {address}"))?;
            println!("{} {address} (id {id}) power cycle accepted", "●".green());
            true
        }
    };

    if success {
        Ok(ExitCode::SUCCESS)
    } else {
        info!("Finished with failures");
        Ok(ExitCode::FAILURE)
    }
}

fn print_batch(verb: &str, report: &BatchReport) {
    for result in &report.results {
        let id = result.id.map(|id| format!(" (id {id})")).unwrap_or_default();
        if result.is_accepted() {
            println!("{} {}{id}: {}", "●".green(), result.target, result.detail);
        } else {
            println!("{} {}{id}: {}", "●".red(), result.target, result.detail.red());
        }
    }
    if !report.results.is_empty() {
        println!(
            "\n{verb} {}/{} ({} failed)",
            report.accepted(),
            report.results.len(),
            report.failed()
        );
    }
}

fn print_inventory(view: &InventoryView, root_password: Option<&str>) {
    println!(
        "\n{:<12} {:<16} {:<10} {:<8} {:<16} ADDRESSES",
        "ID", "NAME", "STATUS", "REGION", "SIZE"
    );
    println!("{}", "-".repeat(90));
    for machine in view.iter() {
        let status = format!("{:<10}", machine.status.to_string());
        let status = match machine.status {
            MachineStatus::Active => status.green(),
            MachineStatus::New => status.yellow(),
            _ => status.red(),
        };
        println!(
            "{:<12} {:<16} {status} {:<8} {:<16} {}",
            machine.id.to_string(),
            machine.name,
            machine.region,
            machine.size,
            machine.address_list()
        );
    }

    println!("{}", "=".repeat(30));
    match root_password {
        Some(password) => {
            for line in view.login_lines(password) {
                println!("{line}");
            }
        }
        None => warn!("No root password configured; login lines omitted"),
    }
}

fn print_reboot(report: &RebootReport) {
    let status = report
        .observed_status
        .map_or_else(|| "unknown".to_string(), |s| s.to_string());
    if report.converged {
        println!(
            "{} {} (id {}) rebooted, status {status}",
            "●".green(),
            report.target,
            report.id
        );
    } else {
        println!(
            "{} {} (id {}) reboot accepted, still transitioning after {} checks \
             (last status {status})",
            "●".yellow(),
            report.target,
            report.id,
            report.attempts
        );
    }
}
