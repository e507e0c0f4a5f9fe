//! Bootstrap credential material attached to created droplets.
//!
//! Two pieces are produced per create run:
//!
//! - the cloud-init user data that sets the root password and opens SSH
//!   password login, and
//! - the fingerprint of an account SSH key (reused when one exists,
//!   registered from the operator's public key otherwise).
//!
//! Neither has a built-in default.

use tracing::info;

use crate::error::{FleetError, Result};
use crate::providers::{BootstrapKeyMaterial, Provider};

/// Name given to a key registered by this tool.
pub const SSH_KEY_NAME: &str = "dropfleet";

/// Characters that would break out of the quoted `chpasswd` line.
const FORBIDDEN_PASSWORD_CHARS: &[char] = &['"', '\'', '\\', '$', '`'];

/// Reject passwords the generated shell line cannot carry verbatim.
///
/// # Errors
/// Returns a configuration error for empty passwords, quotes, backslashes,
/// `$`, backticks, whitespace, or control characters.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(FleetError::Config("root password must not be empty".to_string()));
    }
    if let Some(c) = password
        .chars()
        .find(|c| FORBIDDEN_PASSWORD_CHARS.contains(c) || c.is_control() || c.is_whitespace())
    {
        return Err(FleetError::Config(format!(
            "root password contains unsupported character {c:?}"
        )));
    }
    Ok(())
}

/// Render the cloud-init user data for a batch.
///
/// Every step is safe to re-run: `chpasswd` overwrites, the `sed` edits are
/// no-ops once applied, and the drop-in file is replaced wholesale.
///
/// # Errors
/// Returns a configuration error if the password is rejected by
/// [`validate_password`].
pub fn init_payload(root_password: &str) -> Result<String> {
    validate_password(root_password)?;

    Ok(format!(
        r#"#cloud-config
runcmd:
  - echo "root:{root_password}" | chpasswd
  - sed -i "s/#PermitRootLogin prohibit-password/PermitRootLogin yes/" /etc/ssh/sshd_config
  - sed -i "s/PasswordAuthentication no/PasswordAuthentication yes/" /etc/ssh/sshd_config
  - echo "PasswordAuthentication yes" > /etc/ssh/sshd_config.d/50-cloud-init.conf
  - service sshd restart
"#
    ))
}

/// Resolve the account SSH key, registering the configured one if needed.
///
/// The first key already registered with the account is reused. Keys are
/// never deleted.
///
/// # Errors
/// Returns a configuration error when the account has no key and none was
/// configured, or the provider error from listing/registration.
pub async fn ensure_ssh_key<P: Provider + ?Sized>(
    provider: &P,
    public_key: Option<&str>,
) -> Result<BootstrapKeyMaterial> {
    if let Some(existing) = provider.list_ssh_keys().await?.into_iter().next() {
        info!(fingerprint = %existing.fingerprint, "Reusing registered SSH key");
        return Ok(existing);
    }

    let public_key = public_key.map(str::trim).filter(|k| !k.is_empty()).ok_or_else(|| {
        FleetError::Config(
            "the account has no SSH key; supply one with --ssh-public-key or --ssh-public-key-file"
                .to_string(),
        )
    })?;

    Ok(provider.register_ssh_key(SSH_KEY_NAME, public_key).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;

    fn key(fingerprint: &str) -> BootstrapKeyMaterial {
        BootstrapKeyMaterial {
            public_key: "ssh-ed25519 AAAA test".to_string(),
            fingerprint: fingerprint.to_string(),
        }
    }

    #[test]
    fn test_payload_sets_password_and_enables_login() {
        let payload = init_payload("s3cretPass").unwrap();
        assert!(payload.starts_with("#cloud-config\n"));
        assert!(payload.contains(r#"echo "root:s3cretPass" | chpasswd"#));
        assert!(payload.contains("PermitRootLogin yes"));
        assert!(payload.contains("service sshd restart"));
    }

    #[test]
    fn test_rejects_unsafe_passwords() {
        for bad in ["", "a\"b", "a'b", "a$b", "a`b", "a\\b", "a b", "a\nb"] {
            assert!(init_payload(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_reuses_first_registered_key() {
        let mut provider = MockProvider::new();
        provider
            .expect_list_ssh_keys()
            .times(1)
            .returning(|| Ok(vec![key("aa:aa"), key("bb:bb")]));
        provider.expect_register_ssh_key().never();

        let material = ensure_ssh_key(&provider, Some("ssh-ed25519 BBBB new"))
            .await
            .unwrap();
        assert_eq!(material.fingerprint, "aa:aa");
    }

    #[tokio::test]
    async fn test_registers_configured_key_when_account_has_none() {
        let mut provider = MockProvider::new();
        provider.expect_list_ssh_keys().returning(|| Ok(vec![]));
        provider
            .expect_register_ssh_key()
            .withf(|name, public_key| {
                name.to_string() == SSH_KEY_NAME && public_key.to_string() == "ssh-ed25519 BBBB new"
            })
            .times(1)
            .returning(|_, _| Ok(key("cc:cc")));

        let material = ensure_ssh_key(&provider, Some("  ssh-ed25519 BBBB new\n"))
            .await
            .unwrap();
        assert_eq!(material.fingerprint, "cc:cc");
    }

    #[tokio::test]
    async fn test_refuses_without_any_key_source() {
        let mut provider = MockProvider::new();
        provider.expect_list_ssh_keys().returning(|| Ok(vec![]));
        provider.expect_register_ssh_key().never();

        let err = ensure_ssh_key(&provider, None).await.unwrap_err();
        assert!(matches!(err, FleetError::Config(_)));
    }
}
