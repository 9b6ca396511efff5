//! Signer resolution from environment-provided credentials.

use std::collections::HashMap;

use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};

use crate::{DeployError, SignerSource};

/// Snapshot of the secrets available to signer sources, keyed by variable
/// name.
///
/// Taken once at startup so that every deployment in the process sees the
/// same credentials.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: HashMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.vars.keys().collect();
        names.sort();
        f.debug_struct("Credentials").field("vars", &names).finish()
    }
}

impl Credentials {
    /// Capture the current process environment.
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(var.into(), value.into());
        self
    }

    pub fn get(&self, var: &str) -> Option<&str> {
        self.vars.get(var).map(String::as_str)
    }

    /// Resolve the signer described by `source`.
    pub fn signer(&self, source: &SignerSource) -> Result<PrivateKeySigner, DeployError> {
        resolve_signer_with(source, |var| self.get(var).map(str::to_string))
    }
}

/// Resolve a local signer, reading secrets through `lookup`.
///
/// An unset or blank variable fails with [`DeployError::MissingCredential`].
pub fn resolve_signer_with<F>(source: &SignerSource, lookup: F) -> Result<PrivateKeySigner, DeployError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = source.env_var();
    let secret = lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DeployError::MissingCredential(var.to_string()))?;

    let invalid = |reason: String| DeployError::InvalidCredential {
        var: var.to_string(),
        reason,
    };

    match source {
        SignerSource::Env(_) => secret
            .parse::<PrivateKeySigner>()
            .map_err(|e| invalid(e.to_string())),
        SignerSource::Mnemonic { index, .. } => MnemonicBuilder::<English>::default()
            .phrase(secret.as_str())
            .index(*index)
            .map_err(|e| invalid(e.to_string()))?
            .build()
            .map_err(|e| invalid(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;

    use super::*;

    // Well-known development key (account #0 of the default test mnemonic).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn env(var: &'static str, value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == var).then(|| value.to_string())
    }

    #[test]
    fn test_private_key_from_env() {
        let signer =
            resolve_signer_with(&SignerSource::Env("KEY_A".to_string()), env("KEY_A", DEV_KEY))
                .unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_private_key_without_prefix() {
        let source = SignerSource::Env("KEY_A".to_string());
        let signer = resolve_signer_with(&source, env("KEY_A", &DEV_KEY[2..])).unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_missing_credential() {
        let source = SignerSource::Env("PRIVATE_KEY".to_string());
        let err = resolve_signer_with(&source, |_| None).unwrap_err();
        assert!(matches!(err, DeployError::MissingCredential(var) if var == "PRIVATE_KEY"));

        // A blank value is treated as absent.
        let err = resolve_signer_with(&source, env("PRIVATE_KEY", "  ")).unwrap_err();
        assert!(matches!(err, DeployError::MissingCredential(_)));
    }

    #[test]
    fn test_invalid_private_key() {
        let source = SignerSource::Env("PRIVATE_KEY".to_string());
        let err = resolve_signer_with(&source, env("PRIVATE_KEY", "0xnothex")).unwrap_err();
        assert!(matches!(err, DeployError::InvalidCredential { .. }));
    }

    #[test]
    fn test_credentials_snapshot() {
        let credentials = Credentials::default().with("KEY_A", DEV_KEY);
        let signer = credentials
            .signer(&SignerSource::Env("KEY_A".to_string()))
            .unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );

        assert!(matches!(
            credentials.signer(&SignerSource::Env("KEY_B".to_string())),
            Err(DeployError::MissingCredential(var)) if var == "KEY_B"
        ));
        // Secrets never show up in debug output.
        assert!(!format!("{credentials:?}").contains("ac0974"));
    }

    #[test]
    fn test_mnemonic_derivation() {
        let source = SignerSource::Mnemonic {
            env: "MNEMONIC".to_string(),
            index: 1,
        };
        let signer = resolve_signer_with(&source, env("MNEMONIC", DEV_MNEMONIC)).unwrap();
        assert_eq!(
            signer.address(),
            address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")
        );
    }
}
