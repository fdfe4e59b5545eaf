//! Registry configuration.

use std::path::Path;

use docreg_core::{Principal, DEFAULT_MAX_HOPS};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// The reserved burn identity that can never hold the admin role.
pub const DEFAULT_BURN_IDENTITY: &str = "SP000000000000000000002Q6VF78";

/// What `link_version` does when the old hash already has a successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelinkPolicy {
    /// Replace the previous successor (last writer wins).
    #[default]
    Overwrite,
    /// Fail with `AlreadyLinked` unless the successor is unchanged.
    Reject,
}

/// Configuration for the Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Admin installed when the store holds none yet.
    pub initial_admin: Principal,
    /// Identity that can never become admin.
    #[serde(default = "default_burn_identity")]
    pub burn_identity: Principal,
    /// Maximum edges followed when resolving a version chain.
    #[serde(default = "default_max_chain_hops")]
    pub max_chain_hops: usize,
    /// Relinking behaviour.
    #[serde(default)]
    pub relink_policy: RelinkPolicy,
}

fn default_burn_identity() -> Principal {
    Principal::new(DEFAULT_BURN_IDENTITY).expect("burn identity constant is a valid principal")
}

fn default_max_chain_hops() -> usize {
    DEFAULT_MAX_HOPS
}

impl RegistryConfig {
    /// Config with the given initial admin and defaults for everything else.
    pub fn new(initial_admin: Principal) -> Self {
        Self {
            initial_admin,
            burn_identity: default_burn_identity(),
            max_chain_hops: DEFAULT_MAX_HOPS,
            relink_policy: RelinkPolicy::default(),
        }
    }

    pub fn with_max_chain_hops(mut self, hops: usize) -> Self {
        self.max_chain_hops = hops;
        self
    }

    pub fn with_relink_policy(mut self, policy: RelinkPolicy) -> Self {
        self.relink_policy = policy;
        self
    }

    pub fn with_burn_identity(mut self, burn: Principal) -> Self {
        self.burn_identity = burn;
        self
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.initial_admin == self.burn_identity {
            return Err(RegistryError::InvalidAdmin(self.initial_admin.clone()));
        }
        if self.max_chain_hops == 0 {
            return Err(RegistryError::Config("max_chain_hops must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::new(Principal::new("ST1ADMIN").unwrap());
        assert_eq!(config.burn_identity.as_str(), DEFAULT_BURN_IDENTITY);
        assert_eq!(config.max_chain_hops, DEFAULT_MAX_HOPS);
        assert_eq!(config.relink_policy, RelinkPolicy::Overwrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = RegistryConfig::from_json(r#"{ "initial_admin": "ST1ADMIN" }"#).unwrap();
        assert_eq!(config, RegistryConfig::new(Principal::new("ST1ADMIN").unwrap()));

        let config = RegistryConfig::from_json(
            r#"{ "initial_admin": "A1", "max_chain_hops": 8, "relink_policy": "reject" }"#,
        )
        .unwrap();
        assert_eq!(config.max_chain_hops, 8);
        assert_eq!(config.relink_policy, RelinkPolicy::Reject);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            RegistryConfig::from_json(r#"{ "initial_admin": "" }"#),
            Err(RegistryError::Config(_))
        ));
        assert!(matches!(
            RegistryConfig::from_json(r#"{ "initial_admin": "A1", "max_chain_hops": 0 }"#),
            Err(RegistryError::Config(_))
        ));
        assert!(matches!(
            RegistryConfig::from_json(&format!(
                r#"{{ "initial_admin": "{}" }}"#,
                DEFAULT_BURN_IDENTITY
            )),
            Err(RegistryError::InvalidAdmin(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, r#"{ "initial_admin": "ST1ADMIN", "max_chain_hops": 32 }"#).unwrap();

        let config = RegistryConfig::load(&path).unwrap();
        assert_eq!(config.max_chain_hops, 32);

        assert!(RegistryConfig::load(dir.path().join("missing.json")).is_err());
    }
}
