use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_ZONE_ID: &str = "uaa";
/// Secret behind the synthesized key served when no zone configures any key.
pub const DEFAULT_SIGNING_SECRET: &str = "tokenKey";

// Key server configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct KeyServerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub default_zone_id: String,
    pub key_authority: String,
    pub default_key_id: String,
    pub signing_secret: Option<String>,
    pub provisioning: ProvisioningConfig,
    pub zones: Vec<ZoneSeed>,
}

#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    pub enabled: bool,
    pub bind_addr: SocketAddr,
    pub token: Option<String>,
}

/// Zone declared in the YAML file and loaded into the store at startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ZoneSeed {
    pub zone_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default)]
    pub active_key_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyServerConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    default_zone_id: Option<String>,
    key_authority: Option<String>,
    default_key_id: Option<String>,
    signing_secret: Option<String>,
    provisioning_enabled: Option<bool>,
    provisioning_bind: Option<String>,
    provisioning_token: Option<String>,
    #[serde(default)]
    zones: Vec<ZoneSeed>,
}

impl KeyServerConfig {
    pub fn from_env() -> Result<Self> {
        let metrics_bind = std::env::var("KEYSERVER_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse KEYSERVER_METRICS_BIND")?;
        let bind_addr = std::env::var("KEYSERVER_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse KEYSERVER_BIND")?;
        let default_zone_id = std::env::var("KEYSERVER_DEFAULT_ZONE")
            .unwrap_or_else(|_| DEFAULT_ZONE_ID.to_string());
        let key_authority = std::env::var("KEYSERVER_KEY_AUTHORITY")
            .unwrap_or_else(|_| zonekeys::DEFAULT_KEY_AUTHORITY.to_string());
        let default_key_id = std::env::var("KEYSERVER_DEFAULT_KEY_ID")
            .unwrap_or_else(|_| zonekeys::DEFAULT_KEY_ID.to_string());
        let signing_secret = std::env::var("KEYSERVER_SIGNING_SECRET").ok();
        let provisioning_enabled = match std::env::var("KEYSERVER_PROVISIONING_ENABLED") {
            Ok(value) => parse_bool(&value).with_context(|| "parse KEYSERVER_PROVISIONING_ENABLED")?,
            Err(_) => false,
        };
        let provisioning_bind = std::env::var("KEYSERVER_PROVISIONING_BIND")
            .unwrap_or_else(|_| "127.0.0.1:8081".to_string())
            .parse()
            .with_context(|| "parse KEYSERVER_PROVISIONING_BIND")?;
        let provisioning_token = std::env::var("KEYSERVER_PROVISIONING_TOKEN").ok();
        Ok(Self {
            bind_addr,
            metrics_bind,
            default_zone_id,
            key_authority,
            default_key_id,
            signing_secret,
            provisioning: ProvisioningConfig {
                enabled: provisioning_enabled,
                bind_addr: provisioning_bind,
                token: provisioning_token,
            },
            zones: Vec::new(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("KEYSERVER_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read KEYSERVER_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: KeyServerConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse key server config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.default_zone_id {
            self.default_zone_id = value;
        }
        if let Some(value) = override_cfg.key_authority {
            self.key_authority = value;
        }
        if let Some(value) = override_cfg.default_key_id {
            self.default_key_id = value;
        }
        if let Some(value) = override_cfg.signing_secret {
            self.signing_secret = Some(value);
        }
        if let Some(value) = override_cfg.provisioning_enabled {
            self.provisioning.enabled = value;
        }
        if let Some(value) = override_cfg.provisioning_bind {
            self.provisioning.bind_addr =
                value.parse().with_context(|| "parse provisioning_bind")?;
        }
        if let Some(value) = override_cfg.provisioning_token {
            self.provisioning.token = Some(value);
        }
        self.zones.extend(override_cfg.zones);
        Ok(())
    }

    /// Secret for the synthesized default key.
    pub fn signing_secret(&self) -> &str {
        self.signing_secret
            .as_deref()
            .unwrap_or(DEFAULT_SIGNING_SECRET)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("invalid boolean value: {other}"),
    }
}
