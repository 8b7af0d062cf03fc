use super::{ConfigService, split_csv};
use crate::error::Result;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Where bootstrap components come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DiscoveryMode {
    /// Every `#[bootstrapper]` type linked into the binary.
    #[default]
    Inventory,
    /// Only the names listed under `Bootstrap:Components`.
    Configured,
}

impl<'de> Deserialize<'de> for DiscoveryMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = scalar(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_str(raw.trim())
            .map_err(|_| de::Error::custom(format!("unknown discovery mode '{raw}'")))
    }
}

/// The `Bootstrap:*` configuration section.
///
/// Keys are matched in lowercase, so `RequireReady` and the environment's
/// `BOOTSTRAP__REQUIREREADY` land on the same field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    pub discovery: DiscoveryMode,
    #[serde(deserialize_with = "list")]
    pub components: Vec<String>,
    #[serde(rename = "requireready", alias = "require_ready", deserialize_with = "flag")]
    pub require_ready: bool,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            discovery: DiscoveryMode::Inventory,
            components: Vec::new(),
            require_ready: true,
        }
    }
}

impl BootstrapSettings {
    pub const SECTION: &'static str = "Bootstrap";
    pub const COMPONENTS_KEY: &'static str = "Bootstrap:Components";

    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let settings = config.extract::<Self>(Self::SECTION)?.unwrap_or_default();

        if settings.discovery == DiscoveryMode::Configured && settings.components.is_empty() {
            tracing::warn!(
                key = Self::COMPONENTS_KEY,
                "Configured discovery selected but no components are listed"
            );
        }
        Ok(settings)
    }
}

/// Descriptive application metadata served by `/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub version: String,
    #[serde(deserialize_with = "scalar")]
    pub description: String,
    #[serde(skip_serializing, deserialize_with = "scalar")]
    pub environment: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "ignite".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: String::new(),
            environment: "Production".to_string(),
        }
    }
}

impl AppInfo {
    pub const SECTION: &'static str = "App";

    /// `App:*`, with the environment falling back to a top-level
    /// `ENVIRONMENT` variable.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let mut info = config.extract::<Self>(Self::SECTION)?.unwrap_or_default();
        if let Some(environment) = config
            .get("ENVIRONMENT")
            .filter(|_| !config.contains("App:Environment"))
        {
            info.environment = environment;
        }
        Ok(info)
    }
}

/// Any scalar as text. Environment values arrive typed (`60`, `true`), file
/// values may be either.
fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!("expected a single value, found {other}"))),
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let raw = scalar(deserializer)?;
    raw.trim()
        .parse::<bool>()
        .map_err(|_| de::Error::custom(format!("expected true or false, found '{raw}'")))
}

/// An array of names or one comma-separated string.
fn list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Ok(s),
                other => Err(de::Error::custom(format!("expected a name, found {other}"))),
            })
            .collect(),
        serde_json::Value::String(raw) => Ok(split_csv(&raw)),
        other => Err(de::Error::custom(format!("expected a list of names, found {other}"))),
    }
}
