//! Layered configuration on top of [`figment`].
//!
//! Keys are `:`-separated paths (`Bootstrap:Components`) and compared
//! case-insensitively. Sources are merged in load order and later ones win
//! whole values, so an environment scalar replaces a list from the file:
//! a JSON file first, then environment variables where `__` stands for `:`.

mod settings;

pub use settings::{AppInfo, BootstrapSettings, DiscoveryMode};

use crate::error::{IgniteError, Result};
use figment::providers::{Env, Format, Json, Serialized};
use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Profile, Provider};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::str::FromStr;

/// Configuration service, cheap to clone
#[derive(Clone)]
pub struct ConfigService {
    figment: Figment,
}

impl Default for ConfigService {
    fn default() -> Self {
        Self {
            figment: Figment::new(),
        }
    }
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON file (if given) overlaid with the process environment.
    ///
    /// A missing or malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            std::fs::metadata(path).map_err(|source| IgniteError::ConfigFile {
                path: path.display().to_string(),
                source,
            })?;
            figment = figment.merge(Lowercase(Json::file(path)));
            tracing::debug!(path = %path.display(), "Loaded configuration file");
        }

        let service = Self {
            figment: figment.merge(environment()),
        };
        service.validate()?;
        Ok(service)
    }

    pub fn from_env() -> Result<Self> {
        let service = Self {
            figment: Figment::new().merge(environment()),
        };
        service.validate()?;
        Ok(service)
    }

    /// Seed from an in-memory JSON document. The root must be an object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let service = Self {
            figment: Figment::new().merge(Lowercase(Serialized::defaults(value))),
        };
        service.validate()?;
        Ok(service)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.find(key).as_ref().and_then(scalar_text)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a value, `Ok(None)` when the key is absent or blank.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| IgniteError::config(format!("invalid value '{raw}' for '{key}': {e}"))),
            _ => Ok(None),
        }
    }

    /// Ordered list under `key`: an array, or a comma-separated scalar.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.find(key) {
            Some(Value::Array(_, items)) => items.iter().filter_map(scalar_text).collect(),
            Some(value) => scalar_text(&value)
                .map(|raw| split_csv(&raw))
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Deserialize the section under `key`; `Ok(None)` when it is absent.
    pub fn extract<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = path(key);
        if self.figment.find_value(&path).is_err() {
            return Ok(None);
        }
        self.figment
            .extract_inner::<T>(&path)
            .map(Some)
            .map_err(|e| IgniteError::config(format!("invalid '{key}' section: {e}")))
    }

    /// Override a single value. Later calls win, like a later source would.
    pub fn set(&mut self, key: &str, value: &str) {
        let figment = std::mem::replace(&mut self.figment, Figment::new());
        self.figment = figment.merge(Serialized::default(&path(key), value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    fn find(&self, key: &str) -> Option<Value> {
        self.figment.find_value(&path(key)).ok()
    }

    /// Surface provider errors (e.g. a malformed file) at load time.
    fn validate(&self) -> Result<()> {
        self.figment
            .extract::<Dict>()
            .map(drop)
            .map_err(IgniteError::from)
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<&str> = self.figment.metadata().map(|m| m.name.as_ref()).collect();
        f.debug_struct("ConfigService")
            .field("sources", &sources)
            .finish()
    }
}

/// Environment variables, `A__B` nested as `a.b`. Entries that are not
/// valid UTF-8 are skipped by the provider.
fn environment() -> Lowercase<Env> {
    Lowercase(Env::raw().split("__"))
}

/// Lowercases every key of the wrapped provider, so sources agree on case.
struct Lowercase<P>(P);

impl<P: Provider> Provider for Lowercase<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> std::result::Result<Map<Profile, Dict>, figment::Error> {
        let data = self.0.data()?;
        Ok(data
            .into_iter()
            .map(|(profile, dict)| (profile, lowercase_dict(dict)))
            .collect())
    }

    fn profile(&self) -> Option<Profile> {
        self.0.profile()
    }
}

fn lowercase_dict(dict: Dict) -> Dict {
    dict.into_iter()
        .map(|(key, value)| (key.to_ascii_lowercase(), lowercase_value(value)))
        .collect()
}

fn lowercase_value(value: Value) -> Value {
    match value {
        Value::Dict(tag, dict) => Value::Dict(tag, lowercase_dict(dict)),
        Value::Array(tag, items) => Value::Array(tag, items.into_iter().map(lowercase_value).collect()),
        other => other,
    }
}

fn path(key: &str) -> String {
    key.to_ascii_lowercase().replace(':', ".")
}

/// Text of a scalar value; `None` for dictionaries and arrays.
fn scalar_text(value: &Value) -> Option<String> {
    match value.deserialize::<serde_json::Value>().ok()? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
