//! The OpenClaw configuration document (`openclaw.json`).
//!
//! Only the fields this tool touches are typed. Everything else is kept in
//! `extra` maps so a read-modify-write cycle never drops unrelated settings.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{ClawsetError, Result};
use crate::settings::Settings;

/// Top-level `openclaw.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenclawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelsSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<AgentsSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaSection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `models`: provider endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `agents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<AgentDefaults>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `agents.defaults`: the model every agent starts with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSelection>,

    /// Per-model overrides, keyed by model key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `meta`: the gateway watches `lastTouchedAt` and reloads when it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaSection {
    #[serde(
        rename = "lastTouchedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_touched_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `models.providers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    pub base_url: String,
    #[serde(default)]
    pub models: Vec<Value>,
}

impl ProviderEntry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            models: Vec::new(),
        }
    }
}

impl OpenclawConfig {
    /// Load config from a JSON file. A missing file is an empty document.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClawsetError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ClawsetError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Save config as pretty-printed JSON, replacing the whole file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace the endpoint for `provider` and switch provider merging on.
    pub fn set_provider(&mut self, provider: &str, entry: ProviderEntry) -> Result<()> {
        let models = self.models.get_or_insert_with(Default::default);
        models.mode = Some("merge".to_string());
        models
            .providers
            .get_or_insert_with(Default::default)
            .insert(provider.to_string(), serde_json::to_value(entry)?);
        Ok(())
    }

    /// Make `model_key` the primary model, registering it if it is new.
    pub fn set_primary_model(&mut self, model_key: &str) {
        let defaults = self
            .agents
            .get_or_insert_with(Default::default)
            .defaults
            .get_or_insert_with(Default::default);

        defaults
            .model
            .get_or_insert_with(Default::default)
            .primary = Some(model_key.to_string());

        defaults
            .models
            .get_or_insert_with(Default::default)
            .entry(model_key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    /// Stamp `meta.lastTouchedAt` with the current UTC time.
    pub fn touch(&mut self) {
        self.meta.get_or_insert_with(Default::default).last_touched_at =
            Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    pub fn primary_model(&self) -> Option<&str> {
        self.defaults()?.model.as_ref()?.primary.as_deref()
    }

    /// Model keys registered under `agents.defaults.models`, in file order.
    pub fn configured_models(&self) -> Vec<String> {
        self.defaults()
            .and_then(|d| d.models.as_ref())
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Base URL configured for `provider`, if any.
    pub fn provider_base_url(&self, provider: &str) -> Option<&str> {
        self.models
            .as_ref()?
            .providers
            .as_ref()?
            .get(provider)?
            .get("baseUrl")?
            .as_str()
    }

    /// Names of the configured providers, in file order.
    pub fn provider_names(&self) -> Vec<String> {
        self.models
            .as_ref()
            .and_then(|m| m.providers.as_ref())
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn defaults(&self) -> Option<&AgentDefaults> {
        self.agents.as_ref()?.defaults.as_ref()
    }
}

/// Read-modify-write access to `openclaw.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(settings: &Settings) -> Self {
        Self::at(settings.config_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<OpenclawConfig> {
        OpenclawConfig::load(&self.path)
    }

    /// Load, apply `f`, and write the whole document back.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut OpenclawConfig) -> Result<()>,
    {
        let mut config = self.load()?;
        f(&mut config)?;
        config.save(&self.path)
    }

    pub fn set_provider_config(&self, provider: &str, entry: ProviderEntry) -> Result<()> {
        self.update(|c| c.set_provider(provider, entry))
    }

    pub fn set_model(&self, model_key: &str) -> Result<()> {
        self.update(|c| {
            c.set_primary_model(model_key);
            Ok(())
        })
    }

    pub fn touch(&self) -> Result<()> {
        self.update(|c| {
            c.touch();
            Ok(())
        })
    }

    pub fn primary_model(&self) -> Result<Option<String>> {
        Ok(self.load()?.primary_model().map(str::to_string))
    }

    pub fn configured_models(&self) -> Result<Vec<String>> {
        Ok(self.load()?.configured_models())
    }
}
