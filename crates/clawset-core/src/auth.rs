//! Credential store (`agents/main/agent/auth-profiles.json`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::settings::Settings;

/// A stored credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthProfile {
    /// Always `api_key` for profiles written by this tool.
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    pub key: String,
}

impl AuthProfile {
    pub fn api_key(provider: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: "api_key".to_string(),
            provider: provider.into(),
            key: key.into(),
        }
    }
}

/// The whole credential document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthProfiles {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Profiles keyed by `<provider>:default`. Kept as raw JSON so profiles
    /// of kinds this tool does not know survive a rewrite.
    pub profiles: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> u32 {
    1
}

impl Default for AuthProfiles {
    fn default() -> Self {
        Self {
            version: 1,
            profiles: Map::new(),
            extra: Map::new(),
        }
    }
}

impl AuthProfiles {
    /// Synthetic key a provider's default profile lives under.
    pub fn profile_key(provider: &str) -> String {
        format!("{}:default", provider)
    }

    pub fn set(&mut self, profile: AuthProfile) -> Result<()> {
        let key = Self::profile_key(&profile.provider);
        self.profiles.insert(key, serde_json::to_value(profile)?);
        Ok(())
    }

    pub fn get(&self, provider: &str) -> Option<AuthProfile> {
        self.profiles
            .get(&Self::profile_key(provider))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Profile keys, in file order.
    pub fn keys(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

/// Read-modify-write access to the credential document.
#[derive(Debug, Clone)]
pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    pub fn new(settings: &Settings) -> Self {
        Self::at(settings.auth_profiles_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file, a non-object, or an object without
    /// `profiles` all read as an empty document.
    pub fn load(&self) -> Result<AuthProfiles> {
        if !self.path.exists() {
            return Ok(AuthProfiles::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let parsed: Value = serde_json::from_str(&content)?;
        let has_profiles = parsed
            .as_object()
            .and_then(|obj| obj.get("profiles"))
            .is_some_and(Value::is_object);
        if !has_profiles {
            return Ok(AuthProfiles::default());
        }
        Ok(serde_json::from_value(parsed)?)
    }

    pub fn save(&self, profiles: &AuthProfiles) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(profiles)?)?;
        Ok(())
    }

    /// Store `key` as the default API key for `provider`.
    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<()> {
        let mut profiles = self.load()?;
        profiles.set(AuthProfile::api_key(provider, key))?;
        self.save(&profiles)
    }
}
