//! Model catalog: what `openclaw models list` reports, and how vendors
//! narrow it down.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// PackyCode general API endpoint.
pub const PACKYCODE_BASE_URL: &str = "https://www.packyapi.com";
/// PackyCode Codex endpoint.
pub const PACKYCODE_CODEX_BASE_URL: &str = "https://codex-api.packycode.com";

/// Model names (the part after `provider/`) PackyCode serves.
const PACKYCODE_MODELS: &[&str] = &[
    "claude-3-5-haiku-20241022",
    "claude-3-5-sonnet-20240620",
    "claude-3-5-sonnet-20241022",
    "claude-3-7-sonnet-20250219",
    "claude-haiku-4-5-20251001",
    "claude-opus-4-1-20250805",
    "claude-opus-4-20250514",
    "claude-opus-4-5-20251101",
    "claude-sonnet-4-20250514",
    "claude-sonnet-4-5-20250929",
    "gpt-4o-mini",
    "gpt-5",
    "gpt-5-codex",
    "gpt-5-pro",
    "gpt-5.1",
    "gpt-5.1-codex",
    "gpt-5.1-codex-max",
    "gpt-5.2",
    "gpt-5.2-pro",
];

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub context_window: u64,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub missing: bool,
}

/// Output of `openclaw models list --all --json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsListing {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// Anything that can produce the model catalog.
pub trait ModelSource {
    /// Fetch the full catalog. Blocks until the source answers.
    fn list_models(&self) -> Result<ModelsListing>;
}

/// API families this tool can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: &'static [Provider] = &[Provider::OpenAi, Provider::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// The provider whose `name/` prefix starts `key`, limited to `allowed`
    /// (all providers when `None`).
    pub fn for_key(key: &str, allowed: Option<&[Provider]>) -> Option<Provider> {
        allowed
            .unwrap_or(Self::ALL)
            .iter()
            .copied()
            .find(|p| key.strip_prefix(p.as_str()).is_some_and(|rest| rest.starts_with('/')))
    }

    /// Endpoint to store for this provider given the vendor's base URL.
    /// OpenAI-compatible clients expect the `/v1` suffix.
    pub fn base_url(&self, vendor_base: &str) -> String {
        match self {
            Self::OpenAi => format!("{}/v1", vendor_base),
            Self::Anthropic => vendor_base.to_string(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model key without its `provider/` prefix.
pub fn model_suffix(key: &str) -> &str {
    key.split_once('/').map_or(key, |(_, rest)| rest)
}

/// Who serves the models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    PackyCode,
    Other,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PackyCode => "packycode",
            Self::Other => "other",
        }
    }

    pub fn filter(&self) -> VendorFilter {
        match self {
            Self::PackyCode => VendorFilter {
                providers: Provider::ALL,
                models: PACKYCODE_MODELS,
            },
            Self::Other => VendorFilter::default(),
        }
    }

    /// Fixed endpoint, if this vendor has one.
    pub fn fixed_base_url(&self, service: Option<ServiceType>) -> Option<&'static str> {
        match (self, service) {
            (Self::PackyCode, Some(ServiceType::Codex)) => Some(PACKYCODE_CODEX_BASE_URL),
            (Self::PackyCode, _) => Some(PACKYCODE_BASE_URL),
            (Self::Other, _) => None,
        }
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "packycode" => Ok(Self::PackyCode),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown vendor: {}", other)),
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PackyCode's two products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Api,
    Codex,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Codex => "codex",
        }
    }

    /// Provider name the credential is stored under.
    pub fn auth_provider(service: Option<ServiceType>, provider: Provider) -> String {
        match (service, provider) {
            (Some(Self::Codex), Provider::OpenAi) => "openai-codex".to_string(),
            _ => provider.as_str().to_string(),
        }
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "codex" => Ok(Self::Codex),
            other => Err(format!("unknown service type: {}", other)),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed providers and model names. Empty lists mean "no restriction".
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorFilter {
    pub providers: &'static [Provider],
    pub models: &'static [&'static str],
}

impl VendorFilter {
    pub fn is_open(&self) -> bool {
        self.providers.is_empty() && self.models.is_empty()
    }

    /// Providers to match keys against; `None` means any supported provider.
    pub fn allowed_providers(&self) -> Option<&'static [Provider]> {
        (!self.providers.is_empty()).then_some(self.providers)
    }

    pub fn accepts(&self, key: &str) -> bool {
        if self.is_open() {
            return true;
        }
        if Provider::for_key(key, self.allowed_providers()).is_none() {
            return false;
        }
        self.models.is_empty() || self.models.contains(&model_suffix(key))
    }
}

/// Narrow `models` to what `vendor` (and, for PackyCode, the service type)
/// can serve.
pub fn filter_models(
    models: Vec<ModelDescriptor>,
    vendor: Vendor,
    service: Option<ServiceType>,
) -> Vec<ModelDescriptor> {
    let filter = vendor.filter();
    models
        .into_iter()
        .filter(|m| filter.accepts(&m.key))
        .filter(|m| {
            service != Some(ServiceType::Codex)
                || Provider::for_key(&m.key, Some(&[Provider::OpenAi])).is_some()
        })
        .collect()
}
