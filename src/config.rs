//! SDK configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! configuration pointing at the public Translator production services. The
//! default location is `$XDG_CONFIG_HOME/translator-sdk/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::federation::AllFailedPolicy;

/// Top-level SDK configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub federation: FederationConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Settings for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (connect + read).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("translator-sdk/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Base URLs of the collaborator services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_name_resolver_url")]
    pub name_resolver_url: String,
    #[serde(default = "default_node_normalizer_url")]
    pub node_normalizer_url: String,
    #[serde(default = "default_node_annotator_url")]
    pub node_annotator_url: String,
    #[serde(default = "default_smartapi_url")]
    pub smartapi_url: String,
}

fn default_name_resolver_url() -> String {
    "https://name-lookup.transltr.io/".into()
}
fn default_node_normalizer_url() -> String {
    "https://nodenorm.transltr.io/".into()
}
fn default_node_annotator_url() -> String {
    "https://annotator.transltr.io/".into()
}
fn default_smartapi_url() -> String {
    "https://smart-api.info/".into()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            name_resolver_url: default_name_resolver_url(),
            node_normalizer_url: default_node_normalizer_url(),
            node_annotator_url: default_node_annotator_url(),
            smartapi_url: default_smartapi_url(),
        }
    }
}

/// Federated query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Provider calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Ceiling for a whole federated run; unset means wait for every provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_timeout_secs: Option<u64>,
    #[serde(default)]
    pub on_all_failed: AllFailedPolicy,
}

fn default_concurrency() -> usize {
    1
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            batch_timeout_secs: None,
            on_all_failed: AllFailedPolicy::default(),
        }
    }
}

/// Provider discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Server maturity levels in order of preference.
    #[serde(default = "default_maturity")]
    pub maturity: Vec<String>,
    /// Page size requested from the SmartAPI meta-KG endpoint.
    #[serde(default = "default_metakg_size")]
    pub metakg_size: u32,
    /// TRAPI servers absent from the SmartAPI meta-KG.
    #[serde(default = "default_secondary")]
    pub secondary: Vec<SecondarySource>,
}

/// A provider whose meta-KG is read from its own `/meta_knowledge_graph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondarySource {
    pub name: String,
    /// TRAPI base URL (without `/query`).
    pub url: String,
}

fn default_maturity() -> Vec<String> {
    vec![
        "production".into(),
        "testing".into(),
        "staging".into(),
        "development".into(),
    ]
}
fn default_metakg_size() -> u32 {
    20_000
}
fn default_secondary() -> Vec<SecondarySource> {
    [
        ("RTX KG2 - TRAPI 1.5.0", "https://kg2cploverdb.ci.transltr.io"),
        ("Multiomics ClinicalTrials KP", "https://multiomics.transltr.io/ctkp"),
        ("Multiomics Drug Approvals KP", "https://multiomics.transltr.io/dakp"),
        ("Multiomics Microbiome KP", "https://multiomics.transltr.io/mbkp"),
    ]
    .into_iter()
    .map(|(name, url)| SecondarySource {
        name: name.into(),
        url: url.into(),
    })
    .collect()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            maturity: default_maturity(),
            metakg_size: default_metakg_size(),
            secondary: default_secondary(),
        }
    }
}

impl SdkConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// `$XDG_CONFIG_HOME/translator-sdk/config.toml`, falling back to
    /// `$HOME/.config`.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let config_home = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .map_err(|_| ConfigError::NoHome)?,
        };
        Ok(config_home.join("translator-sdk").join("config.toml"))
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Ok(default) if default.is_file() => Self::load(&default),
            Ok(_) | Err(ConfigError::NoHome) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}
