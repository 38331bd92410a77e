//! # Configuration
//!
//! Studio settings live in `studio_config.yaml` at the root of the data
//! directory. The file is created with defaults on first start.
//!
//! ```yaml
//! storage: sqlite
//! bind_address: 127.0.0.1:3000
//! allowed_origin: http://localhost:8080
//! static_directory: ../client/dist
//! studio:
//!   name: ME Pilates
//!   owner_name: Roberta
//!   address: Rua Carazinho, 299, Petrópolis, POA
//!   public_url: http://localhost:8080/
//! ai:
//!   model: gemini-3-flash-preview
//!   api_key: ""
//! initial_plans:
//!   - { id: "1", name: Mensal - 1x/semana, price: 250.0 }
//! ```
//!
//! Environment overrides: `STUDIO_DATA_DIR` (data directory),
//! `STUDIO_BIND` (bind address), `GEMINI_API_KEY` (AI key).

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::PlanConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "studio_config.yaml";
const DEFAULT_DIRECTORY_NAME: &str = "Studio Manager";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Sqlite,
    Json,
}

/// Public details of the studio, used in generated messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioInfo {
    pub name: String,
    pub owner_name: String,
    pub address: String,
    pub phone: String,
    pub instagram: String,
    pub slogan: String,
    /// Base URL of the client app; student access links hang off it
    pub public_url: String,
}

impl Default for StudioInfo {
    fn default() -> Self {
        Self {
            name: "ME Pilates".to_string(),
            owner_name: "Roberta".to_string(),
            address: "Rua Carazinho, 299, Petrópolis, POA".to_string(),
            phone: "(51) 98765-4321".to_string(),
            instagram: "@mepilates.poa".to_string(),
            slogan: "Movimento Eficiente para fazer tudo que ama — sem dor!".to_string(),
            public_url: "http://localhost:8080/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub endpoint: String,
    pub model: String,
    /// Empty disables AI text; fallback templates are used instead
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key: String::new(),
            timeout_secs: 20,
        }
    }
}

impl AiSettings {
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Where this config and the studio data live. Not stored in the file.
    #[serde(skip)]
    pub data_directory: PathBuf,
    pub storage: StorageBackend,
    pub bind_address: String,
    pub allowed_origin: String,
    /// Built client files served for every non-API path, when set
    pub static_directory: Option<PathBuf>,
    pub studio: StudioInfo,
    pub ai: AiSettings,
    pub initial_plans: Vec<PlanConfig>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::new(),
            storage: StorageBackend::Sqlite,
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
            static_directory: None,
            studio: StudioInfo::default(),
            ai: AiSettings::default(),
            initial_plans: default_plans(),
        }
    }
}

pub fn default_plans() -> Vec<PlanConfig> {
    [
        ("1", "Mensal - 1x/semana", 250.0),
        ("2", "Trimestral - 2x/semana", 420.0),
        ("3", "Fidelidade - 2x/semana", 380.0),
        ("4", "Anual - VIP", 650.0),
    ]
    .into_iter()
    .map(|(id, name, price)| PlanConfig {
        id: id.to_string(),
        name: name.to_string(),
        price,
    })
    .collect()
}

impl StudioConfig {
    /// Resolve the data directory, load the config file from it (creating
    /// it when missing) and apply environment overrides
    pub fn load() -> Result<Self> {
        let data_directory = match std::env::var("STUDIO_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => default_data_directory()?,
        };

        let mut config = Self::load_or_create(&data_directory)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load `studio_config.yaml` from `data_directory`, writing defaults when
    /// the file does not exist yet
    pub fn load_or_create(data_directory: &Path) -> Result<Self> {
        if !data_directory.exists() {
            fs::create_dir_all(data_directory).with_context(|| {
                format!("Failed to create data directory {}", data_directory.display())
            })?;
        }

        let config_path = data_directory.join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            let yaml = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: StudioConfig = serde_yaml::from_str(&yaml)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            info!("Loaded config from {}", config_path.display());
            config
        } else {
            let config = StudioConfig::default();
            let yaml = serde_yaml::to_string(&config)?;
            fs::write(&config_path, yaml)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            info!("Created default config at {}", config_path.display());
            config
        };

        config.data_directory = data_directory.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Apply `STUDIO_BIND` and `GEMINI_API_KEY` from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("STUDIO_BIND").filter(|v| !v.trim().is_empty()) {
            info!("Bind address overridden by STUDIO_BIND: {}", bind);
            self.bind_address = bind.trim().to_string();
        }
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.ai.api_key = key.trim().to_string();
        }
        if !self.ai.is_enabled() {
            warn!("No AI key configured, messages will use fallback templates");
        }
    }

    fn validate(&self) -> Result<()> {
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("Invalid bind_address '{}'", self.bind_address));
        }
        if let Some(plan) = self.initial_plans.iter().find(|p| p.price < 0.0) {
            return Err(anyhow::anyhow!("Plan '{}' has a negative price", plan.name));
        }
        Ok(())
    }
}

/// `~/Documents/Studio Manager`, or `~/Studio Manager` when there is no
/// documents folder
pub fn default_data_directory() -> Result<PathBuf> {
    if let Some(documents) = dirs::document_dir() {
        return Ok(documents.join(DEFAULT_DIRECTORY_NAME));
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIRECTORY_NAME))
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}
