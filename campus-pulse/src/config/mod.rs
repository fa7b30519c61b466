//! Configuration de l'application

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

/// Variable d'environnement pour l'URL de l'API de prévision
pub const ENV_API_URL: &str = "CARBON_PULSE_API_URL";

/// Variable d'environnement pour la graine de génération synthétique
pub const ENV_SEED: &str = "CARBON_PULSE_SEED";

/// Variable d'environnement pour forcer le mode hors ligne
pub const ENV_OFFLINE: &str = "CARBON_PULSE_OFFLINE";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// URL de base de l'API de prévision
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout d'une requête HTTP (secondes)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Nombre de jours d'historique par défaut
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    /// Graine de la génération synthétique (aléatoire si absente)
    #[serde(default)]
    pub seed: Option<u64>,

    /// N'appelle jamais l'API, utilise directement la génération synthétique
    #[serde(default)]
    pub offline: bool,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_history_days() -> u32 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_timeout(),
            history_days: default_history_days(),
            seed: None,
            offline: false,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "offline" => Self::load_embedded(include_str!("presets/offline.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default, offline", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Preset embarqué si `preset_or_path` en est un, sinon chemin vers un fichier JSON
    pub fn resolve(preset_or_path: &str) -> Result<Self> {
        match preset_or_path {
            "default" | "offline" => Self::from_preset(preset_or_path),
            path => Self::load(Path::new(path)),
        }
    }

    /// Applique les surcharges des variables d'environnement
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applique des surcharges depuis une source clé -> valeur
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(seed) = lookup(ENV_SEED).and_then(|s| s.trim().parse().ok()) {
            self.seed = Some(seed);
        }
        if let Some(offline) = lookup(ENV_OFFLINE).and_then(|s| parse_flag(&s)) {
            self.offline = offline;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
