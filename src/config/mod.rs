use crate::models::{EffectDefinition, EffectHandler, MatchType, TriggerDefinition};
use crate::persistence::DiscoveryLedger;
use crate::registry::{EffectRegistry, RegistryError};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

/// Tunable engine settings, loaded from `Engine Settings.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Cap on simultaneously running effects.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_effects: usize,

    /// Trailing-edge debounce window for live text input.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Sliding window for click-burst triggers.
    #[serde(default = "default_click_window_ms")]
    pub click_window_ms: u64,

    /// Master switch at startup.
    #[serde(default = "default_true")]
    pub start_enabled: bool,

    /// Whether easter-egg mode is on from the start (also warms the
    /// preload cache immediately).
    #[serde(default)]
    pub start_in_easter_egg_mode: bool,
}

fn default_max_concurrent() -> usize {
    crate::models::DEFAULT_MAX_CONCURRENT_EFFECTS
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_click_window_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrent_effects: default_max_concurrent(),
            debounce_ms: default_debounce_ms(),
            click_window_ms: default_click_window_ms(),
            start_enabled: true,
            start_in_easter_egg_mode: false,
        }
    }
}

/// Serializable trigger/effect catalogue, loaded from `Egg Catalogue.yaml`.
///
/// Handlers cannot live in a YAML file; they are bound by id when the
/// catalogue is turned into an [`EffectRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueConfig {
    #[serde(default)]
    pub triggers: Vec<TriggerDefinition>,

    #[serde(default)]
    pub effects: Vec<EffectDefinition>,
}

impl CatalogueConfig {
    /// Build a registry from this catalogue, binding each effect to its
    /// handler by id. An effect with no handler is skipped with a warning
    /// rather than failing the whole catalogue — the site stays usable
    /// with the eggs that do resolve.
    pub fn build_registry(
        &self,
        mut handlers: HashMap<String, Arc<dyn EffectHandler>>,
    ) -> Result<EffectRegistry, RegistryError> {
        let mut registry = EffectRegistry::new();

        for effect in &self.effects {
            match handlers.remove(&effect.id) {
                Some(handler) => registry.register_effect(effect.clone(), handler)?,
                None => {
                    tracing::warn!("No handler bound for effect '{}', skipping", effect.id);
                }
            }
        }

        for trigger in &self.triggers {
            registry.register_trigger(trigger.clone())?;
        }

        Ok(registry)
    }
}

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two files in the data directory:
/// - `Engine Settings.yaml`: tunables ([`EngineSettings`])
/// - `Egg Catalogue.yaml`: trigger and effect definitions ([`CatalogueConfig`])
///
/// The discovery ledger shares the same directory; see
/// [`discovery_ledger`](Self::discovery_ledger).
#[derive(Debug, Clone)]
pub struct ConfigManager {
    data_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    catalogue_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at the given data directory,
    /// creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory: {data_dir}"))?;
        }

        Ok(Self {
            settings_path: data_dir.join("Engine Settings.yaml"),
            catalogue_path: data_dir.join("Egg Catalogue.yaml"),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// A discovery ledger rooted at the same data directory.
    pub fn discovery_ledger(&self) -> DiscoveryLedger {
        DiscoveryLedger::new(&self.data_dir)
    }

    /// Load the engine settings, or defaults if the file doesn't exist.
    pub fn load_settings(&self) -> Result<EngineSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(EngineSettings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: EngineSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the engine settings.
    pub fn save_settings(&self, settings: &EngineSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the catalogue, or a starter catalogue if the file doesn't
    /// exist.
    pub fn load_catalogue(&self) -> Result<CatalogueConfig> {
        if !self.catalogue_path.exists() {
            tracing::warn!(
                "Catalogue file not found at {}, using starter catalogue",
                self.catalogue_path
            );
            return Ok(Self::starter_catalogue());
        }

        let file_contents = fs::read_to_string(&self.catalogue_path)
            .with_context(|| format!("Failed to read catalogue: {}", self.catalogue_path))?;

        let catalogue: CatalogueConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse catalogue: {}", self.catalogue_path))?;

        tracing::info!(
            "Loaded catalogue from {} ({} triggers, {} effects)",
            self.catalogue_path,
            catalogue.triggers.len(),
            catalogue.effects.len()
        );
        Ok(catalogue)
    }

    /// Save the catalogue.
    pub fn save_catalogue(&self, catalogue: &CatalogueConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(catalogue).context("Failed to serialize catalogue to YAML")?;

        fs::write(&self.catalogue_path, yaml_string)
            .with_context(|| format!("Failed to write catalogue: {}", self.catalogue_path))?;

        tracing::info!("Saved catalogue to {}", self.catalogue_path);
        Ok(())
    }

    /// The catalogue used when none exists yet: the classic pair of eggs
    /// every install starts with. Hosts overwrite it with their own file.
    fn starter_catalogue() -> CatalogueConfig {
        CatalogueConfig {
            triggers: vec![
                TriggerDefinition::new("confetti", MatchType::Exact, "surprise"),
                TriggerDefinition::new("party", MatchType::Hashtag, "party"),
            ],
            effects: vec![
                EffectDefinition::new("confetti"),
                EffectDefinition::new("party"),
            ],
        }
    }
}
