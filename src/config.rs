//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/seqtree/seqtree.toml`
//! 3. Local config: `<dir>/.seqtree.toml`
//! 4. Environment variables: `SEQTREE_*` prefix (`__` separates sections)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DeletionMode, GeneratorConfig};

/// Defaults for `seqtree simulate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
    /// Length of the random root sequence
    pub root_length: usize,
    /// Levels below the root
    pub depth: usize,
    /// Children per internal node
    pub children: usize,
    /// Mutations per branch
    pub mutations: usize,
    pub max_insertion_length: usize,
    pub max_deletion_length: usize,
    pub point_weight: u32,
    pub insertion_weight: u32,
    pub deletion_weight: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            seed: None,
            root_length: 60,
            depth: 3,
            children: 2,
            mutations: 4,
            max_insertion_length: generator.max_insertion_length,
            max_deletion_length: generator.max_deletion_length,
            point_weight: generator.point_weight,
            insertion_weight: generator.insertion_weight,
            deletion_weight: generator.deletion_weight,
        }
    }
}

/// Raw simulation config for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSimulationConfig {
    pub seed: Option<u64>,
    pub root_length: Option<usize>,
    pub depth: Option<usize>,
    pub children: Option<usize>,
    pub mutations: Option<usize>,
    pub max_insertion_length: Option<usize>,
    pub max_deletion_length: Option<usize>,
    pub point_weight: Option<u32>,
    pub insertion_weight: Option<u32>,
    pub deletion_weight: Option<u32>,
}

impl SimulationConfig {
    /// Overlay wins field by field where it is set.
    pub fn merge(&self, overlay: &RawSimulationConfig) -> Self {
        Self {
            seed: overlay.seed.or(self.seed),
            root_length: overlay.root_length.unwrap_or(self.root_length),
            depth: overlay.depth.unwrap_or(self.depth),
            children: overlay.children.unwrap_or(self.children),
            mutations: overlay.mutations.unwrap_or(self.mutations),
            max_insertion_length: overlay
                .max_insertion_length
                .unwrap_or(self.max_insertion_length),
            max_deletion_length: overlay
                .max_deletion_length
                .unwrap_or(self.max_deletion_length),
            point_weight: overlay.point_weight.unwrap_or(self.point_weight),
            insertion_weight: overlay.insertion_weight.unwrap_or(self.insertion_weight),
            deletion_weight: overlay.deletion_weight.unwrap_or(self.deletion_weight),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub deletion_mode: Option<DeletionMode>,
    pub alphabet: Option<String>,
    #[serde(default)]
    pub simulation: RawSimulationConfig,
}

/// Unified configuration for seqtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Deletion variant for in-place edits
    pub deletion_mode: DeletionMode,
    /// Symbols used for random sequences and insertions
    pub alphabet: String,
    /// Simulation defaults
    pub simulation: SimulationConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deletion_mode: DeletionMode::default(),
            alphabet: "ACGT".to_string(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Get the XDG config directory for seqtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "seqtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("seqtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".seqtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            deletion_mode: overlay.deletion_mode.unwrap_or(self.deletion_mode),
            alphabet: overlay
                .alphabet
                .clone()
                .unwrap_or_else(|| self.alphabet.clone()),
            simulation: self.simulation.merge(&overlay.simulation),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.seqtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local_dir)
    }

    /// Same as [`load`](Self::load) with an explicit global config file.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        Self::load_layers_with_env(global_path, local_dir, None)
    }

    /// Same as [`load_layers`](Self::load_layers); `env` replaces the process
    /// environment as the source of `SEQTREE_*` variables when given.
    pub fn load_layers_with_env(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply SEQTREE_* environment variables as explicit overrides.
    ///
    /// `SEQTREE_DELETION_MODE`, `SEQTREE_ALPHABET`, `SEQTREE_SIMULATION__DEPTH`, ...
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SEQTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<String>(&config, "deletion_mode")? {
            settings.deletion_mode = match val.to_ascii_lowercase().as_str() {
                "compacting" => DeletionMode::Compacting,
                "exact" => DeletionMode::Exact,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("SEQTREE_DELETION_MODE: unknown mode '{}'", other),
                    })
                }
            };
        }
        if let Some(val) = env_value(&config, "alphabet")? {
            settings.alphabet = val;
        }

        let sim = &mut settings.simulation;
        if let Some(val) = env_value(&config, "simulation.seed")? {
            sim.seed = Some(val);
        }
        override_from(&config, "simulation.root_length", &mut sim.root_length)?;
        override_from(&config, "simulation.depth", &mut sim.depth)?;
        override_from(&config, "simulation.children", &mut sim.children)?;
        override_from(&config, "simulation.mutations", &mut sim.mutations)?;
        override_from(
            &config,
            "simulation.max_insertion_length",
            &mut sim.max_insertion_length,
        )?;
        override_from(
            &config,
            "simulation.max_deletion_length",
            &mut sim.max_deletion_length,
        )?;
        override_from(&config, "simulation.point_weight", &mut sim.point_weight)?;
        override_from(&config, "simulation.insertion_weight", &mut sim.insertion_weight)?;
        override_from(&config, "simulation.deletion_weight", &mut sim.deletion_weight)?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.alphabet.is_empty() || !self.alphabet.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ApplicationError::Config {
                message: format!(
                    "alphabet must be non-empty printable ASCII without spaces, got '{}'",
                    self.alphabet.escape_debug()
                ),
            });
        }
        let sim = &self.simulation;
        if sim.max_insertion_length == 0 || sim.max_deletion_length == 0 {
            return Err(ApplicationError::Config {
                message: "simulation.max_insertion_length and max_deletion_length must be at least 1"
                    .to_string(),
            });
        }
        if sim.point_weight == 0 && sim.insertion_weight == 0 && sim.deletion_weight == 0 {
            return Err(ApplicationError::Config {
                message: "simulation weights must not all be zero".to_string(),
            });
        }
        Ok(())
    }

    /// Generator settings derived from the alphabet and simulation section.
    pub fn generator_config(&self) -> GeneratorConfig {
        let sim = &self.simulation;
        GeneratorConfig {
            alphabet: self.alphabet.as_bytes().to_vec(),
            max_insertion_length: sim.max_insertion_length,
            max_deletion_length: sim.max_deletion_length,
            point_weight: sim.point_weight,
            insertion_weight: sim.insertion_weight,
            deletion_weight: sim.deletion_weight,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

/// Read an optional key; a present but unparsable value is an error.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("SEQTREE_{}: {}", key.replace('.', "__").to_uppercase(), e),
        }),
    }
}

fn override_from<T: DeserializeOwned>(
    config: &Config,
    key: &str,
    target: &mut T,
) -> Result<(), ApplicationError> {
    if let Some(val) = env_value(config, key)? {
        *target = val;
    }
    Ok(())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
