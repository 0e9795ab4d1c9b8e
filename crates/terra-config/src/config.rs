//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// How generators are sampled onto tiles.
    pub generator: GeneratorConfig,
    /// Tile streaming settings.
    pub tiles: TileConfig,
    /// Node graph file selection.
    pub graph: GraphConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Sampling parameters shared by every tile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World-space edge length of one tile.
    pub length: f64,
    /// Samples per tile edge.
    pub resolution: u32,
    /// World coordinates are divided by this before querying a generator.
    pub spread: f64,
    /// World seed used for per-tile vegetation scattering.
    pub seed: u64,
}

/// Tile streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    /// Radius, in tiles, kept active around the tracked anchor.
    pub generation_radius: u32,
    /// Maximum number of inactive tiles retained for reuse.
    pub cache_size: usize,
    /// Background tile builder threads. `0` builds tiles on the scheduling thread.
    pub worker_threads: usize,
}

/// Node graph configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Graph file currently associated with the terrain, if any.
    pub selected_file: Option<PathBuf>,
    /// Name given to freshly created template graphs.
    pub default_graph_name: String,
    /// Edge length of node preview images, in pixels.
    pub preview_size: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 100.0,
            resolution: 64,
            spread: 100.0,
            seed: 1337,
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            generation_radius: 3,
            cache_size: 30,
            worker_threads: 2,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            selected_file: None,
            default_graph_name: "default".to_string(),
            preview_size: 100,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Platform config directory for Terra (`<config_dir>/terra`), if one exists.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("terra"))
    }

    /// Path of the config file inside `config_dir`.
    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Reads `config.ron` from `config_dir`, writing the defaults first if the file is
    /// missing. The result is validated either way.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::file_path(config_dir);
        if !path.exists() {
            let config = Self::default();
            config.save(config_dir)?;
            log::info!("wrote default terrain config to {}", path.display());
            return Ok(config);
        }

        let config = Self::read(&path)?;
        config.validate()?;
        log::info!(
            "loaded terrain config from {} (radius {}, resolution {})",
            path.display(),
            config.tiles.generation_radius,
            config.generator.resolution
        );
        Ok(config)
    }

    /// Writes the config as pretty RON, creating `config_dir` if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::file_path(config_dir);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, text).map_err(write_err)
    }

    /// Re-reads the file and returns the new config only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&Self::file_path(config_dir))?;
        fresh.validate()?;
        if fresh == *self {
            return Ok(None);
        }
        if fresh.tiles != self.tiles || fresh.generator != self.generator {
            log::info!("terrain settings changed; active tiles are stale");
        }
        Ok(Some(fresh))
    }

    /// Rejects values the sampler or tile pool cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generator = &self.generator;
        if generator.length.is_nan() || generator.length <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "generator.length",
                reason: "must be positive",
            });
        }
        if generator.resolution == 0 {
            return Err(ConfigError::Invalid {
                field: "generator.resolution",
                reason: "must be at least 1",
            });
        }
        if generator.spread == 0.0 || !generator.spread.is_finite() {
            return Err(ConfigError::Invalid {
                field: "generator.spread",
                reason: "must be finite and non-zero",
            });
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_a_small_world() {
        let text =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new())
                .unwrap();
        assert!(text.contains("resolution: 64"));
        assert!(text.contains("cache_size: 30"));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_selected_graph_survives_ron() {
        let mut config = Config::default();
        config.graph.selected_file = Some(PathBuf::from("graphs/islands.json"));
        let back: Config = ron::from_str(&ron::to_string(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_files_fill_in_defaults() {
        let config: Config = ron::from_str("(generator: (length: 250.0))").unwrap();
        assert_eq!(config.generator.length, 250.0);
        assert_eq!(config.generator.resolution, 64);
        assert_eq!(config.tiles, TileConfig::default());

        assert!(ron::from_str::<Config>("(future_setting: true)").is_ok());
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("terra");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::file_path(&nested).exists());
    }

    #[test]
    fn test_saved_overrides_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.tiles.generation_radius = 6;
        config.generator.spread = 42.0;
        config.save(dir.path()).unwrap();

        assert_eq!(Config::load_or_create(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_reload_reports_only_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut edited = config.clone();
        edited.tiles.cache_size = 8;
        edited.save(dir.path()).unwrap();
        let fresh = config.reload(dir.path()).unwrap();
        assert_eq!(fresh.map(|c| c.tiles.cache_size), Some(8));
    }

    #[test]
    fn test_broken_files_name_their_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::file_path(dir.path()), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_unusable_sampling_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.generator.resolution = 0;
        config.save(dir.path()).unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::Invalid {
                field: "generator.resolution",
                ..
            })
        ));

        config.generator.resolution = 8;
        config.generator.length = -1.0;
        assert!(config.validate().is_err());
    }
}
