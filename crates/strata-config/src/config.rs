//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside a config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Voxel grid dimensions.
    pub grid: GridConfig,
    /// Cross-section settings.
    pub slice: SliceConfig,
    /// Generated demo terrain.
    pub terrain: TerrainConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Voxel grid dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub size_x: u32,
    pub size_y: u32,
    /// Height in voxels; `z` is up.
    pub size_z: u32,
    /// World units per voxel along each axis.
    pub scale: [f32; 3],
}

/// Cross-section settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SliceConfig {
    /// Starting cut height. `None` shows the whole grid.
    pub initial_top: Option<u32>,
    /// Draw a base plane under the bottom voxel row.
    pub draw_grid_bottom: bool,
}

/// Heightmap terrain generated by the demo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// RNG seed; the same seed always yields the same terrain and edits.
    pub seed: u64,
    /// Minimum column height.
    pub base_height: u32,
    /// Maximum extra height added on top of `base_height`.
    pub amplitude: u32,
    /// Number of random single-voxel edits to replay.
    pub edits: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,strata_surface=trace").
    pub log_level: String,
    /// Directory for log files. `None` places them under the config directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size_x: 32,
            size_y: 32,
            size_z: 16,
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            base_height: 2,
            amplitude: 8,
            edits: 64,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl GridConfig {
    /// Number of voxels in the grid.
    pub fn volume(&self) -> u64 {
        self.size_x as u64 * self.size_y as u64 * self.size_z as u64
    }
}

/// Default config directory: the platform config dir plus `strata`, falling
/// back to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("strata"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-reads the file; returns `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Replaces unusable values with defaults, logging each correction.
    ///
    /// A grid needs at least one voxel on every axis and a positive scale; a
    /// cut height above the grid is clamped to its top.
    pub fn sanitize(&mut self) {
        let defaults = GridConfig::default();
        for (name, value, fallback) in [
            ("size_x", &mut self.grid.size_x, defaults.size_x),
            ("size_y", &mut self.grid.size_y, defaults.size_y),
            ("size_z", &mut self.grid.size_z, defaults.size_z),
        ] {
            if *value == 0 {
                log::warn!("grid.{name} is 0, using {fallback}");
                *value = fallback;
            }
        }
        if self.grid.volume() > u32::MAX as u64 {
            log::warn!("grid of {} voxels is too large, using defaults", self.grid.volume());
            self.grid = defaults.clone();
        }
        if self.grid.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            log::warn!("grid.scale {:?} is not positive, using {:?}", self.grid.scale, defaults.scale);
            self.grid.scale = defaults.scale;
        }
        if let Some(top) = self.slice.initial_top
            && top > self.grid.size_z
        {
            log::warn!("slice.initial_top {top} exceeds grid height {}", self.grid.size_z);
            self.slice.initial_top = Some(self.grid.size_z);
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
