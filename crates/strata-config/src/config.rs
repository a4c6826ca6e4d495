//! Configuration structs with sensible defaults, validation and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "worldgen.ron";

/// Top-level world-generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Seed, sea level, rock strata and climate layer shape.
    pub general: GeneralConfig,
    /// Cave carving cutoffs.
    pub caves: CavesConfig,
    /// Temperature and rainfall classification cutoffs.
    pub biomes: BiomesConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Spatial orientation of a climate layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NoiseLayerType {
    /// Value cycles along the X axis with the layer scale as period.
    PeriodicX,
    /// Value cycles along the Z axis with the layer scale as period.
    PeriodicZ,
    /// Plain noise with no preferred direction.
    Noise,
}

/// General world-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// World seed.
    pub seed: u64,
    /// Single bedrock layer at `y = 0` instead of a rough floor up to `y = 4`.
    pub flat_bedrock: bool,
    /// Sea level in blocks, `[0, 256]`.
    pub sea_level: i32,
    /// Biome zoom level, `[1, 20]`. Larger values produce larger climate detail cells.
    pub biome_zoom_level: u32,
    /// Bottom rock layer size: a layer is on average `2^(4 + zoom)` blocks wide. `[1, 20]`.
    pub rock_bottom_zoom_level: u32,
    /// Middle rock layer size, same formula. `[1, 20]`.
    pub rock_middle_zoom_level: u32,
    /// Top rock layer size, same formula. `[1, 20]`.
    pub rock_top_zoom_level: u32,
    /// Nominal thickness of the bottom and middle strata, `[0, 256]`.
    pub rock_layer_height: i32,
    /// Maximum vertical jitter of strata boundaries, `[0, 256]`.
    pub rock_layer_spread: i32,
    /// How temperature is generated.
    pub temperature_layer_type: NoiseLayerType,
    /// How spread out the temperature layer is, in blocks. `[1000, 1000000]`.
    pub temperature_layer_scale: u32,
    /// How rainfall is generated.
    pub rainfall_layer_type: NoiseLayerType,
    /// How spread out the rainfall layer is, in blocks. `[1000, 1000000]`.
    pub rainfall_layer_scale: u32,
    /// Columns within this many blocks of sea level use the shore surface. `[0, 16]`.
    pub shore_band: i32,
}

/// Cave carving settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CavesConfig {
    /// Height above which caves fade out, `[0, 256]`.
    pub height_fade: i32,
    /// Base field must exceed this for a cave to open, `[0, 1]`.
    pub base_noise_cutoff: f64,
    /// Cave field magnitude must stay under this to carve, `[0, 1]`.
    pub noise_cutoff: f64,
}

/// Climate classification cutoffs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomesConfig {
    /// Upper temperature bound of the frozen class, `[-20, 50]`.
    pub frozen_temperature_cutoff: i32,
    /// Upper temperature bound of the cold class, `[-20, 50]`.
    pub cold_temperature_cutoff: i32,
    /// Upper temperature bound of the normal class, `[-20, 50]`.
    pub normal_temperature_cutoff: i32,
    /// Upper temperature bound of the lukewarm class, `[-20, 50]`.
    pub lukewarm_temperature_cutoff: i32,
    /// Upper rainfall bound of the arid class, `[0, 500]`.
    pub arid_rainfall_cutoff: i32,
    /// Upper rainfall bound of the dry class, `[0, 500]`.
    pub dry_rainfall_cutoff: i32,
    /// Upper rainfall bound of the normal class, `[0, 500]`.
    pub normal_rainfall_cutoff: i32,
    /// Upper rainfall bound of the damp class, `[0, 500]`.
    pub damp_rainfall_cutoff: i32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            flat_bedrock: false,
            sea_level: 96,
            biome_zoom_level: 4,
            rock_bottom_zoom_level: 7,
            rock_middle_zoom_level: 7,
            rock_top_zoom_level: 5,
            rock_layer_height: 50,
            rock_layer_spread: 10,
            temperature_layer_type: NoiseLayerType::PeriodicZ,
            temperature_layer_scale: 20_000,
            rainfall_layer_type: NoiseLayerType::PeriodicX,
            rainfall_layer_scale: 20_000,
            shore_band: 2,
        }
    }
}

impl Default for CavesConfig {
    fn default() -> Self {
        Self {
            height_fade: 94,
            base_noise_cutoff: 0.3,
            noise_cutoff: 0.38,
        }
    }
}

impl Default for BiomesConfig {
    fn default() -> Self {
        Self {
            frozen_temperature_cutoff: -2,
            cold_temperature_cutoff: 6,
            normal_temperature_cutoff: 14,
            lukewarm_temperature_cutoff: 22,
            arid_rainfall_cutoff: 125,
            dry_rainfall_cutoff: 200,
            normal_rainfall_cutoff: 300,
            damp_rainfall_cutoff: 375,
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

impl BiomesConfig {
    /// Temperature cutoffs in class order (frozen, cold, normal, lukewarm).
    pub fn temperature_cutoffs(&self) -> [i32; 4] {
        [
            self.frozen_temperature_cutoff,
            self.cold_temperature_cutoff,
            self.normal_temperature_cutoff,
            self.lukewarm_temperature_cutoff,
        ]
    }

    /// Rainfall cutoffs in class order (arid, dry, normal, damp).
    pub fn rainfall_cutoffs(&self) -> [i32; 4] {
        [
            self.arid_rainfall_cutoff,
            self.dry_rainfall_cutoff,
            self.normal_rainfall_cutoff,
            self.damp_rainfall_cutoff,
        ]
    }
}

/// Default directory holding `worldgen.ron`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn check_increasing(group: &'static str, cutoffs: &[i32]) -> Result<(), ConfigError> {
    if cutoffs.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        Err(ConfigError::Unordered { group })
    }
}

// --- Validation ---

impl WorldGenConfig {
    /// Reject settings outside their documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.general;
        check_range("general.sea_level", g.sea_level.into(), 0.0, 256.0)?;
        check_range("general.biome_zoom_level", g.biome_zoom_level.into(), 1.0, 20.0)?;
        check_range(
            "general.rock_bottom_zoom_level",
            g.rock_bottom_zoom_level.into(),
            1.0,
            20.0,
        )?;
        check_range(
            "general.rock_middle_zoom_level",
            g.rock_middle_zoom_level.into(),
            1.0,
            20.0,
        )?;
        check_range(
            "general.rock_top_zoom_level",
            g.rock_top_zoom_level.into(),
            1.0,
            20.0,
        )?;
        check_range("general.rock_layer_height", g.rock_layer_height.into(), 0.0, 256.0)?;
        check_range("general.rock_layer_spread", g.rock_layer_spread.into(), 0.0, 256.0)?;
        check_range(
            "general.temperature_layer_scale",
            g.temperature_layer_scale.into(),
            1000.0,
            1_000_000.0,
        )?;
        check_range(
            "general.rainfall_layer_scale",
            g.rainfall_layer_scale.into(),
            1000.0,
            1_000_000.0,
        )?;
        check_range("general.shore_band", g.shore_band.into(), 0.0, 16.0)?;

        let c = &self.caves;
        check_range("caves.height_fade", c.height_fade.into(), 0.0, 256.0)?;
        check_range("caves.base_noise_cutoff", c.base_noise_cutoff, 0.0, 1.0)?;
        check_range("caves.noise_cutoff", c.noise_cutoff, 0.0, 1.0)?;

        let b = &self.biomes;
        for cutoff in b.temperature_cutoffs() {
            check_range("biomes.temperature_cutoff", cutoff.into(), -20.0, 50.0)?;
        }
        for cutoff in b.rainfall_cutoffs() {
            check_range("biomes.rainfall_cutoff", cutoff.into(), 0.0, 500.0)?;
        }
        check_increasing("temperature", &b.temperature_cutoffs())?;
        check_increasing("rainfall", &b.rainfall_cutoffs())?;
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl WorldGenConfig {
    /// Load config from the given directory, or create a default config file.
    ///
    /// Loaded values are validated before being returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded worldgen config from {}", config_path.display());
            Ok(config)
        } else {
            let config = WorldGenConfig::default();
            config.save(config_dir)?;
            log::info!("Created default worldgen config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `worldgen.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Worldgen config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: WorldGenConfig = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}
