//! Temperature and rainfall layers and their classification.
//!
//! Each layer is its own seeded field with its own orientation and scale so
//! the two decorrelate spatially. Raw values are in physical units
//! (°C and mm/year) and are bucketed through config-supplied cutoffs.

use strata_config::{NoiseLayerType, WorldGenConfig};

use crate::classify::{ClassifyError, CutoffTable};
use crate::field::{Axis, Noise2D, Noise2DExt, SimplexNoise2D};
use crate::seed::{SeedState, derive_seed};

/// Range of the temperature layer in °C.
pub const TEMPERATURE_RANGE: (f64, f64) = (-20.0, 30.0);
/// Range of the rainfall layer in mm.
pub const RAINFALL_RANGE: (f64, f64) = (0.0, 500.0);

const TEMPERATURE_SALT: u64 = 0x7E3B_0001;
const RAINFALL_SALT: u64 = 0x4A1F_0002;
/// Share of a periodic layer taken by the wave; the rest is local detail.
const PERIODIC_WEIGHT: f64 = 0.75;

/// Temperature classes, coldest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemperatureClass {
    /// At or below the frozen cutoff.
    Frozen,
    /// At or below the cold cutoff.
    Cold,
    /// At or below the normal cutoff.
    Normal,
    /// At or below the lukewarm cutoff.
    Lukewarm,
    /// Above every cutoff.
    Warm,
}

/// Rainfall classes, driest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RainfallClass {
    /// At or below the arid cutoff.
    Arid,
    /// At or below the dry cutoff.
    Dry,
    /// At or below the normal cutoff.
    Normal,
    /// At or below the damp cutoff.
    Damp,
    /// Above every cutoff.
    Wet,
}

/// Climate of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    /// Average temperature in °C.
    pub temperature: f64,
    /// Annual rainfall in mm.
    pub rainfall: f64,
    /// Bucketed temperature.
    pub temperature_class: TemperatureClass,
    /// Bucketed rainfall.
    pub rainfall_class: RainfallClass,
}

#[derive(Clone, Copy, Debug)]
struct LayerShape {
    kind: NoiseLayerType,
    scale: f64,
}

struct ClimateFields {
    temperature: Box<dyn Noise2D>,
    rainfall: Box<dyn Noise2D>,
}

/// Samples per-column climate from two independent layers.
pub struct ClimateSampler {
    temperature: LayerShape,
    rainfall: LayerShape,
    detail_spread: f64,
    temperature_table: CutoffTable<TemperatureClass>,
    rainfall_table: CutoffTable<RainfallClass>,
    state: SeedState<ClimateFields>,
}

impl ClimateSampler {
    /// Build an unseeded sampler from config.
    ///
    /// # Errors
    ///
    /// Fails if either cutoff group is not strictly increasing.
    pub fn from_config(config: &WorldGenConfig) -> Result<Self, ClassifyError> {
        let general = &config.general;
        let [frozen, cold, normal, lukewarm] = config.biomes.temperature_cutoffs();
        let [arid, dry, normal_rain, damp] = config.biomes.rainfall_cutoffs();

        let temperature_table = CutoffTable::new([
            (f64::from(frozen), TemperatureClass::Frozen),
            (f64::from(cold), TemperatureClass::Cold),
            (f64::from(normal), TemperatureClass::Normal),
            (f64::from(lukewarm), TemperatureClass::Lukewarm),
            (f64::INFINITY, TemperatureClass::Warm),
        ])?;
        let rainfall_table = CutoffTable::new([
            (f64::from(arid), RainfallClass::Arid),
            (f64::from(dry), RainfallClass::Dry),
            (f64::from(normal_rain), RainfallClass::Normal),
            (f64::from(damp), RainfallClass::Damp),
            (f64::INFINITY, RainfallClass::Wet),
        ])?;

        Ok(Self {
            temperature: LayerShape {
                kind: general.temperature_layer_type,
                scale: f64::from(general.temperature_layer_scale),
            },
            rainfall: LayerShape {
                kind: general.rainfall_layer_type,
                scale: f64::from(general.rainfall_layer_scale),
            },
            detail_spread: 1.0 / f64::from(1u32 << (4 + general.biome_zoom_level.min(20))),
            temperature_table,
            rainfall_table,
            state: SeedState::Uninitialized,
        })
    }

    /// Rebuild the layers if `seed` differs from the cached one.
    pub fn set_seed(&mut self, seed: u64) {
        let (temperature, rainfall, detail) = (self.temperature, self.rainfall, self.detail_spread);
        self.state.set(seed, |seed| ClimateFields {
            temperature: layer_field(
                derive_seed(seed, TEMPERATURE_SALT),
                temperature,
                detail,
                TEMPERATURE_RANGE,
            ),
            rainfall: layer_field(
                derive_seed(seed, RAINFALL_SALT),
                rainfall,
                detail,
                RAINFALL_RANGE,
            ),
        });
    }

    /// The cached seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.state.seed()
    }

    /// Climate at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if called before [`set_seed`](Self::set_seed).
    pub fn sample(&self, x: f64, z: f64) -> Climate {
        let fields = self.state.bundle();
        let temperature = fields.temperature.noise(x, z);
        let rainfall = fields.rainfall.noise(x, z);
        Climate {
            temperature,
            rainfall,
            temperature_class: *self.temperature_table.classify(temperature),
            rainfall_class: *self.rainfall_table.classify(rainfall),
        }
    }
}

fn layer_field(
    seed: u64,
    shape: LayerShape,
    detail_spread: f64,
    (min, max): (f64, f64),
) -> Box<dyn Noise2D> {
    let base = SimplexNoise2D::new(seed);
    match shape.kind {
        NoiseLayerType::PeriodicX => base
            .octaves(2)
            .spread(detail_spread)
            .periodic(Axis::X, shape.scale, PERIODIC_WEIGHT)
            .scaled(min, max)
            .boxed(),
        NoiseLayerType::PeriodicZ => base
            .octaves(2)
            .spread(detail_spread)
            .periodic(Axis::Z, shape.scale, PERIODIC_WEIGHT)
            .scaled(min, max)
            .boxed(),
        NoiseLayerType::Noise => base
            .octaves(4)
            .spread(1.0 / shape.scale)
            .scaled(min, max)
            .boxed(),
    }
}
