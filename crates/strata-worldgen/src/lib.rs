//! Seeded procedural world generation: layered 2D noise, climate and rock
//! classification, cave carving and per-column surface material selection.
//!
//! Every stateful component caches its noise objects per seed (see
//! [`SeedState`]); evaluation after seeding is `&self`, pure and safe to run
//! from many threads at once.

mod bedrock;
mod cave;
mod classify;
mod climate;
mod column;
mod error;
mod heightmap;
mod region;
mod rock;
mod seed;

pub mod field;
pub mod surface;

pub use bedrock::{BedrockFloor, MAX_BEDROCK_Y};
pub use cave::{CAVE_FLOOR, CaveCarver, CaveParams, FADE_SPAN};
pub use classify::{ClassifiedNoise, ClassifyError, CutoffTable};
pub use climate::{
    Climate, ClimateSampler, RAINFALL_RANGE, RainfallClass, TEMPERATURE_RANGE, TemperatureClass,
};
pub use column::{ColumnGenerator, GeneratedColumn, WORLD_HEIGHT};
pub use error::WorldGenError;
pub use field::{Noise2D, Noise2DExt, NoiseFnAdapter, SimplexNoise2D};
pub use heightmap::{HeightmapParams, HeightmapSampler, MAX_SURFACE_HEIGHT, MIN_SURFACE_HEIGHT};
pub use region::{
    GeneratedRegion, REGION_SIZE, RegionCoord, RegionGenerator, generate_region_sync,
};
pub use rock::{RockColumn, RockLayerParams, RockLayers, Stratum};
pub use seed::{SeedState, column_rng, derive_seed, splitmix64};
pub use surface::{
    ColumnContext, ColumnFill, LayeredFill, NoiseRecipe, Placement, SHORE_VARIANT_THRESHOLD,
    SurfaceBuilder, SurfaceEnv, SurfacePlan, VariantSurfaceBuilder, shore_noise,
};
