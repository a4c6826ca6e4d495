//! Full column pipeline: height, climate, rock, caves, surface and bedrock.

use glam::IVec3;
use strata_blocks::{BlockId, MaterialPalette};
use strata_config::WorldGenConfig;
use tracing::{debug, info};

use crate::bedrock::BedrockFloor;
use crate::cave::{CaveCarver, CaveParams};
use crate::climate::{Climate, ClimateSampler};
use crate::error::WorldGenError;
use crate::heightmap::{HeightmapParams, HeightmapSampler, MAX_SURFACE_HEIGHT};
use crate::rock::{RockLayerParams, RockLayers};
use crate::surface::{ColumnContext, SurfaceBuilder, SurfaceEnv, SurfacePlan, VariantSurfaceBuilder};

/// Number of blocks in a column, `y` in `0..WORLD_HEIGHT`.
pub const WORLD_HEIGHT: usize = MAX_SURFACE_HEIGHT as usize + 1;

/// Output of [`ColumnGenerator::generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedColumn {
    pub x: i32,
    pub z: i32,
    /// Height of the surface block.
    pub height: i32,
    pub climate: Climate,
    /// Whether the shoreline builder chose the surface.
    pub shore: bool,
    pub surface: SurfacePlan,
    /// Blocks indexed by `y`.
    pub blocks: Vec<BlockId>,
}

impl GeneratedColumn {
    /// Block at `y`; air outside the column.
    pub fn block_at(&self, y: i32) -> BlockId {
        usize::try_from(y)
            .ok()
            .and_then(|y| self.blocks.get(y).copied())
            .unwrap_or(BlockId::AIR)
    }
}

/// Generates complete columns for one seed at a time.
///
/// After [`set_seed`](Self::set_seed), `generate` takes `&self` and can be
/// shared across threads.
pub struct ColumnGenerator {
    sea_level: i32,
    shore_band: i32,
    palette: MaterialPalette,
    heightmap: HeightmapSampler,
    climate: ClimateSampler,
    rocks: RockLayers,
    caves: CaveCarver,
    bedrock: BedrockFloor,
    shore: VariantSurfaceBuilder,
    normal: VariantSurfaceBuilder,
    seed: Option<u64>,
}

impl ColumnGenerator {
    /// Build an unseeded generator with the default [`LayeredFill`](crate::LayeredFill).
    ///
    /// # Errors
    ///
    /// Fails if the config's cutoffs are unordered or a rock stratum is empty.
    pub fn new(config: &WorldGenConfig, palette: MaterialPalette) -> Result<Self, WorldGenError> {
        Self::with_env(config, palette, SurfaceEnv::default())
    }

    /// Build an unseeded generator whose surface builders share `env`.
    pub fn with_env(
        config: &WorldGenConfig,
        palette: MaterialPalette,
        env: SurfaceEnv,
    ) -> Result<Self, WorldGenError> {
        let general = &config.general;
        let generator = Self {
            sea_level: general.sea_level,
            shore_band: general.shore_band,
            heightmap: HeightmapSampler::new(HeightmapParams::from_config(general)),
            climate: ClimateSampler::from_config(config)?,
            rocks: RockLayers::new(RockLayerParams::from_config(general), &palette.strata)?,
            caves: CaveCarver::new(CaveParams::from_config(&config.caves)),
            bedrock: BedrockFloor::new(general.flat_bedrock),
            shore: VariantSurfaceBuilder::shore(
                env.clone(),
                palette.shore_sand,
                palette.shore_sandstone,
            ),
            normal: VariantSurfaceBuilder::uniform(env, palette.normal),
            palette,
            seed: None,
        };
        info!(
            sea_level = generator.sea_level,
            shore_band = generator.shore_band,
            "column generator configured"
        );
        Ok(generator)
    }

    /// Replace the heightmap shape. Clears any cached seed.
    pub fn with_heightmap(mut self, params: HeightmapParams) -> Self {
        self.heightmap = HeightmapSampler::new(params);
        self.seed = None;
        self
    }

    /// Seed every component. A repeated seed leaves cached noise untouched.
    pub fn set_seed(&mut self, seed: u64) {
        if self.seed == Some(seed) {
            return;
        }
        debug!(seed, "seeding column generator");
        self.heightmap.set_seed(seed);
        self.climate.set_seed(seed);
        self.rocks.set_seed(seed);
        self.caves.set_seed(seed);
        self.shore.set_seed(seed);
        self.normal.set_seed(seed);
        self.seed = Some(seed);
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    pub fn palette(&self) -> &MaterialPalette {
        &self.palette
    }

    /// Shoreline surface builder.
    pub fn shore_builder(&self) -> &VariantSurfaceBuilder {
        &self.shore
    }

    /// Whether a surface at `height` lies within the shore band.
    pub fn is_shore(&self, height: i32) -> bool {
        (height - self.sea_level).abs() <= self.shore_band
    }

    /// Generate the column at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if called before [`set_seed`](Self::set_seed).
    pub fn generate(&self, x: i32, z: i32) -> GeneratedColumn {
        let Some(seed) = self.seed else {
            panic!("column generated before a seed was set");
        };

        let height = self.heightmap.surface_height(x, z);
        let climate = self.climate.sample(f64::from(x), f64::from(z));
        let ctx = ColumnContext {
            x,
            z,
            start_height: height,
            default_block: self.palette.default_block,
            default_fluid: self.palette.default_fluid,
            sea_level: self.sea_level,
            seed,
            climate,
        };

        let shore = self.is_shore(height);
        let builder = if shore { &self.shore } else { &self.normal };
        let surface = builder.build_surface(&ctx);

        let mut blocks = vec![self.palette.air; WORLD_HEIGHT];
        let rock = self.rocks.column(x, z);
        for (y, slot) in blocks.iter_mut().enumerate().take(height as usize + 1) {
            let y = y as i32;
            *slot = if self.caves.is_cave(IVec3::new(x, y, z), height) {
                self.palette.air
            } else {
                rock.rock_at(y)
            };
        }
        surface.apply(&mut blocks);

        let floor = self.bedrock.top(seed, x, z).min(height);
        for slot in blocks.iter_mut().take(floor as usize + 1) {
            *slot = self.palette.bedrock;
        }

        GeneratedColumn {
            x,
            z,
            height,
            climate,
            shore,
            surface,
            blocks,
        }
    }
}
