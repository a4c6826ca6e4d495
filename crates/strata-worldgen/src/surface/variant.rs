use std::sync::Arc;

use strata_blocks::SurfaceMaterials;

use super::{ColumnContext, SurfaceBuilder, SurfaceEnv, SurfacePlan};
use crate::classify::CutoffTable;
use crate::error::WorldGenError;
use crate::field::{Constant, Noise2D, Noise2DExt, SimplexNoise2D};
use crate::seed::SeedState;

/// Shore noise above this value selects loose sand; at or below it,
/// sandstone.
pub const SHORE_VARIANT_THRESHOLD: f64 = 0.6;

/// Builds the variant-selection field for a seed.
pub type NoiseRecipe = Arc<dyn Fn(u64) -> Box<dyn Noise2D> + Send + Sync>;

/// Shoreline variant field: two octaves of simplex noise at spread 0.3,
/// folded to its magnitude.
pub fn shore_noise(seed: u64) -> impl Noise2D {
    SimplexNoise2D::new(seed).octaves(2).spread(0.3).abs()
}

/// Surface builder that picks one of several material sets from a noise
/// field.
///
/// The field is evaluated at the column, bucketed through a
/// [`CutoffTable`] of variant indices, and the chosen set is handed to the
/// environment's fill routine.
pub struct VariantSurfaceBuilder {
    recipe: NoiseRecipe,
    table: CutoffTable<usize>,
    variants: Vec<SurfaceMaterials>,
    env: SurfaceEnv,
    state: SeedState<Box<dyn Noise2D>>,
}

impl VariantSurfaceBuilder {
    /// Build from parts.
    ///
    /// # Errors
    ///
    /// Fails if `table` selects an index outside `variants`.
    pub fn new(
        env: SurfaceEnv,
        recipe: impl Fn(u64) -> Box<dyn Noise2D> + Send + Sync + 'static,
        table: CutoffTable<usize>,
        variants: Vec<SurfaceMaterials>,
    ) -> Result<Self, WorldGenError> {
        if let Some(&index) = table.categories().iter().find(|&&i| i >= variants.len()) {
            return Err(WorldGenError::VariantOutOfRange {
                index,
                variants: variants.len(),
            });
        }
        Ok(Self::from_parts(env, Arc::new(recipe), table, variants))
    }

    /// Shoreline builder: noise above [`SHORE_VARIANT_THRESHOLD`] selects
    /// `sand`, anything else (including exactly the threshold) `sandstone`.
    pub fn shore(env: SurfaceEnv, sand: SurfaceMaterials, sandstone: SurfaceMaterials) -> Self {
        Self::from_parts(
            env,
            Arc::new(|seed: u64| shore_noise(seed).boxed()),
            CutoffTable::split(SHORE_VARIANT_THRESHOLD, 1, 0),
            vec![sand, sandstone],
        )
    }

    /// Builder that always selects `materials`.
    pub fn uniform(env: SurfaceEnv, materials: SurfaceMaterials) -> Self {
        Self::from_parts(
            env,
            Arc::new(|_: u64| Constant(0.0).boxed()),
            CutoffTable::single(0),
            vec![materials],
        )
    }

    fn from_parts(
        env: SurfaceEnv,
        recipe: NoiseRecipe,
        table: CutoffTable<usize>,
        variants: Vec<SurfaceMaterials>,
    ) -> Self {
        Self {
            recipe,
            table,
            variants,
            env,
            state: SeedState::Uninitialized,
        }
    }

    /// The cached seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.state.seed()
    }

    /// The seed state, for callers that need to observe reuse.
    pub fn state(&self) -> &SeedState<Box<dyn Noise2D>> {
        &self.state
    }

    /// Material sets in table order.
    pub fn variants(&self) -> &[SurfaceMaterials] {
        &self.variants
    }

    /// Variant field value at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if no seed has been set.
    pub fn variant_noise(&self, x: i32, z: i32) -> f64 {
        self.state.bundle().noise(f64::from(x), f64::from(z))
    }

    /// Material set a field value selects.
    pub fn variant_for(&self, value: f64) -> &SurfaceMaterials {
        &self.variants[*self.table.classify(value)]
    }
}

impl SurfaceBuilder for VariantSurfaceBuilder {
    fn set_seed(&mut self, seed: u64) {
        let recipe = Arc::clone(&self.recipe);
        self.state.set(seed, |seed| recipe(seed));
    }

    fn build_surface(&self, ctx: &ColumnContext) -> SurfacePlan {
        let materials = *self.variant_for(self.variant_noise(ctx.x, ctx.z));
        SurfacePlan {
            x: ctx.x,
            z: ctx.z,
            materials,
            placements: self.env.fill.fill(ctx, &materials),
        }
    }
}
