//! Per-column surface material selection.
//!
//! A [`SurfaceBuilder`] decides which [`SurfaceMaterials`] cover a column and
//! hands the actual block layout to an injected [`ColumnFill`]. Builders own
//! their seeded noise; the fill routine and material handles come from the
//! caller through [`SurfaceEnv`].

mod fill;
mod variant;

use std::sync::Arc;

use strata_blocks::{BlockId, SurfaceMaterials};

use crate::climate::Climate;

pub use fill::{ColumnFill, LayeredFill};
pub use variant::{NoiseRecipe, SHORE_VARIANT_THRESHOLD, VariantSurfaceBuilder, shore_noise};

/// Everything a builder needs to know about one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnContext {
    pub x: i32,
    pub z: i32,
    /// Height of the topmost solid block.
    pub start_height: i32,
    /// Solid block below the surface materials.
    pub default_block: BlockId,
    /// Fluid filling the column between surface and sea level.
    pub default_fluid: BlockId,
    pub sea_level: i32,
    pub seed: u64,
    pub climate: Climate,
}

impl ColumnContext {
    /// Whether the surface block is at or above the waterline.
    #[inline]
    pub fn is_dry(&self) -> bool {
        self.start_height >= self.sea_level - 1
    }
}

/// One block written by a surface plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub y: i32,
    pub block: BlockId,
}

/// The surface decision for one column.
///
/// Placements are ordered by strictly descending `y`: fluid from sea level
/// down to just above the surface, then the surface block and the blocks
/// beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfacePlan {
    pub x: i32,
    pub z: i32,
    /// Material set chosen for this column.
    pub materials: SurfaceMaterials,
    pub placements: Vec<Placement>,
}

impl SurfacePlan {
    /// Block this plan places at `y`, if any.
    pub fn block_at(&self, y: i32) -> Option<BlockId> {
        self.placements.iter().find(|p| p.y == y).map(|p| p.block)
    }

    /// Lowest `y` this plan touches.
    pub fn lowest(&self) -> Option<i32> {
        self.placements.last().map(|p| p.y)
    }

    /// Write every placement into a column indexed by `y`; placements outside
    /// the column are skipped.
    pub fn apply(&self, blocks: &mut [BlockId]) {
        for placement in &self.placements {
            if let Ok(y) = usize::try_from(placement.y)
                && let Some(slot) = blocks.get_mut(y)
            {
                *slot = placement.block;
            }
        }
    }
}

/// Collaborators shared by every builder.
#[derive(Clone)]
pub struct SurfaceEnv {
    pub fill: Arc<dyn ColumnFill>,
}

impl SurfaceEnv {
    pub fn new(fill: Arc<dyn ColumnFill>) -> Self {
        Self { fill }
    }
}

impl Default for SurfaceEnv {
    fn default() -> Self {
        Self::new(Arc::new(LayeredFill::default()))
    }
}

impl std::fmt::Debug for SurfaceEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceEnv").finish_non_exhaustive()
    }
}

/// Decides the surface of individual columns.
///
/// `set_seed` is the only mutating operation; `build_surface` may run from
/// many threads at once once a seed is set.
pub trait SurfaceBuilder: Send + Sync {
    /// Prepare noise state for `seed`. Calling it again with the same seed is
    /// a no-op.
    fn set_seed(&mut self, seed: u64);

    /// Surface plan for the column described by `ctx`.
    ///
    /// # Panics
    ///
    /// Panics if no seed has been set.
    fn build_surface(&self, ctx: &ColumnContext) -> SurfacePlan;
}

#[cfg(test)]
pub(crate) mod test_support {
    use strata_blocks::{BlockId, SurfaceMaterials};

    use super::ColumnContext;
    use crate::climate::{Climate, RainfallClass, TemperatureClass};

    pub const STONE: BlockId = BlockId(1);
    pub const WATER: BlockId = BlockId(2);

    pub const SAND: SurfaceMaterials = SurfaceMaterials {
        top: BlockId(10),
        under: BlockId(11),
        underwater: BlockId(12),
    };
    pub const SANDSTONE: SurfaceMaterials = SurfaceMaterials {
        top: BlockId(20),
        under: BlockId(21),
        underwater: BlockId(22),
    };

    pub fn context(x: i32, z: i32, start_height: i32, sea_level: i32, seed: u64) -> ColumnContext {
        ColumnContext {
            x,
            z,
            start_height,
            default_block: STONE,
            default_fluid: WATER,
            sea_level,
            seed,
            climate: Climate {
                temperature: 10.0,
                rainfall: 250.0,
                temperature_class: TemperatureClass::Normal,
                rainfall_class: RainfallClass::Normal,
            },
        }
    }
}
