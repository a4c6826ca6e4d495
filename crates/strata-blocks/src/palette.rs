//! Material palette: the block handles world generation selects from.

use crate::registry::{BlockDef, BlockId, BlockRegistry, RegistryError};

/// Rocks of the bottom stratum (igneous intrusive).
pub const BOTTOM_ROCKS: &[&str] = &["granite", "diorite", "gabbro"];
/// Rocks of the middle stratum (metamorphic).
pub const MIDDLE_ROCKS: &[&str] = &["quartzite", "slate", "phyllite", "schist", "gneiss", "marble"];
/// Rocks of the top stratum (sedimentary and igneous extrusive).
pub const TOP_ROCKS: &[&str] = &[
    "shale",
    "claystone",
    "limestone",
    "conglomerate",
    "dolomite",
    "chert",
    "chalk",
    "rhyolite",
    "basalt",
    "andesite",
    "dacite",
];

const SURFACE_BLOCKS: &[&str] = &[
    "stone",
    "bedrock",
    "grass",
    "dirt",
    "gravel",
    "sand",
    "sandstone",
    "red_sand",
    "red_sandstone",
];

/// Materials placed in the topmost layers of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceMaterials {
    /// Block at the surface when the column is at or above sea level.
    pub top: BlockId,
    /// Blocks directly beneath the top block.
    pub under: BlockId,
    /// Surface and subsurface block for columns below sea level.
    pub underwater: BlockId,
}

/// Rock lists for each stratum, bottom to top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RockStrata {
    /// Deepest stratum.
    pub bottom: Vec<BlockId>,
    /// Middle stratum.
    pub middle: Vec<BlockId>,
    /// Stratum just beneath the surface materials.
    pub top: Vec<BlockId>,
}

/// Pre-registered handles for every block the generator places.
#[derive(Clone, Debug)]
pub struct MaterialPalette {
    /// Empty space above terrain.
    pub air: BlockId,
    /// Default solid used where no other material applies.
    pub default_block: BlockId,
    /// Default fluid filling columns below sea level.
    pub default_fluid: BlockId,
    /// Floor of every column.
    pub bedrock: BlockId,
    /// Grassland surface.
    pub normal: SurfaceMaterials,
    /// Shoreline loose-sand set.
    pub shore_sand: SurfaceMaterials,
    /// Shoreline sandstone set.
    pub shore_sandstone: SurfaceMaterials,
    /// Rock strata.
    pub strata: RockStrata,
}

impl MaterialPalette {
    /// Register the default block set into `registry` and collect the handles.
    pub fn register_defaults(registry: &mut BlockRegistry) -> Result<Self, RegistryError> {
        for name in SURFACE_BLOCKS
            .iter()
            .chain(BOTTOM_ROCKS)
            .chain(MIDDLE_ROCKS)
            .chain(TOP_ROCKS)
        {
            registry.register(BlockDef::solid(name))?;
        }
        registry.register(BlockDef::fluid("water"))?;
        Self::from_registry(registry)
    }

    /// Collect handles from a registry that already holds the default names.
    pub fn from_registry(registry: &BlockRegistry) -> Result<Self, RegistryError> {
        let rocks = |names: &[&str]| -> Result<Vec<BlockId>, RegistryError> {
            names.iter().map(|name| registry.require(name)).collect()
        };
        let gravel = registry.require("gravel")?;
        let red_sand = registry.require("red_sand")?;
        let red_sandstone = registry.require("red_sandstone")?;

        Ok(Self {
            air: BlockId::AIR,
            default_block: registry.require("stone")?,
            default_fluid: registry.require("water")?,
            bedrock: registry.require("bedrock")?,
            normal: SurfaceMaterials {
                top: registry.require("grass")?,
                under: registry.require("dirt")?,
                underwater: gravel,
            },
            shore_sand: SurfaceMaterials {
                top: red_sand,
                under: red_sand,
                underwater: registry.require("sand")?,
            },
            shore_sandstone: SurfaceMaterials {
                top: red_sandstone,
                under: red_sandstone,
                underwater: registry.require("sandstone")?,
            },
            strata: RockStrata {
                bottom: rocks(BOTTOM_ROCKS)?,
                middle: rocks(MIDDLE_ROCKS)?,
                top: rocks(TOP_ROCKS)?,
            },
        })
    }
}
