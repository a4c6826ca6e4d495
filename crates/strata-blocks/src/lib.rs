//! Block registry and the material palette consumed by world generation.
//!
//! Generation never constructs blocks itself; it selects among the
//! pre-registered [`BlockId`] handles exposed here.

pub mod palette;
pub mod registry;

pub use palette::{MaterialPalette, RockStrata, SurfaceMaterials};
pub use registry::{BlockDef, BlockId, BlockKind, BlockRegistry, RegistryError};
