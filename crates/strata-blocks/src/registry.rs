//! Block registry: maps compact [`BlockId`] values to [`BlockDef`] metadata.
//!
//! The registry is built once during startup. Air is always ID 0 so that a
//! zero-initialized column represents empty space.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Opaque block handle (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The air block.
    pub const AIR: Self = Self(0);
}

/// Physical category of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Empty space.
    Air,
    /// Collidable terrain (stone, sand, dirt).
    Solid,
    /// Liquid filling (water).
    Fluid,
}

/// Full descriptor for a block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDef {
    /// Registry name (e.g. "granite", "red_sand", "water").
    pub name: String,
    /// Physical category.
    pub kind: BlockKind,
}

impl BlockDef {
    /// A solid block with the given name.
    pub fn solid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: BlockKind::Solid,
        }
    }

    /// A fluid block with the given name.
    pub fn fluid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: BlockKind::Fluid,
        }
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All 65 535 user-defined slots have been consumed.
    #[error("block registry is full (max 65536 blocks)")]
    RegistryFull,
    /// A name expected by a consumer is not registered.
    #[error("unknown block: {0}")]
    Unknown(String),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] → [`BlockDef`] with O(1) lookup by index and by name.
pub struct BlockRegistry {
    /// Dense array where `index == BlockId.0`.
    blocks: Vec<BlockDef>,
    name_to_id: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a new registry with Air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            kind: BlockKind::Air,
        };

        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), BlockId::AIR);

        Self {
            blocks: vec![air],
            name_to_id,
        }
    }

    /// Registers a new block and returns its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a block with the same name
    /// already exists, or [`RegistryError::RegistryFull`] if all slots are used.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.blocks.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockId(self.blocks.len() as u16);
        tracing::trace!(name = %def.name, id = id.0, "registered block");
        self.name_to_id.insert(def.name.clone(), id);
        self.blocks.push(def);
        Ok(id)
    }

    /// Returns the definition for a given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range. IDs are only produced by the registry
    /// itself, so this is a programming error.
    pub fn get(&self, id: BlockId) -> &BlockDef {
        &self.blocks[id.0 as usize]
    }

    /// Returns the ID for a named block, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Like [`lookup_by_name`](Self::lookup_by_name) but reports missing names as errors.
    pub fn require(&self, name: &str) -> Result<BlockId, RegistryError> {
        self.lookup_by_name(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    /// Returns the total number of registered blocks (including Air).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if only Air is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }

    /// Returns `true` if the block is a fluid.
    pub fn is_fluid(&self, id: BlockId) -> bool {
        matches!(
            self.blocks.get(id.0 as usize),
            Some(BlockDef {
                kind: BlockKind::Fluid,
                ..
            })
        )
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
