//! Three-stratum rock layering.
//!
//! Each stratum picks its rock from its own low-frequency field, so rock
//! types form broad patches; the boundaries between strata wobble by up to
//! `layer_spread` blocks around multiples of `layer_height`.

use strata_blocks::{BlockId, RockStrata};
use strata_config::GeneralConfig;

use crate::classify::CutoffTable;
use crate::error::WorldGenError;
use crate::field::{Noise2D, Noise2DExt, SimplexNoise2D};
use crate::seed::{SeedState, derive_seed};

const BOTTOM_SALT: u64 = 0x0B07_7000;
const MIDDLE_SALT: u64 = 0x0B07_7001;
const TOP_SALT: u64 = 0x0B07_7002;
const BOTTOM_OFFSET_SALT: u64 = 0x0B07_7010;
const MIDDLE_OFFSET_SALT: u64 = 0x0B07_7011;

/// Which stratum a block belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stratum {
    Bottom,
    Middle,
    Top,
}

impl Stratum {
    fn name(self) -> &'static str {
        match self {
            Stratum::Bottom => "bottom",
            Stratum::Middle => "middle",
            Stratum::Top => "top",
        }
    }
}

/// Shape parameters for [`RockLayers`].
#[derive(Clone, Debug, PartialEq)]
pub struct RockLayerParams {
    /// Zoom of the bottom stratum's selection field.
    pub bottom_zoom: u32,
    /// Zoom of the middle stratum's selection field.
    pub middle_zoom: u32,
    /// Zoom of the top stratum's selection field.
    pub top_zoom: u32,
    /// Nominal thickness of the bottom and middle strata.
    pub layer_height: i32,
    /// Maximum boundary displacement in blocks.
    pub layer_spread: i32,
}

impl Default for RockLayerParams {
    fn default() -> Self {
        Self::from_config(&GeneralConfig::default())
    }
}

impl RockLayerParams {
    pub fn from_config(general: &GeneralConfig) -> Self {
        Self {
            bottom_zoom: general.rock_bottom_zoom_level,
            middle_zoom: general.rock_middle_zoom_level,
            top_zoom: general.rock_top_zoom_level,
            layer_height: general.rock_layer_height,
            layer_spread: general.rock_layer_spread,
        }
    }
}

/// Rock choice and boundaries for one column, resolved once and reused for
/// every `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RockColumn {
    /// Blocks with `y < bottom_top` are in the bottom stratum.
    pub bottom_top: i32,
    /// Blocks with `bottom_top <= y < middle_top` are in the middle stratum.
    pub middle_top: i32,
    pub bottom: BlockId,
    pub middle: BlockId,
    pub top: BlockId,
}

impl RockColumn {
    pub fn stratum_at(&self, y: i32) -> Stratum {
        if y < self.bottom_top {
            Stratum::Bottom
        } else if y < self.middle_top {
            Stratum::Middle
        } else {
            Stratum::Top
        }
    }

    pub fn rock_at(&self, y: i32) -> BlockId {
        match self.stratum_at(y) {
            Stratum::Bottom => self.bottom,
            Stratum::Middle => self.middle,
            Stratum::Top => self.top,
        }
    }
}

struct RockFields {
    bottom: Box<dyn Noise2D>,
    middle: Box<dyn Noise2D>,
    top: Box<dyn Noise2D>,
    bottom_offset: Box<dyn Noise2D>,
    middle_offset: Box<dyn Noise2D>,
}

/// Selects the rock at any `(x, y, z)` below the surface materials.
pub struct RockLayers {
    params: RockLayerParams,
    bottom: CutoffTable<BlockId>,
    middle: CutoffTable<BlockId>,
    top: CutoffTable<BlockId>,
    state: SeedState<RockFields>,
}

impl RockLayers {
    /// Build unseeded rock layers over `strata`.
    ///
    /// # Errors
    ///
    /// Fails if any stratum's rock list is empty.
    pub fn new(params: RockLayerParams, strata: &RockStrata) -> Result<Self, WorldGenError> {
        let table = |stratum: Stratum, rocks: &[BlockId]| {
            if rocks.is_empty() {
                return Err(WorldGenError::EmptyStratum(stratum.name()));
            }
            Ok(CutoffTable::uniform(rocks.to_vec(), -1.0, 1.0)?)
        };
        Ok(Self {
            bottom: table(Stratum::Bottom, &strata.bottom)?,
            middle: table(Stratum::Middle, &strata.middle)?,
            top: table(Stratum::Top, &strata.top)?,
            params,
            state: SeedState::Uninitialized,
        })
    }

    pub fn params(&self) -> &RockLayerParams {
        &self.params
    }

    /// Rebuild the selection fields if `seed` differs from the cached one.
    pub fn set_seed(&mut self, seed: u64) {
        let params = self.params.clone();
        self.state.set(seed, |seed| {
            let field = |salt: u64, zoom: u32| {
                SimplexNoise2D::new(derive_seed(seed, salt))
                    .octaves(2)
                    .spread(zoom_spread(zoom))
                    .boxed()
            };
            RockFields {
                bottom: field(BOTTOM_SALT, params.bottom_zoom),
                middle: field(MIDDLE_SALT, params.middle_zoom),
                top: field(TOP_SALT, params.top_zoom),
                bottom_offset: field(BOTTOM_OFFSET_SALT, params.bottom_zoom),
                middle_offset: field(MIDDLE_OFFSET_SALT, params.middle_zoom),
            }
        });
    }

    /// Resolve the rock column at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if called before [`set_seed`](Self::set_seed).
    pub fn column(&self, x: i32, z: i32) -> RockColumn {
        let fields = self.state.bundle();
        let (fx, fz) = (f64::from(x), f64::from(z));
        let spread = f64::from(self.params.layer_spread);
        let offset = |field: &dyn Noise2D| (field.noise(fx, fz) * spread).round() as i32;

        let bottom_top = self.params.layer_height + offset(fields.bottom_offset.as_ref());
        let middle_top =
            bottom_top + self.params.layer_height + offset(fields.middle_offset.as_ref());

        RockColumn {
            bottom_top,
            middle_top,
            bottom: *self.bottom.classify(fields.bottom.noise(fx, fz)),
            middle: *self.middle.classify(fields.middle.noise(fx, fz)),
            top: *self.top.classify(fields.top.noise(fx, fz)),
        }
    }

    /// Stratum of the block at `(x, y, z)`.
    pub fn stratum_at(&self, x: i32, y: i32, z: i32) -> Stratum {
        self.column(x, z).stratum_at(y)
    }

    /// Rock at `(x, y, z)`.
    pub fn rock_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.column(x, z).rock_at(y)
    }
}

/// Coordinate spread for a zoom level: each level doubles feature size.
fn zoom_spread(zoom: u32) -> f64 {
    1.0 / f64::from(1u32 << (4 + zoom.min(20)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strata() -> RockStrata {
        RockStrata {
            bottom: vec![BlockId(10), BlockId(11), BlockId(12)],
            middle: vec![BlockId(20), BlockId(21)],
            top: vec![BlockId(30), BlockId(31), BlockId(32), BlockId(33)],
        }
    }

    fn seeded(params: RockLayerParams, seed: u64) -> RockLayers {
        let mut layers = RockLayers::new(params, &strata()).unwrap();
        layers.set_seed(seed);
        layers
    }

    #[test]
    fn test_zoom_spread() {
        assert_eq!(zoom_spread(0), 1.0 / 16.0);
        assert_eq!(zoom_spread(7), 1.0 / 2048.0);
    }

    #[test]
    fn test_boundaries_within_spread() {
        let params = RockLayerParams::default();
        let layers = seeded(params.clone(), 5);
        for i in 0..300 {
            let column = layers.column(i * 37, i * -23);
            let h = params.layer_height;
            let s = params.layer_spread;
            assert!((h - s..=h + s).contains(&column.bottom_top), "{column:?}");
            let middle = column.middle_top - column.bottom_top;
            assert!((h - s..=h + s).contains(&middle), "{column:?}");
        }
    }

    #[test]
    fn test_zero_spread_gives_flat_boundaries() {
        let params = RockLayerParams {
            layer_spread: 0,
            layer_height: 40,
            ..Default::default()
        };
        let layers = seeded(params, 1);
        for i in 0..50 {
            let column = layers.column(i * 1000, i * 333);
            assert_eq!(column.bottom_top, 40);
            assert_eq!(column.middle_top, 80);
        }
    }

    #[test]
    fn test_strata_ordering() {
        let layers = seeded(
            RockLayerParams {
                layer_spread: 0,
                layer_height: 50,
                ..Default::default()
            },
            2,
        );
        assert_eq!(layers.stratum_at(0, 0, 0), Stratum::Bottom);
        assert_eq!(layers.stratum_at(0, 49, 0), Stratum::Bottom);
        assert_eq!(layers.stratum_at(0, 50, 0), Stratum::Middle);
        assert_eq!(layers.stratum_at(0, 99, 0), Stratum::Middle);
        assert_eq!(layers.stratum_at(0, 100, 0), Stratum::Top);
        assert_eq!(layers.stratum_at(0, 250, 0), Stratum::Top);
    }

    #[test]
    fn test_rocks_come_from_their_stratum() {
        let layers = seeded(RockLayerParams::default(), 3);
        let strata = strata();
        for i in 0..200 {
            let (x, z) = (i * 211, i * 97);
            let column = layers.column(x, z);
            assert!(strata.bottom.contains(&layers.rock_at(x, column.bottom_top - 1, z)));
            assert!(strata.middle.contains(&layers.rock_at(x, column.bottom_top, z)));
            assert!(strata.top.contains(&layers.rock_at(x, column.middle_top, z)));
        }
    }

    #[test]
    fn test_low_zoom_varies_rocks() {
        let params = RockLayerParams {
            top_zoom: 1,
            ..Default::default()
        };
        let layers = seeded(params, 4);
        let mut seen = std::collections::HashSet::new();
        for i in 0..400 {
            seen.insert(layers.column(i * 17, i * 29).top);
        }
        assert!(seen.len() >= 2, "expected rock variety, got {seen:?}");
    }

    #[test]
    fn test_deterministic() {
        let a = seeded(RockLayerParams::default(), 77);
        let b = seeded(RockLayerParams::default(), 77);
        for i in 0..100 {
            assert_eq!(a.column(i * 50, -i * 70), b.column(i * 50, -i * 70));
        }
    }

    #[test]
    fn test_empty_stratum_rejected() {
        let mut strata = strata();
        strata.middle.clear();
        let result = RockLayers::new(RockLayerParams::default(), &strata);
        assert!(matches!(result, Err(WorldGenError::EmptyStratum("middle"))));
    }

    #[test]
    #[should_panic(expected = "before a seed was set")]
    fn test_unseeded_panics() {
        let layers = RockLayers::new(RockLayerParams::default(), &strata()).unwrap();
        let _ = layers.rock_at(0, 0, 0);
    }
}
