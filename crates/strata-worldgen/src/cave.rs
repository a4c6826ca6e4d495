//! 3D noise cave carving.
//!
//! A 2D base field decides where cave systems may exist at all; inside those
//! regions, voxels whose 3D cave noise lies close to zero become air, which
//! yields connected tunnels rather than isolated bubbles. Carving fades out
//! above `height_fade` so caves rarely breach high terrain.

use glam::IVec3;
use noise::{NoiseFn, Simplex};
use strata_config::CavesConfig;

use crate::field::{Noise2D, Noise2DExt, SimplexNoise2D};
use crate::seed::{SeedState, derive_seed};

/// Voxels at or below this height are never carved.
pub const CAVE_FLOOR: i32 = 4;
/// Blocks above `height_fade` over which carving fades to nothing.
pub const FADE_SPAN: i32 = 16;

const CAVE_SALT: u64 = 0xCAFE_BABE;
const BASE_SALT: u64 = 0xCAFE_BA5E;

/// Configuration for cave carving.
#[derive(Clone, Debug, PartialEq)]
pub struct CaveParams {
    /// Height above which caves start to fade out.
    pub height_fade: i32,
    /// Base field value (in `[0, 1]`) a column must exceed to host caves.
    pub base_noise_cutoff: f64,
    /// Cave noise magnitude below which a voxel is carved.
    pub noise_cutoff: f64,
    /// Frequency of the first 3D octave. Default: 0.02.
    pub frequency: f64,
    /// Number of 3D octaves. Default: 3.
    pub octaves: u32,
    /// Frequency multiplier per octave. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave. Default: 0.5.
    pub persistence: f64,
    /// Coordinate spread of the 2D base field. Default: 1/256.
    pub base_spread: f64,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self::from_config(&CavesConfig::default())
    }
}

impl CaveParams {
    /// Shape defaults with the thresholds from `caves`.
    pub fn from_config(caves: &CavesConfig) -> Self {
        Self {
            height_fade: caves.height_fade,
            base_noise_cutoff: caves.base_noise_cutoff,
            noise_cutoff: caves.noise_cutoff,
            frequency: 0.02,
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            base_spread: 1.0 / 256.0,
        }
    }

    /// Carving strength at height `y`: 1 up to `height_fade`, falling
    /// linearly to 0 at `height_fade + FADE_SPAN`.
    pub fn fade(&self, y: i32) -> f64 {
        let above = y - self.height_fade;
        if above <= 0 {
            1.0
        } else if above >= FADE_SPAN {
            0.0
        } else {
            1.0 - f64::from(above) / f64::from(FADE_SPAN)
        }
    }
}

struct CaveFields {
    cave: Simplex,
    base: Box<dyn Noise2D>,
}

/// Decides which subsurface voxels are air.
pub struct CaveCarver {
    params: CaveParams,
    state: SeedState<CaveFields>,
}

impl CaveCarver {
    /// Create an unseeded carver.
    pub fn new(params: CaveParams) -> Self {
        Self {
            params,
            state: SeedState::Uninitialized,
        }
    }

    /// Returns the cave parameters.
    pub fn params(&self) -> &CaveParams {
        &self.params
    }

    /// Rebuild the cave fields if `seed` differs from the cached one.
    pub fn set_seed(&mut self, seed: u64) {
        let base_spread = self.params.base_spread;
        self.state.set(seed, |seed| CaveFields {
            // The noise crate seeds with 32 bits; the derived seed is already mixed.
            cave: Simplex::new(derive_seed(seed, CAVE_SALT) as u32),
            base: SimplexNoise2D::new(derive_seed(seed, BASE_SALT))
                .octaves(2)
                .spread(base_spread)
                .scaled(0.0, 1.0)
                .boxed(),
        });
    }

    /// Whether the voxel at `pos` should be air.
    ///
    /// Never carves at or below [`CAVE_FLOOR`], nor at or above
    /// `surface_height`.
    ///
    /// # Panics
    ///
    /// Panics if called before [`set_seed`](Self::set_seed).
    pub fn is_cave(&self, pos: IVec3, surface_height: i32) -> bool {
        if pos.y <= CAVE_FLOOR || pos.y >= surface_height {
            return false;
        }
        let fade = self.params.fade(pos.y);
        if fade <= 0.0 {
            return false;
        }

        let fields = self.state.bundle();
        if fields.base.noise(f64::from(pos.x), f64::from(pos.z)) <= self.params.base_noise_cutoff {
            return false;
        }

        self.sample_cave_noise(&fields.cave, pos).abs() < self.params.noise_cutoff * fade
    }

    /// Whether the column at `(x, z)` lies inside a cave region.
    pub fn in_cave_region(&self, x: i32, z: i32) -> bool {
        let fields = self.state.bundle();
        fields.base.noise(f64::from(x), f64::from(z)) > self.params.base_noise_cutoff
    }

    /// Sample multi-octave 3D cave noise, normalized to `[-1, 1]`.
    fn sample_cave_noise(&self, noise: &Simplex, pos: IVec3) -> f64 {
        let p = pos.as_dvec3();
        let mut total = 0.0;
        let mut frequency = self.params.frequency;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..self.params.octaves {
            total += noise.get([p.x * frequency, p.y * frequency, p.z * frequency]) * amplitude;
            max_amplitude += amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}
