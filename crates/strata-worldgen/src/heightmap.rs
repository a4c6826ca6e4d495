//! Multi-octave fractal Brownian motion (fBm) heightmap sampler.
//!
//! Composites multiple octaves of simplex noise around a base height to
//! produce terrain with features at many spatial frequencies.

use noise::Simplex;
use strata_config::GeneralConfig;

use crate::field::{Noise2D, NoiseFnAdapter};
use crate::seed::{SeedState, derive_seed};

/// Highest block a column surface may reach.
pub const MAX_SURFACE_HEIGHT: i32 = 255;
/// Lowest block a column surface may reach.
pub const MIN_SURFACE_HEIGHT: i32 = 1;

const HEIGHT_SALT: u64 = 0x4E16_4700;

/// Configuration for multi-octave fBm noise used in heightmap generation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// Number of noise octaves to composite. Default: 5.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Each octave's frequency
    /// is `base_frequency * lacunarity^octave_index`. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Each octave's amplitude
    /// is `amplitude * persistence^octave_index`. Default: 0.5.
    pub persistence: f64,
    /// Frequency of the first (lowest) octave. Default: 1/256 (one full
    /// cycle per 256 blocks).
    pub base_frequency: f64,
    /// Amplitude of the first octave in blocks. Default: 24.
    pub amplitude: f64,
    /// Height the noise is centred on. Default: four blocks above sea level.
    pub base_height: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self::from_config(&GeneralConfig::default())
    }
}

impl HeightmapParams {
    /// Default shape centred just above `general.sea_level`.
    pub fn from_config(general: &GeneralConfig) -> Self {
        Self {
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.0 / 256.0,
            amplitude: 24.0,
            base_height: f64::from(general.sea_level) + 4.0,
        }
    }
}

/// Generates terrain height values using fractal Brownian motion over simplex noise.
///
/// Each sample composites multiple octaves of noise, where each successive octave
/// doubles in frequency and halves in amplitude.
pub struct HeightmapSampler {
    params: HeightmapParams,
    state: SeedState<NoiseFnAdapter<Simplex>>,
}

impl HeightmapSampler {
    /// Create an unseeded sampler with the given parameters.
    pub fn new(params: HeightmapParams) -> Self {
        Self {
            params,
            state: SeedState::Uninitialized,
        }
    }

    /// Rebuild the noise source if `seed` differs from the cached one.
    pub fn set_seed(&mut self, seed: u64) {
        self.state.set(seed, |seed| {
            NoiseFnAdapter(Simplex::new(derive_seed(seed, HEIGHT_SALT) as u32))
        });
    }

    /// Sample the height offset at `(x, z)`.
    ///
    /// The theoretical range is `[-max_amplitude, +max_amplitude]`.
    ///
    /// # Panics
    ///
    /// Panics if called before [`set_seed`](Self::set_seed).
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let noise = self.state.bundle();
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            total += noise.noise(x * frequency, z * frequency) * amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Height of the surface block of column `(x, z)`, clamped to
    /// [`MIN_SURFACE_HEIGHT`]..=[`MAX_SURFACE_HEIGHT`].
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let height = self.params.base_height + self.sample(f64::from(x), f64::from(z));
        (height.round() as i32).clamp(MIN_SURFACE_HEIGHT, MAX_SURFACE_HEIGHT)
    }

    /// Compute the theoretical maximum absolute amplitude (geometric series sum).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.amplitude;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn seeded(params: HeightmapParams, seed: u64) -> HeightmapSampler {
        let mut sampler = HeightmapSampler::new(params);
        sampler.set_seed(seed);
        sampler
    }

    #[test]
    fn test_determinism_same_seed_same_coord() {
        let sampler_a = seeded(HeightmapParams::default(), 42);
        let sampler_b = seeded(HeightmapParams::default(), 42);

        let h1 = sampler_a.sample(100.0, 200.0);
        let h2 = sampler_b.sample(100.0, 200.0);
        assert!(
            (h1 - h2).abs() < EPSILON,
            "Same seed + same coord must produce identical height: {h1} vs {h2}"
        );
    }

    #[test]
    fn test_different_seeds_produce_different_heights() {
        let sampler_a = seeded(HeightmapParams::default(), 1);
        let sampler_b = seeded(HeightmapParams::default(), 999);

        let differing = (0..50)
            .filter(|&i| {
                let x = 37.5 + i as f64 * 91.0;
                (sampler_a.sample(x, 500.0) - sampler_b.sample(x, 500.0)).abs() > EPSILON
            })
            .count();
        assert!(differing > 0, "Different seeds should produce different heights");
    }

    #[test]
    fn test_height_within_expected_range() {
        let sampler = seeded(HeightmapParams::default(), 0);
        let max_amp = sampler.max_amplitude();

        for x in (0..100).map(|i| i as f64 * 10.0) {
            for z in (0..100).map(|i| i as f64 * 10.0) {
                let h = sampler.sample(x, z);
                assert!(
                    h.abs() <= max_amp + EPSILON,
                    "Height {h} exceeds max amplitude {max_amp} at ({x}, {z})"
                );
            }
        }
    }

    #[test]
    fn test_surface_height_around_base() {
        let params = HeightmapParams::default();
        let sampler = seeded(params.clone(), 3);
        let max_amp = sampler.max_amplitude();
        for i in 0..500 {
            let h = sampler.surface_height(i * 13, i * -7);
            assert!(f64::from(h) >= params.base_height - max_amp - 1.0);
            assert!(f64::from(h) <= params.base_height + max_amp + 1.0);
        }
    }

    #[test]
    fn test_surface_height_clamped() {
        let sampler = seeded(
            HeightmapParams {
                amplitude: 0.0,
                base_height: 10_000.0,
                ..Default::default()
            },
            3,
        );
        assert_eq!(sampler.surface_height(5, 5), MAX_SURFACE_HEIGHT);

        let sampler = seeded(
            HeightmapParams {
                amplitude: 0.0,
                base_height: -50.0,
                ..Default::default()
            },
            3,
        );
        assert_eq!(sampler.surface_height(5, 5), MIN_SURFACE_HEIGHT);
    }

    #[test]
    fn test_more_octaves_adds_detail() {
        let step = 0.5;
        let mut diff_1oct = 0.0;
        let mut diff_8oct = 0.0;
        let count = 1000;

        let sampler_1 = seeded(
            HeightmapParams {
                octaves: 1,
                ..Default::default()
            },
            7,
        );
        let sampler_8 = seeded(
            HeightmapParams {
                octaves: 8,
                ..Default::default()
            },
            7,
        );

        for i in 0..count {
            let x = i as f64 * step;
            diff_1oct += (sampler_1.sample(x + step, 0.0) - sampler_1.sample(x, 0.0)).abs();
            diff_8oct += (sampler_8.sample(x + step, 0.0) - sampler_8.sample(x, 0.0)).abs();
        }

        diff_1oct /= count as f64;
        diff_8oct /= count as f64;

        assert!(
            diff_8oct > diff_1oct,
            "8 octaves should have more high-frequency detail than 1 octave: \
             avg_diff_1={diff_1oct}, avg_diff_8={diff_8oct}"
        );
    }

    #[test]
    fn test_smooth_gradient_no_discontinuities() {
        let sampler = seeded(HeightmapParams::default(), 42);
        let step = 0.01;
        let max_allowed_delta = sampler.max_amplitude() * 0.1;

        for i in 0..10_000 {
            let x = i as f64 * step;
            let delta = (sampler.sample(x + step, 0.0) - sampler.sample(x, 0.0)).abs();
            assert!(
                delta < max_allowed_delta,
                "Discontinuity at x={x}: delta={delta} exceeds max={max_allowed_delta}"
            );
        }
    }

    #[test]
    fn test_max_amplitude_calculation() {
        let sampler = HeightmapSampler::new(HeightmapParams {
            amplitude: 1000.0,
            persistence: 0.5,
            octaves: 4,
            ..Default::default()
        });
        let expected = 1875.0;
        assert!(
            (sampler.max_amplitude() - expected).abs() < EPSILON,
            "Max amplitude should be {expected}, got {}",
            sampler.max_amplitude()
        );
    }

    #[test]
    fn test_zero_amplitude_returns_zero() {
        let sampler = seeded(
            HeightmapParams {
                amplitude: 0.0,
                ..Default::default()
            },
            0,
        );
        let h = sampler.sample(123.0, 456.0);
        assert!(h.abs() < EPSILON, "Zero amplitude should produce zero height, got {h}");
    }

    #[test]
    fn test_reseed_same_seed_keeps_source() {
        let mut sampler = seeded(HeightmapParams::default(), 11);
        let before = sampler.sample(64.0, 64.0);
        sampler.set_seed(11);
        assert_eq!(sampler.sample(64.0, 64.0), before);
    }
}
