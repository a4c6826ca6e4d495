//! Field combinators: octave stacking, coordinate spread and output transforms.
//!
//! Each combinator owns the field it wraps and delegates to it; none of them
//! derive seed state. They chain in any order through [`Noise2DExt`]:
//!
//! ```
//! use strata_worldgen::field::{Noise2D, Noise2DExt, SimplexNoise2D};
//!
//! let shore = SimplexNoise2D::new(12345).octaves(2).spread(0.3).abs();
//! assert!(shore.noise(10.0, 20.0) >= 0.0);
//! ```

use std::f64::consts::TAU;

use super::Noise2D;

/// Fractal sum of successively finer copies of a field.
///
/// Octave `i` is sampled at frequency `2^i` with amplitude `persistence^i`;
/// the sum is divided by the total amplitude so the output range matches the
/// wrapped field.
#[derive(Clone, Debug)]
pub struct Octaves<N> {
    inner: N,
    octaves: u32,
    persistence: f64,
    amplitude_sum: f64,
}

impl<N: Noise2D> Octaves<N> {
    /// Stack `octaves` copies of `inner`.
    ///
    /// # Panics
    ///
    /// Panics if `octaves` is zero.
    pub fn new(inner: N, octaves: u32, persistence: f64) -> Self {
        assert!(octaves > 0, "octave count must be at least 1");
        let mut amplitude_sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..octaves {
            amplitude_sum += amplitude;
            amplitude *= persistence;
        }
        Self {
            inner,
            octaves,
            persistence,
            amplitude_sum,
        }
    }

    /// Number of stacked octaves.
    pub fn octave_count(&self) -> u32 {
        self.octaves
    }
}

impl<N: Noise2D> Noise2D for Octaves<N> {
    fn noise(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            total += self.inner.noise(x * frequency, z * frequency) * amplitude;
            frequency *= 2.0;
            amplitude *= self.persistence;
        }
        total / self.amplitude_sum
    }
}

/// Multiplies input coordinates before delegating. Smaller factors give larger features.
#[derive(Clone, Debug)]
pub struct Spread<N> {
    inner: N,
    factor: f64,
}

impl<N: Noise2D> Noise2D for Spread<N> {
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        self.inner.noise(x * self.factor, z * self.factor)
    }
}

/// Magnitude of the wrapped field.
#[derive(Clone, Debug)]
pub struct Abs<N> {
    inner: N,
}

impl<N: Noise2D> Noise2D for Abs<N> {
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        self.inner.noise(x, z).abs()
    }
}

/// Linear map of `[-1, 1]` onto `[min, max]`.
#[derive(Clone, Debug)]
pub struct Scaled<N> {
    inner: N,
    min: f64,
    max: f64,
}

impl<N: Noise2D> Noise2D for Scaled<N> {
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        self.min + (self.inner.noise(x, z) + 1.0) * 0.5 * (self.max - self.min)
    }
}

/// Arbitrary pure transform of the wrapped output.
#[derive(Clone)]
pub struct Map<N, F> {
    inner: N,
    f: F,
}

impl<N, F> Noise2D for Map<N, F>
where
    N: Noise2D,
    F: Fn(f64) -> f64 + Send + Sync,
{
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        (self.f)(self.inner.noise(x, z))
    }
}

/// Horizontal axis along which a [`Periodic`] field cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Cycles as `x` changes.
    X,
    /// Cycles as `z` changes.
    Z,
}

/// Blends a cosine wave along one axis into the wrapped field.
///
/// Output is `weight * cos(2π * coord / period) + (1 - weight) * inner`,
/// which stays in `[-1, 1]` when the wrapped field does.
#[derive(Clone, Debug)]
pub struct Periodic<N> {
    inner: N,
    axis: Axis,
    period: f64,
    weight: f64,
}

impl<N: Noise2D> Noise2D for Periodic<N> {
    fn noise(&self, x: f64, z: f64) -> f64 {
        let coord = match self.axis {
            Axis::X => x,
            Axis::Z => z,
        };
        let wave = libm::cos(TAU * coord / self.period);
        self.weight * wave + (1.0 - self.weight) * self.inner.noise(x, z)
    }
}

/// Builder methods available on every [`Noise2D`].
pub trait Noise2DExt: Noise2D + Sized {
    /// Fractal sum with persistence `0.5`.
    fn octaves(self, octaves: u32) -> Octaves<Self> {
        Octaves::new(self, octaves, 0.5)
    }

    /// Fractal sum with an explicit amplitude decay.
    fn octaves_with(self, octaves: u32, persistence: f64) -> Octaves<Self> {
        Octaves::new(self, octaves, persistence)
    }

    /// Scale input coordinates by `factor`.
    fn spread(self, factor: f64) -> Spread<Self> {
        Spread {
            inner: self,
            factor,
        }
    }

    /// Take the magnitude of the output.
    fn abs(self) -> Abs<Self> {
        Abs { inner: self }
    }

    /// Map `[-1, 1]` onto `[min, max]`.
    fn scaled(self, min: f64, max: f64) -> Scaled<Self> {
        Scaled {
            inner: self,
            min,
            max,
        }
    }

    /// Apply `f` to every output.
    fn map<F>(self, f: F) -> Map<Self, F>
    where
        F: Fn(f64) -> f64 + Send + Sync,
    {
        Map { inner: self, f }
    }

    /// Blend in a cosine wave along `axis` with the given period in blocks.
    fn periodic(self, axis: Axis, period: f64, weight: f64) -> Periodic<Self> {
        Periodic {
            inner: self,
            axis,
            period,
            weight,
        }
    }

    /// Erase the concrete type.
    fn boxed(self) -> Box<dyn Noise2D>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<N: Noise2D> Noise2DExt for N {}
