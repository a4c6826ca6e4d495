//! Composable 2D noise fields.
//!
//! A [`Noise2D`] is a pure function of `(x, z)`. Primitives capture their
//! seed-derived state at construction; combinators wrap other fields and
//! never touch seed state themselves, so any chain of them stays pure.

mod adapter;
mod combinators;
mod simplex;

use std::sync::Arc;

pub use adapter::NoiseFnAdapter;
pub use combinators::{Abs, Axis, Map, Noise2DExt, Octaves, Periodic, Scaled, Spread};
pub use simplex::SimplexNoise2D;

/// A deterministic 2D scalar field.
///
/// Implementations must be side-effect free: repeated evaluation at any
/// coordinates leaves no observable state behind, which is what makes
/// concurrent evaluation sound.
pub trait Noise2D: Send + Sync {
    /// Evaluate the field at `(x, z)`.
    fn noise(&self, x: f64, z: f64) -> f64;
}

impl<N: Noise2D + ?Sized> Noise2D for &N {
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        (**self).noise(x, z)
    }
}

impl<N: Noise2D + ?Sized> Noise2D for Box<N> {
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        (**self).noise(x, z)
    }
}

impl<N: Noise2D + ?Sized> Noise2D for Arc<N> {
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        (**self).noise(x, z)
    }
}

/// A field with the same value everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constant(pub f64);

impl Noise2D for Constant {
    #[inline]
    fn noise(&self, _x: f64, _z: f64) -> f64 {
        self.0
    }
}
