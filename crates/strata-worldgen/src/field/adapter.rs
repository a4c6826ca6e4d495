//! Bridge from the `noise` crate's sources to [`Noise2D`].

use noise::NoiseFn;

use super::Noise2D;

/// Lifts any `noise::NoiseFn<f64, 2>` into a [`Noise2D`] so library sources
/// compose with the strata combinators.
#[derive(Clone, Debug)]
pub struct NoiseFnAdapter<F>(pub F);

impl<F> Noise2D for NoiseFnAdapter<F>
where
    F: NoiseFn<f64, 2> + Send + Sync,
{
    #[inline]
    fn noise(&self, x: f64, z: f64) -> f64 {
        self.0.get([x, z])
    }
}
