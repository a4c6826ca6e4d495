//! Seed derivation and the per-seed noise cache.
//!
//! Building noise state (permutation tables, layered fields) is the expensive
//! part of generation; evaluating it per column is cheap. [`SeedState`] makes
//! the "rebuild only when the seed changes" rule an explicit transition
//! instead of a pair of mutable flags.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// SplitMix64 finalizer. Bijective, so distinct inputs never collide.
#[inline]
pub const fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive an independent sub-seed for one noise field.
///
/// Fields built from the same world seed with different `salt` values are
/// decorrelated.
#[inline]
pub const fn derive_seed(seed: u64, salt: u64) -> u64 {
    splitmix64(seed ^ splitmix64(salt))
}

/// Deterministic RNG for a single world column.
///
/// The same `(seed, x, z)` yields the same sequence on every thread and
/// platform.
pub fn column_rng(seed: u64, x: i32, z: i32) -> ChaCha8Rng {
    let column = ((x as u32 as u64) << 32) | (z as u32 as u64);
    ChaCha8Rng::seed_from_u64(derive_seed(seed, column))
}

// ---------------------------------------------------------------------------
// Seed lifecycle
// ---------------------------------------------------------------------------

/// Noise state cached for at most one seed.
///
/// The bundle sits behind an [`Arc`] so a reader holding a clone keeps a
/// consistent snapshot while a writer installs the bundle for a new seed.
#[derive(Debug)]
pub enum SeedState<B> {
    /// No seed has been set yet. Evaluation is a programming error.
    Uninitialized,
    /// Noise objects built for `seed`.
    Ready {
        /// The seed the bundle was built from.
        seed: u64,
        /// The cached noise objects.
        bundle: Arc<B>,
    },
}

impl<B> SeedState<B> {
    /// Transition to `seed`, calling `build` only if the bundle must change.
    ///
    /// Re-setting the cached seed returns the same bundle untouched.
    #[must_use]
    pub fn reseed(self, seed: u64, build: impl FnOnce(u64) -> B) -> Self {
        match self {
            Self::Ready {
                seed: cached,
                bundle,
            } if cached == seed => Self::Ready { seed, bundle },
            previous => {
                tracing::debug!(seed, previous = ?previous.seed(), "building seeded noise state");
                Self::Ready {
                    seed,
                    bundle: Arc::new(build(seed)),
                }
            }
        }
    }

    /// In-place form of [`reseed`](Self::reseed).
    pub fn set(&mut self, seed: u64, build: impl FnOnce(u64) -> B) {
        *self = std::mem::take(self).reseed(seed, build);
    }

    /// The cached seed, if any.
    pub fn seed(&self) -> Option<u64> {
        match self {
            Self::Uninitialized => None,
            Self::Ready { seed, .. } => Some(*seed),
        }
    }

    /// Returns `true` once a seed has been set.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// The shared bundle, if any.
    pub fn shared(&self) -> Option<&Arc<B>> {
        match self {
            Self::Uninitialized => None,
            Self::Ready { bundle, .. } => Some(bundle),
        }
    }

    /// The cached noise objects.
    ///
    /// # Panics
    ///
    /// Panics if no seed has been set. Column evaluation before seeding is an
    /// upstream bug and must not silently produce terrain.
    #[track_caller]
    pub fn bundle(&self) -> &B {
        match self {
            Self::Ready { bundle, .. } => bundle,
            Self::Uninitialized => panic!("noise state evaluated before a seed was set"),
        }
    }
}

impl<B> Default for SeedState<B> {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl<B> Clone for SeedState<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Uninitialized => Self::Uninitialized,
            Self::Ready { seed, bundle } => Self::Ready {
                seed: *seed,
                bundle: Arc::clone(bundle),
            },
        }
    }
}
