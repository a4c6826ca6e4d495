//! Seeded 2D simplex noise.
//!
//! The permutation table is shuffled once from the seed; after that every
//! evaluation is a read-only lookup plus a handful of float operations, so
//! the same `(seed, x, z)` gives bit-identical output on every platform.

use super::Noise2D;
use crate::seed::splitmix64;

/// Skewing factor for the 2D simplex grid: `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskewing factor for the 2D simplex grid: `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_1;
/// Scales the summed corner contributions to roughly `[-1, 1]`.
const NORMALIZE: f64 = 70.0;

const GRADIENTS: [[f64; 2]; 12] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

/// 2D simplex gradient noise, output roughly in `[-1, 1]`.
#[derive(Clone)]
pub struct SimplexNoise2D {
    /// 256-entry permutation, doubled so lookups never wrap.
    perm: [u8; 512],
}

impl SimplexNoise2D {
    /// Build the permutation table for `seed`.
    pub fn new(seed: u64) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates driven by xorshift64; zero is xorshift's fixed point.
        let mut state = splitmix64(seed);
        if state == 0 {
            state = 0x9E37_79B9_7F4A_7C15;
        }
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    #[inline]
    fn corner(&self, x: f64, z: f64, hash: u8) -> f64 {
        let t = 0.5 - x * x - z * z;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRADIENTS[(hash % 12) as usize];
            let t2 = t * t;
            t2 * t2 * (grad[0] * x + grad[1] * z)
        }
    }
}

impl Noise2D for SimplexNoise2D {
    fn noise(&self, x: f64, z: f64) -> f64 {
        let skew = (x + z) * F2;
        let i = (x + skew).floor();
        let j = (z + skew).floor();

        let unskew = (i + j) * G2;
        let x0 = x - (i - unskew);
        let z0 = z - (j - unskew);

        let (i1, j1) = if x0 > z0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let z1 = z0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let z2 = z0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let p = &self.perm;

        let h0 = p[ii + p[jj] as usize];
        let h1 = p[ii + i1 + p[jj + j1] as usize];
        let h2 = p[ii + 1 + p[jj + 1] as usize];

        NORMALIZE * (self.corner(x0, z0, h0) + self.corner(x1, z1, h1) + self.corner(x2, z2, h2))
    }
}

impl std::fmt::Debug for SimplexNoise2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise2D").finish_non_exhaustive()
    }
}
