//! Bedrock floor at the bottom of every column.

use rand::Rng;

use crate::seed::{column_rng, derive_seed};

/// Highest `y` a rough bedrock floor can reach.
pub const MAX_BEDROCK_Y: i32 = 4;

const BEDROCK_SALT: u64 = 0xBED0_0003;

/// Shape of the bedrock floor.
///
/// A flat floor is the single layer at `y = 0`. A rough floor rises to a
/// per-column height in `0..=MAX_BEDROCK_Y`, fixed by the seed and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BedrockFloor {
    pub flat: bool,
}

impl BedrockFloor {
    pub fn new(flat: bool) -> Self {
        Self { flat }
    }

    /// Topmost bedrock `y` of column `(x, z)`.
    pub fn top(&self, seed: u64, x: i32, z: i32) -> i32 {
        if self.flat {
            return 0;
        }
        let mut rng = column_rng(derive_seed(seed, BEDROCK_SALT), x, z);
        rng.random_range(0..=MAX_BEDROCK_Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_floor_is_single_layer() {
        let floor = BedrockFloor::new(true);
        for x in -50..50 {
            assert_eq!(floor.top(9, x, x * 7), 0);
        }
    }

    #[test]
    fn test_rough_floor_varies_within_bounds() {
        let floor = BedrockFloor::new(false);
        let mut seen = [false; MAX_BEDROCK_Y as usize + 1];
        for x in 0..200 {
            let top = floor.top(9, x, -x);
            assert!((0..=MAX_BEDROCK_Y).contains(&top), "top {top}");
            seen[top as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every floor height should occur");
    }

    #[test]
    fn test_rough_floor_deterministic() {
        let floor = BedrockFloor::new(false);
        for x in -20..20 {
            assert_eq!(floor.top(1, x, 3), floor.top(1, x, 3));
        }
        let a: Vec<i32> = (0..64).map(|x| floor.top(1, x, 0)).collect();
        let b: Vec<i32> = (0..64).map(|x| floor.top(2, x, 0)).collect();
        assert_ne!(a, b);
    }
}
