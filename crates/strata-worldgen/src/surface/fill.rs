use rand::Rng;
use strata_blocks::SurfaceMaterials;

use super::{ColumnContext, Placement};
use crate::seed::column_rng;

/// Lays out the chosen surface materials in a column.
pub trait ColumnFill: Send + Sync {
    /// Placements for `ctx` covered with `materials`, in descending `y`.
    fn fill(&self, ctx: &ColumnContext, materials: &SurfaceMaterials) -> Vec<Placement>;
}

/// Top block, a few blocks of subsurface material resting on `bedding`
/// blocks of the column's default solid, and fluid up to sea level.
///
/// The subsurface depth is `base_depth` plus a per-column jitter of 0 or 1
/// drawn from [`column_rng`], so the same column always gets the same depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayeredFill {
    pub base_depth: u32,
    pub bedding: u32,
}

impl Default for LayeredFill {
    fn default() -> Self {
        Self {
            base_depth: 3,
            bedding: 1,
        }
    }
}

impl LayeredFill {
    /// Subsurface depth for the column described by `ctx`.
    pub fn depth(&self, ctx: &ColumnContext) -> u32 {
        let mut rng = column_rng(ctx.seed, ctx.x, ctx.z);
        self.base_depth + rng.random_range(0..=1u32)
    }
}

impl ColumnFill for LayeredFill {
    fn fill(&self, ctx: &ColumnContext, materials: &SurfaceMaterials) -> Vec<Placement> {
        let dry = ctx.is_dry();
        let depth = self.depth(ctx);
        let mut placements = Vec::with_capacity((depth + self.bedding) as usize + 1);

        // Empty when the surface is at or above the waterline.
        for y in (ctx.start_height + 1..ctx.sea_level).rev() {
            placements.push(Placement {
                y,
                block: ctx.default_fluid,
            });
        }

        let (top, under) = if dry {
            (materials.top, materials.under)
        } else {
            (materials.underwater, materials.underwater)
        };
        placements.push(Placement {
            y: ctx.start_height,
            block: top,
        });
        for d in 1..=(depth + self.bedding) as i32 {
            let y = ctx.start_height - d;
            if y < 0 {
                break;
            }
            let block = if d <= depth as i32 {
                under
            } else {
                ctx.default_block
            };
            placements.push(Placement { y, block });
        }

        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::test_support::*;

    #[test]
    fn test_dry_column_layout() {
        let fill = LayeredFill::default();
        let ctx = context(5, 9, 100, 96, 1);
        let placements = fill.fill(&ctx, &SAND);
        let depth = fill.depth(&ctx) as usize;

        assert_eq!(placements[0], Placement { y: 100, block: SAND.top });
        assert_eq!(placements.len(), depth + 2);
        assert!(placements[1..=depth].iter().all(|p| p.block == SAND.under));
        assert_eq!(placements.last(), Some(&Placement { y: 100 - depth as i32 - 1, block: STONE }));
        assert!(placements.iter().all(|p| p.block != WATER));
    }

    #[test]
    fn test_depth_jitter_range() {
        let fill = LayeredFill::default();
        let mut seen = [false; 2];
        for x in 0..64 {
            let depth = fill.depth(&context(x, 0, 100, 96, 7));
            assert!((3..=4).contains(&depth), "depth {depth}");
            seen[(depth - 3) as usize] = true;
        }
        assert!(seen[0] && seen[1], "both jitter values should occur");
    }

    #[test]
    fn test_depth_deterministic_per_column() {
        let fill = LayeredFill::default();
        for x in -20..20 {
            let ctx = context(x, x * 3, 80, 96, 99);
            assert_eq!(fill.depth(&ctx), fill.depth(&ctx));
            assert_eq!(fill.fill(&ctx, &SAND), fill.fill(&ctx, &SAND));
        }
    }

    #[test]
    fn test_underwater_column_gets_fluid() {
        let fill = LayeredFill::default();
        let ctx = context(0, 0, 90, 96, 3);
        let placements = fill.fill(&ctx, &SANDSTONE);

        let water: Vec<i32> = placements.iter().filter(|p| p.block == WATER).map(|p| p.y).collect();
        assert_eq!(water, vec![95, 94, 93, 92, 91]);

        let surface = placements.iter().find(|p| p.y == 90).unwrap();
        assert_eq!(surface.block, SANDSTONE.underwater);
        let depth = fill.depth(&ctx) as i32;
        assert!(
            placements
                .iter()
                .filter(|p| p.y < 90 && p.y >= 90 - depth)
                .all(|p| p.block == SANDSTONE.underwater)
        );
        assert_eq!(placements.last().map(|p| p.block), Some(STONE));
    }

    #[test]
    fn test_waterline_column_is_dry() {
        let fill = LayeredFill::default();
        let ctx = context(0, 0, 95, 96, 3);
        let placements = fill.fill(&ctx, &SAND);
        assert_eq!(placements[0], Placement { y: 95, block: SAND.top });
        assert!(placements.iter().all(|p| p.block != WATER));
    }

    #[test]
    fn test_bedding_uses_default_block() {
        let fill = LayeredFill {
            base_depth: 2,
            bedding: 3,
        };
        let ctx = context(4, 4, 120, 96, 11);
        let depth = fill.depth(&ctx) as i32;
        let placements = fill.fill(&ctx, &SAND);
        let bedding: Vec<i32> = placements.iter().filter(|p| p.block == STONE).map(|p| p.y).collect();
        assert_eq!(bedding, (120 - depth - 3..120 - depth).rev().collect::<Vec<_>>());

        let none = LayeredFill {
            base_depth: 2,
            bedding: 0,
        };
        assert!(none.fill(&ctx, &SAND).iter().all(|p| p.block != STONE));
    }

    #[test]
    fn test_placements_descend() {
        let fill = LayeredFill::default();
        for start in [2, 50, 94, 95, 130] {
            let placements = fill.fill(&context(1, 2, start, 96, 5), &SAND);
            assert!(placements.windows(2).all(|w| w[0].y > w[1].y));
        }
    }

    #[test]
    fn test_stops_at_world_bottom() {
        let fill = LayeredFill {
            base_depth: 10,
            bedding: 1,
        };
        let placements = fill.fill(&context(0, 0, 2, 0, 0), &SAND);
        assert_eq!(placements.last().map(|p| p.y), Some(0));
    }
}
