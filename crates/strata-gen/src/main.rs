//! strata: generate a square of terrain columns and print a surface map.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use hashbrown::HashMap;
use strata_blocks::{BlockRegistry, MaterialPalette, RegistryError};
use strata_config::{CliArgs, WorldGenConfig, default_config_dir};
use strata_worldgen::{
    ColumnGenerator, GeneratedColumn, REGION_SIZE, RegionCoord, RegionGenerator, TemperatureClass,
    WorldGenError, generate_region_sync,
};
use thiserror::Error;
use tracing::{info, warn};

const RESULT_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_AREA_SIZE: u32 = 4096;

#[derive(Debug, Error)]
enum GenError {
    #[error("block registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("world generation: {0}")]
    WorldGen(#[from] WorldGenError),
    #[error("timed out waiting for {0} regions")]
    Timeout(usize),
}

/// Square of columns to generate, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Area {
    x: i32,
    z: i32,
    size: i32,
}

impl Area {
    /// Square of `size` columns (capped at `MAX_AREA_SIZE`) from `(x, z)`.
    /// `None` when the square would run past `i32::MAX`.
    fn new(x: i32, z: i32, size: u32) -> Option<Self> {
        let size = i32::try_from(size.min(MAX_AREA_SIZE)).ok()?;
        x.checked_add(size)?;
        z.checked_add(size)?;
        Some(Self { x, z, size })
    }

    fn regions(self) -> Vec<RegionCoord> {
        if self.size <= 0 {
            return Vec::new();
        }
        let first = RegionCoord::containing(self.x, self.z);
        let last = RegionCoord::containing(self.x + self.size - 1, self.z + self.size - 1);
        let mut regions = Vec::new();
        for rz in first.z..=last.z {
            for rx in first.x..=last.x {
                regions.push(RegionCoord::new(rx, rz));
            }
        }
        regions
    }

    fn contains(self, x: i32, z: i32) -> bool {
        (self.x..self.x + self.size).contains(&x) && (self.z..self.z + self.size).contains(&z)
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = WorldGenConfig::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        WorldGenConfig::default()
    });
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::from(2);
    }

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let Some(area) = Area::new(args.x, args.z, args.size) else {
        eprintln!(
            "Area at ({}, {}) with size {} extends past the world edge",
            args.x, args.z, args.size
        );
        return ExitCode::from(2);
    };

    match run(&config, area) {
        Ok(generated) => {
            print!("{}", render_map(&generated, area, config.general.sea_level));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("generation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Generated columns keyed by `(x, z)`, with the palette they were built from.
struct Generated {
    palette: MaterialPalette,
    columns: HashMap<(i32, i32), GeneratedColumn>,
}

fn run(config: &WorldGenConfig, area: Area) -> Result<Generated, GenError> {
    let mut registry = BlockRegistry::new();
    let palette = MaterialPalette::register_defaults(&mut registry)?;
    info!("Registry: {} block types", registry.len());

    let mut generator = ColumnGenerator::new(config, palette.clone())?;
    generator.set_seed(config.general.seed);

    let start = Instant::now();
    let regions = area.regions();
    let pool = RegionGenerator::with_defaults(generator)?;

    let mut fallback = Vec::new();
    let mut pending = 0;
    for coord in &regions {
        match pool.submit(*coord) {
            Ok(()) => pending += 1,
            Err(coord) => fallback.push(coord),
        }
    }

    let mut columns = HashMap::new();
    let mut keep = |column: GeneratedColumn| {
        if area.contains(column.x, column.z) {
            columns.insert((column.x, column.z), column);
        }
    };

    if !fallback.is_empty() {
        warn!("{} regions did not fit the queue, generating inline", fallback.len());
        let generator = pool.generator();
        for coord in fallback {
            generate_region_sync(&generator, coord).columns.into_iter().for_each(&mut keep);
        }
    }

    let deadline = Instant::now() + RESULT_TIMEOUT;
    while pending > 0 {
        if Instant::now() >= deadline {
            return Err(GenError::Timeout(pending));
        }
        let results = pool.drain_results();
        if results.is_empty() {
            std::thread::sleep(Duration::from_millis(5));
            continue;
        }
        for region in results {
            pending -= 1;
            region.columns.into_iter().for_each(&mut keep);
        }
    }

    info!(
        "Generated {} regions ({} columns, region size {REGION_SIZE}) in {:.1} ms",
        regions.len(),
        columns.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    log_summary(&columns, config.general.sea_level);
    Ok(Generated { palette, columns })
}

fn log_summary(columns: &HashMap<(i32, i32), GeneratedColumn>, sea_level: i32) {
    if columns.is_empty() {
        return;
    }
    let heights = columns.values().map(|c| c.height);
    let (min, max) = heights.fold((i32::MAX, i32::MIN), |(lo, hi), h| (lo.min(h), hi.max(h)));
    let underwater = columns.values().filter(|c| c.height < sea_level - 1).count();
    let shore = columns.values().filter(|c| c.shore).count();
    info!("Heights {min}..={max}, sea level {sea_level}");
    info!("  {underwater} underwater columns, {shore} shore columns");

    let mut classes: HashMap<TemperatureClass, usize> = HashMap::new();
    for column in columns.values() {
        *classes.entry(column.climate.temperature_class).or_default() += 1;
    }
    let mut classes: Vec<_> = classes.into_iter().collect();
    classes.sort();
    for (class, count) in classes {
        info!("  {class:?}: {count} columns");
    }
}

/// One character per column: `~` water, `.` loose shore sand, `:` shore
/// sandstone, otherwise a temperature glyph.
fn glyph(column: &GeneratedColumn, palette: &MaterialPalette, sea_level: i32) -> char {
    if column.height < sea_level - 1 {
        return '~';
    }
    if column.shore {
        return if column.surface.materials == palette.shore_sand {
            '.'
        } else {
            ':'
        };
    }
    match column.climate.temperature_class {
        TemperatureClass::Frozen => '*',
        TemperatureClass::Cold => '+',
        TemperatureClass::Normal => '"',
        TemperatureClass::Lukewarm => ',',
        TemperatureClass::Warm => '\'',
    }
}

fn render_map(generated: &Generated, area: Area, sea_level: i32) -> String {
    let mut map = String::with_capacity(((area.size + 1) * area.size).max(0) as usize);
    for z in area.z..area.z + area.size {
        for x in area.x..area.x + area.size {
            let ch = generated
                .columns
                .get(&(x, z))
                .map_or(' ', |c| glyph(c, &generated.palette, sea_level));
            map.push(ch);
        }
        map.push('\n');
    }
    map
}

#[cfg(test)]
mod tests {
    use strata_worldgen::HeightmapParams;

    use super::*;

    fn generate(config: &WorldGenConfig, area: Area, height: Option<f64>) -> Generated {
        let mut registry = BlockRegistry::new();
        let palette = MaterialPalette::register_defaults(&mut registry).unwrap();
        let mut generator = ColumnGenerator::new(config, palette.clone()).unwrap();
        if let Some(base_height) = height {
            generator = generator.with_heightmap(HeightmapParams {
                amplitude: 0.0,
                base_height,
                ..Default::default()
            });
        }
        generator.set_seed(config.general.seed);
        let mut columns = HashMap::new();
        for coord in area.regions() {
            for column in generate_region_sync(&generator, coord).columns {
                if area.contains(column.x, column.z) {
                    columns.insert((column.x, column.z), column);
                }
            }
        }
        Generated { palette, columns }
    }

    #[test]
    fn test_area_regions_cover_area() {
        let area = Area { x: -8, z: 10, size: 20 };
        let regions = area.regions();
        assert_eq!(
            regions,
            vec![
                RegionCoord::new(-1, 0),
                RegionCoord::new(0, 0),
                RegionCoord::new(-1, 1),
                RegionCoord::new(0, 1),
            ]
        );
        assert!(Area { x: 0, z: 0, size: 0 }.regions().is_empty());
    }

    #[test]
    fn test_area_rejects_overflowing_edge() {
        assert_eq!(Area::new(i32::MAX - 10, 0, 32), None);
        assert_eq!(Area::new(0, i32::MAX, 1), None);
        let edge = Area::new(i32::MAX - 32, i32::MIN, 32).unwrap();
        assert_eq!(edge.regions().len(), 6);
        assert!(edge.contains(i32::MAX - 1, i32::MIN));
        assert!(!edge.contains(i32::MAX, i32::MIN));
        assert_eq!(Area::new(0, 0, u32::MAX).map(|a| a.size), Some(MAX_AREA_SIZE as i32));
    }

    #[test]
    fn test_edge_area_generates() {
        let config = WorldGenConfig::default();
        let area = Area::new(i32::MAX - 4, i32::MIN, 4).unwrap();
        let generated = generate(&config, area, Some(120.0));
        assert_eq!(generated.columns.len(), 16);
        let map = render_map(&generated, area, config.general.sea_level);
        assert_eq!(map.lines().count(), 4);
    }

    #[test]
    fn test_area_contains() {
        let area = Area { x: -4, z: 0, size: 8 };
        assert!(area.contains(-4, 0));
        assert!(area.contains(3, 7));
        assert!(!area.contains(4, 0));
        assert!(!area.contains(0, -1));
    }

    #[test]
    fn test_render_map_dimensions() {
        let config = WorldGenConfig::default();
        let area = Area { x: 5, z: -3, size: 12 };
        let generated = generate(&config, area, None);
        assert_eq!(generated.columns.len(), 144);
        let map = render_map(&generated, area, config.general.sea_level);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| l.chars().count() == 12));
        assert!(!map.contains(' '));
    }

    #[test]
    fn test_underwater_map_is_water() {
        let config = WorldGenConfig::default();
        let area = Area { x: 0, z: 0, size: 4 };
        let generated = generate(&config, area, Some(40.0));
        let map = render_map(&generated, area, config.general.sea_level);
        assert_eq!(map, "~~~~\n".repeat(4));
    }

    #[test]
    fn test_shore_map_uses_shore_glyphs() {
        let mut config = WorldGenConfig::default();
        config.general.seed = 12345;
        let area = Area { x: -16, z: -16, size: 32 };
        let generated = generate(&config, area, Some(97.0));
        let map = render_map(&generated, area, config.general.sea_level);
        assert!(map.chars().all(|c| c == '.' || c == ':' || c == '\n'));
        // Column (4, -14) has shore noise above the threshold, (-3, 4) below it.
        let row = |z: i32| map.lines().nth((z + 16) as usize).unwrap().chars().collect::<Vec<_>>();
        assert_eq!(row(-14)[(4 + 16) as usize], '.');
        assert_eq!(row(4)[(-3 + 16) as usize], ':');
    }
}
