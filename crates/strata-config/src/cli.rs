//! Command-line argument parsing for the strata generator.

use std::path::PathBuf;

use clap::Parser;

use crate::WorldGenConfig;

/// strata command-line arguments.
///
/// CLI values override settings loaded from `worldgen.ron`.
#[derive(Parser, Debug)]
#[command(name = "strata", about = "Seeded terrain column generator")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sea level in blocks.
    #[arg(long)]
    pub sea_level: Option<i32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Western edge of the generated region.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub x: i32,

    /// Northern edge of the generated region.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub z: i32,

    /// Side length of the generated region in columns.
    #[arg(long, default_value_t = 32)]
    pub size: u32,
}

impl WorldGenConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.general.seed = seed;
        }
        if let Some(sea_level) = args.sea_level {
            self.general.sea_level = sea_level;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
