//! World-generation configuration for strata.
//!
//! Settings persist to disk as RON, are range-checked after every load, and
//! can be overridden from the command line. The generator core reads them
//! once at startup and treats them as immutable for the session.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BiomesConfig, CavesConfig, DebugConfig, GeneralConfig, NoiseLayerType, WorldGenConfig,
    default_config_dir,
};
pub use error::ConfigError;
