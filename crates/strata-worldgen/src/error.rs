use thiserror::Error;

use crate::classify::ClassifyError;

/// Errors raised while assembling generators. Evaluation itself never fails.
#[derive(Debug, Error)]
pub enum WorldGenError {
    /// A cutoff table could not be built.
    #[error("invalid cutoff table: {0}")]
    Classify(#[from] ClassifyError),

    /// A variant table names a material set that does not exist.
    #[error("cutoff table selects variant {index} but only {variants} material sets exist")]
    VariantOutOfRange { index: usize, variants: usize },

    /// A rock stratum has no rocks to choose from.
    #[error("rock stratum {0} has no rocks")]
    EmptyStratum(&'static str),

    /// A generator was handed to the worker pool before it was seeded.
    #[error("column generator has no seed")]
    Unseeded,

    /// A worker pool was requested with no worker threads.
    #[error("region worker pool needs at least one thread")]
    NoWorkers,

    /// A worker thread could not be spawned.
    #[error("failed to spawn region worker: {0}")]
    Spawn(#[from] std::io::Error),
}
