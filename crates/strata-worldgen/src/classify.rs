//! Discretizing continuous noise into ordered categories.

use thiserror::Error;

use crate::field::Noise2D;

/// Errors raised when building a [`CutoffTable`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// The table has no entries.
    #[error("cutoff table has no categories")]
    Empty,
    /// Threshold `index` is not greater than its predecessor.
    #[error("cutoff {index} is not greater than the previous cutoff")]
    NotIncreasing {
        /// Position of the offending threshold.
        index: usize,
    },
    /// Threshold `index` is NaN.
    #[error("cutoff {index} is NaN")]
    NanThreshold {
        /// Position of the offending threshold.
        index: usize,
    },
}

/// Ordered `(threshold, category)` pairs.
///
/// A value belongs to the first category whose threshold it does not exceed;
/// values above every threshold fall into the last category. A value equal to
/// a threshold therefore stays in the lower category.
#[derive(Clone, Debug, PartialEq)]
pub struct CutoffTable<C> {
    thresholds: Vec<f64>,
    categories: Vec<C>,
}

impl<C> CutoffTable<C> {
    /// Build a table from pairs with strictly increasing thresholds.
    pub fn new(pairs: impl IntoIterator<Item = (f64, C)>) -> Result<Self, ClassifyError> {
        let (thresholds, categories): (Vec<f64>, Vec<C>) = pairs.into_iter().unzip();
        if categories.is_empty() {
            return Err(ClassifyError::Empty);
        }
        for (index, threshold) in thresholds.iter().enumerate() {
            if threshold.is_nan() {
                return Err(ClassifyError::NanThreshold { index });
            }
            if index > 0 && *threshold <= thresholds[index - 1] {
                return Err(ClassifyError::NotIncreasing { index });
            }
        }
        Ok(Self {
            thresholds,
            categories,
        })
    }

    /// Two-way split: `value <= threshold` selects `at_or_below`, anything
    /// greater selects `above`.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not finite.
    pub fn split(threshold: f64, at_or_below: C, above: C) -> Self {
        assert!(threshold.is_finite(), "split threshold must be finite");
        Self {
            thresholds: vec![threshold, f64::INFINITY],
            categories: vec![at_or_below, above],
        }
    }

    /// Table that maps every value to `category`.
    pub fn single(category: C) -> Self {
        Self {
            thresholds: vec![f64::INFINITY],
            categories: vec![category],
        }
    }

    /// Split `[min, max]` into equal buckets, one per category, in order.
    pub fn uniform(categories: Vec<C>, min: f64, max: f64) -> Result<Self, ClassifyError> {
        let count = categories.len() as f64;
        let width = max - min;
        Self::new(
            categories
                .into_iter()
                .enumerate()
                .map(|(i, category)| (min + width * (i as f64 + 1.0) / count, category)),
        )
    }

    /// Position of the category `value` falls into.
    ///
    /// Total: NaN maps to the first category.
    #[inline]
    pub fn index_of(&self, value: f64) -> usize {
        let index = self.thresholds.partition_point(|&t| t < value);
        index.min(self.categories.len() - 1)
    }

    /// The category `value` falls into.
    #[inline]
    pub fn classify(&self, value: f64) -> &C {
        &self.categories[self.index_of(value)]
    }

    /// Thresholds in ascending order.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Categories in table order.
    pub fn categories(&self) -> &[C] {
        &self.categories
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A noise field paired with the table that discretizes it.
pub struct ClassifiedNoise<N, C> {
    field: N,
    table: CutoffTable<C>,
}

impl<N: Noise2D, C> ClassifiedNoise<N, C> {
    /// Pair `field` with `table`.
    pub fn new(field: N, table: CutoffTable<C>) -> Self {
        Self { field, table }
    }

    /// Raw field value at `(x, z)`.
    #[inline]
    pub fn value(&self, x: f64, z: f64) -> f64 {
        self.field.noise(x, z)
    }

    /// Category at `(x, z)`.
    #[inline]
    pub fn classify(&self, x: f64, z: f64) -> &C {
        self.table.classify(self.value(x, z))
    }

    /// The cutoff table.
    pub fn table(&self) -> &CutoffTable<C> {
        &self.table
    }
}
