// Normalizer — linear rescale of column values and its exact inverse
//
// Readers apply normalizers positionally to their *output* columns (after
// column selection), one normalizer per selected column. Consumers keep the
// same normalizers around to map model output back to source units with
// `restore`.

use rollwin_core::{Error, Result, WithDType};

/// A stateless, invertible scalar transform.
pub trait Normalizer: Send + Sync {
    /// Map a raw source value into model space.
    fn normalize(&self, value: f64) -> f64;

    /// Map a model-space value back to source units.
    /// `restore(normalize(x)) == x` up to floating-point rounding.
    fn restore(&self, value: f64) -> f64;
}

/// Affine map of `[min, max]` onto `[0, 1]`: `(x - min) / (max - min)`.
///
/// Values outside the range are not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeNormalizer {
    min: f64,
    scale: f64,
}

impl RangeNormalizer {
    /// Fails when the range is empty or not finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let scale = max - min;
        if !scale.is_finite() || scale == 0.0 {
            return Err(Error::config(format!(
                "RangeNormalizer: empty or non-finite range [{min}, {max}]"
            )));
        }
        Ok(Self { min, scale })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.min + self.scale
    }
}

impl Normalizer for RangeNormalizer {
    fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.scale
    }

    fn restore(&self, value: f64) -> f64 {
        value * self.scale + self.min
    }
}

/// A positional list of normalizers, one per output column.
#[derive(Default)]
pub struct Normalizers {
    columns: Vec<Box<dyn Normalizer>>,
}

impl Normalizers {
    pub fn new(columns: Vec<Box<dyn Normalizer>>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Normalize a record in place. Columns beyond the list are left untouched.
    pub fn normalize_record<T: WithDType>(&self, record: &mut [T]) {
        for (value, n) in record.iter_mut().zip(&self.columns) {
            *value = T::from_f64(n.normalize(value.to_f64()));
        }
    }

    /// Inverse of [`Normalizers::normalize_record`].
    pub fn restore_record<T: WithDType>(&self, record: &mut [T]) {
        for (value, n) in record.iter_mut().zip(&self.columns) {
            *value = T::from_f64(n.restore(value.to_f64()));
        }
    }
}

impl std::fmt::Debug for Normalizers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizers")
            .field("columns", &self.columns.len())
            .finish()
    }
}
