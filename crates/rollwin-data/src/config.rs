// Configuration — window/batch specs and reader settings
//
// All config structs derive serde so a pipeline can be described in JSON:
//
//   {
//     "window": { "size": 5, "shift": 1 },
//     "batch":  { "count": 5 }
//   }
//
// Missing fields fall back to the same defaults as the builder API.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rollwin_core::{Error, Result};

/// How many consecutive (strided) records form one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Records per window.
    pub size: usize,
    /// Distance between window starts, in units of `stride`.
    /// `None` means `size` (non-overlapping windows).
    #[serde(default)]
    pub shift: Option<usize>,
    /// Distance between consecutive records inside one window.
    #[serde(default = "one")]
    pub stride: usize,
}

fn one() -> usize {
    1
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            size: 1,
            shift: None,
            stride: 1,
        }
    }
}

impl WindowSpec {
    pub fn new(size: usize, shift: Option<usize>, stride: usize) -> Result<Self> {
        let spec = Self {
            size,
            shift,
            stride,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// The effective shift (`size` when unset).
    pub fn shift(&self) -> usize {
        self.shift.unwrap_or(self.size)
    }

    /// Records needed to form one window: `(size - 1) * stride + 1`.
    ///
    /// Only meaningful for a validated spec.
    pub fn single_least(&self) -> usize {
        (self.size - 1) * self.stride + 1
    }

    /// Record advance between two consecutive windows: `shift * stride`.
    pub fn single_step(&self) -> usize {
        self.shift() * self.stride
    }

    fn checked_single_least(&self) -> Option<usize> {
        self.size
            .checked_sub(1)?
            .checked_mul(self.stride)?
            .checked_add(1)
    }

    fn checked_single_step(&self) -> Option<usize> {
        self.shift().checked_mul(self.stride)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.stride == 0 || self.shift == Some(0) {
            return Err(Error::config(format!(
                "window size, shift and stride must be positive, got {:?}",
                self
            )));
        }
        if self.checked_single_least().is_none() || self.checked_single_step().is_none() {
            return Err(Error::config(format!(
                "window {:?} spans more records than can be addressed",
                self
            )));
        }
        Ok(())
    }
}

/// How many consecutive windows form one delivered batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpec {
    pub count: usize,
}

impl Default for BatchSpec {
    fn default() -> Self {
        Self { count: 1 }
    }
}

impl BatchSpec {
    pub fn new(count: usize) -> Result<Self> {
        let spec = Self { count };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::config("batch count must be positive"));
        }
        Ok(())
    }
}

/// Window and batch settings of a dataset, loadable from JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub window: WindowSpec,
    #[serde(default)]
    pub batch: BatchSpec,
}

impl DatasetConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| Error::config(format!("DatasetConfig: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// `(least, step)`, or `None` when either does not fit in `usize`.
    ///
    /// `least + step` must fit as well: that is the most a sliding buffer
    /// ever holds.
    fn checked_sizes(&self) -> Option<(usize, usize)> {
        let single_least = self.window.checked_single_least()?;
        let single_step = self.window.checked_single_step()?;
        let least = self
            .batch
            .count
            .checked_sub(1)?
            .checked_mul(single_step)?
            .checked_add(single_least)?;
        let step = self.batch.count.checked_mul(single_step)?;
        least.checked_add(step)?;
        Some((least, step))
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.batch.validate()?;
        if self.checked_sizes().is_none() {
            return Err(Error::config(format!(
                "window {:?} with {} windows per batch needs more records than can be addressed",
                self.window, self.batch.count
            )));
        }
        Ok(())
    }
}

/// Settings for [`crate::CsvReader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Whether the first line is a header (skipped, and skipped again after every reset).
    #[serde(default)]
    pub has_header: bool,
    /// Source columns to keep. Selected columns come out in file order,
    /// whatever order they are listed in here. Empty keeps every column.
    #[serde(default)]
    pub indexes: Vec<usize>,
    /// Cell separator.
    #[serde(default = "default_splitter")]
    pub splitter: String,
    /// Stop after this many records (per reset). `None` reads to the end.
    #[serde(default)]
    pub max_lines: Option<usize>,
}

fn default_splitter() -> String {
    ",".to_string()
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            has_header: false,
            indexes: Vec::new(),
            splitter: default_splitter(),
            max_lines: None,
        }
    }
}

impl CsvConfig {
    pub fn has_header(mut self, h: bool) -> Self {
        self.has_header = h;
        self
    }
    pub fn indexes(mut self, cols: Vec<usize>) -> Self {
        self.indexes = cols;
        self
    }
    pub fn splitter(mut self, s: impl Into<String>) -> Self {
        self.splitter = s.into();
        self
    }
    pub fn max_lines(mut self, n: Option<usize>) -> Self {
        self.max_lines = n;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.splitter.is_empty() {
            return Err(Error::config("CsvConfig: splitter must not be empty"));
        }
        Ok(())
    }
}
