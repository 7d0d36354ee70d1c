/// All errors that can occur within rollwin.
///
/// End-of-stream is never an error: readers and datasets report it as
/// `Ok(None)`. The variants here cover misuse of the configuration API,
/// internal sizing failures, and real I/O failures of the underlying source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `window()` or `batch()` was called after streaming started.
    /// Call `reset()` first to unlock the configuration.
    #[error("cannot call `{method}` after the dataset started streaming; call `reset()` first")]
    ConfigurationLocked { method: &'static str },

    /// A rolling window does not fit in the sequence it is applied to.
    ///
    /// `extent` is the number of elements one window spans
    /// (`(size - 1) * stride + 1`). A correctly sized dataset buffer never
    /// triggers this.
    #[error("cannot form a window of size {size} (extent {extent}) over {len} elements")]
    InvalidWindow {
        size: usize,
        extent: usize,
        len: usize,
    },

    /// A non-positive explicit limit was passed to `max_reads`.
    #[error("max_lines must be positive, but got `{limit}`")]
    InvalidLimit { limit: usize },

    /// A configuration value is out of range (zero window size, empty range, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The number of normalizers does not match the number of selected columns.
    #[error("got {normalizers} normalizers for {columns} selected columns")]
    NormalizerMismatch { normalizers: usize, columns: usize },

    /// I/O failure of the underlying source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Create an [`Error::InvalidConfig`] from any string message.
    pub fn config(s: impl Into<String>) -> Self {
        Error::InvalidConfig(s.into())
    }
}

/// Convenience Result type used throughout rollwin.
pub type Result<T> = std::result::Result<T, Error>;

/// Early return with a formatted error message.
/// Usage: `bail!("column {} is missing", idx)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}
