//! # rollwin
//!
//! Stream delimited numeric records as fixed-shape, overlapping window
//! batches without loading the whole source into memory.
//!
//! This is the facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust
//! use rollwin::prelude::*;
//!
//! # fn main() -> rollwin::Result<()> {
//! let reader = VecReader::new((0..23).map(|i| vec![i as f64; 5]).collect());
//! let mut dataset = WindowedDataset::new(reader);
//! dataset.window(5, Some(1), 1)?.batch(5)?;
//!
//! let batch = dataset.get()?.expect("23 records hold at least one batch");
//! assert_eq!(batch.dims(), &[5, 5, 5]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | `rollwin-core` | Shape, Layout, StridedView, DType, Error |
//! | `rollwin-data` | Reader, CsvReader, Normalizer, WindowedDataset, Batch |

/// Re-export core types.
pub use rollwin_core::{
    strided_view, DType, Error, Layout, Result, Shape, StridedIter, StridedView, WithDType,
};

/// Re-export the data layer.
pub mod data {
    pub use rollwin_data::*;
}

pub use rollwin_data::{
    Batch, BatchSpec, CsvConfig, CsvReader, DatasetConfig, Normalizer, RangeNormalizer, Reader,
    VecReader, WindowSpec, WindowedDataset,
};

/// Everything needed to build and consume a dataset.
pub mod prelude {
    pub use rollwin_core::{strided_view, DType, Error, Result, Shape, StridedView, WithDType};
    pub use rollwin_data::{
        Batch, CsvConfig, CsvReader, DatasetConfig, Normalizer, RangeNormalizer, Reader,
        VecReader, WindowedDataset,
    };
}
