//! # rollwin-data
//!
//! Record sources and the windowed, batched streaming dataset.
//!
//! This crate provides:
//! - [`Reader`] trait — one parsed record at a time, resettable, optionally capped
//! - [`CsvReader`] / [`VecReader`] — delimited text and in-memory record sources
//! - [`Normalizer`] / [`RangeNormalizer`] — invertible per-column rescaling
//! - [`WindowedDataset`] — slides a record buffer and yields overlapping window batches
//   - Window/batch/reader settings are serde-deserializable (see `config`)
//   - Batches are owned and contiguous; windows inside them are zero-copy views

pub mod batch;
pub mod config;
pub mod csv_reader;
pub mod dataset;
pub mod normalizer;
pub mod reader;

pub use batch::Batch;
pub use config::{BatchSpec, CsvConfig, DatasetConfig, WindowSpec};
pub use csv_reader::CsvReader;
pub use dataset::{Batches, WindowedDataset};
pub use normalizer::{Normalizer, Normalizers, RangeNormalizer};
pub use reader::{Reader, Record, VecReader};
