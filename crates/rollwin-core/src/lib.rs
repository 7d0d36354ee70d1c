//! # rollwin-core
//!
//! Storage-level primitives for rollwin.
//!
//! This crate provides:
//! - [`Shape`] / [`Layout`] — shape, strides and offset over flat record storage
//! - [`StridedView`] and [`strided_view`] — zero-copy overlapping windows
//! - [`DType`] / [`WithDType`] — the scalar element types a dataset can carry
//! - [`Error`] / [`Result`] — the error type shared by every rollwin crate

pub mod dtype;
pub mod error;
pub mod layout;
pub mod shape;
pub mod view;

pub use dtype::{DType, WithDType};
pub use error::{Error, Result};
pub use layout::{Layout, StridedIter};
pub use shape::Shape;
pub use view::{strided_view, StridedView};
