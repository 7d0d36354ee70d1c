// StridedView — zero-copy rolling windows over a borrowed buffer
//
// A view is nothing more than a borrowed slice plus a Layout. Rolling a view
// produces another view over the *same* slice, so windows may overlap freely
// without aliasing problems: everything is read-only.
//
//     |-------- size:3 --------|
//     |- stride:1 -|           |
//     |            |           |
//     1            2           3 --------|---
//                                     shift:2
//     3            4           5 --------|---
//
//     5            6           7
//
// The shape is polymorphic: only the leading dimension is windowed, so the
// same call turns records into windows and, applied a second time, windows
// into batches.
//
// The only copy happens in `to_vec`, which walks the layout in logical order.

use crate::error::Result;
use crate::layout::Layout;
use crate::shape::Shape;

/// A read-only, possibly overlapping, strided view into a flat slice.
#[derive(Debug, Clone)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    layout: Layout,
}

impl<'a, T: Copy> StridedView<'a, T> {
    /// View `data` as a contiguous array of the given shape.
    ///
    /// Fails if `data` holds fewer elements than the shape needs.
    pub fn new(data: &'a [T], dims: &[usize]) -> Result<Self> {
        let shape = Shape::from(dims);
        if shape.elem_count() > data.len() {
            crate::bail!(
                "shape {} needs {} elements, buffer has {}",
                shape,
                shape.elem_count(),
                data.len()
            );
        }
        Ok(Self {
            data,
            layout: Layout::contiguous(shape),
        })
    }

    /// View `data` through an explicit layout.
    ///
    /// The caller guarantees every index the layout can produce lies within `data`.
    pub fn from_layout(data: &'a [T], layout: Layout) -> Self {
        debug_assert!(layout.strided_indices().all(|i| i < data.len()));
        Self { data, layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn shape(&self) -> &Shape {
        self.layout.shape()
    }

    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    /// Number of elements along the leading dimension.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Window the leading dimension. See [`strided_view`].
    pub fn rolling(&self, size: usize, shift: usize, stride: usize) -> Result<StridedView<'a, T>> {
        Ok(StridedView {
            data: self.data,
            layout: self.layout.rolling(size, shift, stride)?,
        })
    }

    /// Drop a dimension of size 1.
    pub fn squeeze(&self, dim: usize) -> Result<StridedView<'a, T>> {
        Ok(StridedView {
            data: self.data,
            layout: self.layout.squeeze(dim)?,
        })
    }

    /// The `i`-th element along the leading dimension, as a sub-view.
    pub fn get(&self, i: usize) -> Result<StridedView<'a, T>> {
        Ok(StridedView {
            data: self.data,
            layout: self.layout.index(i)?,
        })
    }

    /// The scalar at a full multi-dimensional index.
    pub fn element(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.layout.rank()
            || index.iter().zip(self.dims()).any(|(&i, &d)| i >= d)
        {
            return None;
        }
        self.data.get(self.layout.flat_index(index)).copied()
    }

    /// Iterate sub-views along the leading dimension.
    pub fn iter(&self) -> impl Iterator<Item = StridedView<'a, T>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).ok())
    }

    /// Copy the viewed elements into a new contiguous Vec, in logical order.
    pub fn to_vec(&self) -> Vec<T> {
        self.layout
            .strided_indices()
            .map(|i| self.data[i])
            .collect()
    }
}

/// Produce overlapping fixed-size windows over the leading dimension of `view`.
///
/// * `size` — elements per window
/// * `shift` — windows between consecutive window starts, in units of
///   `stride`; `None` means `size` (non-overlapping windows)
/// * `stride` — distance between consecutive elements inside a window
///
/// Window `k` holds the elements at `k*shift*stride + j*stride` for
/// `j in 0..size`. Trailing elements that cannot complete a window are
/// dropped. Fails with [`crate::Error::InvalidWindow`] when not even one
/// window fits.
pub fn strided_view<'a, T: Copy>(
    view: &StridedView<'a, T>,
    size: usize,
    shift: Option<usize>,
    stride: usize,
) -> Result<StridedView<'a, T>> {
    view.rolling(size, shift.unwrap_or(size), stride)
}
