// Batch — one delivered unit of windows
//
// The dataset's buffer slides as soon as a batch has been computed, so a
// batch cannot borrow from it. Building a batch walks the (overlapping)
// strided view once and copies it into contiguous storage; all slicing of
// a delivered batch goes back through zero-copy views.

use rollwin_core::{Layout, Result, Shape, StridedView};

/// An owned, contiguous batch.
///
/// Shape is `[count, size, width]` in general. When `size == 1` windows are
/// plain records (`[count, width]`); when `count == 1` the batch is the
/// window sequence itself (`[1, size, width]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    data: Vec<T>,
    shape: Shape,
}

impl<T: Copy> Batch<T> {
    /// Materialize a view in logical order.
    pub fn from_view(view: &StridedView<'_, T>) -> Self {
        Self {
            data: view.to_vec(),
            shape: view.shape().clone(),
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Row-major values.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Number of windows (or records, for single-record windows).
    pub fn len(&self) -> usize {
        self.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole batch as a view.
    pub fn view(&self) -> StridedView<'_, T> {
        // `data` always holds exactly `shape.elem_count()` values.
        StridedView::from_layout(&self.data, Layout::contiguous(self.shape.clone()))
    }

    /// The `i`-th window of the batch.
    pub fn get(&self, i: usize) -> Result<StridedView<'_, T>> {
        self.view().get(i)
    }

    /// Iterate windows.
    pub fn iter(&self) -> impl Iterator<Item = StridedView<'_, T>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).ok())
    }
}
