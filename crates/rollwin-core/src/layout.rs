use crate::error::{Error, Result};
use crate::shape::Shape;

// Layout — how a logical shape maps onto flat record storage
//
// Rows of a record buffer sit back to back in one flat Vec, so a buffer of
// N records of width W has shape [N, W] and strides [W, 1]. Every window and
// batch we hand out is described by a Layout over that same storage:
//
// 1. **Rolling**: window dimension 0 into `steps` windows of `size` elements.
//    Window k starts at element k*shift*stride; its elements are `stride`
//    apart. Only the shape and strides change:
//
//      [N, W] strides [W, 1]
//        → rolling(size, shift, stride)
//      [steps, size, W] strides [W*shift*stride, W*stride, 1]
//
//    Consecutive windows overlap whenever shift*stride < extent, which is
//    exactly why we never copy while rolling.
//
// 2. **Index**: pick element i of dimension 0 and drop that dimension.
//    This only moves the offset.
//
// 3. **Strided indices**: walk the logical elements in row-major order and
//    yield their position in storage. This is how a view is materialized.

/// Layout describes how a logical shape maps to flat storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Vec<usize>,
    /// Offset into storage where the first logical element lives.
    offset: usize,
}

impl Layout {
    /// Create a new contiguous layout for the given shape.
    pub fn contiguous(shape: Shape) -> Self {
        let strides = shape.stride_contiguous();
        Layout {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a layout with explicit strides and offset.
    pub fn new(shape: Shape, strides: Vec<usize>, offset: usize) -> Self {
        Layout {
            shape,
            strides,
            offset,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Length of the leading dimension (0 for a scalar layout).
    pub fn len(&self) -> usize {
        self.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this layout is contiguous (row-major, no gaps, offset 0).
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == self.shape.stride_contiguous()
    }

    /// Number of windows `rolling` produces over `len` elements.
    ///
    /// A window spans `extent = (size - 1) * stride + 1` elements and
    /// consecutive windows start `shift * stride` apart. Trailing elements
    /// that cannot complete a full window are dropped.
    pub fn rolling_steps(len: usize, size: usize, shift: usize, stride: usize) -> Result<usize> {
        if size == 0 || shift == 0 || stride == 0 {
            return Err(Error::config(format!(
                "window size, shift and stride must be positive, got ({size}, {shift}, {stride})"
            )));
        }
        let extent = (size - 1).saturating_mul(stride).saturating_add(1);
        if extent > len {
            return Err(Error::InvalidWindow { size, extent, len });
        }
        // a step past the end leaves room for the first window only
        let window_step = shift.saturating_mul(stride);
        Ok((len - extent) / window_step + 1)
    }

    /// Window dimension 0 into overlapping windows. No data is copied.
    ///
    /// Example: [10] rolling(3, 3, 1) → [3, 3] strides [3, 1]
    ///          windows [0,1,2], [3,4,5], [6,7,8]; element 9 is dropped.
    pub fn rolling(&self, size: usize, shift: usize, stride: usize) -> Result<Layout> {
        if self.rank() == 0 {
            return Err(Error::msg("cannot roll a scalar layout"));
        }
        let steps = Self::rolling_steps(self.len(), size, shift, stride)?;
        let outer = self.strides[0];

        let mut dims = Vec::with_capacity(self.rank() + 1);
        dims.push(steps);
        dims.push(size);
        dims.extend_from_slice(&self.dims()[1..]);

        let mut strides = Vec::with_capacity(self.rank() + 1);
        strides.push(outer.saturating_mul(shift).saturating_mul(stride));
        strides.push(outer.saturating_mul(stride));
        strides.extend_from_slice(&self.strides[1..]);

        Ok(Layout::new(Shape::new(dims), strides, self.offset))
    }

    /// Select element `i` of dimension 0, dropping that dimension.
    pub fn index(&self, i: usize) -> Result<Layout> {
        let len = self.len();
        if self.rank() == 0 || i >= len {
            return Err(Error::msg(format!(
                "index {i} out of range for leading dimension of size {len}"
            )));
        }
        Ok(Layout::new(
            self.shape.inner(),
            self.strides[1..].to_vec(),
            self.offset + i * self.strides[0],
        ))
    }

    /// Remove dimension `dim`, which must have size 1.
    ///
    /// Example: [3, 1, 2] squeeze(1) → [3, 2]
    pub fn squeeze(&self, dim: usize) -> Result<Layout> {
        if self.dims().get(dim) != Some(&1) {
            return Err(Error::msg(format!(
                "cannot squeeze dim {dim} of shape {}",
                self.shape
            )));
        }
        let mut dims = self.dims().to_vec();
        let mut strides = self.strides.clone();
        dims.remove(dim);
        strides.remove(dim);
        Ok(Layout::new(Shape::new(dims), strides, self.offset))
    }

    /// Flat storage index for a multi-dimensional index:
    /// `offset + sum(index[i] * stride[i])`.
    pub fn flat_index(&self, index: &[usize]) -> usize {
        let mut flat = self.offset;
        for (i, &idx) in index.iter().enumerate() {
            flat += idx * self.strides[i];
        }
        flat
    }

    /// Iterator over all flat indices of this layout, in logical order.
    pub fn strided_indices(&self) -> StridedIter {
        StridedIter::new(self)
    }
}

// StridedIter — flat storage indices of a (possibly overlapping) layout
//
// For a contiguous layout this counts 0, 1, 2, ... For a rolled layout the
// same storage index may come out several times, once per window that
// covers it.

/// Iterator that yields flat storage indices for each element of a Layout.
pub struct StridedIter {
    current: Vec<usize>,
    dims: Vec<usize>,
    strides: Vec<usize>,
    offset: usize,
    remaining: usize,
    started: bool,
}

impl StridedIter {
    fn new(layout: &Layout) -> Self {
        StridedIter {
            current: vec![0; layout.rank()],
            dims: layout.dims().to_vec(),
            strides: layout.strides().to_vec(),
            offset: layout.offset(),
            remaining: layout.elem_count(),
            started: false,
        }
    }

    fn flat_index(&self) -> usize {
        self.current
            .iter()
            .zip(&self.strides)
            .fold(self.offset, |acc, (&i, &s)| acc + i * s)
    }

    /// Advance the multi-dimensional index by one (rightmost dimension first).
    fn advance(&mut self) {
        for i in (0..self.dims.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.dims[i] {
                return;
            }
            self.current[i] = 0;
        }
    }
}

impl Iterator for StridedIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        if self.started {
            self.advance();
        }
        self.started = true;
        self.remaining -= 1;
        Some(self.flat_index())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StridedIter {}
