// Reader — a sequential source of parsed records
//
// The dataset never opens files or parses cells itself; it pulls one record
// at a time through this trait. `Ok(None)` is end-of-stream and is not an
// error. `Err` is reserved for real failures of the underlying source.

use rollwin_core::{DType, Result, WithDType};

/// One parsed source row, in selected-column order.
pub type Record<T> = Vec<T>;

/// A resettable, optionally capped, sequential record source.
pub trait Reader<T: WithDType> {
    /// Read the next record, or `Ok(None)` at end-of-stream.
    fn readline(&mut self) -> Result<Option<Record<T>>>;

    /// Rewind to the first record, replaying any header skip.
    fn reset(&mut self) -> Result<()>;

    /// Records successfully produced since the last reset.
    fn lines(&self) -> usize;

    /// Cap on records produced per reset. `None` is unbounded.
    fn max_lines(&self) -> Option<usize> {
        None
    }

    /// Change the cap. Readers without cap support ignore this.
    fn set_max_lines(&mut self, _max_lines: Option<usize>) {}

    /// The scalar type of produced records.
    fn dtype(&self) -> DType {
        T::DTYPE
    }
}

impl<T: WithDType, R: Reader<T> + ?Sized> Reader<T> for Box<R> {
    fn readline(&mut self) -> Result<Option<Record<T>>> {
        (**self).readline()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn lines(&self) -> usize {
        (**self).lines()
    }

    fn max_lines(&self) -> Option<usize> {
        (**self).max_lines()
    }

    fn set_max_lines(&mut self, max_lines: Option<usize>) {
        (**self).set_max_lines(max_lines)
    }
}

// VecReader — in-memory records

/// A reader over records already held in memory.
///
/// Useful for synthetic feeds and for testing pipelines without a file.
#[derive(Debug, Clone)]
pub struct VecReader<T> {
    records: Vec<Record<T>>,
    cursor: usize,
    max_lines: Option<usize>,
}

impl<T: WithDType> VecReader<T> {
    pub fn new(records: Vec<Record<T>>) -> Self {
        Self {
            records,
            cursor: 0,
            max_lines: None,
        }
    }

    /// Build from a row-major `[n_records, width]` slice.
    pub fn from_flat(values: &[T], width: usize) -> Self {
        let records = values.chunks_exact(width.max(1)).map(<[T]>::to_vec).collect();
        Self::new(records)
    }

    pub fn with_max_lines(mut self, max_lines: Option<usize>) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Total records held, regardless of cursor and cap.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: WithDType> Reader<T> for VecReader<T> {
    fn readline(&mut self) -> Result<Option<Record<T>>> {
        if self.max_lines.is_some_and(|cap| self.cursor >= cap) {
            return Ok(None);
        }
        let record = self.records.get(self.cursor).cloned();
        if record.is_some() {
            self.cursor += 1;
        }
        Ok(record)
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn lines(&self) -> usize {
        self.cursor
    }

    fn max_lines(&self) -> Option<usize> {
        self.max_lines
    }

    fn set_max_lines(&mut self, max_lines: Option<usize>) {
        self.max_lines = max_lines;
    }
}
