// WindowedDataset — lazily stream overlapping window batches from a Reader
//
// The dataset keeps a sliding buffer of exactly `least` records, the minimum
// needed to build one batch:
//
//   single_least = (size - 1) * stride + 1     records spanned by one window
//   single_step  = shift * stride              advance between two windows
//   least        = single_least + (count - 1) * single_step
//   step         = count * single_step         advance between two batches
//
// Each `get()` shapes the current buffer into a batch with two rolling views
// (records → windows, windows → batches), then pulls `step` new records and
// drops the oldest `step` so the buffer is ready for the next call. Because
// the buffer holds exactly `least` records, the first view yields exactly
// `count` windows and the second exactly one batch.
//
// Lifecycle:
//
//   Unconfigured ──get()──► Streaming ──(source ends)──► Streaming, empty buffer
//        ▲                      │
//        └──────reset()─────────┘
//
// window()/batch() only succeed while Unconfigured.
//
// A reader error never loses a record or a batch: the records pulled so far
// stay buffered, a batch already shaped is held back, and the next `get()`
// finishes the pull before handing either out.

use rollwin_core::{bail, strided_view, Error, Result, StridedView, WithDType};

use crate::batch::Batch;
use crate::config::{BatchSpec, DatasetConfig, WindowSpec};
use crate::reader::Reader;

/// Retained tail of the source, flattened row-major.
#[derive(Debug)]
struct Buffer<T> {
    values: Vec<T>,
    width: usize,
    records: usize,
    /// Oldest records to drop once the pending pull completes.
    pending_drop: usize,
    exhausted: bool,
}

impl<T: WithDType> Buffer<T> {
    fn empty() -> Self {
        Self {
            values: Vec::new(),
            width: 0,
            records: 0,
            pending_drop: 0,
            exhausted: false,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn push(&mut self, record: Vec<T>) -> Result<()> {
        if self.records == 0 {
            self.width = record.len();
        } else if record.len() != self.width {
            bail!("record width changed from {} to {}", self.width, record.len());
        }
        self.values.extend(record);
        self.records += 1;
        Ok(())
    }

    fn finish(&mut self) {
        self.values.clear();
        self.records = 0;
        self.pending_drop = 0;
        self.exhausted = true;
    }

    /// Schedule dropping the oldest `step` records after `step` new ones arrive.
    fn advance(&mut self, step: usize) {
        self.pending_drop = step;
    }

    /// Pull records until the buffer holds exactly `least` after the pending
    /// drop. Ends up exhausted if the source ends first.
    ///
    /// A reader error leaves the records pulled so far in place, so the next
    /// call resumes where this one stopped.
    fn top_up<R: Reader<T>>(&mut self, reader: &mut R, least: usize) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        let target = least + self.pending_drop;
        let before = self.records;
        while self.records < target {
            match reader.readline()? {
                Some(record) => {
                    if let Err(e) = self.push(record) {
                        self.finish();
                        return Err(e);
                    }
                }
                None => {
                    tracing::debug!(
                        wanted = target,
                        got = self.records,
                        lines = reader.lines(),
                        "source exhausted"
                    );
                    self.finish();
                    return Ok(());
                }
            }
        }
        if self.pending_drop > 0 {
            self.values.drain(..self.pending_drop * self.width);
            self.records = least;
            self.pending_drop = 0;
        } else if self.records > before {
            tracing::debug!(records = least, width = self.width, "buffer filled");
        }
        Ok(())
    }

    fn view(&self) -> Result<StridedView<'_, T>> {
        StridedView::new(&self.values, &[self.records, self.width])
    }
}

enum State<T> {
    /// No buffer yet; window and batch settings may change.
    Unconfigured,
    /// Buffer materialized; settings are locked until `reset()`.
    Streaming {
        buffer: Buffer<T>,
        /// A batch already shaped whose trailing pull failed; delivered by
        /// the next successful `get()`.
        held: Option<Batch<T>>,
    },
}

/// A pull-based dataset of fixed-shape, overlapping window batches.
///
/// # Example
/// ```ignore
/// let reader = CsvReader::<f64>::open("stock.csv", CsvConfig::default()
///     .has_header(true)
///     .indexes(vec![2, 3, 4, 5, 6]))?;
/// let mut dataset = WindowedDataset::new(reader);
/// dataset.window(5, Some(1), 1)?.batch(5)?;
///
/// while let Some(batch) = dataset.get()? {
///     assert_eq!(batch.dims(), &[5, 5, 5]);
/// }
/// ```
pub struct WindowedDataset<T, R> {
    reader: R,
    window: WindowSpec,
    batch: BatchSpec,
    state: State<T>,
}

impl<T: WithDType, R: Reader<T>> WindowedDataset<T, R> {
    /// Wrap a reader. Defaults to single-record windows, one window per batch.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            window: WindowSpec::default(),
            batch: BatchSpec::default(),
            state: State::Unconfigured,
        }
    }

    /// Wrap a reader with window and batch settings from a config.
    pub fn with_config(reader: R, config: &DatasetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            window: config.window,
            batch: config.batch,
            state: State::Unconfigured,
        })
    }

    fn ensure_unconfigured(&self, method: &'static str) -> Result<()> {
        match self.state {
            State::Unconfigured => Ok(()),
            State::Streaming { .. } => Err(Error::ConfigurationLocked { method }),
        }
    }

    /// Set the window: `size` records per window, window starts `shift`
    /// strides apart (`None` = `size`), records `stride` apart inside a window.
    ///
    /// With `size == 1` the window dimension is dropped and batches have
    /// shape `(count, width)`. The records are still `shift * stride` apart,
    /// so `window(1, Some(3), 1)` yields records 0, 3, 6, ... rather than
    /// consecutive ones.
    ///
    /// Fails with [`Error::InvalidConfig`] on zeros, or when the resulting
    /// batch would need more records than a `usize` can count.
    pub fn window(&mut self, size: usize, shift: Option<usize>, stride: usize) -> Result<&mut Self> {
        self.ensure_unconfigured("window")?;
        let window = WindowSpec::new(size, shift, stride)?;
        DatasetConfig {
            window,
            batch: self.batch,
        }
        .validate()?;
        self.window = window;
        Ok(self)
    }

    /// Set how many consecutive windows form one batch.
    pub fn batch(&mut self, count: usize) -> Result<&mut Self> {
        self.ensure_unconfigured("batch")?;
        let batch = BatchSpec::new(count)?;
        DatasetConfig {
            window: self.window,
            batch,
        }
        .validate()?;
        self.batch = batch;
        Ok(self)
    }

    pub fn window_spec(&self) -> &WindowSpec {
        &self.window
    }

    pub fn batch_spec(&self) -> &BatchSpec {
        &self.batch
    }

    /// Records needed to form one window.
    pub fn single_least(&self) -> usize {
        self.window.single_least()
    }

    /// Record advance between two consecutive windows.
    pub fn single_step(&self) -> usize {
        self.window.single_step()
    }

    /// Records needed to form the first batch.
    pub fn least(&self) -> usize {
        self.single_least() + (self.batch.count - 1) * self.single_step()
    }

    /// Records pulled (and dropped) between two `get()` calls.
    pub fn step(&self) -> usize {
        self.batch.count * self.single_step()
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, State::Streaming { .. })
    }

    /// Whether `get()` will keep returning `None` until `reset()`.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            &self.state,
            State::Streaming { buffer, held: None } if buffer.is_exhausted()
        )
    }

    /// Records currently buffered, `None` before the first `get()`.
    pub fn buffered(&self) -> Option<usize> {
        match &self.state {
            State::Unconfigured => None,
            State::Streaming { buffer, .. } => Some(buffer.records),
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_reader(self) -> R {
        self.reader
    }

    /// Produce the next batch, or `None` once the source is exhausted.
    ///
    /// The batch comes from the records already buffered. Afterwards the
    /// buffer slides forward by `step` records for the next call; if the
    /// source ends during that pull, this batch is still returned and every
    /// later call returns `None` until `reset()`.
    ///
    /// If the reader fails during that pull, the error is returned and the
    /// batch is held back: the next call finishes the pull and returns it.
    pub fn get(&mut self) -> Result<Option<Batch<T>>> {
        let (least, step) = (self.least(), self.step());
        let (mut buffer, held) = match std::mem::replace(&mut self.state, State::Unconfigured) {
            State::Streaming { buffer, held } => (buffer, held),
            State::Unconfigured => (Buffer::empty(), None),
        };

        if let Err(e) = buffer.top_up(&mut self.reader, least) {
            self.state = State::Streaming { buffer, held };
            return Err(e);
        }
        if let Some(batch) = held {
            self.state = State::Streaming { buffer, held: None };
            return Ok(Some(batch));
        }
        if buffer.is_exhausted() {
            self.state = State::Streaming { buffer, held: None };
            return Ok(None);
        }

        let batch = match self.shape(&buffer) {
            Ok(batch) => batch,
            Err(e) => {
                self.state = State::Streaming { buffer, held: None };
                return Err(e);
            }
        };
        tracing::trace!(shape = %batch.shape(), "batch ready");

        buffer.advance(step);
        match buffer.top_up(&mut self.reader, least) {
            Ok(()) => {
                self.state = State::Streaming { buffer, held: None };
                Ok(Some(batch))
            }
            Err(e) => {
                tracing::debug!(error = %e, "slide interrupted, holding batch");
                self.state = State::Streaming {
                    buffer,
                    held: Some(batch),
                };
                Err(e)
            }
        }
    }

    /// Shape a buffer of exactly `least` records into one batch.
    fn shape(&self, buffer: &Buffer<T>) -> Result<Batch<T>> {
        let WindowSpec { size, stride, .. } = self.window;
        let shift = self.window.shift();
        let records = buffer.view()?;

        let windows = if size == 1 && self.single_step() == 1 {
            records
        } else if size == 1 {
            records.rolling(1, shift, stride)?.squeeze(1)?
        } else {
            strided_view(&records, size, Some(shift), stride)?
        };

        let batch = if self.batch.count == 1 {
            windows
        } else {
            strided_view(&windows, self.batch.count, None, 1)?.get(0)?
        };
        Ok(Batch::from_view(&batch))
    }

    /// Call `get()` `amount` times and collect the results in order.
    ///
    /// With `reset_buffer`, the buffer is dropped first (the reader keeps
    /// its position), so the first batch starts at the next unread record.
    /// Exhaustion does not stop the loop: trailing entries are `None`.
    pub fn read(&mut self, amount: usize, reset_buffer: bool) -> Result<Vec<Option<Batch<T>>>> {
        if reset_buffer {
            self.reset_buffer();
        }
        (0..amount).map(|_| self.get()).collect()
    }

    /// Drop the buffer (and any held batch) and unlock the configuration
    /// without rewinding the reader.
    pub fn reset_buffer(&mut self) {
        self.state = State::Unconfigured;
    }

    /// Drop the buffer, unlock the configuration and rewind the reader.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_buffer();
        self.reader.reset()
    }

    /// Records the source must hold for `reads` consecutive `get()` calls to
    /// all return a batch. Saturates at `usize::MAX`.
    pub fn lines_need(&self, reads: usize) -> usize {
        if reads == 0 {
            return 0;
        }
        (reads - 1)
            .saturating_mul(self.step())
            .saturating_add(self.least())
    }

    /// Number of full batches extractable from `max_lines` records.
    ///
    /// Without an explicit limit the reader's cap is used; an uncapped reader
    /// gives `Ok(None)`.
    pub fn max_reads(&self, max_lines: Option<usize>) -> Result<Option<usize>> {
        let max_lines = match max_lines {
            Some(0) => return Err(Error::InvalidLimit { limit: 0 }),
            Some(n) => n,
            None => match self.reader.max_lines() {
                Some(n) => n,
                None => return Ok(None),
            },
        };
        Ok(Some(match max_lines.checked_sub(self.least()) {
            None => 0,
            Some(rest) => 1 + rest / self.step(),
        }))
    }

    /// Iterate batches until the source is exhausted.
    ///
    /// Iterating again without `reset()` continues where the last iteration stopped.
    pub fn batches(&mut self) -> Batches<'_, T, R> {
        Batches { dataset: self }
    }
}

impl<T, R> std::fmt::Debug for WindowedDataset<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Unconfigured => "unconfigured",
            State::Streaming { held: Some(_), .. } => "holding",
            State::Streaming { buffer, .. } if buffer.exhausted => "exhausted",
            State::Streaming { .. } => "streaming",
        };
        f.debug_struct("WindowedDataset")
            .field("window", &self.window)
            .field("batch", &self.batch)
            .field("state", &state)
            .finish()
    }
}

/// Iterator over the remaining batches of a [`WindowedDataset`].
pub struct Batches<'a, T, R> {
    dataset: &'a mut WindowedDataset<T, R>,
}

impl<T: WithDType, R: Reader<T>> Iterator for Batches<'_, T, R> {
    type Item = Result<Batch<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.dataset.get().transpose()
    }
}

impl<'a, T: WithDType, R: Reader<T>> IntoIterator for &'a mut WindowedDataset<T, R> {
    type Item = Result<Batch<T>>;
    type IntoIter = Batches<'a, T, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches()
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::VecReader;

    /// `n` records of `width` values; record i holds i*10, i*10+1, ...
    fn records(n: usize, width: usize) -> VecReader<i64> {
        VecReader::new(
            (0..n as i64)
                .map(|i| (0..width as i64).map(|c| i * 10 + c).collect())
                .collect(),
        )
    }

    fn first_column(batch: &Batch<i64>) -> Vec<Vec<i64>> {
        batch
            .iter()
            .map(|w| w.iter().map(|r| r.to_vec()[0] / 10).collect())
            .collect()
    }

    #[test]
    fn derived_constants() {
        let mut ds = WindowedDataset::new(records(0, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert_eq!(ds.single_least(), 5);
        assert_eq!(ds.single_step(), 1);
        assert_eq!(ds.least(), 9);
        assert_eq!(ds.step(), 5);

        ds.window(3, Some(2), 2).unwrap().batch(4).unwrap();
        assert_eq!(ds.single_least(), 5);
        assert_eq!(ds.single_step(), 4);
        assert_eq!(ds.least(), 17);
        assert_eq!(ds.step(), 16);
    }

    #[test]
    fn default_config_yields_single_records() {
        let mut ds = WindowedDataset::new(records(3, 2));
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.dims(), &[1, 2]);
        assert_eq!(b.data(), &[0, 1]);
        assert_eq!(ds.get().unwrap().unwrap().data(), &[10, 11]);
    }

    #[test]
    fn first_batch_shape_and_content() {
        let mut ds = WindowedDataset::new(records(23, 5));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.dims(), &[5, 5, 5]);
        assert_eq!(
            first_column(&b),
            (0..5).map(|w| (w..w + 5).collect()).collect::<Vec<Vec<i64>>>()
        );
        assert_eq!(ds.buffered(), Some(9));
    }

    #[test]
    fn buffer_slides_by_step() {
        let mut ds = WindowedDataset::new(records(23, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        ds.get().unwrap();
        let second = ds.get().unwrap().unwrap();
        assert_eq!(second.get(0).unwrap().to_vec(), vec![50, 60, 70, 80, 90]);
    }

    #[test]
    fn iterates_to_exhaustion() {
        let mut ds = WindowedDataset::new(records(23, 5));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        let batches: Vec<_> = ds.batches().collect::<Result<_>>().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(ds.max_reads(Some(23)).unwrap(), Some(3));
        assert!(ds.is_exhausted());
        assert!(ds.get().unwrap().is_none());
        assert!(ds.get().unwrap().is_none());
    }

    #[test]
    fn source_shorter_than_least() {
        let mut ds = WindowedDataset::new(records(8, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert!(ds.get().unwrap().is_none());
        assert!(ds.is_exhausted());
        assert!(ds.is_streaming());
    }

    #[test]
    fn exact_least_gives_one_batch() {
        let mut ds = WindowedDataset::new(records(9, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert!(ds.get().unwrap().is_some());
        assert!(ds.get().unwrap().is_none());
    }

    #[test]
    fn single_window_batches() {
        let mut ds = WindowedDataset::new(records(10, 2));
        ds.window(3, None, 1).unwrap();
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.dims(), &[1, 3, 2]);
        assert_eq!(b.data(), &[0, 1, 10, 11, 20, 21]);
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.data(), &[30, 31, 40, 41, 50, 51]);
    }

    #[test]
    fn single_record_windows() {
        let mut ds = WindowedDataset::new(records(10, 2));
        ds.batch(4).unwrap();
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.dims(), &[4, 2]);
        assert_eq!(b.data(), &[0, 1, 10, 11, 20, 21, 30, 31]);
        assert_eq!(ds.get().unwrap().unwrap().data()[0], 40);
    }

    #[test]
    fn single_record_windows_with_shift() {
        let mut ds = WindowedDataset::new(records(10, 1));
        ds.window(1, Some(3), 1).unwrap().batch(3).unwrap();
        assert_eq!(ds.least(), 7);
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.dims(), &[3, 1]);
        assert_eq!(b.data(), &[0, 30, 60]);
    }

    #[test]
    fn strided_windows() {
        let mut ds = WindowedDataset::new(records(40, 1));
        ds.window(3, Some(1), 2).unwrap().batch(2).unwrap();
        // single_least 5, single_step 2, least 7, step 4
        let b = ds.get().unwrap().unwrap();
        assert_eq!(b.dims(), &[2, 3, 1]);
        assert_eq!(first_column(&b), vec![vec![0, 2, 4], vec![2, 4, 6]]);
        let b = ds.get().unwrap().unwrap();
        assert_eq!(first_column(&b), vec![vec![4, 6, 8], vec![6, 8, 10]]);
    }

    #[test]
    fn gaps_between_batches() {
        // shift larger than size: records between windows are skipped
        let mut ds = WindowedDataset::new(records(30, 1));
        ds.window(2, Some(5), 1).unwrap().batch(2).unwrap();
        assert_eq!(ds.least(), 7);
        assert_eq!(ds.step(), 10);
        let b = ds.get().unwrap().unwrap();
        assert_eq!(first_column(&b), vec![vec![0, 1], vec![5, 6]]);
        let b = ds.get().unwrap().unwrap();
        assert_eq!(first_column(&b), vec![vec![10, 11], vec![15, 16]]);
    }

    #[test]
    fn configuration_locks_after_get() {
        let mut ds = WindowedDataset::new(records(20, 1));
        ds.window(2, None, 1).unwrap().batch(2).unwrap();
        ds.get().unwrap();
        assert!(matches!(
            ds.window(3, None, 1),
            Err(Error::ConfigurationLocked { method: "window" })
        ));
        assert!(matches!(
            ds.batch(3),
            Err(Error::ConfigurationLocked { method: "batch" })
        ));
        ds.reset().unwrap();
        assert!(ds.window(3, None, 1).is_ok());
        assert!(ds.batch(3).is_ok());
    }

    #[test]
    fn lock_holds_after_exhaustion() {
        let mut ds = WindowedDataset::new(records(1, 1));
        ds.batch(2).unwrap();
        assert!(ds.get().unwrap().is_none());
        assert!(ds.batch(1).is_err());
    }

    #[test]
    fn invalid_config_rejected() {
        let mut ds = WindowedDataset::new(records(5, 1));
        assert!(matches!(ds.window(0, None, 1), Err(Error::InvalidConfig(_))));
        assert!(ds.batch(0).is_err());
        assert!(!ds.is_streaming());
    }

    #[test]
    fn reset_replays_same_batches() {
        let mut ds = WindowedDataset::new(records(30, 2));
        ds.window(4, Some(2), 1).unwrap().batch(3).unwrap();
        let first: Vec<_> = ds.batches().collect::<Result<_>>().unwrap();
        ds.reset().unwrap();
        ds.reset().unwrap();
        let second: Vec<_> = ds.batches().collect::<Result<_>>().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn iteration_resumes_without_reset() {
        let mut ds = WindowedDataset::new(records(23, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        let first = ds.batches().next().unwrap().unwrap();
        let rest: Vec<_> = (&mut ds).into_iter().collect::<Result<_>>().unwrap();
        assert_eq!(rest.len(), 2);
        assert_ne!(rest[0], first);
        assert_eq!(ds.batches().count(), 0);
    }

    #[test]
    fn read_keeps_trailing_none() {
        let mut ds = WindowedDataset::new(records(23, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        let out = ds.read(5, false).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out.iter().filter(|b| b.is_some()).count(), 3);
        assert!(out[3].is_none() && out[4].is_none());
    }

    #[test]
    fn read_with_buffer_reset_keeps_reader_position() {
        let mut ds = WindowedDataset::new(records(20, 1));
        ds.window(2, None, 1).unwrap();
        let a = ds.read(1, false).unwrap();
        assert_eq!(a[0].as_ref().unwrap().data(), &[0, 10]);
        // the reader already pulled records 0..4; a fresh buffer starts at 4
        let b = ds.read(1, true).unwrap();
        assert_eq!(b[0].as_ref().unwrap().data(), &[40, 50]);
    }

    #[test]
    fn lines_need_formula() {
        let mut ds = WindowedDataset::new(records(0, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert_eq!(ds.lines_need(0), 0);
        assert_eq!(ds.lines_need(1), 9);
        assert_eq!(ds.lines_need(3), 19);
    }

    #[test]
    fn max_reads_boundaries() {
        let mut ds = WindowedDataset::new(records(0, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        let (least, step) = (ds.least(), ds.step());
        assert_eq!(ds.max_reads(Some(least - 1)).unwrap(), Some(0));
        assert_eq!(ds.max_reads(Some(least)).unwrap(), Some(1));
        assert_eq!(ds.max_reads(Some(least + step - 1)).unwrap(), Some(1));
        assert_eq!(ds.max_reads(Some(least + step)).unwrap(), Some(2));
        assert!(matches!(
            ds.max_reads(Some(0)),
            Err(Error::InvalidLimit { limit: 0 })
        ));
    }

    #[test]
    fn max_reads_uses_reader_cap() {
        let mut ds = WindowedDataset::new(records(100, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert_eq!(ds.max_reads(None).unwrap(), None);
        ds.reader_mut().set_max_lines(Some(19));
        assert_eq!(ds.max_reads(None).unwrap(), Some(3));
        assert_eq!(ds.batches().count(), 3);
    }

    #[test]
    fn record_width_change_is_an_error() {
        let reader = VecReader::new(vec![vec![1i64, 2], vec![3]]);
        let mut ds = WindowedDataset::new(reader);
        ds.batch(2).unwrap();
        assert!(ds.get().is_err());
    }

    /// Fails once when asked for record `fail_at`, without consuming it.
    struct FlakyReader {
        inner: VecReader<i64>,
        fail_at: usize,
        failed: bool,
    }

    impl FlakyReader {
        fn new(n: usize, fail_at: usize) -> Self {
            Self {
                inner: records(n, 1),
                fail_at,
                failed: false,
            }
        }
    }

    impl Reader<i64> for FlakyReader {
        fn readline(&mut self) -> Result<Option<Vec<i64>>> {
            if !self.failed && self.inner.lines() == self.fail_at {
                self.failed = true;
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "transient",
                )));
            }
            self.inner.readline()
        }

        fn reset(&mut self) -> Result<()> {
            self.inner.reset()
        }

        fn lines(&self) -> usize {
            self.inner.lines()
        }
    }

    fn batch_starts(batches: &[Batch<i64>]) -> Vec<i64> {
        batches.iter().map(|b| first_column(b)[0][0]).collect()
    }

    #[test]
    fn reader_error_during_slide_holds_batch() {
        let mut ds = WindowedDataset::new(FlakyReader::new(40, 11));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert!(matches!(ds.get(), Err(Error::Io(_))));
        assert!(!ds.is_exhausted());

        let batches: Vec<_> = ds.batches().collect::<Result<_>>().unwrap();
        assert_eq!(Some(batches.len()), ds.max_reads(Some(40)).unwrap());
        assert_eq!(batch_starts(&batches), vec![0, 5, 10, 15, 20, 25, 30]);
        assert!(ds.is_exhausted());
    }

    #[test]
    fn reader_error_during_fill_resumes() {
        let mut ds = WindowedDataset::new(FlakyReader::new(40, 3));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert!(ds.get().is_err());
        assert!(ds.is_streaming());
        assert_eq!(ds.buffered(), Some(3));

        let batches: Vec<_> = ds.batches().collect::<Result<_>>().unwrap();
        assert_eq!(batch_starts(&batches), vec![0, 5, 10, 15, 20, 25, 30]);
    }

    #[test]
    fn reader_error_with_gaps_keeps_alignment() {
        // step 10 exceeds least 7; the failure lands inside the skipped records
        let mut ds = WindowedDataset::new(FlakyReader::new(30, 8));
        ds.window(2, Some(5), 1).unwrap().batch(2).unwrap();
        assert!(ds.get().is_err());
        let batches: Vec<_> = ds.batches().collect::<Result<_>>().unwrap();
        assert_eq!(batch_starts(&batches), vec![0, 10, 20]);
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn oversized_configuration_rejected() {
        let mut ds = WindowedDataset::new(records(0, 1));
        assert!(matches!(
            ds.window(usize::MAX / 2 + 2, None, 2),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(ds.least(), 1);

        ds.window(1000, Some(1), 1).unwrap();
        assert!(matches!(ds.batch(usize::MAX), Err(Error::InvalidConfig(_))));
        assert_eq!(ds.least(), 1000);
        assert_eq!(ds.step(), 1);
    }

    #[test]
    fn lines_need_saturates() {
        let mut ds = WindowedDataset::new(records(0, 1));
        ds.window(5, Some(1), 1).unwrap().batch(5).unwrap();
        assert_eq!(ds.lines_need(usize::MAX), usize::MAX);
        assert_eq!(ds.max_reads(Some(usize::MAX)).unwrap(), Some((usize::MAX - 9) / 5 + 1));
    }

    #[test]
    fn with_config_applies_settings() {
        let config = DatasetConfig::from_json_str(
            r#"{ "window": { "size": 5, "shift": 1 }, "batch": { "count": 5 } }"#,
        )
        .unwrap();
        let ds = WindowedDataset::with_config(records(0, 1), &config).unwrap();
        assert_eq!(ds.least(), 9);
        assert_eq!(ds.step(), 5);
    }
}
