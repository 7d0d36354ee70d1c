// CsvReader — stream records from a delimited text source
//
// Lines are read one at a time from any `BufRead + Seek` source, so only the
// current line is ever held in memory. Each line is split on the configured
// splitter, the selected columns are parsed into `T`, and the attached
// normalizers are applied positionally to the output columns.
//
// Rows that fail to parse are skipped in a loop until a row parses or the
// source ends. Skipped rows do not count towards `lines()` or the
// `max_lines` cap.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::Path;

use rollwin_core::{Error, Result, WithDType};

use crate::config::CsvConfig;
use crate::normalizer::{Normalizer, Normalizers};
use crate::reader::{Reader, Record};

/// A [`Reader`] over delimited numeric text.
///
/// # Example
/// ```ignore
/// // Keep columns 2..=6 of a CSV with a header row
/// let reader = CsvReader::<f64>::open("data/stock.csv", CsvConfig::default()
///     .has_header(true)
///     .indexes(vec![2, 3, 4, 5, 6]))?;
/// ```
pub struct CsvReader<T, R = BufReader<File>> {
    source: R,
    config: CsvConfig,
    /// Sorted, deduplicated copy of `config.indexes`.
    indexes: Vec<usize>,
    normalizers: Normalizers,
    lines: usize,
    /// Physical line number of the last line read, for diagnostics.
    source_line: usize,
    line_buf: String,
    _dtype: PhantomData<T>,
}

impl<T: WithDType> CsvReader<T> {
    /// Open a file on disk.
    pub fn open<P: AsRef<Path>>(path: P, config: CsvConfig) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::msg(format!(
                "CsvReader: failed to open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<T: WithDType, R: BufRead + Seek> CsvReader<T, R> {
    /// Read from any seekable buffered source (e.g. `io::Cursor`).
    pub fn from_reader(source: R, config: CsvConfig) -> Result<Self> {
        config.validate()?;
        let mut indexes = config.indexes.clone();
        indexes.sort_unstable();
        indexes.dedup();

        let mut reader = Self {
            source,
            config,
            indexes,
            normalizers: Normalizers::default(),
            lines: 0,
            source_line: 0,
            line_buf: String::new(),
            _dtype: PhantomData,
        };
        reader.skip_header()?;
        Ok(reader)
    }

    /// Attach one normalizer per selected column, in output order.
    ///
    /// Fails with [`Error::NormalizerMismatch`] when the count differs from
    /// the number of selected columns (an empty selection has zero columns),
    /// and with [`Error::InvalidConfig`] when `T` is an integer type, which
    /// cannot hold normalized values.
    pub fn with_normalizers(mut self, normalizers: Vec<Box<dyn Normalizer>>) -> Result<Self> {
        if !normalizers.is_empty() && !T::DTYPE.is_float() {
            return Err(Error::config(format!(
                "CsvReader: normalizers need a float element type, got {}",
                T::DTYPE
            )));
        }
        if normalizers.len() != self.indexes.len() {
            return Err(Error::NormalizerMismatch {
                normalizers: normalizers.len(),
                columns: self.indexes.len(),
            });
        }
        self.normalizers = Normalizers::new(normalizers);
        Ok(self)
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    pub fn normalizers(&self) -> &Normalizers {
        &self.normalizers
    }

    /// Selected source columns, in the order they are emitted.
    pub fn selected_columns(&self) -> &[usize] {
        &self.indexes
    }

    fn skip_header(&mut self) -> Result<()> {
        if self.config.has_header {
            self.line_buf.clear();
            self.source.read_line(&mut self.line_buf)?;
            self.source_line += 1;
        }
        Ok(())
    }
}

impl<T, R> std::fmt::Debug for CsvReader<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvReader")
            .field("config", &self.config)
            .field("indexes", &self.indexes)
            .field("normalizers", &self.normalizers)
            .field("lines", &self.lines)
            .finish()
    }
}

/// Parse the selected cells of one line. `None` if any selected cell is
/// missing or does not parse as `T`.
fn parse_line<T: WithDType>(line: &str, splitter: &str, indexes: &[usize]) -> Option<Record<T>> {
    if indexes.is_empty() {
        return line.split(splitter).map(T::parse).collect();
    }
    let record: Record<T> = line
        .split(splitter)
        .enumerate()
        .filter(|(i, _)| indexes.binary_search(i).is_ok())
        .map(|(_, cell)| T::parse(cell))
        .collect::<Option<_>>()?;
    (record.len() == indexes.len()).then_some(record)
}

impl<T: WithDType, R: BufRead + Seek> Reader<T> for CsvReader<T, R> {
    fn readline(&mut self) -> Result<Option<Record<T>>> {
        loop {
            if self.config.max_lines.is_some_and(|cap| self.lines >= cap) {
                return Ok(None);
            }

            self.line_buf.clear();
            if self.source.read_line(&mut self.line_buf)? == 0 {
                return Ok(None);
            }
            self.source_line += 1;

            let line = self.line_buf.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            match parse_line::<T>(line, &self.config.splitter, &self.indexes) {
                Some(mut record) => {
                    self.normalizers.normalize_record(&mut record);
                    self.lines += 1;
                    return Ok(Some(record));
                }
                None => {
                    tracing::debug!(line = self.source_line, "skipping malformed row");
                }
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.source.seek(SeekFrom::Start(0))?;
        self.lines = 0;
        self.source_line = 0;
        self.skip_header()
    }

    fn lines(&self) -> usize {
        self.lines
    }

    fn max_lines(&self) -> Option<usize> {
        self.config.max_lines
    }

    fn set_max_lines(&mut self, max_lines: Option<usize>) {
        self.config.max_lines = max_lines;
    }
}

// Tests
