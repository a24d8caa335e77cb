//! Chunk sources: cursors over in-memory matrices that hand out
//! self-contained rendering jobs, one block of body text each.
//!
//! [`ChunkSource::next_chunk`] advances the cursor and returns a
//! [`FormatJob`]; rendering the job is pure and can run off-thread, which
//! is what the parallel writer exploits. `None` means exhausted.

use std::fmt::Write as _;

use crate::error::{MarketError, Result};
use crate::index::MarketIndex;
use crate::options::WriteOptions;
use crate::sink::StorageOrder;
use crate::value::MarketValue;

/// A block of entries that knows how to render itself as body text.
pub trait FormatJob {
    fn render(self) -> String;
}

pub trait ChunkSource {
    type Job: FormatJob + Send;

    /// The next block of entries, or `None` when the source is exhausted.
    fn next_chunk(&mut self, options: &WriteOptions) -> Option<Self::Job>;
}

fn chunk_len(options: &WriteOptions) -> usize {
    options.chunk_size_values.max(1)
}

/// Streams (row, col, value) triplets as coordinate lines. An empty
/// value slice renders pattern lines, coordinates only.
pub struct TripletSource<'a, I, V> {
    rows: &'a [I],
    cols: &'a [I],
    values: &'a [V],
    pos: usize,
    precision: Option<usize>,
}

impl<'a, I, V> TripletSource<'a, I, V> {
    pub fn new(
        rows: &'a [I],
        cols: &'a [I],
        values: &'a [V],
        options: &WriteOptions,
    ) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(MarketError::Unsupported(
                "row and column slices must have equal length".into(),
            ));
        }
        if !values.is_empty() && values.len() != rows.len() {
            return Err(MarketError::Unsupported(
                "value slice must be empty or match the coordinate length".into(),
            ));
        }
        Ok(TripletSource { rows, cols, values, pos: 0, precision: options.precision })
    }
}

impl<'a, I: MarketIndex, V: MarketValue> ChunkSource for TripletSource<'a, I, V> {
    type Job = TripletJob<'a, I, V>;

    fn next_chunk(&mut self, options: &WriteOptions) -> Option<Self::Job> {
        if self.pos >= self.rows.len() {
            return None;
        }
        let (rows, cols, values): (&'a [I], &'a [I], &'a [V]) =
            (self.rows, self.cols, self.values);
        let end = (self.pos + chunk_len(options)).min(rows.len());
        let range = self.pos..end;
        self.pos = end;
        Some(TripletJob {
            rows: &rows[range.clone()],
            cols: &cols[range.clone()],
            values: if values.is_empty() { &[] } else { &values[range] },
            precision: self.precision,
        })
    }
}

pub struct TripletJob<'a, I, V> {
    rows: &'a [I],
    cols: &'a [I],
    values: &'a [V],
    precision: Option<usize>,
}

impl<I: MarketIndex, V: MarketValue> FormatJob for TripletJob<'_, I, V> {
    fn render(self) -> String {
        let mut out = String::with_capacity(self.rows.len() * 16);
        for i in 0..self.rows.len() {
            let _ = write!(
                out,
                "{} {}",
                self.rows[i].as_coord() + 1,
                self.cols[i].as_coord() + 1
            );
            if let Some(value) = self.values.get(i) {
                out.push(' ');
                value.format_into(&mut out, self.precision);
            }
            out.push('\n');
        }
        out
    }
}

/// Streams a sparse vector as (index, value) coordinate lines.
pub struct DoubletSource<'a, I, V> {
    indices: &'a [I],
    values: &'a [V],
    pos: usize,
    precision: Option<usize>,
}

impl<'a, I, V> DoubletSource<'a, I, V> {
    pub fn new(indices: &'a [I], values: &'a [V], options: &WriteOptions) -> Result<Self> {
        if !values.is_empty() && values.len() != indices.len() {
            return Err(MarketError::Unsupported(
                "value slice must be empty or match the index length".into(),
            ));
        }
        Ok(DoubletSource { indices, values, pos: 0, precision: options.precision })
    }
}

impl<'a, I: MarketIndex, V: MarketValue> ChunkSource for DoubletSource<'a, I, V> {
    type Job = DoubletJob<'a, I, V>;

    fn next_chunk(&mut self, options: &WriteOptions) -> Option<Self::Job> {
        if self.pos >= self.indices.len() {
            return None;
        }
        let (indices, values): (&'a [I], &'a [V]) = (self.indices, self.values);
        let end = (self.pos + chunk_len(options)).min(indices.len());
        let range = self.pos..end;
        self.pos = end;
        Some(DoubletJob {
            indices: &indices[range.clone()],
            values: if values.is_empty() { &[] } else { &values[range] },
            precision: self.precision,
        })
    }
}

pub struct DoubletJob<'a, I, V> {
    indices: &'a [I],
    values: &'a [V],
    precision: Option<usize>,
}

impl<I: MarketIndex, V: MarketValue> FormatJob for DoubletJob<'_, I, V> {
    fn render(self) -> String {
        let mut out = String::with_capacity(self.indices.len() * 12);
        for i in 0..self.indices.len() {
            let _ = write!(out, "{}", self.indices[i].as_coord() + 1);
            if let Some(value) = self.values.get(i) {
                out.push(' ');
                value.format_into(&mut out, self.precision);
            }
            out.push('\n');
        }
        out
    }
}

/// Streams a dense array as one value per line in file order, which is
/// column-major: the row index varies fastest. One column per chunk.
pub struct ArraySource<'a, V> {
    values: &'a [V],
    order: StorageOrder,
    nrows: u64,
    ncols: u64,
    col: u64,
    precision: Option<usize>,
}

impl<'a, V> ArraySource<'a, V> {
    pub fn new(
        values: &'a [V],
        order: StorageOrder,
        nrows: u64,
        ncols: u64,
        options: &WriteOptions,
    ) -> Result<Self> {
        if values.len() as u64 != nrows * ncols {
            return Err(MarketError::Unsupported(
                "array length does not match the matrix dimensions".into(),
            ));
        }
        Ok(ArraySource { values, order, nrows, ncols, col: 0, precision: options.precision })
    }
}

impl<'a, V: MarketValue> ChunkSource for ArraySource<'a, V> {
    type Job = ArrayJob<'a, V>;

    fn next_chunk(&mut self, _options: &WriteOptions) -> Option<Self::Job> {
        if self.col >= self.ncols {
            return None;
        }
        let col = self.col;
        self.col += 1;
        Some(ArrayJob {
            values: self.values,
            order: self.order,
            nrows: self.nrows,
            ncols: self.ncols,
            col,
            precision: self.precision,
        })
    }
}

pub struct ArrayJob<'a, V> {
    values: &'a [V],
    order: StorageOrder,
    nrows: u64,
    ncols: u64,
    col: u64,
    precision: Option<usize>,
}

impl<V: MarketValue> FormatJob for ArrayJob<'_, V> {
    fn render(self) -> String {
        let mut out = String::with_capacity(self.nrows as usize * 12);
        for row in 0..self.nrows {
            let offset = match self.order {
                StorageOrder::RowMajor => row * self.ncols + self.col,
                StorageOrder::ColMajor => self.col * self.nrows + row,
            };
            if let Some(value) = self.values.get(offset as usize) {
                value.format_into(&mut out, self.precision);
                out.push('\n');
            }
        }
        out
    }
}

/// Streams a compressed-sparse-column matrix directly as coordinate
/// lines, whole columns per chunk, without materializing triplets.
/// `transpose` swaps the emitted coordinates, which turns CSR input into
/// the same wire format.
pub struct CscSource<'a, P, I, V> {
    col_ptr: &'a [P],
    row_idx: &'a [I],
    values: &'a [V],
    transpose: bool,
    col: usize,
    precision: Option<usize>,
}

impl<'a, P: MarketIndex, I, V> CscSource<'a, P, I, V> {
    pub fn new(
        col_ptr: &'a [P],
        row_idx: &'a [I],
        values: &'a [V],
        transpose: bool,
        options: &WriteOptions,
    ) -> Result<Self> {
        if col_ptr.is_empty() {
            return Err(MarketError::Unsupported(
                "column pointer slice must hold at least one entry".into(),
            ));
        }
        if !values.is_empty() && values.len() != row_idx.len() {
            return Err(MarketError::Unsupported(
                "value slice must be empty or match the row index length".into(),
            ));
        }
        // Monotone pointers ending at the entry count keep rendering
        // in-bounds without per-entry checks.
        let mut prev = 0u64;
        for p in col_ptr {
            let p = p.as_coord();
            if p < prev {
                return Err(MarketError::Unsupported(
                    "column pointers must be non-decreasing".into(),
                ));
            }
            prev = p;
        }
        if prev != row_idx.len() as u64 {
            return Err(MarketError::Unsupported(
                "last column pointer must equal the row index length".into(),
            ));
        }
        Ok(CscSource { col_ptr, row_idx, values, transpose, col: 0, precision: options.precision })
    }
}

impl<'a, P: MarketIndex, I: MarketIndex, V: MarketValue> ChunkSource for CscSource<'a, P, I, V> {
    type Job = CscJob<'a, P, I, V>;

    fn next_chunk(&mut self, options: &WriteOptions) -> Option<Self::Job> {
        let ncols = self.col_ptr.len() - 1;
        if self.col >= ncols {
            return None;
        }
        // Batch enough columns to approximate chunk_size_values entries.
        let col_ptr: &'a [P] = self.col_ptr;
        let per_column = (self.row_idx.len() / ncols.max(1)).max(1);
        let take = (chunk_len(options) / per_column + 1).min(ncols - self.col);
        let start = self.col;
        self.col += take;
        Some(CscJob {
            col_ptr: &col_ptr[start..=start + take],
            row_idx: self.row_idx,
            values: self.values,
            first_col: start as u64,
            transpose: self.transpose,
            precision: self.precision,
        })
    }
}

pub struct CscJob<'a, P, I, V> {
    /// Pointer window: entry k of the job's column c spans
    /// `col_ptr[c]..col_ptr[c + 1]`.
    col_ptr: &'a [P],
    row_idx: &'a [I],
    values: &'a [V],
    first_col: u64,
    transpose: bool,
    precision: Option<usize>,
}

impl<P: MarketIndex, I: MarketIndex, V: MarketValue> FormatJob for CscJob<'_, P, I, V> {
    fn render(self) -> String {
        let mut out = String::new();
        for c in 0..self.col_ptr.len() - 1 {
            let start = self.col_ptr[c].as_coord() as usize;
            let end = self.col_ptr[c + 1].as_coord() as usize;
            let col = self.first_col + c as u64;
            for k in start..end.min(self.row_idx.len()) {
                let row = self.row_idx[k].as_coord();
                let (a, b) = if self.transpose { (col, row) } else { (row, col) };
                let _ = write!(out, "{} {}", a + 1, b + 1);
                if let Some(value) = self.values.get(k) {
                    out.push(' ');
                    value.format_into(&mut out, self.precision);
                }
                out.push('\n');
            }
        }
        out
    }
}
