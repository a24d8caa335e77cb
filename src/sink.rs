//! Entry sinks: the per-entry consumers the body parser writes into.
//!
//! The parser hands every entry to an [`EntrySink`] as 0-based `u64`
//! coordinates plus a value. Concrete sinks write triplet slices, dense
//! arrays, sparse-vector doublets, or growable vectors; adapter sinks
//! wrap another sink to bridge pattern and complex field mismatches.
//!
//! Parallel parsing never locks: the orchestrator calls [`EntrySink::carve`]
//! in input order, splitting off a writer for the next block of output
//! slots, so concurrent writers are disjoint by construction.

use std::marker::PhantomData;

use crate::error::{MarketError, Result};
use crate::index::MarketIndex;
use crate::value::{Complex, MarketValue, Placeholder};

/// Element layout of dense storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageOrder {
    #[default]
    RowMajor,
    ColMajor,
}

/// What a sink can tolerate; the read dispatcher picks sequential or
/// parallel execution from these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkCaps {
    /// Carved sinks may run on worker threads.
    pub parallel_ok: bool,
    /// Writes are addressed by coordinate, not appended in input order.
    /// Coordinate bodies may repeat a coordinate, so dense sinks only
    /// parse in parallel for array bodies.
    pub dense: bool,
    /// Output length is unknown in advance; forces sequential parsing.
    pub appending: bool,
}

pub trait EntrySink: Send {
    type Value: MarketValue;

    fn caps(&self) -> SinkCaps;

    /// Consume one entry. Coordinates are 0-based.
    fn handle(&mut self, row: u64, col: u64, value: Self::Value) -> Result<()>;

    /// Split off a sink covering the next `entries` output slots. Only
    /// called when `caps().parallel_ok` is true.
    fn carve(&mut self, entries: u64) -> Result<Self>
    where
        Self: Sized;
}

fn coord<I: MarketIndex>(value: u64, what: &str) -> Result<I> {
    I::from_coord(value)
        .ok_or_else(|| MarketError::out_of_range(format!("{what} does not fit the index type")))
}

fn overfull() -> MarketError {
    MarketError::invalid("more entries than the header declares")
}

/// Write cursor over a caller-owned slice. Carving splits the front off,
/// so two cursors never alias.
#[derive(Debug, Default)]
struct Cursor<'a, T> {
    buf: &'a mut [T],
    pos: usize,
}

impl<'a, T> Cursor<'a, T> {
    fn new(buf: &'a mut [T]) -> Self {
        Cursor { buf, pos: 0 }
    }

    fn push(&mut self, value: T) -> Result<()> {
        match self.buf.get_mut(self.pos) {
            Some(slot) => {
                *slot = value;
                self.pos += 1;
                Ok(())
            }
            None => Err(overfull()),
        }
    }

    fn carve(&mut self, len: u64) -> Result<Self> {
        let len = usize::try_from(len).map_err(|_| overfull())?;
        let remaining = std::mem::take(&mut self.buf);
        if len > remaining.len() {
            self.buf = remaining;
            return Err(overfull());
        }
        let (head, tail) = remaining.split_at_mut(len);
        self.buf = tail;
        Ok(Cursor { buf: head, pos: 0 })
    }
}

/// Coordinate-format sink writing rows, columns, and values into three
/// parallel slices sized to the generalized entry count.
pub struct TripletSink<'a, I, V> {
    rows: Cursor<'a, I>,
    cols: Cursor<'a, I>,
    values: Cursor<'a, V>,
}

impl<'a, I, V> TripletSink<'a, I, V> {
    pub fn new(rows: &'a mut [I], cols: &'a mut [I], values: &'a mut [V]) -> Self {
        TripletSink {
            rows: Cursor::new(rows),
            cols: Cursor::new(cols),
            values: Cursor::new(values),
        }
    }
}

impl<I: MarketIndex, V: MarketValue> EntrySink for TripletSink<'_, I, V> {
    type Value = V;

    fn caps(&self) -> SinkCaps {
        SinkCaps { parallel_ok: true, ..SinkCaps::default() }
    }

    fn handle(&mut self, row: u64, col: u64, value: V) -> Result<()> {
        self.rows.push(coord(row, "row index")?)?;
        self.cols.push(coord(col, "column index")?)?;
        self.values.push(value)
    }

    fn carve(&mut self, entries: u64) -> Result<Self> {
        Ok(TripletSink {
            rows: self.rows.carve(entries)?,
            cols: self.cols.carve(entries)?,
            values: self.values.carve(entries)?,
        })
    }
}

/// Coordinate sink that keeps only the structure: rows and columns, no
/// values. Works against files of any field.
pub struct PatternTripletSink<'a, I> {
    rows: Cursor<'a, I>,
    cols: Cursor<'a, I>,
}

impl<'a, I> PatternTripletSink<'a, I> {
    pub fn new(rows: &'a mut [I], cols: &'a mut [I]) -> Self {
        PatternTripletSink { rows: Cursor::new(rows), cols: Cursor::new(cols) }
    }
}

impl<I: MarketIndex> EntrySink for PatternTripletSink<'_, I> {
    type Value = Placeholder;

    fn caps(&self) -> SinkCaps {
        SinkCaps { parallel_ok: true, ..SinkCaps::default() }
    }

    fn handle(&mut self, row: u64, col: u64, _value: Placeholder) -> Result<()> {
        self.rows.push(coord(row, "row index")?)?;
        self.cols.push(coord(col, "column index")?)
    }

    fn carve(&mut self, entries: u64) -> Result<Self> {
        Ok(PatternTripletSink {
            rows: self.rows.carve(entries)?,
            cols: self.cols.carve(entries)?,
        })
    }
}

/// Sparse-vector sink: index and value slices.
pub struct DoubletSink<'a, I, V> {
    indices: Cursor<'a, I>,
    values: Cursor<'a, V>,
}

impl<'a, I, V> DoubletSink<'a, I, V> {
    pub fn new(indices: &'a mut [I], values: &'a mut [V]) -> Self {
        DoubletSink { indices: Cursor::new(indices), values: Cursor::new(values) }
    }
}

impl<I: MarketIndex, V: MarketValue> EntrySink for DoubletSink<'_, I, V> {
    type Value = V;

    fn caps(&self) -> SinkCaps {
        SinkCaps { parallel_ok: true, ..SinkCaps::default() }
    }

    fn handle(&mut self, row: u64, col: u64, value: V) -> Result<()> {
        // Vector bodies put the index in the row slot; matrices read
        // through a doublet keep whichever coordinate varies.
        self.indices.push(coord(row.max(col), "index")?)?;
        self.values.push(value)
    }

    fn carve(&mut self, entries: u64) -> Result<Self> {
        Ok(DoubletSink {
            indices: self.indices.carve(entries)?,
            values: self.values.carve(entries)?,
        })
    }
}

/// A length-checked raw view over a mutable slice, cloneable into worker
/// tasks. Concurrent holders must write disjoint indices: array bodies
/// guarantee this because each body line maps to a distinct element, and
/// coordinate bodies never reach dense sinks in parallel.
struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _lifetime: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for SharedSlice<'_, T> {}

impl<T> Clone for SharedSlice<'_, T> {
    fn clone(&self) -> Self {
        SharedSlice { ptr: self.ptr, len: self.len, _lifetime: PhantomData }
    }
}

impl<'a, T> SharedSlice<'a, T> {
    fn new(slice: &'a mut [T]) -> Self {
        SharedSlice { ptr: slice.as_mut_ptr(), len: slice.len(), _lifetime: PhantomData }
    }

    fn write(&mut self, index: usize, value: T) -> Result<()> {
        if index >= self.len {
            return Err(MarketError::invalid("entry outside the declared dimensions"));
        }
        // SAFETY: index is in bounds, and concurrent holders write
        // disjoint indices (see the type docs).
        unsafe { self.ptr.add(index).write(value) };
        Ok(())
    }
}

/// Dense sink: each entry lands at its offset in a `nrows * ncols`
/// element slice. Writes overwrite, so duplicate coordinates keep the
/// last value in input order under sequential parsing.
pub struct DenseSink<'a, V> {
    values: SharedSlice<'a, V>,
    order: StorageOrder,
    nrows: u64,
    ncols: u64,
}

impl<'a, V> DenseSink<'a, V> {
    pub fn new(values: &'a mut [V], order: StorageOrder, nrows: u64, ncols: u64) -> Self {
        DenseSink { values: SharedSlice::new(values), order, nrows, ncols }
    }
}

impl<V: MarketValue> EntrySink for DenseSink<'_, V> {
    type Value = V;

    fn caps(&self) -> SinkCaps {
        SinkCaps { parallel_ok: true, dense: true, appending: false }
    }

    fn handle(&mut self, row: u64, col: u64, value: V) -> Result<()> {
        let offset = match self.order {
            StorageOrder::RowMajor => row * self.ncols + col,
            StorageOrder::ColMajor => col * self.nrows + row,
        };
        let offset =
            usize::try_from(offset).map_err(|_| MarketError::out_of_range("element offset overflow"))?;
        self.values.write(offset, value)
    }

    fn carve(&mut self, _entries: u64) -> Result<Self> {
        // Dense writes are coordinate-addressed; the offset is implicit.
        Ok(DenseSink {
            values: self.values.clone(),
            order: self.order,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }
}

/// Growable triplet sink. Appending makes the output length unknown in
/// advance, which keeps parsing sequential, but buys generalized
/// symmetry without duplicated diagonal entries.
pub struct AppendingTripletSink<'a, I, V> {
    rows: &'a mut Vec<I>,
    cols: &'a mut Vec<I>,
    values: &'a mut Vec<V>,
}

impl<'a, I, V> AppendingTripletSink<'a, I, V> {
    pub fn new(rows: &'a mut Vec<I>, cols: &'a mut Vec<I>, values: &'a mut Vec<V>) -> Self {
        AppendingTripletSink { rows, cols, values }
    }
}

impl<I: MarketIndex, V: MarketValue> EntrySink for AppendingTripletSink<'_, I, V> {
    type Value = V;

    fn caps(&self) -> SinkCaps {
        SinkCaps { parallel_ok: false, dense: false, appending: true }
    }

    fn handle(&mut self, row: u64, col: u64, value: V) -> Result<()> {
        self.rows.push(coord(row, "row index")?);
        self.cols.push(coord(col, "column index")?);
        self.values.push(value);
        Ok(())
    }

    fn carve(&mut self, _entries: u64) -> Result<Self> {
        Err(MarketError::Unsupported("appending sinks cannot be carved".into()))
    }
}

/// Substitutes a fill value for the value column pattern files lack.
pub struct PatternAdapter<S: EntrySink> {
    inner: S,
    fill: S::Value,
}

impl<S: EntrySink> PatternAdapter<S> {
    pub fn new(inner: S, fill: S::Value) -> Self {
        PatternAdapter { inner, fill }
    }
}

impl<S: EntrySink> EntrySink for PatternAdapter<S> {
    type Value = Placeholder;

    fn caps(&self) -> SinkCaps {
        self.inner.caps()
    }

    fn handle(&mut self, row: u64, col: u64, _value: Placeholder) -> Result<()> {
        self.inner.handle(row, col, self.fill)
    }

    fn carve(&mut self, entries: u64) -> Result<Self> {
        Ok(PatternAdapter { inner: self.inner.carve(entries)?, fill: self.fill })
    }
}

/// Parses the scalar values of a real or integer file into a complex
/// sink, zeroing the imaginary part.
pub struct ComplexAdapter<S> {
    inner: S,
}

impl<S> ComplexAdapter<S> {
    pub fn new(inner: S) -> Self {
        ComplexAdapter { inner }
    }
}

impl<T, S> EntrySink for ComplexAdapter<S>
where
    T: MarketValue,
    S: EntrySink<Value = Complex<T>>,
{
    type Value = T;

    fn caps(&self) -> SinkCaps {
        self.inner.caps()
    }

    fn handle(&mut self, row: u64, col: u64, value: T) -> Result<()> {
        self.inner.handle(row, col, Complex::new(value, T::zero()))
    }

    fn carve(&mut self, entries: u64) -> Result<Self> {
        Ok(ComplexAdapter { inner: self.inner.carve(entries)? })
    }
}
