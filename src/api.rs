//! Convenience entry points for common in-memory layouts: triplet,
//! doublet, dense array, and CSC, each a thin header-plus-body wrapper
//! around the sink and source machinery.

use std::io::{BufRead, Write};

use crate::error::{MarketError, Result};
use crate::header::{write_header, Field, Format, Header, Object, Symmetry, read_header};
use crate::index::MarketIndex;
use crate::options::{ReadOptions, WriteOptions};
use crate::read::read_body;
use crate::sink::{
    AppendingTripletSink, DenseSink, DoubletSink, PatternTripletSink, StorageOrder, TripletSink,
};
use crate::source::{ArraySource, CscSource, DoubletSource, TripletSource};
use crate::value::{MarketValue, Placeholder};
use crate::write::write_body;

fn storage_len(n: u64) -> Result<usize> {
    usize::try_from(n)
        .map_err(|_| MarketError::out_of_range("declared entry count overflows memory addressing"))
}

/// Generalized reads report general symmetry: the companion entries are
/// materialized in the output, so the symmetry is no longer implicit.
fn finish_header(header: &mut Header, options: &ReadOptions) {
    if options.generalize_symmetry {
        header.symmetry = Symmetry::General;
    }
}

/// Read a coordinate file into parallel row/column/value vectors, resized
/// to the (generalized) entry count. Pattern files fill values with one.
pub fn read_triplet<R: BufRead, I: MarketIndex, V: MarketValue>(
    reader: &mut R,
    rows: &mut Vec<I>,
    cols: &mut Vec<I>,
    values: &mut Vec<V>,
    options: &ReadOptions,
) -> Result<Header> {
    let mut header = read_header(reader)?;
    let storage = storage_len(header.storage_nnz(options.generalize_symmetry))?;
    rows.clear();
    rows.resize(storage, I::default());
    cols.clear();
    cols.resize(storage, I::default());
    values.clear();
    values.resize(storage, V::zero());

    let sink = TripletSink::new(rows, cols, values);
    read_body(reader, &header, sink, V::pattern_default(), options)?;
    finish_header(&mut header, options);
    Ok(header)
}

/// Like [`read_triplet`], but appends into the vectors instead of
/// pre-sizing them. Always sequential; generalized diagonals appear once,
/// so a symmetric body with k off-diagonal and d diagonal entries yields
/// 2k + d triplets.
pub fn read_triplet_appending<R: BufRead, I: MarketIndex, V: MarketValue>(
    reader: &mut R,
    rows: &mut Vec<I>,
    cols: &mut Vec<I>,
    values: &mut Vec<V>,
    options: &ReadOptions,
) -> Result<Header> {
    let mut header = read_header(reader)?;
    let storage = storage_len(header.storage_nnz(options.generalize_symmetry))?;
    rows.reserve(storage);
    cols.reserve(storage);
    values.reserve(storage);

    let sink = AppendingTripletSink::new(rows, cols, values);
    read_body(reader, &header, sink, V::pattern_default(), options)?;
    finish_header(&mut header, options);
    Ok(header)
}

/// Read only the structure of a coordinate file, whatever its field.
pub fn read_pattern<R: BufRead, I: MarketIndex>(
    reader: &mut R,
    rows: &mut Vec<I>,
    cols: &mut Vec<I>,
    options: &ReadOptions,
) -> Result<Header> {
    let mut header = read_header(reader)?;
    let storage = storage_len(header.storage_nnz(options.generalize_symmetry))?;
    rows.clear();
    rows.resize(storage, I::default());
    cols.clear();
    cols.resize(storage, I::default());

    let sink = PatternTripletSink::new(rows, cols);
    read_body(reader, &header, sink, Placeholder, options)?;
    finish_header(&mut header, options);
    Ok(header)
}

/// Read a sparse-vector file into index/value vectors.
pub fn read_doublet<R: BufRead, I: MarketIndex, V: MarketValue>(
    reader: &mut R,
    indices: &mut Vec<I>,
    values: &mut Vec<V>,
    options: &ReadOptions,
) -> Result<Header> {
    let mut header = read_header(reader)?;
    let storage = storage_len(header.storage_nnz(options.generalize_symmetry))?;
    indices.clear();
    indices.resize(storage, I::default());
    values.clear();
    values.resize(storage, V::zero());

    let sink = DoubletSink::new(indices, values);
    read_body(reader, &header, sink, V::pattern_default(), options)?;
    finish_header(&mut header, options);
    Ok(header)
}

/// Read any file into a dense `nrows * ncols` vector in the requested
/// element order. Coordinate entries land at their offsets; elements the
/// file does not mention stay zero, and duplicates keep the last value.
pub fn read_array<R: BufRead, V: MarketValue>(
    reader: &mut R,
    values: &mut Vec<V>,
    order: StorageOrder,
    options: &ReadOptions,
) -> Result<Header> {
    let mut header = read_header(reader)?;
    let len = storage_len(header.nrows.saturating_mul(header.ncols))?;
    values.clear();
    values.resize(len, V::zero());

    let sink = DenseSink::new(values, order, header.nrows, header.ncols);
    read_body(reader, &header, sink, V::pattern_default(), options)?;
    finish_header(&mut header, options);
    Ok(header)
}

/// Write a coordinate file from triplet slices. The value slice may be
/// empty, which writes a pattern file.
pub fn write_triplet<W: Write, I: MarketIndex, V: MarketValue>(
    writer: &mut W,
    mut header: Header,
    rows: &[I],
    cols: &[I],
    values: &[V],
    options: &WriteOptions,
) -> Result<()> {
    let mut source = TripletSource::new(rows, cols, values, options)?;
    header.object = Object::Matrix;
    header.format = Format::Coordinate;
    header.field = if values.len() == rows.len() { V::FIELD } else { Field::Pattern };
    header.nnz = rows.len() as u64;
    write_header(writer, &header)?;
    write_body(writer, &mut source, options)
}

/// Write a pattern coordinate file: structure only.
pub fn write_pattern<W: Write, I: MarketIndex>(
    writer: &mut W,
    header: Header,
    rows: &[I],
    cols: &[I],
    options: &WriteOptions,
) -> Result<()> {
    let values: &[Placeholder] = &[];
    write_triplet(writer, header, rows, cols, values, options)
}

/// Write a sparse-vector file from doublet slices. `header.vector_length`
/// gives the logical length.
pub fn write_doublet<W: Write, I: MarketIndex, V: MarketValue>(
    writer: &mut W,
    mut header: Header,
    indices: &[I],
    values: &[V],
    options: &WriteOptions,
) -> Result<()> {
    let mut source = DoubletSource::new(indices, values, options)?;
    header.object = Object::Vector;
    header.format = Format::Coordinate;
    header.field = if values.len() == indices.len() { V::FIELD } else { Field::Pattern };
    header.symmetry = Symmetry::General;
    header.nrows = header.vector_length;
    header.ncols = 1;
    header.nnz = indices.len() as u64;
    write_header(writer, &header)?;
    write_body(writer, &mut source, options)
}

/// Write a dense array file: one value per line, column-major.
pub fn write_array<W: Write, V: MarketValue>(
    writer: &mut W,
    mut header: Header,
    values: &[V],
    order: StorageOrder,
    options: &WriteOptions,
) -> Result<()> {
    let mut source = ArraySource::new(values, order, header.nrows, header.ncols, options)?;
    header.object = Object::Matrix;
    header.format = Format::Array;
    header.field = V::FIELD;
    header.symmetry = Symmetry::General;
    header.nnz = values.len() as u64;
    write_header(writer, &header)?;
    write_body(writer, &mut source, options)
}

/// Write a compressed-sparse-column matrix as a coordinate file without
/// materializing triplets. With `transpose` the input is interpreted as
/// CSR: pointers walk rows and `row_idx` holds column indices, and the
/// header dimensions are used as given.
pub fn write_csc<W: Write, P: MarketIndex, I: MarketIndex, V: MarketValue>(
    writer: &mut W,
    mut header: Header,
    col_ptr: &[P],
    row_idx: &[I],
    values: &[V],
    transpose: bool,
    options: &WriteOptions,
) -> Result<()> {
    let mut source = CscSource::new(col_ptr, row_idx, values, transpose, options)?;
    let pointered = if transpose { header.nrows } else { header.ncols };
    if pointered != (col_ptr.len() - 1) as u64 {
        return Err(MarketError::Unsupported(
            "column pointer count does not match the header dimensions".into(),
        ));
    }
    header.object = Object::Matrix;
    header.format = Format::Coordinate;
    header.field = if values.len() == row_idx.len() { V::FIELD } else { Field::Pattern };
    header.nnz = row_idx.len() as u64;
    write_header(writer, &header)?;
    write_body(writer, &mut source, options)
}
