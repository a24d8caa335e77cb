//! Body parsing: per-chunk entry parsers, the sequential driver, and the
//! dispatch that picks adapters and sequential or parallel execution.

use std::io::BufRead;

use crate::chunking::next_chunk;
use crate::error::{MarketError, Result};
use crate::header::{Field, Format, Header, Object, Symmetry};
use crate::options::{DiagonalPolicy, ReadOptions};
use crate::sink::{EntrySink, PatternAdapter};
use crate::value::{next_token, MarketValue, Placeholder};

/// Running position of a parser within the body.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BodyPos {
    /// Absolute 1-based line number of the next line.
    pub line: u64,
    /// Data (non-blank) body lines consumed so far. For array bodies this
    /// is the entry offset; for generalized coordinate bodies each data
    /// line fills two output slots.
    pub data_lines: u64,
}

impl BodyPos {
    pub(crate) fn start(header: &Header) -> Self {
        BodyPos { line: header.header_line_count + 1, data_lines: 0 }
    }
}

/// Read the whole body into `sink`.
///
/// Pattern files substitute `pattern_value` for the missing value column.
/// Real and integer files load into complex sinks with a zero imaginary
/// part; complex files into non-complex sinks fail with
/// [`MarketError::IncompatibleValueType`].
pub fn read_body<R: BufRead, S: EntrySink>(
    reader: &mut R,
    header: &Header,
    sink: S,
    pattern_value: S::Value,
    options: &ReadOptions,
) -> Result<()> {
    if header.field == Field::Pattern {
        let adapted = PatternAdapter::new(sink, pattern_value);
        Placeholder::read_body_with(reader, header, adapted, options)
    } else {
        S::Value::read_body_with(reader, header, sink, options)
    }
}

/// Body read after field adapters have been applied: reject unsupported
/// generalization targets, pick the execution mode, verify the declared
/// entry count was reached.
pub(crate) fn read_body_no_adapters<R: BufRead, S: EntrySink>(
    reader: &mut R,
    header: &Header,
    mut sink: S,
    options: &ReadOptions,
) -> Result<()> {
    if options.generalize_symmetry && header.symmetry != Symmetry::General {
        if header.object != Object::Matrix {
            return Err(MarketError::Unsupported(
                "cannot generalize symmetry of a vector file; disable generalize_symmetry".into(),
            ));
        }
        if header.format != Format::Coordinate {
            return Err(MarketError::Unsupported(
                "cannot generalize symmetry of an array file; disable generalize_symmetry".into(),
            ));
        }
    }

    #[cfg(feature = "parallel")]
    let data_lines = if want_parallel(header, &sink, options) {
        crate::parallel::read_body_parallel(reader, header, &mut sink, options)?
    } else {
        read_body_sequential(reader, header, &mut sink, options)?
    };
    #[cfg(not(feature = "parallel"))]
    let data_lines = read_body_sequential(reader, header, &mut sink, options)?;

    if data_lines < header.nnz {
        return Err(MarketError::invalid(format!(
            "truncated file: expected {} more data lines",
            header.nnz - data_lines
        )));
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn want_parallel<S: EntrySink>(header: &Header, sink: &S, options: &ReadOptions) -> bool {
    let caps = sink.caps();
    options.parallel_ok
        && options.num_threads != 1
        && caps.parallel_ok
        && !caps.appending
        && S::Value::PARALLEL_WRITES_SAFE
        // Coordinate bodies may repeat a coordinate; concurrent dense
        // writes to the same element would race.
        && !(header.format == Format::Coordinate && caps.dense)
}

pub(crate) fn read_body_sequential<R: BufRead, S: EntrySink>(
    reader: &mut R,
    header: &Header,
    sink: &mut S,
    options: &ReadOptions,
) -> Result<u64> {
    let mut pos = BodyPos::start(header);
    loop {
        let chunk = next_chunk(reader, options)?;
        if chunk.is_empty() {
            break;
        }
        parse_chunk(&chunk, header, &mut pos, sink, options)?;
    }
    Ok(pos.data_lines)
}

pub(crate) fn parse_chunk<S: EntrySink>(
    chunk: &str,
    header: &Header,
    pos: &mut BodyPos,
    sink: &mut S,
    options: &ReadOptions,
) -> Result<()> {
    match header.format {
        Format::Coordinate => parse_coordinate_chunk(chunk, header, pos, sink, options),
        Format::Array => parse_array_chunk(chunk, header, pos, sink, options),
    }
}

fn parse_coordinate_chunk<S: EntrySink>(
    chunk: &str,
    header: &Header,
    pos: &mut BodyPos,
    sink: &mut S,
    options: &ReadOptions,
) -> Result<()> {
    let generalize = options.generalize_symmetry && header.symmetry != Symmetry::General;
    for line in chunk.lines() {
        let line_num = pos.line;
        pos.line += 1;
        if line.trim_ascii().is_empty() {
            continue;
        }
        if pos.data_lines >= header.nnz {
            return Err(MarketError::invalid_at(
                line_num,
                "more entries than the header declares",
            ));
        }
        parse_coordinate_line(line, header, sink, options, generalize)
            .map_err(|e| e.at_line(line_num))?;
        pos.data_lines += 1;
    }
    Ok(())
}

fn parse_coordinate_line<S: EntrySink>(
    line: &str,
    header: &Header,
    sink: &mut S,
    options: &ReadOptions,
    generalize: bool,
) -> Result<()> {
    let (row, rest) = parse_coordinate(line, "row index")?;
    let (col, rest) = match header.object {
        Object::Matrix => parse_coordinate(rest, "column index")?,
        Object::Vector => (1, rest),
    };
    match header.object {
        Object::Matrix => {
            if row < 1 || row > header.nrows {
                return Err(MarketError::invalid(format!("row index {row} out of bounds")));
            }
            if col < 1 || col > header.ncols {
                return Err(MarketError::invalid(format!("column index {col} out of bounds")));
            }
        }
        Object::Vector => {
            if row < 1 || row > header.vector_length {
                return Err(MarketError::invalid(format!("vector index {row} out of bounds")));
            }
        }
    }
    let (value, _rest) = S::Value::parse(rest, options.out_of_range)?;
    let (row, col) = (row - 1, col - 1);

    if !generalize {
        return sink.handle(row, col, value);
    }
    if row != col {
        let companion = match header.symmetry {
            Symmetry::Symmetric | Symmetry::General => value,
            Symmetry::SkewSymmetric => value.negated(),
            Symmetry::Hermitian => value.conjugated(),
        };
        // Companion first, then the primary entry.
        sink.handle(col, row, companion)?;
        sink.handle(row, col, value)
    } else if sink.caps().appending {
        sink.handle(row, col, value)
    } else {
        // Fixed-size sinks consume two slots per line either way.
        match options.diagonal_policy {
            DiagonalPolicy::ExtraZeroElement => sink.handle(row, col, S::Value::zero())?,
            DiagonalPolicy::DuplicateElement => sink.handle(row, col, value)?,
        }
        sink.handle(row, col, value)
    }
}

fn parse_coordinate<'t>(text: &'t str, what: &str) -> Result<(u64, &'t str)> {
    let (tok, rest) =
        next_token(text).ok_or_else(|| MarketError::invalid(format!("missing {what}")))?;
    let value: u64 =
        tok.parse().map_err(|_| MarketError::invalid(format!("invalid {what} '{tok}'")))?;
    Ok((value, rest))
}

fn parse_array_chunk<S: EntrySink>(
    chunk: &str,
    header: &Header,
    pos: &mut BodyPos,
    sink: &mut S,
    options: &ReadOptions,
) -> Result<()> {
    for line in chunk.lines() {
        let line_num = pos.line;
        pos.line += 1;
        if line.trim_ascii().is_empty() {
            continue;
        }
        let entry = pos.data_lines;
        if entry >= header.nnz || header.nrows == 0 {
            return Err(MarketError::invalid_at(
                line_num,
                "more values than the declared dimensions hold",
            ));
        }
        // Array bodies are column-major: the row varies fastest.
        let row = entry % header.nrows;
        let col = entry / header.nrows;
        let (value, _rest) =
            S::Value::parse(line, options.out_of_range).map_err(|e| e.at_line(line_num))?;
        sink.handle(row, col, value).map_err(|e| e.at_line(line_num))?;
        pos.data_lines += 1;
    }
    Ok(())
}
