//! Matrix Market header parsing and writing.
//!
//! A header is the banner line (`%%MatrixMarket object format field
//! symmetry`), zero or more `%`-prefixed comment lines, and a dimension
//! line. Everything after that is the body, handled by [`crate::read`]
//! and [`crate::write`].

use std::io::{BufRead, Write};

use crate::error::{MarketError, Result};

/// The first token of every Matrix Market file.
pub const BANNER: &str = "%%MatrixMarket";
/// Out-of-spec single-percent banner emitted by some older packages.
/// Accepted on read, never written.
pub const BANNER_LEGACY: &str = "%MatrixMarket";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Object {
    #[default]
    Matrix,
    Vector,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    Array,
    #[default]
    Coordinate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Real,
    Double,
    Complex,
    Integer,
    Pattern,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Symmetry {
    #[default]
    General,
    Symmetric,
    SkewSymmetric,
    Hermitian,
}

impl Object {
    pub fn as_str(self) -> &'static str {
        match self {
            Object::Matrix => "matrix",
            Object::Vector => "vector",
        }
    }

    fn parse(token: &str, line: u64) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "matrix" => Ok(Object::Matrix),
            "vector" => Ok(Object::Vector),
            _ => Err(MarketError::invalid_at(line, format!("invalid object type '{token}'"))),
        }
    }
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Array => "array",
            Format::Coordinate => "coordinate",
        }
    }

    fn parse(token: &str, line: u64) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "array" => Ok(Format::Array),
            "coordinate" => Ok(Format::Coordinate),
            _ => Err(MarketError::invalid_at(line, format!("invalid format '{token}'"))),
        }
    }
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Real => "real",
            Field::Double => "double",
            Field::Complex => "complex",
            Field::Integer => "integer",
            Field::Pattern => "pattern",
        }
    }

    fn parse(token: &str, line: u64) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "real" => Ok(Field::Real),
            "double" => Ok(Field::Double),
            "complex" => Ok(Field::Complex),
            "integer" => Ok(Field::Integer),
            "pattern" => Ok(Field::Pattern),
            _ => Err(MarketError::invalid_at(line, format!("invalid field type '{token}'"))),
        }
    }
}

impl Symmetry {
    pub fn as_str(self) -> &'static str {
        match self {
            Symmetry::General => "general",
            Symmetry::Symmetric => "symmetric",
            Symmetry::SkewSymmetric => "skew-symmetric",
            Symmetry::Hermitian => "hermitian",
        }
    }

    fn parse(token: &str, line: u64) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "general" => Ok(Symmetry::General),
            "symmetric" => Ok(Symmetry::Symmetric),
            "skew-symmetric" => Ok(Symmetry::SkewSymmetric),
            "hermitian" => Ok(Symmetry::Hermitian),
            _ => Err(MarketError::invalid_at(line, format!("invalid symmetry '{token}'"))),
        }
    }
}

/// Everything known about a file before its body: the banner fields, the
/// dimensions, the accumulated comment, and how many lines the header
/// occupied (body line numbering starts after it).
#[derive(Clone, Debug, Default)]
pub struct Header {
    pub object: Object,
    pub format: Format,
    pub field: Field,
    pub symmetry: Symmetry,

    /// Matrix dimensions. For vectors, `nrows` is the length and `ncols` is 1.
    pub nrows: u64,
    pub ncols: u64,
    /// Vector length; zero for matrices.
    pub vector_length: u64,

    /// Declared body entry count. For array format this is `nrows * ncols`.
    pub nnz: u64,

    /// Comment lines with the leading `%` stripped, joined with `\n`.
    pub comment: String,

    /// Number of lines the header occupied, banner through dimension line.
    pub header_line_count: u64,
}

impl Header {
    /// A coordinate matrix header with the given dimensions; the writer
    /// entry points fill in format, field, and nnz.
    pub fn for_matrix(nrows: u64, ncols: u64) -> Self {
        Header { nrows, ncols, ..Header::default() }
    }

    /// A sparse vector header with the given length.
    pub fn for_vector(length: u64) -> Self {
        Header {
            object: Object::Vector,
            nrows: length,
            ncols: 1,
            vector_length: length,
            ..Header::default()
        }
    }

    /// Output slots the body fills: twice the declared nnz when a
    /// non-general symmetry is being generalized, since every entry then
    /// produces a companion.
    pub fn storage_nnz(&self, generalize_symmetry: bool) -> u64 {
        if generalize_symmetry && self.symmetry != Symmetry::General {
            2 * self.nnz
        } else {
            self.nnz
        }
    }
}

/// Parse the header from the start of `reader`, leaving it positioned at
/// the first body line.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let mut header = Header::default();
    let mut lines_read = 0u64;
    let mut line = String::new();

    read_header_line(reader, &mut line, &mut lines_read)?;
    if !line.starts_with(BANNER) && !line.starts_with(BANNER_LEGACY) {
        return Err(MarketError::invalid_at(
            lines_read,
            "not a Matrix Market stream: missing banner",
        ));
    }
    let mut tokens = line.split_ascii_whitespace();
    tokens.next(); // banner keyword
    header.object = Object::parse(banner_token(tokens.next(), "object", lines_read)?, lines_read)?;
    header.format = Format::parse(banner_token(tokens.next(), "format", lines_read)?, lines_read)?;
    header.field = Field::parse(banner_token(tokens.next(), "field", lines_read)?, lines_read)?;
    header.symmetry =
        Symmetry::parse(banner_token(tokens.next(), "symmetry", lines_read)?, lines_read)?;

    // Comment lines, then the dimension line.
    loop {
        read_header_line(reader, &mut line, &mut lines_read)?;
        match line.strip_prefix('%') {
            Some(rest) => {
                if !header.comment.is_empty() {
                    header.comment.push('\n');
                }
                header.comment.push_str(rest);
            }
            None => break,
        }
    }

    let mut dims = line.split_ascii_whitespace();
    match header.object {
        Object::Matrix => {
            header.nrows = parse_dim(dims.next(), "row count", lines_read)?;
            header.ncols = parse_dim(dims.next(), "column count", lines_read)?;
            header.nnz = match header.format {
                Format::Coordinate => match dims.next() {
                    Some(tok) => parse_dim(Some(tok), "entry count", lines_read)?,
                    None => 0,
                },
                Format::Array => header.nrows.checked_mul(header.ncols).ok_or_else(|| {
                    MarketError::invalid_at(lines_read, "dimensions overflow the entry count")
                })?,
            };
        }
        Object::Vector => {
            header.vector_length = parse_dim(dims.next(), "vector length", lines_read)?;
            header.nrows = header.vector_length;
            header.ncols = 1;
            header.nnz = match header.format {
                Format::Coordinate => match dims.next() {
                    Some(tok) => parse_dim(Some(tok), "entry count", lines_read)?,
                    None => 0,
                },
                Format::Array => header.vector_length,
            };
        }
    }

    header.header_line_count = lines_read;
    Ok(header)
}

/// Write `header` to `w`: banner, comment lines, dimension line.
pub fn write_header<W: Write>(w: &mut W, header: &Header) -> Result<()> {
    writeln!(
        w,
        "{BANNER} {} {} {} {}",
        header.object.as_str(),
        header.format.as_str(),
        header.field.as_str(),
        header.symmetry.as_str()
    )?;
    if !header.comment.is_empty() {
        for line in header.comment.split('\n') {
            writeln!(w, "%{line}")?;
        }
    }
    match header.object {
        Object::Matrix => {
            write!(w, "{} {}", header.nrows, header.ncols)?;
        }
        Object::Vector => {
            write!(w, "{}", header.vector_length)?;
        }
    }
    if header.format == Format::Coordinate {
        write!(w, " {}", header.nnz)?;
    }
    w.write_all(b"\n")?;
    Ok(())
}

fn read_header_line<R: BufRead>(reader: &mut R, line: &mut String, lines_read: &mut u64) -> Result<()> {
    line.clear();
    let n = reader.read_line(line)?;
    if n == 0 {
        return Err(MarketError::invalid_at(*lines_read + 1, "premature end of header"));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    *lines_read += 1;
    Ok(())
}

fn banner_token<'t>(token: Option<&'t str>, what: &str, line: u64) -> Result<&'t str> {
    token.ok_or_else(|| MarketError::invalid_at(line, format!("banner is missing the {what} token")))
}

fn parse_dim(token: Option<&str>, what: &str, line: u64) -> Result<u64> {
    let tok =
        token.ok_or_else(|| MarketError::invalid_at(line, format!("missing {what} in dimension line")))?;
    let value: i64 = tok
        .parse()
        .map_err(|_| MarketError::invalid_at(line, format!("invalid {what} '{tok}'")))?;
    if value < 0 {
        return Err(MarketError::invalid_at(line, format!("{what} cannot be negative")));
    }
    Ok(value as u64)
}
