//! # matmarket
//!
//! A **fast Matrix Market codec** for Rust: read and write the NIST
//! Matrix Market text interchange format with a chunked engine that
//! parses and renders bodies in parallel.
//!
//! ## Key Features
//!
//! - **Full header support** - `matrix` and `vector` objects, `coordinate`
//!   and `array` formats, `real`/`double`/`integer`/`complex`/`pattern`
//!   fields, all four symmetries
//! - **Symmetry generalization** - symmetric, skew-symmetric, and
//!   hermitian files expand to their general form on the fly
//! - **Pluggable storage** - sinks consume parsed entries, sources
//!   produce body text; triplet, doublet, dense, appending, and CSC
//!   variants are built in
//! - **Sequential and parallel execution** - chunks parse and render on a
//!   Rayon pool (default `parallel` feature) with exact output ordering
//!   and line numbering
//! - **Stream-generic** - reads from any [`std::io::BufRead`], writes to
//!   any [`std::io::Write`]
//! - **Adapting value types** - pattern files load into numeric storage
//!   with a fill value, real and integer files load into complex storage
//!
//! ## Quick Start
//!
//! ```
//! use matmarket::{read_triplet, write_triplet, Header, ReadOptions, WriteOptions};
//!
//! let file = b"%%MatrixMarket matrix coordinate real general\n\
//!              %example\n\
//!              2 2 2\n\
//!              1 1 1.5\n\
//!              2 2 -0.5\n";
//!
//! let (mut rows, mut cols, mut values) = (Vec::new(), Vec::new(), Vec::new());
//! let header = read_triplet::<_, u32, f64>(
//!     &mut &file[..], &mut rows, &mut cols, &mut values, &ReadOptions::default())?;
//! assert_eq!((header.nrows, header.ncols), (2, 2));
//! assert_eq!(rows, vec![0, 1]);
//! assert_eq!(values, vec![1.5, -0.5]);
//!
//! let mut out = Vec::new();
//! write_triplet(&mut out, Header::for_matrix(2, 2), &rows, &cols, &values,
//!               &WriteOptions::default())?;
//! # Ok::<(), matmarket::MarketError>(())
//! ```
//!
//! ## Core Concepts
//!
//! ### Header
//!
//! [`Header`] carries everything before the body: banner fields,
//! dimensions, declared entry count, and the comment block.
//! [`read_header`] and [`write_header`] are usable on their own, e.g. to
//! inspect dimensions without parsing the body.
//!
//! ### Sinks and sources
//!
//! Reading drives an [`EntrySink`]: the parser hands it 0-based
//! coordinates and a typed value per entry. Writing drains a
//! [`ChunkSource`], which hands out blocks of entries that render to text
//! independently. The [`api`] module wraps the common pairings:
//! [`read_triplet`], [`read_doublet`], [`read_array`], [`read_pattern`],
//! [`write_triplet`], [`write_doublet`], [`write_array`], [`write_csc`].
//!
//! ### Chunked execution
//!
//! Bodies split into chunks on line boundaries. In parallel mode the
//! driving thread reads chunks, has their lines counted on the pool, and
//! assigns each chunk its output offset in input order before parsing it
//! on the pool; results are identical to sequential mode. Reading and
//! writing stay on the calling thread, so the stream needs no
//! synchronization.
//!
//! ### Options
//!
//! [`ReadOptions`] controls chunk size, symmetry generalization and its
//! diagonal policy, the numeric out-of-range policy, and threading.
//! [`WriteOptions`] controls chunk size, float precision, and threading.

pub mod api;
pub mod chunking;
pub mod error;
pub mod header;
pub mod index;
pub mod options;
#[cfg(feature = "parallel")]
mod parallel;
pub mod read;
pub mod sink;
pub mod source;
pub mod value;
pub mod write;

pub use api::{
    read_array, read_doublet, read_pattern, read_triplet, read_triplet_appending, write_array,
    write_csc, write_doublet, write_pattern, write_triplet,
};
pub use error::{MarketError, Result};
pub use header::{read_header, write_header, Field, Format, Header, Object, Symmetry};
pub use index::MarketIndex;
pub use options::{DiagonalPolicy, OutOfRangePolicy, ReadOptions, WriteOptions};
pub use read::read_body;
pub use sink::{
    AppendingTripletSink, DenseSink, DoubletSink, EntrySink, PatternTripletSink, SinkCaps,
    StorageOrder, TripletSink,
};
pub use source::{ArraySource, ChunkSource, CscSource, DoubletSource, FormatJob, TripletSource};
pub use value::{Complex, MarketValue, Placeholder};
pub use write::{write_body, write_body_sequential};
