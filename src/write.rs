//! Body writing: drain a [`ChunkSource`] into a stream, sequentially or
//! on a thread pool with output kept in chunk order.

use std::io::Write;

use crate::error::Result;
use crate::options::WriteOptions;
use crate::source::{ChunkSource, FormatJob};

/// Write every chunk the source produces.
pub fn write_body<W: Write, S: ChunkSource>(
    writer: &mut W,
    source: &mut S,
    options: &WriteOptions,
) -> Result<()> {
    #[cfg(feature = "parallel")]
    if options.parallel_ok && options.num_threads != 1 {
        return crate::parallel::write_body_parallel(writer, source, options);
    }
    write_body_sequential(writer, source, options)
}

pub fn write_body_sequential<W: Write, S: ChunkSource>(
    writer: &mut W,
    source: &mut S,
    options: &WriteOptions,
) -> Result<()> {
    while let Some(job) = source.next_chunk(options) {
        writer.write_all(job.render().as_bytes())?;
    }
    Ok(())
}
