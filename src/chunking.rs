//! Stream chunking and line counting.
//!
//! The body is split into chunks whose boundaries always fall on line
//! terminators, so every chunk can be parsed without seeing its
//! neighbors. Counting a chunk's lines is the cheap pass that lets the
//! parallel pipeline assign each chunk its absolute line number and
//! output offset before parsing starts.

use std::io::{BufRead, Read};

use crate::error::Result;
use crate::options::ReadOptions;

/// Bytes held back from the bulk read so that finishing the current line
/// usually stays within the buffer's capacity.
const CHUNK_MARGIN: usize = 4096;

/// Read the next chunk: roughly `chunk_size_bytes` of text extended to
/// the next line terminator. Returns an empty string only at end of
/// stream. The final chunk of a stream may lack a trailing terminator.
pub fn next_chunk<R: BufRead>(reader: &mut R, options: &ReadOptions) -> Result<String> {
    let target = options.chunk_size_bytes.max(1);
    let mut chunk = String::with_capacity(target + CHUNK_MARGIN);

    let bulk = target.saturating_sub(CHUNK_MARGIN);
    if bulk > 0 {
        let n = reader.by_ref().take(bulk as u64).read_to_string(&mut chunk)?;
        if n == 0 || chunk.ends_with('\n') {
            return Ok(chunk);
        }
    }

    // Complete the current line so the chunk never splits one.
    reader.read_line(&mut chunk)?;
    Ok(chunk)
}

/// Per-chunk line statistics produced by [`count_lines`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineCount {
    /// Total lines. A chunk without a trailing terminator still ends in a
    /// line, and an empty chunk counts as one (blank) line.
    pub lines: u64,
    /// Lines that are empty or hold only blanks. These carry no entries
    /// and are excluded from offset and nnz accounting.
    pub blank: u64,
}

impl LineCount {
    /// Lines that carry an entry.
    pub fn data_lines(&self) -> u64 {
        self.lines - self.blank
    }
}

/// Count the lines in a chunk and how many of them are blank.
pub fn count_lines(chunk: &str) -> LineCount {
    let mut count = LineCount::default();
    for part in chunk.split('\n') {
        count.lines += 1;
        if part.trim_ascii().is_empty() {
            count.blank += 1;
        }
    }
    if chunk.ends_with('\n') {
        // The split yields one empty trailing piece that is not a line.
        count.lines -= 1;
        count.blank -= 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(chunk: &str) -> (u64, u64) {
        let c = count_lines(chunk);
        (c.lines, c.blank)
    }

    #[test]
    fn count_lines_table() {
        assert_eq!(counts(""), (1, 1));
        assert_eq!(counts("aa\n"), (1, 0));
        assert_eq!(counts("aa\n\n"), (2, 1));
        assert_eq!(counts(" \n "), (2, 2));
        assert_eq!(counts("\n"), (1, 1));
        assert_eq!(counts("1 1 4.5\n2 2 .1\n"), (2, 0));
        assert_eq!(counts("1 1 4.5"), (1, 0));
        assert_eq!(counts("\t\n\t"), (2, 2));
    }

    #[test]
    fn chunks_reassemble_identically() -> Result<()> {
        let bodies = [
            "",
            "aa",
            "aa\n",
            "\n\n\n",
            "1 1 1.0\n2 2 2.0\n3 3 3.0\n",
            "1 1 1.0\n2 2 2.0\n3 3 3.0",
        ];
        for body in bodies {
            for size in 1..=body.len() + 1 {
                let options = ReadOptions { chunk_size_bytes: size, ..ReadOptions::default() };
                let mut reader = body.as_bytes();
                let mut rebuilt = String::new();
                loop {
                    let chunk = next_chunk(&mut reader, &options)?;
                    if chunk.is_empty() {
                        break;
                    }
                    // Every chunk but the last ends on a line boundary.
                    assert!(chunk.ends_with('\n') || rebuilt.len() + chunk.len() == body.len());
                    rebuilt.push_str(&chunk);
                }
                assert_eq!(rebuilt, body, "chunk size {size}");
            }
        }
        Ok(())
    }
}
