//! Parallel execution: the chunked read pipeline and the ordered
//! parallel body writer. Compiled only with the `parallel` feature.
//!
//! The read pipeline stages are read chunk, count its lines, parse it.
//! Only the driving thread touches the stream; counting and parsing run
//! on a rayon pool. Line counts come back in submission order, which is
//! what lets the driver assign each chunk its absolute line number and
//! carve its output slots before parsing starts, so parse tasks write
//! disjoint storage with no locks.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::mpsc;

use rayon::prelude::*;

use crate::chunking::{count_lines, next_chunk, LineCount};
use crate::error::{MarketError, Result};
use crate::header::{Header, Symmetry};
use crate::options::{ReadOptions, WriteOptions};
use crate::read::{parse_chunk, BodyPos};
use crate::sink::EntrySink;
use crate::source::{ChunkSource, FormatJob};

/// Chunks in flight per worker. Too few starves the pool on uneven chunk
/// splits; too many holds more chunk text in memory.
const INFLIGHT_PER_WORKER: usize = 5;

pub(crate) fn resolve_threads(requested: usize) -> usize {
    if requested == 0 { num_cpus::get().max(1) } else { requested }
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| MarketError::Io(std::io::Error::other(e)))
}

fn lost_worker() -> MarketError {
    MarketError::Io(std::io::Error::other("worker task disappeared"))
}

/// Parse the body on a thread pool. Returns the total data-line count.
///
/// Errors surface in input order: after the first failure no further
/// chunks are submitted, remaining tasks are drained, and the earliest
/// failing chunk's error is returned.
pub(crate) fn read_body_parallel<R: BufRead, S: EntrySink>(
    reader: &mut R,
    header: &Header,
    sink: &mut S,
    options: &ReadOptions,
) -> Result<u64> {
    let threads = resolve_threads(options.num_threads);
    let pool = build_pool(threads)?;
    let inflight = INFLIGHT_PER_WORKER * threads;

    // Each generalized coordinate line fills two output slots.
    let factor: u64 =
        if options.generalize_symmetry && header.symmetry != Symmetry::General { 2 } else { 1 };

    pool.in_place_scope(|scope| {
        let mut count_queue: VecDeque<mpsc::Receiver<(String, LineCount)>> = VecDeque::new();
        let mut parse_queue: VecDeque<mpsc::Receiver<Result<()>>> = VecDeque::new();
        let mut pos = BodyPos::start(header);
        let mut first_err: Option<MarketError> = None;

        // Seed the window. Only this thread reads the stream.
        for _ in 0..inflight {
            match next_chunk(reader, options) {
                Ok(chunk) if !chunk.is_empty() => submit_count(scope, chunk, &mut count_queue),
                Ok(_) => break,
                Err(e) => {
                    first_err = Some(e);
                    break;
                }
            }
        }

        // Retire line counts in submission order.
        while let Some(count_rx) = count_queue.pop_front() {
            let (chunk, counts) = match count_rx.recv() {
                Ok(result) => result,
                Err(_) => {
                    fail_in_order(&mut parse_queue, &mut first_err, lost_worker());
                    continue;
                }
            };

            // Backpressure on the parse stage.
            while parse_queue.len() >= inflight {
                retire_parse(&mut parse_queue, &mut first_err);
            }

            // Keep the window full.
            if first_err.is_none() {
                match next_chunk(reader, options) {
                    Ok(chunk) if !chunk.is_empty() => submit_count(scope, chunk, &mut count_queue),
                    Ok(_) => {}
                    Err(e) => fail_in_order(&mut parse_queue, &mut first_err, e),
                }
            }

            // Order-dependent bookkeeping happens here, in input order.
            let chunk_pos = pos;
            pos.line += counts.lines;
            pos.data_lines += counts.data_lines();

            if first_err.is_some() {
                continue;
            }

            let chunk_sink = match sink.carve(counts.data_lines() * factor) {
                Ok(s) => s,
                Err(e) => {
                    fail_in_order(&mut parse_queue, &mut first_err, e.at_line(chunk_pos.line));
                    continue;
                }
            };

            let (tx, rx) = mpsc::channel();
            scope.spawn(move |_| {
                let mut chunk_sink = chunk_sink;
                let mut chunk_pos = chunk_pos;
                let result = parse_chunk(&chunk, header, &mut chunk_pos, &mut chunk_sink, options);
                let _ = tx.send(result);
            });
            parse_queue.push_back(rx);
        }

        // Drain remaining parse tasks, still in submission order.
        while !parse_queue.is_empty() {
            retire_parse(&mut parse_queue, &mut first_err);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(pos.data_lines),
        }
    })
}

fn submit_count<'scope>(
    scope: &rayon::Scope<'scope>,
    chunk: String,
    queue: &mut VecDeque<mpsc::Receiver<(String, LineCount)>>,
) {
    let (tx, rx) = mpsc::channel();
    scope.spawn(move |_| {
        let counts = count_lines(&chunk);
        let _ = tx.send((chunk, counts));
    });
    queue.push_back(rx);
}

/// Record a failure raised on the driving thread for the current chunk.
/// Every parse task still queued belongs to an earlier chunk, so a
/// pending parse error outranks this one; drain them first.
fn fail_in_order(
    parse_queue: &mut VecDeque<mpsc::Receiver<Result<()>>>,
    first_err: &mut Option<MarketError>,
    err: MarketError,
) {
    while !parse_queue.is_empty() {
        retire_parse(parse_queue, first_err);
    }
    first_err.get_or_insert(err);
}

fn retire_parse(
    parse_queue: &mut VecDeque<mpsc::Receiver<Result<()>>>,
    first_err: &mut Option<MarketError>,
) {
    let Some(rx) = parse_queue.pop_front() else { return };
    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            first_err.get_or_insert(e);
        }
        Err(_) => {
            first_err.get_or_insert_with(lost_worker);
        }
    }
}

/// Render chunks on a thread pool, writing results strictly in chunk
/// order. The source is only polled from this thread; a bounded window
/// of jobs is rendered per round.
pub(crate) fn write_body_parallel<W: Write, S: ChunkSource>(
    writer: &mut W,
    source: &mut S,
    options: &WriteOptions,
) -> Result<()> {
    let threads = resolve_threads(options.num_threads);
    let pool = build_pool(threads)?;
    let window = INFLIGHT_PER_WORKER * threads;

    loop {
        let mut jobs = Vec::with_capacity(window);
        while jobs.len() < window {
            match source.next_chunk(options) {
                Some(job) => jobs.push(job),
                None => break,
            }
        }
        if jobs.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> =
            pool.install(|| jobs.into_par_iter().map(FormatJob::render).collect());
        for text in rendered {
            writer.write_all(text.as_bytes())?;
        }
    }
}
