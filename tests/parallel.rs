#![cfg(feature = "parallel")]

use std::fmt::Write as _;

use matmarket::{
    read_array, read_triplet, write_triplet, Header, ReadOptions, StorageOrder, WriteOptions,
};

/// A deterministic coordinate file big enough to split into many chunks
/// at small chunk sizes.
fn coordinate_file(n: u64) -> Vec<u8> {
    let mut body = String::new();
    let _ = write!(body, "%%MatrixMarket matrix coordinate real general\n{n} {n} {n}\n");
    for i in 0..n {
        let _ = write!(body, "{} {} {}\n", i + 1, (i * 7) % n + 1, i as f64 * 0.5 - 100.0);
    }
    body.into_bytes()
}

fn array_file(nrows: u64, ncols: u64) -> Vec<u8> {
    let mut body = String::new();
    let _ = write!(body, "%%MatrixMarket matrix array real general\n{nrows} {ncols}\n");
    for i in 0..nrows * ncols {
        let _ = write!(body, "{}\n", (i as f64).sin());
    }
    body.into_bytes()
}

fn read_with(file: &[u8], options: &ReadOptions) -> anyhow::Result<(Vec<u64>, Vec<u64>, Vec<f64>)> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, options)?;
    Ok((rows, cols, values))
}

#[test]
fn worker_counts_agree_on_triplets() -> anyhow::Result<()> {
    let file = coordinate_file(2000);
    let base = ReadOptions {
        chunk_size_bytes: 64,
        parallel_ok: false,
        ..ReadOptions::default()
    };
    let expected = read_with(&file, &base)?;

    for threads in [1, 2, 4, 8] {
        let options = ReadOptions {
            chunk_size_bytes: 64,
            parallel_ok: true,
            num_threads: threads,
            ..ReadOptions::default()
        };
        assert_eq!(read_with(&file, &options)?, expected, "{threads} threads");
    }
    Ok(())
}

#[test]
fn worker_counts_agree_on_symmetric_generalization() -> anyhow::Result<()> {
    let n = 500u64;
    let mut body = String::new();
    let _ = write!(body, "%%MatrixMarket matrix coordinate real symmetric\n{n} {n} {n}\n");
    for i in 0..n {
        // Lower triangle, diagonal included every 5th line.
        let col = if i % 5 == 0 { i } else { i / 2 };
        let _ = write!(body, "{} {} {}\n", i + 1, col + 1, i as f64 + 0.25);
    }
    let file = body.into_bytes();

    let sequential = ReadOptions {
        chunk_size_bytes: 48,
        parallel_ok: false,
        ..ReadOptions::default()
    };
    let expected = read_with(&file, &sequential)?;
    assert_eq!(expected.0.len(), 2 * n as usize);

    let parallel = ReadOptions {
        chunk_size_bytes: 48,
        num_threads: 4,
        ..ReadOptions::default()
    };
    assert_eq!(read_with(&file, &parallel)?, expected);
    Ok(())
}

#[test]
fn worker_counts_agree_on_dense_arrays() -> anyhow::Result<()> {
    let file = array_file(40, 25);
    let sequential = ReadOptions {
        chunk_size_bytes: 32,
        parallel_ok: false,
        ..ReadOptions::default()
    };
    let mut expected: Vec<f64> = Vec::new();
    read_array(&mut &file[..], &mut expected, StorageOrder::RowMajor, &sequential)?;

    for threads in [2, 4, 8] {
        let options = ReadOptions {
            chunk_size_bytes: 32,
            num_threads: threads,
            ..ReadOptions::default()
        };
        let mut values: Vec<f64> = Vec::new();
        read_array(&mut &file[..], &mut values, StorageOrder::RowMajor, &options)?;
        assert_eq!(values, expected, "{threads} threads");
    }
    Ok(())
}

#[test]
fn dense_bool_reads_are_deterministic() -> anyhow::Result<()> {
    // Bit-packable element type: parallel writes are suppressed, so a
    // thousand runs must come out identical.
    let mut body = String::from("%%MatrixMarket matrix array integer general\n30 20\n");
    for i in 0..600 {
        let _ = write!(body, "{}\n", if i % 3 == 0 { 1 } else { 0 });
    }
    let file = body.into_bytes();

    let options = ReadOptions { chunk_size_bytes: 32, ..ReadOptions::default() };
    let mut expected: Vec<bool> = Vec::new();
    read_array(&mut &file[..], &mut expected, StorageOrder::ColMajor, &options)?;
    assert_eq!(expected.iter().filter(|b| **b).count(), 200);

    for _ in 0..1000 {
        let mut values: Vec<bool> = Vec::new();
        read_array(&mut &file[..], &mut values, StorageOrder::ColMajor, &options)?;
        assert_eq!(values, expected);
    }
    Ok(())
}

#[test]
fn parallel_write_is_byte_stable() -> anyhow::Result<()> {
    let n = 3000u64;
    let rows: Vec<u64> = (0..n).collect();
    let cols: Vec<u64> = (0..n).map(|i| (i * 3) % n).collect();
    let values: Vec<f64> = (0..n).map(|i| i as f64 / 8.0).collect();

    let sequential = WriteOptions {
        chunk_size_values: 16,
        parallel_ok: false,
        ..WriteOptions::default()
    };
    let mut expected = Vec::new();
    write_triplet(&mut expected, Header::for_matrix(n, n), &rows, &cols, &values, &sequential)?;

    for threads in [0, 2, 4, 8] {
        let options = WriteOptions {
            chunk_size_values: 16,
            num_threads: threads,
            ..WriteOptions::default()
        };
        let mut out = Vec::new();
        write_triplet(&mut out, Header::for_matrix(n, n), &rows, &cols, &values, &options)?;
        assert_eq!(out, expected, "{threads} threads");
    }
    Ok(())
}
