use matmarket::{
    read_array, read_doublet, read_triplet, Complex, MarketError, OutOfRangePolicy, ReadOptions,
    StorageOrder,
};

fn sequential() -> ReadOptions {
    ReadOptions { parallel_ok: false, ..ReadOptions::default() }
}

#[cfg(feature = "parallel")]
fn parallel() -> ReadOptions {
    // Tiny chunks force the file through many pipeline tasks.
    ReadOptions { chunk_size_bytes: 8, num_threads: 4, ..ReadOptions::default() }
}

fn read_f64(file: &[u8], options: &ReadOptions) -> Result<(), MarketError> {
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, options).map(|_| ())
}

#[test]
fn invalid_corpus_fails_in_every_mode() {
    let corpus: &[(&str, &[u8])] = &[
        ("missing banner", b"3 3 1\n1 1 1.0\n"),
        ("negative dimension", b"%%MatrixMarket matrix coordinate real general\n3 -3 1\n1 1 1.0\n"),
        ("row out of bounds", b"%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1.0\n"),
        ("row is zero", b"%%MatrixMarket matrix coordinate real general\n2 2 1\n0 1 1.0\n"),
        ("column out of bounds", b"%%MatrixMarket matrix coordinate real general\n2 2 1\n1 9 1.0\n"),
        ("missing value", b"%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1\n"),
        ("malformed value", b"%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 abc\n"),
        ("malformed index", b"%%MatrixMarket matrix coordinate real general\n2 2 1\nx 1 1.0\n"),
        ("truncated body", b"%%MatrixMarket matrix coordinate real general\n3 3 3\n1 1 1.0\n"),
        ("too many entries", b"%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 1.0\n2 2 2.0\n"),
    ];
    for (what, file) in corpus {
        let err = read_f64(file, &sequential()).unwrap_err();
        assert!(matches!(err, MarketError::InvalidFormat { .. }), "{what} (sequential): {err}");

        #[cfg(feature = "parallel")]
        {
            let err = read_f64(file, &parallel()).unwrap_err();
            assert!(matches!(err, MarketError::InvalidFormat { .. }), "{what} (parallel): {err}");
        }
    }
}

#[test]
fn parse_errors_carry_the_absolute_line() {
    let file = b"%%MatrixMarket matrix coordinate real general\n3 3 3\n1 1 1.0\n2 2 oops\n3 3 3.0\n";
    let err = read_f64(file, &sequential()).unwrap_err();
    assert_eq!(err.line(), Some(4), "{err}");

    #[cfg(feature = "parallel")]
    {
        let err = read_f64(file, &parallel()).unwrap_err();
        assert_eq!(err.line(), Some(4), "{err}");
    }
}

#[test]
fn earliest_error_wins_over_a_later_overrun() {
    // The malformed value sits one line before the excess entry; both
    // modes must report the malformed value, not the overrun behind it.
    let file = b"%%MatrixMarket matrix coordinate real general\n\
                 3 3 4\n\
                 1 1 1.0\n\
                 1 2 2.0\n\
                 2 1 3.0\n\
                 2 2 oops\n\
                 3 3 5.0\n";
    let err = read_f64(file, &sequential()).unwrap_err();
    assert!(matches!(err, MarketError::InvalidFormat { line: Some(6), .. }), "{err}");

    #[cfg(feature = "parallel")]
    {
        let err = read_f64(file, &parallel()).unwrap_err();
        assert!(matches!(err, MarketError::InvalidFormat { line: Some(6), .. }), "{err}");
    }
}

#[test]
fn array_with_excess_values() {
    let file = b"%%MatrixMarket matrix array real general\n2 2\n1\n2\n3\n4\n5\n";
    let mut values: Vec<f64> = Vec::new();
    let err = read_array(&mut &file[..], &mut values, StorageOrder::ColMajor, &sequential())
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidFormat { line: Some(7), .. }), "{err}");
}

#[test]
fn complex_file_into_real_storage() {
    let file = b"%%MatrixMarket matrix coordinate complex general\n2 2 1\n1 1 1.0 2.0\n";
    let err = read_f64(file, &sequential()).unwrap_err();
    assert!(matches!(err, MarketError::IncompatibleValueType(_)), "{err}");
}

#[test]
fn generalizing_a_symmetric_vector_is_unsupported() {
    let file = b"%%MatrixMarket vector coordinate real symmetric\n4 1\n2 1.0\n";
    let mut indices: Vec<u32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    let err = read_doublet(&mut &file[..], &mut indices, &mut values, &ReadOptions::default())
        .unwrap_err();
    assert!(matches!(err, MarketError::Unsupported(_)), "{err}");

    // Readable with generalization off.
    let options = ReadOptions { generalize_symmetry: false, ..ReadOptions::default() };
    read_doublet(&mut &file[..], &mut indices, &mut values, &options).unwrap();
    assert_eq!(values, vec![1.0]);
}

#[test]
fn generalizing_a_symmetric_array_is_unsupported() {
    let file = b"%%MatrixMarket matrix array real symmetric\n2 2\n1\n2\n3\n4\n";
    let mut values: Vec<f64> = Vec::new();
    let err = read_array(&mut &file[..], &mut values, StorageOrder::ColMajor, &ReadOptions::default())
        .unwrap_err();
    assert!(matches!(err, MarketError::Unsupported(_)), "{err}");
}

#[test]
fn integer_overflow_policies() {
    let file = b"%%MatrixMarket matrix coordinate integer general\n2 2 1\n1 1 99999999999\n";
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<i32> = Vec::new();

    let err = read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &sequential())
        .unwrap_err();
    assert!(matches!(err, MarketError::OutOfRange { .. }), "{err}");

    let options = ReadOptions {
        out_of_range: OutOfRangePolicy::Saturate,
        parallel_ok: false,
        ..ReadOptions::default()
    };
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &options).unwrap();
    assert_eq!(values, vec![i32::MAX]);
}

#[test]
fn float_overflow_policies() {
    let file = b"%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 1e999\n";
    let err = read_f64(file, &sequential()).unwrap_err();
    assert!(matches!(err, MarketError::OutOfRange { .. }), "{err}");

    let options = ReadOptions {
        out_of_range: OutOfRangePolicy::Saturate,
        parallel_ok: false,
        ..ReadOptions::default()
    };
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &options).unwrap();
    assert_eq!(values, vec![f64::INFINITY]);
}

#[test]
fn coordinate_too_large_for_index_type() {
    let file = b"%%MatrixMarket matrix coordinate real general\n70000 70000 1\n70000 1 1.0\n";
    let mut rows: Vec<u16> = Vec::new();
    let mut cols: Vec<u16> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    let err = read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &sequential())
        .unwrap_err();
    assert!(matches!(err, MarketError::OutOfRange { line: Some(3), .. }), "{err}");
}

#[test]
fn complex_storage_still_rejects_nothing_but_matching_bodies() {
    // A pattern file into complex storage is fine; the fill is 1 + 0i.
    let file = b"%%MatrixMarket matrix coordinate pattern general\n2 2 1\n2 1\n";
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<Complex<f64>> = Vec::new();
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &ReadOptions::default())
        .unwrap();
    assert_eq!(values, vec![Complex::new(1.0, 0.0)]);
}
