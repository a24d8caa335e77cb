use matmarket::{
    read_pattern, read_triplet, read_triplet_appending, Complex, DiagonalPolicy, ReadOptions,
    Symmetry,
};

const SYMMETRIC: &[u8] = b"%%MatrixMarket matrix coordinate real symmetric\n\
    3 3 3\n\
    2 1 5.0\n\
    3 3 7.0\n\
    3 1 2.5\n";

fn read_sym(options: &ReadOptions) -> anyhow::Result<(Vec<u32>, Vec<u32>, Vec<f64>)> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    let header = read_triplet(&mut &SYMMETRIC[..], &mut rows, &mut cols, &mut values, options)?;
    if options.generalize_symmetry {
        assert_eq!(header.symmetry, Symmetry::General);
    }
    Ok((rows, cols, values))
}

#[test]
fn symmetric_extra_zero_diagonal() -> anyhow::Result<()> {
    // Companion precedes the primary; diagonals get a zero first.
    let (rows, cols, values) = read_sym(&ReadOptions::default())?;
    assert_eq!(rows, vec![0, 1, 2, 2, 0, 2]);
    assert_eq!(cols, vec![1, 0, 2, 2, 2, 0]);
    assert_eq!(values, vec![5.0, 5.0, 0.0, 7.0, 2.5, 2.5]);
    Ok(())
}

#[test]
fn symmetric_duplicate_diagonal() -> anyhow::Result<()> {
    let options = ReadOptions {
        diagonal_policy: DiagonalPolicy::DuplicateElement,
        ..ReadOptions::default()
    };
    let (_rows, _cols, values) = read_sym(&options)?;
    assert_eq!(values, vec![5.0, 5.0, 7.0, 7.0, 2.5, 2.5]);
    Ok(())
}

#[test]
fn symmetric_appending_single_diagonal() -> anyhow::Result<()> {
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    let header = read_triplet_appending(
        &mut &SYMMETRIC[..], &mut rows, &mut cols, &mut values, &ReadOptions::default())?;
    assert_eq!(header.symmetry, Symmetry::General);

    // k=2 off-diagonal + d=1 diagonal entries: 2k + d = 5 triplets.
    assert_eq!(rows, vec![0, 1, 2, 0, 2]);
    assert_eq!(cols, vec![1, 0, 2, 2, 0]);
    assert_eq!(values, vec![5.0, 5.0, 7.0, 2.5, 2.5]);

    // After sorting, equal to an independently-authored general file.
    let general = b"%%MatrixMarket matrix coordinate real general\n\
        3 3 5\n\
        1 2 5.0\n\
        1 3 2.5\n\
        2 1 5.0\n\
        3 1 2.5\n\
        3 3 7.0\n";
    let mut g_rows: Vec<u32> = Vec::new();
    let mut g_cols: Vec<u32> = Vec::new();
    let mut g_values: Vec<f64> = Vec::new();
    read_triplet(&mut &general[..], &mut g_rows, &mut g_cols, &mut g_values, &ReadOptions::default())?;

    let mut mine: Vec<_> = rows.iter().zip(&cols).zip(&values).collect();
    let mut theirs: Vec<_> = g_rows.iter().zip(&g_cols).zip(&g_values).collect();
    mine.sort_by(|a, b| a.partial_cmp(b).unwrap());
    theirs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(mine, theirs);
    Ok(())
}

#[test]
fn generalization_off_keeps_the_body_as_stored() -> anyhow::Result<()> {
    let options = ReadOptions { generalize_symmetry: false, ..ReadOptions::default() };
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    let header = read_triplet(&mut &SYMMETRIC[..], &mut rows, &mut cols, &mut values, &options)?;
    assert_eq!(header.symmetry, Symmetry::Symmetric);
    assert_eq!(rows, vec![1, 2, 2]);
    assert_eq!(values, vec![5.0, 7.0, 2.5]);
    Ok(())
}

#[test]
fn skew_symmetric_negates_companions() -> anyhow::Result<()> {
    let file = b"%%MatrixMarket matrix coordinate real skew-symmetric\n\
        3 3 2\n\
        2 1 5.0\n\
        3 2 -1.5\n";
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &ReadOptions::default())?;
    assert_eq!(rows, vec![0, 1, 1, 2]);
    assert_eq!(cols, vec![1, 0, 2, 1]);
    assert_eq!(values, vec![-5.0, 5.0, 1.5, -1.5]);
    Ok(())
}

#[test]
fn hermitian_conjugates_companions() -> anyhow::Result<()> {
    let file = b"%%MatrixMarket matrix coordinate complex hermitian\n\
        2 2 2\n\
        2 1 3.0 4.0\n\
        2 2 9.0 0\n";
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    let mut values: Vec<Complex<f64>> = Vec::new();
    read_triplet(&mut &file[..], &mut rows, &mut cols, &mut values, &ReadOptions::default())?;
    assert_eq!(rows, vec![0, 1, 1, 1]);
    assert_eq!(cols, vec![1, 0, 1, 1]);
    assert_eq!(
        values,
        vec![
            Complex::new(3.0, -4.0), // conjugated companion first
            Complex::new(3.0, 4.0),
            Complex::new(0.0, 0.0), // diagonal zero slot
            Complex::new(9.0, 0.0),
        ]
    );
    Ok(())
}

#[test]
fn pattern_symmetric_generalizes_structure() -> anyhow::Result<()> {
    let file = b"%%MatrixMarket matrix coordinate pattern symmetric\n\
        3 3 2\n\
        2 1\n\
        3 1\n";
    let mut rows: Vec<u32> = Vec::new();
    let mut cols: Vec<u32> = Vec::new();
    read_pattern(&mut &file[..], &mut rows, &mut cols, &ReadOptions::default())?;
    assert_eq!(rows, vec![0, 1, 0, 2]);
    assert_eq!(cols, vec![1, 0, 2, 0]);
    Ok(())
}
