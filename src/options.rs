//! Read and write options.

/// How the single file entry for a diagonal element of a symmetric,
/// skew-symmetric, or hermitian coordinate matrix is expanded while
/// generalizing into a fixed-size sink. Generalization makes every body
/// line fill exactly two output slots so that chunk offsets stay
/// computable up front; a diagonal entry has no distinct companion, so
/// its second slot must be filled with something.
///
/// Appending sinks are not fixed-size and receive the diagonal entry
/// once, ignoring this policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiagonalPolicy {
    /// Fill the companion slot with a zero. The zero appears first.
    #[default]
    ExtraZeroElement,
    /// Emit the diagonal value twice.
    DuplicateElement,
}

/// What to do when a numeric field parses but does not fit the target
/// value type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutOfRangePolicy {
    /// Fail the read with [`crate::MarketError::OutOfRange`].
    #[default]
    Error,
    /// Clamp integers to the type's min/max; floats overflow to
    /// infinity per IEEE semantics.
    Saturate,
}

#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Target chunk size for the parsing step, in bytes. Chunks are
    /// extended to the next line boundary.
    pub chunk_size_bytes: usize,

    /// Expand symmetries other than general: for (row, col, value) also
    /// produce (col, row, value), negated for skew-symmetric and
    /// conjugated for hermitian. Only the lower triangle need be present
    /// in the file. A generalized read reports `Symmetry::General`.
    pub generalize_symmetry: bool,

    /// Diagonal handling under `generalize_symmetry`, for fixed-size sinks.
    pub diagonal_policy: DiagonalPolicy,

    /// Behavior for numeric fields outside the target type's range.
    pub out_of_range: OutOfRangePolicy,

    /// Allow the parallel implementation.
    pub parallel_ok: bool,

    /// Worker threads for the parallel pipeline. 0 means one per
    /// available CPU.
    pub num_threads: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            chunk_size_bytes: 2 << 20,
            generalize_symmetry: true,
            diagonal_policy: DiagonalPolicy::default(),
            out_of_range: OutOfRangePolicy::default(),
            parallel_ok: true,
            num_threads: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WriteOptions {
    /// Entries rendered per chunk.
    pub chunk_size_values: usize,

    /// Digits after the decimal point for floating-point values.
    /// `None` writes the shortest form that round-trips.
    pub precision: Option<usize>,

    /// Allow the parallel implementation.
    pub parallel_ok: bool,

    /// Worker threads for parallel rendering. 0 means one per available CPU.
    pub num_threads: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            chunk_size_values: 2 << 12,
            precision: None,
            parallel_ok: true,
            num_threads: 0,
        }
    }
}
