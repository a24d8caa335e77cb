//! Coordinate index types for sink and source storage.

/// Storage type for row and column indices. The parser hands sinks
/// 0-based `u64` coordinates; sinks convert through this trait, and
/// formatters convert back for writing.
pub trait MarketIndex: Copy + Default + Send + Sync + 'static {
    /// Convert a 0-based coordinate. `None` when it does not fit, which
    /// the sink reports as [`crate::MarketError::OutOfRange`].
    fn from_coord(value: u64) -> Option<Self>;

    /// Back to a 0-based coordinate for writing.
    fn as_coord(self) -> u64;
}

macro_rules! impl_market_index {
    ($($t:ty),* $(,)?) => {$(
        impl MarketIndex for $t {
            #[inline]
            fn from_coord(value: u64) -> Option<Self> {
                Self::try_from(value).ok()
            }

            #[inline]
            fn as_coord(self) -> u64 {
                self as u64
            }
        }
    )*};
}

impl_market_index!(u16, u32, u64, usize, i32, i64);
