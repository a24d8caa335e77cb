//! Value types readable from and writable to Matrix Market bodies.
//!
//! [`MarketValue`] is implemented for the integer and float primitives,
//! `bool`, [`Complex`] of any of those, and the no-value [`Placeholder`]
//! used for pattern files. The trait covers everything the body codec
//! needs from a value: text parse and format, the field written to the
//! header, and the negate/conjugate hooks symmetry generalization uses.

use std::fmt::Write as _;
use std::io::BufRead;

use crate::error::{MarketError, Result};
use crate::header::{Field, Header};
use crate::options::{OutOfRangePolicy, ReadOptions};
use crate::read::read_body_no_adapters;
use crate::sink::{ComplexAdapter, EntrySink};

/// A complex number, written in Matrix Market bodies as two
/// space-separated reals (real part first).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Complex { re, im }
    }
}

/// Value stand-in for pattern files, which carry coordinates only.
/// Parsing a `Placeholder` consumes nothing from the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placeholder;

pub trait MarketValue: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Field written to the header for this type.
    const FIELD: Field;

    /// False when concurrent element writes may touch shared storage
    /// words (bit-packed boolean layouts); forces sequential parsing.
    const PARALLEL_WRITES_SAFE: bool = true;

    fn zero() -> Self;

    /// Substitute for the missing value column of pattern files.
    fn pattern_default() -> Self;

    /// Negation, used by skew-symmetric generalization.
    fn negated(self) -> Self;

    /// Complex conjugate, used by hermitian generalization. Identity for
    /// real-valued types.
    fn conjugated(self) -> Self {
        self
    }

    /// Parse one value from the start of `text`, skipping leading blanks,
    /// and return it with the rest of the line.
    fn parse(text: &str, policy: OutOfRangePolicy) -> Result<(Self, &str)>;

    /// Append the textual form to `out`. `precision` is the digit count
    /// after the decimal point for floating-point types; `None` writes
    /// the shortest round-trippable form.
    fn format_into(self, out: &mut String, precision: Option<usize>);

    /// Whether this type can represent values of a file's declared field.
    fn check_field(field: Field) -> Result<()> {
        if field == Field::Complex {
            Err(MarketError::IncompatibleValueType(
                "file holds complex values but the target storage is not complex".into(),
            ))
        } else {
            Ok(())
        }
    }

    /// Body-read hook. The default rejects complex files; complex value
    /// types override it to splice in the zero-imaginary adapter when the
    /// file's field is real or integer.
    #[doc(hidden)]
    fn read_body_with<R: BufRead, S: EntrySink<Value = Self>>(
        reader: &mut R,
        header: &Header,
        sink: S,
        options: &ReadOptions,
    ) -> Result<()> {
        Self::check_field(header.field)?;
        read_body_no_adapters(reader, header, sink, options)
    }
}

/// Split the next blank-delimited token off `text`. Fields are separated
/// by spaces or tabs; line terminators never reach this function.
pub(crate) fn next_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start_matches([' ', '\t']);
    if text.is_empty() {
        return None;
    }
    let end = text.find([' ', '\t']).unwrap_or(text.len());
    Some((&text[..end], &text[end..]))
}

fn missing_value() -> MarketError {
    MarketError::invalid("missing value field")
}

/// "inf"/"infinity" tokens are deliberate; an infinite parse result from
/// any other token is an overflow.
fn token_declares_infinity(token: &str) -> bool {
    let t = token.trim_start_matches(['+', '-']);
    t.eq_ignore_ascii_case("inf") || t.eq_ignore_ascii_case("infinity")
}

macro_rules! impl_market_float {
    ($($t:ty),* $(,)?) => {$(
        impl MarketValue for $t {
            const FIELD: Field = Field::Real;

            fn zero() -> Self {
                0.0
            }

            fn pattern_default() -> Self {
                1.0
            }

            fn negated(self) -> Self {
                -self
            }

            fn parse(text: &str, policy: OutOfRangePolicy) -> Result<(Self, &str)> {
                let (tok, rest) = next_token(text).ok_or_else(missing_value)?;
                let value: $t = tok.parse().map_err(|_| {
                    MarketError::invalid(format!("invalid floating-point value '{tok}'"))
                })?;
                if value.is_infinite()
                    && policy == OutOfRangePolicy::Error
                    && !token_declares_infinity(tok)
                {
                    return Err(MarketError::out_of_range(format!(
                        "value '{tok}' overflows the target floating-point type"
                    )));
                }
                Ok((value, rest))
            }

            fn format_into(self, out: &mut String, precision: Option<usize>) {
                let _ = match precision {
                    Some(p) => write!(out, "{:.*}", p, self),
                    None => write!(out, "{}", self),
                };
            }
        }
    )*};
}

impl_market_float!(f32, f64);

macro_rules! impl_market_int {
    ($($t:ty),* $(,)?) => {$(
        impl MarketValue for $t {
            const FIELD: Field = Field::Integer;

            fn zero() -> Self {
                0
            }

            fn pattern_default() -> Self {
                1
            }

            fn negated(self) -> Self {
                self.wrapping_neg()
            }

            fn parse(text: &str, policy: OutOfRangePolicy) -> Result<(Self, &str)> {
                let (tok, rest) = next_token(text).ok_or_else(missing_value)?;
                match tok.parse::<$t>() {
                    Ok(value) => Ok((value, rest)),
                    Err(_) => {
                        // Distinguish overflow from a malformed token.
                        let wide: i128 = tok.parse().map_err(|_| {
                            MarketError::invalid(format!("invalid integer value '{tok}'"))
                        })?;
                        match policy {
                            OutOfRangePolicy::Saturate => {
                                let clamped = if wide < <$t>::MIN as i128 {
                                    <$t>::MIN
                                } else {
                                    <$t>::MAX
                                };
                                Ok((clamped, rest))
                            }
                            OutOfRangePolicy::Error => Err(MarketError::out_of_range(format!(
                                "integer value '{tok}' does not fit the target type"
                            ))),
                        }
                    }
                }
            }

            fn format_into(self, out: &mut String, _precision: Option<usize>) {
                let _ = write!(out, "{self}");
            }
        }
    )*};
}

impl_market_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl MarketValue for bool {
    const FIELD: Field = Field::Integer;

    // Dense boolean storage is commonly bit-packed, where neighboring
    // elements share a storage word.
    const PARALLEL_WRITES_SAFE: bool = false;

    fn zero() -> Self {
        false
    }

    fn pattern_default() -> Self {
        true
    }

    fn negated(self) -> Self {
        self
    }

    // Any numeric text is accepted; nonzero means true.
    fn parse(text: &str, policy: OutOfRangePolicy) -> Result<(Self, &str)> {
        let (value, rest) = f64::parse(text, policy)?;
        Ok((value != 0.0, rest))
    }

    fn format_into(self, out: &mut String, _precision: Option<usize>) {
        out.push_str(if self { "1" } else { "0" });
    }
}

impl MarketValue for Placeholder {
    const FIELD: Field = Field::Pattern;

    fn zero() -> Self {
        Placeholder
    }

    fn pattern_default() -> Self {
        Placeholder
    }

    fn negated(self) -> Self {
        self
    }

    fn parse(text: &str, _policy: OutOfRangePolicy) -> Result<(Self, &str)> {
        Ok((Placeholder, text))
    }

    fn format_into(self, _out: &mut String, _precision: Option<usize>) {}

    fn check_field(_field: Field) -> Result<()> {
        Ok(())
    }
}

impl<T: MarketValue> MarketValue for Complex<T> {
    const FIELD: Field = Field::Complex;

    const PARALLEL_WRITES_SAFE: bool = T::PARALLEL_WRITES_SAFE;

    fn zero() -> Self {
        Complex::new(T::zero(), T::zero())
    }

    fn pattern_default() -> Self {
        Complex::new(T::pattern_default(), T::zero())
    }

    fn negated(self) -> Self {
        Complex::new(self.re.negated(), self.im.negated())
    }

    fn conjugated(self) -> Self {
        Complex::new(self.re, self.im.negated())
    }

    fn parse(text: &str, policy: OutOfRangePolicy) -> Result<(Self, &str)> {
        let (re, rest) = T::parse(text, policy)?;
        let (im, rest) = T::parse(rest, policy)?;
        Ok((Complex::new(re, im), rest))
    }

    fn format_into(self, out: &mut String, precision: Option<usize>) {
        self.re.format_into(out, precision);
        out.push(' ');
        self.im.format_into(out, precision);
    }

    // Real and integer files load fine; the imaginary part is zeroed.
    fn check_field(_field: Field) -> Result<()> {
        Ok(())
    }

    fn read_body_with<R: BufRead, S: EntrySink<Value = Self>>(
        reader: &mut R,
        header: &Header,
        sink: S,
        options: &ReadOptions,
    ) -> Result<()> {
        if header.field == Field::Complex {
            read_body_no_adapters(reader, header, sink, options)
        } else {
            read_body_no_adapters(reader, header, ComplexAdapter::new(sink), options)
        }
    }
}
