//! Failure modes of number construction and arithmetic (spec.md §4.6, §7).

/// A number's string form couldn't be parsed under its radix.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input was empty or contained only a sign.
    #[error("empty numeral")]
    Empty,
    /// A character wasn't a valid digit under the given radix.
    #[error("'{ch}' is not a valid digit in radix {radix}")]
    InvalidDigit {
        /// The offending character.
        ch: char,
        /// The radix being parsed under.
        radix: u32,
    },
    /// More than one decimal point, or an exponent marker in the wrong place.
    #[error("malformed numeral: {0}")]
    Malformed(String),
}

/// An arithmetic operation couldn't produce a result (spec.md §4.6's
/// "Failure" clause).
#[derive(Debug, thiserror::Error)]
pub enum ArithmeticError {
    /// Division by the canonical zero.
    #[error("division by zero")]
    DivisionByZero,
    /// `log`/`sqrt` of a negative real outside the complex layer.
    #[error("{op} of a negative real is undefined on the real layer")]
    NegativeDomain {
        /// Which operation was attempted (`"log"`, `"sqrt"`, ...).
        op: &'static str,
    },
    /// `0^0`.
    #[error("zero to the power zero")]
    ZeroToZero,
    /// The requested root index was zero.
    #[error("root index must be nonzero")]
    ZeroRoot,
    /// A transcendental series' binary-splitting recursion was cancelled.
    #[error("series evaluation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Precision(#[from] apfloat_convolution::PrecisionError),
}
