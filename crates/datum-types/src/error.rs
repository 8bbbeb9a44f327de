use datum_charset::CharsetError;
use thiserror::Error;

/// Classification of a conversion that produced a usable value.
///
/// Soft outcomes always travel together with the (clamped, rounded or truncated)
/// value they describe; see [`Lossy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    Exact,
    /// The value's form was simplified: trailing garbage dropped, digits rounded away
    /// or text cut to the column width.
    Truncated,
    /// The input was not a well-formed value of the target kind and was replaced by the
    /// closest representable one.
    TruncatedWrongValue,
    /// The magnitude exceeded the target range and was clamped to the nearest bound.
    Overflow,
}

impl Outcome {
    #[must_use]
    pub fn is_exact(self) -> bool {
        self == Outcome::Exact
    }

    fn severity(self) -> u8 {
        match self {
            Outcome::Exact => 0,
            Outcome::Truncated => 1,
            Outcome::TruncatedWrongValue => 2,
            Outcome::Overflow => 3,
        }
    }

    /// Keeps the more severe of two outcomes.
    #[must_use]
    pub fn merge(self, other: Outcome) -> Outcome {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// A value paired with the [`Outcome`] of the operation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lossy<T> {
    pub value: T,
    pub outcome: Outcome,
}

impl<T> Lossy<T> {
    pub fn exact(value: T) -> Self {
        Self {
            value,
            outcome: Outcome::Exact,
        }
    }

    pub fn new(value: T, outcome: Outcome) -> Self {
        Self { value, outcome }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lossy<U> {
        Lossy {
            value: f(self.value),
            outcome: self.outcome,
        }
    }

    /// Merges `outcome` into the current one, keeping the more severe.
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = self.outcome.merge(outcome);
        self
    }

    pub fn into_parts(self) -> (T, Outcome) {
        (self.value, self.outcome)
    }
}

/// Hard conversion failures. Unlike [`Outcome`], these carry no usable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("incorrect {kind} value: '{value}'")]
    Malformed { kind: &'static str, value: String },
    #[error("{kind} value is out of range: '{value}'")]
    OutOfRange { kind: &'static str, value: String },
    #[error("cannot convert datum from {from} to type {to}")]
    Unsupported { from: &'static str, to: &'static str },
    #[error("{0} has no textual representation")]
    Representation(&'static str),
    #[error(transparent)]
    Charset(#[from] CharsetError),
}

impl TypeError {
    pub(crate) fn malformed(kind: &'static str, value: impl Into<String>) -> Self {
        TypeError::Malformed {
            kind,
            value: value.into(),
        }
    }

    pub(crate) fn out_of_range(kind: &'static str, value: impl ToString) -> Self {
        TypeError::OutOfRange {
            kind,
            value: value.to_string(),
        }
    }
}

pub type TypeResult<T> = Result<T, TypeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_most_severe() {
        use Outcome::*;
        assert_eq!(Exact.merge(Truncated), Truncated);
        assert_eq!(Truncated.merge(Exact), Truncated);
        assert_eq!(Truncated.merge(TruncatedWrongValue), TruncatedWrongValue);
        assert_eq!(Overflow.merge(TruncatedWrongValue), Overflow);
        assert_eq!(Exact.merge(Exact), Exact);
    }

    #[test]
    fn charset_errors_convert() {
        let err: TypeError = CharsetError::UnknownCharset("utf16".to_string()).into();
        assert_eq!(err.to_string(), "unknown character set: 'utf16'");
    }
}
