//! Field coercion for loosely typed staging text
//!
//! Every helper here is total: malformed input degrades to "no value" and
//! never aborts the row. The caller decides whether an absent value matters.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trim a staging cell, mapping blank text to `None`
pub fn non_blank(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Owned variant of [`non_blank`] for dimension attributes
pub fn blank_to_none(raw: &str) -> Option<String> {
    non_blank(raw).map(str::to_string)
}

/// Parse an optional floating point measure
pub fn parse_optional_f64(raw: &str) -> Option<f64> {
    non_blank(raw)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse an optional integer attribute, accepting decimal-looking text
pub fn parse_optional_i64(raw: &str) -> Option<i64> {
    coerce_identifier(raw).value()
}

/// Three-valued reading of a yes/no text flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaidWithPoints {
    Yes,
    No,
    Unknown,
}

impl PaidWithPoints {
    /// Case-insensitive `YES` / `NO`; anything else is `Unknown`
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            s if s.eq_ignore_ascii_case("yes") => PaidWithPoints::Yes,
            s if s.eq_ignore_ascii_case("no") => PaidWithPoints::No,
            _ => PaidWithPoints::Unknown,
        }
    }

    /// Warehouse encoding: 1, 0 or null
    pub fn as_flag(&self) -> Option<i32> {
        match self {
            PaidWithPoints::Yes => Some(1),
            PaidWithPoints::No => Some(0),
            PaidWithPoints::Unknown => None,
        }
    }

    pub fn from_flag(flag: Option<i32>) -> Self {
        match flag {
            Some(1) => PaidWithPoints::Yes,
            Some(0) => PaidWithPoints::No,
            _ => PaidWithPoints::Unknown,
        }
    }
}

/// Outcome of coercing an identifier cell to an integer key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdCoercion {
    Value(i64),
    Blank,
    Malformed,
}

impl IdCoercion {
    pub fn value(&self) -> Option<i64> {
        match self {
            IdCoercion::Value(v) => Some(*v),
            IdCoercion::Blank | IdCoercion::Malformed => None,
        }
    }
}

/// Coerce identifier text to an integer key.
///
/// Policy: integer text is taken as is; decimal-looking text (`"3.0"`,
/// `"7.9"`) truncates toward zero, because the upstream extract writes
/// integer columns containing gaps as floats. Blank text is `Blank`;
/// anything else (including non-finite or out of range numbers) is
/// `Malformed`.
pub fn coerce_identifier(raw: &str) -> IdCoercion {
    let Some(text) = non_blank(raw) else {
        return IdCoercion::Blank;
    };

    if let Ok(v) = text.parse::<i64>() {
        return IdCoercion::Value(v);
    }

    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v.trunc() >= i64::MIN as f64 && v.trunc() < i64::MAX as f64 => {
            IdCoercion::Value(v.trunc() as i64)
        }
        _ => {
            debug!("Identifier '{}' is not numeric", text);
            IdCoercion::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_normalization() {
        assert_eq!(blank_to_none(""), None);
        assert_eq!(blank_to_none("   "), None);
        assert_eq!(blank_to_none(" East "), Some("East".to_string()));
    }

    #[test]
    fn test_paid_with_points_is_case_insensitive() {
        assert_eq!(PaidWithPoints::parse("Yes"), PaidWithPoints::Yes);
        assert_eq!(PaidWithPoints::parse("YES"), PaidWithPoints::Yes);
        assert_eq!(PaidWithPoints::parse(" no "), PaidWithPoints::No);
        assert_eq!(PaidWithPoints::parse("N"), PaidWithPoints::Unknown);
        assert_eq!(PaidWithPoints::parse(""), PaidWithPoints::Unknown);
        assert_eq!(PaidWithPoints::parse("true"), PaidWithPoints::Unknown);
    }

    #[test]
    fn test_paid_with_points_flag_encoding() {
        for flag in [
            PaidWithPoints::Yes,
            PaidWithPoints::No,
            PaidWithPoints::Unknown,
        ] {
            assert_eq!(PaidWithPoints::from_flag(flag.as_flag()), flag);
        }
        assert_eq!(PaidWithPoints::Yes.as_flag(), Some(1));
        assert_eq!(PaidWithPoints::Unknown.as_flag(), None);
    }

    #[test]
    fn test_identifier_coercion() {
        assert_eq!(coerce_identifier("42"), IdCoercion::Value(42));
        assert_eq!(coerce_identifier(" 7 "), IdCoercion::Value(7));
        assert_eq!(coerce_identifier("3.0"), IdCoercion::Value(3));
        assert_eq!(coerce_identifier("7.9"), IdCoercion::Value(7));
        assert_eq!(coerce_identifier("-2.5"), IdCoercion::Value(-2));
        assert_eq!(coerce_identifier(""), IdCoercion::Blank);
        assert_eq!(coerce_identifier("  "), IdCoercion::Blank);
        assert_eq!(coerce_identifier("C-12"), IdCoercion::Malformed);
        assert_eq!(coerce_identifier("NaN"), IdCoercion::Malformed);
        assert_eq!(coerce_identifier("inf"), IdCoercion::Malformed);
    }

    #[test]
    fn test_optional_measures() {
        assert_eq!(parse_optional_f64("100.5"), Some(100.5));
        assert_eq!(parse_optional_f64(""), None);
        assert_eq!(parse_optional_f64("n/a"), None);
        assert_eq!(parse_optional_i64("1200"), Some(1200));
        assert_eq!(parse_optional_i64("1200.0"), Some(1200));
        assert_eq!(parse_optional_i64("lots"), None);
    }
}
