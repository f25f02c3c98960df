//! Capacity spec parser
//!
//! Turns a configuration string such as `"0-3:1024,4-7:512,8:256"` into a list of
//! [`Assignment`]s. Parsing is pure: bounds of the table (`N`, `MAX`) are checked later
//! by the [`CapacityStore`](crate::CapacityStore).
//!
//! # Grammar
//!
//! ```text
//! config := spec (',' spec)*
//! spec   := index ':' value | index '-' index ':' value
//! ```
//!
//! Integers accept decimal, `0x` hex and leading-`0` octal literals.

use crate::error::{SpecError, SpecField};
use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Size of the spec buffer; a spec must be strictly shorter.
pub const MAX_SPEC_LEN: usize = 64;

/// Instruction to set units `start..=end` to `value`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Assignment {
    start: u32,
    end: u32,
    value: u64,
}

impl Assignment {
    /// Assignment for a single unit
    #[inline]
    #[must_use]
    pub fn single(unit: u32, value: u64) -> Self {
        Self {
            start: unit,
            end: unit,
            value,
        }
    }

    /// Assignment for an inclusive range of units
    ///
    /// # Errors
    /// Returns [`SpecError::InvertedRange`] if `start > end`
    pub fn range(start: u32, end: u32, value: u64) -> Result<Self, SpecError> {
        if start > end {
            return Err(SpecError::InvertedRange { start, end });
        }
        Ok(Self { start, end, value })
    }

    /// First unit
    #[inline]
    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last unit (inclusive)
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Capacity to write
    #[inline]
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Units covered
    #[inline]
    #[must_use]
    pub fn units(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Number of units covered
    #[inline]
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}:{}", self.start, self.value)
        } else {
            write!(f, "{}-{}:{}", self.start, self.end, self.value)
        }
    }
}

impl FromStr for Assignment {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_spec(trim_space(s))
    }
}

/// Parse a full configuration string
///
/// Whitespace around the input and around each spec is ignored; empty specs
/// (`"0:1,,2:3"`, trailing `,`) are skipped. All-whitespace input yields an
/// empty list.
///
/// # Errors
/// Returns the first [`SpecError`] encountered, in input order
pub fn parse(text: &str) -> Result<Vec<Assignment>, SpecError> {
    text.split(',')
        .map(trim_space)
        .filter(|spec| !spec.is_empty())
        .map(parse_spec)
        .collect()
}

fn parse_spec(spec: &str) -> Result<Assignment, SpecError> {
    if spec.len() >= MAX_SPEC_LEN {
        return Err(SpecError::SpecTooLong {
            len: spec.len(),
            limit: MAX_SPEC_LEN - 1,
        });
    }

    let (units, value) = spec
        .split_once(':')
        .ok_or_else(|| SpecError::MissingSeparator(spec.to_string()))?;

    let value = parse_literal(value).map_err(|e| e.into_spec_error(SpecField::Value, spec))?;

    let (start, end) = match units.split_once('-') {
        Some((start, end)) => (
            parse_unit(start, SpecField::Start, spec)?,
            parse_unit(end, SpecField::End, spec)?,
        ),
        None => {
            let unit = parse_unit(units, SpecField::Unit, spec)?;
            (unit, unit)
        }
    };

    Assignment::range(start, end, value)
}

fn parse_unit(literal: &str, field: SpecField, spec: &str) -> Result<u32, SpecError> {
    parse_literal(literal)
        .and_then(|v| u32::try_from(v).map_err(|_| LiteralError::Overflow))
        .map_err(|e| e.into_spec_error(field, spec))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralError {
    Malformed,
    Overflow,
}

impl LiteralError {
    fn into_spec_error(self, field: SpecField, spec: &str) -> SpecError {
        SpecError::InvalidInteger {
            field,
            spec: spec.to_string(),
            overflow: self == Self::Overflow,
        }
    }
}

/// Unsigned integer literal with radix auto-detection
fn parse_literal(literal: &str) -> Result<u64, LiteralError> {
    let literal = trim_space(literal);
    let literal = literal.strip_prefix('+').unwrap_or(literal);

    let (radix, digits) = if let Some(hex) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        (16, hex)
    } else if literal.len() > 1 && literal.starts_with('0') {
        (8, &literal[1..])
    } else {
        (10, literal)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(LiteralError::Malformed);
    }

    // Only overflow remains once every digit is valid for the radix
    u64::from_str_radix(digits, radix).map_err(|_| LiteralError::Overflow)
}

/// C `isspace` set: ASCII whitespace plus vertical tab
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

fn trim_space(s: &str) -> &str {
    s.trim_matches(is_space)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_unit() {
        let parsed = parse("0:512").unwrap();
        assert_eq!(parsed, vec![Assignment::single(0, 512)]);
    }

    #[test]
    fn parse_range_and_list() {
        let parsed = parse("0-3:1024,4-7:512,8:256").unwrap();
        assert_eq!(
            parsed,
            vec![
                Assignment::range(0, 3, 1024).unwrap(),
                Assignment::range(4, 7, 512).unwrap(),
                Assignment::single(8, 256),
            ]
        );
    }

    #[test]
    fn parse_empty_and_whitespace() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \t\n").unwrap().is_empty());
    }

    #[test]
    fn parse_skips_empty_specs() {
        let parsed = parse(" 0:1 , ,2:3,\n").unwrap();
        assert_eq!(
            parsed,
            vec![Assignment::single(0, 1), Assignment::single(2, 3)]
        );
    }

    #[test]
    fn parse_trims_integers() {
        let parsed = parse("1 - 2 : 300").unwrap();
        assert_eq!(parsed, vec![Assignment::range(1, 2, 300).unwrap()]);
    }

    #[test]
    fn parse_radix_prefixes() {
        let parsed = parse("0x2:0x200,010:0400,+3:+7").unwrap();
        assert_eq!(
            parsed,
            vec![
                Assignment::single(2, 512),
                Assignment::single(8, 256),
                Assignment::single(3, 7),
            ]
        );
    }

    #[test]
    fn parse_zero_is_decimal() {
        assert_eq!(parse("0:0").unwrap(), vec![Assignment::single(0, 0)]);
    }

    #[test]
    fn parse_missing_colon() {
        assert!(matches!(
            parse("0-3"),
            Err(SpecError::MissingSeparator(spec)) if spec == "0-3"
        ));
    }

    #[test]
    fn parse_bad_value() {
        assert!(matches!(
            parse("0:abc"),
            Err(SpecError::InvalidInteger {
                field: SpecField::Value,
                overflow: false,
                ..
            })
        ));
        assert!(matches!(
            parse("0:"),
            Err(SpecError::InvalidInteger {
                field: SpecField::Value,
                ..
            })
        ));
    }

    #[test]
    fn parse_bad_units() {
        assert!(matches!(
            parse("x:1"),
            Err(SpecError::InvalidInteger {
                field: SpecField::Unit,
                ..
            })
        ));
        assert!(matches!(
            parse("-3:1"),
            Err(SpecError::InvalidInteger {
                field: SpecField::Start,
                ..
            })
        ));
        assert!(matches!(
            parse("1-:1"),
            Err(SpecError::InvalidInteger {
                field: SpecField::End,
                ..
            })
        ));
        assert!(matches!(
            parse("08:1"),
            Err(SpecError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn parse_overflow() {
        let err = parse("4294967296:1").unwrap_err();
        assert!(err.is_overflow());

        let err = parse("0:18446744073709551616").unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn parse_inverted_range() {
        assert_eq!(
            parse("5-2:100"),
            Err(SpecError::InvertedRange { start: 5, end: 2 })
        );
    }

    #[test]
    fn parse_spec_length_limit() {
        let padded = format!("{}1:1", "0".repeat(MAX_SPEC_LEN - 4));
        assert_eq!(padded.len(), MAX_SPEC_LEN - 1);
        assert!(parse(&padded).is_ok());

        let too_long = format!("0{padded}");
        assert!(matches!(
            parse(&too_long),
            Err(SpecError::SpecTooLong { len: 64, limit: 63 })
        ));
    }

    #[test]
    fn parse_stops_at_first_error() {
        let err = parse("0:1,bad,5-2:1").unwrap_err();
        assert!(matches!(err, SpecError::MissingSeparator(_)));
    }

    #[test]
    fn assignment_display_and_from_str() {
        let single: Assignment = "3:512".parse().unwrap();
        assert_eq!(single.to_string(), "3:512");

        let range: Assignment = " 0x0-0x3 : 1024 ".parse().unwrap();
        assert_eq!(range.to_string(), "0-3:1024");
        assert_eq!(range.unit_count(), 4);
        assert_eq!(range.units().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }
}
