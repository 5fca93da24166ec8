//! Group code value types
//!
//! Determines how to interpret the value line that follows a DXF group code,
//! and converts the raw text into a typed value.

use crate::error::{DxfError, Result};
use crate::types::Handle;

/// Type of value associated with a group code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCodeValueType {
    /// No value or unknown
    None,

    /// String value
    String,

    /// Boolean value (0 or 1)
    Bool,

    /// 8-bit integer
    Byte,

    /// 16-bit signed integer
    Int16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    /// Double-precision floating-point
    Double,

    /// Binary data (hex string)
    BinaryData,

    /// Object handle (hex string)
    Handle,
}

impl GroupCodeValueType {
    /// Determine the value type from a raw integer group code.
    pub fn from_raw_code(code_num: i32) -> Self {
        match code_num {
            // Handles that live inside the string ranges
            5 | 105 => GroupCodeValueType::Handle,

            // String values (0-9, 100-109, 300-309, 999)
            0..=9 | 100..=109 | 300..=309 | 999 => GroupCodeValueType::String,

            // Floating-point values (10-59, 110-149, 210-239, 460-469)
            10..=59 | 110..=149 | 210..=239 | 460..=469 => GroupCodeValueType::Double,

            // 16-bit integers (60-79, 170-179, 270-279, 370-389, 400-409)
            60..=79 | 170..=179 | 270..=279 | 370..=389 | 400..=409 => {
                GroupCodeValueType::Int16
            }

            // 8-bit integers (280-289)
            280..=289 => GroupCodeValueType::Byte,

            // 32-bit integers (90-99, 420-429, 440-459)
            90..=99 | 420..=429 | 440..=459 => GroupCodeValueType::Int32,

            // 64-bit integers (160-169)
            160..=169 => GroupCodeValueType::Int64,

            // Boolean values (290-299)
            290..=299 => GroupCodeValueType::Bool,

            // Binary data (310-319)
            310..=319 => GroupCodeValueType::BinaryData,

            // Handle values (320-369, 390-399, 480-481)
            320..=369 | 390..=399 | 480..=481 => GroupCodeValueType::Handle,

            // String handles (410-419, 430-439, 470-479)
            410..=419 | 430..=439 | 470..=479 => GroupCodeValueType::String,

            // Extended data
            1004 => GroupCodeValueType::BinaryData,
            1005 => GroupCodeValueType::Handle,
            1000..=1009 => GroupCodeValueType::String,
            1010..=1059 => GroupCodeValueType::Double,
            1060..=1070 => GroupCodeValueType::Int16,
            1071 => GroupCodeValueType::Int32,

            _ => GroupCodeValueType::None,
        }
    }

    /// Whether value lines of this class keep surrounding whitespace.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            GroupCodeValueType::String | GroupCodeValueType::BinaryData | GroupCodeValueType::None
        )
    }

    /// The coercion rule implied by this class.
    pub fn coercion(self) -> Coercion {
        match self {
            GroupCodeValueType::Double => Coercion::Double,
            GroupCodeValueType::Bool
            | GroupCodeValueType::Byte
            | GroupCodeValueType::Int16
            | GroupCodeValueType::Int32
            | GroupCodeValueType::Int64 => Coercion::Integer,
            GroupCodeValueType::Handle => Coercion::Hex,
            GroupCodeValueType::String
            | GroupCodeValueType::BinaryData
            | GroupCodeValueType::None => Coercion::Verbatim,
        }
    }
}

/// How a raw value line is converted before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Keep the text as read
    Verbatim,
    /// Floating-point literal
    Double,
    /// Decimal integer
    Integer,
    /// Hexadecimal handle
    Hex,
}

/// A value line after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Text(String),
    Double(f64),
    Int(i64),
    Handle(Handle),
}

/// Convert the raw value of a tag according to `coercion`.
///
/// Numeric text that does not parse is reported as
/// [`DxfError::MalformedValue`] carrying the code and line.
pub fn coerce(code: i32, raw: &str, line: usize, coercion: Coercion) -> Result<CoercedValue> {
    let malformed = || DxfError::MalformedValue {
        code,
        line,
        value: raw.to_string(),
    };

    match coercion {
        Coercion::Verbatim => Ok(CoercedValue::Text(raw.to_string())),
        Coercion::Double => raw
            .trim()
            .parse::<f64>()
            .map(CoercedValue::Double)
            .map_err(|_| malformed()),
        Coercion::Integer => parse_integer(raw).map(CoercedValue::Int).ok_or_else(malformed),
        Coercion::Hex => Handle::parse_hex(raw)
            .map(CoercedValue::Handle)
            .ok_or_else(malformed),
    }
}

/// Decimal integer; a finite float literal is truncated (`70\n1.0`).
fn parse_integer(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
        .map(|v| v.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_from_code() {
        assert_eq!(GroupCodeValueType::from_raw_code(0), GroupCodeValueType::String);
        assert_eq!(GroupCodeValueType::from_raw_code(8), GroupCodeValueType::String);
        assert_eq!(GroupCodeValueType::from_raw_code(5), GroupCodeValueType::Handle);
        assert_eq!(GroupCodeValueType::from_raw_code(105), GroupCodeValueType::Handle);
        assert_eq!(GroupCodeValueType::from_raw_code(10), GroupCodeValueType::Double);
        assert_eq!(GroupCodeValueType::from_raw_code(230), GroupCodeValueType::Double);
        assert_eq!(GroupCodeValueType::from_raw_code(62), GroupCodeValueType::Int16);
        assert_eq!(GroupCodeValueType::from_raw_code(90), GroupCodeValueType::Int32);
        assert_eq!(GroupCodeValueType::from_raw_code(290), GroupCodeValueType::Bool);
        assert_eq!(GroupCodeValueType::from_raw_code(310), GroupCodeValueType::BinaryData);
        assert_eq!(GroupCodeValueType::from_raw_code(330), GroupCodeValueType::Handle);
        assert_eq!(GroupCodeValueType::from_raw_code(430), GroupCodeValueType::String);
        assert_eq!(GroupCodeValueType::from_raw_code(9999), GroupCodeValueType::None);
    }

    #[test]
    fn test_coerce_double() {
        assert_eq!(
            coerce(40, " 2.500000", 3, Coercion::Double).unwrap(),
            CoercedValue::Double(2.5)
        );
    }

    #[test]
    fn test_coerce_integer_accepts_float_literal() {
        assert_eq!(coerce(70, "1.0", 1, Coercion::Integer).unwrap(), CoercedValue::Int(1));
        assert_eq!(coerce(62, "  256", 1, Coercion::Integer).unwrap(), CoercedValue::Int(256));
    }

    #[test]
    fn test_coerce_hex() {
        assert_eq!(
            coerce(5, "1A", 2, Coercion::Hex).unwrap(),
            CoercedValue::Handle(Handle::new(0x1A))
        );
    }

    #[test]
    fn test_coerce_verbatim_keeps_spaces() {
        assert_eq!(
            coerce(1, "  two  words ", 2, Coercion::Verbatim).unwrap(),
            CoercedValue::Text("  two  words ".to_string())
        );
    }

    #[test]
    fn test_malformed_double() {
        let err = coerce(40, "abc", 14, Coercion::Double).unwrap_err();
        match err {
            DxfError::MalformedValue { code, line, value } => {
                assert_eq!(code, 40);
                assert_eq!(line, 14);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
