//! DXF stream reader trait and the tag type it produces

use crate::error::Result;
use crate::io::dxf::group_code_value::{coerce, CoercedValue, Coercion, GroupCodeValueType};

/// One group code / value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// The DXF group code
    pub code: i32,

    /// Raw value line. String-class values keep their inner and
    /// surrounding spaces; numeric classes are trimmed.
    pub value: String,

    /// Physical line number of the value line (1-based)
    pub line: usize,
}

impl Tag {
    /// Create a tag that did not come from a stream (line 0).
    pub fn new(code: i32, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
            line: 0,
        }
    }

    /// Value class of this tag's group code
    pub fn value_type(&self) -> GroupCodeValueType {
        GroupCodeValueType::from_raw_code(self.code)
    }

    /// Whether this tag starts a new entity, section or table
    pub fn is_entity_start(&self) -> bool {
        self.code == 0
    }

    /// Coerce the raw value with an explicit rule
    pub fn coerce(&self, coercion: Coercion) -> Result<CoercedValue> {
        coerce(self.code, &self.value, self.line, coercion)
    }

    /// Get value as double
    pub fn as_double(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }

    /// Get value as integer
    pub fn as_int(&self) -> Option<i64> {
        match self.coerce(Coercion::Integer) {
            Ok(CoercedValue::Int(v)) => Some(v),
            _ => None,
        }
    }
}

/// Trait for reading DXF tags from a stream
pub trait DxfStreamReader {
    /// Read the next tag; `Ok(None)` at a clean end of stream.
    fn read_tag(&mut self) -> Result<Option<Tag>>;

    /// Peek at the next code without consuming it
    fn peek_code(&mut self) -> Result<Option<i32>>;

    /// Push a tag back to be returned by the next `read_tag` call
    fn push_back(&mut self, tag: Tag);

    /// Number of physical lines consumed so far
    fn line_number(&self) -> usize;

    /// Whether the underlying stream was closed after an I/O failure
    fn is_closed(&self) -> bool;

    /// Switch the fallback decoding used for non-UTF-8 value lines
    fn set_encoding(&mut self, encoding: &'static encoding_rs::Encoding);
}
