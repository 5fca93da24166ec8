//! DXF ASCII text reader

use super::stream_reader::{DxfStreamReader, Tag};
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code_value::GroupCodeValueType;
use encoding_rs::Encoding;
use std::io::BufRead;

/// DXF ASCII text stream reader.
///
/// Tracks the physical line number of every tag. After an I/O failure the
/// underlying reader is dropped and every later call fails with
/// [`DxfError::StreamClosed`].
pub struct DxfTextReader<R: BufRead> {
    reader: Option<R>,
    line_number: usize,
    peeked: Option<Tag>,
    /// Non-UTF8 fallback encoding.  `None` means use Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
}

impl<R: BufRead> DxfTextReader<R> {
    /// Create a new DXF text reader
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            line_number: 0,
            peeked: None,
            encoding: None,
        }
    }

    /// Read one physical line without its terminator (`\n` or `\r\n`).
    fn read_line(&mut self) -> Result<Option<String>> {
        let reader = self.reader.as_mut().ok_or(DxfError::StreamClosed)?;
        let mut bytes = Vec::new();
        match reader.read_until(b'\n', &mut bytes) {
            Ok(0) => return Ok(None),
            Ok(_) => {}
            Err(e) => {
                log::error!("closing DXF stream after read error at line {}: {}", self.line_number + 1, e);
                self.reader = None;
                return Err(e.into());
            }
        }

        self.line_number += 1;

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        // Try UTF-8 first, then use configured encoding or Latin-1 fallback
        let line = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(err) => {
                let bytes = err.into_bytes();
                if let Some(enc) = self.encoding {
                    let (decoded, _, _) = enc.decode(&bytes);
                    decoded.into_owned()
                } else {
                    // Latin-1 is a 1:1 mapping of bytes 0-255 to Unicode code points
                    bytes.iter().map(|&b| b as char).collect()
                }
            }
        };
        Ok(Some(line))
    }

    /// Read a code/value pair from the stream
    fn read_tag_internal(&mut self) -> Result<Option<Tag>> {
        let code_line = loop {
            match self.read_line()? {
                Some(line) if line.trim().is_empty() && self.at_eof()? => return Ok(None),
                Some(line) => break line,
                None => return Ok(None),
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::Parse(format!(
                "Invalid DXF code at line {}: '{}'",
                self.line_number, code_line
            ))
        })?;

        let value_line = match self.read_line()? {
            Some(line) => line,
            // A bare trailing 0 still terminates the last entity
            None if code == 0 => String::new(),
            None => {
                return Err(DxfError::Parse(format!(
                    "Unexpected EOF after code {} at line {}",
                    code, self.line_number
                )))
            }
        };

        let value = if GroupCodeValueType::from_raw_code(code).is_textual() {
            value_line
        } else {
            value_line.trim().to_string()
        };

        log::trace!("line {}: {:>3} {}", self.line_number, code, value);

        Ok(Some(Tag {
            code,
            value,
            line: self.line_number,
        }))
    }

    /// Whether only trailing blank input remains.
    fn at_eof(&mut self) -> Result<bool> {
        let reader = self.reader.as_mut().ok_or(DxfError::StreamClosed)?;
        let remaining_blank = reader
            .fill_buf()
            .map(|buf| buf.iter().all(|b| b.is_ascii_whitespace()));
        match remaining_blank {
            Ok(blank) => Ok(blank),
            Err(e) => {
                self.reader = None;
                Err(e.into())
            }
        }
    }
}

impl<R: BufRead> DxfStreamReader for DxfTextReader<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        if let Some(tag) = self.peeked.take() {
            return Ok(Some(tag));
        }
        self.read_tag_internal()
    }

    fn peek_code(&mut self) -> Result<Option<i32>> {
        if let Some(ref tag) = self.peeked {
            return Ok(Some(tag.code));
        }

        match self.read_tag_internal()? {
            Some(tag) => {
                let code = tag.code;
                self.peeked = Some(tag);
                Ok(Some(code))
            }
            None => Ok(None),
        }
    }

    fn push_back(&mut self, tag: Tag) {
        self.peeked = Some(tag);
    }

    fn line_number(&self) -> usize {
        self.line_number
    }

    fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = Some(encoding);
    }
}
