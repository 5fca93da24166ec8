//! ASCII DXF writer

use std::io::Write;
use crate::error::Result;
use crate::types::Handle;
use super::stream_writer::DxfStreamWriter;

/// ASCII DXF stream writer.
///
/// Codes are right-aligned in a 3-character field, doubles use fixed
/// notation with six decimals and handles are uppercase hex.
pub struct DxfTextWriter<W: Write> {
    writer: W,
}

impl<W: Write> DxfTextWriter<W> {
    /// Create a new ASCII DXF writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a DXF code with proper formatting (right-aligned in 3-character field)
    fn write_code(&mut self, code: i32) -> Result<()> {
        writeln!(self.writer, "{:>3}", code)?;
        Ok(())
    }

    /// Append bytes that are already formatted tags.
    pub(crate) fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Get the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Fixed notation with six decimals, never exponent form.
pub fn format_double(value: f64) -> String {
    format!("{:.6}", value)
}

impl<W: Write> DxfStreamWriter for DxfTextWriter<W> {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_int(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", format_double(value))?;
        Ok(())
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{:X}", handle.value())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::stream_writer::DxfStreamWriterExt;

    fn written(f: impl FnOnce(&mut DxfTextWriter<&mut Vec<u8>>)) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            f(&mut writer);
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_string() {
        let output = written(|w| w.write_string(0, "ARC").unwrap());
        assert_eq!(output, "  0\nARC\n");
    }

    #[test]
    fn test_write_code_formatting() {
        let output = written(|w| {
            w.write_int(5, 100).unwrap();
            w.write_int(62, 7).unwrap();
            w.write_int(100, 1).unwrap();
            w.write_int(1071, 1).unwrap();
        });
        assert_eq!(output, "  5\n100\n 62\n7\n100\n1\n1071\n1\n");
    }

    #[test]
    fn test_write_double_fixed_notation() {
        let output = written(|w| {
            w.write_double(40, 2.5).unwrap();
            w.write_double(10, 1.0e20).unwrap();
            w.write_double(20, -0.0000001).unwrap();
        });
        assert_eq!(
            output,
            " 40\n2.500000\n 10\n100000000000000000000.000000\n 20\n-0.000000\n"
        );
    }

    #[test]
    fn test_write_handle() {
        let output = written(|w| w.write_handle(5, Handle::new(0x1A)).unwrap());
        assert_eq!(output, "  5\n1A\n");
    }

    #[test]
    fn test_write_group() {
        let output = written(|w| {
            w.write_group_start("ACAD_REACTORS").unwrap();
            w.write_string(330, "1F").unwrap();
            w.write_group_end().unwrap();
        });
        assert_eq!(output, "102\n{ACAD_REACTORS\n330\n1F\n102\n}\n");
    }
}
