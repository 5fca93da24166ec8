//! DXF stream writer trait and common helpers

use crate::error::Result;
use crate::types::Handle;

/// Group code of the application-defined group delimiters.
pub const GROUP_CODE: i32 = 102;

/// Value closing a 102 group.
pub const GROUP_END: &str = "}";

/// Value opening the 102 group `name`.
pub fn group_start(name: &str) -> String {
    format!("{{{}", name)
}

/// Trait for writing DXF code/value pairs
pub trait DxfStreamWriter {
    /// Write a code/value pair with a string value
    fn write_string(&mut self, code: i32, value: &str) -> Result<()>;

    /// Write a code/value pair with an integer value
    fn write_int(&mut self, code: i32, value: i64) -> Result<()>;

    /// Write a code/value pair with a double value
    fn write_double(&mut self, code: i32, value: f64) -> Result<()>;

    /// Write a code/value pair with a handle value
    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()>;

    /// Flush the writer
    fn flush(&mut self) -> Result<()>;
}

/// Extension trait for convenient writing operations
pub trait DxfStreamWriterExt: DxfStreamWriter {
    /// Open a 102 group (`{ACAD_REACTORS`)
    fn write_group_start(&mut self, name: &str) -> Result<()> {
        self.write_string(GROUP_CODE, &group_start(name))
    }

    /// Close a 102 group
    fn write_group_end(&mut self) -> Result<()> {
        self.write_string(GROUP_CODE, GROUP_END)
    }

    /// Write section start
    fn write_section_start(&mut self, section_name: &str) -> Result<()> {
        self.write_string(0, "SECTION")?;
        self.write_string(2, section_name)?;
        Ok(())
    }

    /// Write section end
    fn write_section_end(&mut self) -> Result<()> {
        self.write_string(0, "ENDSEC")
    }

    /// Write end of file
    fn write_eof(&mut self) -> Result<()> {
        self.write_string(0, "EOF")
    }
}

// Auto-implement the extension trait for all stream writers
impl<T: DxfStreamWriter + ?Sized> DxfStreamWriterExt for T {}
