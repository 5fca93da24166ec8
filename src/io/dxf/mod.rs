//! DXF (Drawing Exchange Format) tag stream reading and writing

mod code_page;
pub mod group_code_value;
pub mod reader;
pub mod writer;

pub use code_page::{code_page, CodePage};
pub use group_code_value::{Coercion, GroupCodeValueType};
pub use reader::{DxfReader, DxfStreamReader, DxfTextReader, EntityReader, Tag};
pub use writer::{
    DxfStreamWriter, DxfStreamWriterExt, DxfTextWriter, DxfWriter, EntityWriter, WriteOutcome,
};
