//! # dxf-tags
//!
//! Descriptor-driven reader and writer for the entity and table records of
//! ASCII DXF files.
//!
//! Every supported record type (ARC, SPLINE, VIEW, ...) is described by a
//! static table mapping group codes to named fields. One generic reader and
//! one generic writer interpret those tables, so adding a type means adding
//! a descriptor rather than code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dxf_tags::{DxfConfig, DxfReader, DxfVersion, DxfWriter};
//!
//! // Read every supported record
//! let mut reader = DxfReader::from_file("sample.dxf")?;
//! let store = reader.read_all()?;
//! for notification in reader.notifications() {
//!     println!("{}", notification);
//! }
//!
//! // Write them back for an older release
//! let mut writer = DxfWriter::create("output.dxf")?
//!     .with_configuration(DxfConfig::for_version(DxfVersion::R12));
//! writer.write_header()?;
//! writer.write_section("ENTITIES", store.iter().map(|(_, r)| r))?;
//! writer.write_eof()?;
//! writer.into_inner()?;
//! # Ok::<(), dxf_tags::DxfError>(())
//! ```
//!
//! ## Architecture
//!
//! - `descriptors` - Static per-type tables of group code rows
//! - `records` - Field-keyed records and the arena that owns them
//! - `io::dxf::reader` - Tag stream reader and the generic entity reader
//! - `io::dxf::writer` - Tag stream writer and the generic entity writer
//! - `notification` - Non-fatal diagnostics, also forwarded to `log`

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod descriptors;
pub mod error;
pub mod flags;
pub mod io;
pub mod notification;
pub mod records;
pub mod types;

// Re-export commonly used types
pub use config::DxfConfig;
pub use error::{DxfError, Result};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use records::{EntityRecord, EntityStore, FieldValue, RecordId, Vertex};
pub use types::{Capability, Color, DxfVersion, Handle, Vector3};

// Re-export I/O types
pub use io::dxf::{DxfReader, DxfWriter, WriteOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
