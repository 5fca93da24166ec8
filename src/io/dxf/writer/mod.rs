//! DXF writer module

mod entity_writer;
mod stream_writer;
mod text_writer;

pub use entity_writer::{EntityWriter, WriteOutcome};
pub use stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
pub use text_writer::{format_double, DxfTextWriter};

use crate::config::DxfConfig;
use crate::error::Result;
use crate::notification::NotificationCollection;
use crate::records::{EntityRecord, EntityStore};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// ASCII DXF file writer.
///
/// Entities that violate a write-side rule are skipped and reported in
/// [`notifications`](Self::notifications); the rest of the output is
/// unaffected.
pub struct DxfWriter<W: Write> {
    writer: DxfTextWriter<W>,
    config: DxfConfig,
    notifications: NotificationCollection,
}

impl DxfWriter<BufWriter<File>> {
    /// Create a writer for a new file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> DxfWriter<W> {
    /// Create a writer with the default configuration
    pub fn new(writer: W) -> Self {
        Self {
            writer: DxfTextWriter::new(writer),
            config: DxfConfig::default(),
            notifications: NotificationCollection::new(),
        }
    }

    /// Set the writer configuration (target version, defaults, limits).
    pub fn with_configuration(mut self, config: DxfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DxfConfig {
        &self.config
    }

    /// Diagnostics collected so far
    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    /// Write one entity or table record.
    pub fn write_entity(&mut self, record: &EntityRecord) -> Result<WriteOutcome> {
        EntityWriter::new(&self.config).write_entity(&mut self.writer, record, &mut self.notifications)
    }

    /// Write every live record of `store` in insertion order. Returns the
    /// number of records written.
    pub fn write_store(&mut self, store: &EntityStore) -> Result<usize> {
        let mut written = 0;
        for (_, record) in store.iter() {
            if self.write_entity(record)?.is_written() {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Like [`write_store`](Self::write_store), serializing the records on
    /// the rayon pool. Output is identical.
    pub fn write_store_parallel(&mut self, store: &EntityStore) -> Result<()> {
        let (bytes, notifications) = store.serialize_parallel(&self.config)?;
        self.writer.write_raw(&bytes)?;
        self.notifications.append(notifications);
        Ok(())
    }

    /// Write a HEADER section holding `$ACADVER` for the target version.
    pub fn write_header(&mut self) -> Result<()> {
        self.writer.write_section_start("HEADER")?;
        self.writer.write_string(9, "$ACADVER")?;
        self.writer.write_string(1, self.config.version.as_str())?;
        self.writer.write_section_end()
    }

    /// Write `records` wrapped in `SECTION / 2 name ... ENDSEC`.
    pub fn write_section<'a, I>(&mut self, name: &str, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a EntityRecord>,
    {
        self.writer.write_section_start(name)?;
        let mut written = 0;
        for record in records {
            if self.write_entity(record)?.is_written() {
                written += 1;
            }
        }
        self.writer.write_section_end()?;
        Ok(written)
    }

    /// Write a TABLE record, its entries and `ENDTAB`.
    pub fn write_table<'a, I>(&mut self, table: &EntityRecord, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a EntityRecord>,
    {
        self.write_entity(table)?;
        let mut written = 0;
        for entry in entries {
            if self.write_entity(entry)?.is_written() {
                written += 1;
            }
        }
        self.writer.write_string(0, "ENDTAB")?;
        Ok(written)
    }

    /// Write the final `0 / EOF` tag.
    pub fn write_eof(&mut self) -> Result<()> {
        self.writer.write_eof()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer.into_inner())
    }
}
