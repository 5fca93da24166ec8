//! DXF file reader

mod entity_reader;
mod stream_reader;
mod text_reader;

pub use entity_reader::EntityReader;
pub(crate) use entity_reader::repair_empty_fields;
pub use stream_reader::{DxfStreamReader, Tag};
pub use text_reader::DxfTextReader;

use crate::config::DxfConfig;
use crate::descriptors;
use crate::error::Result;
use crate::io::dxf::code_page::{code_page, CodePage};
use crate::notification::{Notification, NotificationCollection, NotificationType};
use crate::records::{EntityRecord, EntityStore};
use crate::types::DxfVersion;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Streaming DXF file reader.
///
/// Walks the file tag by tag, handing every registered entity or table
/// record to the [`EntityReader`]. Section and table framing is consumed
/// here; records of unregistered types are skipped and reported as
/// [`NotificationType::NotImplemented`].
pub struct DxfReader {
    stream: Box<dyn DxfStreamReader>,
    config: DxfConfig,
    version: Option<DxfVersion>,
    section: Option<String>,
    notifications: NotificationCollection,
}

impl DxfReader {
    /// Create a new DXF reader from any buffered reader
    pub fn from_reader<R: BufRead + 'static>(reader: R) -> Self {
        Self {
            stream: Box::new(DxfTextReader::new(reader)),
            config: DxfConfig::default(),
            version: None,
            section: None,
            notifications: NotificationCollection::new(),
        }
    }

    /// Create a new DXF reader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Set the reader configuration.
    pub fn with_configuration(mut self, config: DxfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DxfConfig {
        &self.config
    }

    /// Version declared by `$ACADVER`, once the header has been read.
    pub fn version(&self) -> Option<DxfVersion> {
        self.version
    }

    /// Diagnostics collected so far
    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    /// Take the collected diagnostics, leaving the collection empty.
    pub fn take_notifications(&mut self) -> NotificationCollection {
        std::mem::take(&mut self.notifications)
    }

    /// Read up to the next registered record and return it, or `None` at
    /// `EOF` or end of stream.
    pub fn next_entity(&mut self) -> Result<Option<EntityRecord>> {
        loop {
            let tag = match self.stream.read_tag()? {
                Some(tag) => tag,
                None => return Ok(None),
            };

            match tag.code {
                0 => match tag.value.trim() {
                    "EOF" | "" => return Ok(None),
                    "SECTION" => self.open_section()?,
                    "ENDSEC" => self.section = None,
                    "ENDTAB" => {}
                    name => {
                        if descriptors::descriptor(name).is_some() {
                            let record = EntityReader::new(&self.config).read_entity(
                                self.stream.as_mut(),
                                name,
                                None,
                                &mut self.notifications,
                            )?;
                            return Ok(Some(record));
                        }
                        self.notifications.push(
                            Notification::new(
                                NotificationType::NotImplemented,
                                format!("{} skipped", name),
                            )
                            .with_entity(name)
                            .with_line(tag.line),
                        );
                        self.skip_record()?;
                    }
                },
                9 if self.section.as_deref() == Some("HEADER") => {
                    self.read_header_variable(&tag.value)?;
                }
                999 => {
                    self.notifications.push(
                        Notification::new(NotificationType::Comment, tag.value).with_line(tag.line),
                    );
                }
                _ => {}
            }
        }
    }

    /// Read every remaining record into a store, chaining records of the
    /// same type in file order.
    pub fn read_all(&mut self) -> Result<EntityStore> {
        let mut store = EntityStore::new();
        while let Some(record) = self.next_entity()? {
            store.push(record);
        }
        log::debug!("read {} records", store.len());
        Ok(store)
    }

    /// Consume the section name following `0 / SECTION`.
    fn open_section(&mut self) -> Result<()> {
        match self.stream.read_tag()? {
            Some(tag) if tag.code == 2 => {
                log::trace!("section {}", tag.value.trim());
                self.section = Some(tag.value.trim().to_string());
            }
            Some(tag) => {
                self.notifications.push(
                    Notification::new(NotificationType::Warning, "SECTION without a name")
                        .with_line(tag.line),
                );
                self.stream.push_back(tag);
                self.section = None;
            }
            None => {}
        }
        Ok(())
    }

    /// Pick up the header variables that change how the rest of the file
    /// is read.
    fn read_header_variable(&mut self, name: &str) -> Result<()> {
        match name.trim() {
            "$ACADVER" => {
                if let Some(tag) = self.stream.read_tag()? {
                    match DxfVersion::parse(tag.value.trim()) {
                        Some(version) => self.version = Some(version),
                        None => self.notifications.push(
                            Notification::new(
                                NotificationType::NotSupported,
                                format!("unknown version '{}'", tag.value.trim()),
                            )
                            .with_line(tag.line),
                        ),
                    }
                }
            }
            "$DWGCODEPAGE" => {
                if let Some(tag) = self.stream.read_tag()? {
                    // R2007 and later files are always UTF-8
                    let unicode = self.version.map_or(false, |v| v >= DxfVersion::R2007);
                    if !unicode {
                        match code_page(&tag.value) {
                            CodePage::Encoded(encoding) => {
                                log::debug!("code page {} uses {}", tag.value.trim(), encoding.name());
                                self.stream.set_encoding(encoding);
                            }
                            CodePage::Plain => {}
                            CodePage::Unrecognized => self.notifications.push(
                                Notification::new(
                                    NotificationType::NotSupported,
                                    format!("unknown code page '{}', decoding as Latin-1", tag.value.trim()),
                                )
                                .with_line(tag.line),
                            ),
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Skip the tags of an unregistered record up to the next code 0.
    fn skip_record(&mut self) -> Result<()> {
        while let Some(tag) = self.stream.read_tag()? {
            if tag.code == 0 {
                self.stream.push_back(tag);
                break;
            }
        }
        Ok(())
    }
}
