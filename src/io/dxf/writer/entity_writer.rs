//! Generic, descriptor-driven entity writer.

use super::stream_writer::{group_start, DxfStreamWriter, GROUP_CODE, GROUP_END};
use crate::config::DxfConfig;
use crate::descriptors::{EntityDescriptor, Row, RowKind, Target, VertexPart, WriteCondition};
use crate::error::{DxfError, Result};
use crate::io::dxf::reader::repair_empty_fields;
use crate::notification::{NotificationCollection, NotificationType};
use crate::records::{EntityRecord, FieldValue};
use crate::types::Handle;

/// Result of writing one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Written,
    /// The entity violated a write-side rule; nothing was emitted.
    Skipped(String),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// A tag assembled before anything reaches the stream.
#[derive(Debug, Clone, PartialEq)]
enum OutTag {
    Text(i32, String),
    Int(i32, i64),
    Double(i32, f64),
    Handle(i32, Handle),
}

/// Serializes [`EntityRecord`]s against their descriptor tables.
pub struct EntityWriter<'a> {
    config: &'a DxfConfig,
}

impl<'a> EntityWriter<'a> {
    pub fn new(config: &'a DxfConfig) -> Self {
        Self { config }
    }

    /// Write one entity, starting with its `0 / NAME` tag.
    ///
    /// A record that fails validation is reported to `notifications` and
    /// skipped without emitting anything; I/O errors are returned.
    pub fn write_entity<W: DxfStreamWriter + ?Sized>(
        &self,
        writer: &mut W,
        record: &EntityRecord,
        notifications: &mut NotificationCollection,
    ) -> Result<WriteOutcome> {
        let tags = match self.assemble(record, notifications) {
            Ok(tags) => tags,
            Err(
                err @ (DxfError::InvalidEntity { .. }
                | DxfError::UnsupportedVersion { .. }
                | DxfError::FieldType { .. }),
            ) => {
                notifications.push(record.notification(
                    NotificationType::Error,
                    format!("{}; skipping entity", err),
                ));
                return Ok(WriteOutcome::Skipped(err.to_string()));
            }
            Err(err) => return Err(err),
        };

        for tag in tags {
            match tag {
                OutTag::Text(code, value) => writer.write_string(code, &value)?,
                OutTag::Int(code, value) => writer.write_int(code, value)?,
                OutTag::Double(code, value) => writer.write_double(code, value)?,
                OutTag::Handle(code, value) => writer.write_handle(code, value)?,
            }
        }

        log::debug!(
            "wrote {} {}",
            record.type_name(),
            record.handle().map(|h| h.to_hex()).unwrap_or_default()
        );
        Ok(WriteOutcome::Written)
    }

    /// Validate, repair and lay out every tag of `record`.
    fn assemble(
        &self,
        record: &EntityRecord,
        notifications: &mut NotificationCollection,
    ) -> Result<Vec<OutTag>> {
        let descriptor = record.descriptor();
        let version = self.config.version;
        let capabilities = version.capabilities();

        if let Some(required) = descriptor.min_version {
            if version < required {
                return Err(DxfError::UnsupportedVersion {
                    entity: descriptor.name.to_string(),
                    required: required.to_string(),
                    version: version.to_string(),
                });
            }
        }

        let mut record = record.clone();
        if let Some(hook) = descriptor.prepare_write {
            hook(&mut record, self.config, notifications)?;
        }
        repair_empty_fields(&mut record, self.config, notifications);

        let mut out = vec![OutTag::Text(0, descriptor.name.to_string())];
        let mut open: Option<&'static str> = None;
        // Rows under a subclass whose condition fails are not written
        let mut section_active = true;
        let rows = &descriptor.rows;
        let mut i = 0;

        while i < rows.len() {
            let row = &rows[i];

            if let RowKind::Subclass(name) = row.kind {
                section_active = row.is_gated_in(capabilities) && self.condition_holds(row, &record, descriptor);
                if section_active && row.is_enabled(capabilities) {
                    switch_group(&mut out, &mut open, None);
                    out.push(OutTag::Text(100, name.to_string()));
                }
                i += 1;
                continue;
            }

            if !section_active || !row.is_enabled(capabilities) {
                i += 1;
                continue;
            }

            if let RowKind::Marker(name) = row.kind {
                if self.condition_holds(row, &record, descriptor) {
                    switch_group(&mut out, &mut open, None);
                    out.push(OutTag::Text(100, name.to_string()));
                }
                i += 1;
                continue;
            }

            match row.kind {
                RowKind::Value(Target::Element(field, _)) | RowKind::Value(Target::Vertex(field, _)) => {
                    let end = rows[i..]
                        .iter()
                        .position(|r| r.target().map(|t| t.field()) != Some(field))
                        .map_or(rows.len(), |p| i + p);
                    let group: Vec<&Row> = rows[i..end].iter().filter(|r| r.is_enabled(capabilities)).collect();
                    if self.condition_holds(row, &record, descriptor) {
                        switch_group(&mut out, &mut open, row.bracket);
                        emit_array_group(&mut out, &group, &record)?;
                    }
                    i = end;
                }
                RowKind::Value(target) => {
                    if self.condition_holds(row, &record, descriptor) {
                        let mut staged = Vec::new();
                        self.emit_row(&mut staged, row, target, &record)?;
                        if !staged.is_empty() {
                            switch_group(&mut out, &mut open, row.bracket);
                            out.extend(staged);
                        }
                    }
                    i += 1;
                }
                RowKind::Subclass(_) | RowKind::Marker(_) => i += 1,
            }
        }
        switch_group(&mut out, &mut open, None);

        Ok(out)
    }

    fn condition_holds(&self, row: &Row, record: &EntityRecord, descriptor: &EntityDescriptor) -> bool {
        let field = row.target().map(|t| t.field());
        let value = field.and_then(|f| record.get(f));

        match row.condition {
            WriteCondition::Always => true,
            WriteCondition::NonDefault => {
                let default = field
                    .and_then(|f| descriptor.field(f))
                    .map(|spec| spec.default.resolve(self.config));
                match (value, default) {
                    (Some(v), Some(d)) => *v != d,
                    _ => true,
                }
            }
            WriteCondition::NonEmpty => match value {
                Some(FieldValue::Text(s)) => !s.is_empty(),
                Some(FieldValue::Handle(h)) => h.is_some(),
                Some(v) => v.array_len().map_or(true, |n| n > 0),
                None => false,
            },
            WriteCondition::Assigned => matches!(value, Some(FieldValue::Handle(Some(_)))),
            WriteCondition::FlatlandElevation => {
                self.config.flatland && matches!(value, Some(FieldValue::Double(d)) if *d != 0.0)
            }
            WriteCondition::FlagAny { field, mask } => {
                record.int(field).map_or(false, |flags| flags & mask != 0)
            }
            WriteCondition::FlagIn { field, mask, values } => record
                .int(field)
                .map_or(false, |flags| values.contains(&(flags & mask))),
        }
    }

    fn emit_row(&self, out: &mut Vec<OutTag>, row: &Row, target: Target, record: &EntityRecord) -> Result<()> {
        let field = target.field();
        let value = record.get(field).ok_or_else(|| field_error(record, field, "declared field"))?;

        match (target, value) {
            (Target::Scalar(_), FieldValue::Text(s)) => out.push(OutTag::Text(row.code, s.clone())),
            (Target::Scalar(_), FieldValue::Double(d)) => out.push(OutTag::Double(row.code, *d)),
            (Target::Scalar(_), FieldValue::Int(n)) => out.push(OutTag::Int(row.code, *n)),
            (Target::Scalar(_), FieldValue::Handle(h)) => {
                if let Some(h) = h {
                    out.push(OutTag::Handle(row.code, *h));
                }
            }
            (Target::Axis(_, axis), FieldValue::Point(p)) => out.push(OutTag::Double(row.code, p.get(axis))),
            (Target::Push(_), FieldValue::Doubles(values)) => {
                out.extend(values.iter().map(|v| OutTag::Double(row.code, *v)));
            }
            (Target::Push(_), FieldValue::Texts(values)) => {
                for text in values {
                    if row.binary_chunks {
                        for chunk in split_chunks(text, self.config.max_binary_chunk) {
                            out.push(OutTag::Text(row.code, chunk));
                        }
                    } else {
                        out.push(OutTag::Text(row.code, text.clone()));
                    }
                }
            }
            (_, other) => return Err(field_error(record, field, other.shape())),
        }
        Ok(())
    }
}

/// Open, switch or close the 102 group around the next tags.
fn switch_group(out: &mut Vec<OutTag>, open: &mut Option<&'static str>, want: Option<&'static str>) {
    if *open == want {
        return;
    }
    if open.is_some() {
        out.push(OutTag::Text(GROUP_CODE, GROUP_END.to_string()));
    }
    if let Some(name) = want {
        out.push(OutTag::Text(GROUP_CODE, group_start(name)));
    }
    *open = want;
}

/// Emit an array group element by element: every row of the group for
/// element 0, then element 1, ...
fn emit_array_group(out: &mut Vec<OutTag>, group: &[&Row], record: &EntityRecord) -> Result<()> {
    let Some(field) = group.first().and_then(|r| r.target()).map(|t| t.field()) else {
        return Ok(());
    };

    match record.get(field) {
        Some(FieldValue::Points(points)) => {
            for point in points {
                for row in group {
                    if let Some(Target::Element(_, axis)) = row.target() {
                        out.push(OutTag::Double(row.code, point.get(axis)));
                    }
                }
            }
        }
        Some(FieldValue::Vertices(vertices)) => {
            for vertex in vertices {
                for row in group {
                    if let Some(Target::Vertex(_, part)) = row.target() {
                        let value = match part {
                            VertexPart::X => vertex.point.x,
                            VertexPart::Y => vertex.point.y,
                            VertexPart::StartWidth => vertex.start_width,
                            VertexPart::EndWidth => vertex.end_width,
                            VertexPart::Bulge => vertex.bulge,
                        };
                        out.push(OutTag::Double(row.code, value));
                    }
                }
            }
        }
        Some(other) => return Err(field_error(record, field, other.shape())),
        None => return Err(field_error(record, field, "declared field")),
    }
    Ok(())
}

/// Split text into pieces of at most `max` characters.
fn split_chunks(text: &str, max: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(max.max(1)).map(|c| c.iter().collect()).collect()
}

fn field_error(record: &EntityRecord, field: &str, found: &'static str) -> DxfError {
    DxfError::FieldType {
        entity: record.type_name().to_string(),
        field: field.to_string(),
        expected: found,
    }
}
