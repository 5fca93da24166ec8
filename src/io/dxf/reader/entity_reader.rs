//! Generic, descriptor-driven entity reader.

use ahash::AHashMap;

use super::stream_reader::{DxfStreamReader, Tag};
use crate::config::DxfConfig;
use crate::descriptors::{self, EntityDescriptor, RepeatPolicy, Target, VertexPart};
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code_value::CoercedValue;
use crate::notification::{NotificationCollection, NotificationType};
use crate::records::{EntityRecord, FieldValue, Vertex};
use crate::types::Vector3;

/// Reads the tags of one entity into an [`EntityRecord`].
///
/// The reader is positioned just after the `0 / NAME` tag. It consumes tags
/// until the next code-0 tag, which is pushed back for the caller.
pub struct EntityReader<'a> {
    config: &'a DxfConfig,
}

/// Per-entity read state: subclass context, open 102 group and the
/// running index of every repeated row.
struct ReadState {
    subclass: Option<String>,
    bracket: Option<String>,
    counters: Vec<usize>,
    lead: AHashMap<&'static str, usize>,
}

impl ReadState {
    fn new(descriptor: &EntityDescriptor) -> Self {
        Self {
            subclass: None,
            bracket: None,
            counters: vec![0; descriptor.rows.len()],
            lead: AHashMap::new(),
        }
    }
}

impl<'a> EntityReader<'a> {
    pub fn new(config: &'a DxfConfig) -> Self {
        Self { config }
    }

    /// Read the entity `name` from `stream`.
    ///
    /// When `record` is `None` a fresh record is allocated and initialized
    /// with defaults. Non-fatal problems are appended to `notifications`.
    pub fn read_entity<S: DxfStreamReader + ?Sized>(
        &self,
        stream: &mut S,
        name: &str,
        record: Option<EntityRecord>,
        notifications: &mut NotificationCollection,
    ) -> Result<EntityRecord> {
        if stream.is_closed() {
            return Err(DxfError::StreamClosed);
        }

        let descriptor = descriptors::descriptor(name)
            .ok_or_else(|| DxfError::UnknownEntityType(name.to_string()))?;

        let mut record = match record {
            Some(r) if r.type_name() == descriptor.name => r,
            Some(r) => {
                return Err(DxfError::InvalidEntity {
                    entity: name.to_string(),
                    handle: r.handle().map(|h| h.value()),
                    reason: format!("record of type {} cannot hold it", r.type_name()),
                })
            }
            None => {
                log::debug!("allocating {} record for reading", descriptor.name);
                EntityRecord::from_descriptor(descriptor, self.config)
            }
        };

        let mut state = ReadState::new(descriptor);

        loop {
            let tag = match stream.read_tag()? {
                Some(tag) => tag,
                None => {
                    notifications.push(
                        record
                            .notification(NotificationType::Warning, "unexpected end of stream")
                            .with_line(stream.line_number()),
                    );
                    break;
                }
            };

            match tag.code {
                0 => {
                    stream.push_back(tag);
                    break;
                }
                999 => {
                    notifications.push(
                        record
                            .notification(NotificationType::Comment, tag.value.clone())
                            .with_line(tag.line),
                    );
                }
                100 => {
                    if !descriptor.accepts_subclass(&tag.value) {
                        notifications.push(
                            record
                                .notification(
                                    NotificationType::Warning,
                                    format!("unexpected subclass marker '{}'", tag.value),
                                )
                                .with_line(tag.line),
                        );
                    }
                    state.subclass = Some(tag.value);
                }
                102 => {
                    let value = tag.value.trim();
                    state.bracket = value.strip_prefix('{').map(str::to_string);
                }
                code if state.bracket.as_deref().map_or(false, |g| !descriptor.declares_group(g)) => {
                    notifications.push(
                        record
                            .notification(
                                NotificationType::Warning,
                                format!(
                                    "group code {} inside undeclared group '{}' skipped",
                                    code,
                                    state.bracket.as_deref().unwrap_or_default()
                                ),
                            )
                            .with_line(tag.line),
                    );
                }
                code => {
                    let row_index = descriptor.lookup(
                        code,
                        state.subclass.as_deref(),
                        state.bracket.as_deref(),
                    );
                    match row_index {
                        Some(i) => self.apply(descriptor, i, &tag, &mut record, &mut state, notifications)?,
                        None => notifications.push(
                            record
                                .notification(
                                    NotificationType::Warning,
                                    format!("unknown group code {} ('{}')", code, tag.value),
                                )
                                .with_line(tag.line),
                        ),
                    }
                }
            }
        }

        if let Some(hook) = descriptor.after_read {
            hook(&mut record, self.config, notifications);
        }
        repair_empty_fields(&mut record, self.config, notifications);

        log::debug!(
            "read {} {}",
            record.type_name(),
            record.handle().map(|h| h.to_hex()).unwrap_or_default()
        );
        Ok(record)
    }

    /// Coerce one tag and store it in the row's target.
    fn apply(
        &self,
        descriptor: &EntityDescriptor,
        row_index: usize,
        tag: &Tag,
        record: &mut EntityRecord,
        state: &mut ReadState,
        notifications: &mut NotificationCollection,
    ) -> Result<()> {
        let row = &descriptor.rows[row_index];
        let target = match row.target() {
            Some(t) => t,
            None => return Ok(()),
        };

        let value = match tag.coerce(row.coercion) {
            Ok(v) => v,
            Err(err @ DxfError::MalformedValue { .. }) => {
                if self.config.failsafe {
                    notifications.push(
                        record
                            .notification(NotificationType::Error, err.to_string())
                            .with_line(tag.line),
                    );
                    return Ok(());
                }
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let index = match row.repeat {
            RepeatPolicy::Once => 0,
            RepeatPolicy::Indexed => {
                let i = state.counters[row_index];
                state.counters[row_index] += 1;
                if i >= self.config.max_array_len {
                    // Parts that follow a dropped vertex are dropped with it
                    if let Target::Vertex(field, _) = target {
                        state.lead.remove(field);
                    }
                    notifications.push(
                        record
                            .notification(
                                NotificationType::Warning,
                                format!(
                                    "'{}' exceeds {} elements; group code {} dropped",
                                    target.field(),
                                    self.config.max_array_len,
                                    tag.code
                                ),
                            )
                            .with_line(tag.line),
                    );
                    return Ok(());
                }
                if let Target::Vertex(field, _) = target {
                    state.lead.insert(field, i);
                }
                i
            }
            RepeatPolicy::Follow => match state.lead.get(target.field()) {
                Some(&i) => i,
                None => {
                    notifications.push(
                        record
                            .notification(
                                NotificationType::Warning,
                                format!("group code {} has no vertex to attach to", tag.code),
                            )
                            .with_line(tag.line),
                    );
                    return Ok(());
                }
            },
        };

        let stored = store(record, target, index, value);
        if !stored {
            notifications.push(
                record
                    .notification(
                        NotificationType::Warning,
                        format!("group code {} does not fit field '{}'", tag.code, target.field()),
                    )
                    .with_line(tag.line),
            );
        }
        Ok(())
    }
}

/// Write a coerced value into its target. Returns `false` on a shape
/// mismatch between the row and the field.
fn store(record: &mut EntityRecord, target: Target, index: usize, value: CoercedValue) -> bool {
    let slot = match record.get_mut(target.field()) {
        Some(slot) => slot,
        None => return false,
    };

    match (target, slot, value) {
        (Target::Scalar(_), FieldValue::Text(s), CoercedValue::Text(v)) => *s = v,
        (Target::Scalar(_), FieldValue::Double(d), CoercedValue::Double(v)) => *d = v,
        (Target::Scalar(_), FieldValue::Int(n), CoercedValue::Int(v)) => *n = v,
        (Target::Scalar(_), FieldValue::Handle(h), CoercedValue::Handle(v)) => *h = Some(v),
        (Target::Scalar(_), FieldValue::Text(s), CoercedValue::Handle(v)) => *s = v.to_hex(),
        (Target::Axis(_, axis), FieldValue::Point(p), CoercedValue::Double(v)) => p.set(axis, v),
        (Target::Element(_, axis), FieldValue::Points(points), CoercedValue::Double(v)) => {
            if points.len() <= index {
                points.resize(index + 1, Vector3::ZERO);
            }
            points[index].set(axis, v);
        }
        (Target::Push(_), FieldValue::Doubles(values), CoercedValue::Double(v)) => {
            set_at(values, index, v);
        }
        (Target::Push(_), FieldValue::Texts(values), CoercedValue::Text(v)) => {
            set_at(values, index, v);
        }
        (Target::Vertex(_, part), FieldValue::Vertices(vertices), CoercedValue::Double(v)) => {
            if vertices.len() <= index {
                vertices.resize(index + 1, Vertex::default());
            }
            let vertex = &mut vertices[index];
            match part {
                VertexPart::X => vertex.point.x = v,
                VertexPart::Y => vertex.point.y = v,
                VertexPart::StartWidth => vertex.start_width = v,
                VertexPart::EndWidth => vertex.end_width = v,
                VertexPart::Bulge => vertex.bulge = v,
            }
        }
        _ => return false,
    }
    true
}

fn set_at<T: Default + Clone>(values: &mut Vec<T>, index: usize, value: T) {
    if values.len() <= index {
        values.resize(index + 1, T::default());
    }
    values[index] = value;
}

/// Replace empty text in fields that must never be empty (layer,
/// linetype) by their configured default.
pub(crate) fn repair_empty_fields(
    record: &mut EntityRecord,
    config: &DxfConfig,
    notifications: &mut NotificationCollection,
) {
    let descriptor = record.descriptor();
    for (name, spec) in descriptor.fields.iter() {
        if !spec.repair_empty || record.text(name) != Some("") {
            continue;
        }
        record.reset(name, config);
        let replacement = record.text(name).unwrap_or_default().to_string();
        notifications.push(record.notification(
            NotificationType::Warning,
            format!("empty {} replaced by '{}'", name, replacement),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::reader::DxfTextReader;
    use crate::types::Handle;
    use std::io::Cursor;

    fn read(name: &str, body: &str, config: &DxfConfig) -> (Result<EntityRecord>, NotificationCollection, DxfTextReader<Cursor<Vec<u8>>>) {
        let mut stream = DxfTextReader::new(Cursor::new(body.as_bytes().to_vec()));
        let mut notes = NotificationCollection::new();
        let result = EntityReader::new(config).read_entity(&mut stream, name, None, &mut notes);
        (result, notes, stream)
    }

    #[test]
    fn test_reads_arc_and_stops_at_code_zero() {
        let body = "  5\n1A\n  8\nLAYER1\n 10\n5.000000\n 20\n3.000000\n 30\n0.000000\n 40\n2.500000\n 50\n0.000000\n 51\n90.000000\n  0\nLINE\n";
        let (result, notes, mut stream) = read("ARC", body, &DxfConfig::default());
        let arc = result.unwrap();
        assert!(notes.is_empty(), "{:?}", notes);
        assert_eq!(arc.handle(), Some(Handle::new(0x1A)));
        assert_eq!(arc.layer(), Some("LAYER1"));
        assert_eq!(arc.point("center"), Some(Vector3::new(5.0, 3.0, 0.0)));
        assert_eq!(arc.double("radius"), Some(2.5));
        assert_eq!(arc.double("end_angle"), Some(90.0));

        let next = stream.read_tag().unwrap().unwrap();
        assert_eq!((next.code, next.value.as_str()), (0, "LINE"));
    }

    #[test]
    fn test_unknown_code_is_a_warning() {
        let body = "  8\nA\n9999\nvendor data\n 40\n1.5\n  0\n";
        let (result, notes, _) = read("ARC", body, &DxfConfig::default());
        let arc = result.unwrap();
        assert_eq!(arc.layer(), Some("A"));
        assert_eq!(arc.double("radius"), Some(1.5));
        let warnings = notes.of_type(NotificationType::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("9999"));
        assert_eq!(warnings[0].line, Some(4));
    }

    #[test]
    fn test_subclass_mismatch_is_a_warning() {
        let body = "100\nAcDbEntity\n100\nAcDbLine\n 40\n1.0\n  0\n";
        let (result, notes, _) = read("ARC", body, &DxfConfig::default());
        assert!(result.is_ok());
        let warnings = notes.of_type(NotificationType::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("AcDbLine"));
    }

    #[test]
    fn test_comment_goes_to_notifications() {
        let body = "999\nhand edited\n  8\nL\n  0\n";
        let (result, notes, _) = read("LINE", body, &DxfConfig::default());
        assert!(result.is_ok());
        let comments = notes.of_type(NotificationType::Comment);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].message, "hand edited");
    }

    #[test]
    fn test_empty_layer_is_repaired() {
        let body = "  8\n\n  6\n\n  0\n";
        let (result, notes, _) = read("LINE", body, &DxfConfig::default());
        let line = result.unwrap();
        assert_eq!(line.layer(), Some("0"));
        assert_eq!(line.linetype(), Some("BYLAYER"));
        assert_eq!(notes.of_type(NotificationType::Warning).len(), 2);
    }

    #[test]
    fn test_malformed_number_fails_by_default() {
        let body = " 40\nabc\n  0\n";
        let (result, _, _) = read("ARC", body, &DxfConfig::default());
        assert!(matches!(result, Err(DxfError::MalformedValue { code: 40, line: 2, .. })));
    }

    #[test]
    fn test_malformed_number_in_failsafe_mode() {
        let body = " 40\n2.0\n 40\nabc\n  0\n";
        let config = DxfConfig::default().with_failsafe(true);
        let (result, notes, _) = read("ARC", body, &config);
        let arc = result.unwrap();
        assert_eq!(arc.double("radius"), Some(2.0));
        assert!(notes.has_type(NotificationType::Error));
    }

    #[test]
    fn test_spline_arrays_in_file_order() {
        let body = "100\nAcDbEntity\n100\nAcDbSpline\n 40\n0.0\n 40\n1.0\n 10\n1.0\n 20\n2.0\n 30\n0.0\n 10\n3.0\n 20\n4.0\n 30\n0.5\n 10\n5.0\n 20\n6.0\n 30\n1.0\n  0\n";
        let (result, _, _) = read("SPLINE", body, &DxfConfig::default());
        let spline = result.unwrap();
        assert_eq!(spline.doubles("knots"), Some(&[0.0, 1.0][..]));
        assert_eq!(
            spline.points("control_points"),
            Some(
                &[
                    Vector3::new(1.0, 2.0, 0.0),
                    Vector3::new(3.0, 4.0, 0.5),
                    Vector3::new(5.0, 6.0, 1.0)
                ][..]
            )
        );
    }

    #[test]
    fn test_array_capacity() {
        let body = " 40\n0.0\n 40\n1.0\n 40\n2.0\n  0\n";
        let config = DxfConfig::default().with_max_array_len(2);
        let (result, notes, _) = read("SPLINE", body, &config);
        let spline = result.unwrap();
        assert_eq!(spline.doubles("knots").map(<[f64]>::len), Some(2));
        assert!(notes.has_type(NotificationType::Warning));
    }

    #[test]
    fn test_lwpolyline_vertices() {
        let body = " 90\n2\n 10\n0.0\n 20\n0.0\n 42\n0.5\n 10\n4.0\n 20\n1.0\n 40\n0.1\n 41\n0.2\n  0\n";
        let (result, _, _) = read("LWPOLYLINE", body, &DxfConfig::default());
        let poly = result.unwrap();
        let vertices = poly.vertices("vertices").unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].bulge, 0.5);
        assert_eq!(vertices[1].point, Vector3::new(4.0, 1.0, 0.0));
        assert_eq!(vertices[1].start_width, 0.1);
        assert_eq!(vertices[1].end_width, 0.2);
    }

    #[test]
    fn test_reactor_group() {
        let body = "  5\n2B\n102\n{ACAD_REACTORS\n330\n1F\n330\n20\n102\n}\n330\n1F\n100\nAcDbEntity\n  8\n0\n  0\n";
        let (result, notes, _) = read("LINE", body, &DxfConfig::default());
        let line = result.unwrap();
        assert!(notes.is_empty(), "{:?}", notes);
        assert_eq!(line.texts("reactors").map(<[String]>::len), Some(2));
        assert_eq!(line.text("owner"), Some("1F"));
    }

    #[test]
    fn test_undeclared_group_is_skipped() {
        let body = "  8\nL\n 40\n2.5\n102\n{MYAPP\n 40\n7.0\n  8\nAPPLAYER\n102\n}\n 50\n0.0\n 51\n90.0\n  0\n";
        let (result, notes, _) = read("ARC", body, &DxfConfig::default());
        let arc = result.unwrap();
        assert_eq!(arc.double("radius"), Some(2.5));
        assert_eq!(arc.layer(), Some("L"));
        assert_eq!(arc.double("end_angle"), Some(90.0));
        let warnings = notes.of_type(NotificationType::Warning);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.message.contains("MYAPP")));
    }

    #[test]
    fn test_vertex_parts_past_capacity_are_dropped() {
        let body = " 10\n0.0\n 20\n0.0\n 10\n1.0\n 20\n1.0\n 10\n2.0\n 20\n99.0\n 42\n0.75\n  0\n";
        let config = DxfConfig::default().with_max_array_len(2);
        let (result, notes, _) = read("LWPOLYLINE", body, &config);
        let poly = result.unwrap();
        let vertices = poly.vertices("vertices").unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].point, Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(vertices[1].bulge, 0.0);
        assert!(notes.has_type(NotificationType::Warning));
    }

    #[test]
    fn test_end_of_stream_finishes_entity() {
        let body = "  8\nL\n";
        let (result, notes, _) = read("LINE", body, &DxfConfig::default());
        assert_eq!(result.unwrap().layer(), Some("L"));
        assert!(notes.has_type(NotificationType::Warning));
    }

    #[test]
    fn test_unknown_entity_type() {
        let (result, _, _) = read("HATCH", "  0\n", &DxfConfig::default());
        assert!(matches!(result, Err(DxfError::UnknownEntityType(_))));
    }
}
