//! Shared test utilities for dxf-tags integration tests.
//!
//! Read/write helpers over in-memory buffers and a builder that fills
//! every field of a record with a non-default value, imported by each
//! test crate via `mod common;`.

#![allow(dead_code)]

use dxf_tags::io::dxf::{DxfTextReader, EntityReader};
use dxf_tags::records::{FieldValue, Vertex};
use dxf_tags::{DxfConfig, DxfReader, DxfVersion, DxfWriter, EntityRecord, Handle, NotificationCollection, Vector3, WriteOutcome};
use std::io::Cursor;

// ===========================================================================
// Versions
// ===========================================================================

/// Newest version; every capability is enabled.
pub const LATEST: DxfVersion = DxfVersion::R2018;

/// Versions with a distinct capability set, oldest first.
pub const GATE_VERSIONS: [DxfVersion; 7] = [
    DxfVersion::R11,
    DxfVersion::R12,
    DxfVersion::R13,
    DxfVersion::R14,
    DxfVersion::R2000,
    DxfVersion::R2004,
    DxfVersion::R2007,
];

// ===========================================================================
// Read / write helpers
// ===========================================================================

/// Write one record and return the produced text and outcome.
pub fn write_one(record: &EntityRecord, config: &DxfConfig) -> (String, WriteOutcome, NotificationCollection) {
    let mut writer = DxfWriter::new(Vec::new()).with_configuration(config.clone());
    let outcome = writer
        .write_entity(record)
        .unwrap_or_else(|e| panic!("writing {} failed: {e:?}", record.type_name()));
    let notifications = writer.notifications().clone();
    let bytes = writer.into_inner().expect("flush");
    (String::from_utf8(bytes).expect("utf-8 output"), outcome, notifications)
}

/// Write one record, failing the test if it is skipped.
pub fn write_text(record: &EntityRecord, config: &DxfConfig) -> String {
    let (text, outcome, notifications) = write_one(record, config);
    assert!(
        outcome.is_written(),
        "{} was skipped: {:?} {:?}",
        record.type_name(),
        outcome,
        notifications.iter().collect::<Vec<_>>()
    );
    text
}

/// Read the first record of `text`, which starts with its `0 / TYPE` tag.
/// An `EOF` tag is appended so the record ends the way it would in a file.
pub fn read_one(text: &str, config: &DxfConfig) -> (EntityRecord, NotificationCollection) {
    let terminated = format!("{}  0\nEOF\n", text);
    let mut reader = DxfReader::from_reader(Cursor::new(terminated.into_bytes()))
        .with_configuration(config.clone());
    let record = reader
        .next_entity()
        .unwrap_or_else(|e| panic!("reading failed: {e:?}"))
        .expect("a record");
    (record, reader.take_notifications())
}

/// Read a record body with the entity reader directly; the `0 / TYPE` tag
/// must already be stripped. Returns the stream so callers can inspect
/// what was left unread.
pub fn read_body(
    name: &str,
    body: &str,
    config: &DxfConfig,
) -> (dxf_tags::Result<EntityRecord>, NotificationCollection, DxfTextReader<Cursor<Vec<u8>>>) {
    let mut stream = DxfTextReader::new(Cursor::new(body.as_bytes().to_vec()));
    let mut notifications = NotificationCollection::new();
    let result = EntityReader::new(config).read_entity(&mut stream, name, None, &mut notifications);
    (result, notifications, stream)
}

/// Number of tags with group code `code` in `text`.
pub fn count_code(text: &str, code: i32) -> usize {
    tags(text).iter().filter(|(c, _)| *c == code).count()
}

/// Split written text into (code, value) pairs.
pub fn tags(text: &str) -> Vec<(i32, String)> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| (pair[0].trim().parse().expect("group code"), pair[1].to_string()))
        .collect()
}

// ===========================================================================
// Record builders
// ===========================================================================

/// A record of `type_name` with every field away from its default.
///
/// Values are derived from the field position so that no two scalar
/// fields of the same shape share a value; angles stay inside [0, 360).
pub fn populated(type_name: &str, config: &DxfConfig) -> EntityRecord {
    let mut record = EntityRecord::new(type_name, config).expect("registered type");
    let names: Vec<&'static str> = record.fields().map(|(name, _)| name).collect();

    for (i, name) in names.into_iter().enumerate() {
        let n = i as f64;
        let value = match record.get(name).expect("declared field") {
            FieldValue::Text(_) => FieldValue::Text(format!("V{}", i)),
            FieldValue::Double(_) => FieldValue::Double(1.25 + n * 0.5),
            FieldValue::Int(_) => FieldValue::Int(3),
            FieldValue::Handle(_) => FieldValue::Handle(Some(Handle::new(0x100 + i as u64))),
            FieldValue::Point(_) => FieldValue::Point(Vector3::new(1.5 + n, 2.5, 3.5)),
            FieldValue::Doubles(_) => FieldValue::Doubles(vec![0.5, 1.5, 2.5]),
            FieldValue::Texts(_) => FieldValue::Texts(vec![format!("A{}", i), format!("B{}", i)]),
            FieldValue::Points(_) => FieldValue::Points(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 2.0, 0.0),
                Vector3::new(4.0, 8.0, 1.0),
            ]),
            FieldValue::Vertices(_) => FieldValue::Vertices(vec![
                Vertex {
                    point: Vector3::new(0.0, 0.0, 0.0),
                    start_width: 0.5,
                    end_width: 0.25,
                    bulge: 1.0,
                },
                Vertex::new(5.0, 5.0),
            ]),
        };
        record.set(name, value).expect("same shape");
    }
    record
}

/// An ARC with center (5, 3, 0), radius 2.5, from 0 to 90 degrees.
pub fn quarter_arc(config: &DxfConfig) -> EntityRecord {
    let mut arc = EntityRecord::new("ARC", config).expect("ARC");
    arc.set("center", Vector3::new(5.0, 3.0, 0.0)).expect("center");
    arc.set("radius", 2.5).expect("radius");
    arc.set("start_angle", 0.0).expect("start");
    arc.set("end_angle", 90.0).expect("end");
    arc
}
