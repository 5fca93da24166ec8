//! Version capability gating on write, and version-tolerant reading.

mod common;

use common::*;
use dxf_tags::{DxfConfig, DxfVersion, EntityRecord, Handle, NotificationType, WriteOutcome};

fn styled_line(config: &DxfConfig) -> EntityRecord {
    let mut line = EntityRecord::new("LINE", config).unwrap();
    line.set_handle(Some(Handle::new(0x2F))).unwrap();
    line.set("owner", "1F").unwrap();
    line.set("reactors", vec!["1F".to_string()]).unwrap();
    line
}

// ===========================================================================
// Subclass markers
// ===========================================================================

/// R12 output carries no subclass markers, R13 does
#[test]
fn test_markers_from_r13() {
    for version in GATE_VERSIONS {
        let config = DxfConfig::for_version(version);
        let text = write_text(&quarter_arc(&config), &config);
        let markers = count_code(&text, 100);
        if version >= DxfVersion::R13 {
            assert_eq!(markers, 3, "{}", version);
        } else {
            assert_eq!(markers, 0, "{}", version);
        }
    }
}

/// Records written without markers still read into the right fields
#[test]
fn test_r12_text_reads_back() {
    let config = DxfConfig::for_version(DxfVersion::R12);
    let arc = quarter_arc(&config);
    let text = write_text(&arc, &config);
    let (read_back, _) = read_one(&text, &config);
    assert_eq!(read_back, arc);
}

// ===========================================================================
// Ownership
// ===========================================================================

/// Reactor groups need R14, owner handles need R13
#[test]
fn test_ownership_gates() {
    let r12 = DxfConfig::for_version(DxfVersion::R12);
    let text = write_text(&styled_line(&r12), &r12);
    assert_eq!(count_code(&text, 102), 0);
    assert_eq!(count_code(&text, 330), 0);
    assert_eq!(count_code(&text, 5), 1);

    let r13 = DxfConfig::for_version(DxfVersion::R13);
    let text = write_text(&styled_line(&r13), &r13);
    assert_eq!(count_code(&text, 102), 0);
    assert_eq!(count_code(&text, 330), 1);

    let r14 = DxfConfig::for_version(DxfVersion::R14);
    let text = write_text(&styled_line(&r14), &r14);
    assert_eq!(count_code(&text, 102), 2);
    assert_eq!(count_code(&text, 330), 2);
    assert!(text.contains("102\n{ACAD_REACTORS\n330\n1F\n102\n}\n330\n1F\n"));
}

// ===========================================================================
// Optional groups
// ===========================================================================

/// True color and material rows follow their capabilities
#[test]
fn test_graphics_extras_gates() {
    for version in [DxfVersion::R2000, DxfVersion::R2004, DxfVersion::R2007] {
        let config = DxfConfig::for_version(version);
        let mut spline = EntityRecord::new("SPLINE", &config).unwrap();
        spline.set("true_color", 0x00FF00i64).unwrap();
        spline.set("material", "40").unwrap();
        spline.set("lineweight", 25i64).unwrap();
        let text = write_text(&spline, &config);

        assert_eq!(count_code(&text, 370), 1, "{}", version);
        assert_eq!(count_code(&text, 420), (version >= DxfVersion::R2004) as usize, "{}", version);
        assert_eq!(count_code(&text, 347), (version >= DxfVersion::R2007) as usize, "{}", version);
    }
}

/// Extrusion is written from R12 on
#[test]
fn test_extrusion_gate() {
    for version in [DxfVersion::R11, DxfVersion::R12] {
        let config = DxfConfig::for_version(version);
        let mut line = EntityRecord::new("LINE", &config).unwrap();
        line.set("extrusion", dxf_tags::Vector3::new(0.0, 1.0, 0.0)).unwrap();
        let text = write_text(&line, &config);
        assert_eq!(count_code(&text, 210), (version >= DxfVersion::R12) as usize);
    }
}

/// The legacy elevation is written only for flatland targets
#[test]
fn test_flatland_elevation() {
    let mut line = EntityRecord::new("LINE", &DxfConfig::default()).unwrap();
    line.set("elevation", 4.0).unwrap();

    let flatland = DxfConfig::for_version(DxfVersion::R11).with_flatland(true);
    assert!(write_text(&line, &flatland).contains(" 38\n4.000000\n"));

    let plain = DxfConfig::for_version(DxfVersion::R11);
    assert_eq!(count_code(&write_text(&line, &plain), 38), 0);

    let modern = DxfConfig::for_version(DxfVersion::R2000).with_flatland(true);
    assert_eq!(count_code(&write_text(&line, &modern), 38), 0);
}

/// The BLOCK xref path follows the block type
#[test]
fn test_block_xref_path() {
    let config = DxfConfig::default();
    let mut block = EntityRecord::new("BLOCK", &config).unwrap();
    block.set("name", "PART").unwrap();
    block.set("xref_path", "part.dwg").unwrap();

    block.set("block_type", 1i64).unwrap();
    assert_eq!(count_code(&write_text(&block, &config), 1), 0);

    block.set("block_type", 4i64).unwrap();
    assert!(write_text(&block, &config).contains("  1\npart.dwg\n"));
}

// ===========================================================================
// Whole-entity gates
// ===========================================================================

/// Entities newer than the target are skipped with an error notification
#[test]
fn test_minimum_versions() {
    let cases = [
        ("HELIX", DxfVersion::R2007),
        ("SPLINE", DxfVersion::R13),
        ("DIMENSION", DxfVersion::R13),
        ("BLOCK_RECORD", DxfVersion::R13),
    ];
    for (name, required) in cases {
        let older = DxfConfig::for_version(DxfVersion::R12);
        let mut record = EntityRecord::new(name, &older).unwrap();
        if record.text("name").is_some() {
            record.set("name", "X").unwrap();
        }
        let (text, outcome, notifications) = write_one(&record, &older);
        assert!(matches!(outcome, WriteOutcome::Skipped(_)), "{}", name);
        assert!(text.is_empty());
        assert!(notifications.has_type(NotificationType::Error));

        let newer = DxfConfig::for_version(required);
        assert!(write_one(&record, &newer).1.is_written(), "{} at {}", name, required);
    }
}

/// Reading accepts fields newer than the declared version
#[test]
fn test_reading_is_version_tolerant() {
    let text = "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1009\n  0\nENDSEC\n  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n330\n1F\n  8\nA\n  0\nENDSEC\n  0\nEOF\n";
    let mut reader = dxf_tags::DxfReader::from_reader(std::io::Cursor::new(text.as_bytes().to_vec()));
    let line = reader.next_entity().unwrap().unwrap();
    assert_eq!(reader.version(), Some(DxfVersion::R12));
    assert_eq!(line.text("owner"), Some("1F"));
    assert_eq!(line.layer(), Some("A"));
}

/// DIMENSION writes the section of its type only
#[test]
fn test_dimension_sections() {
    let config = DxfConfig::default();
    let mut dim = EntityRecord::new("DIMENSION", &config).unwrap();

    dim.set("dim_type", 0i64).unwrap();
    let text = write_text(&dim, &config);
    assert!(text.contains("100\nAcDbAlignedDimension\n"));
    assert!(text.contains("100\nAcDbRotatedDimension\n"));

    dim.set("dim_type", 1i64).unwrap();
    let text = write_text(&dim, &config);
    assert!(text.contains("100\nAcDbAlignedDimension\n"));
    assert!(!text.contains("AcDbRotatedDimension"));

    dim.set("dim_type", 4i64 | 32).unwrap();
    let text = write_text(&dim, &config);
    assert!(text.contains("100\nAcDbRadialDimension\n"));
    assert!(!text.contains("AcDbAlignedDimension"));
    assert_eq!(count_code(&text, 13), 0);
}
