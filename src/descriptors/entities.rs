//! Descriptor tables of the graphical entities.

use super::{DescriptorBuilder, EntityDescriptor, RecordKind, WriteCondition};
use crate::config::DxfConfig;
use crate::error::{DxfError, Result};
use crate::notification::{NotificationCollection, NotificationType};
use crate::records::{EntityRecord, FieldValue};
use crate::types::{Axis, Capability, DxfVersion, Vector3};

use WriteCondition::{Always, FlagAny, FlagIn, NonDefault, NonEmpty};

const XYZ: &[Axis] = &[Axis::X, Axis::Y, Axis::Z];

fn entity(name: &'static str) -> DescriptorBuilder {
    DescriptorBuilder::new(name, RecordKind::Entity).entity_header()
}

pub(super) fn all() -> Vec<EntityDescriptor> {
    vec![
        face3d(),
        solid3d(),
        arc(),
        attdef(),
        block(),
        endblk(),
        dimension(),
        helix(),
        image(),
        insert(),
        line(),
        lwpolyline(),
        mtext(),
        oleframe(),
        polyline(),
        seqend(),
        spline(),
        text(),
        vertex(),
    ]
}

fn face3d() -> EntityDescriptor {
    entity("3DFACE")
        .subclass("AcDbFace")
        .point(10, "first_corner", Vector3::ZERO, Always)
        .point(11, "second_corner", Vector3::ZERO, Always)
        .point(12, "third_corner", Vector3::ZERO, Always)
        .point(13, "fourth_corner", Vector3::ZERO, Always)
        .int(70, "edge_flags", 0, NonDefault)
        .build()
}

fn solid3d() -> EntityDescriptor {
    entity("3DSOLID")
        .subclass("AcDbModelerGeometry")
        .int(70, "modeler_version", 1, Always)
        .texts(1, "acis_data")
        .texts(3, "acis_data_extra")
        .subclass("AcDb3dSolid")
        .gate(Capability::Materials)
        .handle(350, "history")
        .min_version(DxfVersion::R13)
        .build()
}

fn arc() -> EntityDescriptor {
    entity("ARC")
        .subclass("AcDbCircle")
        .thickness()
        .point(10, "center", Vector3::ZERO, Always)
        .double(40, "radius", 0.0, Always)
        .subclass("AcDbArc")
        .double(50, "start_angle", 0.0, Always)
        .double(51, "end_angle", 0.0, Always)
        .extrusion()
        .prepare_write(validate_arc)
        .build()
}

fn attdef() -> EntityDescriptor {
    entity("ATTDEF")
        .subclass("AcDbText")
        .thickness()
        .point(10, "first_alignment", Vector3::ZERO, Always)
        .double(40, "height", 1.0, Always)
        .text(1, "default_value", "", Always)
        .double(50, "rotation", 0.0, NonDefault)
        .double(41, "x_scale", 1.0, NonDefault)
        .double(51, "oblique_angle", 0.0, NonDefault)
        .text(7, "style", "STANDARD", NonDefault)
        .int(71, "generation_flags", 0, NonDefault)
        .int(72, "horizontal_alignment", 0, NonDefault)
        .point(11, "second_alignment", Vector3::ZERO, NonDefault)
        .extrusion()
        .subclass("AcDbAttributeDefinition")
        .text(3, "prompt", "", Always)
        .text(2, "tag", "", Always)
        .int(70, "attribute_flags", 0, Always)
        .int(73, "field_length", 0, NonDefault)
        .int(74, "vertical_alignment", 0, NonDefault)
        .build()
}

fn block() -> EntityDescriptor {
    entity("BLOCK")
        .subclass("AcDbBlockBegin")
        .text(2, "name", "", Always)
        .int(70, "block_type", 0, Always)
        .point(10, "base_point", Vector3::ZERO, Always)
        .text(3, "name", "", Always)
        .gate(Capability::R13Fields)
        .text(1, "xref_path", "", FlagAny { field: "block_type", mask: 0x24 })
        .gate(Capability::R13Fields)
        .text(4, "description", "", NonEmpty)
        .gate(Capability::R2000Fields)
        .after_read(repair_block)
        .prepare_write(require_name)
        .build()
}

fn endblk() -> EntityDescriptor {
    entity("ENDBLK").subclass("AcDbBlockEnd").build()
}

fn dimension() -> EntityDescriptor {
    let kind = |values: &'static [i64]| FlagIn {
        field: "dim_type",
        mask: 0x07,
        values,
    };

    entity("DIMENSION")
        .subclass("AcDbDimension")
        .text(2, "block_name", "", Always)
        .point(10, "definition_point", Vector3::ZERO, Always)
        .point(11, "text_midpoint", Vector3::ZERO, Always)
        .int(70, "dim_type", 0, Always)
        .int(71, "attachment_point", 0, NonDefault)
        .int(72, "line_spacing_style", 0, NonDefault)
        .double(41, "line_spacing_factor", 1.0, NonDefault)
        .double(42, "measurement", 0.0, NonDefault)
        .text(1, "text", "", NonEmpty)
        .double(53, "text_rotation", 0.0, NonDefault)
        .double(51, "horizontal_direction", 0.0, NonDefault)
        .extrusion()
        .text(3, "style", "STANDARD", Always)
        .subclass_when("AcDbAlignedDimension", kind(&[0, 1]))
        .point(12, "insertion_point", Vector3::ZERO, NonDefault)
        .point(13, "first_point", Vector3::ZERO, Always)
        .point(14, "second_point", Vector3::ZERO, Always)
        .double(50, "angle", 0.0, NonDefault)
        .double(52, "oblique_angle", 0.0, NonDefault)
        .marker_when("AcDbRotatedDimension", kind(&[0]))
        .subclass_when("AcDb2LineAngularDimension", kind(&[2]))
        .point(13, "first_point", Vector3::ZERO, Always)
        .point(14, "second_point", Vector3::ZERO, Always)
        .point(15, "third_point", Vector3::ZERO, Always)
        .point(16, "arc_point", Vector3::ZERO, Always)
        .subclass_when("AcDbDiametricDimension", kind(&[3]))
        .point(15, "third_point", Vector3::ZERO, Always)
        .double(40, "leader_length", 0.0, Always)
        .subclass_when("AcDbRadialDimension", kind(&[4]))
        .point(15, "third_point", Vector3::ZERO, Always)
        .double(40, "leader_length", 0.0, Always)
        .subclass_when("AcDb3PointAngularDimension", kind(&[5]))
        .point(13, "first_point", Vector3::ZERO, Always)
        .point(14, "second_point", Vector3::ZERO, Always)
        .point(15, "third_point", Vector3::ZERO, Always)
        .point(16, "arc_point", Vector3::ZERO, Always)
        .subclass_when("AcDbOrdinateDimension", kind(&[6]))
        .point(13, "first_point", Vector3::ZERO, Always)
        .point(14, "second_point", Vector3::ZERO, Always)
        .min_version(DxfVersion::R13)
        .build()
}

/// Rows of the `AcDbSpline` section, shared by SPLINE and HELIX.
fn spline_section(builder: DescriptorBuilder) -> DescriptorBuilder {
    builder
        .subclass("AcDbSpline")
        .extrusion()
        .int(70, "flags", 0, Always)
        .int(71, "degree", 3, Always)
        .int(72, "knot_count", 0, Always)
        .int(73, "control_point_count", 0, Always)
        .int(74, "fit_point_count", 0, Always)
        .double(42, "knot_tolerance", 1e-10, NonDefault)
        .double(43, "control_point_tolerance", 1e-10, NonDefault)
        .double(44, "fit_tolerance", 1e-10, NonDefault)
        .point(12, "start_tangent", Vector3::ZERO, NonDefault)
        .point(13, "end_tangent", Vector3::ZERO, NonDefault)
        .doubles(40, "knots")
        .doubles(41, "weights")
        .points(10, "control_points", XYZ)
        .points(11, "fit_points", XYZ)
}

fn spline() -> EntityDescriptor {
    spline_section(entity("SPLINE").thickness().graphics_extras())
        .min_version(DxfVersion::R13)
        .after_read(check_spline_counts)
        .prepare_write(set_spline_counts)
        .build()
}

fn helix() -> EntityDescriptor {
    spline_section(entity("HELIX").thickness().graphics_extras())
        .subclass("AcDbHelix")
        .int(90, "major_release", 0, Always)
        .int(91, "maintenance_release", 0, Always)
        .point(10, "axis_base_point", Vector3::ZERO, Always)
        .point(11, "start_point", Vector3::ZERO, Always)
        .point(12, "axis_vector", Vector3::UNIT_Z, Always)
        .double(40, "helix_radius", 1.0, Always)
        .double(41, "turns", 1.0, Always)
        .double(42, "turn_height", 1.0, Always)
        .int(290, "handedness", 1, Always)
        .int(280, "constraint", 0, Always)
        .min_version(DxfVersion::R2007)
        .after_read(check_spline_counts)
        .prepare_write(set_spline_counts)
        .build()
}

fn image() -> EntityDescriptor {
    entity("IMAGE")
        .subclass("AcDbRasterImage")
        .thickness()
        .int(90, "class_version", 0, Always)
        .point(10, "insertion_point", Vector3::ZERO, Always)
        .point(11, "u_vector", Vector3::new(1.0, 0.0, 0.0), Always)
        .point(12, "v_vector", Vector3::new(0.0, 1.0, 0.0), Always)
        .point2d(13, "image_size", Vector3::ZERO, Always)
        .handle(340, "image_def")
        .int(70, "display_properties", 0, Always)
        .int(280, "clipping", 0, Always)
        .int(281, "brightness", 50, Always)
        .int(282, "contrast", 50, Always)
        .int(283, "fade", 0, Always)
        .handle(360, "image_def_reactor")
        .int(71, "clip_boundary_type", 1, Always)
        .int(91, "clip_vertex_count", 0, Always)
        .points(14, "clip_vertices", &[Axis::X, Axis::Y])
        .min_version(DxfVersion::R13)
        .after_read(check_image_counts)
        .prepare_write(set_image_counts)
        .build()
}

fn insert() -> EntityDescriptor {
    entity("INSERT")
        .subclass("AcDbBlockReference")
        .thickness()
        .int(66, "attributes_follow", 0, NonDefault)
        .text(2, "block_name", "", Always)
        .point(10, "insertion_point", Vector3::ZERO, Always)
        .double(41, "x_scale", 1.0, NonDefault)
        .double(42, "y_scale", 1.0, NonDefault)
        .double(43, "z_scale", 1.0, NonDefault)
        .double(50, "rotation", 0.0, NonDefault)
        .int(70, "columns", 1, NonDefault)
        .int(71, "rows", 1, NonDefault)
        .double(44, "column_spacing", 0.0, NonDefault)
        .double(45, "row_spacing", 0.0, NonDefault)
        .extrusion()
        .prepare_write(repair_insert)
        .build()
}

fn line() -> EntityDescriptor {
    entity("LINE")
        .subclass("AcDbLine")
        .thickness()
        .point(10, "start", Vector3::ZERO, Always)
        .point(11, "end", Vector3::ZERO, Always)
        .extrusion()
        .build()
}

fn lwpolyline() -> EntityDescriptor {
    entity("LWPOLYLINE")
        .subclass("AcDbPolyline")
        .int(90, "vertex_count", 0, Always)
        .int(70, "flags", 0, NonDefault)
        .double(43, "constant_width", 0.0, NonDefault)
        .double(38, "elevation", 0.0, NonDefault)
        .thickness()
        .vertices("vertices")
        .extrusion()
        .after_read(check_vertex_count)
        .prepare_write(set_vertex_count)
        .build()
}

fn mtext() -> EntityDescriptor {
    entity("MTEXT")
        .subclass("AcDbMText")
        .point(10, "insertion_point", Vector3::ZERO, Always)
        .double(40, "height", 1.0, Always)
        .double(41, "reference_width", 0.0, NonDefault)
        .int(71, "attachment_point", 1, Always)
        .int(72, "drawing_direction", 1, NonDefault)
        .texts(3, "text_chunks")
        .text(1, "text", "", Always)
        .text(7, "style", "STANDARD", NonDefault)
        .extrusion()
        .point(11, "x_direction", Vector3::new(1.0, 0.0, 0.0), NonDefault)
        .double(42, "horizontal_width", 0.0, NonDefault)
        .double(43, "rectangle_height", 0.0, NonDefault)
        .double(50, "rotation", 0.0, NonDefault)
        .build()
}

fn oleframe() -> EntityDescriptor {
    entity("OLEFRAME")
        .subclass("AcDbOleFrame")
        .thickness()
        .int(70, "ole_version", 2, Always)
        .int(90, "data_length", 0, Always)
        .binary(310, "data")
        .text(1, "end_marker", "OLE", Always)
        .build()
}

fn polyline() -> EntityDescriptor {
    entity("POLYLINE")
        .marker_when("AcDb2dPolyline", FlagIn { field: "flags", mask: 0x58, values: &[0] })
        .marker_when("AcDb3dPolyline", FlagAny { field: "flags", mask: 0x08 })
        .marker_when("AcDbPolygonMesh", FlagAny { field: "flags", mask: 0x10 })
        .marker_when("AcDbPolyFaceMesh", FlagAny { field: "flags", mask: 0x40 })
        .int(66, "vertices_follow", 1, Always)
        .point(10, "dummy_point", Vector3::ZERO, Always)
        .thickness()
        .int(70, "flags", 0, NonDefault)
        .double(40, "start_width", 0.0, NonDefault)
        .double(41, "end_width", 0.0, NonDefault)
        .int(71, "mesh_m_count", 0, NonDefault)
        .int(72, "mesh_n_count", 0, NonDefault)
        .int(73, "smooth_m_density", 0, NonDefault)
        .int(74, "smooth_n_density", 0, NonDefault)
        .int(75, "surface_type", 0, NonDefault)
        .extrusion()
        .build()
}

fn seqend() -> EntityDescriptor {
    entity("SEQEND").build()
}

fn text() -> EntityDescriptor {
    entity("TEXT")
        .subclass("AcDbText")
        .thickness()
        .point(10, "first_alignment", Vector3::ZERO, Always)
        .double(40, "height", 1.0, Always)
        .text(1, "text", "", Always)
        .double(50, "rotation", 0.0, NonDefault)
        .double(41, "x_scale", 1.0, NonDefault)
        .double(51, "oblique_angle", 0.0, NonDefault)
        .text(7, "style", "STANDARD", NonDefault)
        .int(71, "generation_flags", 0, NonDefault)
        .int(72, "horizontal_alignment", 0, NonDefault)
        .point(11, "second_alignment", Vector3::ZERO, NonDefault)
        .extrusion()
        .subclass("AcDbText")
        .int(73, "vertical_alignment", 0, NonDefault)
        .build()
}

fn vertex() -> EntityDescriptor {
    entity("VERTEX")
        .subclass("AcDbVertex")
        .marker_when("AcDb2dVertex", FlagIn { field: "flags", mask: 0xE0, values: &[0] })
        .marker_when("AcDb3dPolylineVertex", FlagAny { field: "flags", mask: 0x20 })
        .marker_when("AcDbPolygonMeshVertex", FlagAny { field: "flags", mask: 0x40 })
        .marker_when("AcDbPolyFaceMeshVertex", FlagAny { field: "flags", mask: 0x80 })
        .point(10, "location", Vector3::ZERO, Always)
        .double(40, "start_width", 0.0, NonDefault)
        .double(41, "end_width", 0.0, NonDefault)
        .double(42, "bulge", 0.0, NonDefault)
        .int(70, "flags", 0, NonDefault)
        .double(50, "tangent_direction", 0.0, NonDefault)
        .int(71, "face_index_1", 0, NonDefault)
        .int(72, "face_index_2", 0, NonDefault)
        .int(73, "face_index_3", 0, NonDefault)
        .int(74, "face_index_4", 0, NonDefault)
        .build()
}

// ===== Hooks =====

pub(super) fn invalid(record: &EntityRecord, reason: impl Into<String>) -> DxfError {
    DxfError::InvalidEntity {
        entity: record.type_name().to_string(),
        handle: record.handle().map(|h| h.value()),
        reason: reason.into(),
    }
}

fn warn(record: &EntityRecord, notifications: &mut NotificationCollection, message: String) {
    notifications.push(record.notification(NotificationType::Warning, message));
}

fn validate_arc(record: &mut EntityRecord, _: &DxfConfig, _: &mut NotificationCollection) -> Result<()> {
    let start = record.double("start_angle").unwrap_or_default();
    let end = record.double("end_angle").unwrap_or_default();
    let radius = record.double("radius").unwrap_or_default();

    if start == end {
        return Err(invalid(record, format!("start angle equals end angle ({})", start)));
    }
    for (name, angle) in [("start", start), ("end", end)] {
        if !(0.0..360.0).contains(&angle) {
            return Err(invalid(record, format!("{} angle {} outside [0, 360)", name, angle)));
        }
    }
    if radius == 0.0 {
        return Err(invalid(record, "radius is 0.0"));
    }
    Ok(())
}

/// Names are mandatory for blocks and named table records.
pub(super) fn require_name(record: &mut EntityRecord, _: &DxfConfig, _: &mut NotificationCollection) -> Result<()> {
    match record.text("name") {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(invalid(record, "name is empty")),
    }
}

fn repair_block(record: &mut EntityRecord, _: &DxfConfig, notifications: &mut NotificationCollection) {
    if record.text("name") == Some("") {
        let name = record
            .handle()
            .map(|h| h.value().to_string())
            .unwrap_or_else(|| "*U".to_string());
        warn(record, notifications, format!("empty block name replaced by '{}'", name));
        set_repaired(record, notifications, "name", name);
    }
    if record.int("block_type") == Some(0) {
        warn(record, notifications, "block type 0 reset to 1".to_string());
        set_repaired(record, notifications, "block_type", 1i64);
    }
}

/// Store a repaired value; a refused value is reported as an error.
fn set_repaired(
    record: &mut EntityRecord,
    notifications: &mut NotificationCollection,
    field: &str,
    value: impl Into<FieldValue>,
) {
    if let Err(err) = record.set(field, value) {
        notifications.push(record.notification(NotificationType::Error, err.to_string()));
    }
}

fn repair_insert(record: &mut EntityRecord, _: &DxfConfig, notifications: &mut NotificationCollection) -> Result<()> {
    for field in ["x_scale", "y_scale", "z_scale"] {
        if record.double(field) == Some(0.0) {
            warn(record, notifications, format!("{} of 0.0 replaced by 1.0", field));
            record.set(field, 1.0)?;
        }
    }
    for (count, spacing) in [("columns", "column_spacing"), ("rows", "row_spacing")] {
        let n = record.int(count).unwrap_or(1);
        if n > 1 && record.double(spacing) == Some(0.0) {
            warn(record, notifications, format!("{} {} with {} 0.0 reset to 1", n, count, spacing));
            record.set(count, 1i64)?;
        }
    }
    Ok(())
}

/// Count fields and the arrays they describe.
const SPLINE_COUNTS: [(&str, &str); 3] = [
    ("knot_count", "knots"),
    ("control_point_count", "control_points"),
    ("fit_point_count", "fit_points"),
];

fn array_len(record: &EntityRecord, field: &str) -> usize {
    record.get(field).and_then(|v| v.array_len()).unwrap_or(0)
}

fn check_counts(record: &EntityRecord, notifications: &mut NotificationCollection, pairs: &[(&str, &str)]) {
    for (count, array) in pairs {
        let declared = record.int(count).unwrap_or(0);
        let actual = array_len(record, array);
        if declared != actual as i64 {
            warn(
                record,
                notifications,
                format!("{} is {} but {} {} were read", count, declared, actual, array),
            );
        }
    }
}

fn set_counts(record: &mut EntityRecord, pairs: &[(&str, &str)]) -> Result<()> {
    for (count, array) in pairs {
        let actual = array_len(record, array) as i64;
        record.set(count, actual)?;
    }
    Ok(())
}

fn check_spline_counts(record: &mut EntityRecord, _: &DxfConfig, notifications: &mut NotificationCollection) {
    check_counts(record, notifications, &SPLINE_COUNTS);
}

fn set_spline_counts(record: &mut EntityRecord, _: &DxfConfig, _: &mut NotificationCollection) -> Result<()> {
    set_counts(record, &SPLINE_COUNTS)
}

fn check_vertex_count(record: &mut EntityRecord, _: &DxfConfig, notifications: &mut NotificationCollection) {
    check_counts(record, notifications, &[("vertex_count", "vertices")]);
}

fn set_vertex_count(record: &mut EntityRecord, _: &DxfConfig, _: &mut NotificationCollection) -> Result<()> {
    set_counts(record, &[("vertex_count", "vertices")])
}

fn check_image_counts(record: &mut EntityRecord, _: &DxfConfig, notifications: &mut NotificationCollection) {
    check_counts(record, notifications, &[("clip_vertex_count", "clip_vertices")]);
}

fn set_image_counts(record: &mut EntityRecord, _: &DxfConfig, _: &mut NotificationCollection) -> Result<()> {
    set_counts(record, &[("clip_vertex_count", "clip_vertices")])
}
