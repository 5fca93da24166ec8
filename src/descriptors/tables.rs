//! Descriptor tables of the TABLE header and symbol table records.

use super::entities::require_name;
use super::{DescriptorBuilder, EntityDescriptor, RecordKind, WriteCondition};
use crate::types::{Capability, DxfVersion, Vector3};

use WriteCondition::{Always, NonDefault};

pub(super) fn all() -> Vec<EntityDescriptor> {
    vec![table(), appid(), block_record(), view()]
}

fn table() -> EntityDescriptor {
    DescriptorBuilder::new("TABLE", RecordKind::Table)
        .text(2, "table_name", "", Always)
        .ownership()
        .subclass("AcDbSymbolTable")
        .int(70, "max_entries", 0, Always)
        .build()
}

fn appid() -> EntityDescriptor {
    DescriptorBuilder::new("APPID", RecordKind::TableEntry)
        .table_entry_header("AcDbRegAppTableRecord")
        .min_version(DxfVersion::R12)
        .prepare_write(require_name)
        .build()
}

fn block_record() -> EntityDescriptor {
    DescriptorBuilder::new("BLOCK_RECORD", RecordKind::TableEntry)
        .table_entry_header("AcDbBlockTableRecord")
        .handle(340, "layout")
        .int(280, "explodability", 1, NonDefault)
        .gate(Capability::R2000Fields)
        .int(281, "scalability", 0, NonDefault)
        .gate(Capability::R2000Fields)
        .binary(310, "preview")
        .gate(Capability::R2000Fields)
        .min_version(DxfVersion::R13)
        .prepare_write(require_name)
        .build()
}

fn view() -> EntityDescriptor {
    DescriptorBuilder::new("VIEW", RecordKind::TableEntry)
        .table_entry_header("AcDbViewTableRecord")
        .double(40, "height", 1.0, Always)
        .point2d(10, "center", Vector3::ZERO, Always)
        .double(41, "width", 1.0, Always)
        .point(11, "direction", Vector3::UNIT_Z, Always)
        .point(12, "target", Vector3::ZERO, Always)
        .double(42, "lens_length", 50.0, Always)
        .double(43, "front_clip", 0.0, Always)
        .double(44, "back_clip", 0.0, Always)
        .double(50, "twist_angle", 0.0, Always)
        .int(71, "view_mode", 0, Always)
        .prepare_write(require_name)
        .build()
}

#[cfg(test)]
mod tests {
    use crate::config::DxfConfig;
    use crate::descriptors::{descriptor, RecordKind};
    use crate::records::EntityRecord;

    #[test]
    fn test_table_kinds() {
        assert_eq!(descriptor("TABLE").unwrap().kind, RecordKind::Table);
        assert_eq!(descriptor("VIEW").unwrap().kind, RecordKind::TableEntry);
        assert!(descriptor("APPID").unwrap().accepts_subclass("AcDbRegAppTableRecord"));
    }

    #[test]
    fn test_view_defaults() {
        let view = EntityRecord::new("VIEW", &DxfConfig::default()).unwrap();
        assert_eq!(view.text("name"), Some(""));
        assert_eq!(view.double("lens_length"), Some(50.0));
        assert_eq!(view.int("flags"), Some(0));
    }
}
