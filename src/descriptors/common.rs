//! Rows shared by many descriptors.

use super::{DescriptorBuilder, FieldDefault, WriteCondition};
use crate::io::dxf::group_code_value::Coercion;
use crate::types::color::BYLAYER;
use crate::types::Capability;

use WriteCondition::{Always, NonDefault, NonEmpty};

impl DescriptorBuilder {
    /// Handle, owner groups and soft owner, in the order every record
    /// starts with.
    pub(super) fn ownership(self) -> Self {
        self.handle(5, "handle")
            .texts(330, "reactors")
            .in_group("ACAD_REACTORS")
            .gate(Capability::ExtensionGroups)
            .text(360, "xdictionary", "", NonEmpty)
            .in_group("ACAD_XDICTIONARY")
            .gate(Capability::ExtensionGroups)
            .text(330, "owner", "", NonEmpty)
            .gate(Capability::R13Fields)
    }

    /// Common header of every graphical entity, through the `AcDbEntity`
    /// section.
    pub(super) fn entity_header(self) -> Self {
        self.ownership()
            .subclass("AcDbEntity")
            .int(67, "paperspace", 0, NonDefault)
            .configured(8, "layer", FieldDefault::Layer, Always)
            .coerce(Coercion::Verbatim)
            .repair_empty()
            .configured(6, "linetype", FieldDefault::Linetype, NonDefault)
            .coerce(Coercion::Verbatim)
            .repair_empty()
            .double(38, "elevation", 0.0, WriteCondition::FlatlandElevation)
            .gate(Capability::LegacyElevation)
            .int(62, "color", BYLAYER, NonDefault)
            .configured(48, "linetype_scale", FieldDefault::LinetypeScale, NonDefault)
            .int(60, "visibility", 0, NonDefault)
    }

    /// Material, lineweight, proxy graphics and true color rows written by
    /// the newer curve entities inside `AcDbEntity`.
    pub(super) fn graphics_extras(self) -> Self {
        self.text(347, "material", "", NonEmpty)
            .gate(Capability::Materials)
            .int(370, "lineweight", -1, NonDefault)
            .gate(Capability::R2000Fields)
            .int(92, "graphics_data_size", 0, NonDefault)
            .gate(Capability::R2000Fields)
            .binary(310, "graphics_data")
            .gate(Capability::R2000Fields)
            .int(420, "true_color", -1, NonDefault)
            .gate(Capability::TrueColor)
            .text(430, "color_name", "", NonEmpty)
            .gate(Capability::TrueColor)
            .int(440, "transparency", -1, NonDefault)
            .gate(Capability::TrueColor)
            .handle(390, "plot_style")
            .gate(Capability::R2000Fields)
            .int(284, "shadow_mode", 0, NonDefault)
            .gate(Capability::Materials)
    }

    /// Thickness (39), omitted at 0.0.
    pub(super) fn thickness(self) -> Self {
        self.double(39, "thickness", 0.0, NonDefault)
    }

    /// Header of a symbol table record: ownership, both subclass markers,
    /// name (2) and standard flags (70).
    pub(super) fn table_entry_header(self, record_subclass: &'static str) -> Self {
        self.ownership()
            .subclass("AcDbSymbolTableRecord")
            .subclass(record_subclass)
            .text(2, "name", "", Always)
            .int(70, "flags", 0, Always)
    }
}
