//! Read-only views over integer flag fields.
//!
//! Flags travel as plain integers (group 70 and friends); these types only
//! interpret the stored value and never modify a record.

use bitflags::bitflags;

use crate::records::EntityRecord;

/// Whether bit `n` of `flags` is set. Bits past 63 are never set.
pub fn bit_is_set(flags: i64, n: u32) -> bool {
    n < 64 && (flags >> n) & 1 == 1
}

fn read(record: &EntityRecord, field: &str) -> Option<i32> {
    record.int(field).map(|v| v as i32)
}

bitflags! {
    /// Edge visibility of a 3DFACE (70).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FaceEdges: i32 {
        const FIRST_INVISIBLE = 0x1;
        const SECOND_INVISIBLE = 0x2;
        const THIRD_INVISIBLE = 0x4;
        const FOURTH_INVISIBLE = 0x8;
    }
}

impl FaceEdges {
    pub const FIELD: &'static str = "edge_flags";

    pub fn of(record: &EntityRecord) -> Option<Self> {
        read(record, Self::FIELD).map(Self::from_bits_truncate)
    }

    /// Whether edge `edge` (0..=3) is hidden.
    pub fn is_invisible(&self, edge: u32) -> bool {
        bit_is_set(self.bits() as i64, edge)
    }
}

bitflags! {
    /// Behavior of an ATTDEF (70).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributeFlags: i32 {
        const INVISIBLE = 0x1;
        const CONSTANT = 0x2;
        /// Input must be verified on insertion
        const VERIFY = 0x4;
        /// Inserted without prompting
        const PRESET = 0x8;
    }
}

impl AttributeFlags {
    pub const FIELD: &'static str = "attribute_flags";

    pub fn of(record: &EntityRecord) -> Option<Self> {
        read(record, Self::FIELD).map(Self::from_bits_truncate)
    }
}

bitflags! {
    /// Standard flags of a symbol table record (70).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymbolFlags: i32 {
        /// APPID only: the application's extended data is not written to R12
        const NO_XDATA = 0x1;
        const XREF_DEPENDENT = 0x10;
        const XREF_RESOLVED = 0x20;
        /// Referenced by at least one entity the last time the drawing was edited
        const REFERENCED = 0x40;
    }
}

impl SymbolFlags {
    pub const FIELD: &'static str = "flags";

    pub fn of(record: &EntityRecord) -> Option<Self> {
        read(record, Self::FIELD).map(Self::from_bits_truncate)
    }
}

bitflags! {
    /// Block type flags of a BLOCK (70).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlockFlags: i32 {
        const ANONYMOUS = 0x1;
        const HAS_ATTRIBUTES = 0x2;
        const XREF = 0x4;
        const XREF_OVERLAY = 0x8;
        const EXTERNALLY_DEPENDENT = 0x10;
        const XREF_RESOLVED = 0x20;
        const REFERENCED = 0x40;
    }
}

impl BlockFlags {
    pub const FIELD: &'static str = "block_type";

    pub fn of(record: &EntityRecord) -> Option<Self> {
        read(record, Self::FIELD).map(Self::from_bits_truncate)
    }

    /// Blocks that carry an xref path (1).
    pub fn is_xref(&self) -> bool {
        self.intersects(BlockFlags::XREF | BlockFlags::XREF_RESOLVED)
    }
}
