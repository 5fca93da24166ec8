//! Entity field descriptor tables.
//!
//! Every entity type is described by an ordered list of [`Row`]s mapping a
//! group code (plus the subclass and 102 group it appears in) to a field of
//! an [`EntityRecord`](crate::records::EntityRecord), together with the
//! coercion, write condition, version gate and repeat policy of that code.
//! One generic reader and one generic writer interpret these tables.

mod common;
mod entities;
mod registry;
mod tables;

pub use registry::{descriptor, registered_names};

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::config::DxfConfig;
use crate::error::Result;
use crate::io::dxf::group_code_value::{Coercion, GroupCodeValueType};
use crate::notification::NotificationCollection;
use crate::records::{EntityRecord, FieldValue};
use crate::types::{Axis, Capabilities, Capability, DxfVersion, Vector3};

/// Broad category of a described record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Graphical entity (ENTITIES or BLOCKS section)
    Entity,
    /// Symbol table header (`0 TABLE`)
    Table,
    /// Symbol table record (APPID, VIEW, ...)
    TableEntry,
}

/// Part of a lightweight polyline vertex addressed by a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexPart {
    X,
    Y,
    StartWidth,
    EndWidth,
    Bulge,
}

/// Where a row stores its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Whole scalar field (text, double, integer or handle)
    Scalar(&'static str),
    /// One component of a point field
    Axis(&'static str, Axis),
    /// One component of an element of a point array
    Element(&'static str, Axis),
    /// Next element of a double or text array
    Push(&'static str),
    /// One part of an element of a vertex array
    Vertex(&'static str, VertexPart),
}

impl Target {
    /// Name of the field this target writes into.
    pub fn field(&self) -> &'static str {
        match *self {
            Target::Scalar(f)
            | Target::Axis(f, _)
            | Target::Element(f, _)
            | Target::Push(f)
            | Target::Vertex(f, _) => f,
        }
    }
}

/// How repeated occurrences of a code within one entity are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// A later occurrence overwrites the earlier one
    Once,
    /// Each occurrence advances this row's own running index
    Indexed,
    /// Writes into the element most recently opened by the lead row of
    /// the same field
    Follow,
}

/// Write-side emission rule for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Always written
    Always,
    /// Omitted when the field equals its default
    NonDefault,
    /// Omitted when the text or array is empty
    NonEmpty,
    /// Omitted when the handle is unassigned
    Assigned,
    /// Written only with the flatland toggle and a non-zero value
    FlatlandElevation,
    /// Written when `field & mask` is non-zero
    FlagAny { field: &'static str, mask: i64 },
    /// Written when `field & mask` is one of `values`
    FlagIn {
        field: &'static str,
        mask: i64,
        values: &'static [i64],
    },
}

/// Default of a field, resolved against the configuration at allocation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    Value(FieldValue),
    Layer,
    Linetype,
    LinetypeScale,
}

impl FieldDefault {
    /// Concrete default value under `config`.
    pub fn resolve(&self, config: &DxfConfig) -> FieldValue {
        match self {
            FieldDefault::Value(v) => v.clone(),
            FieldDefault::Layer => FieldValue::Text(config.default_layer.clone()),
            FieldDefault::Linetype => FieldValue::Text(config.default_linetype.clone()),
            FieldDefault::LinetypeScale => FieldValue::Double(config.default_linetype_scale),
        }
    }
}

/// Declaration of one record field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub default: FieldDefault,
    /// An empty text value is replaced by the default after reading and
    /// before writing.
    pub repair_empty: bool,
}

/// What a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Subclass marker (code 100) opening a section of rows
    Subclass(&'static str),
    /// Subclass marker written inside the current section, for markers
    /// that only qualify it (`AcDb2dPolyline`, `AcDbRotatedDimension`)
    Marker(&'static str),
    /// A value row
    Value(Target),
}

/// One row of a descriptor table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub code: i32,
    pub kind: RowKind,
    pub coercion: Coercion,
    pub repeat: RepeatPolicy,
    pub condition: WriteCondition,
    pub capability: Option<Capability>,
    /// Subclass the row belongs to, used to disambiguate shared codes
    pub context: Option<&'static str>,
    /// 102 group the row is written inside (`ACAD_REACTORS`)
    pub bracket: Option<&'static str>,
    /// Values longer than the configured chunk size are split over
    /// several tags of the same code
    pub binary_chunks: bool,
}

impl Row {
    /// Whether the row's own capability gate passes.
    pub fn is_gated_in(&self, capabilities: Capabilities) -> bool {
        self.capability.map_or(true, |c| capabilities.supports(c))
    }

    /// Whether the row is emitted at all under `capabilities`.
    pub fn is_enabled(&self, capabilities: Capabilities) -> bool {
        let gate = self.is_gated_in(capabilities);
        match self.kind {
            RowKind::Subclass(_) | RowKind::Marker(_) => gate && capabilities.subclass_markers(),
            RowKind::Value(_) => gate,
        }
    }

    /// Target of a value row.
    pub fn target(&self) -> Option<Target> {
        match self.kind {
            RowKind::Value(t) => Some(t),
            RowKind::Subclass(_) | RowKind::Marker(_) => None,
        }
    }
}

/// Repairs applied after a record has been read.
pub type AfterReadHook = fn(&mut EntityRecord, &DxfConfig, &mut NotificationCollection);

/// Repairs and validation before a record is written. An error skips
/// the entity.
pub type PrepareWriteHook =
    fn(&mut EntityRecord, &DxfConfig, &mut NotificationCollection) -> Result<()>;

/// Complete table for one entity type.
#[derive(Debug)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub kind: RecordKind,
    /// Subclass markers a reader accepts without warning
    pub subclasses: Vec<&'static str>,
    pub fields: IndexMap<&'static str, FieldSpec>,
    pub rows: Vec<Row>,
    /// Oldest version the entity may be written for
    pub min_version: Option<DxfVersion>,
    pub after_read: Option<AfterReadHook>,
    pub prepare_write: Option<PrepareWriteHook>,
    code_index: AHashMap<i32, Vec<usize>>,
}

impl EntityDescriptor {
    /// Indices of the value rows that carry `code`.
    pub fn rows_for_code(&self, code: i32) -> &[usize] {
        self.code_index.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find the row a tag belongs to.
    ///
    /// Rows of the open 102 group win over ungrouped rows; among those the
    /// row declared under the current subclass wins, otherwise the first.
    pub fn lookup(&self, code: i32, subclass: Option<&str>, bracket: Option<&str>) -> Option<usize> {
        let candidates = self.rows_for_code(code);
        let grouped: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| bracket.is_some() && self.rows[i].bracket == bracket)
            .collect();
        let pool: Vec<usize> = if grouped.is_empty() {
            candidates
                .iter()
                .copied()
                .filter(|&i| self.rows[i].bracket.is_none())
                .collect()
        } else {
            grouped
        };

        pool.iter()
            .copied()
            .find(|&i| subclass.is_some() && self.rows[i].context == subclass)
            .or_else(|| pool.first().copied())
    }

    /// Whether any row is written inside the 102 group `name`.
    pub fn declares_group(&self, name: &str) -> bool {
        self.rows.iter().any(|r| r.bracket == Some(name))
    }

    /// Whether `name` is an expected subclass marker.
    pub fn accepts_subclass(&self, name: &str) -> bool {
        self.subclasses.iter().any(|s| *s == name)
    }

    /// Field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }
}

/// Builder for [`EntityDescriptor`] tables.
///
/// Row methods append rows under the most recent [`subclass`](Self::subclass);
/// modifiers such as [`gate`](Self::gate) and [`in_group`](Self::in_group)
/// apply to every row added by the previous row method.
pub struct DescriptorBuilder {
    descriptor: EntityDescriptor,
    context: Option<&'static str>,
    last: std::ops::Range<usize>,
}

impl DescriptorBuilder {
    pub fn new(name: &'static str, kind: RecordKind) -> Self {
        Self {
            descriptor: EntityDescriptor {
                name,
                kind,
                subclasses: Vec::new(),
                fields: IndexMap::new(),
                rows: Vec::new(),
                min_version: None,
                after_read: None,
                prepare_write: None,
                code_index: AHashMap::new(),
            },
            context: None,
            last: 0..0,
        }
    }

    fn declare(&mut self, field: &'static str, default: FieldDefault) {
        self.descriptor.fields.entry(field).or_insert(FieldSpec {
            default,
            repair_empty: false,
        });
    }

    fn push_rows(mut self, rows: Vec<(i32, RowKind, RepeatPolicy, WriteCondition)>) -> Self {
        let start = self.descriptor.rows.len();
        for (code, kind, repeat, condition) in rows {
            self.descriptor.rows.push(Row {
                code,
                kind,
                coercion: GroupCodeValueType::from_raw_code(code).coercion(),
                repeat,
                condition,
                capability: None,
                context: self.context,
                bracket: None,
                binary_chunks: false,
            });
        }
        self.last = start..self.descriptor.rows.len();
        self
    }

    fn scalar(
        mut self,
        code: i32,
        field: &'static str,
        default: FieldDefault,
        condition: WriteCondition,
    ) -> Self {
        self.declare(field, default);
        self.push_rows(vec![(
            code,
            RowKind::Value(Target::Scalar(field)),
            RepeatPolicy::Once,
            condition,
        )])
    }

    /// Open a subclass section; always written when markers are supported.
    pub fn subclass(self, name: &'static str) -> Self {
        self.subclass_when(name, WriteCondition::Always)
    }

    /// Open a subclass section whose marker is written only under `condition`.
    pub fn subclass_when(mut self, name: &'static str, condition: WriteCondition) -> Self {
        if !self.descriptor.subclasses.contains(&name) {
            self.descriptor.subclasses.push(name);
        }
        self.context = Some(name);
        self.push_rows(vec![(100, RowKind::Subclass(name), RepeatPolicy::Once, condition)])
    }

    /// Qualifying marker written under `condition` without opening a
    /// section; following rows stay in the current section.
    pub fn marker_when(mut self, name: &'static str, condition: WriteCondition) -> Self {
        if !self.descriptor.subclasses.contains(&name) {
            self.descriptor.subclasses.push(name);
        }
        self.push_rows(vec![(100, RowKind::Marker(name), RepeatPolicy::Once, condition)])
    }

    /// Text field, kept verbatim even on handle-class codes.
    pub fn text(self, code: i32, field: &'static str, default: &str, condition: WriteCondition) -> Self {
        self.scalar(code, field, FieldDefault::Value(FieldValue::Text(default.to_string())), condition)
            .coerce(Coercion::Verbatim)
    }

    pub fn double(self, code: i32, field: &'static str, default: f64, condition: WriteCondition) -> Self {
        self.scalar(code, field, FieldDefault::Value(FieldValue::Double(default)), condition)
    }

    pub fn int(self, code: i32, field: &'static str, default: i64, condition: WriteCondition) -> Self {
        self.scalar(code, field, FieldDefault::Value(FieldValue::Int(default)), condition)
    }

    /// Hex handle, unassigned by default and omitted while unassigned.
    pub fn handle(self, code: i32, field: &'static str) -> Self {
        self.scalar(code, field, FieldDefault::Value(FieldValue::Handle(None)), WriteCondition::Assigned)
    }

    /// Field whose default comes from the configuration.
    pub fn configured(
        self,
        code: i32,
        field: &'static str,
        default: FieldDefault,
        condition: WriteCondition,
    ) -> Self {
        self.scalar(code, field, default, condition)
    }

    /// Point stored under `code`, `code + 10`, `code + 20`.
    pub fn point(mut self, code: i32, field: &'static str, default: Vector3, condition: WriteCondition) -> Self {
        self.declare(field, FieldDefault::Value(FieldValue::Point(default)));
        self.push_rows(
            [Axis::X, Axis::Y, Axis::Z]
                .into_iter()
                .map(|a| {
                    (
                        code + a.code_offset(),
                        RowKind::Value(Target::Axis(field, a)),
                        RepeatPolicy::Once,
                        condition,
                    )
                })
                .collect(),
        )
    }

    /// Point with only X and Y on the wire; Z keeps its default.
    pub fn point2d(mut self, code: i32, field: &'static str, default: Vector3, condition: WriteCondition) -> Self {
        self.declare(field, FieldDefault::Value(FieldValue::Point(default)));
        self.push_rows(
            [Axis::X, Axis::Y]
                .into_iter()
                .map(|a| {
                    (
                        code + a.code_offset(),
                        RowKind::Value(Target::Axis(field, a)),
                        RepeatPolicy::Once,
                        condition,
                    )
                })
                .collect(),
        )
    }

    /// Extrusion direction (210/220/230), default (0, 0, 1), R12 and later.
    pub fn extrusion(self) -> Self {
        self.point(210, "extrusion", Vector3::UNIT_Z, WriteCondition::NonDefault)
            .gate(Capability::Extrusion)
    }

    /// Array of points; each axis code keeps its own running index.
    pub fn points(mut self, code: i32, field: &'static str, axes: &[Axis]) -> Self {
        self.declare(field, FieldDefault::Value(FieldValue::Points(Vec::new())));
        self.push_rows(
            axes.iter()
                .map(|&a| {
                    (
                        code + a.code_offset(),
                        RowKind::Value(Target::Element(field, a)),
                        RepeatPolicy::Indexed,
                        WriteCondition::NonEmpty,
                    )
                })
                .collect(),
        )
    }

    /// Array of doubles from a repeated code.
    pub fn doubles(mut self, code: i32, field: &'static str) -> Self {
        self.declare(field, FieldDefault::Value(FieldValue::Doubles(Vec::new())));
        self.push_rows(vec![(
            code,
            RowKind::Value(Target::Push(field)),
            RepeatPolicy::Indexed,
            WriteCondition::NonEmpty,
        )])
    }

    /// Array of texts from a repeated code, kept verbatim.
    pub fn texts(mut self, code: i32, field: &'static str) -> Self {
        self.declare(field, FieldDefault::Value(FieldValue::Texts(Vec::new())));
        self = self.push_rows(vec![(
            code,
            RowKind::Value(Target::Push(field)),
            RepeatPolicy::Indexed,
            WriteCondition::NonEmpty,
        )]);
        self.coerce(Coercion::Verbatim)
    }

    /// Binary data chunks (310), split on write at the configured size.
    pub fn binary(self, code: i32, field: &'static str) -> Self {
        let mut builder = self.texts(code, field);
        for i in builder.last.clone() {
            builder.descriptor.rows[i].binary_chunks = true;
        }
        builder
    }

    /// Lightweight polyline vertices: 10/20 open an element, 40/41/42
    /// fill the element most recently opened.
    pub fn vertices(mut self, field: &'static str) -> Self {
        self.declare(field, FieldDefault::Value(FieldValue::Vertices(Vec::new())));
        let part = |code, part, repeat| {
            (
                code,
                RowKind::Value(Target::Vertex(field, part)),
                repeat,
                WriteCondition::NonEmpty,
            )
        };
        self.push_rows(vec![
            part(10, VertexPart::X, RepeatPolicy::Indexed),
            part(20, VertexPart::Y, RepeatPolicy::Follow),
            part(40, VertexPart::StartWidth, RepeatPolicy::Follow),
            part(41, VertexPart::EndWidth, RepeatPolicy::Follow),
            part(42, VertexPart::Bulge, RepeatPolicy::Follow),
        ])
    }

    /// Gate the previous rows behind a version capability.
    pub fn gate(mut self, capability: Capability) -> Self {
        for i in self.last.clone() {
            self.descriptor.rows[i].capability = Some(capability);
        }
        self
    }

    /// Place the previous rows inside a 102 group.
    pub fn in_group(mut self, name: &'static str) -> Self {
        for i in self.last.clone() {
            self.descriptor.rows[i].bracket = Some(name);
        }
        self
    }

    /// Override the coercion of the previous rows.
    pub fn coerce(mut self, coercion: Coercion) -> Self {
        for i in self.last.clone() {
            self.descriptor.rows[i].coercion = coercion;
        }
        self
    }

    /// Replace empty text in the previous rows' field by its default.
    pub fn repair_empty(mut self) -> Self {
        for i in self.last.clone() {
            if let RowKind::Value(target) = self.descriptor.rows[i].kind {
                if let Some(spec) = self.descriptor.fields.get_mut(target.field()) {
                    spec.repair_empty = true;
                }
            }
        }
        self
    }

    pub fn min_version(mut self, version: DxfVersion) -> Self {
        self.descriptor.min_version = Some(version);
        self
    }

    pub fn after_read(mut self, hook: AfterReadHook) -> Self {
        self.descriptor.after_read = Some(hook);
        self
    }

    pub fn prepare_write(mut self, hook: PrepareWriteHook) -> Self {
        self.descriptor.prepare_write = Some(hook);
        self
    }

    pub fn build(mut self) -> EntityDescriptor {
        let mut index: AHashMap<i32, Vec<usize>> = AHashMap::new();
        for (i, row) in self.descriptor.rows.iter().enumerate() {
            if let RowKind::Value(_) = row.kind {
                index.entry(row.code).or_default().push(i);
            }
        }
        self.descriptor.code_index = index;
        self.descriptor
    }
}
