//! Entity records: a flat, descriptor-shaped field map per entity.

mod store;

pub use store::{Chain, EntityStore, RecordId};

use std::fmt;

use indexmap::IndexMap;

use crate::config::DxfConfig;
use crate::descriptors::{self, EntityDescriptor};
use crate::error::{DxfError, Result};
use crate::notification::{Notification, NotificationType};
use crate::types::{Color, Handle, Vector3};

/// One lightweight polyline vertex (10/20, 40, 41, 42).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub point: Vector3,
    pub start_width: f64,
    pub end_width: f64,
    pub bulge: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            point: Vector3::new(x, y, 0.0),
            ..Self::default()
        }
    }
}

/// Value held by one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Double(f64),
    Int(i64),
    /// `None` means unassigned
    Handle(Option<Handle>),
    Point(Vector3),
    Doubles(Vec<f64>),
    Texts(Vec<String>),
    Points(Vec<Vector3>),
    Vertices(Vec<Vertex>),
}

impl FieldValue {
    /// Name of the value shape, used in type errors.
    pub fn shape(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Double(_) => "double",
            FieldValue::Int(_) => "integer",
            FieldValue::Handle(_) => "handle",
            FieldValue::Point(_) => "point",
            FieldValue::Doubles(_) => "double array",
            FieldValue::Texts(_) => "text array",
            FieldValue::Points(_) => "point array",
            FieldValue::Vertices(_) => "vertex array",
        }
    }

    fn same_shape(&self, other: &FieldValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Number of elements of an array value, `None` for scalars.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            FieldValue::Doubles(v) => Some(v.len()),
            FieldValue::Texts(v) => Some(v.len()),
            FieldValue::Points(v) => Some(v.len()),
            FieldValue::Vertices(v) => Some(v.len()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<Handle> for FieldValue {
    fn from(v: Handle) -> Self {
        FieldValue::Handle(Some(v))
    }
}

impl From<Vector3> for FieldValue {
    fn from(v: Vector3) -> Self {
        FieldValue::Point(v)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(v: Vec<f64>) -> Self {
        FieldValue::Doubles(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::Texts(v)
    }
}

impl From<Vec<Vector3>> for FieldValue {
    fn from(v: Vec<Vector3>) -> Self {
        FieldValue::Points(v)
    }
}

impl From<Vec<Vertex>> for FieldValue {
    fn from(v: Vec<Vertex>) -> Self {
        FieldValue::Vertices(v)
    }
}

/// A single DXF entity or table record.
///
/// The set of fields and their shapes is fixed by the record's descriptor;
/// every field exists from allocation on and holds its default until it
/// is read or assigned.
#[derive(Clone)]
pub struct EntityRecord {
    descriptor: &'static EntityDescriptor,
    fields: IndexMap<&'static str, FieldValue>,
    pub(crate) next: Option<RecordId>,
}

impl EntityRecord {
    /// Allocate a record of a registered type with every field at its
    /// default.
    pub fn new(type_name: &str, config: &DxfConfig) -> Result<Self> {
        let descriptor = descriptors::descriptor(type_name)
            .ok_or_else(|| DxfError::UnknownEntityType(type_name.to_string()))?;
        Ok(Self::from_descriptor(descriptor, config))
    }

    /// Allocate a record for `descriptor` with every field at its default.
    pub fn from_descriptor(descriptor: &'static EntityDescriptor, config: &DxfConfig) -> Self {
        let fields = descriptor
            .fields
            .iter()
            .map(|(name, spec)| (*name, spec.default.resolve(config)))
            .collect();
        Self {
            descriptor,
            fields,
            next: None,
        }
    }

    /// DXF type name (`ARC`, `APPID`, ...)
    pub fn type_name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Successor in this record's same-type chain.
    pub fn next(&self) -> Option<RecordId> {
        self.next
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub(crate) fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(field)
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Assign a field. The value must have the field's shape.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let entity = self.descriptor.name;
        let slot = self.fields.get_mut(field).ok_or_else(|| DxfError::FieldType {
            entity: entity.to_string(),
            field: field.to_string(),
            expected: "declared field",
        })?;
        if !slot.same_shape(&value) {
            return Err(DxfError::FieldType {
                entity: entity.to_string(),
                field: field.to_string(),
                expected: slot.shape(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Reset a field to its declared default.
    pub fn reset(&mut self, field: &str, config: &DxfConfig) {
        if let (Some(spec), Some(slot)) = (self.descriptor.field(field), self.fields.get_mut(field)) {
            *slot = spec.default.resolve(config);
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn double(&self, field: &str) -> Option<f64> {
        match self.fields.get(field) {
            Some(FieldValue::Double(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(FieldValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn point(&self, field: &str) -> Option<Vector3> {
        match self.fields.get(field) {
            Some(FieldValue::Point(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn doubles(&self, field: &str) -> Option<&[f64]> {
        match self.fields.get(field) {
            Some(FieldValue::Doubles(v)) => Some(v),
            _ => None,
        }
    }

    pub fn texts(&self, field: &str) -> Option<&[String]> {
        match self.fields.get(field) {
            Some(FieldValue::Texts(v)) => Some(v),
            _ => None,
        }
    }

    pub fn points(&self, field: &str) -> Option<&[Vector3]> {
        match self.fields.get(field) {
            Some(FieldValue::Points(v)) => Some(v),
            _ => None,
        }
    }

    pub fn vertices(&self, field: &str) -> Option<&[Vertex]> {
        match self.fields.get(field) {
            Some(FieldValue::Vertices(v)) => Some(v),
            _ => None,
        }
    }

    /// Handle stored in field `field`, `None` if unassigned.
    pub fn handle_of(&self, field: &str) -> Option<Handle> {
        match self.fields.get(field) {
            Some(FieldValue::Handle(h)) => *h,
            _ => None,
        }
    }

    /// Identification handle (group code 5), `None` if unassigned.
    pub fn handle(&self) -> Option<Handle> {
        self.handle_of("handle")
    }

    pub fn set_handle(&mut self, handle: Option<Handle>) -> Result<()> {
        self.set("handle", FieldValue::Handle(handle))
    }

    pub fn layer(&self) -> Option<&str> {
        self.text("layer")
    }

    pub fn linetype(&self) -> Option<&str> {
        self.text("linetype")
    }

    /// Effective color: the true color (420) when assigned, else the index (62).
    pub fn color(&self) -> Color {
        match self.int("true_color") {
            Some(rgb) if rgb >= 0 => Color::from_true_color(rgb),
            _ => self.int("color").map(Color::from_index).unwrap_or_default(),
        }
    }

    /// Test bit `n` of an integer flag field.
    pub fn flag_bit(&self, field: &str, n: u32) -> Option<bool> {
        self.int(field).map(|flags| crate::flags::bit_is_set(flags, n))
    }

    /// A notification carrying this record's type and handle.
    pub fn notification(&self, notification_type: NotificationType, message: impl Into<String>) -> Notification {
        Notification::new(notification_type, message)
            .with_entity(self.type_name())
            .with_handle(self.handle())
    }
}

impl PartialEq for EntityRecord {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name
            && self.fields == other.fields
            && self.next == other.next
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("type", &self.descriptor.name)
            .field("fields", &self.fields)
            .field("next", &self.next)
            .finish()
    }
}
