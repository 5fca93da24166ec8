//! Registry of every known descriptor, keyed by DXF type name.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::{entities, tables, EntityDescriptor};

static REGISTRY: Lazy<IndexMap<&'static str, EntityDescriptor>> = Lazy::new(|| {
    entities::all()
        .into_iter()
        .chain(tables::all())
        .map(|d| (d.name, d))
        .collect()
});

/// Descriptor of the type `name` (`"ARC"`, `"APPID"`, ...), if registered.
pub fn descriptor(name: &str) -> Option<&'static EntityDescriptor> {
    REGISTRY.get(name)
}

/// Every registered type name, entities first.
pub fn registered_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_type_is_registered() {
        for name in [
            "3DFACE", "3DSOLID", "ARC", "ATTDEF", "BLOCK", "ENDBLK", "DIMENSION", "HELIX",
            "IMAGE", "INSERT", "LINE", "LWPOLYLINE", "MTEXT", "OLEFRAME", "POLYLINE", "SEQEND",
            "SPLINE", "TEXT", "VERTEX", "TABLE", "APPID", "BLOCK_RECORD", "VIEW",
        ] {
            assert!(descriptor(name).is_some(), "{} is not registered", name);
        }
        assert_eq!(registered_names().count(), 23);
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(descriptor("arc").is_none());
        assert!(descriptor("HATCH").is_none());
    }

    #[test]
    fn test_rows_target_declared_fields() {
        // Every value row points at a declared field
        for name in registered_names() {
            let d = descriptor(name).unwrap();
            for row in &d.rows {
                if let Some(target) = row.target() {
                    assert!(d.field(target.field()).is_some(), "{}: {}", name, target.field());
                }
            }
        }
    }
}
