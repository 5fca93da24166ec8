//! DXF file format versions and the capabilities each one enables.

use std::fmt;

/// DXF format version, ordered oldest to newest.
///
/// R11 and R12 share the `AC1009` header string; parsing `AC1009` yields
/// [`DxfVersion::R12`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DxfVersion {
    /// AutoCAD R10 (AC1006)
    R10,
    /// AutoCAD R11 (AC1009)
    R11,
    /// AutoCAD R12 (AC1009)
    R12,
    /// AutoCAD R13 (AC1012)
    R13,
    /// AutoCAD R14 (AC1014)
    R14,
    /// AutoCAD 2000 (AC1015)
    R2000,
    /// AutoCAD 2004 (AC1018)
    R2004,
    /// AutoCAD 2007 (AC1021)
    R2007,
    /// AutoCAD 2010 (AC1024)
    R2010,
    /// AutoCAD 2013 (AC1027)
    R2013,
    /// AutoCAD 2018 (AC1032)
    R2018,
}

impl DxfVersion {
    /// All versions, oldest first.
    pub const ALL: [DxfVersion; 11] = [
        DxfVersion::R10,
        DxfVersion::R11,
        DxfVersion::R12,
        DxfVersion::R13,
        DxfVersion::R14,
        DxfVersion::R2000,
        DxfVersion::R2004,
        DxfVersion::R2007,
        DxfVersion::R2010,
        DxfVersion::R2013,
        DxfVersion::R2018,
    ];

    /// Get the `$ACADVER` string (e.g., "AC1015")
    pub fn as_str(&self) -> &'static str {
        match self {
            DxfVersion::R10 => "AC1006",
            DxfVersion::R11 | DxfVersion::R12 => "AC1009",
            DxfVersion::R13 => "AC1012",
            DxfVersion::R14 => "AC1014",
            DxfVersion::R2000 => "AC1015",
            DxfVersion::R2004 => "AC1018",
            DxfVersion::R2007 => "AC1021",
            DxfVersion::R2010 => "AC1024",
            DxfVersion::R2013 => "AC1027",
            DxfVersion::R2018 => "AC1032",
        }
    }

    /// Release name (e.g., "R2000")
    pub fn release_name(&self) -> &'static str {
        match self {
            DxfVersion::R10 => "R10",
            DxfVersion::R11 => "R11",
            DxfVersion::R12 => "R12",
            DxfVersion::R13 => "R13",
            DxfVersion::R14 => "R14",
            DxfVersion::R2000 => "R2000",
            DxfVersion::R2004 => "R2004",
            DxfVersion::R2007 => "R2007",
            DxfVersion::R2010 => "R2010",
            DxfVersion::R2013 => "R2013",
            DxfVersion::R2018 => "R2018",
        }
    }

    /// Parse version from an `$ACADVER` string (e.g., "AC1015")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "AC1006" => Some(DxfVersion::R10),
            "AC1009" => Some(DxfVersion::R12),
            "AC1012" => Some(DxfVersion::R13),
            "AC1014" => Some(DxfVersion::R14),
            "AC1015" => Some(DxfVersion::R2000),
            "AC1018" => Some(DxfVersion::R2004),
            "AC1021" => Some(DxfVersion::R2007),
            "AC1024" => Some(DxfVersion::R2010),
            "AC1027" => Some(DxfVersion::R2013),
            "AC1032" => Some(DxfVersion::R2018),
            _ => None,
        }
    }

    /// Get the numeric part of the `$ACADVER` string
    pub fn version_code(&self) -> u16 {
        self.as_str()[2..].parse().unwrap_or(0)
    }

    /// Capability set of this version, consulted by the entity writer
    /// for every row it emits.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities { version: *self }
    }
}

impl Default for DxfVersion {
    fn default() -> Self {
        DxfVersion::R2000
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.release_name())
    }
}

/// A version-gated feature of the tag format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Subclass markers (code 100), R13 and later
    SubclassMarkers,
    /// 102-bracketed reactor and extension dictionary groups, R14 and later
    ExtensionGroups,
    /// Extrusion direction (210/220/230), R12 and later
    Extrusion,
    /// Legacy elevation (38) on entities, R11 and earlier
    LegacyElevation,
    /// Fields introduced with the R13 object model (block handles, extra names)
    R13Fields,
    /// Fields introduced with R2000 (lineweight, plot style, shadow mode)
    R2000Fields,
    /// True color, color name and transparency, R2004 and later
    TrueColor,
    /// Material handles, R2007 and later
    Materials,
}

impl Capability {
    /// Whether `version` supports this feature.
    pub fn is_supported(self, version: DxfVersion) -> bool {
        match self {
            Capability::SubclassMarkers => version >= DxfVersion::R13,
            Capability::ExtensionGroups => version >= DxfVersion::R14,
            Capability::Extrusion => version >= DxfVersion::R12,
            Capability::LegacyElevation => version <= DxfVersion::R11,
            Capability::R13Fields => version >= DxfVersion::R13,
            Capability::R2000Fields => version >= DxfVersion::R2000,
            Capability::TrueColor => version >= DxfVersion::R2004,
            Capability::Materials => version >= DxfVersion::R2007,
        }
    }
}

/// Capability lookup for one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    version: DxfVersion,
}

impl Capabilities {
    /// The version these capabilities describe.
    pub fn version(&self) -> DxfVersion {
        self.version
    }

    /// Whether the version supports `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        capability.is_supported(self.version)
    }

    pub fn subclass_markers(&self) -> bool {
        self.supports(Capability::SubclassMarkers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(DxfVersion::R12 < DxfVersion::R13);
        assert!(DxfVersion::R2007 > DxfVersion::R2004);
        assert!(DxfVersion::R10 < DxfVersion::R2018);
    }

    #[test]
    fn test_parse() {
        assert_eq!(DxfVersion::parse("AC1015"), Some(DxfVersion::R2000));
        assert_eq!(DxfVersion::parse("AC1009"), Some(DxfVersion::R12));
        assert_eq!(DxfVersion::parse("AC9999"), None);
    }

    #[test]
    fn test_version_code() {
        assert_eq!(DxfVersion::R10.version_code(), 1006);
        assert_eq!(DxfVersion::R2018.version_code(), 1032);
    }

    #[test]
    fn test_capabilities() {
        let r12 = DxfVersion::R12.capabilities();
        assert!(!r12.subclass_markers());
        assert!(!r12.supports(Capability::ExtensionGroups));
        assert!(r12.supports(Capability::Extrusion));
        assert!(!r12.supports(Capability::LegacyElevation));

        let r11 = DxfVersion::R11.capabilities();
        assert!(r11.supports(Capability::LegacyElevation));
        assert!(!r11.supports(Capability::Extrusion));

        let r13 = DxfVersion::R13.capabilities();
        assert!(r13.subclass_markers());
        assert!(!r13.supports(Capability::ExtensionGroups));

        let r2007 = DxfVersion::R2007.capabilities();
        assert!(r2007.supports(Capability::ExtensionGroups));
        assert!(r2007.supports(Capability::Materials));
        assert!(!DxfVersion::R2004.capabilities().supports(Capability::Materials));
    }

    #[test]
    fn test_display() {
        assert_eq!(DxfVersion::R2000.to_string(), "R2000");
    }
}
