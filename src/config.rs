//! Reader and writer configuration.
//!
//! Every default the engine substitutes (layer "0", linetype "BYLAYER",
//! linetype scale 1.0) comes from here, so a caller can override them
//! without touching the descriptor tables.

use crate::types::DxfVersion;

/// Configuration shared by the entity reader and writer.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfConfig {
    /// Target format version for writing. Reading is version tolerant.
    ///
    /// Default: R2000.
    pub version: DxfVersion,

    /// Layer used when a record has none, or an empty one.
    pub default_layer: String,

    /// Linetype used when a record has none, or an empty one.
    pub default_linetype: String,

    /// Linetype scale given to new records.
    pub default_linetype_scale: f64,

    /// Emit the legacy entity elevation (38) for R11 and older targets.
    pub flatland: bool,

    /// Maximum number of elements any array field may hold.
    pub max_array_len: usize,

    /// Maximum characters of one binary data (310) value line.
    pub max_binary_chunk: usize,

    /// When `true`, malformed numeric values are reported as notifications
    /// and the field keeps its previous value, instead of failing the read.
    ///
    /// Default: `false` (strict mode, errors propagate).
    pub failsafe: bool,
}

impl Default for DxfConfig {
    fn default() -> Self {
        Self {
            version: DxfVersion::R2000,
            default_layer: "0".to_string(),
            default_linetype: "BYLAYER".to_string(),
            default_linetype_scale: 1.0,
            flatland: false,
            max_array_len: 10_000,
            max_binary_chunk: 254,
            failsafe: false,
        }
    }
}

impl DxfConfig {
    /// Configuration for a target version, other settings default.
    pub fn for_version(version: DxfVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: DxfVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_default_layer(mut self, layer: impl Into<String>) -> Self {
        self.default_layer = layer.into();
        self
    }

    pub fn with_default_linetype(mut self, linetype: impl Into<String>) -> Self {
        self.default_linetype = linetype.into();
        self
    }

    pub fn with_flatland(mut self, flatland: bool) -> Self {
        self.flatland = flatland;
        self
    }

    pub fn with_max_array_len(mut self, max: usize) -> Self {
        self.max_array_len = max;
        self
    }

    pub fn with_max_binary_chunk(mut self, max: usize) -> Self {
        self.max_binary_chunk = max.max(1);
        self
    }

    pub fn with_failsafe(mut self, failsafe: bool) -> Self {
        self.failsafe = failsafe;
        self
    }
}
