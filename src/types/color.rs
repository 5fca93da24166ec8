//! Color values as stored in group code 62 (and 420 for true color)

use std::fmt;

/// Index value stored in group code 62 for "inherit from layer".
pub const BYLAYER: i64 = 256;

/// Index value stored in group code 62 for "inherit from block".
pub const BYBLOCK: i64 = 0;

/// Interpretation of an entity color field.
///
/// The record model keeps the raw integer; this is a typed view over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Color by layer (index 256)
    #[default]
    ByLayer,
    /// Color by block (index 0)
    ByBlock,
    /// AutoCAD Color Index (1-255)
    Index(u8),
    /// Negative index: the color of a layer that is turned off
    Off(u8),
    /// True color from group code 420
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Interpret a group code 62 value.
    pub fn from_index(index: i64) -> Self {
        match index {
            BYBLOCK => Color::ByBlock,
            BYLAYER => Color::ByLayer,
            1..=255 => Color::Index(index as u8),
            -255..=-1 => Color::Off((-index) as u8),
            _ => Color::ByLayer,
        }
    }

    /// Interpret a group code 420 value (0x00RRGGBB).
    pub fn from_true_color(value: i64) -> Self {
        Color::Rgb {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Group code 62 value, `None` for true colors.
    pub fn index(&self) -> Option<i64> {
        match self {
            Color::ByLayer => Some(BYLAYER),
            Color::ByBlock => Some(BYBLOCK),
            Color::Index(i) => Some(*i as i64),
            Color::Off(i) => Some(-(*i as i64)),
            Color::Rgb { .. } => None,
        }
    }

    /// Group code 420 value, `None` for indexed colors.
    pub fn true_color(&self) -> Option<i64> {
        match self {
            Color::Rgb { r, g, b } => Some(((*r as i64) << 16) | ((*g as i64) << 8) | *b as i64),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::ByLayer => write!(f, "ByLayer"),
            Color::ByBlock => write!(f, "ByBlock"),
            Color::Index(i) => write!(f, "Index({})", i),
            Color::Off(i) => write!(f, "Off({})", i),
            Color::Rgb { r, g, b } => write!(f, "RGB({}, {}, {})", r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_index() {
        assert_eq!(Color::from_index(0), Color::ByBlock);
        assert_eq!(Color::from_index(256), Color::ByLayer);
        assert_eq!(Color::from_index(1), Color::Index(1));
        assert_eq!(Color::from_index(-7), Color::Off(7));
    }

    #[test]
    fn test_index_roundtrip() {
        for raw in [0, 1, 7, 255, 256, -3] {
            assert_eq!(Color::from_index(raw).index(), Some(raw));
        }
    }

    #[test]
    fn test_true_color() {
        let color = Color::from_true_color(0x00FF8040);
        assert_eq!(color, Color::Rgb { r: 255, g: 128, b: 64 });
        assert_eq!(color.true_color(), Some(0x00FF8040));
        assert_eq!(color.index(), None);
    }

    #[test]
    fn test_default_color() {
        assert_eq!(Color::default(), Color::ByLayer);
    }
}
