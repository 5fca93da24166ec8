//! Core types used throughout dxf-tags

pub mod color;
pub mod handle;
pub mod vector;
pub mod version;

pub use color::Color;
pub use handle::Handle;
pub use vector::{Axis, Vector3};
pub use version::{Capabilities, Capability, DxfVersion};
