//! Namespace enable/disable filtering

pub mod namespace;
pub mod pattern;

pub use namespace::{is_namespace_enabled, DebugSpec, NamespaceFilter};
pub use pattern::Pattern;
