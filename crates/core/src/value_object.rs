//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity and are compared by their attributes
/// (e.g. an associated period `2024-01-01..2024-01-31`, or a permit entry
/// `{number, destination code}` sent to the export web service).
///
/// To "modify" a value object, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
