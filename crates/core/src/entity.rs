//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Documents and boarding permits are entities: two records with the same
/// id are the same record, whatever their current field values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Human-readable label used in user-facing messages.
    fn display_name(&self) -> String;
}
