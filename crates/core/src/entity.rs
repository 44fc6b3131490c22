//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// An entity is addressed by its key, not by its current attribute values.
/// The key may be composite: a demand line is identified by the
/// `(project, product)` pair, not by either half alone.
pub trait Entity {
    /// Strongly-typed entity key.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity key.
    fn id(&self) -> &Self::Id;
}
