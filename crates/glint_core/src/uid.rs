//! # Widget Identity
//!
//! A [`Uid`] is a 64-bit identifier derived from the structure of the calls
//! that declared a widget, never from an allocation counter.
//!
//! - Literal tags are hashed with FNV-1a at compile time ([`Uid::tag`]).
//! - Nested identity is built with [`Uid::mix`], which is deterministic and
//!   order sensitive: `a.mix(b) != b.mix(a)` in general.
//!
//! Two siblings declared with the same literal tag under the same parent get the
//! same uid. Callers disambiguate them explicitly, usually with
//! [`Uid::indexed`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
/// Odd multiplier used by [`Uid::mix`].
const MIX_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Hashes a string with 64-bit FNV-1a.
///
/// Usable in `const` context so literal tags cost nothing at runtime.
#[must_use]
pub const fn fnv1a(text: &str) -> u64 {
    let bytes = text.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Deterministic widget identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Uid(pub u64);

impl Uid {
    /// Identity of the implicit root region.
    pub const ROOT: Self = Self::tag("glint::root");

    /// Creates a uid from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Creates a uid from a literal tag.
    #[inline]
    #[must_use]
    pub const fn tag(tag: &str) -> Self {
        Self(fnv1a(tag))
    }

    /// Creates a uid for the `index`-th sibling sharing `tag`.
    #[inline]
    #[must_use]
    pub const fn indexed(tag: &str, index: u64) -> Self {
        Self::tag(tag).mix(Self(index))
    }

    /// Mixes a child identifier into this (parent) identifier.
    ///
    /// `parent ^ (parent >> 1) ^ child ^ (child * MIX_CONSTANT)`
    #[inline]
    #[must_use]
    pub const fn mix(self, child: Self) -> Self {
        let parent = self.0;
        let child = child.0;
        Self(parent ^ (parent >> 1) ^ child ^ child.wrapping_mul(MIX_CONSTANT))
    }

    /// Mixes a literal tag into this identifier.
    #[inline]
    #[must_use]
    pub const fn mix_tag(self, tag: &str) -> Self {
        self.mix(Self::tag(tag))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({:#018x})", self.0)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<&str> for Uid {
    fn from(tag: &str) -> Self {
        Self::tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_tag_is_const() {
        const BUTTON: Uid = Uid::tag("button");
        assert_eq!(BUTTON, Uid::tag("button"));
    }

    #[test]
    fn test_mix_is_order_sensitive() {
        let a = Uid::tag("a");
        let b = Uid::tag("b");
        assert_ne!(a.mix(b), b.mix(a));
    }

    #[test]
    fn test_indexed_siblings_differ() {
        assert_ne!(Uid::indexed("item", 0), Uid::indexed("item", 1));
        assert_ne!(Uid::indexed("item", 0), Uid::tag("item"));
    }

    proptest! {
        #[test]
        fn prop_same_sequence_same_uid(tags in proptest::collection::vec("[a-z]{1,8}", 1..12)) {
            let first = tags.iter().fold(Uid::ROOT, |uid, tag| uid.mix_tag(tag));
            let second = tags.iter().fold(Uid::ROOT, |uid, tag| uid.mix_tag(tag));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_changing_a_tag_changes_uid(
            tags in proptest::collection::vec("[a-z]{1,8}", 1..12),
            position in any::<proptest::sample::Index>(),
        ) {
            let at = position.index(tags.len());
            let mut changed = tags.clone();
            changed[at].push('!');

            let original = tags.iter().fold(Uid::ROOT, |uid, tag| uid.mix_tag(tag));
            let altered = changed.iter().fold(Uid::ROOT, |uid, tag| uid.mix_tag(tag));
            prop_assert_ne!(original, altered);
        }
    }
}
