//! Attribute access policy for native objects seen from the engine.
//!
//! Flags live on the native type ([`HostClass`]), not on instances, and are
//! read on every bridged operation.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::host::HostClass;

/// Prefix marking an attribute name as private.
pub const PRIVATE_PREFIX: char = '_';

/// Per-type bitset gating private-attribute visibility and mutation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessFlags(u8);

impl AccessFlags {
    /// No private attributes, no mutation.
    pub const NONE: Self = Self(0);
    /// Expose `_`-prefixed attributes to the engine.
    pub const ALLOW_PRIVATE_ATTR: Self = Self(1);
    /// Allow the engine to set and delete attributes.
    pub const ALLOW_MODIFY_ATTR: Self = Self(1 << 1);
    pub const ALL: Self = Self(Self::ALLOW_PRIVATE_ATTR.0 | Self::ALLOW_MODIFY_ATTR.0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for AccessFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AccessFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("AccessFlags(NONE)");
        }
        let mut names = Vec::new();
        if self.contains(Self::ALLOW_PRIVATE_ATTR) {
            names.push("ALLOW_PRIVATE_ATTR");
        }
        if self.contains(Self::ALLOW_MODIFY_ATTR) {
            names.push("ALLOW_MODIFY_ATTR");
        }
        write!(f, "AccessFlags({})", names.join(" | "))
    }
}

/// Lexical classification, independent of any flags.
pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_PREFIX)
}

/// Flags declared by a native type, or none when the object has no type descriptor.
pub fn access_flags(class: Option<&HostClass>) -> AccessFlags {
    class.map(HostClass::flags).unwrap_or_default()
}

/// Whether `name` may be read, enumerated or tested from the engine.
pub fn is_visible(flags: AccessFlags, name: &str) -> bool {
    !is_private(name) || flags.contains(AccessFlags::ALLOW_PRIVATE_ATTR)
}

/// Whether `name` may be set or deleted from the engine.
///
/// Private names must also be visible, so mutating them needs both flags.
pub fn is_mutable(flags: AccessFlags, name: &str) -> bool {
    flags.contains(AccessFlags::ALLOW_MODIFY_ATTR) && is_visible(flags, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_classification() {
        assert!(is_private("_p"));
        assert!(is_private("__dunder__"));
        assert!(!is_private("p_"));
        assert!(!is_private(""));
    }

    #[test]
    fn test_default_flags_hide_private() {
        let flags = AccessFlags::default();
        assert!(flags.is_empty());
        assert!(is_visible(flags, "a"));
        assert!(!is_visible(flags, "_p"));
        assert!(!is_mutable(flags, "a"));
        assert!(!is_mutable(flags, "_p"));
    }

    #[test]
    fn test_private_flag() {
        let flags = AccessFlags::ALLOW_PRIVATE_ATTR;
        assert!(is_visible(flags, "_p"));
        assert!(!is_mutable(flags, "_p"));
        assert!(!is_mutable(flags, "a"));
    }

    #[test]
    fn test_modify_flag() {
        let flags = AccessFlags::ALLOW_MODIFY_ATTR;
        assert!(is_mutable(flags, "a"));
        assert!(!is_visible(flags, "_p"));
        assert!(!is_mutable(flags, "_p"));
    }

    #[test]
    fn test_both_flags() {
        let flags = AccessFlags::ALLOW_PRIVATE_ATTR | AccessFlags::ALLOW_MODIFY_ATTR;
        assert_eq!(flags, AccessFlags::ALL);
        assert!(is_visible(flags, "_p"));
        assert!(is_mutable(flags, "_p"));
    }

    #[test]
    fn test_flag_ops() {
        let mut flags = AccessFlags::NONE;
        flags |= AccessFlags::ALLOW_MODIFY_ATTR;
        assert!(flags.contains(AccessFlags::ALLOW_MODIFY_ATTR));
        flags.insert(AccessFlags::ALLOW_PRIVATE_ATTR);
        flags.remove(AccessFlags::ALLOW_MODIFY_ATTR);
        assert_eq!(flags, AccessFlags::ALLOW_PRIVATE_ATTR);
        assert_eq!(AccessFlags::from_bits_truncate(0xff), AccessFlags::ALL);
        assert_eq!(
            format!("{:?}", AccessFlags::ALL),
            "AccessFlags(ALLOW_PRIVATE_ATTR | ALLOW_MODIFY_ATTR)"
        );
    }

    #[test]
    fn test_missing_class_has_no_flags() {
        assert_eq!(access_flags(None), AccessFlags::NONE);
        let class = HostClass::new("Point");
        class.set_flags(AccessFlags::ALLOW_MODIFY_ATTR);
        assert_eq!(access_flags(Some(class.as_ref())), AccessFlags::ALLOW_MODIFY_ATTR);
    }
}
