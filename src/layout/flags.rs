//! Layout flags: how a layout may resize a widget along each axis.

use std::ops::{BitAnd, BitOr};

/// Bitmask of per-axis resize permissions.
///
/// *Shrinkable* widgets may get less than their preferred size, *growable*
/// ones more. A *greedy* widget claims surplus space ahead of merely growable
/// siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayoutFlags(pub u8);

impl LayoutFlags {
    pub const NONE: LayoutFlags = LayoutFlags(0);
    pub const SHRINKABLE_HORZ: LayoutFlags = LayoutFlags(0b00_0001);
    pub const SHRINKABLE_VERT: LayoutFlags = LayoutFlags(0b00_0010);
    pub const GROWABLE_HORZ: LayoutFlags = LayoutFlags(0b00_0100);
    pub const GROWABLE_VERT: LayoutFlags = LayoutFlags(0b00_1000);
    pub const GREEDY_HORZ: LayoutFlags = LayoutFlags(0b01_0000);
    pub const GREEDY_VERT: LayoutFlags = LayoutFlags(0b10_0000);

    /// Every flag set: shrink, grow and greed on both axes.
    pub const ALL: LayoutFlags = LayoutFlags(0b11_1111);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: LayoutFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LayoutFlags {
    type Output = LayoutFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        LayoutFlags(self.0 | rhs.0)
    }
}

impl BitAnd for LayoutFlags {
    type Output = LayoutFlags;
    fn bitand(self, rhs: Self) -> Self::Output {
        LayoutFlags(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_test() {
        let flags = LayoutFlags::SHRINKABLE_HORZ | LayoutFlags::GROWABLE_HORZ;
        assert!(flags.contains(LayoutFlags::GROWABLE_HORZ));
        assert!(!flags.contains(LayoutFlags::GROWABLE_VERT));
        assert_eq!(flags & LayoutFlags::GROWABLE_HORZ, LayoutFlags::GROWABLE_HORZ);
        assert!(LayoutFlags::NONE.is_empty());
    }

    #[test]
    fn all_contains_every_flag() {
        for flag in [
            LayoutFlags::SHRINKABLE_HORZ,
            LayoutFlags::SHRINKABLE_VERT,
            LayoutFlags::GROWABLE_HORZ,
            LayoutFlags::GROWABLE_VERT,
            LayoutFlags::GREEDY_HORZ,
            LayoutFlags::GREEDY_VERT,
        ] {
            assert!(LayoutFlags::ALL.contains(flag));
        }
    }
}
