/// Application-defined collision group bitset. The core never assigns
/// meaning to bit positions; compatibility is a plain bitwise AND.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GroupMask(pub u32);

impl GroupMask {
    pub const ALL: GroupMask = GroupMask(u32::MAX);
    pub const NONE: GroupMask = GroupMask(0);

    #[inline] pub fn compatible(self, other: GroupMask) -> bool { self.0 & other.0 != 0 }
    #[inline] pub fn is_empty(self) -> bool { self.0 == 0 }
}

impl Default for GroupMask {
    fn default() -> Self { Self::ALL }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_is_bitwise_and() {
        assert!(GroupMask(0b01).compatible(GroupMask(0b11)));
        assert!(!GroupMask(0b01).compatible(GroupMask(0b10)));
        assert!(!GroupMask::NONE.compatible(GroupMask::ALL));
    }
}
