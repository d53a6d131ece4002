use std::{fmt, num::NonZeroU64};

/// Identifier of one engine allocated node.
///
/// Identifiers are positive and never reused within one kernel session,
/// so zero is free to serve as the niche for `Option<Id>`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Id(NonZeroU64);

impl Id {
    /// None if `raw` is zero.
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Id(raw)),
            None => None,
        }
    }

    #[inline(always)]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Identifier `n` places after this one.
    /// Panics on overflow, which can't happen for allocated identifiers.
    pub fn offset(self, n: u64) -> Self {
        Id(self.0.checked_add(n).expect("Identifier overflow"))
    }

    /// Number of identifiers from self to `to`, inclusive on both ends.
    pub fn span(self, to: Id) -> u64 {
        debug_assert!(self <= to);
        to.get() - self.get() + 1
    }
}

impl TryFrom<u64> for Id {
    type Error = super::Error;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Id::new(raw).ok_or(super::Error::InvalidIdentifier(raw))
    }
}

impl From<Id> for u64 {
    fn from(id: Id) -> Self {
        id.get()
    }
}

impl PartialEq<u64> for Id {
    fn eq(&self, other: &u64) -> bool {
        self.get() == *other
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque classification of a node, usually the id of the model it was created from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Tag(pub u32);

impl Tag {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag#{}", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
