use super::{Error, Id, NodeMeta, PrimitiveRange, Tag};
use std::{
    fmt,
    num::NonZeroU64,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_FINGERPRINT: AtomicU64 = AtomicU64::new(1);

/// Identity of one kernel session.
///
/// Every kernel and every reset of a kernel gets a new one, collections
/// remember the one they were created under.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Process wide unique fingerprint.
    pub fn next() -> Self {
        Fingerprint(NEXT_FINGERPRINT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Fingerprint(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out identifiers.
pub trait Allocate {
    /// Allocates `count` fresh consecutive identifiers of one tag.
    /// Identifiers are monotonically increasing and never reused within a session.
    fn allocate(&mut self, count: NonZeroU64, tag: Tag) -> PrimitiveRange;
}

/// Knows metadata of allocated identifiers.
pub trait Resolve {
    /// Current session.
    fn fingerprint(&self) -> Fingerprint;

    /// Err UnknownIdentifier if identifier was never allocated in current session.
    fn resolve(&self, id: Id) -> Result<NodeMeta, Error>;

    /// Err StaleCollection if `fingerprint` is not the current session.
    fn check_session(&self, fingerprint: Fingerprint) -> Result<(), Error> {
        let current = self.fingerprint();
        if current == fingerprint {
            Ok(())
        } else {
            Err(Error::StaleCollection {
                collection: fingerprint,
                current,
            })
        }
    }
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn fingerprint(&self) -> Fingerprint {
        (**self).fingerprint()
    }

    fn resolve(&self, id: Id) -> Result<NodeMeta, Error> {
        (**self).resolve(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprints_are_unique() {
        let a = Fingerprint::next();
        let b = Fingerprint::next();
        assert_ne!(a, b);
        assert!(a < b);
    }
}
