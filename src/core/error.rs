use super::{Fingerprint, Id};
use std::fmt::{self, Display};

/// Collection level errors.
/// All of them are local to the triggering call, nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Identifier is zero or unknown to the kernel at construction.
    InvalidIdentifier(u64),
    /// Index is outside of `-len..len`.
    IndexOutOfRange { index: isize, len: usize },
    /// Only forward slicing is supported.
    UnsupportedSlice { step: isize },
    /// Concatenated collections share this identifier.
    Overlap(Id),
    /// Composite collection that was sliced can't be concatenated.
    Composition,
    /// Kernel doesn't know about this identifier.
    UnknownIdentifier(Id),
    /// Collection was created in a kernel session that has since been reset.
    StaleCollection {
        collection: Fingerprint,
        current: Fingerprint,
    },
    /// Kernel configuration is not usable.
    InvalidConfig(&'static str),
}

impl Error {
    /// True if the same call could succeed against a fresh collection
    /// built from the same identifiers.
    pub fn recoverable(self) -> bool {
        match self {
            Error::InvalidIdentifier(_) => false,
            Error::IndexOutOfRange { .. } => false,
            Error::UnsupportedSlice { .. } => false,
            Error::Overlap(_) => false,
            Error::Composition => true,
            Error::UnknownIdentifier(_) => false,
            Error::StaleCollection { .. } => true,
            Error::InvalidConfig(_) => false,
        }
    }

    pub fn unrecoverable(self) -> bool {
        !self.recoverable()
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleCollection { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier(raw) => {
                write!(f, "Identifier {} is not a valid node identifier.", raw)
            }
            Self::IndexOutOfRange { index, len } => write!(
                f,
                "Index {} is out of range for collection of length {}.",
                index, len
            ),
            Self::UnsupportedSlice { step } => write!(
                f,
                "Slice step {} is not supported, step must be positive.",
                step
            ),
            Self::Overlap(id) => write!(
                f,
                "Can't concatenate collections that both contain identifier {}.",
                id
            ),
            Self::Composition => write!(
                f,
                "Can't concatenate a sliced composite collection."
            ),
            Self::UnknownIdentifier(id) => {
                write!(f, "Identifier {} is unknown to the kernel.", id)
            }
            Self::StaleCollection {
                collection,
                current,
            } => write!(
                f,
                "Collection from session {} was used with kernel session {}.",
                collection, current
            ),
            Self::InvalidConfig(reason) => write!(f, "Invalid kernel configuration: {}.", reason),
        }
    }
}

impl std::error::Error for Error {}
