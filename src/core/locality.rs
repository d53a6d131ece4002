use super::Tag;
use getset::CopyGetters;
use modular_bitfield::prelude::*;
use std::fmt;

/// Where a node lives.
/// Packed into 4 bytes since it's produced per identifier.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    // Owned by this process.
    pub local: bool,
    // Thread of the owning process that updates the node.
    pub thread: B31,
}

impl Placement {
    /// Panics if thread doesn't fit into 31 bits.
    pub fn at(local: bool, thread: u32) -> Self {
        Placement::new().with_local(local).with_thread(thread)
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.local() {
            write!(f, "local@{}", self.thread())
        } else {
            write!(f, "remote@{}", self.thread())
        }
    }
}

/// Per identifier metadata as reported by the kernel.
#[derive(Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct NodeMeta {
    tag: Tag,
    placement: Placement,
}

impl NodeMeta {
    pub fn new(tag: Tag, placement: Placement) -> Self {
        Self { tag, placement }
    }

    pub fn is_local(&self) -> bool {
        self.placement.local()
    }

    pub fn thread(&self) -> u32 {
        self.placement.thread()
    }
}

impl fmt::Debug for NodeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.tag, self.placement)
    }
}
