//! # Goal
//! Compact, immutable collections of node identifiers as handed out by a
//! simulation kernel that creates nodes in bulk.
//!
//! A collection of a million consecutive nodes is a single range, and stays
//! a handful of ranges after slicing and concatenating it with others. Layers
//! above (topology, connection building, recording) treat collections as
//! opaque values: they index, slice, concatenate, test membership, iterate,
//! and pass them back to the kernel.
//!
//! # Architecture
//! - Ids - positive identifiers and opaque tags (model ids).
//! - Ranges - contiguous runs of identifiers sharing a tag.
//! - Range lists - canonical ascending sequences of ranges.
//! - Windows and views - lazy forward slices over range lists.
//! - Collections - primitive (one view) or composite (several views).
//! - Kernel - allocates identifiers and resolves their metadata, through the
//!   [`Allocate`](core::Allocate) and [`Resolve`](core::Resolve) traits.
//!
//! ```
//! use gidset::{core::Collection, kernel::{Kernel, KernelConfig}};
//!
//! let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
//! let nodes = kernel.create_model("iaf_psc_alpha", 10);
//! let every_other = nodes.slice(None, None, 2).unwrap();
//! assert_eq!(every_other.to_array(), vec![1, 3, 5, 7, 9]);
//!
//! let same = Collection::from_ids(&kernel, [9, 7, 5, 3, 1]).unwrap();
//! assert_eq!(every_other, same);
//! ```

//? Important decisions:
//? - Collections never own per node state. Anything beyond the tag is asked
//?   from the kernel, which is also the only thing that can make a collection stale.
//? - No mutation and no removal, every operation builds a new collection.

pub mod core;
#[cfg(feature = "dump")]
pub mod dump;
pub mod kernel;
// Generic things
pub mod util;

pub use crate::core::{Collection, Error, Id, Tag};
