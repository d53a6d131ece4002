mod collection;
mod error;
mod id;
mod locality;
mod range;
mod range_list;
mod resolver;
mod view;
mod window;

pub use collection::*;
pub use error::*;
pub use id::*;
pub use locality::*;
pub use range::*;
pub use range_list::*;
pub use resolver::*;
pub use view::{Runs as ViewRuns, View};
pub use window::*;

/* NOTES

- Identifier sets are the currency between the kernel and everything built on
top of it, so they must stay cheap for the common case of large contiguous
blocks allocated at once. Hence ranges, and windows over ranges, instead of
identifier vectors.

- Ordering is always ascending by identifier. Construction from explicit lists
sorts, concatenation orders its parts, and slicing only goes forward.

- Sliced composites can't be concatenated. Position arithmetic of a composite
of composites with arbitrary windows isn't worth it for what it's used for.
*/
