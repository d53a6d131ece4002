//! Plain text dump of the nodes of a collection.
//!
//! Every process writes only the nodes it owns, one per line and in ascending
//! order, so dumps of all processes can be concatenated and sorted afterwards.

use crate::core::{Collection, Error, Id, Resolve};
use log::*;
use std::{
    fmt::{self, Display},
    io::{self, Write},
};

#[derive(Debug)]
pub enum DumpError {
    Io(io::Error),
    Collection(Error),
}

impl Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "Failed to write dump: {}", error),
            Self::Collection(error) => write!(f, "Failed to dump collection: {}", error),
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Collection(error) => Some(error),
        }
    }
}

impl From<io::Error> for DumpError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<Error> for DumpError {
    fn from(error: Error) -> Self {
        Self::Collection(error)
    }
}

/// Writes `id<TAB>tag<TAB>field..` for every local node of collection.
/// Fields of a node are whatever `fields` returns for it, e.g. its position.
///
/// Returns number of written lines.
pub fn write_nodes<W, R, F, I>(
    out: &mut W,
    collection: &Collection,
    resolver: &R,
    mut fields: F,
) -> Result<usize, DumpError>
where
    W: Write + ?Sized,
    R: Resolve + ?Sized,
    F: FnMut(Id) -> I,
    I: IntoIterator<Item = f64>,
{
    let mut written = 0;
    for id in collection.local_ids(resolver) {
        let id = id?;
        let tag = collection.tag_of(id).expect("Identifier of collection");
        write!(out, "{}\t{}", id, tag)?;
        for field in fields(id) {
            write!(out, "\t{}", field)?;
        }
        writeln!(out)?;
        written += 1;
    }

    debug!("Dumped {} of {} nodes", written, collection.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Kernel, KernelConfig};

    #[test]
    fn writes_local_nodes() {
        let mut kernel = Kernel::new(KernelConfig::default().with_processes(2)).unwrap();
        let a = kernel.create_model("iaf_psc_alpha", 3);
        let b = kernel.create_model("iaf_psc_exp", 3);
        let nodes = a.concat(&b).unwrap();

        let mut out = Vec::new();
        let written = write_nodes(&mut out, &nodes, &kernel, |id| {
            [id.get() as f64 * 0.5, -1.0]
        })
        .unwrap();

        // Rank 0 of 2 owns even identifiers.
        assert_eq!(written, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2\t0\t1\t-1\n4\t1\t2\t-1\n6\t1\t3\t-1\n"
        );
    }

    #[test]
    fn stale_collection() {
        let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
        let nodes = kernel.create_model("iaf_psc_alpha", 3);
        kernel.reset();

        let mut out = Vec::new();
        let result = write_nodes(&mut out, &nodes, &kernel, |_| Vec::<f64>::new());
        assert!(matches!(
            result,
            Err(DumpError::Collection(Error::StaleCollection { .. }))
        ));
        assert!(out.is_empty());
    }
}
