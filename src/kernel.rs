//! In memory kernel that allocates identifiers and answers metadata queries.
//!
//! Real simulation engines implement [`Allocate`] and [`Resolve`] themselves,
//! this one keeps only what collections need: which range every identifier was
//! allocated in, and on which process and thread it lives.

use crate::core::{
    Allocate, Collection, Error, Fingerprint, Id, NodeMeta, Placement, PrimitiveRange, Resolve,
    Tag,
};
use ahash::AHashMap;
use getset::CopyGetters;
use log::*;
use std::num::NonZeroU64;

/// Layout of the processes and threads nodes are distributed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct KernelConfig {
    /// Number of cooperating processes.
    processes: u32,
    /// Rank of this process.
    rank: u32,
    /// Threads per process.
    threads: u32,
}

impl KernelConfig {
    const MAX_THREADS: u32 = 1 << 31;

    pub fn with_processes(self, processes: u32) -> Self {
        Self { processes, ..self }
    }

    pub fn with_rank(self, rank: u32) -> Self {
        Self { rank, ..self }
    }

    pub fn with_threads(self, threads: u32) -> Self {
        Self { threads, ..self }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.processes == 0 {
            Err(Error::InvalidConfig("there must be at least one process"))
        } else if self.threads == 0 {
            Err(Error::InvalidConfig("there must be at least one thread"))
        } else if self.threads >= Self::MAX_THREADS {
            Err(Error::InvalidConfig("too many threads"))
        } else if self.rank >= self.processes {
            Err(Error::InvalidConfig("rank must be lower than number of processes"))
        } else {
            Ok(())
        }
    }

    /// Number of threads across all processes.
    pub fn virtual_processes(&self) -> u64 {
        self.processes as u64 * self.threads as u64
    }

    /// Nodes are dealt round robin over virtual processes,
    /// and virtual processes round robin over processes.
    pub fn placement(&self, id: Id) -> Placement {
        let vp = id.get() % self.virtual_processes();
        let rank = (vp % self.processes as u64) as u32;
        let thread = (vp / self.processes as u64) as u32;
        Placement::at(rank == self.rank, thread)
    }
}

impl Default for KernelConfig {
    /// Single process with single thread.
    fn default() -> Self {
        KernelConfig {
            processes: 1,
            rank: 0,
            threads: 1,
        }
    }
}

pub struct Kernel {
    config: KernelConfig,
    fingerprint: Fingerprint,
    next: Id,
    /// Allocated ranges, ascending.
    blocks: Vec<PrimitiveRange>,
    models: AHashMap<String, Tag>,
    names: Vec<String>,
}

impl Kernel {
    pub fn new(config: KernelConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Kernel {
            config,
            fingerprint: Fingerprint::next(),
            next: Id::new(1).expect("One is not zero"),
            blocks: Vec::new(),
            models: AHashMap::new(),
            names: Vec::new(),
        })
    }

    pub fn config(&self) -> KernelConfig {
        self.config
    }

    /// Number of allocated identifiers.
    pub fn len(&self) -> u64 {
        self.next.get() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Tag for model of given name, registering it if it's new.
    pub fn register_model(&mut self, name: &str) -> Tag {
        if let Some(&tag) = self.models.get(name) {
            return tag;
        }
        let tag = Tag(self.names.len() as u32);
        self.models.insert(name.to_owned(), tag);
        self.names.push(name.to_owned());
        debug!("Registered model {} as {:?}", name, tag);
        tag
    }

    pub fn model(&self, name: &str) -> Option<Tag> {
        self.models.get(name).copied()
    }

    pub fn model_name(&self, tag: Tag) -> Option<&str> {
        self.names.get(tag.as_usize()).map(String::as_str)
    }

    /// Allocates `n` nodes of tag.
    pub fn create(&mut self, tag: Tag, n: usize) -> Collection {
        match NonZeroU64::new(n as u64) {
            Some(count) => {
                let range = self.allocate(count, tag);
                Collection::from_range(self.fingerprint, range)
            }
            None => Collection::empty(self.fingerprint),
        }
    }

    /// Allocates `n` nodes of named model.
    pub fn create_model(&mut self, name: &str, n: usize) -> Collection {
        let tag = self.register_model(name);
        self.create(tag, n)
    }

    /// Forgets all nodes and starts a new session.
    /// Models stay registered, collections created before become stale.
    pub fn reset(&mut self) {
        let fingerprint = Fingerprint::next();
        info!(
            "Resetting kernel session {} with {} nodes, new session {}",
            self.fingerprint,
            self.len(),
            fingerprint
        );
        self.fingerprint = fingerprint;
        self.next = Id::new(1).expect("One is not zero");
        self.blocks.clear();
    }

    fn block_of(&self, id: Id) -> Option<&PrimitiveRange> {
        let i = self.blocks.partition_point(|block| block.last() < id);
        self.blocks.get(i).filter(|block| block.contains(id))
    }
}

impl Allocate for Kernel {
    fn allocate(&mut self, count: NonZeroU64, tag: Tag) -> PrimitiveRange {
        let range = PrimitiveRange::with_count(self.next, count, tag);
        match self.blocks.last_mut() {
            Some(block) if block.joins(&range) => block.extend_to(range.last()),
            _ => self.blocks.push(range),
        }
        self.next = range.last().offset(1);
        trace!("Allocated {:?}", range);
        range
    }
}

impl Resolve for Kernel {
    fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    fn resolve(&self, id: Id) -> Result<NodeMeta, Error> {
        let block = self.block_of(id).ok_or(Error::UnknownIdentifier(id))?;
        Ok(NodeMeta::new(block.tag(), self.config.placement(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> Id {
        Id::new(raw).unwrap()
    }

    #[test]
    fn allocation_is_monotonic() {
        let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
        let a = kernel.create_model("iaf_psc_alpha", 10);
        let b = kernel.create_model("iaf_psc_exp", 5);
        let c = kernel.create_model("iaf_psc_alpha", 3);
        assert_eq!(a.to_array(), (1..=10).collect::<Vec<_>>());
        assert_eq!(b.to_array(), (11..=15).collect::<Vec<_>>());
        assert_eq!(c.to_array(), (16..=18).collect::<Vec<_>>());
        assert_eq!(kernel.len(), 18);
        assert_eq!(kernel.blocks.len(), 3);
    }

    #[test]
    fn same_tag_blocks_merge() {
        let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
        let tag = kernel.register_model("parrot_neuron");
        kernel.create(tag, 4);
        kernel.create(tag, 4);
        assert_eq!(kernel.blocks.len(), 1);
        assert_eq!(kernel.resolve(id(8)).unwrap().tag(), tag);
    }

    #[test]
    fn models() {
        let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
        let alpha = kernel.register_model("iaf_psc_alpha");
        let exp = kernel.register_model("iaf_psc_exp");
        assert_ne!(alpha, exp);
        assert_eq!(kernel.register_model("iaf_psc_alpha"), alpha);
        assert_eq!(kernel.model("iaf_psc_exp"), Some(exp));
        assert_eq!(kernel.model("missing"), None);
        assert_eq!(kernel.model_name(exp), Some("iaf_psc_exp"));
    }

    #[test]
    fn resolve_unknown() {
        let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
        kernel.create_model("iaf_psc_alpha", 3);
        assert_eq!(kernel.resolve(id(4)), Err(Error::UnknownIdentifier(id(4))));
        assert!(kernel.resolve(id(3)).is_ok());
    }

    #[test]
    fn reset_starts_new_session() {
        let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
        let nodes = kernel.create_model("iaf_psc_alpha", 3);
        let before = kernel.fingerprint();
        kernel.reset();
        assert_ne!(kernel.fingerprint(), before);
        assert_eq!(nodes.fingerprint(), before);
        assert!(kernel.is_empty());
        assert_eq!(kernel.resolve(id(1)), Err(Error::UnknownIdentifier(id(1))));
        assert_eq!(kernel.model("iaf_psc_alpha"), Some(Tag(0)));

        let again = kernel.create_model("iaf_psc_alpha", 3);
        assert_eq!(again.first(), Some(id(1)));
    }

    #[test]
    fn round_robin_placement() {
        let config = KernelConfig::default()
            .with_processes(2)
            .with_threads(2)
            .with_rank(1);
        let mut kernel = Kernel::new(config).unwrap();
        kernel.create_model("iaf_psc_alpha", 8);

        // vp = id % 4, rank = vp % 2, thread = vp / 2
        let meta = |raw| kernel.resolve(id(raw)).unwrap();
        assert!(meta(1).is_local());
        assert_eq!(meta(1).thread(), 0);
        assert!(!meta(2).is_local());
        assert_eq!(meta(2).thread(), 1);
        assert!(meta(3).is_local());
        assert_eq!(meta(3).thread(), 1);
        assert!(!meta(4).is_local());
        assert_eq!(meta(4).thread(), 0);
    }

    #[test]
    fn invalid_config() {
        let config = KernelConfig::default().with_processes(2).with_rank(2);
        assert!(matches!(Kernel::new(config), Err(Error::InvalidConfig(_))));
        let config = KernelConfig::default().with_threads(0);
        assert!(matches!(Kernel::new(config), Err(Error::InvalidConfig(_))));
    }
}
