use super::{Id, Tag};
use getset::CopyGetters;
use std::{fmt, num::NonZeroU64};

/// Contiguous run of identifiers `first..=last` sharing one tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PrimitiveRange {
    first: Id,
    last: Id,
    tag: Tag,
}

impl PrimitiveRange {
    /// Panics if `first > last`.
    pub fn new(first: Id, last: Id, tag: Tag) -> Self {
        assert!(first <= last, "Range {:?}..={:?} is reversed", first, last);
        Self { first, last, tag }
    }

    pub fn single(id: Id, tag: Tag) -> Self {
        Self {
            first: id,
            last: id,
            tag,
        }
    }

    pub fn with_count(first: Id, count: NonZeroU64, tag: Tag) -> Self {
        Self::new(first, first.offset(count.get() - 1), tag)
    }

    pub fn len(&self) -> usize {
        self.first.span(self.last) as usize
    }

    pub fn contains(&self, id: Id) -> bool {
        self.first <= id && id <= self.last
    }

    /// Identifier at `offset` from first. None if past last.
    pub fn get(&self, offset: usize) -> Option<Id> {
        if offset < self.len() {
            Some(self.first.offset(offset as u64))
        } else {
            None
        }
    }

    /// Offset of `id` from first.
    pub fn offset_of(&self, id: Id) -> Option<usize> {
        if self.contains(id) {
            Some((id.get() - self.first.get()) as usize)
        } else {
            None
        }
    }

    /// True if `next` starts right after self and shares the tag.
    pub fn joins(&self, next: &PrimitiveRange) -> bool {
        self.tag == next.tag && self.last.get() + 1 == next.first.get()
    }

    /// Sub range of `from..=to` offsets.
    pub(crate) fn trim(&self, from: usize, to: usize) -> Self {
        debug_assert!(from <= to && to < self.len());
        Self {
            first: self.first.offset(from as u64),
            last: self.first.offset(to as u64),
            tag: self.tag,
        }
    }

    pub(crate) fn extend_to(&mut self, last: Id) {
        debug_assert!(self.last <= last);
        self.last = last;
    }

    /// All identifiers in range as raw numbers.
    pub fn raw(&self) -> std::ops::RangeInclusive<u64> {
        self.first.get()..=self.last.get()
    }
}

impl fmt::Debug for PrimitiveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} {:?}", self.first, self.last, self.tag)
    }
}

/// Arithmetic progression of identifiers with one tag.
///
/// `first, first + stride, ..` of `count` elements, `count` is never zero.
/// Every collection can be walked as a sequence of runs, which is what
/// iteration and comparison are built on.
#[derive(Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Run {
    first: Id,
    stride: u64,
    count: usize,
    tag: Tag,
}

impl Run {
    pub(crate) fn new(first: Id, stride: u64, count: usize, tag: Tag) -> Self {
        debug_assert!(count > 0 && stride > 0);
        Self {
            first,
            stride,
            count,
            tag,
        }
    }

    pub fn last(&self) -> Id {
        self.first.offset(self.stride * (self.count as u64 - 1))
    }

    pub fn get(&self, k: usize) -> Option<Id> {
        if k < self.count {
            Some(self.first.offset(self.stride * k as u64))
        } else {
            None
        }
    }

    pub fn position(&self, id: Id) -> Option<usize> {
        if id < self.first || id > self.last() {
            return None;
        }
        let delta = id.get() - self.first.get();
        if delta % self.stride == 0 {
            Some((delta / self.stride) as usize)
        } else {
            None
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.position(id).is_some()
    }

    /// Drops first `n` elements. None if nothing remains.
    pub fn skip(self, n: usize) -> Option<Self> {
        if n < self.count {
            Some(Self {
                first: self.first.offset(self.stride * n as u64),
                count: self.count - n,
                ..self
            })
        } else {
            None
        }
    }

    /// Appends identifiers to `out` as raw numbers.
    pub fn extend_raw(&self, out: &mut Vec<u64>) {
        let first = self.first.get();
        if self.stride == 1 {
            out.extend(first..first + self.count as u64);
        } else {
            out.extend((0..self.count as u64).map(|k| first + k * self.stride));
        }
    }
}

impl fmt::Debug for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stride == 1 {
            write!(f, "{}..={} {:?}", self.first, self.last(), self.tag)
        } else {
            write!(
                f,
                "{}..={} step {} {:?}",
                self.first,
                self.last(),
                self.stride,
                self.tag
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> Id {
        Id::new(raw).unwrap()
    }

    #[test]
    fn range_offsets() {
        let range = PrimitiveRange::new(id(3), id(7), Tag(1));
        assert_eq!(range.len(), 5);
        assert_eq!(range.get(0), Some(id(3)));
        assert_eq!(range.get(4), Some(id(7)));
        assert_eq!(range.get(5), None);
        assert_eq!(range.offset_of(id(5)), Some(2));
        assert_eq!(range.offset_of(id(8)), None);
    }

    #[test]
    #[should_panic]
    fn reversed_range() {
        PrimitiveRange::new(id(7), id(3), Tag(0));
    }

    #[test]
    fn joins_needs_tag_and_adjacency() {
        let a = PrimitiveRange::new(id(1), id(2), Tag(0));
        assert!(a.joins(&PrimitiveRange::new(id(3), id(4), Tag(0))));
        assert!(!a.joins(&PrimitiveRange::new(id(3), id(4), Tag(1))));
        assert!(!a.joins(&PrimitiveRange::new(id(4), id(4), Tag(0))));
    }

    #[test]
    fn run_positions() {
        let run = Run::new(id(2), 3, 4, Tag(0));
        assert_eq!(run.last(), id(11));
        assert_eq!(run.position(id(8)), Some(2));
        assert_eq!(run.position(id(9)), None);
        assert_eq!(run.position(id(14)), None);
        assert_eq!(run.skip(3).map(|run| run.first()), Some(id(11)));
        assert_eq!(run.skip(4), None);

        let mut out = Vec::new();
        run.extend_raw(&mut out);
        assert_eq!(out, vec![2, 5, 8, 11]);
    }
}
