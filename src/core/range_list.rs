use super::{Id, PrimitiveRange, Tag};
use std::{fmt, sync::Arc};

/// Ordered sequence of non overlapping ranges.
///
/// Always canonical: ranges are ascending, and two ranges that touch and
/// share a tag are stored as one. Sizes are cached on construction so length
/// is O(1) and position lookups are a binary search over ranges.
///
/// Cloning shares the ranges.
#[derive(Clone)]
pub struct RangeList(Arc<Inner>);

struct Inner {
    ranges: Vec<PrimitiveRange>,
    /// Number of identifiers before each range.
    offsets: Vec<usize>,
    len: usize,
}

impl RangeList {
    pub fn empty() -> Self {
        Self::from_ranges(std::iter::empty())
    }

    pub fn single(range: PrimitiveRange) -> Self {
        Self::from_ranges(std::iter::once(range))
    }

    /// Ranges must be ascending and non overlapping, touching ranges with equal tags are merged.
    /// Panics on overlap.
    pub fn from_ranges(ranges: impl IntoIterator<Item = PrimitiveRange>) -> Self {
        let mut canonical: Vec<PrimitiveRange> = Vec::new();
        for range in ranges {
            match canonical.last_mut() {
                Some(open) if open.joins(&range) => open.extend_to(range.last()),
                Some(open) => {
                    assert!(
                        open.last() < range.first(),
                        "Range {:?} is not after {:?}",
                        range,
                        open
                    );
                    canonical.push(range);
                }
                None => canonical.push(range),
            }
        }

        let mut offsets = Vec::with_capacity(canonical.len());
        let mut len = 0;
        for range in &canonical {
            offsets.push(len);
            len += range.len();
        }

        RangeList(Arc::new(Inner {
            ranges: canonical,
            offsets,
            len,
        }))
    }

    /// Identifiers must be strictly ascending.
    /// Contiguous identifiers with the same tag are collapsed into one range.
    pub fn from_sorted(ids: impl IntoIterator<Item = (Id, Tag)>) -> Self {
        Self::from_ranges(ids.into_iter().map(|(id, tag)| PrimitiveRange::single(id, tag)))
    }

    /// Union of disjoint lists.
    /// Err with the first shared identifier.
    pub fn union<'a>(lists: impl IntoIterator<Item = &'a RangeList>) -> Result<Self, Id> {
        let mut ranges = lists
            .into_iter()
            .flat_map(|list| list.ranges().iter().copied())
            .collect::<Vec<_>>();
        ranges.sort_unstable_by_key(|range| range.first());

        for pair in ranges.windows(2) {
            if pair[1].first() <= pair[0].last() {
                return Err(pair[1].first());
            }
        }

        Ok(Self::from_ranges(ranges))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }

    pub fn ranges(&self) -> &[PrimitiveRange] {
        &self.0.ranges
    }

    /// Number of identifiers before range `i`.
    pub fn offset(&self, i: usize) -> usize {
        self.0.offsets[i]
    }

    pub fn first(&self) -> Option<Id> {
        self.0.ranges.first().map(|range| range.first())
    }

    pub fn last(&self) -> Option<Id> {
        self.0.ranges.last().map(|range| range.last())
    }

    /// Index of range containing position and offset inside of it.
    pub fn range_at(&self, pos: usize) -> Option<(usize, usize)> {
        if pos >= self.len() {
            return None;
        }
        let i = self.0.offsets.partition_point(|&offset| offset <= pos) - 1;
        Some((i, pos - self.0.offsets[i]))
    }

    pub fn get(&self, pos: usize) -> Option<Id> {
        let (i, offset) = self.range_at(pos)?;
        self.0.ranges[i].get(offset)
    }

    /// Index of range containing id and position of id.
    pub fn locate(&self, id: Id) -> Option<(usize, usize)> {
        let i = self.0.ranges.partition_point(|range| range.last() < id);
        let offset = self.0.ranges.get(i)?.offset_of(id)?;
        Some((i, self.0.offsets[i] + offset))
    }

    pub fn position(&self, id: Id) -> Option<usize> {
        self.locate(id).map(|(_, pos)| pos)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.locate(id).is_some()
    }

    pub fn tag_of(&self, id: Id) -> Option<Tag> {
        self.locate(id).map(|(i, _)| self.0.ranges[i].tag())
    }

    /// Copy of positions `start..stop` as a new list.
    /// O(number of ranges), identifiers are never expanded.
    pub fn trim(&self, start: usize, stop: usize) -> Self {
        if start == 0 && stop >= self.len() {
            return self.clone();
        }
        if start >= stop {
            return Self::empty();
        }

        let (first, first_offset) = self.range_at(start).expect("Start out of range");
        let (last, last_offset) = self.range_at(stop - 1).expect("Stop out of range");
        let ranges = &self.0.ranges;
        Self::from_ranges((first..=last).map(|i| {
            let from = if i == first { first_offset } else { 0 };
            let to = if i == last {
                last_offset
            } else {
                ranges[i].len() - 1
            };
            ranges[i].trim(from, to)
        }))
    }

    /// True if both share the same ranges in memory.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for RangeList {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for RangeList {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.ranges() == other.ranges()
    }
}

impl Eq for RangeList {}

impl fmt::Debug for RangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> Id {
        Id::new(raw).unwrap()
    }

    fn range(first: u64, last: u64, tag: u32) -> PrimitiveRange {
        PrimitiveRange::new(id(first), id(last), Tag(tag))
    }

    fn list(ids: &[(u64, u32)]) -> RangeList {
        RangeList::from_sorted(ids.iter().map(|&(raw, tag)| (id(raw), Tag(tag))))
    }

    #[test]
    fn collapses_runs() {
        let list = list(&[(1, 0), (2, 0), (3, 0), (5, 0), (6, 1), (7, 1)]);
        assert_eq!(
            list.ranges(),
            &[range(1, 3, 0), range(5, 5, 0), range(6, 7, 1)]
        );
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn merges_touching_ranges() {
        let list = RangeList::from_ranges([range(1, 4, 0), range(5, 9, 0), range(10, 10, 2)]);
        assert_eq!(list.ranges(), &[range(1, 9, 0), range(10, 10, 2)]);
    }

    #[test]
    #[should_panic]
    fn overlap_panics() {
        RangeList::from_ranges([range(1, 4, 0), range(4, 9, 1)]);
    }

    #[test]
    fn get_and_locate() {
        let list = RangeList::from_ranges([range(1, 3, 0), range(10, 11, 0), range(20, 24, 1)]);
        assert_eq!(list.len(), 10);
        let expected = [1, 2, 3, 10, 11, 20, 21, 22, 23, 24];
        for (pos, &raw) in expected.iter().enumerate() {
            assert_eq!(list.get(pos), Some(id(raw)));
            assert_eq!(list.position(id(raw)), Some(pos));
        }
        assert_eq!(list.get(10), None);
        assert_eq!(list.position(id(5)), None);
        assert_eq!(list.position(id(25)), None);
        assert_eq!(list.tag_of(id(21)), Some(Tag(1)));
        assert_eq!(list.range_at(4), Some((1, 1)));
    }

    #[test]
    fn empty() {
        let list = RangeList::empty();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(list.get(0), None);
        assert_eq!(list.locate(id(1)), None);
    }

    #[test]
    fn trim_keeps_boundaries() {
        let list = RangeList::from_ranges([range(1, 3, 0), range(10, 11, 0), range(20, 24, 1)]);
        let trimmed = list.trim(2, 7);
        assert_eq!(
            trimmed.ranges(),
            &[range(3, 3, 0), range(10, 11, 0), range(20, 21, 1)]
        );
        assert!(list.trim(0, 10).ptr_eq(&list));
        assert!(list.trim(4, 4).is_empty());
    }

    #[test]
    fn union_detects_shared() {
        let a = RangeList::from_ranges([range(1, 3, 0), range(10, 12, 0)]);
        let b = RangeList::from_ranges([range(5, 6, 0), range(13, 14, 0)]);
        let union = RangeList::union([&a, &b]).unwrap();
        assert_eq!(
            union.ranges(),
            &[range(1, 3, 0), range(5, 6, 0), range(10, 14, 0)]
        );

        let c = RangeList::from_ranges([range(12, 20, 1)]);
        assert_eq!(RangeList::union([&a, &c]), Err(id(12)));
    }
}
