use std::iter::Peekable;

/// Sorts in place.
/// Returns true if items were already in ascending order.
pub fn sort_ascending<T: Ord>(items: &mut [T]) -> bool {
    if items.windows(2).all(|pair| pair[0] <= pair[1]) {
        true
    } else {
        items.sort_unstable();
        false
    }
}

/// Iterator whose items are in ascending order.
/// Order is checked in debug builds.
pub struct Ascending<I: Iterator>
where
    I::Item: Ord + Copy,
{
    iter: I,
    #[cfg(debug_assertions)]
    last: Option<I::Item>,
}

impl<I: Iterator> Ascending<I>
where
    I::Item: Ord + Copy,
{
    /// Iter must be sorted in ascending order.
    pub fn new(iter: I) -> Self {
        Ascending {
            iter,
            #[cfg(debug_assertions)]
            last: None,
        }
    }

    /// Skips repeated items, counting how many were skipped.
    pub fn dedup(self) -> Dedup<Self> {
        Dedup {
            iter: self.peekable(),
            duplicates: 0,
        }
    }
}

impl<I: Iterator> Iterator for Ascending<I>
where
    I::Item: Ord + Copy,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.iter.next()?;
        #[cfg(debug_assertions)]
        {
            if let Some(last) = self.last {
                debug_assert!(last <= next, "Iterator is not ascending");
            }
            self.last = Some(next);
        }
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

pub struct Dedup<I: Iterator> {
    iter: Peekable<I>,
    duplicates: usize,
}

impl<I: Iterator> Dedup<I> {
    /// Number of skipped items so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

impl<I: Iterator> Iterator for Dedup<I>
where
    I::Item: PartialEq,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.iter.next()?;
        while self.iter.next_if_eq(&next).is_some() {
            self.duplicates += 1;
        }
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (min, max) = self.iter.size_hint();
        (min.min(1), max)
    }
}
