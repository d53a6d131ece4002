use super::{Id, PrimitiveRange, RangeList, Run, Tag, Window};
use getset::{CopyGetters, Getters};
use std::fmt;

/// Window over a range list.
/// Slicing a view composes windows and never touches the ranges.
#[derive(Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct View {
    #[getset(get = "pub")]
    list: RangeList,
    #[getset(get_copy = "pub")]
    window: Window,
}

impl View {
    /// Panics if window reaches past the list.
    pub fn new(list: RangeList, window: Window) -> Self {
        assert!(
            window.stop() <= list.len(),
            "Window {:?} is out of list of length {}",
            window,
            list.len()
        );
        Self { list, window }
    }

    pub fn full(list: RangeList) -> Self {
        let window = Window::full(list.len());
        Self { list, window }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// True if the window selects the whole list.
    pub fn is_full(&self) -> bool {
        self.window.is_full(self.list.len())
    }

    pub fn get(&self, k: usize) -> Option<Id> {
        self.list.get(self.window.map(k)?)
    }

    pub fn position(&self, id: Id) -> Option<usize> {
        self.window.position(self.list.position(id)?)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.position(id).is_some()
    }

    /// Tag of id if it's selected by this view.
    pub fn tag_of(&self, id: Id) -> Option<Tag> {
        let (i, pos) = self.list.locate(id)?;
        self.window.position(pos)?;
        Some(self.list.ranges()[i].tag())
    }

    pub fn first(&self) -> Option<Id> {
        self.get(0)
    }

    pub fn last(&self) -> Option<Id> {
        self.len().checked_sub(1).and_then(|k| self.get(k))
    }

    /// Sub view, `window` is over positions of this view.
    pub fn slice(&self, window: Window) -> Self {
        debug_assert!(window.stop() <= self.len());
        Self {
            list: self.list.clone(),
            window: self.window.compose(window),
        }
    }

    pub fn runs(&self) -> Runs<'_> {
        let next = self
            .list
            .range_at(self.window.start())
            .filter(|_| !self.window.is_empty())
            .map_or(self.list.ranges().len(), |(i, _)| i);
        Runs { view: self, next }
    }

    /// Unwindowed list with the same identifiers.
    /// Shares ranges if the view is full, copies ranges for step 1 windows,
    /// and expands identifiers otherwise.
    pub fn materialize(&self) -> RangeList {
        if self.is_full() {
            self.list.clone()
        } else if self.window.step() == 1 {
            self.list.trim(self.window.start(), self.window.stop())
        } else {
            RangeList::from_ranges(self.runs().flat_map(|run| {
                (0..run.count()).map(move |k| {
                    PrimitiveRange::single(run.get(k).expect("In run"), run.tag())
                })
            }))
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full() {
            write!(f, "{:?}", self.list)
        } else {
            write!(f, "{:?}{:?}", self.list, self.window)
        }
    }
}

/// Runs of a view, one per range the window touches.
pub struct Runs<'a> {
    view: &'a View,
    next: usize,
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let list = &self.view.list;
        let window = self.view.window;
        while let Some(range) = list.ranges().get(self.next) {
            let from = list.offset(self.next);
            if from >= window.stop() {
                self.next = list.ranges().len();
                return None;
            }
            self.next += 1;

            if let Some((first, count)) = window.clip(from, from + range.len()) {
                let id = range.first().offset((first - from) as u64);
                return Some(Run::new(id, window.step() as u64, count, range.tag()));
            }
        }
        None
    }
}
