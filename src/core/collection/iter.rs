use super::Collection;
use crate::core::{view, Id, Run, Tag, View};
use std::{iter::FusedIterator, slice};

/// Runs of consecutive views.
pub struct Runs<'a> {
    views: slice::Iter<'a, View>,
    current: Option<view::Runs<'a>>,
}

impl<'a> Runs<'a> {
    pub(super) fn new(views: &'a [View]) -> Self {
        Runs {
            views: views.iter(),
            current: None,
        }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        loop {
            if let Some(run) = self.current.as_mut().and_then(Iterator::next) {
                return Some(run);
            }
            self.current = Some(self.views.next()?.runs());
        }
    }
}

impl<'a> FusedIterator for Runs<'a> {}

/// Walks runs one identifier at a time.
struct Cursor<'a> {
    runs: Runs<'a>,
    run: Option<Run>,
    remaining: usize,
}

impl<'a> Cursor<'a> {
    fn new(collection: &'a Collection) -> Self {
        Cursor {
            runs: collection.runs(),
            run: None,
            remaining: collection.len(),
        }
    }

    fn next(&mut self) -> Option<(Id, Tag)> {
        let run = match self.run {
            Some(run) => run,
            None => self.runs.next()?,
        };
        self.run = run.skip(1);
        self.remaining -= 1;
        Some((run.first(), run.tag()))
    }
}

/// Identifiers of a collection in order.
pub struct Iter<'a>(Cursor<'a>);

impl<'a> Iter<'a> {
    pub(super) fn new(collection: &'a Collection) -> Self {
        Iter(Cursor::new(collection))
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        self.0.next().map(|(id, _)| id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.remaining, Some(self.0.remaining))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> FusedIterator for Iter<'a> {}

/// Identifiers with their tags.
pub struct Items<'a>(Cursor<'a>);

impl<'a> Items<'a> {
    pub(super) fn new(collection: &'a Collection) -> Self {
        Items(Cursor::new(collection))
    }
}

impl<'a> Iterator for Items<'a> {
    type Item = (Id, Tag);

    fn next(&mut self) -> Option<(Id, Tag)> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.remaining, Some(self.0.remaining))
    }
}

impl<'a> ExactSizeIterator for Items<'a> {}
