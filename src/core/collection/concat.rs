use super::Collection;
use crate::{
    core::{Error, Id, RangeList, Run, View},
    util::div_ceil,
};
use log::*;
use std::ops::Add;

impl Collection {
    /// Union of two collections with disjoint identifiers.
    ///
    /// The result enumerates identifiers of both in ascending order, it's primitive
    /// if everything fits into one range list, composite otherwise. Ranges are shared
    /// with the operands where possible.
    ///
    /// Errors:
    /// - Composition if either side is a sliced composite.
    /// - StaleCollection if they come from different kernel sessions.
    /// - Overlap if they share an identifier.
    pub fn concat(&self, other: &Collection) -> Result<Collection, Error> {
        if self.is_windowed() || other.is_windowed() {
            return Err(Error::Composition);
        }
        if self.fingerprint != other.fingerprint {
            return Err(Error::StaleCollection {
                collection: other.fingerprint,
                current: self.fingerprint,
            });
        }

        let left = components(self);
        let right = components(other);
        for b in &right {
            for a in &left {
                if spans_intersect(a, b) {
                    if let Some(id) = first_shared(a, b) {
                        return Err(Error::Overlap(id));
                    }
                }
            }
        }

        let mut views = left;
        views.extend(right);
        views.sort_by_key(|view| view.first());
        let views = fuse(untangle(views)?);
        trace!("Concatenated into {} views", views.len());

        Ok(Collection::from_views(self.fingerprint, views))
    }
}

impl<'a> Add<&'a Collection> for &'a Collection {
    type Output = Result<Collection, Error>;

    fn add(self, other: &'a Collection) -> Self::Output {
        self.concat(other)
    }
}

/// Non empty views of a collection.
/// Step 1 windows are trimmed into their own list so they count as full.
fn components(collection: &Collection) -> Vec<View> {
    collection
        .views()
        .iter()
        .filter(|view| !view.is_empty())
        .map(|view| {
            if !view.is_full() && view.window().step() == 1 {
                View::full(view.materialize())
            } else {
                view.clone()
            }
        })
        .collect()
}

fn span(view: &View) -> (Id, Id) {
    (
        view.first().expect("Non empty view"),
        view.last().expect("Non empty view"),
    )
}

fn spans_intersect(a: &View, b: &View) -> bool {
    let (a_first, a_last) = span(a);
    let (b_first, b_last) = span(b);
    a_first <= b_last && b_first <= a_last
}

/// First identifier present in both views.
fn first_shared(a: &View, b: &View) -> Option<Id> {
    let mut a_runs = a.runs();
    let mut b_runs = b.runs();
    let mut next = (a_runs.next(), b_runs.next());
    while let (Some(x), Some(y)) = next {
        if x.last() < y.first() {
            next.0 = a_runs.next();
        } else if y.last() < x.first() {
            next.1 = b_runs.next();
        } else if let Some(id) = shared_in(x, y) {
            return Some(id);
        } else if x.last() < y.last() {
            next.0 = a_runs.next();
        } else {
            next.1 = b_runs.next();
        }
    }
    None
}

/// First identifier of both runs, walking the sparser one over their common bounds.
fn shared_in(x: Run, y: Run) -> Option<Id> {
    let low = x.first().max(y.first());
    let high = x.last().min(y.last());
    let (walk, probe) = if x.stride() >= y.stride() {
        (x, y)
    } else {
        (y, x)
    };

    let from = div_ceil(
        (low.get() - walk.first().get()) as usize,
        walk.stride() as usize,
    );
    (from..walk.count())
        .map_while(|k| walk.get(k).filter(|&id| id <= high))
        .find(|&id| probe.contains(id))
}

/// Merges views whose spans interleave into one list.
/// Views must be sorted by first identifier.
fn untangle(views: Vec<View>) -> Result<Vec<View>, Error> {
    let mut out: Vec<View> = Vec::with_capacity(views.len());
    let mut cluster: Vec<View> = Vec::new();
    let mut cluster_last = None;

    for view in views {
        let (first, last) = span(&view);
        if cluster_last.map_or(false, |cluster_last| first <= cluster_last) {
            cluster_last = cluster_last.max(Some(last));
            cluster.push(view);
        } else {
            flush(&mut cluster, &mut out)?;
            cluster_last = Some(last);
            cluster.push(view);
        }
    }
    flush(&mut cluster, &mut out)?;

    Ok(out)
}

fn flush(cluster: &mut Vec<View>, out: &mut Vec<View>) -> Result<(), Error> {
    match cluster.len() {
        0 => (),
        1 => out.extend(cluster.drain(..)),
        n => {
            debug!("Merging {} interleaved views", n);
            let lists = cluster.drain(..).map(|view| view.materialize()).collect::<Vec<_>>();
            let merged = RangeList::union(&lists).map_err(Error::Overlap)?;
            out.push(View::full(merged));
        }
    }
    Ok(())
}

/// Joins neighbouring full views that continue one another.
fn fuse(views: Vec<View>) -> Vec<View> {
    let mut out: Vec<View> = Vec::with_capacity(views.len());
    for view in views {
        if let Some(previous) = out.last_mut() {
            let continues = previous.is_full()
                && view.is_full()
                && match (previous.list().ranges().last(), view.list().ranges().first()) {
                    (Some(a), Some(b)) => a.joins(b),
                    _ => false,
                };
            if continues {
                let list = RangeList::from_ranges(
                    previous
                        .list()
                        .ranges()
                        .iter()
                        .chain(view.list().ranges())
                        .copied(),
                );
                *previous = View::full(list);
                continue;
            }
        }
        out.push(view);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Tag, Window};

    fn id(raw: u64) -> Id {
        Id::new(raw).unwrap()
    }

    #[test]
    fn shared_in_strided_runs() {
        // 1 4 7 10 13 and 2 4 6 8 10
        let x = Run::new(id(1), 3, 5, Tag(0));
        let y = Run::new(id(2), 2, 5, Tag(0));
        assert_eq!(shared_in(x, y), Some(id(4)));

        // 1 5 9 and 3 7 11
        let x = Run::new(id(1), 4, 3, Tag(0));
        let y = Run::new(id(3), 4, 3, Tag(0));
        assert_eq!(shared_in(x, y), None);
    }

    #[test]
    fn first_shared_across_ranges() {
        let a = View::full(RangeList::from_sorted(
            [1, 2, 3, 10, 11].map(|raw| (id(raw), Tag(0))),
        ));
        let b = View::full(RangeList::from_sorted(
            [4, 5, 11, 12].map(|raw| (id(raw), Tag(0))),
        ));
        assert_eq!(first_shared(&a, &b), Some(id(11)));

        let c = View::new(
            RangeList::from_sorted((4..=20).map(|raw| (id(raw), Tag(0)))),
            Window::new(1, 17, 2),
        );
        // c selects 5 7 9 11 ..
        assert_eq!(first_shared(&a, &c), Some(id(11)));
    }

    #[test]
    fn untangle_merges_interleaved() {
        let a = View::full(RangeList::from_sorted([1, 5].map(|raw| (id(raw), Tag(0)))));
        let b = View::full(RangeList::from_sorted([3].map(|raw| (id(raw), Tag(0)))));
        let c = View::full(RangeList::from_sorted([9].map(|raw| (id(raw), Tag(0)))));
        let views = untangle(vec![a, b, c]).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].len(), 3);
        assert_eq!(views[0].get(1), Some(id(3)));
    }
}
