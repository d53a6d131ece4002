mod concat;
mod iter;

pub use iter::{Items, Iter, Runs};

use super::{
    Error, Fingerprint, Id, NodeMeta, PrimitiveRange, RangeList, Resolve, Tag, View, Window,
};
use crate::util::ord_iter::{sort_ascending, Ascending};
use auto_enums::auto_enum;
use log::*;
use std::{fmt, sync::Arc};

/// Immutable ordered collection of node identifiers.
///
/// Identifiers are stored as ranges, so a million consecutive nodes cost the
/// same as one. Slicing and concatenation share ranges with the collections
/// they came from, nothing is expanded unless explicitly asked for with
/// [`Collection::to_vec`] or [`Collection::to_array`].
///
/// Collections always enumerate identifiers in ascending order.
///
/// Every collection remembers the kernel session it was created in, which is
/// checked whenever metadata is resolved through a kernel.
#[derive(Clone)]
pub struct Collection {
    fingerprint: Fingerprint,
    shape: Shape,
}

/// How a collection is laid out.
#[derive(Clone, Debug)]
pub enum Shape {
    /// One range list with a window over it.
    Primitive(View),
    /// Concatenation of views with disjoint spans, ascending by identifier.
    Composite(Composite),
}

#[derive(Clone)]
pub struct Composite {
    views: Arc<[View]>,
    /// Number of identifiers before each view.
    offsets: Arc<[usize]>,
    len: usize,
}

impl Composite {
    /// Views must be non empty, with disjoint spans in ascending order.
    fn new(views: Vec<View>) -> Self {
        debug_assert!(views.iter().all(|view| !view.is_empty()));
        debug_assert!(views
            .windows(2)
            .all(|pair| pair[0].last() < pair[1].first()));

        let mut offsets = Vec::with_capacity(views.len());
        let mut len = 0;
        for view in &views {
            offsets.push(len);
            len += view.len();
        }

        Composite {
            views: views.into(),
            offsets: offsets.into(),
            len,
        }
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// True if any of the views doesn't cover its whole list.
    pub fn is_windowed(&self) -> bool {
        self.views.iter().any(|view| !view.is_full())
    }

    /// View containing position and position inside of it.
    fn view_at(&self, pos: usize) -> Option<(usize, usize)> {
        if pos >= self.len {
            return None;
        }
        let i = self.offsets.partition_point(|&offset| offset <= pos) - 1;
        Some((i, pos - self.offsets[i]))
    }

    /// View whose span could contain id.
    fn view_of(&self, id: Id) -> Option<usize> {
        let i = self
            .views
            .partition_point(|view| view.last().map_or(true, |last| last < id));
        (i < self.views.len()).then_some(i)
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.views.iter()).finish()
    }
}

impl Shape {
    /// Empty views are dropped, a single full view becomes primitive.
    fn from_views(mut views: Vec<View>) -> Self {
        views.retain(|view| !view.is_empty());
        match views.len() {
            0 => Shape::Primitive(View::full(RangeList::empty())),
            1 if views[0].is_full() => Shape::Primitive(views.pop().expect("One view")),
            _ => Shape::Composite(Composite::new(views)),
        }
    }
}

impl Collection {
    pub fn empty(fingerprint: Fingerprint) -> Self {
        Self::from_list(fingerprint, RangeList::empty())
    }

    /// Wraps freshly allocated range.
    pub fn from_range(fingerprint: Fingerprint, range: PrimitiveRange) -> Self {
        Self::from_list(fingerprint, RangeList::single(range))
    }

    pub fn from_list(fingerprint: Fingerprint, list: RangeList) -> Self {
        Collection {
            fingerprint,
            shape: Shape::Primitive(View::full(list)),
        }
    }

    /// Collection of explicitly listed identifiers.
    ///
    /// Identifiers are sorted ascending and duplicates are dropped, so
    /// `[7, 3, 8, 3]` becomes `[3, 7, 8]`. Tags are resolved through `resolver`.
    ///
    /// Err InvalidIdentifier if an identifier is zero or unknown to the resolver.
    pub fn from_ids<R: Resolve + ?Sized>(
        resolver: &R,
        ids: impl IntoIterator<Item = u64>,
    ) -> Result<Self, Error> {
        let mut ids = ids.into_iter().collect::<Vec<u64>>();
        if !sort_ascending(&mut ids) {
            debug!("Sorted {} identifiers into ascending order", ids.len());
        }

        let mut dedup = Ascending::new(ids.iter().copied()).dedup();
        let mut tagged = Vec::with_capacity(ids.len());
        for raw in &mut dedup {
            let id = Id::try_from(raw)?;
            let meta = match resolver.resolve(id) {
                Err(Error::UnknownIdentifier(_)) => Err(Error::InvalidIdentifier(raw)),
                meta => meta,
            }?;
            tagged.push((id, meta.tag()));
        }
        if dedup.duplicates() > 0 {
            debug!("Dropped {} duplicate identifiers", dedup.duplicates());
        }

        Ok(Self::from_list(
            resolver.fingerprint(),
            RangeList::from_sorted(tagged),
        ))
    }

    fn from_views(fingerprint: Fingerprint, views: Vec<View>) -> Self {
        Collection {
            fingerprint,
            shape: Shape::from_views(views),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Views in order, one for primitive collections.
    pub fn views(&self) -> &[View] {
        match &self.shape {
            Shape::Primitive(view) => std::slice::from_ref(view),
            Shape::Composite(composite) => composite.views(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.shape, Shape::Primitive(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.shape, Shape::Composite(_))
    }

    /// True for composites produced by slicing, those can't be concatenated.
    pub fn is_windowed(&self) -> bool {
        match &self.shape {
            Shape::Primitive(_) => false,
            Shape::Composite(composite) => composite.is_windowed(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.shape {
            Shape::Primitive(view) => view.len(),
            Shape::Composite(composite) => composite.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves possibly negative index.
    fn index(&self, index: isize) -> Result<usize, Error> {
        let len = self.len();
        let pos = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize).filter(|&pos| pos < len)
        };
        pos.ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Identifier at `index`, negative indices count from the end.
    pub fn at(&self, index: isize) -> Result<Id, Error> {
        let pos = self.index(index)?;
        let id = match &self.shape {
            Shape::Primitive(view) => view.get(pos),
            Shape::Composite(composite) => composite
                .view_at(pos)
                .and_then(|(i, pos)| composite.views[i].get(pos)),
        };
        Ok(id.expect("Position in range"))
    }

    /// Single element collection of identifier at `index`.
    pub fn nth(&self, index: isize) -> Result<Self, Error> {
        let pos = self.index(index)? as isize;
        self.slice(Some(pos), Some(pos + 1), 1)
    }

    /// Python style forward slice.
    ///
    /// Missing bounds default to the ends, negative ones count from the end,
    /// and bounds past the ends are clamped. Err UnsupportedSlice if step isn't positive.
    ///
    /// Result shares ranges with self.
    pub fn slice(
        &self,
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    ) -> Result<Self, Error> {
        let window = Window::resolve(self.len(), start, stop, step)?;
        let shape = match &self.shape {
            Shape::Primitive(view) => Shape::Primitive(view.slice(window)),
            Shape::Composite(composite) => {
                let views = composite
                    .views
                    .iter()
                    .zip(composite.offsets.iter())
                    .filter_map(|(view, &offset)| {
                        let (first, count) = window.clip(offset, offset + view.len())?;
                        Some(view.slice(Window::with_len(first - offset, count, window.step())))
                    })
                    .collect();
                Shape::from_views(views)
            }
        };

        Ok(Collection {
            fingerprint: self.fingerprint,
            shape,
        })
    }

    /// Logical index of id.
    pub fn position(&self, id: Id) -> Option<usize> {
        match &self.shape {
            Shape::Primitive(view) => view.position(id),
            Shape::Composite(composite) => {
                let i = composite.view_of(id)?;
                composite.views[i]
                    .position(id)
                    .map(|pos| composite.offsets[i] + pos)
            }
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.position(id).is_some()
    }

    /// Same as contains for raw identifiers, zero is never contained.
    pub fn contains_raw(&self, raw: u64) -> bool {
        Id::new(raw).map_or(false, |id| self.contains(id))
    }

    /// Tag of the range owning id.
    pub fn tag_of(&self, id: Id) -> Option<Tag> {
        match &self.shape {
            Shape::Primitive(view) => view.tag_of(id),
            Shape::Composite(composite) => composite.views[composite.view_of(id)?].tag_of(id),
        }
    }

    pub fn first(&self) -> Option<Id> {
        self.at(0).ok()
    }

    pub fn last(&self) -> Option<Id> {
        self.at(-1).ok()
    }

    /// Metadata of id, tag from the collection and locality from the kernel.
    ///
    /// Err StaleCollection if kernel was reset since this collection was created,
    /// or if it no longer knows id or disagrees on its tag.
    /// UnknownIdentifier if id isn't in this collection.
    pub fn meta<R: Resolve + ?Sized>(&self, resolver: &R, id: Id) -> Result<NodeMeta, Error> {
        if let Err(error) = resolver.check_session(self.fingerprint) {
            warn!("{}", error);
            return Err(error);
        }
        let tag = self.tag_of(id).ok_or(Error::UnknownIdentifier(id))?;
        let meta = self.resolve_member(resolver, id)?;
        if meta.tag() != tag {
            warn!(
                "Kernel reports {:?} for {} but collection holds {:?}",
                meta.tag(),
                id,
                tag
            );
            return Err(self.stale(resolver));
        }
        Ok(meta)
    }

    /// Metadata of identifier at `index`.
    pub fn meta_at<R: Resolve + ?Sized>(
        &self,
        resolver: &R,
        index: isize,
    ) -> Result<NodeMeta, Error> {
        self.meta(resolver, self.at(index)?)
    }

    /// Identifiers owned by the resolver's process, in order.
    /// Yields a single error if collection is stale.
    #[auto_enum(Iterator)]
    pub fn local_ids<'a, R: Resolve + ?Sized + 'a>(
        &'a self,
        resolver: &'a R,
    ) -> impl Iterator<Item = Result<Id, Error>> + 'a {
        match resolver.check_session(self.fingerprint) {
            Err(error) => {
                warn!("{}", error);
                std::iter::once(Err(error))
            }
            Ok(()) => self.iter().filter_map(move |id| {
                match self.resolve_member(resolver, id) {
                    Ok(meta) if meta.is_local() => Some(Ok(id)),
                    Ok(_) => None,
                    Err(error) => Some(Err(error)),
                }
            }),
        }
    }

    /// Resolves an identifier of this collection.
    /// A resolver that doesn't know it has moved on, so that's StaleCollection.
    fn resolve_member<R: Resolve + ?Sized>(
        &self,
        resolver: &R,
        id: Id,
    ) -> Result<NodeMeta, Error> {
        match resolver.resolve(id) {
            Err(Error::UnknownIdentifier(_)) => {
                let error = self.stale(resolver);
                warn!("{} Kernel doesn't know {}", error, id);
                Err(error)
            }
            result => result,
        }
    }

    fn stale<R: Resolve + ?Sized>(&self, resolver: &R) -> Error {
        Error::StaleCollection {
            collection: self.fingerprint,
            current: resolver.fingerprint(),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Identifiers with their tags.
    pub fn items(&self) -> Items<'_> {
        Items::new(self)
    }

    /// Arithmetic runs of identifiers, in order.
    pub fn runs(&self) -> Runs<'_> {
        Runs::new(self.views())
    }

    pub fn to_vec(&self) -> Vec<Id> {
        self.iter().collect()
    }

    /// Raw identifiers, filled run by run.
    pub fn to_array(&self) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.len());
        for run in self.runs() {
            run.extend_raw(&mut out);
        }
        out
    }
}

impl PartialEq for Collection {
    /// Equal if both enumerate the same identifiers with the same tags,
    /// regardless of how they were built. Compared run by run.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let mut runs = (self.runs(), other.runs());
        let mut next = (runs.0.next(), runs.1.next());
        loop {
            match next {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if a.first() != b.first() || a.tag() != b.tag() {
                        return false;
                    }
                    let n = a.count().min(b.count());
                    if n > 1 && a.stride() != b.stride() {
                        return false;
                    }
                    next = (
                        a.skip(n).or_else(|| runs.0.next()),
                        b.skip(n).or_else(|| runs.1.next()),
                    );
                }
                _ => return false,
            }
        }
    }
}

impl Eq for Collection {}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("fingerprint", &self.fingerprint)
            .field("shape", &self.shape)
            .finish()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 8;

        write!(f, "Collection(")?;
        let mut runs = self.runs();
        for (i, run) in runs.by_ref().take(SHOWN).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", run)?;
        }
        if runs.next().is_some() {
            write!(f, ", ...")?;
        }
        write!(f, ")")
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = Id;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
