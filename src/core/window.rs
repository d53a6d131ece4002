use super::Error;
use crate::util::div_ceil;
use getset::CopyGetters;
use std::fmt;

/// Lazy forward slice `start..stop` by `step` over logical positions.
///
/// Always normalized: `stop` is one past the last selected position,
/// single element windows have step 1, and empty windows are `0..0`.
/// So two windows select the same positions iff they are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Window {
    start: usize,
    stop: usize,
    step: usize,
}

impl Window {
    pub const EMPTY: Window = Window {
        start: 0,
        stop: 0,
        step: 1,
    };

    /// Selects everything of a sequence of `len`.
    pub fn full(len: usize) -> Self {
        Self::with_len(0, len, 1)
    }

    /// Window of `len` positions starting at `start`.
    pub fn with_len(start: usize, len: usize, step: usize) -> Self {
        assert!(step > 0, "Zero step");
        match len {
            0 => Self::EMPTY,
            1 => Window {
                start,
                stop: start + 1,
                step: 1,
            },
            _ => Window {
                start,
                stop: start + (len - 1) * step + 1,
                step,
            },
        }
    }

    /// Window over `start..stop` by `step`.
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        assert!(step > 0, "Zero step");
        if stop <= start {
            Self::EMPTY
        } else {
            Self::with_len(start, div_ceil(stop - start, step), step)
        }
    }

    /// Resolves python style slice bounds against a sequence of `len`.
    ///
    /// Missing bounds default to the ends, negative ones count from the end,
    /// and everything is clamped to the sequence. Step must be positive.
    pub fn resolve(
        len: usize,
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    ) -> Result<Self, Error> {
        if step <= 0 {
            return Err(Error::UnsupportedSlice { step });
        }

        let clamp = |bound: Option<isize>, default: usize| match bound {
            None => default,
            Some(i) if i < 0 => len.saturating_sub(i.unsigned_abs()),
            Some(i) => (i as usize).min(len),
        };

        Ok(Self::new(clamp(start, 0), clamp(stop, len), step as usize))
    }

    pub fn len(&self) -> usize {
        if self.stop <= self.start {
            0
        } else {
            div_ceil(self.stop - self.start, self.step)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// True if this selects all of a sequence of `len`.
    pub fn is_full(&self, len: usize) -> bool {
        *self == Self::full(len)
    }

    /// Underlying position of `k`th selected position.
    pub fn map(&self, k: usize) -> Option<usize> {
        if k < self.len() {
            Some(self.start + k * self.step)
        } else {
            None
        }
    }

    /// Inverse of map.
    pub fn position(&self, pos: usize) -> Option<usize> {
        if pos < self.start || pos >= self.stop {
            return None;
        }
        let delta = pos - self.start;
        if delta % self.step == 0 {
            Some(delta / self.step)
        } else {
            None
        }
    }

    /// Applies `inner`, which is over positions selected by self.
    pub fn compose(&self, inner: Window) -> Window {
        match inner.len() {
            0 => Self::EMPTY,
            len => Self::with_len(
                self.start + inner.start * self.step,
                len,
                self.step * inner.step,
            ),
        }
    }

    /// First selected position at or after `from`, and how many are selected below `to`.
    /// Used to cut the window along range boundaries.
    pub fn clip(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let from = from.max(self.start);
        let to = to.min(self.stop);
        if from >= to {
            return None;
        }
        let first = self.start + div_ceil(from - self.start, self.step) * self.step;
        if first >= to {
            return None;
        }
        Some((first, div_ceil(to - first, self.step)))
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.start, self.stop, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized() {
        assert_eq!(Window::new(1, 6, 3), Window::new(1, 5, 3));
        assert_eq!(Window::new(1, 6, 3).len(), 2);
        assert_eq!(Window::new(4, 5, 7), Window::new(4, 5, 1));
        assert_eq!(Window::new(5, 2, 1), Window::EMPTY);
        assert!(Window::full(0).is_empty());
        assert!(Window::EMPTY.is_full(0));
    }

    #[test]
    fn resolve_python_bounds() {
        let w = |start, stop, step| Window::resolve(10, start, stop, step).unwrap();
        assert_eq!(w(None, Some(5), 1), Window::new(0, 5, 1));
        assert_eq!(w(Some(2), Some(7), 1), Window::new(2, 7, 1));
        assert_eq!(w(None, None, 2).len(), 5);
        assert_eq!(w(Some(1), Some(6), 3).len(), 2);
        assert_eq!(w(Some(-4), None, 1), Window::new(6, 10, 1));
        assert_eq!(w(None, Some(-3), 1), Window::new(0, 7, 1));
        assert_eq!(w(Some(-20), Some(20), 1), Window::full(10));
        assert_eq!(w(Some(8), Some(3), 1), Window::EMPTY);
        assert_eq!(
            Window::resolve(10, None, None, -3),
            Err(Error::UnsupportedSlice { step: -3 })
        );
        assert_eq!(
            Window::resolve(10, None, None, 0),
            Err(Error::UnsupportedSlice { step: 0 })
        );
    }

    #[test]
    fn map_and_position() {
        let window = Window::new(2, 12, 3);
        assert_eq!(window.len(), 4);
        assert_eq!(window.map(3), Some(11));
        assert_eq!(window.map(4), None);
        assert_eq!(window.position(8), Some(2));
        assert_eq!(window.position(9), None);
        assert_eq!(window.position(14), None);
    }

    #[test]
    fn compose() {
        // [::2] then [1:4]
        let outer = Window::new(0, 20, 2);
        let inner = Window::new(1, 4, 1);
        let composed = outer.compose(inner);
        assert_eq!(composed, Window::new(2, 7, 2));
        for k in 0..inner.len() {
            assert_eq!(
                composed.map(k),
                outer.map(inner.map(k).unwrap())
            );
        }
        assert_eq!(outer.compose(Window::EMPTY), Window::EMPTY);
    }

    #[test]
    fn clip() {
        let window = Window::new(1, 20, 3); // 1 4 7 10 13 16 19
        assert_eq!(window.clip(0, 5), Some((1, 2)));
        assert_eq!(window.clip(5, 11), Some((7, 2)));
        assert_eq!(window.clip(17, 19), None);
        assert_eq!(window.clip(17, 30), Some((19, 1)));
        assert_eq!(window.clip(20, 30), None);
    }
}
