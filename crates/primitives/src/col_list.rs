use crate::ColId;
use core::fmt;
use smallvec::SmallVec;

/// An ordered, non-empty list of columns, e.g. the key columns of an index.
///
/// Single column lists are by far the most common,
/// so one column is stored inline without allocating.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColList(SmallVec<[ColId; 1]>);

impl ColList {
    /// Returns a list containing only `col`.
    pub fn new(col: ColId) -> Self {
        Self(smallvec::smallvec![col])
    }

    /// Returns the first column in the list.
    pub fn head(&self) -> ColId {
        self.0[0]
    }

    /// Returns the number of columns in the list.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the list consists of exactly one column.
    pub fn is_singleton(&self) -> bool {
        self.len() == 1
    }

    /// Returns whether `col` is part of the list.
    pub fn contains(&self, col: ColId) -> bool {
        self.0.contains(&col)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = ColId> + '_ {
        self.0.iter().copied()
    }

    /// Appends `col` to the end of the list.
    pub fn push(&mut self, col: ColId) {
        self.0.push(col);
    }
}

impl From<ColId> for ColList {
    fn from(col: ColId) -> Self {
        Self::new(col)
    }
}

impl From<u32> for ColList {
    fn from(col: u32) -> Self {
        Self::new(col.into())
    }
}

impl From<i32> for ColList {
    fn from(col: i32) -> Self {
        Self::new(col.into())
    }
}

impl<const N: usize> From<[u32; N]> for ColList {
    /// Panics if `N == 0`, as column lists are never empty.
    fn from(cols: [u32; N]) -> Self {
        cols.into_iter().map(ColId).collect()
    }
}

impl<const N: usize> From<[i32; N]> for ColList {
    /// Panics if `N == 0`, as column lists are never empty.
    fn from(cols: [i32; N]) -> Self {
        cols.into_iter().map(ColId::from).collect()
    }
}

impl FromIterator<ColId> for ColList {
    /// Panics if `iter` yields no columns, as column lists are never empty.
    fn from_iter<T: IntoIterator<Item = ColId>>(iter: T) -> Self {
        let cols: SmallVec<_> = iter.into_iter().collect();
        assert!(!cols.is_empty(), "`ColList` must contain at least one column");
        Self(cols)
    }
}

impl fmt::Debug for ColList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for ColList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, col) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{col}")?;
        }
        write!(f, "]")
    }
}
