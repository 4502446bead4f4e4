//! Provides the [`RowPointer`] type which identifies a row resident in a [`Table`](crate::table::Table).

use crate::static_assert_size;
use core::fmt;
use derive_more::{From, Into};

/// A pointer to a row slot in a [`Table`](crate::table::Table).
///
/// A pointer is only meaningful for the table that handed it out.
/// Rows are never moved, so a pointer stays valid across updates of its row.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct RowPointer(pub u64);

static_assert_size!(RowPointer, 8);

impl RowPointer {
    /// Returns the slot index within the table's row storage.
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RowPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowPointer(slot = {})", self.0)
    }
}

impl fmt::Display for RowPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
