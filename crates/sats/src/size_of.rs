use crate::{AlgebraicValue, ProductValue};

/// The approximate number of bytes a value occupies when stored in a row.
///
/// Used to account for the memory consumed by transient relations.
pub trait SizeOf {
    fn size_of(&self) -> usize;
}

impl SizeOf for AlgebraicValue {
    fn size_of(&self) -> usize {
        match self {
            Self::Null | Self::Bool(_) | Self::I8(_) | Self::U8(_) => 1,
            Self::I16(_) | Self::U16(_) => 2,
            Self::I32(_) | Self::U32(_) => 4,
            Self::I64(_) | Self::U64(_) => 8,
            // Var-len members carry a 4 byte length prefix.
            Self::String(s) => 4 + s.len(),
            Self::Bytes(b) => 4 + b.len(),
            Self::Product(pv) => pv.size_of(),
        }
    }
}

impl SizeOf for ProductValue {
    fn size_of(&self) -> usize {
        self.elements.iter().map(SizeOf::size_of).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product;

    #[test]
    fn row_size_is_sum_of_columns() {
        assert_eq!(product![1i64, "abc", true].size_of(), 8 + 4 + 3 + 1);
    }
}
