use crate::AlgebraicValue;
use partdb_primitives::{ColId, ColList};

/// A product value is made of a a list of
/// "elements" / "fields" / "factors" of other `AlgebraicValue`s.
///
/// Rows are product values; so are the keys of multi-column indexes.
#[derive(Debug, Clone, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub struct ProductValue {
    /// The values that make up this product value.
    pub elements: Box<[AlgebraicValue]>,
}

/// Constructs a product value from a list of fields with syntax `product![v1, v2, ...]`.
///
/// Repeat notation from `vec![x; n]` is not supported.
#[macro_export]
macro_rules! product {
    [$($elems:expr),*$(,)?] => {
        $crate::ProductValue {
            elements: [$($crate::AlgebraicValue::from($elems)),*].into()
        }
    }
}

impl ProductValue {
    /// Returns a product value constructed from the given values in `elements`.
    pub fn new(elements: &[AlgebraicValue]) -> Self {
        Self { elements: elements.into() }
    }

    /// Returns the number of fields in this product value.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns whether this product value has no fields.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl From<Vec<AlgebraicValue>> for ProductValue {
    fn from(elements: Vec<AlgebraicValue>) -> Self {
        Self {
            elements: elements.into_boxed_slice(),
        }
    }
}

impl FromIterator<AlgebraicValue> for ProductValue {
    fn from_iter<T: IntoIterator<Item = AlgebraicValue>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ProductValue {
    type Item = &'a AlgebraicValue;
    type IntoIter = std::slice::Iter<'a, AlgebraicValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// An error that occurs when a field, of a product value, is accessed that doesn't exist.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("Field {col_pos}({name:?}) not found or has an invalid type")]
pub struct InvalidFieldError {
    /// The claimed col_pos of the field within the product value.
    pub col_pos: usize,
    /// The name of the field, if any.
    pub name: Option<&'static str>,
}

impl ProductValue {
    /// Borrow the value at field of `self` indentified by `index`.
    ///
    /// The `name` is non-functional and is only used for error-messages.
    pub fn get_field(&self, index: usize, name: Option<&'static str>) -> Result<&AlgebraicValue, InvalidFieldError> {
        self.elements.get(index).ok_or(InvalidFieldError { col_pos: index, name })
    }

    /// Borrow the value in the column `col`.
    pub fn get_col(&self, col: ColId) -> Result<&AlgebraicValue, InvalidFieldError> {
        self.get_field(col.idx(), None)
    }

    /// Project the columns `cols` out of `self`.
    ///
    /// A single column projects to the value of that column.
    /// Multiple columns project to an `AlgebraicValue::Product` of their values, in the order given.
    pub fn project(&self, cols: &ColList) -> Result<AlgebraicValue, InvalidFieldError> {
        if cols.is_singleton() {
            return self.get_col(cols.head()).cloned();
        }
        let fields = cols
            .iter()
            .map(|col| self.get_col(col).cloned())
            .collect::<Result<ProductValue, _>>()?;
        Ok(AlgebraicValue::Product(fields))
    }
}
