use crate::{AlgebraicType, ProductValue};
use enum_as_inner::EnumAsInner;

/// A value stored in a column, or an index key built from one or more columns.
///
/// The derived `Ord` is the order used by B-tree indexes.
/// Values of different variants order by variant first, which never matters in practice
/// since an index only ever holds keys of a single type.
#[derive(EnumAsInner, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AlgebraicValue {
    /// The absence of a value in a nullable column.
    Null,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    String(Box<str>),
    Bytes(Box<[u8]>),
    /// A key projected out of multiple columns.
    ///
    /// Never stored in a column; see [`ProductValue::project`].
    Product(ProductValue),
}

impl AlgebraicValue {
    /// Returns the type of this value,
    /// or `None` for `Null` and for projected multi-column keys, which have no column type.
    pub fn type_of(&self) -> Option<AlgebraicType> {
        Some(match self {
            Self::Null | Self::Product(_) => return None,
            Self::Bool(_) => AlgebraicType::Bool,
            Self::I8(_) => AlgebraicType::I8,
            Self::U8(_) => AlgebraicType::U8,
            Self::I16(_) => AlgebraicType::I16,
            Self::U16(_) => AlgebraicType::U16,
            Self::I32(_) => AlgebraicType::I32,
            Self::U32(_) => AlgebraicType::U32,
            Self::I64(_) => AlgebraicType::I64,
            Self::U64(_) => AlgebraicType::U64,
            Self::String(_) => AlgebraicType::String,
            Self::Bytes(_) => AlgebraicType::Bytes,
        })
    }

    /// Returns whether `self` is `Null` or, for a multi-column key, contains a `Null` component.
    pub fn has_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Product(pv) => pv.elements.iter().any(Self::has_null),
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AlgebraicValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    Box<str> => String,
    &str => String,
    String => String,
    Box<[u8]> => Bytes,
    &[u8] => Bytes,
    Vec<u8> => Bytes,
    ProductValue => Product,
}

impl<T: Into<AlgebraicValue>> From<Option<T>> for AlgebraicValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product;

    #[test]
    fn option_maps_to_null() {
        assert_eq!(AlgebraicValue::from(None::<i64>), AlgebraicValue::Null);
        assert_eq!(AlgebraicValue::from(Some(7i64)), AlgebraicValue::I64(7));
    }

    #[test]
    fn has_null_looks_into_products() {
        assert!(AlgebraicValue::Null.has_null());
        assert!(!AlgebraicValue::U32(1).has_null());
        assert!(AlgebraicValue::Product(product![1u32, None::<u32>]).has_null());
        assert!(!AlgebraicValue::Product(product![1u32, 2u32]).has_null());
    }

    #[test]
    fn type_of() {
        assert_eq!(AlgebraicValue::from("a").type_of(), Some(AlgebraicType::String));
        assert_eq!(AlgebraicValue::I64(0).type_of(), Some(AlgebraicType::I64));
        assert_eq!(AlgebraicValue::Null.type_of(), None);
    }
}
