//! SATN, the human readable text rendering of values used in logs and error messages.
use crate::{AlgebraicValue, ProductValue};
use itertools::Itertools;
use std::fmt;

/// A value that can be rendered in the SATN text format.
pub trait Satn {
    /// Formats the value using the SATN data format into the formatter `f`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result;

    /// Formats the value using the SATN data format into the returned `String`.
    fn to_satn(&self) -> String {
        Wrapper(self).to_string()
    }
}

/// A wrapper around a `T: Satn`
/// providing a `Display` implementation that uses the SATN formatting for `T`.
pub struct Wrapper<'a, T: ?Sized>(pub &'a T);

impl<T: Satn + ?Sized> fmt::Display for Wrapper<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Satn::fmt(self.0, f)
    }
}

impl Satn for AlgebraicValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "0x{}", v.iter().map(|b| format!("{b:02x}")).join("")),
            Self::Product(pv) => Satn::fmt(pv, f),
        }
    }
}

impl Satn for ProductValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.elements.iter().map(Wrapper).format(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product;

    #[test]
    fn renders_rows() {
        let row = product![1i64, "it's", None::<u32>, vec![0xcau8, 0xfe], true];
        assert_eq!(row.to_satn(), r#"(1, "it's", null, 0xcafe, true)"#);
    }

    #[test]
    fn renders_multi_column_keys_as_tuples() {
        let key = AlgebraicValue::Product(product![1u32, "a"]);
        assert_eq!(key.to_satn(), r#"(1, "a")"#);
    }
}
