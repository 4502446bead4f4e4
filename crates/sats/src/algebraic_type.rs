use enum_as_inner::EnumAsInner;
use std::fmt;

/// The type of a single column.
///
/// Whether a column may hold `NULL` is not part of the type,
/// but of the column, see [`ProductTypeElement::nullable`](crate::ProductTypeElement).
#[derive(EnumAsInner, Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AlgebraicType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    /// A UTF-8 string.
    String,
    /// An opaque byte string.
    Bytes,
}

impl AlgebraicType {
    /// Returns whether this is one of the integer types.
    pub fn is_integer(&self) -> bool {
        !matches!(self, Self::Bool | Self::String | Self::Bytes)
    }
}

impl fmt::Display for AlgebraicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "Bool",
            Self::I8 => "I8",
            Self::U8 => "U8",
            Self::I16 => "I16",
            Self::U16 => "U16",
            Self::I32 => "I32",
            Self::U32 => "U32",
            Self::I64 => "I64",
            Self::U64 => "U64",
            Self::String => "String",
            Self::Bytes => "Bytes",
        };
        f.write_str(name)
    }
}
