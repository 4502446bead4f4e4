use crate::{AlgebraicType, AlgebraicValue, ProductValue};

/// A column of a [`ProductType`].
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProductTypeElement {
    pub name: Option<Box<str>>,
    pub algebraic_type: AlgebraicType,
    /// Whether the column admits `AlgebraicValue::Null`.
    pub nullable: bool,
}

impl ProductTypeElement {
    pub fn new(algebraic_type: AlgebraicType, name: Option<Box<str>>) -> Self {
        Self {
            algebraic_type,
            name,
            nullable: false,
        }
    }

    pub fn new_named(algebraic_type: AlgebraicType, name: impl Into<Box<str>>) -> Self {
        Self::new(algebraic_type, Some(name.into()))
    }

    /// Marks the column as admitting `NULL`.
    pub fn nullable(self) -> Self {
        Self { nullable: true, ..self }
    }

    /// Returns whether `value` may be stored in this column.
    pub fn admits(&self, value: &AlgebraicValue) -> bool {
        match value.type_of() {
            Some(ty) => ty == self.algebraic_type,
            None => self.nullable && value.is_null(),
        }
    }
}

/// The row type of a relation: an ordered list of typed, possibly named, columns.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProductType {
    /// The factors of the product type.
    pub elements: Box<[ProductTypeElement]>,
}

impl ProductType {
    /// Returns a product type with the given `elements` as its factors.
    pub fn new(elements: Box<[ProductTypeElement]>) -> Self {
        Self { elements }
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns whether `row` is a value of this type,
    /// i.e., has one admissible value per column.
    pub fn is_instance(&self, row: &ProductValue) -> bool {
        self.len() == row.len() && self.elements.iter().zip(row).all(|(elem, value)| elem.admits(value))
    }

    /// Returns whether `self` and `other` describe the same values, ignoring column names.
    pub fn is_structurally_equal(&self, other: &ProductType) -> bool {
        self.len() == other.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| a.algebraic_type == b.algebraic_type && a.nullable == b.nullable)
    }
}

impl FromIterator<ProductTypeElement> for ProductType {
    fn from_iter<T: IntoIterator<Item = ProductTypeElement>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, const N: usize> From<[(&'a str, AlgebraicType); N]> for ProductType {
    /// Returns a product type of non-nullable named columns.
    fn from(fields: [(&'a str, AlgebraicType); N]) -> Self {
        fields
            .into_iter()
            .map(|(name, ty)| ProductTypeElement::new_named(ty, name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product;

    fn id_name() -> ProductType {
        [
            ProductTypeElement::new_named(AlgebraicType::I64, "id"),
            ProductTypeElement::new_named(AlgebraicType::String, "name").nullable(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn instance_check() {
        let ty = id_name();
        assert!(ty.is_instance(&product![1i64, "a"]));
        assert!(ty.is_instance(&product![1i64, None::<&str>]));
        assert!(!ty.is_instance(&product![None::<i64>, "a"]));
        assert!(!ty.is_instance(&product![1u32, "a"]));
        assert!(!ty.is_instance(&product![1i64]));
    }

    #[test]
    fn structural_equality_ignores_names() {
        let renamed: ProductType = [
            ProductTypeElement::new_named(AlgebraicType::I64, "key"),
            ProductTypeElement::new_named(AlgebraicType::String, "value").nullable(),
        ]
        .into_iter()
        .collect();
        assert!(id_name().is_structurally_equal(&renamed));
        assert!(!id_name().is_structurally_equal(&ProductType::from([("id", AlgebraicType::I64)])));
    }
}
