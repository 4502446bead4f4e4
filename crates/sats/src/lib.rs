pub mod algebraic_type;
pub mod algebraic_value;
pub mod product_type;
pub mod product_value;
pub mod satn;
pub mod size_of;

pub use algebraic_type::AlgebraicType;
pub use algebraic_value::AlgebraicValue;
pub use product_type::{ProductType, ProductTypeElement};
pub use product_value::{InvalidFieldError, ProductValue};

/// Asserts at compile time that `$ty` is exactly `$size` bytes large.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::core::mem::size_of::<$ty>()];
    };
}
