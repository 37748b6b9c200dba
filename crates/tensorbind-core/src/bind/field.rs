use super::error::BindError;
use crate::tensor::{Depth, Element, TensorValue, ValueKind, ValueShape};

/// Rust type a decoded output can be bound to.
///
/// Implemented for every element type `T` as `T`, `Vec<T>` and
/// `Vec<Vec<T>>`; nothing else binds.
pub trait TensorField: Sized {
    fn kind() -> ValueKind;

    /// Convert a decoded value, handing it back unchanged when its kind
    /// differs from `Self::kind()`.
    fn from_value(value: TensorValue) -> Result<Self, TensorValue>;
}

macro_rules! impl_tensor_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TensorField for $ty {
                fn kind() -> ValueKind {
                    ValueKind::new(<$ty as Element>::TYPE, Depth::Scalar)
                }

                fn from_value(value: TensorValue) -> Result<Self, TensorValue> {
                    value.into_scalar::<$ty>()
                }
            }

            impl TensorField for Vec<$ty> {
                fn kind() -> ValueKind {
                    ValueKind::new(<$ty as Element>::TYPE, Depth::Vector)
                }

                fn from_value(value: TensorValue) -> Result<Self, TensorValue> {
                    value.into_vec::<$ty>()
                }
            }

            impl TensorField for Vec<Vec<$ty>> {
                fn kind() -> ValueKind {
                    ValueKind::new(<$ty as Element>::TYPE, Depth::Matrix)
                }

                fn from_value(value: TensorValue) -> Result<Self, TensorValue> {
                    value.into_matrix::<$ty>()
                }
            }
        )*
    };
}

impl_tensor_field!(bool, u8, u16, u32, i8, i16, i32, i64, f32, f64, String);

/// Object-safe view of a bindable field, stored in the registry.
pub trait FieldSlot {
    /// Kind a value must have to be assigned.
    fn expected(&self) -> ValueKind;

    /// Compare the kind a decode routine produces against `expected()`.
    fn check(&self, actual: ValueKind) -> Result<(), BindError> {
        let expected = self.expected();
        if expected != actual {
            return Err(BindError::TypeMismatch { expected, actual });
        }
        Ok(())
    }

    fn assign(&mut self, value: TensorValue) -> Result<(), BindError>;
}

impl<T: TensorField> FieldSlot for T {
    fn expected(&self) -> ValueKind {
        T::kind()
    }

    fn assign(&mut self, value: TensorValue) -> Result<(), BindError> {
        self.check(value.kind())?;
        // Same kind handed back means the conversion could not allocate.
        *self = T::from_value(value).map_err(|value| match value.shape() {
            ValueShape::Matrix { rows, .. } => BindError::RowAllocation { rows },
            _ => BindError::TypeMismatch {
                expected: T::kind(),
                actual: value.kind(),
            },
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldSlot, TensorField};
    use crate::bind::error::BindError;
    use crate::tensor::{ShapeStrategy, dispatch};

    #[test]
    fn kinds_match_rust_types() {
        assert_eq!(<f32 as TensorField>::kind().to_string(), "f32");
        assert_eq!(<Vec<bool> as TensorField>::kind().to_string(), "Vec<bool>");
        assert_eq!(
            <Vec<Vec<String>> as TensorField>::kind().to_string(),
            "Vec<Vec<String>>"
        );
    }

    #[test]
    fn assign_writes_matching_value() {
        let routine = dispatch("INT64", ShapeStrategy::Array1D { len: 2 }).unwrap();
        let payload: Vec<u8> = [10i64, -20].iter().flat_map(|v| v.to_le_bytes()).collect();
        let value = routine.decode(&payload).unwrap();

        let mut field: Vec<i64> = Vec::new();
        field.check(routine.kind()).unwrap();
        field.assign(value).unwrap();
        assert_eq!(field, vec![10, -20]);
    }

    #[test]
    fn check_rejects_narrower_element() {
        let routine = dispatch("INT64", ShapeStrategy::Array1D { len: 1 }).unwrap();
        let field: Vec<i32> = Vec::new();
        let err = field.check(routine.kind()).unwrap_err();
        let BindError::TypeMismatch { expected, actual } = err else {
            panic!("expected a type mismatch");
        };
        assert_eq!(expected.to_string(), "Vec<i32>");
        assert_eq!(actual.to_string(), "Vec<i64>");
    }

    #[test]
    fn assign_rejects_other_depth_and_keeps_field() {
        let routine = dispatch("INT32", ShapeStrategy::Scalar).unwrap();
        let value = routine.decode(&[5, 0, 0, 0]).unwrap();

        let mut field: Vec<Vec<i32>> = vec![vec![1]];
        let err = field.assign(value).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert_eq!(field, vec![vec![1]]);
    }
}
