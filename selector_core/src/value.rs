use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A converted flag value, as held by bound arguments.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
    /// A value produced by a user-registered converter
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(inner) => inner.downcast_ref(),
            _ => None,
        }
    }

    /// Short name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "a bool",
            Value::Int(_) => "a signed integer",
            Value::UInt(_) => "an unsigned integer",
            Value::Float(_) => "a float",
            Value::Char(_) => "a char",
            Value::Str(_) => "a string",
            Value::Path(_) => "a path",
            Value::List(_) => "a list",
            Value::Custom(_) => "a custom value",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Path(v) => f.debug_tuple("Path").field(v).finish(),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Reads a typed Rust value out of a bound [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;

    /// What an argument that was never bound reads as; `None` makes the read
    /// fail with a missing-argument error.
    fn from_absent() -> Option<Self> {
        None
    }
}

/// Maps a Rust type to the type hint its flag is registered with.
pub trait Annotation {
    fn type_hint() -> String;
}

macro_rules! native {
    ($($ty:ty => $hint:literal),* $(,)?) => {
        $(
            impl Annotation for $ty {
                fn type_hint() -> String {
                    $hint.to_string()
                }
            }
        )*
    };
}

native!(
    bool => "bool",
    i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64", isize => "isize",
    u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64", usize => "usize",
    f32 => "f32", f64 => "f64",
    char => "char", String => "String", PathBuf => "PathBuf",
);

impl<T: Annotation> Annotation for Option<T> {
    fn type_hint() -> String {
        format!("Option<{}>", T::type_hint())
    }
}

impl<T: Annotation> Annotation for Vec<T> {
    fn type_hint() -> String {
        format!("Vec<{}>", T::type_hint())
    }
}

macro_rules! integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(v) => (*v).try_into().ok(),
                        Value::UInt(v) => (*v).try_into().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            Value::Path(v) => v.to_str().map(String::from),
            _ => None,
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(v) => Some(v.clone()),
            Value::Str(v) => Some(PathBuf::from(v)),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }

    fn from_absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// Implements [`FromValue`] and [`Annotation`] for types whose values come
/// from a converter registered with
/// [`Converters::register_parse`](crate::Converters::register_parse).
///
/// ```
/// #[derive(Clone, Debug)]
/// struct Level(u8);
///
/// impl std::str::FromStr for Level {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Level)
///     }
/// }
///
/// selector_core::custom_value!(Level);
/// ```
#[macro_export]
macro_rules! custom_value {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $crate::FromValue for $ty {
                fn from_value(value: &$crate::Value) -> Option<Self> {
                    value.downcast_ref::<$ty>().cloned()
                }
            }

            impl $crate::Annotation for $ty {
                fn type_hint() -> String {
                    stringify!($ty).to_string()
                }
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_reads_check_range() {
        assert_eq!(u8::from_value(&Value::Int(200)), Some(200));
        assert_eq!(u8::from_value(&Value::Int(-1)), None);
        assert_eq!(i64::from_value(&Value::UInt(7)), Some(7));
        assert_eq!(i64::from_value(&Value::Str("7".into())), None);
    }

    #[test]
    fn test_option_and_vec_reads() {
        assert_eq!(<Option<i64>>::from_absent(), Some(None));
        assert_eq!(<i64>::from_absent(), None);
        let list = Value::List(vec![Value::Bool(true), Value::Bool(false)]);
        assert_eq!(<Vec<bool>>::from_value(&list), Some(vec![true, false]));
        assert_eq!(<Vec<bool>>::from_value(&Value::Bool(true)), None);
    }

    #[test]
    fn test_custom_values() {
        let value = Value::custom(42u128);
        assert_eq!(value.downcast_ref::<u128>(), Some(&42));
        assert_eq!(value.downcast_ref::<u64>(), None);
        assert_eq!(value, value.clone());
        assert_ne!(value, Value::custom(42u128));
        assert_eq!(format!("{value:?}"), "Custom(..)");
    }

    #[test]
    fn test_type_hints() {
        assert_eq!(<Option<Vec<PathBuf>>>::type_hint(), "Option<Vec<PathBuf>>");
        assert_eq!(f32::type_hint(), "f32");
    }
}
