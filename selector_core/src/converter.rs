use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::value::Value;

/// Turns the raw text of one flag occurrence into a [`Value`].
pub type Converter = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// Converters keyed by element type name.
///
/// Types without a registered converter fall back to constructing the type
/// from its text (`FromStr`) when it is one of the native scalars. `bool` is
/// registered up front because its `FromStr` only takes lowercase literals.
#[derive(Clone)]
pub struct Converters {
    registered: HashMap<String, Converter>,
}

impl Default for Converters {
    fn default() -> Self {
        let mut converters = Converters {
            registered: HashMap::new(),
        };
        converters.register("bool", |text| to_bool(text).map(Value::Bool));
        converters
    }
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, type_name: impl Into<String>, converter: F)
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.registered.insert(type_name.into(), Arc::new(converter));
    }

    /// Registers `T`'s `FromStr` as the converter for `type_name`, producing
    /// [`Value::Custom`] values.
    pub fn register_parse<T>(&mut self, type_name: impl Into<String>)
    where
        T: FromStr + Send + Sync + 'static,
        T::Err: Display,
    {
        self.register(type_name, |text| {
            text.parse::<T>()
                .map(Value::custom)
                .map_err(|e| e.to_string())
        });
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.registered.contains_key(type_name)
    }

    pub fn resolve(&self, type_name: &str) -> Converter {
        if let Some(converter) = self.registered.get(type_name) {
            return converter.clone();
        }
        let last_segment = type_name.rsplit("::").next().unwrap_or(type_name);
        if let Some(converter) = self.registered.get(last_segment) {
            return converter.clone();
        }
        construct(last_segment).unwrap_or_else(|| {
            let type_name = type_name.to_string();
            Arc::new(move |_: &str| -> Result<Value, String> {
                Err(format!("no converter registered for type '{type_name}'"))
            })
        })
    }
}

/// Case-insensitive `true`/`false`; anything else is rejected.
pub fn to_bool(text: &str) -> Result<bool, String> {
    match text.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("Invalid bool value: '{text}'")),
    }
}

fn parse_with<T, F>(wrap: F) -> Converter
where
    T: FromStr,
    T::Err: Display,
    F: Fn(T) -> Value + Send + Sync + 'static,
{
    Arc::new(move |text: &str| text.parse::<T>().map(&wrap).map_err(|e| e.to_string()))
}

fn construct(type_name: &str) -> Option<Converter> {
    let converter = match type_name {
        "i8" => parse_with(|v: i8| Value::Int(v.into())),
        "i16" => parse_with(|v: i16| Value::Int(v.into())),
        "i32" => parse_with(|v: i32| Value::Int(v.into())),
        "i64" | "isize" => parse_with(Value::Int),
        "u8" => parse_with(|v: u8| Value::UInt(v.into())),
        "u16" => parse_with(|v: u16| Value::UInt(v.into())),
        "u32" => parse_with(|v: u32| Value::UInt(v.into())),
        "u64" | "usize" => parse_with(Value::UInt),
        "f32" => parse_with(|v: f32| Value::Float(v.into())),
        "f64" => parse_with(Value::Float),
        "char" => parse_with(Value::Char),
        "String" | "OsString" => parse_with(Value::Str),
        "PathBuf" => parse_with(Value::Path),
        _ => return None,
    };
    Some(converter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bool_literals() {
        let converters = Converters::default();
        let convert = converters.resolve("bool");
        for (text, expected) in [
            ("true", true),
            ("True", true),
            ("TRUE", true),
            ("false", false),
            ("False", false),
            ("FALSE", false),
        ] {
            assert_eq!(convert(text), Ok(Value::Bool(expected)));
        }
        let err = convert("yes").unwrap_err();
        assert!(err.contains("Invalid bool value"));
        assert!(err.contains("yes"));
    }

    #[test]
    fn test_native_types_construct_from_text() {
        let converters = Converters::new();
        assert_eq!(converters.resolve("i64")("-3"), Ok(Value::Int(-3)));
        assert_eq!(converters.resolve("u16")("8080"), Ok(Value::UInt(8080)));
        assert_eq!(converters.resolve("f64")("0.5"), Ok(Value::Float(0.5)));
        assert_eq!(converters.resolve("char")("x"), Ok(Value::Char('x')));
        assert_eq!(
            converters.resolve("std::path::PathBuf")("/tmp"),
            Ok(Value::Path(PathBuf::from("/tmp")))
        );
        assert!(converters.resolve("u8")("256").is_err());
        assert!(converters.resolve("i32")("one").is_err());
    }

    #[test]
    fn test_unknown_type_fails_only_when_used() {
        let converters = Converters::new();
        let convert = converters.resolve("Level");
        let err = convert("debug").unwrap_err();
        assert!(err.contains("Level"));
    }

    #[test]
    fn test_registered_converter_wins() {
        let mut converters = Converters::new();
        converters.register("i64", |text| {
            text.trim_start_matches('+')
                .parse()
                .map(Value::Int)
                .map_err(|_| "not a number".to_string())
        });
        assert_eq!(converters.resolve("i64")("+5"), Ok(Value::Int(5)));
        assert!(converters.contains("i64"));
    }

    #[test]
    fn test_register_parse_produces_custom_values() {
        let mut converters = Converters::new();
        converters.register_parse::<std::net::Ipv4Addr>("Ipv4Addr");
        let value = converters.resolve("std::net::Ipv4Addr")("127.0.0.1").unwrap();
        assert_eq!(
            value.downcast_ref::<std::net::Ipv4Addr>(),
            Some(&std::net::Ipv4Addr::LOCALHOST)
        );
    }
}
