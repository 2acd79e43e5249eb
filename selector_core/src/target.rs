use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::signature::Signature;
use crate::value::{FromValue, Value};

/// Implemented by types that can be built from bound arguments, usually
/// through `#[derive(Bindable)]`.
pub trait Bindable: Sized {
    /// Display name, used as the candidate name under a selector.
    const NAME: &'static str;

    fn signature() -> Signature;

    fn from_arguments(arguments: &Arguments) -> Result<Self>;
}

/// Arguments by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Reads `name` as `T`. An absent argument reads as `None` for `Option`
    /// types and is a [`Error::MissingArgument`] otherwise.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        match self.values.get(name) {
            Some(value) => T::from_value(value).ok_or_else(|| Error::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                found: value.kind(),
            }),
            None => T::from_absent().ok_or_else(|| Error::MissingArgument(name.to_string())),
        }
    }

    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> Result<T> {
        Ok(self.get::<Option<T>>(name)?.unwrap_or(default))
    }

    /// Reads a value produced by a user-registered converter.
    pub fn get_custom<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))?;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                found: value.kind(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Extend<(String, Value)> for Arguments {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl IntoIterator for Arguments {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

type Build<T> = Arc<dyn Fn(&Arguments) -> Result<T> + Send + Sync>;

/// A named callable together with the signature its flags derive from.
pub struct Target<T> {
    name: String,
    signature: Signature,
    build: Build<T>,
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        Target {
            name: self.name.clone(),
            signature: self.signature.clone(),
            build: self.build.clone(),
        }
    }
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Target<T> {
    pub fn new<F>(name: impl Into<String>, signature: Signature, build: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Target {
            name: name.into(),
            signature,
            build: Arc::new(build),
        }
    }

    /// Adapts the output, e.g. to box a struct as a trait object.
    pub fn map<U, F>(self, f: F) -> Target<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let build = self.build;
        Target {
            name: self.name,
            signature: self.signature,
            build: Arc::new(move |arguments| build(arguments).map(&f)),
        }
    }

    /// Same target under another display name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T: Bindable + 'static> Target<T> {
    pub fn of() -> Self {
        Target::new(T::NAME, T::signature(), T::from_arguments)
    }
}

impl<T> Target<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn call(&self, arguments: &Arguments) -> Result<T> {
        (self.build)(arguments)
    }
}

/// A target with the arguments supplied on the command line bound to it.
pub struct Partial<T> {
    target: Target<T>,
    bound: Arguments,
}

impl<T> Clone for Partial<T> {
    fn clone(&self) -> Self {
        Partial {
            target: self.target.clone(),
            bound: self.bound.clone(),
        }
    }
}

impl<T> fmt::Debug for Partial<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("target", &self.target.name)
            .field("bound", &self.bound)
            .finish()
    }
}

impl<T> Partial<T> {
    pub fn new(target: Target<T>, bound: Arguments) -> Self {
        Partial { target, bound }
    }

    pub fn call(&self) -> Result<T> {
        self.target.call(&self.bound)
    }

    /// Calls with the remaining arguments; `extra` overrides bound values.
    pub fn call_with(&self, extra: Arguments) -> Result<T> {
        let mut arguments = self.bound.clone();
        arguments.extend(extra);
        self.target.call(&arguments)
    }

    pub fn arguments(&self) -> &Arguments {
        &self.bound
    }

    pub fn target(&self) -> &Target<T> {
        &self.target
    }

    pub fn name(&self) -> &str {
        self.target.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Target<i64> {
        Target::new("f", Signature::new().param::<i64>("value"), |args| {
            args.get::<i64>("value")
        })
    }

    #[test]
    fn test_get_reports_missing_and_mismatched_arguments() {
        let arguments = Arguments::new().with("value", Value::Str("one".into()));
        assert!(matches!(
            arguments.get::<i64>("value"),
            Err(Error::TypeMismatch { found: "a string", .. })
        ));
        assert!(matches!(
            arguments.get::<i64>("other"),
            Err(Error::MissingArgument(name)) if name == "other"
        ));
        assert_eq!(arguments.get::<Option<i64>>("other").unwrap(), None);
        assert_eq!(arguments.get_or::<i64>("other", 3).unwrap(), 3);
    }

    #[test]
    fn test_get_custom() {
        let arguments = Arguments::new().with("addr", Value::custom(std::net::Ipv4Addr::LOCALHOST));
        assert_eq!(
            arguments.get_custom::<std::net::Ipv4Addr>("addr").unwrap(),
            std::net::Ipv4Addr::LOCALHOST
        );
        assert!(arguments.get_custom::<String>("addr").is_err());
        assert!(arguments.get_custom::<String>("missing").is_err());
    }

    #[test]
    fn test_partial_call_uses_bound_arguments() {
        let partial = Partial::new(identity(), Arguments::new().with("value", Value::Int(1)));
        assert_eq!(partial.call().unwrap(), 1);
        assert_eq!(partial.name(), "f");
    }

    #[test]
    fn test_partial_awaits_remaining_arguments() {
        let partial = Partial::new(identity(), Arguments::new());
        assert!(matches!(partial.call(), Err(Error::MissingArgument(_))));
        let extra = Arguments::new().with("value", Value::Int(7));
        assert_eq!(partial.call_with(extra).unwrap(), 7);
    }

    #[test]
    fn test_call_time_arguments_override_bound_ones() {
        let partial = Partial::new(identity(), Arguments::new().with("value", Value::Int(1)));
        let extra = Arguments::new().with("value", Value::Int(2));
        assert_eq!(partial.call_with(extra).unwrap(), 2);
        assert_eq!(partial.arguments().get::<i64>("value").unwrap(), 1);
    }

    #[test]
    fn test_map_keeps_name_and_signature() {
        let doubled = identity().map(|v| v * 2);
        assert_eq!(doubled.name(), "f");
        assert_eq!(doubled.signature().len(), 1);
        let arguments = Arguments::new().with("value", Value::Int(4));
        assert_eq!(doubled.call(&arguments).unwrap(), 8);
    }
}
