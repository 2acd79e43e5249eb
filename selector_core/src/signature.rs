use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::value::Annotation;

/// Parameter names that belong to the implementation and never become flags.
pub const EXCLUDED_PARAMETERS: [&str; 3] = ["self", "cls", "device"];

/// One declared parameter of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Declared type as Rust type text; `None` when the declaration has none
    pub hint: Option<String>,
    /// Default as text, converted like user input
    pub default: Option<String>,
    pub doc: Option<String>,
    pub env: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            hint: Some(hint.into()),
            default: None,
            doc: None,
            env: None,
        }
    }

    /// A parameter declared without any type hint.
    pub fn untyped(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            hint: None,
            default: None,
            doc: None,
            env: None,
        }
    }

    pub fn typed<T: Annotation>(name: impl Into<String>) -> Self {
        Self::new(name, T::type_hint())
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }
}

/// The ordered, name-unique parameter list of a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter typed by `T`.
    pub fn param<T: Annotation>(self, name: impl Into<String>) -> Self {
        self.with(Parameter::typed::<T>(name))
    }

    pub fn with(mut self, parameter: Parameter) -> Self {
        self.push(parameter);
        self
    }

    /// Adds `parameter`, replacing an earlier one of the same name in place.
    pub fn push(&mut self, parameter: Parameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    /// Merges `layers` from the most basic to the most derived. A name
    /// declared by several layers keeps the most derived declaration, at the
    /// position where it first appeared.
    pub fn layered(layers: impl IntoIterator<Item = Signature>) -> Self {
        let mut merged = Signature::new();
        for layer in layers {
            for parameter in layer.parameters {
                merged.push(parameter);
            }
        }
        merged
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The parameters that become flags.
    pub fn declarable(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| !EXCLUDED_PARAMETERS.contains(&p.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reads one table per parameter, in file order:
    ///
    /// ```toml
    /// lr = { type = "f64", default = "0.01", doc = "learning rate", env = "LR" }
    /// milestones = { type = "Vec<u32>", default = [30, 60] }
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let mut signature = Signature::new();
        for (name, value) in table {
            if !value.is_table() {
                tracing::warn!(parameter = %name, "skipping non-table signature entry");
                continue;
            }
            let entry = value.try_into::<ParameterEntry>()?;
            let default = entry
                .default
                .map(|d| default_text(&name, d))
                .transpose()?;
            signature.push(Parameter {
                name,
                hint: entry.hint,
                default,
                doc: entry.doc,
                env: entry.env,
            });
        }
        Ok(signature)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterEntry {
    #[serde(rename = "type")]
    hint: Option<String>,
    default: Option<toml::Value>,
    doc: Option<String>,
    env: Option<String>,
}

/// Defaults are kept as text; arrays join with commas for list flags.
fn default_text(name: &str, value: toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Array(items) => {
            let items = items
                .into_iter()
                .map(|item| default_text(name, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(items.join(","))
        }
        other => Err(Error::InvalidSignature {
            name: name.to_string(),
            reason: format!("unsupported default {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn names(signature: &Signature) -> Vec<&str> {
        signature.parameters().iter().map(|p| p.name.as_str()).collect()
    }

    fn create_temp_toml(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("signature.toml");
        fs::write(&file_path, content).unwrap();
        (temp_dir, file_path)
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let signature = Signature::new()
            .param::<f64>("lr")
            .param::<Option<u32>>("steps")
            .with(Parameter::untyped("seed"));
        assert_eq!(names(&signature), ["lr", "steps", "seed"]);
        assert_eq!(signature.get("steps").unwrap().hint.as_deref(), Some("Option<u32>"));
        assert_eq!(signature.get("seed").unwrap().hint, None);
    }

    #[test]
    fn test_layered_most_derived_wins() {
        let base = Signature::new()
            .with(Parameter::new("lr", "f64").with_default("0.1"))
            .param::<bool>("nesterov");
        let derived = Signature::new()
            .param::<f64>("momentum")
            .with(Parameter::new("lr", "f32").with_default("0.01"));

        let merged = Signature::layered([base, derived]);

        assert_eq!(names(&merged), ["lr", "nesterov", "momentum"]);
        let lr = merged.get("lr").unwrap();
        assert_eq!(lr.hint.as_deref(), Some("f32"));
        assert_eq!(lr.default.as_deref(), Some("0.01"));
    }

    #[test]
    fn test_declarable_excludes_implementation_names() {
        let signature = Signature::new()
            .param::<String>("self")
            .param::<f64>("lr")
            .param::<String>("device")
            .param::<String>("cls");
        let declarable: Vec<_> = signature.declarable().map(|p| p.name.as_str()).collect();
        assert_eq!(declarable, ["lr"]);
        assert_eq!(signature.len(), 4);
    }

    #[test]
    fn test_from_toml_str() {
        let signature = Signature::from_toml_str(
            r#"
lr = { type = "f64", default = "0.01", doc = "learning rate", env = "LR" }
milestones = { type = "Vec<u32>", default = [30, 60] }
warmup = { type = "Option<u32>", default = 5 }
seed = { doc = "no type given" }
"#,
        )
        .unwrap();

        assert_eq!(names(&signature), ["lr", "milestones", "warmup", "seed"]);
        let lr = signature.get("lr").unwrap();
        assert_eq!(lr.hint.as_deref(), Some("f64"));
        assert_eq!(lr.default.as_deref(), Some("0.01"));
        assert_eq!(lr.doc.as_deref(), Some("learning rate"));
        assert_eq!(lr.env.as_deref(), Some("LR"));
        assert_eq!(signature.get("milestones").unwrap().default.as_deref(), Some("30,60"));
        assert_eq!(signature.get("warmup").unwrap().default.as_deref(), Some("5"));
        assert_eq!(signature.get("seed").unwrap().hint, None);
    }

    #[test]
    fn test_from_toml_str_skips_non_tables() {
        let signature = Signature::from_toml_str(
            r#"
title = "not a parameter"
lr = { type = "f64" }
"#,
        )
        .unwrap();
        assert_eq!(names(&signature), ["lr"]);
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_keys() {
        let result = Signature::from_toml_str(r#"lr = { type = "f64", short = "l" }"#);
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_from_toml_str_rejects_nested_defaults() {
        let result = Signature::from_toml_str(r#"lr = { type = "f64", default = { a = 1 } }"#);
        assert!(matches!(result, Err(Error::InvalidSignature { name, .. }) if name == "lr"));
    }

    #[test]
    fn test_from_file() {
        let (_temp_dir, file_path) = create_temp_toml(
            r#"
lr = { type = "f64", default = "0.01" }
momentum = { type = "f64", default = "0.9" }
"#,
        );
        let signature = Signature::from_file(&file_path).unwrap();
        assert_eq!(names(&signature), ["lr", "momentum"]);
    }

    #[test]
    fn test_from_file_unsupported_format() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("signature.yaml");
        fs::write(&file_path, "lr: 0.1").unwrap();

        let err = Signature::from_file(&file_path).unwrap_err();
        assert!(err.to_string().contains("unsupported signature file format"));
    }

    #[test]
    fn test_from_file_nonexistent() {
        let result = Signature::from_file(Path::new("nonexistent.toml"));
        assert!(matches!(result, Err(Error::Read { .. })));
    }
}
