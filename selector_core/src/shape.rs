//! Classification of declared type hints into the four flag shapes.
//!
//! Hints are Rust type text as written in a struct field, a signature file or
//! a builder call. Whitespace is not significant, so the token stream of
//! `Option < Vec < u8 > >` classifies the same way as `Option<Vec<u8>>`.

use thiserror::Error;

const OPTION_PATHS: [&str; 3] = ["Option", "std::option::Option", "core::option::Option"];
const VEC_PATHS: [&str; 3] = ["Vec", "std::vec::Vec", "alloc::vec::Vec"];

/// How a declared type maps onto a flag: the element type plus whether the
/// value may be absent and whether the flag repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Plain(String),
    Optional(String),
    List(String),
    OptionalList(String),
}

impl TypeShape {
    /// The scalar type a single occurrence of the flag converts into.
    pub fn element(&self) -> &str {
        match self {
            TypeShape::Plain(t)
            | TypeShape::Optional(t)
            | TypeShape::List(t)
            | TypeShape::OptionalList(t) => t,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeShape::Optional(_) | TypeShape::OptionalList(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeShape::List(_) | TypeShape::OptionalList(_))
    }
}

/// The hint was absent, or named a container without its element type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type hint seems to be missing (declared as {})", .hint.as_deref().unwrap_or("nothing"))]
pub struct MissingTypeHint {
    pub hint: Option<String>,
}

pub fn classify(hint: Option<&str>) -> Result<TypeShape, MissingTypeHint> {
    let missing = || MissingTypeHint {
        hint: hint.map(String::from),
    };
    let text = normalize(hint.ok_or_else(missing)?);

    let (optional, rest) = match unwrap_generic(&text, &OPTION_PATHS) {
        Some(inner) => (true, inner),
        None => (false, text.as_str()),
    };
    let (list, element) = match list_element(rest) {
        Some(inner) => (true, inner),
        None => (false, rest),
    };
    if element.is_empty() {
        return Err(missing());
    }

    let element = element.to_string();
    Ok(match (optional, list) {
        (false, false) => TypeShape::Plain(element),
        (true, false) => TypeShape::Optional(element),
        (false, true) => TypeShape::List(element),
        (true, true) => TypeShape::OptionalList(element),
    })
}

/// Drops whitespace and the quotes of a hint written as a string literal.
pub(crate) fn normalize(hint: &str) -> String {
    let compact: String = hint.chars().filter(|c| !c.is_whitespace()).collect();
    for quote in ['"', '\''] {
        if let Some(inner) = compact
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    compact
}

/// Returns the generic argument of `text` when its head is one of `paths`.
/// A bare container (`Vec`) yields an empty argument.
fn unwrap_generic<'a>(text: &'a str, paths: &[&str]) -> Option<&'a str> {
    let text = text.strip_prefix("::").unwrap_or(text);
    paths.iter().find_map(|path| {
        let rest = text.strip_prefix(path)?;
        if rest.is_empty() {
            return Some(rest);
        }
        rest.strip_prefix('<')?.strip_suffix('>')
    })
}

fn list_element(text: &str) -> Option<&str> {
    unwrap_generic(text, &VEC_PATHS).or_else(|| text.strip_prefix('[')?.strip_suffix(']'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_types() {
        assert_eq!(classify(Some("i64")), Ok(TypeShape::Plain("i64".into())));
        assert_eq!(
            classify(Some("std::path::PathBuf")),
            Ok(TypeShape::Plain("std::path::PathBuf".into()))
        );
        // Heads that merely start like a container stay plain
        assert_eq!(
            classify(Some("VecDeque<u8>")),
            Ok(TypeShape::Plain("VecDeque<u8>".into()))
        );
    }

    #[test]
    fn test_optional_spellings() {
        let expected = Ok(TypeShape::Optional("i64".into()));
        assert_eq!(classify(Some("Option<i64>")), expected);
        assert_eq!(classify(Some("std::option::Option<i64>")), expected);
        assert_eq!(classify(Some("::core::option::Option<i64>")), expected);
        assert_eq!(classify(Some("Option < i64 >")), expected);
    }

    #[test]
    fn test_list_shapes() {
        assert_eq!(classify(Some("Vec<String>")), Ok(TypeShape::List("String".into())));
        assert_eq!(classify(Some("[f64]")), Ok(TypeShape::List("f64".into())));
        assert_eq!(
            classify(Some("Option<Vec<bool>>")),
            Ok(TypeShape::OptionalList("bool".into()))
        );
        assert_eq!(
            classify(Some("Option<std::vec::Vec<u8>>")),
            Ok(TypeShape::OptionalList("u8".into()))
        );
    }

    #[test]
    fn test_quoted_hint_matches_bare_hint() {
        assert_eq!(classify(Some("'i64'")), classify(Some("i64")));
        assert_eq!(classify(Some("\"Option<u8>\"")), classify(Some("Option<u8>")));
    }

    #[test]
    fn test_missing_hints() {
        for hint in [None, Some(""), Some("Vec"), Some("Vec<>"), Some("Option"), Some("[]")] {
            let err = classify(hint).unwrap_err();
            assert_eq!(err.hint.as_deref(), hint);
        }
    }

    #[test]
    fn test_shape_accessors() {
        let shape = TypeShape::OptionalList("u8".into());
        assert_eq!(shape.element(), "u8");
        assert!(shape.is_optional());
        assert!(shape.is_list());
        assert!(!TypeShape::Plain("u8".into()).is_list());
    }
}
