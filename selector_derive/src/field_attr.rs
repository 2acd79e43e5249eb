use syn::{Attribute, Expr, Lit, LitStr, Token};

#[derive(Debug, Default)]
pub(crate) enum FieldDefault {
    #[default]
    None,
    /// `#[bindable(default)]`: `Default::default()` when the flag is unset
    Trait,
    /// `#[bindable(default = "...")]`: registered as the flag's default text
    Text(String),
}

#[derive(Debug, Default)]
pub(crate) struct FieldAttr {
    pub long: Option<String>,
    pub default: FieldDefault,
    pub env: Option<String>,
    pub skip: bool,
    pub flatten: bool,
}

impl FieldAttr {
    pub(crate) fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = FieldAttr::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("bindable")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("long") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.long = Some(lit.value());
                } else if meta.path.is_ident("default") {
                    parsed.default = if meta.input.peek(Token![=]) {
                        let lit: Lit = meta.value()?.parse()?;
                        FieldDefault::Text(literal_text(&lit)?)
                    } else {
                        FieldDefault::Trait
                    };
                } else if meta.path.is_ident("env") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.env = Some(lit.value());
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("flatten") {
                    parsed.flatten = true;
                } else {
                    return Err(meta.error("unknown parameter"));
                }
                Ok(())
            })?;
        }

        if parsed.flatten
            && (parsed.skip
                || parsed.long.is_some()
                || parsed.env.is_some()
                || !matches!(parsed.default, FieldDefault::None))
        {
            let attr = attrs.iter().find(|a| a.path().is_ident("bindable"));
            return Err(syn::Error::new_spanned(
                attr,
                "`flatten` cannot be combined with other parameters",
            ));
        }
        Ok(parsed)
    }
}

/// `#[bindable(name = "...")]` on the struct itself.
pub(crate) fn struct_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("bindable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown parameter"))
            }
        })?;
    }
    Ok(name)
}

fn literal_text(lit: &Lit) -> syn::Result<String> {
    match lit {
        Lit::Str(s) => Ok(s.value()),
        Lit::Int(i) => Ok(i.base10_digits().to_string()),
        Lit::Float(f) => Ok(f.base10_digits().to_string()),
        Lit::Bool(b) => Ok(b.value.to_string()),
        Lit::Char(c) => Ok(c.value().to_string()),
        other => Err(syn::Error::new_spanned(other, "unsupported default value")),
    }
}

/// Joins the field's doc comment lines into one help string.
pub(crate) fn docs(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut lines = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("doc")) {
        let value = &attr.meta.require_name_value()?.value;
        match value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(s) => lines.push(s.value().trim().to_string()),
                _ => return Err(syn::Error::new_spanned(value, "malformed #[doc] attribute")),
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    value,
                    "macro #[doc] attributes aren't supported",
                ));
            }
        }
    }
    let joined = lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok((!joined.is_empty()).then_some(joined))
}
