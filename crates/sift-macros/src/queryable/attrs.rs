//! Attribute parsing for the Queryable derive macro.
//!
//! Fields carry `#[sift(...)]` with a field type, `skip`, `rename` or `ty`;
//! the struct itself may carry `#[sift(rename_all = "...")]`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, LitStr, Meta, Result, Token,
};

const TYPE_NAMES: &str = "Text, Integer, Float, Bool, Timestamp, Uuid";

/// The declared type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiftType {
    /// `#[sift(Text)]`
    Text,
    /// `#[sift(Integer)]`
    Integer,
    /// `#[sift(Float)]`
    Float,
    /// `#[sift(Bool)]`
    Bool,
    /// `#[sift(Timestamp)]`
    Timestamp,
    /// `#[sift(Uuid)]`
    Uuid,
}

impl SiftType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Text" | "text" | "String" | "string" => Some(SiftType::Text),
            "Integer" | "integer" | "Int" | "int" => Some(SiftType::Integer),
            "Float" | "float" => Some(SiftType::Float),
            "Bool" | "bool" | "boolean" => Some(SiftType::Bool),
            "Timestamp" | "timestamp" => Some(SiftType::Timestamp),
            "Uuid" | "uuid" => Some(SiftType::Uuid),
            _ => None,
        }
    }

    /// Parses a field type from a bare identifier: `#[sift(Text)]`.
    pub fn from_ident(ident: &Ident) -> Result<Self> {
        let name = ident.to_string();
        SiftType::from_name(&name).ok_or_else(|| {
            Error::new(
                ident.span(),
                format!("unknown field type: '{name}'. Expected one of: {TYPE_NAMES}"),
            )
        })
    }

    /// Parses a field type from a string literal: `#[sift(ty = "bool")]`.
    pub fn from_lit(lit: &LitStr) -> Result<Self> {
        let name = lit.value();
        SiftType::from_name(&name).ok_or_else(|| {
            Error::new(
                lit.span(),
                format!("unknown field type: '{name}'. Expected one of: {TYPE_NAMES}"),
            )
        })
    }
}

/// Field-level attributes from `#[sift(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    pub sift_type: Option<SiftType>,
    pub skip: bool,
    /// Identifier used in requests (default: derived from the field name).
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            sift_type: None,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => attr.skip = true,
                Meta::Path(path) => {
                    let ident = path.get_ident().ok_or_else(|| {
                        Error::new(path.span(), format!("expected {TYPE_NAMES}, or skip"))
                    })?;
                    set_type(&mut attr, SiftType::from_ident(ident)?, ident.span())?;
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(&nv.value, "rename")?.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let lit = string_value(&nv.value, "ty")?;
                    set_type(&mut attr, SiftType::from_lit(lit)?, lit.span())?;
                }
                Meta::NameValue(nv) => {
                    return Err(Error::new(
                        nv.path.span(),
                        "unknown attribute. Expected: rename or ty",
                    ));
                }
                Meta::List(list) => {
                    return Err(Error::new(
                        list.span(),
                        format!(
                            "unknown sift attribute. Expected: {TYPE_NAMES}, skip, rename = \"...\", or ty = \"...\""
                        ),
                    ));
                }
            }
        }

        if attr.skip && (attr.sift_type.is_some() || attr.rename.is_some()) {
            return Err(Error::new(
                attr.span,
                "skip cannot be combined with a field type or rename",
            ));
        }

        Ok(attr)
    }
}

fn set_type(attr: &mut FieldAttr, sift_type: SiftType, span: Span) -> Result<()> {
    if attr.sift_type.is_some() {
        return Err(Error::new(span, "field type given more than once"));
    }
    attr.sift_type = Some(sift_type);
    attr.span = span;
    Ok(())
}

fn string_value<'a>(expr: &'a Expr, name: &str) -> Result<&'a LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        _ => Err(Error::new(
            expr.span(),
            format!("{name} must be a string literal"),
        )),
    }
}

/// Extracts `#[sift(...)]` from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("sift") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

/// Naming convention applied to field identifiers without `rename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameRule {
    /// Keep the Rust field name.
    #[default]
    None,
    /// `created_at` -> `createdAt`
    CamelCase,
    /// `created_at` -> `CreatedAt`
    PascalCase,
    /// `created_at` -> `created-at`
    KebabCase,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "snake_case" => Ok(RenameRule::None),
            "camelCase" => Ok(RenameRule::CamelCase),
            "PascalCase" => Ok(RenameRule::PascalCase),
            "kebab-case" => Ok(RenameRule::KebabCase),
            other => Err(Error::new(
                lit.span(),
                format!(
                    "unknown rename rule: '{other}'. Expected one of: snake_case, camelCase, PascalCase, kebab-case"
                ),
            )),
        }
    }

    /// Applies the rule to a snake_case Rust field name.
    pub fn apply(self, field: &str) -> String {
        let field = field.strip_prefix("r#").unwrap_or(field);
        match self {
            RenameRule::None => field.to_string(),
            RenameRule::KebabCase => field.replace('_', "-"),
            RenameRule::CamelCase | RenameRule::PascalCase => {
                let mut out = String::with_capacity(field.len());
                let mut upper = self == RenameRule::PascalCase;
                for c in field.chars() {
                    if c == '_' {
                        upper = !out.is_empty();
                    } else if upper {
                        out.push(c.to_ascii_uppercase());
                        upper = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// Struct-level attributes from `#[sift(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    pub rename_all: RenameRule,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    attr.rename_all = RenameRule::from_lit(string_value(&nv.value, "rename_all")?)?;
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown container attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts `#[sift(...)]` from the struct's attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("sift") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}
