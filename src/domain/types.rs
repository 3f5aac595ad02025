use std::fmt;

use regex::Regex;

/// Key under which object values carry the name of their `ObjectType`.
pub const TYPE_TAG: &str = "$type";

/// A type as written in a definition: either a reference to a registered
/// definition or an inline resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Named(String),
    Resolved(Box<ResolvedType>),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn string() -> Self {
        ResolvedType::String(StringType::default()).into()
    }

    pub fn not_set() -> Self {
        ResolvedType::NotSet.into()
    }

    pub fn array_of(of: impl Into<Type>) -> Self {
        ResolvedType::Array(ArrayType { of: of.into() }).into()
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Type::Named(name) => Some(name),
            Type::Resolved(_) => None,
        }
    }
}

impl From<ResolvedType> for Type {
    fn from(value: ResolvedType) -> Self {
        Type::Resolved(Box::new(value))
    }
}

impl From<&str> for Type {
    fn from(value: &str) -> Self {
        Type::Named(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Object(ObjectType),
    Union(UnionType),
    Array(ArrayType),
    String(StringType),
    NotSet,
}

impl ResolvedType {
    /// Name under which the type can be registered. Only object and union
    /// types are definitions.
    pub fn definition_name(&self) -> Option<&str> {
        match self {
            ResolvedType::Object(object) => Some(&object.name),
            ResolvedType::Union(union) => Some(&union.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub attributes: Vec<AttributeDef>,
}

impl ObjectType {
    pub fn new<N, I>(name: impl Into<String>, attributes: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Type)>,
    {
        Self {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(name, ty)| AttributeDef {
                    name: name.into(),
                    ty,
                })
                .collect(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub name: String,
    pub alternatives: Vec<Type>,
}

impl UnionType {
    pub fn new(name: impl Into<String>, alternatives: impl IntoIterator<Item = Type>) -> Self {
        Self {
            name: name.into(),
            alternatives: alternatives.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub of: Type,
}

#[derive(Debug, Clone, Default)]
pub struct StringType {
    pub pattern: Option<Regex>,
}

impl StringType {
    pub fn with_pattern(pattern: Regex) -> Self {
        Self {
            pattern: Some(pattern),
        }
    }

    /// Strings without a pattern accept anything.
    pub fn accepts(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(text))
    }
}

impl PartialEq for StringType {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_ref().map(Regex::as_str) == other.pattern.as_ref().map(Regex::as_str)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => f.write_str(name),
            Type::Resolved(resolved) => resolved.fmt(f),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Object(object) => f.write_str(&object.name),
            ResolvedType::Union(union) => f.write_str(&union.name),
            ResolvedType::Array(array) => write!(f, "Array<{}>", array.of),
            ResolvedType::String(_) => f.write_str("String"),
            ResolvedType::NotSet => f.write_str("not set"),
        }
    }
}

/// Display name of a type, as shown in labels and titles.
pub fn type_to_string(ty: &Type) -> String {
    ty.to_string()
}
