use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::Value;

use super::{
    error::TypeError,
    registry::TypeRegistry,
    types::{ArrayType, ObjectType, ResolvedType, StringType, Type, UnionType},
};

#[derive(Deserialize)]
struct RawRegistry {
    types: Vec<RawType>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawType {
    Reference(String),
    Definition(RawDefinition),
}

#[derive(Deserialize)]
#[serde(tag = "$type")]
enum RawDefinition {
    #[serde(rename = "ObjectType")]
    Object {
        name: String,
        #[serde(default)]
        attributes: Vec<RawAttribute>,
    },
    #[serde(rename = "UnionType")]
    Union {
        name: String,
        alternatives: Vec<RawType>,
    },
    #[serde(rename = "array")]
    Array { of: Box<RawType> },
    #[serde(rename = "string")]
    String {
        #[serde(default)]
        regex: Option<String>,
        #[serde(default)]
        flags: Option<String>,
    },
    #[serde(rename = "not set")]
    NotSet,
}

#[derive(Deserialize)]
struct RawAttribute {
    name: String,
    #[serde(rename = "type")]
    ty: RawType,
}

impl TypeRegistry {
    /// Build a registry from a `{"types": [...]}` document.
    pub fn from_json(value: &Value) -> Result<Self, TypeError> {
        let raw: RawRegistry = serde_json::from_value(value.clone())
            .map_err(|err| TypeError::InvalidDefinition(err.to_string()))?;
        let mut definitions = Vec::with_capacity(raw.types.len());
        for entry in raw.types {
            match entry.into_type("<registry>")? {
                Type::Resolved(resolved) => definitions.push(*resolved),
                Type::Named(name) => {
                    return Err(TypeError::InvalidDefinition(format!(
                        "top-level entry '{name}' must be a definition, not a reference"
                    )));
                }
            }
        }
        TypeRegistry::new(definitions)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, TypeError> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|err| TypeError::InvalidDefinition(err.to_string()))?;
        Self::from_json(&value)
    }
}

impl RawType {
    fn into_type(self, context: &str) -> Result<Type, TypeError> {
        let definition = match self {
            RawType::Reference(name) => return Ok(Type::Named(name)),
            RawType::Definition(definition) => definition,
        };
        let resolved = match definition {
            RawDefinition::Object { name, attributes } => {
                let attributes = attributes
                    .into_iter()
                    .map(|attr| {
                        let ty = attr.ty.into_type(&format!("{name}.{}", attr.name))?;
                        Ok((attr.name, ty))
                    })
                    .collect::<Result<Vec<_>, TypeError>>()?;
                ResolvedType::Object(ObjectType::new(name, attributes))
            }
            RawDefinition::Union { name, alternatives } => {
                let alternatives = alternatives
                    .into_iter()
                    .map(|alt| alt.into_type(&name))
                    .collect::<Result<Vec<_>, TypeError>>()?;
                ResolvedType::Union(UnionType::new(name, alternatives))
            }
            RawDefinition::Array { of } => ResolvedType::Array(ArrayType {
                of: of.into_type(context)?,
            }),
            RawDefinition::String { regex, flags } => {
                ResolvedType::String(string_type(context, regex, flags.as_deref())?)
            }
            RawDefinition::NotSet => ResolvedType::NotSet,
        };
        Ok(resolved.into())
    }
}

fn string_type(
    context: &str,
    pattern: Option<String>,
    flags: Option<&str>,
) -> Result<StringType, TypeError> {
    let Some(pattern) = pattern else {
        return Ok(StringType::default());
    };
    let mut builder = RegexBuilder::new(&pattern);
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            other => {
                return Err(TypeError::InvalidPattern {
                    context: context.to_string(),
                    message: format!("unsupported flag '{other}'"),
                });
            }
        }
    }
    let regex = builder.build().map_err(|err| TypeError::InvalidPattern {
        context: context.to_string(),
        message: err.to_string(),
    })?;
    Ok(StringType::with_pattern(regex))
}
