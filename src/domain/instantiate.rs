use serde_json::{Map, Value};

use super::{
    error::TypeError,
    registry::TypeRegistry,
    types::{ResolvedType, TYPE_TAG, Type},
};

/// What a freshly instantiated array contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayDefault {
    Empty,
    #[default]
    SingleElement,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstantiateOptions {
    pub array_default: ArrayDefault,
}

impl InstantiateOptions {
    pub fn with_array_default(mut self, array_default: ArrayDefault) -> Self {
        self.array_default = array_default;
        self
    }
}

impl TypeRegistry {
    /// Minimal default value for `ty`.
    pub fn instantiate(&self, ty: &Type) -> Result<Value, TypeError> {
        self.instantiate_with(ty, InstantiateOptions::default())
    }

    pub fn instantiate_with(
        &self,
        ty: &Type,
        options: InstantiateOptions,
    ) -> Result<Value, TypeError> {
        Instantiator {
            registry: self,
            options,
            active: Vec::new(),
        }
        .build(ty)
    }
}

struct Instantiator<'r> {
    registry: &'r TypeRegistry,
    options: InstantiateOptions,
    // names currently being built, outermost first
    active: Vec<String>,
}

impl Instantiator<'_> {
    fn build(&mut self, ty: &Type) -> Result<Value, TypeError> {
        match ty {
            Type::Named(name) => {
                if self.active.iter().any(|active| active == name) {
                    return Err(TypeError::CyclicType(name.clone()));
                }
                let resolved = self.registry.resolve_name(name)?;
                self.active.push(name.clone());
                let value = self.build_resolved(resolved);
                self.active.pop();
                value
            }
            Type::Resolved(resolved) => self.build_resolved(resolved),
        }
    }

    fn build_resolved(&mut self, ty: &ResolvedType) -> Result<Value, TypeError> {
        match ty {
            ResolvedType::Object(object) => {
                let mut map = Map::new();
                map.insert(TYPE_TAG.to_string(), Value::String(object.name.clone()));
                for attribute in &object.attributes {
                    map.insert(attribute.name.clone(), self.build(&attribute.ty)?);
                }
                Ok(Value::Object(map))
            }
            ResolvedType::Union(union) => {
                let first = union
                    .alternatives
                    .first()
                    .ok_or_else(|| TypeError::EmptyUnion(union.name.clone()))?;
                self.build(first)
            }
            ResolvedType::Array(array) => match self.options.array_default {
                ArrayDefault::Empty => Ok(Value::Array(Vec::new())),
                ArrayDefault::SingleElement => {
                    let outer = self.active.clone();
                    match self.build(&array.of) {
                        Ok(element) => Ok(Value::Array(vec![element])),
                        // a cycle closing over a type entered before this array
                        // bottoms out as an empty array
                        Err(TypeError::CyclicType(name)) if outer.contains(&name) => {
                            Ok(Value::Array(Vec::new()))
                        }
                        Err(err) => Err(err),
                    }
                }
            },
            ResolvedType::String(_) => Ok(Value::String(String::new())),
            ResolvedType::NotSet => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::types::{ObjectType, UnionType};

    fn tree_registry() -> TypeRegistry {
        TypeRegistry::new([ResolvedType::Object(ObjectType::new(
            "Tree",
            [
                ("label", Type::string()),
                ("children", Type::array_of(Type::named("Tree"))),
            ],
        ))])
        .expect("registry")
    }

    #[test]
    fn recursion_through_arrays_terminates() {
        let registry = tree_registry();
        let value = registry.instantiate(&Type::named("Tree")).expect("instantiate");
        assert_eq!(
            value,
            json!({"$type": "Tree", "label": "", "children": []})
        );
    }

    #[test]
    fn empty_array_default_skips_elements() {
        let registry = TypeRegistry::default();
        let options = InstantiateOptions::default().with_array_default(ArrayDefault::Empty);
        let value = registry
            .instantiate_with(&Type::array_of(Type::string()), options)
            .expect("instantiate");
        assert_eq!(value, json!([]));
        let single = registry
            .instantiate(&Type::array_of(Type::string()))
            .expect("instantiate");
        assert_eq!(single, json!([""]));
    }

    #[test]
    fn direct_self_reference_is_reported() {
        let registry = TypeRegistry::new([ResolvedType::Object(ObjectType::new(
            "Loop",
            [("next", Type::named("Loop"))],
        ))])
        .expect("registry");
        assert_eq!(
            registry.instantiate(&Type::named("Loop")).unwrap_err(),
            TypeError::CyclicType("Loop".into())
        );
    }

    #[test]
    fn unions_default_to_their_first_alternative() {
        let registry = TypeRegistry::default();
        let union: Type = ResolvedType::Union(UnionType::new(
            "MaybeOptions",
            [Type::not_set(), Type::array_of(Type::string())],
        ))
        .into();
        assert_eq!(registry.instantiate(&union).unwrap(), Value::Null);
    }
}
