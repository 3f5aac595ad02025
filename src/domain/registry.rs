use indexmap::IndexMap;
use serde_json::Value;

use super::{
    error::TypeError,
    types::{ResolvedType, TYPE_TAG, Type, UnionType},
};

/// Read-only table of named type definitions.
///
/// Every reference reachable from a registered definition is checked when the
/// registry is built, so `resolve` on a type taken from the registry can only
/// fail for names supplied from outside (a CLI flag, an input document tag).
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    definitions: IndexMap<String, ResolvedType>,
}

impl TypeRegistry {
    pub fn new(definitions: impl IntoIterator<Item = ResolvedType>) -> Result<Self, TypeError> {
        let mut table = IndexMap::new();
        for definition in definitions {
            let Some(name) = definition.definition_name() else {
                return Err(TypeError::InvalidDefinition(format!(
                    "only object and union types can be registered, got {definition}"
                )));
            };
            if table.contains_key(name) {
                return Err(TypeError::DuplicateType(name.to_string()));
            }
            table.insert(name.to_string(), definition);
        }
        let registry = Self { definitions: table };
        registry.check_references()?;
        registry.check_union_nesting()?;
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedType> {
        self.definitions.get(name)
    }

    pub fn resolve_name(&self, name: &str) -> Result<&ResolvedType, TypeError> {
        self.definitions
            .get(name)
            .ok_or_else(|| TypeError::UnknownType(name.to_string()))
    }

    /// Turn a reference into its definition. Already resolved types come back
    /// unchanged.
    pub fn resolve<'a>(&'a self, ty: &'a Type) -> Result<&'a ResolvedType, TypeError> {
        match ty {
            Type::Named(name) => self.resolve_name(name),
            Type::Resolved(resolved) => Ok(resolved),
        }
    }

    pub fn is_instance(&self, value: &Value, ty: &Type) -> Result<bool, TypeError> {
        self.is_instance_of(value, self.resolve(ty)?)
    }

    pub fn is_instance_of(&self, value: &Value, ty: &ResolvedType) -> Result<bool, TypeError> {
        match ty {
            ResolvedType::Object(object) => {
                Ok(value.get(TYPE_TAG).and_then(Value::as_str) == Some(object.name.as_str()))
            }
            ResolvedType::Union(union) => Ok(self.find_alternative(value, union)?.is_some()),
            ResolvedType::Array(array) => {
                let Value::Array(items) = value else {
                    return Ok(false);
                };
                for item in items {
                    if !self.is_instance(item, &array.of)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ResolvedType::String(_) => Ok(value.is_string()),
            ResolvedType::NotSet => Ok(value.is_null()),
        }
    }

    /// Index of the first alternative `value` matches.
    pub fn find_alternative(
        &self,
        value: &Value,
        union: &UnionType,
    ) -> Result<Option<usize>, TypeError> {
        for (index, alternative) in union.alternatives.iter().enumerate() {
            if self.is_instance(value, alternative)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn check_references(&self) -> Result<(), TypeError> {
        for definition in self.definitions.values() {
            self.check_resolved(definition)?;
        }
        Ok(())
    }

    fn check_type(&self, ty: &Type) -> Result<(), TypeError> {
        match ty {
            Type::Named(name) => self.resolve_name(name).map(|_| ()),
            Type::Resolved(resolved) => self.check_resolved(resolved),
        }
    }

    fn check_resolved(&self, ty: &ResolvedType) -> Result<(), TypeError> {
        match ty {
            ResolvedType::Object(object) => object
                .attributes
                .iter()
                .try_for_each(|attr| self.check_type(&attr.ty)),
            ResolvedType::Union(union) => {
                if union.alternatives.is_empty() {
                    return Err(TypeError::EmptyUnion(union.name.clone()));
                }
                union
                    .alternatives
                    .iter()
                    .try_for_each(|alternative| self.check_type(alternative))
            }
            ResolvedType::Array(array) => self.check_type(&array.of),
            ResolvedType::String(_) | ResolvedType::NotSet => Ok(()),
        }
    }

    /// Unions whose alternatives are unions must bottom out in some other
    /// type. A union reachable from itself through alternatives alone has no
    /// instance to dispatch, match or instantiate.
    fn check_union_nesting(&self) -> Result<(), TypeError> {
        for definition in self.definitions.values() {
            if let ResolvedType::Union(union) = definition {
                self.walk_nested_unions(union, &mut Vec::new())?;
            }
        }
        Ok(())
    }

    fn walk_nested_unions<'a>(
        &'a self,
        union: &'a UnionType,
        enclosing: &mut Vec<&'a UnionType>,
    ) -> Result<(), TypeError> {
        if enclosing.iter().any(|outer| std::ptr::eq(*outer, union)) {
            return Err(TypeError::CyclicType(union.name.clone()));
        }
        enclosing.push(union);
        for alternative in &union.alternatives {
            if let ResolvedType::Union(inner) = self.resolve(alternative)? {
                self.walk_nested_unions(inner, enclosing)?;
            }
        }
        enclosing.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::types::{ArrayType, ObjectType};

    fn registry() -> TypeRegistry {
        TypeRegistry::new([
            ResolvedType::Object(ObjectType::new("Path", [("Path", Type::string())])),
            ResolvedType::Object(ObjectType::new("UUID", [("UUID", Type::string())])),
            ResolvedType::Union(UnionType::new(
                "Identifier",
                [Type::named("UUID"), Type::named("Path")],
            )),
        ])
        .expect("registry")
    }

    #[test]
    fn rejects_unknown_references() {
        let err = TypeRegistry::new([ResolvedType::Union(UnionType::new(
            "Broken",
            [Type::named("Missing")],
        ))])
        .unwrap_err();
        assert_eq!(err, TypeError::UnknownType("Missing".into()));
    }

    #[test]
    fn rejects_duplicates_and_empty_unions() {
        let dup = TypeRegistry::new([
            ResolvedType::Object(ObjectType::new("A", Vec::<(String, Type)>::new())),
            ResolvedType::Object(ObjectType::new("A", Vec::<(String, Type)>::new())),
        ])
        .unwrap_err();
        assert_eq!(dup, TypeError::DuplicateType("A".into()));

        let empty = TypeRegistry::new([ResolvedType::Object(ObjectType::new(
            "Holder",
            [(
                "inner",
                ResolvedType::Union(UnionType::new("Nothing", [])).into(),
            )],
        ))])
        .unwrap_err();
        assert_eq!(empty, TypeError::EmptyUnion("Nothing".into()));
    }

    #[test]
    fn rejects_unions_that_only_nest_each_other() {
        let err = TypeRegistry::from_json(&json!({"types": [
            {"$type": "UnionType", "name": "A", "alternatives": [{"$type": "string"}, "B"]},
            {"$type": "UnionType", "name": "B", "alternatives": [{"$type": "not set"}, "A"]}
        ]}))
        .unwrap_err();
        assert_eq!(err, TypeError::CyclicType("A".into()));

        let own = TypeRegistry::new([ResolvedType::Union(UnionType::new(
            "Selfish",
            [Type::string(), Type::named("Selfish")],
        ))])
        .unwrap_err();
        assert_eq!(own, TypeError::CyclicType("Selfish".into()));
    }

    #[test]
    fn nested_unions_that_bottom_out_are_accepted() {
        let registry = TypeRegistry::from_json(&json!({"types": [
            {"$type": "UnionType", "name": "Outer",
             "alternatives": ["Inner", {"$type": "not set"}]},
            {"$type": "UnionType", "name": "Inner", "alternatives": [{"$type": "string"}]},
            {"$type": "UnionType", "name": "Tree", "alternatives": [
                {"$type": "string"},
                {"$type": "array", "of": "Tree"}
            ]}
        ]}))
        .expect("registry");
        let outer = Type::named("Outer");
        assert!(registry.is_instance(&json!("x"), &outer).unwrap());
        assert!(registry.is_instance(&Value::Null, &outer).unwrap());
        assert!(!registry.is_instance(&json!(5), &outer).unwrap());
        let tree = Type::named("Tree");
        assert!(registry.is_instance(&json!(["a", ["b"]]), &tree).unwrap());
        assert!(!registry.is_instance(&json!([1]), &tree).unwrap());
    }

    #[test]
    fn resolve_is_idempotent() {
        let registry = registry();
        let named = Type::named("Path");
        let resolved = registry.resolve(&named).expect("resolves").clone();
        let again = Type::from(resolved.clone());
        assert_eq!(registry.resolve(&again).expect("resolves"), &resolved);
        assert_eq!(
            registry.resolve(&Type::named("Nope")).unwrap_err(),
            TypeError::UnknownType("Nope".into())
        );
    }

    #[test]
    fn objects_match_on_their_tag_only() {
        let registry = registry();
        let path = Type::named("Path");
        assert!(registry.is_instance(&json!({"$type": "Path"}), &path).unwrap());
        assert!(!registry.is_instance(&json!({"$type": "UUID", "Path": ""}), &path).unwrap());
        assert!(!registry.is_instance(&json!("Path"), &path).unwrap());
    }

    #[test]
    fn arrays_check_every_element() {
        let registry = registry();
        let ty: Type = ResolvedType::Array(ArrayType { of: Type::string() }).into();
        assert!(registry.is_instance(&json!([]), &ty).unwrap());
        assert!(registry.is_instance(&json!(["a", "b"]), &ty).unwrap());
        assert!(!registry.is_instance(&json!(["a", 1]), &ty).unwrap());
        assert!(!registry.is_instance(&json!("a"), &ty).unwrap());
    }

    #[test]
    fn find_alternative_returns_lowest_index() {
        let registry = registry();
        let union = UnionType::new("Loose", [Type::string(), Type::string(), Type::not_set()]);
        assert_eq!(registry.find_alternative(&json!("x"), &union).unwrap(), Some(0));
        assert_eq!(registry.find_alternative(&Value::Null, &union).unwrap(), Some(2));
        assert_eq!(registry.find_alternative(&json!(3), &union).unwrap(), None);
    }
}
