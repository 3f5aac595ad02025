use serde_json::Value;
use tracing::debug;

use crate::{
    document::{AccessError, Accessor, Document},
    domain::{ArrayType, InstantiateOptions, TypeRegistry},
    editor::EditorError,
};

/// Push a default instance of the element type. Returns the new element's
/// index.
pub fn append(
    doc: &mut Document,
    types: &TypeRegistry,
    array: &Accessor,
    ty: &ArrayType,
    options: InstantiateOptions,
) -> Result<usize, EditorError> {
    let index = match array.get(doc)? {
        Value::Array(items) => items.len(),
        _ => return Err(AccessError::NotAnArray(array.pointer()).into()),
    };
    let element = types.instantiate_with(&ty.of, options)?;
    doc.modify(array, |value| {
        if let Value::Array(items) = value {
            items.push(element);
        }
    })?;
    debug!(path = %array, index, element = %ty.of, "array element added");
    Ok(index)
}

/// Remove element `index`, shifting later elements down by one.
pub fn remove(doc: &mut Document, array: &Accessor, index: usize) -> Result<Value, EditorError> {
    let len = match array.get(doc)? {
        Value::Array(items) => items.len(),
        _ => return Err(AccessError::NotAnArray(array.pointer()).into()),
    };
    if index >= len {
        return Err(AccessError::IndexOutOfRange {
            pointer: array.element(index).pointer(),
            index,
            len,
        }
        .into());
    }
    let removed = doc
        .modify(array, |value| {
            value
                .as_array_mut()
                .map(|items| items.remove(index))
                .unwrap_or(Value::Null)
        })?;
    debug!(path = %array, index, "array element removed");
    Ok(removed)
}

/// Innermost array element on the path of `accessor`, as the array's accessor
/// and the element index.
pub fn owning_element(accessor: &Accessor) -> Option<(Accessor, usize)> {
    let mut current = accessor.clone();
    loop {
        let index = current.last_index();
        let (parent, _) = current.parent()?;
        if let Some(index) = index {
            return Some((parent, index));
        }
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{ArrayDefault, Type};

    #[test]
    fn append_pushes_a_default_element() {
        let types = TypeRegistry::builtin();
        let mut doc = Document::new(json!({"$type": "FStab", "entries": []}));
        let entries = Accessor::root().attribute(&mut doc, "entries").unwrap();
        let ty = ArrayType {
            of: Type::named("FStabEntry"),
        };
        let index = append(
            &mut doc,
            &types,
            &entries,
            &ty,
            InstantiateOptions::default(),
        )
        .unwrap();
        assert_eq!(index, 0);
        let entry = entries.element(0).get(&doc).unwrap();
        assert_eq!(entry["$type"], json!("FStabEntry"));
        assert_eq!(entry["mountpoint"], json!(""));
        assert_eq!(entry["source"]["$type"], json!("BlockDevice"));
        assert_eq!(doc.revision(), 1);
    }

    #[test]
    fn append_respects_empty_array_default() {
        let types = TypeRegistry::builtin();
        let mut doc = Document::new(json!([]));
        let ty = ArrayType {
            of: Type::named("tmpfs"),
        };
        let options = InstantiateOptions::default().with_array_default(ArrayDefault::Empty);
        append(&mut doc, &types, &Accessor::root(), &ty, options).unwrap();
        assert_eq!(doc.value(), &json!([{"$type": "tmpfs", "options": []}]));
    }

    #[test]
    fn append_to_non_array_is_rejected() {
        let types = TypeRegistry::builtin();
        let mut doc = Document::new(json!({"entries": null}));
        let entries = Accessor::root().attribute(&mut doc, "entries").unwrap();
        let ty = ArrayType { of: Type::string() };
        let err = append(
            &mut doc,
            &types,
            &entries,
            &ty,
            InstantiateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EditorError::Access(AccessError::NotAnArray("/entries".into()))
        );
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn remove_splices_contiguously() {
        let mut doc = Document::new(json!(["a", "b", "c"]));
        let removed = remove(&mut doc, &Accessor::root(), 1).unwrap();
        assert_eq!(removed, json!("b"));
        assert_eq!(doc.value(), &json!(["a", "c"]));

        let err = remove(&mut doc, &Accessor::root(), 2).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Access(AccessError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert_eq!(doc.revision(), 1);
    }

    #[test]
    fn owning_element_finds_the_innermost_index() {
        let acc = Accessor::root()
            .attribute_path("entries")
            .element(2)
            .attribute_path("source")
            .attribute_path("options")
            .element(1)
            .attribute_path("size");
        let (array, index) = owning_element(&acc).unwrap();
        assert_eq!(array.pointer(), "/entries/2/source/options");
        assert_eq!(index, 1);
        assert_eq!(owning_element(&Accessor::root().attribute_path("x")), None);
    }
}
