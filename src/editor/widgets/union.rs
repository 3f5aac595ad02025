use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    document::{Accessor, Document},
    domain::{InstantiateOptions, TypeError, TypeRegistry, UnionType},
    editor::EditorError,
};

/// Alternative currently shown by a union editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    /// Set when the value matches none of the alternatives.
    pub error: Option<String>,
}

/// Selected alternative per union slot, kept across tree rebuilds.
#[derive(Debug, Clone, Default)]
pub struct UnionSelections {
    selected: HashMap<Accessor, usize>,
}

impl UnionSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, accessor: &Accessor) -> Option<usize> {
        self.selected.get(accessor).copied()
    }

    /// Drop the choices at or below `accessor`. Array removals shift element
    /// paths, so choices recorded under the array no longer line up.
    pub fn forget_below(&mut self, accessor: &Accessor) {
        self.selected
            .retain(|path, _| !path.path().starts_with(accessor.path()));
    }

    /// Alternative to show for `value`.
    ///
    /// A remembered choice is kept while the value still matches it; otherwise
    /// the first matching alternative wins. A value matching nothing falls
    /// back to the first alternative and reports the mismatch.
    pub fn select(
        &mut self,
        types: &TypeRegistry,
        accessor: &Accessor,
        union: &UnionType,
        value: &Value,
    ) -> Result<Selection, TypeError> {
        if let Some(index) = self.get(accessor)
            && let Some(alternative) = union.alternatives.get(index)
            && types.is_instance(value, alternative)?
        {
            return Ok(Selection { index, error: None });
        }
        let selection = match types.find_alternative(value, union)? {
            Some(index) => Selection { index, error: None },
            None => {
                let err = TypeError::NoMatchingAlternative {
                    union: union.name.clone(),
                    value: value.to_string(),
                };
                warn!(path = %accessor, "{err}");
                Selection {
                    index: 0,
                    error: Some(err.to_string()),
                }
            }
        };
        self.selected.insert(accessor.clone(), selection.index);
        Ok(selection)
    }

    /// Replace the value behind `accessor` with a fresh instance of
    /// alternative `index` and remember the choice.
    pub fn switch_to(
        &mut self,
        doc: &mut Document,
        types: &TypeRegistry,
        accessor: &Accessor,
        union: &UnionType,
        index: usize,
        options: InstantiateOptions,
    ) -> Result<(), EditorError> {
        let alternative = union.alternatives.get(index).ok_or_else(|| {
            EditorError::InvalidInput {
                what: "alternative",
                input: index.to_string(),
            }
        })?;
        info!(path = %accessor, union = %union.name, "switching to {index}");
        let value = types.instantiate_with(alternative, options)?;
        accessor.set(doc, value)?;
        self.selected.insert(accessor.clone(), index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::Type;

    fn source_union(types: &TypeRegistry) -> UnionType {
        match types.resolve_name("FilesystemSource").unwrap() {
            crate::domain::ResolvedType::Union(union) => union.clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn selection_follows_the_value() {
        let types = TypeRegistry::builtin();
        let union = source_union(&types);
        let mut selections = UnionSelections::new();
        let acc = Accessor::root().attribute_path("source");
        let tmpfs = json!({"$type": "tmpfs", "options": []});
        assert_eq!(
            selections.select(&types, &acc, &union, &tmpfs).unwrap(),
            Selection {
                index: 1,
                error: None
            }
        );
        assert_eq!(selections.get(&acc), Some(1));
    }

    #[test]
    fn forgetting_a_subtree_keeps_siblings() {
        let types = TypeRegistry::builtin();
        let union = source_union(&types);
        let mut selections = UnionSelections::new();
        let tmpfs = json!({"$type": "tmpfs", "options": []});
        let entries = Accessor::root().attribute_path("entries");
        let inside = entries.element(1).attribute_path("source");
        let outside = Accessor::root().attribute_path("source");
        selections.select(&types, &inside, &union, &tmpfs).unwrap();
        selections.select(&types, &outside, &union, &tmpfs).unwrap();
        selections.forget_below(&entries);
        assert_eq!(selections.get(&inside), None);
        assert_eq!(selections.get(&outside), Some(1));
    }

    #[test]
    fn unmatched_value_falls_back_to_first_alternative() {
        let types = TypeRegistry::builtin();
        let union = source_union(&types);
        let mut selections = UnionSelections::new();
        let selection = selections
            .select(&types, &Accessor::root(), &union, &json!("nope"))
            .unwrap();
        assert_eq!(selection.index, 0);
        let message = selection.error.expect("mismatch reported");
        assert!(message.contains("FilesystemSource"), "{message}");
    }

    #[test]
    fn remembered_choice_survives_while_it_still_matches() {
        let types = TypeRegistry::builtin();
        let either = UnionType::new("Either", [Type::string(), Type::string()]);
        let mut selections = UnionSelections::new();
        let mut doc = Document::new(json!("x"));
        let root = Accessor::root();
        selections
            .switch_to(
                &mut doc,
                &types,
                &root,
                &either,
                1,
                InstantiateOptions::default(),
            )
            .unwrap();
        assert_eq!(doc.value(), &json!(""));
        let selection = selections.select(&types, &root, &either, doc.value()).unwrap();
        assert_eq!(selection.index, 1);
    }

    #[test]
    fn switch_replaces_value_with_fresh_instance() {
        let types = TypeRegistry::builtin();
        let union = source_union(&types);
        let mut selections = UnionSelections::new();
        let mut doc = Document::new(json!({
            "$type": "FStabEntry",
            "mountpoint": "/",
            "source": {"$type": "tmpfs", "options": ["nosuid"]}
        }));
        let source = Accessor::root().attribute(&mut doc, "source").unwrap();
        selections
            .switch_to(
                &mut doc,
                &types,
                &source,
                &union,
                0,
                InstantiateOptions::default(),
            )
            .unwrap();
        let value = source.get(&doc).unwrap();
        assert!(types.is_instance(value, &Type::named("BlockDevice")).unwrap());
        assert_eq!(selections.get(&source), Some(0));
        assert_eq!(doc.revision(), 1);

        let err = selections
            .switch_to(
                &mut doc,
                &types,
                &source,
                &union,
                7,
                InstantiateOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidInput { .. }));
        assert_eq!(doc.revision(), 1);
    }
}
