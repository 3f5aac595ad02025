use tracing::trace;

use crate::domain::{Type, TypeError, TypeRegistry};

use super::{
    Editable, EditorKind,
    strategy::{EditorStrategy, Priority},
};

/// Ordered table of the strategies dispatch may pick from. Earlier entries
/// win ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRegistry {
    strategies: Vec<EditorStrategy>,
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::new(EditorStrategy::DEFAULT_ORDER)
    }
}

impl EditorRegistry {
    pub fn new(strategies: impl IntoIterator<Item = EditorStrategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
        }
    }

    pub fn strategies(&self) -> &[EditorStrategy] {
        &self.strategies
    }

    pub fn without(mut self, strategy: EditorStrategy) -> Self {
        self.strategies.retain(|existing| *existing != strategy);
        self
    }
}

/// Picks the editor for an editable from a registry of strategies.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    types: &'a TypeRegistry,
    editors: &'a EditorRegistry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(types: &'a TypeRegistry, editors: &'a EditorRegistry) -> Self {
        Self { types, editors }
    }

    pub fn types(&self) -> &'a TypeRegistry {
        self.types
    }

    /// Highest-priority strategy that can show `editable`, restricted to
    /// `kind` when given. Falls back to [`EditorStrategy::NoEditor`].
    pub fn choose(
        &self,
        editable: Editable<'_>,
        kind: Option<EditorKind>,
    ) -> Result<EditorStrategy, TypeError> {
        let editable = match editable {
            Editable::Attribute { ty, .. } => Editable::Type(self.types.resolve(ty)?),
            other => other,
        };
        let mut candidates = Vec::new();
        for &strategy in self.editors.strategies() {
            if kind.is_some_and(|wanted| strategy.kind() != wanted) {
                continue;
            }
            if let Some(priority) = strategy.can_edit(editable, self)? {
                candidates.push((strategy, priority));
            }
        }
        let chosen = pick_highest(candidates).unwrap_or(EditorStrategy::NoEditor);
        trace!(editable = %editable, ?kind, %chosen, "editor chosen");
        Ok(chosen)
    }

    /// Resolves `ty` first, then dispatches on it.
    pub fn choose_type(
        &self,
        ty: &Type,
        kind: Option<EditorKind>,
    ) -> Result<EditorStrategy, TypeError> {
        self.choose(Editable::Type(self.types.resolve(ty)?), kind)
    }

    pub fn has_inline_editor(&self, ty: &Type) -> Result<bool, TypeError> {
        Ok(self.choose_type(ty, Some(EditorKind::Inline))? != EditorStrategy::NoEditor)
    }
}

/// First candidate with the highest priority.
fn pick_highest(
    candidates: impl IntoIterator<Item = (EditorStrategy, Priority)>,
) -> Option<EditorStrategy> {
    let mut best: Option<(EditorStrategy, Priority)> = None;
    for (strategy, priority) in candidates {
        if best.is_none_or(|(_, current)| priority > current) {
            best = Some((strategy, priority));
        }
    }
    best.map(|(strategy, _)| strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArrayType, ObjectType, ResolvedType, UnionType};

    fn types() -> TypeRegistry {
        TypeRegistry::builtin()
    }

    fn resolved<'t>(types: &'t TypeRegistry, name: &str) -> Editable<'t> {
        Editable::Type(types.get(name).expect("registered"))
    }

    #[test]
    fn picks_named_primitive_editors_over_generic_ones() {
        let types = types();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        for (name, expected) in [
            ("Date", EditorStrategy::Date),
            ("Time", EditorStrategy::Time),
            ("DateTime", EditorStrategy::DateTime),
            ("Color", EditorStrategy::Color),
            ("GUID", EditorStrategy::Guid),
            ("Path", EditorStrategy::SimpleObjectInline),
            ("IPv4", EditorStrategy::SimpleObjectInline),
            ("FStabEntry", EditorStrategy::Object),
        ] {
            assert_eq!(
                dispatcher.choose(resolved(&types, name), None).unwrap(),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn kind_filter_restricts_candidates() {
        let types = types();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        let path = resolved(&types, "Path");
        assert_eq!(
            dispatcher.choose(path, Some(EditorKind::Block)).unwrap(),
            EditorStrategy::Object
        );
        let entry = resolved(&types, "FStabEntry");
        assert_eq!(
            dispatcher.choose(entry, Some(EditorKind::Inline)).unwrap(),
            EditorStrategy::NoEditor
        );
    }

    #[test]
    fn union_goes_inline_only_when_every_alternative_can() {
        let types = types();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        assert_eq!(
            dispatcher.choose(resolved(&types, "BlockDeviceIdentifier"), None).unwrap(),
            EditorStrategy::UnionInline
        );
        assert_eq!(
            dispatcher.choose(resolved(&types, "FilesystemSource"), None).unwrap(),
            EditorStrategy::UnionBlock
        );
        let maybe = ResolvedType::Union(UnionType::new(
            "MaybeOptions",
            [Type::not_set(), Type::array_of(Type::string())],
        ));
        assert_eq!(
            dispatcher.choose(Editable::Type(&maybe), None).unwrap(),
            EditorStrategy::UnionBlock
        );
    }

    #[test]
    fn nested_and_recursive_unions_dispatch() {
        let types = TypeRegistry::from_json(&serde_json::json!({"types": [
            {"$type": "UnionType", "name": "Outer",
             "alternatives": ["Inner", {"$type": "not set"}]},
            {"$type": "UnionType", "name": "Inner", "alternatives": [{"$type": "string"}]},
            {"$type": "UnionType", "name": "Tree", "alternatives": [
                {"$type": "string"},
                {"$type": "array", "of": "Tree"}
            ]}
        ]}))
        .unwrap();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        assert_eq!(
            dispatcher.choose_type(&Type::named("Outer"), None).unwrap(),
            EditorStrategy::UnionInline
        );
        assert_eq!(
            dispatcher.choose_type(&Type::named("Tree"), None).unwrap(),
            EditorStrategy::UnionBlock
        );
    }

    #[test]
    fn array_elements_inline_only_for_inline_element_types() {
        let types = types();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        let strings = ArrayType { of: Type::string() };
        let entries = ArrayType {
            of: Type::named("FStabEntry"),
        };
        assert_eq!(
            dispatcher
                .choose(Editable::ArrayIndex { index: 0, array: &strings }, None)
                .unwrap(),
            EditorStrategy::ArrayElementInline
        );
        assert_eq!(
            dispatcher
                .choose(Editable::ArrayIndex { index: 0, array: &entries }, None)
                .unwrap(),
            EditorStrategy::ArrayElement
        );
    }

    #[test]
    fn attributes_dispatch_on_their_type() {
        let types = types();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        let ty = Type::named("UUID");
        let chosen = dispatcher
            .choose(Editable::Attribute { name: "identifier", ty: &ty }, None)
            .unwrap();
        assert_eq!(chosen, EditorStrategy::SimpleObjectInline);
        let ghost = Type::named("Ghost");
        assert_eq!(
            dispatcher
                .choose(Editable::Attribute { name: "x", ty: &ghost }, None)
                .unwrap_err(),
            TypeError::UnknownType("Ghost".into())
        );
    }

    #[test]
    fn ties_go_to_the_first_registered_strategy() {
        assert_eq!(
            pick_highest([
                (EditorStrategy::Object, 1),
                (EditorStrategy::UnionBlock, 1),
                (EditorStrategy::NoEditor, 0),
            ]),
            Some(EditorStrategy::Object)
        );
        assert_eq!(
            pick_highest([(EditorStrategy::NoEditor, 0), (EditorStrategy::Array, 1)]),
            Some(EditorStrategy::Array)
        );
        assert_eq!(pick_highest([]), None);
    }

    #[test]
    fn priority_beats_registration_order() {
        let types = types();
        let holder = ResolvedType::Object(ObjectType::new("Holder", [("v", Type::string())]));
        for order in [
            [EditorStrategy::Object, EditorStrategy::SimpleObjectInline],
            [EditorStrategy::SimpleObjectInline, EditorStrategy::Object],
        ] {
            let editors = EditorRegistry::new(order);
            assert_eq!(
                Dispatcher::new(&types, &editors)
                    .choose(Editable::Type(&holder), None)
                    .unwrap(),
                EditorStrategy::SimpleObjectInline
            );
        }
    }

    #[test]
    fn dispatch_is_deterministic_and_prefers_higher_priority() {
        let types = types();
        let editors = EditorRegistry::default();
        let dispatcher = Dispatcher::new(&types, &editors);
        let guid = resolved(&types, "GUID");
        let first = dispatcher.choose(guid, None).unwrap();
        for _ in 0..5 {
            assert_eq!(dispatcher.choose(guid, None).unwrap(), first);
        }
        // GUID is also a one-string object (2) and an object (1)
        assert_eq!(first, EditorStrategy::Guid);
        let without = EditorRegistry::default().without(EditorStrategy::Guid);
        assert_eq!(
            Dispatcher::new(&types, &without).choose(guid, None).unwrap(),
            EditorStrategy::SimpleObjectInline
        );
    }

    #[test]
    fn empty_registry_falls_back_to_diagnostic() {
        let types = types();
        let editors = EditorRegistry::new([]);
        let dispatcher = Dispatcher::new(&types, &editors);
        assert_eq!(
            dispatcher.choose_type(&Type::string(), None).unwrap(),
            EditorStrategy::NoEditor
        );
    }
}
