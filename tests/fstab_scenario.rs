use serde_json::json;

use tymlui::{
    Accessor, Dispatcher, Document, EditorRegistry, EditorStrategy, InstantiateOptions, Type,
    TypeRegistry,
    domain::{ArrayType, ResolvedType, UnionType},
    editor::{Editable, EditorTree, UnionSelections, widgets},
};

fn entries_array(types: &TypeRegistry) -> ArrayType {
    let Some(ResolvedType::Object(fstab)) = types.get("FStab") else {
        panic!("FStab is an object type");
    };
    let attr = fstab.attribute("entries").expect("entries attribute");
    match types.resolve(&attr.ty).unwrap() {
        ResolvedType::Array(array) => array.clone(),
        other => panic!("entries should be an array, got {other}"),
    }
}

fn source_union(types: &TypeRegistry) -> UnionType {
    match types.resolve_name("FilesystemSource").unwrap() {
        ResolvedType::Union(union) => union.clone(),
        other => panic!("FilesystemSource should be a union, got {other}"),
    }
}

#[test]
fn empty_fstab_append_then_switch_source() {
    let types = TypeRegistry::builtin();
    let editors = EditorRegistry::default();
    let dispatcher = Dispatcher::new(&types, &editors);
    let mut doc = Document::new(json!({"$type": "FStab", "entries": []}));

    let root = Type::named("FStab");
    let strategy = dispatcher.choose_type(&root, None).unwrap();
    assert_eq!(strategy, EditorStrategy::Object);

    let entries = Accessor::root().attribute(&mut doc, "entries").unwrap();
    let array = entries_array(&types);
    let index = widgets::array::append(
        &mut doc,
        &types,
        &entries,
        &array,
        InstantiateOptions::default(),
    )
    .unwrap();
    assert_eq!(index, 0);

    let entry = entries.element(0);
    let value = entry.get(&doc).unwrap();
    assert_eq!(value["$type"], json!("FStabEntry"));
    assert_eq!(value["mountpoint"], json!(""));
    assert!(
        types
            .is_instance(&value["source"], &Type::named("BlockDevice"))
            .unwrap()
    );

    let source = entry.attribute(&mut doc, "source").unwrap();
    let mut selections = UnionSelections::new();
    selections
        .switch_to(
            &mut doc,
            &types,
            &source,
            &source_union(&types),
            1,
            InstantiateOptions::default(),
        )
        .unwrap();
    assert_eq!(selections.get(&source), Some(1));
    assert_eq!(
        source.get(&doc).unwrap(),
        &types.instantiate(&Type::named("tmpfs")).unwrap()
    );
    assert!(source.get(&doc).unwrap().get("identifier").is_none());
}

#[test]
fn tree_follows_every_edit() {
    let types = TypeRegistry::builtin();
    let editors = EditorRegistry::default();
    let root = Type::named("FStab");
    let mut doc = Document::new(json!({"$type": "FStab", "entries": []}));
    let mut selections = UnionSelections::new();

    let tree = EditorTree::build(
        &mut doc,
        Dispatcher::new(&types, &editors),
        &mut selections,
        &root,
    )
    .unwrap();
    assert_eq!(tree.len(), 2, "heading and add row: {:#?}", tree.rows());
    assert_eq!(tree.rows()[1].display, "Add FStabEntry");

    let entries = Accessor::root().attribute_path("entries");
    widgets::array::append(
        &mut doc,
        &types,
        &entries,
        &entries_array(&types),
        InstantiateOptions::default(),
    )
    .unwrap();
    let tree = EditorTree::build(
        &mut doc,
        Dispatcher::new(&types, &editors),
        &mut selections,
        &root,
    )
    .unwrap();
    assert_eq!(tree.revision(), doc.revision());
    assert!(
        tree.rows()
            .iter()
            .any(|row| row.label.as_deref() == Some("1. FStabEntry"))
    );
    assert!(
        tree.rows()
            .iter()
            .any(|row| row.accessor.pointer() == "/entries/0/mountpoint")
    );
}

#[test]
fn dispatch_is_deterministic_for_every_registered_type() {
    let types = TypeRegistry::builtin();
    let editors = EditorRegistry::default();
    let dispatcher = Dispatcher::new(&types, &editors);
    for name in types.names() {
        let resolved = types.get(name).unwrap();
        let first = dispatcher.choose(Editable::Type(resolved), None).unwrap();
        for _ in 0..3 {
            assert_eq!(
                dispatcher.choose(Editable::Type(resolved), None).unwrap(),
                first,
                "{name}"
            );
        }
        assert_ne!(first, EditorStrategy::NoEditor, "{name} has an editor");
    }
}
