use std::fmt;

use serde_json::Value;

use super::{Document, error::AccessError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Attribute(String),
    Index(usize),
}

/// Get/set handle on one slot of a [`Document`].
///
/// An accessor is a path from the document root. It caches nothing: every
/// call walks the current document, so it stays usable after sibling edits as
/// long as the containers along its path are still there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Accessor {
    path: Vec<PathSegment>,
}

impl Accessor {
    /// The whole document. Setting it replaces the value wholesale.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Accessor for element `index` of the array behind `self`.
    pub fn element(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    /// Accessor for attribute `name` of the object behind `self`.
    ///
    /// A missing attribute is created as `null` first so the slot exists for
    /// later reads. Creating it is not an edit and does not notify observers.
    pub fn attribute(&self, doc: &mut Document, name: &str) -> Result<Self, AccessError> {
        doc.materialize_attribute(self, name)?;
        Ok(self.child(PathSegment::Attribute(name.to_string())))
    }

    /// Attribute accessor that leaves the document untouched.
    pub fn attribute_path(&self, name: &str) -> Self {
        self.child(PathSegment::Attribute(name.to_string()))
    }

    pub fn parent(&self) -> Option<(Accessor, &PathSegment)> {
        let (last, rest) = self.path.split_last()?;
        Some((
            Accessor {
                path: rest.to_vec(),
            },
            last,
        ))
    }

    /// Index of the element this accessor points at, if its last step is one.
    pub fn last_index(&self) -> Option<usize> {
        match self.path.last() {
            Some(PathSegment::Index(index)) => Some(*index),
            _ => None,
        }
    }

    pub fn get<'d>(&self, doc: &'d Document) -> Result<&'d Value, AccessError> {
        doc.read(self)
    }

    pub fn set(&self, doc: &mut Document, value: Value) -> Result<(), AccessError> {
        doc.write(self, value)
    }

    /// JSON pointer of the slot, `""` for the root.
    pub fn pointer(&self) -> String {
        pointer_of(&self.path)
    }

    fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self { path }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.pointer())
        }
    }
}

pub(crate) fn pointer_of(path: &[PathSegment]) -> String {
    let mut pointer = String::new();
    for segment in path {
        pointer.push('/');
        match segment {
            PathSegment::Attribute(name) => {
                pointer.push_str(&name.replace('~', "~0").replace('/', "~1"));
            }
            PathSegment::Index(index) => pointer.push_str(&index.to_string()),
        }
    }
    pointer
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn element_accessor_reads_and_writes_the_current_array() {
        let mut doc = Document::new(json!({"items": ["a", "b", "c"]}));
        let items = Accessor::root().attribute(&mut doc, "items").unwrap();
        let last = items.element(2);
        assert_eq!(last.get(&doc).unwrap(), &json!("c"));

        last.set(&mut doc, json!("z")).unwrap();
        assert_eq!(doc.value(), &json!({"items": ["a", "b", "z"]}));

        let missing = items.element(9);
        assert_eq!(
            missing.get(&doc).unwrap_err(),
            AccessError::IndexOutOfRange {
                pointer: "/items/9".into(),
                index: 9,
                len: 3
            }
        );
    }

    #[test]
    fn attribute_accessor_materializes_missing_slot_once() {
        let mut doc = Document::new(json!({"$type": "Path"}));
        let revision = doc.revision();
        let attr = Accessor::root().attribute(&mut doc, "Path").unwrap();
        assert_eq!(attr.get(&doc).unwrap(), &Value::Null);
        assert_eq!(doc.value(), &json!({"$type": "Path", "Path": null}));
        assert_eq!(doc.revision(), revision, "materializing is not an edit");

        attr.set(&mut doc, json!("/dev/sda1")).unwrap();
        let again = Accessor::root().attribute(&mut doc, "Path").unwrap();
        assert_eq!(again.get(&doc).unwrap(), &json!("/dev/sda1"));
    }

    #[test]
    fn accessors_survive_sibling_removal() {
        let mut doc = Document::new(json!([{"n": 1}, {"n": 2}, {"n": 3}]));
        let first = Accessor::root().element(0);
        doc.modify(&Accessor::root(), |value| {
            if let Value::Array(items) = value {
                items.remove(1);
            }
        })
        .unwrap();
        let n = first.attribute(&mut doc, "n").unwrap();
        assert_eq!(n.get(&doc).unwrap(), &json!(1));
        assert_eq!(Accessor::root().element(1).get(&doc).unwrap(), &json!({"n": 3}));
    }

    #[test]
    fn pointer_escapes_reserved_characters() {
        let acc = Accessor::root().attribute_path("a/b").attribute_path("c~d").element(4);
        assert_eq!(acc.pointer(), "/a~1b/c~0d/4");
        assert_eq!(Accessor::root().to_string(), "<root>");
        let (parent, last) = acc.parent().expect("has parent");
        assert_eq!(parent.pointer(), "/a~1b/c~0d");
        assert_eq!(last, &PathSegment::Index(4));
        assert_eq!(acc.last_index(), Some(4));
        assert_eq!(parent.last_index(), None);
    }
}
