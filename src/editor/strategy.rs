use std::fmt;

use crate::domain::{ResolvedType, TypeError};

use super::{Editable, EditorKind, dispatch::Dispatcher};

pub type Priority = u8;

/// The closed set of editors a value can be shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorStrategy {
    Object,
    SimpleObjectInline,
    UnionBlock,
    UnionInline,
    Array,
    String,
    NotSet,
    ArrayElement,
    ArrayElementInline,
    Date,
    DateTime,
    Time,
    Color,
    Guid,
    /// Placeholder used when nothing else applies; renders a diagnostic.
    NoEditor,
}

impl EditorStrategy {
    pub const DEFAULT_ORDER: [EditorStrategy; 14] = [
        EditorStrategy::Object,
        EditorStrategy::SimpleObjectInline,
        EditorStrategy::UnionBlock,
        EditorStrategy::UnionInline,
        EditorStrategy::Array,
        EditorStrategy::String,
        EditorStrategy::NotSet,
        EditorStrategy::ArrayElement,
        EditorStrategy::ArrayElementInline,
        EditorStrategy::Date,
        EditorStrategy::DateTime,
        EditorStrategy::Time,
        EditorStrategy::Color,
        EditorStrategy::Guid,
    ];

    pub fn kind(self) -> EditorKind {
        match self {
            EditorStrategy::Object
            | EditorStrategy::UnionBlock
            | EditorStrategy::Array
            | EditorStrategy::ArrayElement => EditorKind::Block,
            EditorStrategy::SimpleObjectInline
            | EditorStrategy::UnionInline
            | EditorStrategy::String
            | EditorStrategy::NotSet
            | EditorStrategy::ArrayElementInline
            | EditorStrategy::Date
            | EditorStrategy::DateTime
            | EditorStrategy::Time
            | EditorStrategy::Color
            | EditorStrategy::Guid
            | EditorStrategy::NoEditor => EditorKind::Inline,
        }
    }

    /// Priority with which this strategy can show `editable`, `None` when it
    /// cannot.
    pub fn can_edit(
        self,
        editable: Editable<'_>,
        dispatcher: &Dispatcher<'_>,
    ) -> Result<Option<Priority>, TypeError> {
        let priority = match (self, editable) {
            (EditorStrategy::NoEditor, _) => Some(0),
            (EditorStrategy::String, Editable::Type(ResolvedType::String(_))) => Some(1),
            (EditorStrategy::NotSet, Editable::Type(ResolvedType::NotSet)) => Some(1),
            (EditorStrategy::Array, Editable::Type(ResolvedType::Array(_))) => Some(1),
            (EditorStrategy::Object, Editable::Type(ResolvedType::Object(_))) => Some(1),
            (EditorStrategy::UnionBlock, Editable::Type(ResolvedType::Union(_))) => Some(1),
            (EditorStrategy::UnionInline, Editable::Type(ResolvedType::Union(union))) => {
                let mut every_inline = true;
                for alternative in &union.alternatives {
                    if !dispatcher.has_inline_editor(alternative)? {
                        every_inline = false;
                        break;
                    }
                }
                every_inline.then_some(2)
            }
            (EditorStrategy::ArrayElement, Editable::ArrayIndex { .. }) => Some(1),
            (EditorStrategy::ArrayElementInline, Editable::ArrayIndex { array, .. }) => {
                dispatcher.has_inline_editor(&array.of)?.then_some(2)
            }
            (EditorStrategy::SimpleObjectInline, Editable::Type(ResolvedType::Object(object))) => {
                match object.attributes.as_slice() {
                    [only] => matches!(
                        dispatcher.types().resolve(&only.ty)?,
                        ResolvedType::String(_)
                    )
                    .then_some(2),
                    _ => None,
                }
            }
            (named, Editable::Type(ResolvedType::Object(object))) => named
                .wrapped_name()
                .filter(|name| *name == object.name)
                .map(|_| 3),
            _ => None,
        };
        Ok(priority)
    }

    /// Object type name the specialized primitive editors are bound to.
    pub fn wrapped_name(self) -> Option<&'static str> {
        match self {
            EditorStrategy::Date => Some("Date"),
            EditorStrategy::DateTime => Some("DateTime"),
            EditorStrategy::Time => Some("Time"),
            EditorStrategy::Color => Some("Color"),
            EditorStrategy::Guid => Some("GUID"),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EditorStrategy::Object => "object",
            EditorStrategy::SimpleObjectInline => "simple-object",
            EditorStrategy::UnionBlock => "union",
            EditorStrategy::UnionInline => "union-inline",
            EditorStrategy::Array => "array",
            EditorStrategy::String => "string",
            EditorStrategy::NotSet => "not-set",
            EditorStrategy::ArrayElement => "array-element",
            EditorStrategy::ArrayElementInline => "array-element-inline",
            EditorStrategy::Date => "date",
            EditorStrategy::DateTime => "date-time",
            EditorStrategy::Time => "time",
            EditorStrategy::Color => "color",
            EditorStrategy::Guid => "guid",
            EditorStrategy::NoEditor => "no-editor",
        }
    }
}

impl fmt::Display for EditorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
