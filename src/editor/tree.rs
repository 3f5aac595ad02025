use serde_json::Value;

use crate::{
    document::{AccessError, Accessor, Document},
    domain::{ArrayType, ObjectType, ResolvedType, StringType, Type, UnionType, type_to_string},
};

use super::{
    Dispatcher, Editable, EditorError, EditorKind, EditorStrategy,
    widgets::{self, Temporal, UnionSelections, color, text},
};

/// What a row lets the user do.
#[derive(Debug, Clone, PartialEq)]
pub enum RowWidget {
    /// Label of a block editor; its content follows one level deeper.
    Heading,
    Text(StringType),
    Unset,
    /// Alternative selector of a union slot.
    Choice { union: UnionType, selected: usize },
    /// "Add T" action at the end of an array.
    Append(ArrayType),
    /// Title of a block array element.
    Element { index: usize, array: ArrayType },
    Temporal(Temporal),
    Color,
    Guid,
    /// Diagnostic row: no editor applies or the value has the wrong shape.
    Missing,
}

/// One focusable line of the form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorRow {
    pub strategy: EditorStrategy,
    pub widget: RowWidget,
    /// Slot the widget reads and writes.
    pub accessor: Accessor,
    pub label: Option<String>,
    pub depth: usize,
    pub display: String,
    pub error: Option<String>,
}

impl EditorRow {
    fn new(strategy: EditorStrategy, widget: RowWidget, accessor: Accessor, depth: usize) -> Self {
        Self {
            strategy,
            widget,
            accessor,
            label: None,
            depth,
            display: String::new(),
            error: None,
        }
    }

    fn labeled(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    fn showing(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn kind(&self) -> EditorKind {
        self.strategy.kind()
    }

    /// Label, or the displayed text for unlabeled rows.
    pub fn title(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.display.clone())
    }

    pub fn accepts_text(&self) -> bool {
        matches!(
            self.widget,
            RowWidget::Text(_) | RowWidget::Temporal(_) | RowWidget::Color | RowWidget::Guid
        )
    }
}

/// Flat list of editor rows for the current document.
///
/// The tree is derived data: it is rebuilt from the document after every
/// edit and never written to directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorTree {
    rows: Vec<EditorRow>,
    revision: u64,
}

impl EditorTree {
    /// Walk the document from the root with the dispatcher.
    ///
    /// Attribute slots missing from the document are created as `null` on the
    /// way, without counting as an edit.
    pub fn build<'t>(
        doc: &mut Document,
        dispatcher: Dispatcher<'t>,
        selections: &mut UnionSelections,
        root: &'t Type,
    ) -> Result<Self, EditorError> {
        let mut builder = Builder {
            dispatcher,
            doc,
            selections,
            rows: Vec::new(),
        };
        builder.visit(root, Accessor::root(), None, 0)?;
        let Builder { doc, rows, .. } = builder;
        Ok(Self {
            rows,
            revision: doc.revision(),
        })
    }

    pub fn rows(&self) -> &[EditorRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&EditorRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Document revision the rows were built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|row| row.error.is_some()).count()
    }

    /// Index of the row showing `accessor` with the given label.
    pub fn find(&self, accessor: &Accessor, label: Option<&str>) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| &row.accessor == accessor && row.label.as_deref() == label)
    }

    /// The array a row belongs to: the array itself for its heading and "Add"
    /// rows, else the array holding the innermost element on the row's path.
    pub fn owning_array(&self, index: usize) -> Option<(&Accessor, &ArrayType)> {
        let row = self.rows.get(index)?;
        match &row.widget {
            RowWidget::Append(array) => return Some((&row.accessor, array)),
            RowWidget::Heading if row.strategy == EditorStrategy::Array => {
                return self.append_row(&row.accessor);
            }
            _ => {}
        }
        let (array, _) = widgets::array::owning_element(&row.accessor)?;
        self.append_row(&array)
    }

    /// Innermost array element a row is part of.
    pub fn owning_element(&self, index: usize) -> Option<(Accessor, usize)> {
        let row = self.rows.get(index)?;
        if matches!(row.widget, RowWidget::Append(_)) {
            return None;
        }
        widgets::array::owning_element(&row.accessor)
    }

    fn append_row(&self, array: &Accessor) -> Option<(&Accessor, &ArrayType)> {
        self.rows.iter().find_map(|row| match &row.widget {
            RowWidget::Append(ty) if &row.accessor == array => Some((&row.accessor, ty)),
            _ => None,
        })
    }
}

struct Builder<'t, 'd> {
    dispatcher: Dispatcher<'t>,
    doc: &'d mut Document,
    selections: &'d mut UnionSelections,
    rows: Vec<EditorRow>,
}

impl<'t> Builder<'t, '_> {
    fn visit(
        &mut self,
        ty: &'t Type,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        let resolved = self.dispatcher.types().resolve(ty)?;
        let strategy = self.dispatcher.choose(Editable::Type(resolved), None)?;
        self.emit(strategy, resolved, accessor, label, depth)
    }

    fn emit(
        &mut self,
        strategy: EditorStrategy,
        resolved: &'t ResolvedType,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        match (strategy, resolved) {
            (EditorStrategy::Object, ResolvedType::Object(object)) => {
                self.object(object, accessor, label, depth)
            }
            (EditorStrategy::SimpleObjectInline, ResolvedType::Object(object)) => {
                self.simple_object(object, accessor, label, depth)
            }
            (
                EditorStrategy::Date
                | EditorStrategy::Time
                | EditorStrategy::DateTime
                | EditorStrategy::Color
                | EditorStrategy::Guid,
                ResolvedType::Object(object),
            ) => self.wrapped(strategy, object, accessor, label, depth),
            (
                EditorStrategy::UnionBlock | EditorStrategy::UnionInline,
                ResolvedType::Union(union),
            ) => self.union(strategy, union, accessor, label, depth),
            (EditorStrategy::Array, ResolvedType::Array(array)) => {
                self.array(array, accessor, label, depth)
            }
            (EditorStrategy::String, ResolvedType::String(string)) => {
                let text = text::text_of(accessor.get(self.doc)?);
                let error = text::regex_error(label.as_deref().unwrap_or("String"), string, &text);
                self.rows.push(
                    EditorRow::new(strategy, RowWidget::Text(string.clone()), accessor, depth)
                        .labeled(label)
                        .showing(text)
                        .with_error(error),
                );
                Ok(())
            }
            (EditorStrategy::NotSet, ResolvedType::NotSet) => {
                self.rows.push(
                    EditorRow::new(strategy, RowWidget::Unset, accessor, depth)
                        .labeled(label)
                        .showing("not set"),
                );
                Ok(())
            }
            (_, resolved) => {
                self.missing(Editable::Type(resolved), accessor, label, depth);
                Ok(())
            }
        }
    }

    fn object(
        &mut self,
        object: &'t ObjectType,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        let depth = self.heading(EditorStrategy::Object, &accessor, label, &object.name, depth);
        if !self.expect_object(EditorStrategy::Object, &accessor, depth)? {
            return Ok(());
        }
        for attr in &object.attributes {
            let child = accessor.attribute(self.doc, &attr.name)?;
            let strategy = self.dispatcher.choose(
                Editable::Attribute {
                    name: &attr.name,
                    ty: &attr.ty,
                },
                None,
            )?;
            let resolved = self.dispatcher.types().resolve(&attr.ty)?;
            self.emit(strategy, resolved, child, Some(attr.name.clone()), depth)?;
        }
        Ok(())
    }

    fn simple_object(
        &mut self,
        object: &'t ObjectType,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        let strategy = EditorStrategy::SimpleObjectInline;
        let Some(attr) = object.attributes.first() else {
            let object = ResolvedType::Object(object.clone());
            self.missing(Editable::Type(&object), accessor, label, depth);
            return Ok(());
        };
        let ResolvedType::String(string) = self.dispatcher.types().resolve(&attr.ty)? else {
            let editable = Editable::Attribute {
                name: &attr.name,
                ty: &attr.ty,
            };
            self.missing(editable, accessor, label, depth);
            return Ok(());
        };
        if !self.expect_object(strategy, &accessor, depth)? {
            return Ok(());
        }
        let child = accessor.attribute(self.doc, &attr.name)?;
        let label = label.unwrap_or_else(|| attr.name.clone());
        let text = text::text_of(child.get(self.doc)?);
        let error = text::regex_error(&label, string, &text);
        self.rows.push(
            EditorRow::new(strategy, RowWidget::Text(string.clone()), child, depth)
                .labeled(Some(label))
                .showing(text)
                .with_error(error),
        );
        Ok(())
    }

    /// Date, time, date-time, color and GUID wrappers: an object whose single
    /// `value` attribute holds the encoded string.
    fn wrapped(
        &mut self,
        strategy: EditorStrategy,
        object: &'t ObjectType,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        let Some(attr) = object.attribute("value").or(object.attributes.first()) else {
            let object = ResolvedType::Object(object.clone());
            self.missing(Editable::Type(&object), accessor, label, depth);
            return Ok(());
        };
        if !self.expect_object(strategy, &accessor, depth)? {
            return Ok(());
        }
        let child = accessor.attribute(self.doc, &attr.name)?;
        let label = label.unwrap_or_else(|| object.name.clone());
        let text = text::text_of(child.get(self.doc)?);
        let widget = match strategy {
            EditorStrategy::Date => RowWidget::Temporal(Temporal::Date),
            EditorStrategy::Time => RowWidget::Temporal(Temporal::Time),
            EditorStrategy::DateTime => RowWidget::Temporal(Temporal::DateTime),
            EditorStrategy::Color => RowWidget::Color,
            _ => RowWidget::Guid,
        };
        let format_error = match &widget {
            RowWidget::Temporal(temporal) => temporal
                .check(&text)
                .err()
                .map(|_| format!("Invalid {label}: expected {}", temporal.expected())),
            RowWidget::Color => color::check(&text)
                .err()
                .map(|_| format!("Invalid {label}: expected #rrggbb")),
            _ => None,
        };
        let error = match self.dispatcher.types().resolve(&attr.ty)? {
            ResolvedType::String(string) => text::regex_error(&label, string, &text),
            _ => None,
        }
        .or(format_error);
        self.rows.push(
            EditorRow::new(strategy, widget, child, depth)
                .labeled(Some(label))
                .showing(text)
                .with_error(error),
        );
        Ok(())
    }

    fn union(
        &mut self,
        strategy: EditorStrategy,
        union: &'t UnionType,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        let (choice_label, depth) = if strategy == EditorStrategy::UnionBlock {
            let depth = self.heading(strategy, &accessor, label, &union.name, depth);
            (format!("Choose a type for {}", union.name), depth)
        } else {
            (label.unwrap_or_else(|| union.name.clone()), depth)
        };
        let value = accessor.get(self.doc)?;
        let selection = self
            .selections
            .select(self.dispatcher.types(), &accessor, union, value)?;
        let Some(alternative) = union.alternatives.get(selection.index) else {
            let union = ResolvedType::Union(union.clone());
            self.missing(Editable::Type(&union), accessor, Some(choice_label), depth);
            return Ok(());
        };
        self.rows.push(
            EditorRow::new(
                strategy,
                RowWidget::Choice {
                    union: union.clone(),
                    selected: selection.index,
                },
                accessor.clone(),
                depth,
            )
            .labeled(Some(choice_label))
            .showing(type_to_string(alternative))
            .with_error(selection.error),
        );
        let alternative_depth = if strategy == EditorStrategy::UnionBlock {
            depth
        } else {
            depth + 1
        };
        self.visit(alternative, accessor, None, alternative_depth)
    }

    fn array(
        &mut self,
        array: &'t ArrayType,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) -> Result<(), EditorError> {
        let title = ResolvedType::Array(array.clone()).to_string();
        let depth = self.heading(EditorStrategy::Array, &accessor, label, &title, depth);
        let len = match accessor.get(self.doc)? {
            Value::Array(items) => items.len(),
            _ => {
                let err = AccessError::NotAnArray(accessor.pointer());
                self.rows.push(
                    EditorRow::new(EditorStrategy::Array, RowWidget::Missing, accessor, depth)
                        .with_error(Some(err.to_string())),
                );
                return Ok(());
            }
        };
        for index in 0..len {
            let element = accessor.element(index);
            let strategy = self
                .dispatcher
                .choose(Editable::ArrayIndex { index, array }, None)?;
            let element_title = format!("{}. {}", index + 1, array.of);
            match strategy {
                EditorStrategy::ArrayElementInline => {
                    self.visit(&array.of, element, Some(element_title), depth)?;
                }
                EditorStrategy::ArrayElement => {
                    self.rows.push(
                        EditorRow::new(
                            strategy,
                            RowWidget::Element {
                                index,
                                array: array.clone(),
                            },
                            element.clone(),
                            depth,
                        )
                        .labeled(Some(element_title)),
                    );
                    self.visit(&array.of, element, None, depth + 1)?;
                }
                _ => self.missing(
                    Editable::ArrayIndex { index, array },
                    element,
                    Some(element_title),
                    depth,
                ),
            }
        }
        self.rows.push(
            EditorRow::new(
                EditorStrategy::Array,
                RowWidget::Append(array.clone()),
                accessor,
                depth,
            )
            .showing(format!("Add {}", array.of)),
        );
        Ok(())
    }

    /// Heading row for a labeled block editor. Returns the depth its content
    /// goes to.
    fn heading(
        &mut self,
        strategy: EditorStrategy,
        accessor: &Accessor,
        label: Option<String>,
        type_name: &str,
        depth: usize,
    ) -> usize {
        match label {
            Some(label) => {
                self.rows.push(
                    EditorRow::new(strategy, RowWidget::Heading, accessor.clone(), depth)
                        .labeled(Some(label))
                        .showing(type_name),
                );
                depth + 1
            }
            None => depth,
        }
    }

    /// Whether the slot holds an object. Otherwise a diagnostic row is added.
    fn expect_object(
        &mut self,
        strategy: EditorStrategy,
        accessor: &Accessor,
        depth: usize,
    ) -> Result<bool, EditorError> {
        if accessor.get(self.doc)?.is_object() {
            return Ok(true);
        }
        let err = AccessError::NotAnObject(accessor.pointer());
        self.rows.push(
            EditorRow::new(strategy, RowWidget::Missing, accessor.clone(), depth)
                .with_error(Some(err.to_string())),
        );
        Ok(false)
    }

    fn missing(
        &mut self,
        editable: Editable<'_>,
        accessor: Accessor,
        label: Option<String>,
        depth: usize,
    ) {
        self.rows.push(
            EditorRow::new(EditorStrategy::NoEditor, RowWidget::Missing, accessor, depth)
                .labeled(label)
                .showing(format!("Error: Could not find Editor for {editable}")),
        );
    }
}
