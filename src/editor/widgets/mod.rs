//! What each editor does when the user acts on its row.
//!
//! Widgets never hold the value they edit: they read it through the row's
//! accessor and write the result back through the same accessor.

pub mod array;
pub mod color;
pub mod guid;
pub mod temporal;
pub mod text;
mod union;

use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;

use crate::document::{Accessor, Document};

use super::{EditorError, EditorRow, RowWidget};

pub use temporal::Temporal;
pub use union::{Selection, UnionSelections};

/// Apply an editing key to the focused row. Returns whether the document
/// changed.
pub fn handle_key(
    doc: &mut Document,
    row: &EditorRow,
    key: &KeyEvent,
) -> Result<bool, EditorError> {
    let accessor = &row.accessor;
    match (&row.widget, key.code) {
        (RowWidget::Temporal(temporal), KeyCode::Left | KeyCode::Right) => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            replace_text(doc, accessor, |text| temporal.step(text, delta))
        }
        (RowWidget::Color, KeyCode::Left | KeyCode::Right) => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            replace_text(doc, accessor, |text| Ok(color::step(text, delta)))
        }
        (
            RowWidget::Text(_) | RowWidget::Temporal(_) | RowWidget::Color | RowWidget::Guid,
            _,
        ) => edit_text(doc, accessor, key),
        _ => Ok(false),
    }
}

/// Store a freshly generated GUID in a GUID row.
pub fn generate_guid(doc: &mut Document, row: &EditorRow) -> Result<String, EditorError> {
    if row.widget != RowWidget::Guid {
        return Err(EditorError::unsupported("GUID generation", row.title()));
    }
    let guid = guid::generate();
    row.accessor.set(doc, Value::String(guid.clone()))?;
    Ok(guid)
}

fn edit_text(doc: &mut Document, accessor: &Accessor, key: &KeyEvent) -> Result<bool, EditorError> {
    let mut buffer = text::text_of(accessor.get(doc)?);
    if !text::edit_buffer(&mut buffer, key) {
        return Ok(false);
    }
    accessor.set(doc, Value::String(buffer))?;
    Ok(true)
}

fn replace_text(
    doc: &mut Document,
    accessor: &Accessor,
    next: impl FnOnce(&str) -> Result<String, EditorError>,
) -> Result<bool, EditorError> {
    let current = text::text_of(accessor.get(doc)?);
    let updated = next(&current)?;
    if updated == current {
        return Ok(false);
    }
    accessor.set(doc, Value::String(updated))?;
    Ok(true)
}
