//! Type-driven editor selection.
//!
//! [`Dispatcher`] maps an [`Editable`] to one of the [`EditorStrategy`]
//! variants registered in an [`EditorRegistry`]. [`EditorTree`] walks a
//! document with a dispatcher and produces the rows the terminal UI draws,
//! and [`widgets`] holds what each strategy does when the user acts on a row.

mod dispatch;
mod error;
mod strategy;
mod tree;
pub mod widgets;

use std::fmt;

use crate::domain::{ArrayType, ResolvedType, Type};

pub use dispatch::{Dispatcher, EditorRegistry};
pub use error::EditorError;
pub use strategy::{EditorStrategy, Priority};
pub use tree::{EditorRow, EditorTree, RowWidget};
pub use widgets::{Temporal, UnionSelections};

/// Rendering density of an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKind {
    /// Fits on the row next to its label.
    Inline,
    /// Occupies its own section below the label.
    Block,
}

/// What the dispatcher chooses an editor for.
#[derive(Debug, Clone, Copy)]
pub enum Editable<'a> {
    Type(&'a ResolvedType),
    /// A named slot inside an object; dispatches on its type.
    Attribute { name: &'a str, ty: &'a Type },
    /// One element's context within an array.
    ArrayIndex { index: usize, array: &'a ArrayType },
}

impl fmt::Display for Editable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Editable::Type(ty) => ty.fmt(f),
            Editable::Attribute { name, ty } => write!(f, "{name}: {ty}"),
            Editable::ArrayIndex { index, array } => {
                write!(f, "{}[{index}]", ResolvedType::Array((*array).clone()))
            }
        }
    }
}
