#![deny(rust_2018_idioms)]

pub mod app;
pub mod document;
pub mod domain;
pub mod editor;
pub mod io;
pub mod logging;
mod presentation;

pub use app::{Session, SessionParams, TymlUI, UiOptions};
pub use document::{AccessError, Accessor, Document};
pub use domain::{ArrayDefault, InstantiateOptions, Type, TypeError, TypeRegistry};
pub use editor::{Dispatcher, EditorKind, EditorRegistry, EditorStrategy};
pub use io::{
    DocumentFormat,
    output::{OutputDestination, OutputOptions},
};

pub mod prelude {
    pub use super::{
        Accessor, Document, DocumentFormat, OutputDestination, OutputOptions, SessionParams,
        Type, TypeRegistry, TymlUI, UiOptions,
    };
}
