pub(crate) mod input;
pub(crate) mod keymap;
mod options;
mod params;
mod popup;
mod runtime;
mod status;
mod terminal;
mod tymlui;
mod validation;

pub use input::KeyAction;
pub use options::UiOptions;
pub use params::SessionParams;
pub use tymlui::{Session, TymlUI};
pub use validation::{ValidationOutcome, validate_document};
