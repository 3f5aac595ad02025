mod footer;
mod header;
mod mirror;
mod popup;
mod rows;

pub use footer::render_footer;
pub use header::render_header;
pub use mirror::render_mirror;
pub use popup::render_popup;
pub use rows::render_rows;
