// HTML presentation adapter: the upload form and the result page.
// The JSON API in `optimizer::handlers` serves the same pipeline.

pub mod handlers;
pub mod templates;

pub use templates::build_templates;
