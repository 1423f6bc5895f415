//! Rendering synthesized units as source text.
//!
//! Records are lowered to a [`Doc`](doc::Doc) tree by `render` and laid out
//! by a Wadler-style printer that breaks groups exceeding the configured
//! width.

mod doc;
mod printer;
mod render;

pub use render::render_unit;
