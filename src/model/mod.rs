//! Document model.
//!
//! This module defines the in-memory document that callers build block by
//! block and that the serializers in [`crate::render`] consume.

mod block;
mod document;
mod style;

pub use block::*;
pub use document::*;
pub use style::*;
