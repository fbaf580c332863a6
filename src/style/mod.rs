//! Stylesheet injection into a document head.

mod document;

pub use document::{append_css, ElementId, HeadlessDocument, StyleDocument};
