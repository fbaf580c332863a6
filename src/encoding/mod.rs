//! Byte-to-text decoding.

mod utf8;

pub use utf8::{decode_utf8, decode_utf8_to_string, REPLACEMENT_CHARACTER};
