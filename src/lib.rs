//! Toolbelt - small browser-style helpers
//!
//! Independent utilities: a permissive UTF-8 decoder, debounce and throttle
//! wrappers on a pluggable timer, animation-frame shims, number/time/date
//! formatting, key/value persistence with a cookie fallback and stylesheet
//! injection.

pub mod collection;
pub mod config;
pub mod encoding;
pub mod env;
pub mod error;
pub mod format;
pub mod storage;
pub mod style;
pub mod timing;

pub use encoding::{decode_utf8, decode_utf8_to_string};
pub use env::{in_browser, HostEnvironment};
pub use error::{Result, ToolbeltError};
pub use timing::{debounce, throttle, Debounce, Invocation, Throttle, ThrottleOptions};
