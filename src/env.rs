//! Host environment detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of host the crate was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostEnvironment {
    /// A browser main thread (`wasm32-unknown-unknown`)
    Browser,
    /// Any other wasm host, such as a WASI runtime or a worker
    Wasm,
    /// A native process
    Native,
}

impl HostEnvironment {
    /// Detect the host from the compilation target.
    pub const fn detect() -> Self {
        if cfg!(all(target_arch = "wasm32", target_os = "unknown")) {
            HostEnvironment::Browser
        } else if cfg!(target_family = "wasm") {
            HostEnvironment::Wasm
        } else {
            HostEnvironment::Native
        }
    }
}

impl fmt::Display for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostEnvironment::Browser => "browser",
            HostEnvironment::Wasm => "wasm",
            HostEnvironment::Native => "native",
        };
        f.write_str(name)
    }
}

/// Whether the code runs in a browser.
pub const fn in_browser() -> bool {
    matches!(HostEnvironment::detect(), HostEnvironment::Browser)
}
