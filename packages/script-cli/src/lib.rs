#![deny(clippy::all)]

/**
 * Sharp Script CLI
 *
 * Host for the script engine: renders template files and evaluates single
 * expressions against JSON arguments
 */
pub use sharp_script as script;

pub mod inputs;
pub mod logging;
pub mod render;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
