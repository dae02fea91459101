#![forbid(unsafe_code)]

//! Browser binding for the Folio drag layer.
//!
//! [`PageDrag`] (wasm32 only) wires `folio-core`'s drag controller to the live
//! document: it enrolls the configured element groups, persists the layout in
//! `window.localStorage` and applies controller commands as inline styles.
//!
//! ```js
//! import init, { PageDrag, installConsoleLogging } from "./folio_web.js";
//! await init();
//! installConsoleLogging("debug");
//! const drag = PageDrag.init();
//! ```

pub mod style;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{PageDrag, install_console_logging};
