//! Platepress WASM - WebAssembly bindings for Platepress
//!
//! This crate exposes platepress-core compression to JavaScript/TypeScript
//! so uploads can be shrunk in the browser before they leave the device.
//!
//! # Module Structure
//!
//! - `compress` - `compress_image` and the file naming helpers
//! - `types` - WASM-compatible wrapper types for options and results
//! - `console` - Reporter that logs progress to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_image } from '@platepress/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, file.type, { debug: true });
//! console.log(`${bytes.length} -> ${result.byte_length} bytes`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod console;
mod types;

// Re-export public types
pub use compress::{compress_image, jpeg_file_name, storage_object_name};
pub use console::ConsoleReporter;
pub use types::{JsCompressOptions, JsCompressedImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
