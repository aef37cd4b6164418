//! Voice App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the browser adapters into a `VoiceSession` and exports it
//! to the JavaScript presentation layer as `VoiceAgent`.

mod app;

pub use app::VoiceAgent;

use wasm_bindgen::prelude::*;

/// WASM entry point, runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Voice agent WASM starting...");
}
