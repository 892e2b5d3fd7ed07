//! AI-Idle simulation engine for the browser (wasm32) and native hosts.

pub mod console;
pub mod format;
pub mod idle;
pub mod time;
