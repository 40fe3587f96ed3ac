//! Platform layer
//!
//! Browser bridge exposing the engine to a JavaScript host. Native builds
//! drive the engine directly (see the `parachute-drop` binary).

#[cfg(target_arch = "wasm32")]
pub mod web;
