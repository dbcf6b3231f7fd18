//! Platform layer
//!
//! The simulation never touches the host. Drivers own the frame clock,
//! forward pointer/keyboard input, persist settings and scores, and answer
//! leaderboard requests from the event outbox.
//!
//! - `web`: wasm-bindgen driver for the browser (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;
