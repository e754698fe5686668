// The binary in main.rs drives the terminal; everything it needs lives here so
// integration tests and benches can reach the same types.

pub mod app;
pub mod assistant;
pub mod config;
pub mod content;
pub mod engine;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
