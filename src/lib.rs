#[cfg(feature = "desktop")]
pub mod camera;
pub mod canvas;
pub mod config;
pub mod gesture;
pub mod hand;
pub mod orchestrator;
#[cfg(feature = "desktop")]
pub mod render;
pub mod tracker;

pub use orchestrator::{Control, FrameOrchestrator, FrameReport};
