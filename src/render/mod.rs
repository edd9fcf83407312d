pub mod skeleton;
pub mod window;

pub use skeleton::HAND_CONNECTIONS;
pub use window::MinifbRenderer;
