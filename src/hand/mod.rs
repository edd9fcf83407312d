#[cfg(feature = "desktop")]
pub mod detector;
pub mod geometry;
pub mod landmark;
#[cfg(feature = "desktop")]
pub mod preprocess;

#[cfg(feature = "desktop")]
pub use detector::HandDetector;
pub use geometry::{
    draw_point, extended_finger_count, hand_surface, is_pinching, pinch_distance, HandSurface,
    DEFAULT_PINCH_THRESHOLD,
};
pub use landmark::{
    HandLandmarks, Landmark, LandmarkIndex, MalformedLandmarks, NormalizedPoint, PixelPoint,
};
