pub mod slots;
pub mod stroke;

pub use slots::{Assignment, SlotAssigner};
pub use stroke::{Brush, HandSlot, StrokeTracker};
