pub mod hit_window;
pub mod scroll;

pub use hit_window::{HitWindows, WindowEntry, WindowOutcome};
pub use scroll::{ScrollMapper, TimelineMapper, position};
