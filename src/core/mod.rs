//! Core types, window tables, and the planar input queue.

pub mod input_queue;
pub mod types;
pub mod window;

pub use input_queue::InputQueue;
pub use types::{PlanarBlock, Sample, TempoOptions, MAX_CHANNELS};
pub use window::{hann_window, transition_ramp};
