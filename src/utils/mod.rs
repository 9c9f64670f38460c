//! Utility Module
//!
//! - [`Timer`]: frame clock with wall-time and fixed-step modes
//! - [`FpsCounter`]: frame rate measurement

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::Timer;
