//! Engine-level building blocks shared by the game: countdown timers, the
//! per-frame input contract, on-screen touch controls, and frame timing.

pub mod input;
pub mod time;
pub mod timer;
pub mod touch;
