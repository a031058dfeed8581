mod countdown;
mod engine;
mod mode;

pub use countdown::{Completion, TimerState};
pub use engine::{EngineExit, TimerEngine};
pub use mode::TimerMode;
