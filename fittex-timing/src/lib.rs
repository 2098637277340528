pub mod timer;

pub use timer::{ManualTimer, Timer, WallClockTimer};
