mod clock;
mod scheduler;
mod screen_time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::Scheduler;
pub use screen_time::{format_remaining, remaining_seconds, GateState, ScreenTimeGate};
