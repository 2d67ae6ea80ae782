mod timer;

pub use timer::{SessionEvent, SessionState, SessionTimer};
