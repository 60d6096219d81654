//! Wall-clock source for record timestamps.

use vouch_types::Timestamp;

/// Supplies the time stamped onto new verification records.
pub trait Clock: Send {
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
