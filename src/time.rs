//! Time abstractions: wall-clock time of day and microsecond delays.

use chrono::NaiveTime;

/// Trait for abstracting the local wall clock.
pub trait Clock {
    /// Returns the current local time of day.
    fn now(&self) -> NaiveTime;
}

/// System local time via `chrono`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

#[cfg(feature = "std")]
impl Clock for LocalClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

#[cfg(feature = "std")]
pub use spin::SpinDelay;

#[cfg(feature = "std")]
mod spin {
    use embedded_hal::delay::DelayNs;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Waits at or below this length are spun entirely.
    const SPIN_ONLY: Duration = Duration::from_millis(2);

    /// Tail of longer waits that is spun instead of slept.
    const SPIN_TAIL: Duration = Duration::from_millis(1);

    /// Microsecond-accurate delay for a non-realtime OS.
    ///
    /// `thread::sleep` routinely overshoots by tens of microseconds, more than
    /// the receiver tolerates on a 500 µs bit cell. Short waits are therefore
    /// busy-waited, and long ones sleep for all but the last millisecond.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SpinDelay;

    impl SpinDelay {
        pub fn new() -> Self {
            Self
        }

        fn wait(duration: Duration) {
            let start = Instant::now();

            if duration > SPIN_ONLY {
                thread::sleep(duration - SPIN_TAIL);
            }

            while start.elapsed() < duration {
                std::hint::spin_loop();
            }
        }
    }

    impl DelayNs for SpinDelay {
        fn delay_ns(&mut self, ns: u32) {
            Self::wait(Duration::from_nanos(u64::from(ns)));
        }

        fn delay_us(&mut self, us: u32) {
            Self::wait(Duration::from_micros(u64::from(us)));
        }

        fn delay_ms(&mut self, ms: u32) {
            Self::wait(Duration::from_millis(u64::from(ms)));
        }
    }

}
