//! Raspberry Pi backend: GPIO through `rppal`, realtime scheduling through
//! `sched_setscheduler`.

use crate::protocol::SchedulingPriority;
use log::warn;
use rppal::gpio::{Gpio, OutputPin};

/// Highest realtime priority requested while a frame is on the wire.
const REALTIME_PRIORITY: libc::c_int = 99;

/// Claims BCM pin `bcm` as an output, driven high (receiver idle).
pub fn open_pin(bcm: u8) -> Result<OutputPin, rppal::gpio::Error> {
    Ok(Gpio::new()?.get(bcm)?.into_output_high())
}

/// Switches the calling thread to `SCHED_RR` for the length of a frame.
///
/// Needs `CAP_SYS_NICE`; without it frames go out at normal priority and a
/// single warning is logged.
#[derive(Debug, Default)]
pub struct RealtimePriority {
    warned: bool,
}

impl RealtimePriority {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(policy: libc::c_int, priority: libc::c_int) -> bool {
        // SAFETY: sched_param is plain old data; zeroed is a valid value.
        let mut param: libc::sched_param = unsafe { core::mem::zeroed() };
        param.sched_priority = priority;
        // SAFETY: pid 0 targets the calling thread; `param` outlives the call.
        unsafe { libc::sched_setscheduler(0, policy, &param) == 0 }
    }
}

impl SchedulingPriority for RealtimePriority {
    fn raise(&mut self) {
        // SAFETY: no preconditions.
        let max = unsafe { libc::sched_get_priority_max(libc::SCHED_RR) };
        if !Self::set(libc::SCHED_RR, REALTIME_PRIORITY.min(max)) && !self.warned {
            warn!(
                "could not raise scheduling priority: {}; bit timing may jitter",
                std::io::Error::last_os_error()
            );
            self.warned = true;
        }
    }

    fn restore(&mut self) {
        Self::set(libc::SCHED_OTHER, 0);
    }
}
