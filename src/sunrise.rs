//! Sunrise state machine.
//!
//! [`SunriseScheduler`] is ticked once per poll period with the number of
//! seconds left until the configured sunrise completion time (or one of the
//! `demo`/`off` modes) and decides whether to start, advance or end the
//! sunrise on the strip.
//!
//! ```text
//!   remaining:  ... > start ...  start >= s > duration  duration >= s >= 0  wraps to ~24h  hold ends
//!   state:      Idle             Rising (dark)          Rising (ramping)    Rising (held)  Idle
//!   action:                      reset once             set_color/tick                     reset once
//! ```

use crate::blackbody::color_for_temperature;
use crate::controller::{ColorController, CommandSink};
use log::info;

/// Seconds in a day.
pub const DAY_SECS: i32 = 24 * 3600;

/// Number of ramp steps in a demo run.
pub const DEMO_STEPS: u32 = 60;

/// Temperature the ramp starts at, in Kelvin.
pub const RAMP_START_KELVIN: f64 = 663.0;

/// Temperature gained over a full ramp, in Kelvin.
pub const RAMP_SPAN_KELVIN: f64 = 4800.0;

/// What to do while the configuration stays on `demo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DemoPolicy {
    /// Run the demo once each time the mode switches to `demo`.
    #[default]
    OncePerEntry,
    /// Run the demo on every poll that sees `demo`.
    EveryPoll,
}

/// Timing of the daily cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SunriseSettings {
    /// Length of the ramp, ending at the configured time.
    pub sunrise_secs: u32,
    /// How long the finished sunrise stays lit.
    pub hold_secs: u32,
    /// Lead time before the ramp at which the strip is reset, so that a
    /// poll landing just before the ramp start is not missed.
    pub early_start_secs: u32,
    /// Period between polls.
    pub poll_period_secs: u32,
    pub demo_policy: DemoPolicy,
}

impl Default for SunriseSettings {
    fn default() -> Self {
        Self {
            sunrise_secs: 3600,
            hold_secs: 45,
            early_start_secs: 60,
            poll_period_secs: 5,
            demo_policy: DemoPolicy::default(),
        }
    }
}

/// Settings the scheduler cannot run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// The ramp has no length.
    ZeroSunrise,
    /// Polls would never sleep.
    ZeroPollPeriod,
    /// Early start, ramp and hold together do not fit in a day, so the
    /// countdown could never fall between hold end and the next start.
    CycleTooLong,
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingsError::ZeroSunrise => write!(f, "sunrise duration must be non-zero"),
            SettingsError::ZeroPollPeriod => write!(f, "poll period must be non-zero"),
            SettingsError::CycleTooLong => {
                write!(f, "early start, sunrise and hold must fit in a day")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SettingsError {}

/// Input for one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    /// Seconds until the sunrise completes. Negative values are read errors.
    Remaining(i32),
    /// Demo mode.
    Demo,
    /// Everything suspended.
    Off,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Unusable input; nothing changed.
    Skipped,
    /// Configuration is `off`.
    Suspended,
    /// A full demo ran and the strip was reset.
    Demo,
    /// Demo already ran for the current `demo` setting.
    DemoDone,
    /// Sunrise armed: strip reset, ramp not reached yet.
    Started,
    /// Armed, waiting for the ramp to begin.
    Waiting,
    /// Strip moved to the ramp color for `kelvin`.
    Ramped { kelvin: f64 },
    /// Sunrise finished, holding the final color.
    Holding,
    /// Hold elapsed: strip reset, back to idle.
    Finished,
    /// No sunrise in progress.
    Idle,
}

/// Ramp temperature `elapsed` seconds into a ramp of `duration` seconds.
///
/// Grows with the cube of elapsed time so the light stays dim for long and
/// brightens quickly towards the end.
pub fn ramp_temperature(elapsed: f64, duration: f64) -> f64 {
    let progress = elapsed / duration;
    progress * progress * elapsed * (RAMP_SPAN_KELVIN / duration) + RAMP_START_KELVIN
}

/// Daily sunrise state machine.
#[derive(Debug, Clone)]
pub struct SunriseScheduler {
    settings: SunriseSettings,
    duration: i32,
    start: i32,
    hold_end: i32,
    in_progress: bool,
    demo_armed: bool,
}

impl SunriseScheduler {
    /// Checks that the daily cycle fits in a day and both periods are non-zero.
    pub fn new(settings: SunriseSettings) -> Result<Self, SettingsError> {
        if settings.sunrise_secs == 0 {
            return Err(SettingsError::ZeroSunrise);
        }
        if settings.poll_period_secs == 0 {
            return Err(SettingsError::ZeroPollPeriod);
        }

        let cycle = u64::from(settings.sunrise_secs)
            + u64::from(settings.early_start_secs)
            + u64::from(settings.hold_secs);
        if cycle >= DAY_SECS as u64 {
            return Err(SettingsError::CycleTooLong);
        }

        // All three are below DAY_SECS after the check above.
        let duration = settings.sunrise_secs as i32;
        let start = duration + settings.early_start_secs as i32;
        let hold_end = DAY_SECS - settings.hold_secs as i32;

        Ok(Self {
            settings,
            duration,
            start,
            hold_end,
            in_progress: false,
            demo_armed: true,
        })
    }

    pub fn settings(&self) -> &SunriseSettings {
        &self.settings
    }

    /// Whether a sunrise is armed, ramping or holding.
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Evaluates one poll.
    ///
    /// Rules are checked in order and a single tick may both arm and ramp
    /// (when the first poll already falls inside the ramp).
    pub fn tick<S: CommandSink>(
        &mut self,
        controller: &mut ColorController<S>,
        poll: Poll,
    ) -> Result<TickOutcome, S::Error> {
        let remaining = match poll {
            Poll::Demo => return self.demo_tick(controller),
            Poll::Off => {
                self.demo_armed = true;
                return Ok(TickOutcome::Suspended);
            }
            Poll::Remaining(secs) if secs < 0 => return Ok(TickOutcome::Skipped),
            Poll::Remaining(secs) => secs,
        };
        self.demo_armed = true;

        let (duration, start, hold_end) = (self.duration, self.start, self.hold_end);

        let mut outcome = if self.in_progress {
            TickOutcome::Waiting
        } else {
            TickOutcome::Idle
        };

        if remaining <= start && !self.in_progress {
            info!("sunrise starting, {remaining}s to go; resetting strip");
            controller.reset_color()?;
            self.in_progress = true;
            outcome = TickOutcome::Started;
        }

        if remaining <= duration && self.in_progress {
            let kelvin = ramp_temperature(f64::from(duration - remaining), f64::from(duration));
            controller.set_color(color_for_temperature(kelvin))?;
            return Ok(TickOutcome::Ramped { kelvin });
        }

        if remaining > hold_end {
            return Ok(if self.in_progress {
                TickOutcome::Holding
            } else {
                outcome
            });
        }

        if remaining > start && self.in_progress {
            info!("hold elapsed; turning strip off");
            controller.reset_color()?;
            self.in_progress = false;
            return Ok(TickOutcome::Finished);
        }

        Ok(outcome)
    }

    /// Runs the demo ramp and resets the strip.
    ///
    /// Blocks for the whole demo; the sunrise state is not touched.
    pub fn run_demo<S: CommandSink>(
        &self,
        controller: &mut ColorController<S>,
    ) -> Result<TickOutcome, S::Error> {
        info!("starting demo");
        let duration = f64::from(DEMO_STEPS);
        for step in 0..DEMO_STEPS {
            let kelvin = ramp_temperature(f64::from(step), duration);
            controller.set_color(color_for_temperature(kelvin))?;
        }

        info!("demo complete, resetting color");
        controller.reset_color()?;
        Ok(TickOutcome::Demo)
    }

    fn demo_tick<S: CommandSink>(
        &mut self,
        controller: &mut ColorController<S>,
    ) -> Result<TickOutcome, S::Error> {
        match self.settings.demo_policy {
            DemoPolicy::EveryPoll => self.run_demo(controller),
            DemoPolicy::OncePerEntry if self.demo_armed => {
                self.demo_armed = false;
                self.run_demo(controller)
            }
            DemoPolicy::OncePerEntry => Ok(TickOutcome::DemoDone),
        }
    }
}
