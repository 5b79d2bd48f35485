//! The polling loop tying store, clock and scheduler together.

use crate::controller::{ColorController, CommandSink};
use crate::store::ConfigStore;
use crate::sunrise::{SunriseScheduler, TickOutcome};
use crate::time::Clock;
use core::fmt::Debug;
use log::{debug, error};
use std::thread;
use std::time::Duration;

/// Runs the daily sunrise against a configuration file.
pub struct Daemon<S, C> {
    controller: ColorController<S>,
    scheduler: SunriseScheduler,
    store: ConfigStore,
    clock: C,
}

impl<S, C> Daemon<S, C>
where
    S: CommandSink,
    S::Error: Debug,
    C: Clock,
{
    pub fn new(
        controller: ColorController<S>,
        scheduler: SunriseScheduler,
        store: ConfigStore,
        clock: C,
    ) -> Self {
        Self {
            controller,
            scheduler,
            store,
            clock,
        }
    }

    /// Reads the store and feeds one tick to the scheduler.
    ///
    /// An unreadable or malformed store is logged and the tick skipped, with
    /// no state touched.
    pub fn poll_once(&mut self) -> Result<TickOutcome, S::Error> {
        let config = match self.store.read() {
            Ok(config) => config,
            Err(err) => {
                error!("{err}");
                return Ok(TickOutcome::Skipped);
            }
        };

        let poll = config.poll(self.clock.now());
        let outcome = self.scheduler.tick(&mut self.controller, poll)?;
        debug!("{poll:?} -> {outcome:?}");
        Ok(outcome)
    }

    /// Polls forever, sleeping one poll period before every poll.
    ///
    /// Transmission errors are logged; the next poll retries.
    pub fn run(&mut self) -> ! {
        let period = Duration::from_secs(u64::from(self.scheduler.settings().poll_period_secs));
        loop {
            thread::sleep(period);
            if let Err(err) = self.poll_once() {
                error!("command transmission failed: {err:?}");
            }
        }
    }

    pub fn controller(&self) -> &ColorController<S> {
        &self.controller
    }

    pub fn scheduler(&self) -> &SunriseScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }
}
