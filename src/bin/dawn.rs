//! `dawn`: sunrise alarm for an IR-remote RGB strip on a Raspberry Pi.
//!
//! ```text
//! dawn            run forever
//! dawn 06:30      set sunrise completion time ("demo" and "off" also accepted)
//! ```

use anyhow::Context;
use dawn::cli::{Invocation, USAGE, pin_from_env, set_sunrise};
use dawn::daemon::Daemon;
use dawn::rpi::{RealtimePriority, open_pin};
use dawn::store::ConfigStore;
use dawn::time::{LocalClock, SpinDelay};
use dawn::{ColorController, SunriseScheduler, SunriseSettings, Transmitter};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = ConfigStore::from_env();

    match Invocation::from_args(std::env::args().skip(1)) {
        Invocation::Run => run(store),
        Invocation::Set(value) => {
            let confirmation = set_sunrise(&store, &value)
                .with_context(|| format!("could not save setting {value:?}"))?;
            println!("{confirmation}");
            Ok(())
        }
        Invocation::Usage => {
            println!("{USAGE}");
            Ok(())
        }
    }
}

fn run(store: ConfigStore) -> anyhow::Result<()> {
    let bcm = pin_from_env();
    let pin = open_pin(bcm).with_context(|| format!("could not claim GPIO {bcm}"))?;
    let transmitter = Transmitter::new(pin, SpinDelay::new(), RealtimePriority::new())?;

    let controller = ColorController::new(transmitter);
    let scheduler = SunriseScheduler::new(SunriseSettings::default())?;

    info!("dawn started (GPIO {bcm}, config {})", store.path().display());
    Daemon::new(controller, scheduler, store, LocalClock).run()
}
