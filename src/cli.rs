//! Argument and environment handling for the `dawn` binary.

use crate::store::{ConfigStore, StoreError};
use log::warn;

/// Printed when more than one argument is given.
pub const USAGE: &str = "dawn takes at most one argument.";

/// BCM number of the command pin (physical header pin 7).
pub const DEFAULT_PIN: u8 = 4;

/// Environment variable overriding the BCM pin number.
pub const PIN_ENV: &str = "DAWN_PIN";

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Run the sunrise loop.
    Run,
    /// Store a new setting.
    Set(String),
    /// Too many arguments; print [`USAGE`].
    Usage,
}

impl Invocation {
    /// Interprets the arguments following the program name.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        match (args.next(), args.next()) {
            (None, _) => Invocation::Run,
            (Some(value), None) => Invocation::Set(value),
            (Some(_), Some(_)) => Invocation::Usage,
        }
    }
}

/// Writes `value` to the store verbatim and returns the confirmation line.
pub fn set_sunrise(store: &ConfigStore, value: &str) -> Result<String, StoreError> {
    store.write(value)?;
    Ok(format!("dawn set to {value}."))
}

/// Pin from `$DAWN_PIN`, or [`DEFAULT_PIN`] when unset or not a number.
pub fn pin_from_env() -> u8 {
    pin_from_var(std::env::var(PIN_ENV).ok().as_deref())
}

fn pin_from_var(value: Option<&str>) -> u8 {
    let Some(value) = value else {
        return DEFAULT_PIN;
    };
    value.trim().parse().unwrap_or_else(|_| {
        warn!("ignoring {PIN_ENV}={value:?}, using BCM {DEFAULT_PIN}");
        DEFAULT_PIN
    })
}
