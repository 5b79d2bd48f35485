#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`color_for_temperature`**: Blackbody temperature to dimmed 8-bit RGB
//! - **`Frame`** / **`Transmitter`**: The receiver's pulse protocol, played on an `embedded-hal` pin
//! - **`CommandSink`**: Trait for anything that can deliver receiver commands
//! - **`ColorController`**: Tracks the believed device levels and steps them toward a target
//! - **`SunriseScheduler`**: Daily state machine driven by "seconds until sunrise completes"
//! - **`SunriseConfig`**: The stored setting (`HH:MM`, `demo` or `off`)
//! - **`Clock`**: Trait to implement for your wall clock
//!
//! Colors are `Srgb<u8>` (0-255 per channel); the receiver itself only has 64
//! levels per channel, see [`DeviceLevels`].

pub use palette::Srgb;

pub mod blackbody;
pub mod controller;
pub mod protocol;
pub mod schedule;
pub mod sunrise;
pub mod time;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
pub mod daemon;
#[cfg(feature = "std")]
pub mod store;

#[cfg(feature = "rpi")]
pub mod rpi;

pub use blackbody::{COLOR_OFF, RgbColor, color_for_temperature};
pub use controller::{ColorController, CommandSink, DeviceLevels, Scene};
pub use protocol::{Frame, NoPriority, Opcode, SchedulingPriority, Transmitter};
pub use schedule::{ConfigError, SunriseConfig};
pub use sunrise::{DemoPolicy, Poll, SettingsError, SunriseScheduler, SunriseSettings, TickOutcome};
pub use time::Clock;
