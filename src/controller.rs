//! Color convergence on top of the step-only command set.
//!
//! The receiver has no "set color" command, only per-channel single-level
//! steps, and it never reports its state. [`ColorController`] therefore keeps
//! its own belief of the current levels and walks them toward each new target
//! one step at a time. The belief can drift when commands are dropped;
//! [`ColorController::reset_color`] re-establishes it by overdriving every
//! channel down to zero.

use crate::blackbody::RgbColor;
use crate::protocol::{Channel, Direction, Opcode};
use core::cmp::Ordering;

/// Trait for anything that can deliver receiver commands.
///
/// Implemented by [`crate::protocol::Transmitter`] for real hardware. A
/// successful return only means the command was sent, not that the receiver
/// acted on it.
pub trait CommandSink {
    /// Error raised by the underlying line driver.
    type Error;

    /// Sends a single command and blocks until the receiver may accept another.
    fn send(&mut self, opcode: Opcode) -> Result<(), Self::Error>;
}

impl<S: CommandSink + ?Sized> CommandSink for &mut S {
    type Error = S::Error;

    fn send(&mut self, opcode: Opcode) -> Result<(), Self::Error> {
        (**self).send(opcode)
    }
}

/// Highest level a channel can take on the device.
pub const DEVICE_MAX_LEVEL: u8 = 63;

/// Factor mapping 8-bit channels onto the 64 device levels.
pub const DEVICE_SCALE: f32 = 0.25;

/// Decrement rounds sent by [`ColorController::reset_color`].
///
/// Far beyond the 64-level depth so that zero is reached even with the
/// receiver's ~5% drop rate.
pub const RESET_REPEATS: usize = 80;

/// Channel levels in device resolution (`0..=63`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceLevels {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl DeviceLevels {
    /// All channels at zero, the receiver's power-up state.
    pub const OFF: Self = Self::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Scales an 8-bit color down to device levels, truncating.
    pub fn from_color(color: RgbColor) -> Self {
        Self {
            red: scale(color.red),
            green: scale(color.green),
            blue: scale(color.blue),
        }
    }

    /// Level of a single channel.
    pub fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut u8 {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }

    /// Number of single steps needed to get from `self` to `other`.
    pub fn distance(&self, other: &Self) -> u32 {
        Channel::ALL
            .iter()
            .map(|&ch| u32::from(self.channel(ch).abs_diff(other.channel(ch))))
            .sum()
    }
}

#[inline]
fn scale(value: u8) -> u8 {
    (f32::from(value) * DEVICE_SCALE) as u8
}

/// Scene presets stored on the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scene {
    Diy1,
    Diy2,
}

impl Scene {
    fn opcode(self) -> Opcode {
        match self {
            Scene::Diy1 => Opcode::Diy1,
            Scene::Diy2 => Opcode::Diy2,
        }
    }
}

/// Owns the command sink and the believed device state.
///
/// The believed state only ever changes here, one level per command that was
/// sent successfully.
pub struct ColorController<S> {
    sink: S,
    state: DeviceLevels,
}

impl<S: CommandSink> ColorController<S> {
    /// Creates a controller assuming the device is at [`DeviceLevels::OFF`].
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: DeviceLevels::OFF,
        }
    }

    /// Levels the device is believed to hold.
    pub fn device_state(&self) -> DeviceLevels {
        self.state
    }

    /// Walks the device to `target` with single-level steps.
    ///
    /// DIY1 is sent first: recalling it clears an intermittent glitch state of
    /// the receiver without moving the levels. Each pass then steps every
    /// channel that still differs once, in red, green, blue order.
    ///
    /// Returns the number of step commands sent, which is the distance
    /// between the old and new state. A dropped command is not noticed and
    /// leaves the belief off by one until the next [`reset_color`](Self::reset_color).
    pub fn set_color(&mut self, target: RgbColor) -> Result<u32, S::Error> {
        let target = DeviceLevels::from_color(target);
        log::debug!("set color {:?} -> {:?}", self.state, target);

        self.sink.send(Opcode::Diy1)?;

        let mut steps = 0;
        while self.state != target {
            for channel in Channel::ALL {
                let current = self.state.channel(channel);
                let direction = match current.cmp(&target.channel(channel)) {
                    Ordering::Less => Direction::Up,
                    Ordering::Greater => Direction::Down,
                    Ordering::Equal => continue,
                };

                self.sink.send(Opcode::step(channel, direction))?;
                *self.state.channel_mut(channel) = match direction {
                    Direction::Up => current + 1,
                    Direction::Down => current - 1,
                };
                steps += 1;
            }
        }

        Ok(steps)
    }

    /// Forces the device to zero without trusting the believed state.
    ///
    /// Sends [`RESET_REPEATS`] rounds of red, green and blue decrements, then
    /// declares the state [`DeviceLevels::OFF`].
    pub fn reset_color(&mut self) -> Result<(), S::Error> {
        log::debug!("reset color from {:?}", self.state);

        for _ in 0..RESET_REPEATS {
            for channel in Channel::ALL {
                self.sink.send(Opcode::step(channel, Direction::Down))?;
                let level = self.state.channel_mut(channel);
                *level = level.saturating_sub(1);
            }
        }

        self.state = DeviceLevels::OFF;
        Ok(())
    }

    /// Toggles the receiver's power. Levels are kept by the receiver.
    pub fn toggle_power(&mut self) -> Result<(), S::Error> {
        self.sink.send(Opcode::Power)
    }

    /// Recalls a stored scene.
    ///
    /// The believed state is left as is, so only use this with scenes that do
    /// not move the levels.
    pub fn recall_scene(&mut self, scene: Scene) -> Result<(), S::Error> {
        self.sink.send(scene.opcode())
    }

    /// Returns a reference to the command sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the controller, returning the command sink.
    pub fn into_inner(self) -> S {
        self.sink
    }
}
