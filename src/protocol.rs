//! One-wire pulse protocol spoken by the strip's IR receiver.
//!
//! A command frame is a long low header, a shorter high header, a fixed
//! 16-bit preamble (eight zeros then eight ones) and the 16-bit opcode, most
//! significant bit first. Every bit is a fixed low gap followed by a high
//! period whose length carries the value. The frame ends with one more gap and
//! a long high hold so the receiver has finished decoding before the next
//! frame starts.
//!
//! The receiver never acknowledges anything. Roughly one command in twenty is
//! lost, and nothing at this layer can tell.

use crate::controller::CommandSink;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

/// Header low time in microseconds.
pub const HEADER_LOW_US: u32 = 9_000;
/// Header high time in microseconds.
pub const HEADER_HIGH_US: u32 = 4_500;
/// Low gap preceding every bit, in microseconds.
pub const BIT_GAP_US: u32 = 500;
/// High time encoding a `0` bit, in microseconds.
pub const ZERO_US: u32 = 500;
/// High time encoding a `1` bit, in microseconds.
pub const ONE_US: u32 = 1_500;
/// Idle high time after a frame before another may start, in microseconds.
pub const COMMAND_HOLD_US: u32 = 100_000;

/// Number of preamble bits (zeros followed by ones).
pub const PREAMBLE_BITS: usize = 16;
/// Number of opcode bits.
pub const OPCODE_BITS: usize = 16;
/// Pulses in one frame: header, two per bit, trailing gap and hold.
pub const FRAME_PULSES: usize = 2 + 2 * (PREAMBLE_BITS + OPCODE_BITS) + 2;

/// Preamble sent ahead of every opcode.
const PREAMBLE: u16 = 0x00FF;

/// Receiver commands, as captured from the strip's remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Opcode {
    RedUp = 0b0010_1000_1101_0111,
    RedDown = 0b0000_1000_1111_0111,
    GreenUp = 0b1010_1000_0101_0111,
    GreenDown = 0b1000_1000_0111_0111,
    BlueUp = 0b0110_1000_1001_0111,
    BlueDown = 0b0100_1000_1011_0111,
    Power = 0b0000_0010_1111_1101,
    Diy1 = 0b0011_0000_1100_1111,
    Diy2 = 0b1011_0000_0100_1111,
}

/// A color channel of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in transmission order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// Direction of a single brightness step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

impl Opcode {
    /// Every opcode the receiver understands.
    pub const ALL: [Opcode; 9] = [
        Opcode::RedUp,
        Opcode::RedDown,
        Opcode::GreenUp,
        Opcode::GreenDown,
        Opcode::BlueUp,
        Opcode::BlueDown,
        Opcode::Power,
        Opcode::Diy1,
        Opcode::Diy2,
    ];

    /// Raw 16-bit code.
    #[inline]
    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Single-level step command for `channel`.
    pub const fn step(channel: Channel, direction: Direction) -> Self {
        match (channel, direction) {
            (Channel::Red, Direction::Up) => Opcode::RedUp,
            (Channel::Red, Direction::Down) => Opcode::RedDown,
            (Channel::Green, Direction::Up) => Opcode::GreenUp,
            (Channel::Green, Direction::Down) => Opcode::GreenDown,
            (Channel::Blue, Direction::Up) => Opcode::BlueUp,
            (Channel::Blue, Direction::Down) => Opcode::BlueDown,
        }
    }
}

/// Logic level on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// The line held at `level` for `micros` microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub level: Level,
    pub micros: u32,
}

impl Pulse {
    pub const fn low(micros: u32) -> Self {
        Self {
            level: Level::Low,
            micros,
        }
    }

    pub const fn high(micros: u32) -> Self {
        Self {
            level: Level::High,
            micros,
        }
    }
}

/// Complete pulse train for one command, hold time included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pulses: Vec<Pulse, FRAME_PULSES>,
}

impl Frame {
    /// Builds the frame carrying `code`.
    pub fn encode(code: u16) -> Self {
        let mut frame = Self { pulses: Vec::new() };

        frame.push(Level::Low, HEADER_LOW_US);
        frame.push(Level::High, HEADER_HIGH_US);

        for word in [PREAMBLE, code] {
            for shift in (0..16).rev() {
                frame.push_bit(word & (1 << shift) != 0);
            }
        }

        frame.push(Level::Low, BIT_GAP_US);
        frame.push(Level::High, COMMAND_HOLD_US);
        frame
    }

    /// Pulses in transmission order.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Logical bits carried by the frame, preamble first.
    ///
    /// Reads back the high time of every bit cell.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.bit_cells().map(|cell| cell[1].micros == ONE_US)
    }

    /// The `(gap, mark)` pulse pairs of every bit, preamble first.
    pub fn bit_cells(&self) -> impl Iterator<Item = &[Pulse]> + '_ {
        self.pulses[2..FRAME_PULSES - 2].chunks_exact(2)
    }

    /// Total time the frame occupies the line, in microseconds.
    pub fn duration_us(&self) -> u32 {
        self.pulses.iter().map(|pulse| pulse.micros).sum()
    }

    fn push_bit(&mut self, bit: bool) {
        self.push(Level::Low, BIT_GAP_US);
        self.push(Level::High, if bit { ONE_US } else { ZERO_US });
    }

    fn push(&mut self, level: Level, micros: u32) {
        // Capacity matches the fixed frame layout exactly.
        let pushed = self.pulses.push(Pulse { level, micros });
        debug_assert!(pushed.is_ok());
    }
}

/// Best-effort control over OS scheduling while a frame is on the wire.
///
/// Raising priority only reduces timing jitter; failures are not reported.
pub trait SchedulingPriority {
    /// Called right before a frame starts.
    fn raise(&mut self);

    /// Called after the frame and its hold time, even if the pin failed.
    fn restore(&mut self);
}

/// Leaves scheduling untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPriority;

impl SchedulingPriority for NoPriority {
    fn raise(&mut self) {}

    fn restore(&mut self) {}
}

/// Drives the command line of the receiver.
///
/// Every call to [`Transmitter::transmit`] blocks for the full frame plus
/// hold time (162 ms), which also paces callers to the receiver's
/// decode rate.
pub struct Transmitter<P, D, R = NoPriority> {
    pin: P,
    delay: D,
    priority: R,
}

impl<P: OutputPin, D: DelayNs, R: SchedulingPriority> Transmitter<P, D, R> {
    /// Takes the line and pulls it high, the receiver's idle state.
    pub fn new(mut pin: P, delay: D, priority: R) -> Result<Self, P::Error> {
        pin.set_high()?;
        Ok(Self {
            pin,
            delay,
            priority,
        })
    }

    /// Sends `opcode` and waits out the inter-command hold.
    pub fn transmit(&mut self, opcode: Opcode) -> Result<(), P::Error> {
        let frame = Frame::encode(opcode.bits());
        log::trace!("tx {:?} ({:#06x})", opcode, opcode.bits());

        self.priority.raise();
        let result = self.play(&frame);
        self.priority.restore();
        result
    }

    /// Releases the pin, delay and priority handles.
    pub fn release(self) -> (P, D, R) {
        (self.pin, self.delay, self.priority)
    }

    fn play(&mut self, frame: &Frame) -> Result<(), P::Error> {
        for pulse in frame.pulses() {
            match pulse.level {
                Level::Low => self.pin.set_low()?,
                Level::High => self.pin.set_high()?,
            }
            self.delay.delay_us(pulse.micros);
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs, R: SchedulingPriority> CommandSink for Transmitter<P, D, R> {
    type Error = P::Error;

    fn send(&mut self, opcode: Opcode) -> Result<(), Self::Error> {
        self.transmit(opcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_match_captured_codes() {
        assert_eq!(Opcode::RedUp.bits(), 0x28D7);
        assert_eq!(Opcode::RedDown.bits(), 0x08F7);
        assert_eq!(Opcode::GreenUp.bits(), 0xA857);
        assert_eq!(Opcode::GreenDown.bits(), 0x8877);
        assert_eq!(Opcode::BlueUp.bits(), 0x6897);
        assert_eq!(Opcode::BlueDown.bits(), 0x48B7);
        assert_eq!(Opcode::Power.bits(), 0x02FD);
        assert_eq!(Opcode::Diy1.bits(), 0x30CF);
        assert_eq!(Opcode::Diy2.bits(), 0xB04F);
    }

    #[test]
    fn step_lookup_covers_every_channel() {
        assert_eq!(Opcode::step(Channel::Red, Direction::Up), Opcode::RedUp);
        assert_eq!(Opcode::step(Channel::Green, Direction::Down), Opcode::GreenDown);
        assert_eq!(Opcode::step(Channel::Blue, Direction::Up), Opcode::BlueUp);
    }

    #[test]
    fn frame_starts_with_header() {
        let frame = Frame::encode(Opcode::Power.bits());
        assert_eq!(frame.pulses().len(), FRAME_PULSES);
        assert_eq!(frame.pulses()[0], Pulse::low(HEADER_LOW_US));
        assert_eq!(frame.pulses()[1], Pulse::high(HEADER_HIGH_US));
    }

    #[test]
    fn frame_ends_with_gap_and_hold() {
        let frame = Frame::encode(Opcode::Diy1.bits());
        let tail = &frame.pulses()[FRAME_PULSES - 2..];
        assert_eq!(tail[0], Pulse::low(BIT_GAP_US));
        assert_eq!(tail[1], Pulse::high(COMMAND_HOLD_US));
    }

    #[test]
    fn frame_carries_preamble_then_msb_first_opcode() {
        let frame = Frame::encode(0b1000_0000_0000_0001);
        let bits: heapless::Vec<bool, 32> = frame.bits().collect();

        assert_eq!(bits.len(), 32);
        assert!(bits[..8].iter().all(|bit| !bit));
        assert!(bits[8..16].iter().all(|bit| *bit));
        assert!(bits[16]);
        assert!(bits[17..31].iter().all(|bit| !bit));
        assert!(bits[31]);
    }

    #[test]
    fn frame_duration_accounts_for_every_pulse() {
        // Power: 0x02FD has 8 set bits, plus 8 set preamble bits.
        let frame = Frame::encode(Opcode::Power.bits());
        let ones = 16;
        let zeros = 32 - ones;
        let expected = HEADER_LOW_US
            + HEADER_HIGH_US
            + 32 * BIT_GAP_US
            + ones * ONE_US
            + zeros * ZERO_US
            + BIT_GAP_US
            + COMMAND_HOLD_US;
        assert_eq!(frame.duration_us(), expected);
    }
}
