//! Shared test infrastructure for dawn integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use chrono::NaiveTime;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use dawn::controller::DEVICE_MAX_LEVEL;
use dawn::protocol::{Level, SchedulingPriority};
use dawn::{Clock, CommandSink, DeviceLevels, Opcode};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use std::rc::Rc;

// ============================================================================
// Mock Command Sinks
// ============================================================================

/// Records every command sent.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Vec<Opcode>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, opcode: Opcode) -> usize {
        self.sent.iter().filter(|&&sent| sent == opcode).count()
    }

    pub fn steps(&self) -> usize {
        self.sent
            .iter()
            .filter(|&&sent| !matches!(sent, Opcode::Diy1 | Opcode::Diy2 | Opcode::Power))
            .count()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl CommandSink for RecordingSink {
    type Error = Infallible;

    fn send(&mut self, opcode: Opcode) -> Result<(), Infallible> {
        self.sent.push(opcode);
        Ok(())
    }
}

/// Models the physical receiver: levels saturate at 0 and 63, and commands
/// whose (1-based) sequence number is a multiple of `drop_every` are lost.
pub struct SimulatedStrip {
    pub levels: DeviceLevels,
    pub received: usize,
    pub dropped: usize,
    drop_every: Option<usize>,
}

impl SimulatedStrip {
    pub fn new() -> Self {
        Self {
            levels: DeviceLevels::OFF,
            received: 0,
            dropped: 0,
            drop_every: None,
        }
    }

    pub fn lossy(drop_every: usize) -> Self {
        Self {
            drop_every: Some(drop_every),
            ..Self::new()
        }
    }

    pub fn with_levels(levels: DeviceLevels) -> Self {
        Self {
            levels,
            ..Self::new()
        }
    }
}

impl CommandSink for SimulatedStrip {
    type Error = Infallible;

    fn send(&mut self, opcode: Opcode) -> Result<(), Infallible> {
        let sequence = self.received + self.dropped + 1;
        if self.drop_every.is_some_and(|every| sequence % every == 0) {
            self.dropped += 1;
            return Ok(());
        }
        self.received += 1;

        let levels = &mut self.levels;
        let up = |level: &mut u8| *level = (*level + 1).min(DEVICE_MAX_LEVEL);
        let down = |level: &mut u8| *level = level.saturating_sub(1);
        match opcode {
            Opcode::RedUp => up(&mut levels.red),
            Opcode::RedDown => down(&mut levels.red),
            Opcode::GreenUp => up(&mut levels.green),
            Opcode::GreenDown => down(&mut levels.green),
            Opcode::BlueUp => up(&mut levels.blue),
            Opcode::BlueDown => down(&mut levels.blue),
            Opcode::Power | Opcode::Diy1 | Opcode::Diy2 => {}
        }
        Ok(())
    }
}

// ============================================================================
// Mock Line Hardware
// ============================================================================

/// One observable event on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    Set(Level),
    WaitUs(u32),
    PriorityRaised,
    PriorityRestored,
}

pub type LineLog = Rc<RefCell<Vec<LineEvent>>>;

pub fn line_log() -> LineLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Pin recording level changes into a shared log.
pub struct RecordingPin {
    log: LineLog,
}

impl RecordingPin {
    pub fn new(log: &LineLog) -> Self {
        Self { log: log.clone() }
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(LineEvent::Set(Level::Low));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(LineEvent::Set(Level::High));
        Ok(())
    }
}

/// Delay recording requested waits into a shared log instead of sleeping.
pub struct RecordingDelay {
    log: LineLog,
}

impl RecordingDelay {
    pub fn new(log: &LineLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(LineEvent::WaitUs(ns / 1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(LineEvent::WaitUs(us));
    }
}

/// Priority hook recording raise/restore calls.
pub struct RecordingPriority {
    log: LineLog,
}

impl RecordingPriority {
    pub fn new(log: &LineLog) -> Self {
        Self { log: log.clone() }
    }
}

impl SchedulingPriority for RecordingPriority {
    fn raise(&mut self) {
        self.log.borrow_mut().push(LineEvent::PriorityRaised);
    }

    fn restore(&mut self) {
        self.log.borrow_mut().push(LineEvent::PriorityRestored);
    }
}

/// Pin error raised by [`FaultyPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Pin that accepts `ok_writes` writes, then fails every write.
pub struct FaultyPin {
    pub ok_writes: usize,
}

impl ErrorType for FaultyPin {
    type Error = PinFault;
}

impl OutputPin for FaultyPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.set_high()
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        if self.ok_writes == 0 {
            return Err(PinFault);
        }
        self.ok_writes -= 1;
        Ok(())
    }
}

/// Delay that returns immediately.
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ============================================================================
// Mock Clock
// ============================================================================

/// Wall clock with settable time of day.
pub struct MockClock {
    now: Cell<NaiveTime>,
}

impl MockClock {
    pub fn at(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            now: Cell::new(time(hour, minute, second)),
        }
    }

    pub fn set(&self, hour: u32, minute: u32, second: u32) {
        self.now.set(time(hour, minute, second));
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveTime {
        self.now.get()
    }
}

impl Clock for &MockClock {
    fn now(&self) -> NaiveTime {
        self.now.get()
    }
}

pub fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).unwrap()
}

// ============================================================================
// Temporary Config Files
// ============================================================================

/// Config file path unique to one test, removed on drop.
pub struct TempConfig {
    pub path: std::path::PathBuf,
}

impl TempConfig {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("dawn-{}-{}.conf", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        Self { path }
    }

    pub fn with_content(name: &str, content: &str) -> Self {
        let config = Self::new(name);
        std::fs::write(&config.path, content).unwrap();
        config
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
