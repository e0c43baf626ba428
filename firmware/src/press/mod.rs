//! Button-event plumbing and press execution.
//!
//! The button edge task and the supervisor task share nothing but the
//! bounded channel defined here; a full channel back-pressures the edge
//! task instead of dropping edges. Press execution is the one place the
//! pulse width leaves the tick domain and becomes a real timer wait.

// Consumed by the target-only runtime; host builds compile this module for
// type-checking only.
#![allow(dead_code)]

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Instant, Timer};

use watcher_core::press::PressLine;

#[cfg(target_os = "none")]
use embassy_stm32::gpio::OutputOpenDrain;

/// Depth of the queue carrying button edges to the supervisor task.
pub const BUTTON_QUEUE_DEPTH: usize = 4;

#[cfg(target_os = "none")]
type PressMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type PressMutex = NoopRawMutex;

/// One falling edge observed on the button line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ButtonEvent {
    /// When the edge was seen, for logging.
    pub at: Instant,
}

/// Queue between the button edge task and the supervisor task.
pub type ButtonQueue = Channel<PressMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>;

/// Sender half of the button queue.
pub type ButtonSender<'a> = Sender<'a, PressMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>;

/// Receiver half of the button queue.
pub type ButtonReceiver<'a> = Receiver<'a, PressMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>;

/// Executes one press: sink the line, hold for the pulse width, float it.
pub async fn execute<L: PressLine>(line: &mut L, width: core::time::Duration) {
    line.drive_low();
    Timer::after(pulse_duration(width)).await;
    line.release();
}

fn pulse_duration(width: core::time::Duration) -> Duration {
    let micros = u64::try_from(width.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(micros)
}

/// Open-drain GPIO wired in series to the target's button net.
///
/// Constructed released (set high, which floats an open-drain output); the
/// target's own pull-up keeps the net idle until a press sinks it.
#[cfg(target_os = "none")]
pub struct HardwarePressLine<'d> {
    output: OutputOpenDrain<'d>,
}

#[cfg(target_os = "none")]
impl<'d> HardwarePressLine<'d> {
    pub fn new(output: OutputOpenDrain<'d>) -> Self {
        Self { output }
    }
}

#[cfg(target_os = "none")]
impl PressLine for HardwarePressLine<'_> {
    fn drive_low(&mut self) {
        self.output.set_low();
    }

    fn release(&mut self) {
        self.output.set_high();
    }
}
