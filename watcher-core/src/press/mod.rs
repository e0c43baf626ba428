//! Press request types and the output-line abstraction.
//!
//! The output emulates an open-drain button: released it floats and the
//! target's own pull-up keeps the net high, pressed it sinks the net to
//! ground. The trait seam lets the firmware drive a real pin while host
//! tests drive a recording fake.

/// What initiated a press.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressSource {
    /// The periodic cadence came due.
    AutoTimer,
    /// The local button was pressed.
    Button,
}

/// Authorized press waiting to be executed against the output line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressRequest {
    pub source: PressSource,
    /// Scheduler tick at which the press was authorized.
    pub tick: u32,
}

impl PressRequest {
    pub const fn new(source: PressSource, tick: u32) -> Self {
        Self { source, tick }
    }
}

/// Abstraction over the physical output line.
pub trait PressLine {
    /// Sinks the line low (button held).
    fn drive_low(&mut self);

    /// Floats the line (button released).
    fn release(&mut self);
}
