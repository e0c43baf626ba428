//! Hysteretic under-voltage lockout.
//!
//! Recovery is deliberately slower than the trip: the gate opens only after a
//! run of consecutive good samples and closes on the first bad one. The rise
//! threshold sits above the fall threshold so supply ripple around either
//! level cannot chatter the gate.

use crate::config::UvloThresholds;

/// Whether pulsing is currently authorized by the supply monitor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateState {
    /// Supply unproven or seen below the fall threshold; no pulses.
    Blocked,
    /// Supply confirmed at or above the rise threshold.
    Allowed,
}

impl GateState {
    /// Returns `true` when the state authorizes pulsing.
    pub const fn is_allowed(self) -> bool {
        matches!(self, GateState::Allowed)
    }
}

/// State change reported by [`UvloGate::observe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateTransition {
    /// Blocked to Allowed, after the full confirmation run.
    Recovered,
    /// Allowed to Blocked, on a single bad sample.
    Dropped,
}

/// Hysteretic gate fed by periodic supply samples.
///
/// Starts `Blocked`; the boot power-good wait and the runtime cadence both
/// feed it through [`observe`](Self::observe).
#[derive(Copy, Clone, Debug)]
pub struct UvloGate {
    thresholds: UvloThresholds,
    state: GateState,
    confirmed: u8,
}

impl UvloGate {
    /// Creates a gate in the `Blocked` state with no confirmation credit.
    pub const fn new(thresholds: UvloThresholds) -> Self {
        Self {
            thresholds,
            state: GateState::Blocked,
            confirmed: 0,
        }
    }

    /// Current gate state.
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// Returns `true` when pulsing is authorized.
    pub const fn is_allowed(&self) -> bool {
        self.state.is_allowed()
    }

    /// Confirmation samples accumulated toward recovery.
    pub const fn confirmed_samples(&self) -> u8 {
        self.confirmed
    }

    /// Feeds one supply sample to the gate.
    ///
    /// `None` stands for a sample the monitor could not produce and is
    /// handled as under-voltage: it trips an `Allowed` gate immediately and
    /// zeroes any confirmation credit on a `Blocked` one.
    pub fn observe(&mut self, millivolts: Option<u16>) -> Option<GateTransition> {
        match self.state {
            GateState::Blocked => match millivolts {
                Some(mv) if mv >= self.thresholds.rise_millivolts => {
                    self.confirmed = self.confirmed.saturating_add(1);
                    if self.confirmed >= self.thresholds.confirm_samples {
                        self.state = GateState::Allowed;
                        self.confirmed = 0;
                        Some(GateTransition::Recovered)
                    } else {
                        None
                    }
                }
                _ => {
                    // No partial credit: one bad sample restarts the run.
                    self.confirmed = 0;
                    None
                }
            },
            GateState::Allowed => match millivolts {
                Some(mv) if mv >= self.thresholds.fall_millivolts => None,
                _ => {
                    self.state = GateState::Blocked;
                    self.confirmed = 0;
                    Some(GateTransition::Dropped)
                }
            },
        }
    }
}
