//! Event-driven core of the watcher.
//!
//! The supervisor owns every counter and the UVLO gate. The firmware's
//! tasks feed it tick, button, and supply events and execute the presses it
//! authorizes; nothing here is shared between execution contexts, so no
//! locking discipline is needed around the state.

use crate::config::{ConfigError, WatcherConfig};
use crate::press::{PressRequest, PressSource};
use crate::schedule::TickScheduler;
use crate::uvlo::{GateState, GateTransition, UvloGate};

/// Work owed by the control loop after one tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct TickActions {
    /// The loop should sample the supply and report the result through
    /// [`Supervisor::on_supply_sample`].
    pub sample_supply: bool,
    /// Automatic press to execute.
    pub press: Option<PressRequest>,
}

/// Disposition of one button edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonOutcome {
    /// Edge fell inside the refractory window; nothing changes.
    Bounced,
    /// Edge honored and authorized; execute the press.
    Pressed(PressRequest),
    /// Edge honored (the window re-arms) but pulsing is forbidden right now.
    Refused(PressRefusal),
}

/// Why an honored button edge did not produce a press.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressRefusal {
    /// The UVLO gate is blocked.
    SupplyBlocked,
    /// The post-recovery grace period is still running.
    Inhibited,
}

/// Single-owner control state for the whole watcher.
///
/// Profiles without UVLO thresholds run with no gate at all: the state
/// reads `Allowed` from boot and no supply work is ever requested.
#[derive(Clone, Debug)]
pub struct Supervisor {
    config: WatcherConfig,
    gate: Option<UvloGate>,
    sched: TickScheduler,
}

impl Supervisor {
    /// Creates the supervisor in its boot state: gate blocked when supply
    /// supervision is configured, all counters at zero.
    pub fn new(config: WatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gate: config.uvlo.map(UvloGate::new),
            sched: TickScheduler::new(),
            config,
        })
    }

    /// The profile this supervisor runs.
    pub const fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Current gate state; profiles without UVLO report `Allowed`.
    pub fn gate_state(&self) -> GateState {
        self.gate.map_or(GateState::Allowed, |gate| gate.state())
    }

    /// Returns `true` once the gate authorizes pulsing. The grace period may
    /// still be running; see [`pressing_allowed`](Self::pressing_allowed).
    pub fn gate_allowed(&self) -> bool {
        self.gate_state().is_allowed()
    }

    /// Returns `true` while a press may start.
    pub fn pressing_allowed(&self) -> bool {
        self.gate_allowed() && !self.sched.inhibited()
    }

    /// Returns `true` when the loop must hold the output released.
    pub fn output_forced_released(&self) -> bool {
        !self.gate_allowed()
    }

    /// Ticks remaining in the post-recovery grace period.
    pub const fn inhibit_remaining(&self) -> u32 {
        self.sched.inhibit_remaining()
    }

    /// Confirmation samples accumulated toward recovery, for logging.
    pub fn confirmed_samples(&self) -> u8 {
        self.gate.map_or(0, |gate| gate.confirmed_samples())
    }

    /// Current scheduler tick.
    pub const fn tick(&self) -> u32 {
        self.sched.tick()
    }

    /// Advances the tick counters and reports the work now due.
    pub fn on_tick(&mut self) -> TickActions {
        let outcome = self.sched.advance(&self.config, self.gate_allowed());

        let press = if outcome.auto_press_due {
            let request = PressRequest::new(PressSource::AutoTimer, self.sched.tick());
            self.sched.note_press(&self.config);
            Some(request)
        } else {
            None
        };

        TickActions {
            sample_supply: outcome.supply_check_due,
            press,
        }
    }

    /// Applies one button edge.
    ///
    /// An honored edge always re-arms the refractory window, whether or not
    /// a press fires; only a press that fires re-bases the automatic
    /// cadence.
    pub fn on_button_edge(&mut self) -> ButtonOutcome {
        if self.sched.debouncing() {
            return ButtonOutcome::Bounced;
        }

        if !self.gate_allowed() {
            self.sched.arm_debounce(&self.config);
            return ButtonOutcome::Refused(PressRefusal::SupplyBlocked);
        }
        if self.sched.inhibited() {
            self.sched.arm_debounce(&self.config);
            return ButtonOutcome::Refused(PressRefusal::Inhibited);
        }

        let request = PressRequest::new(PressSource::Button, self.sched.tick());
        self.sched.note_press(&self.config);
        ButtonOutcome::Pressed(request)
    }

    /// Feeds one supply sample to the gate.
    ///
    /// `None` marks a sample the monitor could not produce; the gate treats
    /// it as under-voltage. Recovery reloads the grace period.
    pub fn on_supply_sample(&mut self, millivolts: Option<u16>) -> Option<GateTransition> {
        let transition = self.gate.as_mut()?.observe(millivolts);
        if transition == Some(GateTransition::Recovered) {
            self.sched.load_inhibit(self.config.startup_inhibit_ticks);
        }
        transition
    }
}
