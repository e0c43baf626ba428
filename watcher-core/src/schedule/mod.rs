//! Tick-domain bookkeeping for the press schedule.
//!
//! Everything time-based in the watcher is counted in scheduler ticks. This
//! module owns the wrapping tick counter and the counters derived from it,
//! and reports the work each tick makes due. It never performs the work
//! itself and never touches hardware.

use crate::config::WatcherConfig;

/// Work made due by a single tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct TickOutcome {
    /// A supply sample is owed to the UVLO gate this tick.
    pub supply_check_due: bool,
    /// The automatic press cadence came due this tick.
    pub auto_press_due: bool,
}

/// Counter state advanced once per scheduler tick.
#[derive(Copy, Clone, Debug)]
pub struct TickScheduler {
    tick: u32,
    auto_press_elapsed: u32,
    check_elapsed: u32,
    debounce_remaining: u32,
    inhibit_remaining: u32,
}

impl TickScheduler {
    /// Creates the scheduler with every counter at its boot value.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            auto_press_elapsed: 0,
            check_elapsed: 0,
            debounce_remaining: 0,
            inhibit_remaining: 0,
        }
    }

    /// Current tick count. Wraps; callers only compare relative values.
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Ticks remaining in the button refractory window.
    pub const fn debounce_remaining(&self) -> u32 {
        self.debounce_remaining
    }

    /// Ticks remaining in the post-recovery grace period.
    pub const fn inhibit_remaining(&self) -> u32 {
        self.inhibit_remaining
    }

    /// Returns `true` while the grace period forbids pulsing.
    pub const fn inhibited(&self) -> bool {
        self.inhibit_remaining > 0
    }

    /// Returns `true` while button edges fall inside the refractory window.
    pub const fn debouncing(&self) -> bool {
        self.debounce_remaining > 0
    }

    /// Starts the post-recovery grace period.
    pub fn load_inhibit(&mut self, ticks: u32) {
        self.inhibit_remaining = ticks;
    }

    /// Records an executed press: re-bases the automatic cadence and arms
    /// the button refractory window.
    pub fn note_press(&mut self, config: &WatcherConfig) {
        self.auto_press_elapsed = 0;
        self.debounce_remaining = config.debounce_ticks;
    }

    /// Arms the button refractory window without touching the press cadence.
    pub fn arm_debounce(&mut self, config: &WatcherConfig) {
        self.debounce_remaining = config.debounce_ticks;
    }

    /// Advances every counter by one tick.
    ///
    /// `gate_allowed` reflects the UVLO state entering the tick; the press
    /// cadence only runs while pulsing is authorized and the grace period
    /// has expired. The decrement order matters: the grace period elapses
    /// before it is consulted, so a one-tick inhibit expires on the next
    /// tick, not the one after.
    pub fn advance(&mut self, config: &WatcherConfig, gate_allowed: bool) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        self.tick = self.tick.wrapping_add(1);
        self.debounce_remaining = self.debounce_remaining.saturating_sub(1);
        self.inhibit_remaining = self.inhibit_remaining.saturating_sub(1);

        if config.supervises_supply() {
            self.check_elapsed = self.check_elapsed.saturating_add(1);
            if self.check_elapsed >= config.supply_check_ticks {
                self.check_elapsed = 0;
                outcome.supply_check_due = true;
            }
        }

        if gate_allowed && self.inhibit_remaining == 0 {
            self.auto_press_elapsed = self.auto_press_elapsed.saturating_add(1);
            if self.auto_press_elapsed >= config.auto_press_ticks {
                self.auto_press_elapsed = 0;
                outcome.auto_press_due = true;
            }
        }

        outcome
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UvloThresholds;
    use core::time::Duration;

    fn config() -> WatcherConfig {
        WatcherConfig {
            pulse_width: Duration::from_millis(120),
            auto_press_ticks: 5,
            supply_check_ticks: 4,
            debounce_ticks: 2,
            startup_inhibit_ticks: 3,
            uvlo: Some(UvloThresholds::new(3_000, 2_900, 3)),
        }
    }

    #[test]
    fn supply_check_follows_cadence() {
        let config = config();
        let mut sched = TickScheduler::new();

        for tick in 1..=12 {
            let outcome = sched.advance(&config, false);
            assert_eq!(outcome.supply_check_due, tick % 4 == 0, "tick {tick}");
        }
    }

    #[test]
    fn auto_press_fires_at_threshold_and_rearms() {
        let config = config();
        let mut sched = TickScheduler::new();

        for _ in 0..4 {
            assert!(!sched.advance(&config, true).auto_press_due);
        }
        assert!(sched.advance(&config, true).auto_press_due);

        // Counter restarted: the next press is a full interval away again.
        for _ in 0..4 {
            assert!(!sched.advance(&config, true).auto_press_due);
        }
        assert!(sched.advance(&config, true).auto_press_due);
    }

    #[test]
    fn auto_press_cadence_frozen_while_gate_blocked() {
        let config = config();
        let mut sched = TickScheduler::new();

        for _ in 0..20 {
            assert!(!sched.advance(&config, false).auto_press_due);
        }

        // Progress resumes from zero once the gate opens.
        for _ in 0..4 {
            assert!(!sched.advance(&config, true).auto_press_due);
        }
        assert!(sched.advance(&config, true).auto_press_due);
    }

    #[test]
    fn auto_press_cadence_frozen_while_inhibited() {
        let config = config();
        let mut sched = TickScheduler::new();
        sched.load_inhibit(config.startup_inhibit_ticks);

        // Inhibit expires on the third tick; the cadence starts counting on
        // that same tick because the decrement runs first.
        for tick in 1..=6 {
            let outcome = sched.advance(&config, true);
            assert!(!outcome.auto_press_due, "tick {tick}");
        }
        assert!(sched.advance(&config, true).auto_press_due);
    }

    #[test]
    fn note_press_rebases_cadence_and_arms_debounce() {
        let config = config();
        let mut sched = TickScheduler::new();

        for _ in 0..3 {
            sched.advance(&config, true);
        }
        sched.note_press(&config);
        assert!(sched.debouncing());
        assert_eq!(sched.debounce_remaining(), 2);

        // Full interval again from the press, not from the old progress.
        for _ in 0..4 {
            assert!(!sched.advance(&config, true).auto_press_due);
        }
        assert!(sched.advance(&config, true).auto_press_due);
    }

    #[test]
    fn countdowns_saturate_at_zero() {
        let config = config();
        let mut sched = TickScheduler::new();
        sched.arm_debounce(&config);

        for _ in 0..5 {
            sched.advance(&config, false);
        }
        assert_eq!(sched.debounce_remaining(), 0);
        assert_eq!(sched.inhibit_remaining(), 0);
        assert!(!sched.debouncing());
        assert!(!sched.inhibited());
    }

    #[test]
    fn tick_counter_wraps_silently() {
        let config = config();
        let mut sched = TickScheduler {
            tick: u32::MAX,
            auto_press_elapsed: 0,
            check_elapsed: 0,
            debounce_remaining: 0,
            inhibit_remaining: 0,
        };

        let outcome = sched.advance(&config, false);
        assert_eq!(sched.tick(), 0);
        assert!(!outcome.auto_press_due);
    }

    #[test]
    fn minimal_profile_never_requests_supply_checks() {
        let config = WatcherConfig::minimal();
        let mut sched = TickScheduler::new();

        for _ in 0..32 {
            assert!(!sched.advance(&config, true).supply_check_due);
        }
    }
}
