//! Compile-time configuration profiles for the watcher.
//!
//! The two firmware builds that used to ship as separate source trees are a
//! single design here: every capability that differs between them (supply
//! supervision, button debounce, recovery inhibit) is a field of
//! [`WatcherConfig`], and each build selects one of the named profiles.

use core::fmt;
use core::time::Duration;

/// Ticks between automatic presses, shared by both profiles.
///
/// At the nominal one second tick this is twice daily, matching the watchdog
/// cadence the target device expects.
pub const AUTO_PRESS_INTERVAL_TICKS: u32 = 43_200;

/// Supply thresholds and confirmation depth for the under-voltage lockout.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UvloThresholds {
    /// Supply level that must be confirmed before pulsing is allowed.
    pub rise_millivolts: u16,
    /// Supply level below which pulsing stops immediately.
    pub fall_millivolts: u16,
    /// Consecutive samples at or above the rise level required to recover.
    pub confirm_samples: u8,
}

impl UvloThresholds {
    pub const fn new(rise_millivolts: u16, fall_millivolts: u16, confirm_samples: u8) -> Self {
        Self {
            rise_millivolts,
            fall_millivolts,
            confirm_samples,
        }
    }
}

/// Immutable timing and gating profile handed to the supervisor at boot.
///
/// All intervals are counted in scheduler ticks except the pulse width,
/// which is shorter than one tick and timed directly.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WatcherConfig {
    /// Width of the active-low press pulse.
    pub pulse_width: Duration,
    /// Ticks between automatic presses.
    pub auto_press_ticks: u32,
    /// Ticks between supply samples while UVLO thresholds are configured.
    pub supply_check_ticks: u32,
    /// Refractory window, in ticks, during which button edges are ignored.
    pub debounce_ticks: u32,
    /// Grace period, in ticks, after boot or UVLO recovery during which no
    /// pulse may fire.
    pub startup_inhibit_ticks: u32,
    /// Under-voltage lockout thresholds; `None` disables supply supervision.
    pub uvlo: Option<UvloThresholds>,
}

impl WatcherConfig {
    /// Profile with supply supervision, debounce, and recovery inhibit.
    pub const fn supervised() -> Self {
        Self {
            pulse_width: Duration::from_millis(120),
            auto_press_ticks: AUTO_PRESS_INTERVAL_TICKS,
            supply_check_ticks: 8,
            debounce_ticks: 1,
            startup_inhibit_ticks: 10,
            uvlo: Some(UvloThresholds::new(3_000, 2_900, 3)),
        }
    }

    /// Bare periodic-press profile with every supervision capability off.
    pub const fn minimal() -> Self {
        Self {
            pulse_width: Duration::from_millis(500),
            auto_press_ticks: AUTO_PRESS_INTERVAL_TICKS,
            supply_check_ticks: 0,
            debounce_ticks: 0,
            startup_inhibit_ticks: 0,
            uvlo: None,
        }
    }

    /// Returns `true` when the profile samples the supply rail.
    pub const fn supervises_supply(&self) -> bool {
        self.uvlo.is_some()
    }

    /// Checks the profile for values the supervisor cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_width.is_zero() {
            return Err(ConfigError::ZeroPulseWidth);
        }
        if self.auto_press_ticks == 0 {
            return Err(ConfigError::ZeroAutoPressInterval);
        }
        if let Some(uvlo) = self.uvlo {
            if uvlo.rise_millivolts <= uvlo.fall_millivolts {
                return Err(ConfigError::InvertedThresholds);
            }
            if uvlo.confirm_samples == 0 {
                return Err(ConfigError::ZeroConfirmSamples);
            }
            if self.supply_check_ticks == 0 {
                return Err(ConfigError::ZeroCheckCadence);
            }
        }
        Ok(())
    }
}

/// Rejected configuration values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The press pulse must have a nonzero width.
    ZeroPulseWidth,
    /// The automatic cadence must span at least one tick.
    ZeroAutoPressInterval,
    /// The rise threshold must sit strictly above the fall threshold.
    InvertedThresholds,
    /// Recovery requires at least one confirmation sample.
    ZeroConfirmSamples,
    /// UVLO thresholds require a nonzero sampling cadence.
    ZeroCheckCadence,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
