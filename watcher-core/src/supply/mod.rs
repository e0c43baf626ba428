//! Supply-voltage estimation from the internal reference channel.
//!
//! The ADC measures VREFINT against the supply rail, so the rail voltage is
//! recovered from the factory calibration word programmed at 3000 mV: the
//! lower the reading, the higher the rail. Keeping the arithmetic here lets
//! the host test suite cover it without an ADC.

/// Supply level, in millivolts, at which the factory calibration word is
/// recorded.
pub const VREFINT_CAL_MILLIVOLTS: u32 = 3_000;

/// One VREFINT conversion paired with the device's factory calibration word.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VrefintSample {
    /// Factory-trimmed reading taken at [`VREFINT_CAL_MILLIVOLTS`].
    pub calibration: u16,
    /// Raw conversion result for the current rail.
    pub reading: u16,
}

impl VrefintSample {
    pub const fn new(calibration: u16, reading: u16) -> Self {
        Self {
            calibration,
            reading,
        }
    }

    /// Estimated supply rail in millivolts.
    ///
    /// Returns `None` when the conversion produced no usable data (a zero
    /// reading); callers treat that exactly like an under-voltage sample.
    /// Estimates beyond the `u16` range saturate.
    pub fn supply_millivolts(self) -> Option<u16> {
        if self.reading == 0 {
            return None;
        }

        let millivolts =
            VREFINT_CAL_MILLIVOLTS * u32::from(self.calibration) / u32::from(self.reading);
        Some(u16::try_from(millivolts).unwrap_or(u16::MAX))
    }
}
