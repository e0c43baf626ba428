//! VREFINT sampling for the supply monitor.
//!
//! The ADC measures the internal reference against the supply rail; the
//! arithmetic that turns a reading into millivolts lives in
//! `watcher_core::supply` where the host suite covers it. This module owns
//! only the Embassy ADC plumbing.

use core::ptr;

use embassy_stm32::adc::{Adc, SampleTime, VrefInt};
use embassy_stm32::peripherals::ADC1;
use watcher_core::supply::VrefintSample;

/// Factory-programmed VREFINT calibration word, sampled at 3.0 V (STM32L0).
const VREFINT_CAL_ADDR: *const u16 = 0x1FF8_0078 as *const u16;

/// Reads the factory-trimmed VREFINT calibration word.
fn read_vrefint_calibration() -> u16 {
    unsafe { ptr::read_volatile(VREFINT_CAL_ADDR) }
}

/// Embassy ADC wrapper producing calibrated supply estimates.
pub struct SupplySampler<'d> {
    adc: Adc<'d, ADC1>,
    channel: VrefInt,
    discard_next: bool,
}

impl<'d> SupplySampler<'d> {
    /// Takes ownership of the ADC and enables the internal reference.
    pub fn new(mut adc: Adc<'d, ADC1>) -> Self {
        adc.set_sample_time(SampleTime::CYCLES160_5);
        let channel = adc.enable_vrefint();
        Self {
            adc,
            channel,
            discard_next: true,
        }
    }

    /// One supply estimate in millivolts.
    ///
    /// `None` marks an unusable conversion; the caller feeds it to the gate
    /// as under-voltage. The first conversion after enabling the reference
    /// is discarded while the reference settles.
    pub fn read(&mut self) -> Option<u16> {
        if self.discard_next {
            let _ = self.adc.blocking_read(&mut self.channel);
            self.discard_next = false;
        }

        let reading = self.adc.blocking_read(&mut self.channel);
        VrefintSample::new(read_vrefint_calibration(), reading).supply_millivolts()
    }
}
