#![no_std]

// Control logic for the Meshtastic watcher.
//
// This crate keeps the press schedule, debounce, and supply supervision
// portable by avoiding the Rust standard library and every HAL type. The
// firmware crate wires these state machines to pins, the ADC, and a ticker;
// the test suite drives them tick by tick on the host.

pub mod config;
pub mod press;
pub mod schedule;
pub mod supervisor;
pub mod supply;
pub mod uvlo;
