//! Hardware glue kept out of the control logic.

pub mod supply;
