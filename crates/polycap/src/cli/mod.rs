//! Command implementations for the `polycap` binary.

pub mod catalog;
pub mod config;
pub mod describe;
pub mod interactive;
pub mod status;
