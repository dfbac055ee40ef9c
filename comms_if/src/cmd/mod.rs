//! # Command Interface
//!
//! This module defines the command messages which are published to the simulated vehicle.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod pose;
