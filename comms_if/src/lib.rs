//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the teleoperation software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command messages sent to the vehicle
pub mod cmd;

/// Network module
pub mod net;
