//! # Teleoperation Library
//!
//! Keyboard teleoperation of a simulated Firefly hexacopter. Single key presses are decoded into
//! [`key::Command`]s, applied to a pose demand by [`teleop::Teleop`], and the resulting pose is
//! published on the pose command topic.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Key decoding and the command effect table
pub mod key;

/// Parameters for the teleop executable
pub mod params;

/// Publishing pose demands to the vehicle
pub mod pose_pub;

/// Discrete yaw rotation table
pub mod rotation;

/// Interrupt handling
pub mod signal;

/// The teleoperation loop
pub mod teleop;

/// Terminal raw mode management
pub mod term;
