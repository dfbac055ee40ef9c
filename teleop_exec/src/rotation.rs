//! # Discrete Yaw Rotations
//!
//! Yaw is commanded in 45 degree steps, so the only orientations the vehicle is ever asked for
//! are the eight entries of [`ROTATION_TABLE`]. Each entry holds the sine and cosine of half the
//! yaw angle, which are the z and w components of a quaternion rotating about the z axis.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::cmd::pose::Quaternion;

use crate::key::YawDir;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of discrete yaw orientations.
pub const NUM_ROTATIONS: usize = 8;

/// sin(22.5 deg)
const SIN_PI_8: f64 = 0.382_683_432_365_089_8;

/// cos(22.5 deg)
const COS_PI_8: f64 = 0.923_879_532_511_286_7;

/// (sin, cos) of the half angle for yaws of 0, 45, 90, 135, 180, -135, -90 and -45 degrees.
///
/// The last three entries use the negative yaw so that w stays non-negative.
pub const ROTATION_TABLE: RotationTable = RotationTable([
    (0.0, 1.0),
    (SIN_PI_8, COS_PI_8),
    (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (COS_PI_8, SIN_PI_8),
    (1.0, 0.0),
    (-COS_PI_8, SIN_PI_8),
    (-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (-SIN_PI_8, COS_PI_8),
]);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Ordered table of half angle (sin, cos) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTable([(f64, f64); NUM_ROTATIONS]);

/// Index into the [`RotationTable`], wrapping modulo [`NUM_ROTATIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationIndex(usize);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RotationTable {
    /// The orientation quaternion for the given index.
    ///
    /// Roll and pitch components are always zero.
    pub fn orientation(&self, index: RotationIndex) -> Quaternion {
        let (sin, cos) = self.0[index.get()];

        Quaternion {
            w: cos,
            x: 0.0,
            y: 0.0,
            z: sin,
        }
    }
}

impl RotationIndex {
    /// Create an index, wrapping values outside of the table.
    pub fn new(index: usize) -> Self {
        Self(index % NUM_ROTATIONS)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Move one 45 degree step in the given direction.
    pub fn step(&mut self, dir: YawDir) {
        self.0 = match dir {
            YawDir::CounterClockwise => (self.0 + 1) % NUM_ROTATIONS,
            YawDir::Clockwise => (self.0 + NUM_ROTATIONS - 1) % NUM_ROTATIONS,
        };
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
