//! # Pose Command Messages
//!
//! A stamped pose demand for the vehicle. The layout mirrors the usual robotics middleware pose
//! message: a header identifying the frame and time, followed by a position and an orientation
//! quaternion.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose with a header, as published on the pose command topic.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PoseStamped {
    /// Sequence, time and frame information
    pub header: Header,

    /// The demanded pose
    pub pose: Pose,
}

/// Standard message header.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Header {
    /// Sequence number of this message, incremented by the publisher on each send.
    pub seq: u64,

    /// UTC timestamp at which the message was published
    #[serde(with = "ts_milliseconds")]
    pub stamp: DateTime<Utc>,

    /// The frame the pose is expressed in
    pub frame_id: String,
}

/// Position and orientation of a rigid body.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Position in meters
    pub position: Point,

    /// Orientation as a unit quaternion
    pub orientation: Quaternion,
}

/// A point in 3D space, in meters.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An orientation quaternion.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while encoding a pose message.
#[derive(Debug, thiserror::Error)]
pub enum PoseMsgError {
    #[error("Could not serialize the pose: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseStamped {
    /// Create a new stamped pose at the identity pose in the given frame.
    ///
    /// The sequence number starts at zero and the stamp is the current time.
    pub fn identity(frame_id: &str) -> Self {
        Self {
            header: Header {
                seq: 0,
                stamp: Utc::now(),
                frame_id: frame_id.into(),
            },
            pose: Pose::default(),
        }
    }

    /// Encode the pose as a single frame message on the given topic.
    ///
    /// The topic is separated from the JSON body by a space so subscribers can filter on it using
    /// `set_subscribe()`.
    pub fn to_message(&self, topic: &str) -> Result<String, PoseMsgError> {
        let body = serde_json::to_string(self).map_err(PoseMsgError::SerializationError)?;

        Ok(format!("{} {}", topic, body))
    }
}

impl Quaternion {
    /// The identity rotation
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Split a message into its topic and decoded pose, as a subscriber would.
    fn decode(msg: &str) -> Option<(&str, PoseStamped)> {
        let mut split = msg.splitn(2, ' ');
        let topic = split.next()?;
        let pose = serde_json::from_str(split.next()?).ok()?;

        Some((topic, pose))
    }

    #[test]
    fn test_identity() {
        let cmd = PoseStamped::identity("base_link");

        assert_eq!(cmd.header.seq, 0);
        assert_eq!(cmd.header.frame_id, "base_link");
        assert_eq!(cmd.pose.position, Point { x: 0.0, y: 0.0, z: 0.0 });
        assert_eq!(cmd.pose.orientation, Quaternion::IDENTITY);
    }

    #[test]
    fn test_message_topic_prefix() {
        let mut cmd = PoseStamped::identity("base_link");
        cmd.pose.position.x = 0.2;
        cmd.pose.orientation.z = 0.5;

        let msg = cmd.to_message("/firefly/command/pose").unwrap();
        assert!(msg.starts_with("/firefly/command/pose {"));

        let (topic, decoded) = decode(&msg).unwrap();
        assert_eq!(topic, "/firefly/command/pose");
        assert_eq!(decoded.pose, cmd.pose);
        assert_eq!(decoded.header.frame_id, "base_link");
        assert_eq!(
            decoded.header.stamp.timestamp_millis(),
            cmd.header.stamp.timestamp_millis()
        );
    }
}
