//! # Pose Publisher
//!
//! Publishes pose demands on the pose command topic. Publishing is fire-and-forget: the PUB
//! socket buffers up to its high water mark and silently drops anything beyond that.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    cmd::pose::{PoseMsgError, PoseStamped},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::debug;

use crate::params::TeleopExecParams;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something a pose demand can be published to.
pub trait PosePublisher {
    /// Publish the pose. Must not block.
    fn publish(&mut self, cmd: &PoseStamped) -> Result<(), PosePubError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pose publisher backed by a bound ZMQ PUB socket.
pub struct ZeroMqPosePublisher {
    socket: MonitoredSocket,

    topic: String,

    /// Subscriber state at the last publish, used to log changes
    had_subscriber: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PosePubError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not encode the pose: {0}")]
    EncodeError(PoseMsgError),

    #[error("Could not send the pose: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ZeroMqPosePublisher {
    /// Create a new pose publisher.
    ///
    /// This function will not wait for a subscriber before returning.
    pub fn new(ctx: &zmq::Context, params: &TeleopExecParams) -> Result<Self, PosePubError> {
        let socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            send_hwm: params.pose_backlog,
            linger: 1,
            send_timeout: 0,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.pose_endpoint
        ).map_err(PosePubError::SocketError)?;

        Ok(Self {
            socket,
            topic: params.pose_topic.clone(),
            had_subscriber: false,
        })
    }

    /// Return true if at least one subscriber is connected.
    pub fn has_subscriber(&self) -> bool {
        self.socket.connected()
    }
}

impl PosePublisher for ZeroMqPosePublisher {
    fn publish(&mut self, cmd: &PoseStamped) -> Result<(), PosePubError> {
        let has_subscriber = self.has_subscriber();
        if has_subscriber != self.had_subscriber {
            debug!("Pose subscriber connected: {}", has_subscriber);
            self.had_subscriber = has_subscriber;
        }

        let msg = cmd.to_message(&self.topic)
            .map_err(PosePubError::EncodeError)?;

        self.socket.send(&msg, zmq::DONTWAIT)
            .map_err(PosePubError::SendError)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_publish_without_subscriber() {
        let ctx = zmq::Context::new();
        let params = TeleopExecParams {
            pose_endpoint: "inproc://test_pose_pub".into(),
            ..Default::default()
        };

        let mut publisher = ZeroMqPosePublisher::new(&ctx, &params).unwrap();
        assert!(!publisher.has_subscriber());

        let cmd = PoseStamped::identity(&params.frame_id);
        for _ in 0..(params.pose_backlog + 10) {
            publisher.publish(&cmd).unwrap();
        }
    }

    #[test]
    fn test_bad_endpoint() {
        let ctx = zmq::Context::new();
        let params = TeleopExecParams {
            pose_endpoint: "not-an-endpoint".into(),
            ..Default::default()
        };

        assert!(matches!(
            ZeroMqPosePublisher::new(&ctx, &params),
            Err(PosePubError::SocketError(_))
        ));
    }
}
