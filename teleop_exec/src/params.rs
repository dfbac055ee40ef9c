//! # Teleop Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::io::ErrorKind;

use log::warn;
use serde::Deserialize;
use util::params::LoadError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Smallest number of pending pose messages the publisher must be able to buffer.
pub const MIN_POSE_BACKLOG: i32 = 1000;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Middleware bootstrap parameters, loaded from `params/teleop_exec.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TeleopExecParams {

    /// Endpoint the pose PUB socket binds to
    pub pose_endpoint: String,

    /// Topic prefixed to every published pose
    pub pose_topic: String,

    /// Reference frame the pose is expressed in
    pub frame_id: String,

    /// Send high water mark of the pose socket
    pub pose_backlog: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("The pose backlog must be at least {min}, found {0}", min = MIN_POSE_BACKLOG)]
    BacklogTooSmall(i32),

    #[error("The {0} parameter must not be empty")]
    Empty(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TeleopExecParams {
    /// Load the parameters from `file` in the software root's `params` directory.
    ///
    /// If the software root is not set or the file does not exist the defaults are used instead.
    /// A file which exists but cannot be read or parsed is still an error.
    pub fn load_or_default(file: &str) -> Result<Self, LoadError> {
        Self::or_default(util::params::load(file))
    }

    fn or_default(loaded: Result<Self, LoadError>) -> Result<Self, LoadError> {
        match loaded {
            Err(LoadError::SwRootNotSet) => {
                warn!("Software root not set, using default parameters");
                Ok(Self::default())
            },
            Err(LoadError::FileLoadError(e)) if e.kind() == ErrorKind::NotFound => {
                warn!("Parameter file not found, using default parameters");
                Ok(Self::default())
            },
            other => other,
        }
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.pose_endpoint.is_empty() {
            return Err(ParamsError::Empty("pose_endpoint"));
        }
        if self.pose_topic.is_empty() {
            return Err(ParamsError::Empty("pose_topic"));
        }
        if self.frame_id.is_empty() {
            return Err(ParamsError::Empty("frame_id"));
        }
        if self.pose_backlog < MIN_POSE_BACKLOG {
            return Err(ParamsError::BacklogTooSmall(self.pose_backlog));
        }

        Ok(())
    }
}

impl Default for TeleopExecParams {
    fn default() -> Self {
        Self {
            pose_endpoint: "tcp://*:5030".into(),
            pose_topic: "/firefly/command/pose".into(),
            frame_id: "base_link".into(),
            pose_backlog: MIN_POSE_BACKLOG,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(TeleopExecParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        let params = TeleopExecParams {
            pose_backlog: 10,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::BacklogTooSmall(10)));

        let params = TeleopExecParams {
            pose_topic: String::new(),
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::Empty("pose_topic")));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let missing = std::env::temp_dir().join("teleop_exec_params_does_not_exist.toml");
        let loaded = util::params::load_from_path(&missing);

        assert_eq!(
            TeleopExecParams::or_default(loaded).unwrap(),
            TeleopExecParams::default()
        );
    }

    #[test]
    fn test_unset_root_falls_back_to_defaults() {
        assert_eq!(
            TeleopExecParams::or_default(Err(LoadError::SwRootNotSet)).unwrap(),
            TeleopExecParams::default()
        );
    }

    #[test]
    fn test_unreadable_file_is_still_an_error() {
        let denied = std::io::Error::new(ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            TeleopExecParams::or_default(Err(LoadError::FileLoadError(denied))),
            Err(LoadError::FileLoadError(_))
        ));

        let path = std::env::temp_dir()
            .join(format!("teleop_exec_params_{}_bad.toml", std::process::id()));
        std::fs::write(&path, "pose_backlog = \"lots\"\n").unwrap();
        assert!(matches!(
            TeleopExecParams::or_default(util::params::load_from_path(&path)),
            Err(LoadError::DeserialiseError(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = std::env::temp_dir()
            .join(format!("teleop_exec_params_{}_partial.toml", std::process::id()));
        std::fs::write(&path, "frame_id = \"world\"\n").unwrap();

        let params = TeleopExecParams::or_default(util::params::load_from_path(&path)).unwrap();
        assert_eq!(params.frame_id, "world");
        assert_eq!(params.pose_topic, TeleopExecParams::default().pose_topic);

        std::fs::remove_file(path).ok();
    }
}
