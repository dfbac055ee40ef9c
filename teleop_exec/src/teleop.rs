//! # Teleoperation Loop
//!
//! [`Teleop`] owns the pose demand, the rotation index, and the publisher. Each cycle it blocks
//! for one key from a [`KeySource`], applies the decoded command, publishes the pose if anything
//! changed, then sleeps out the rest of the 50 Hz cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    io::{self, Read},
    thread,
    time::{Duration, Instant},
};

use chrono::Utc;
use comms_if::cmd::pose::{Pose, PoseStamped};
use log::{error, info, trace, warn};

use crate::{
    key::{Axis, Command, Effect},
    pose_pub::PosePublisher,
    rotation::{RotationIndex, ROTATION_TABLE},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
pub const CYCLE_PERIOD_S: f64 = 0.02;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A blocking source of key presses.
pub trait KeySource {
    /// Block until the next key byte is available.
    ///
    /// Returns `Ok(None)` once the input has ended.
    fn next_key(&mut self) -> io::Result<Option<u8>>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Keys read one byte at a time from standard input.
pub struct StdinKeys {
    stdin: io::Stdin,
}

/// The teleoperation state and its publisher.
pub struct Teleop<P> {
    /// The pose demand, published as is
    cmd: PoseStamped,

    rot_idx: RotationIndex,

    publisher: P,

    /// Number of publishes attempted, used as the next header sequence number
    num_published: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TeleopError {
    #[error("Could not read from the keyboard: {0}")]
    InputReadFailure(io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StdinKeys {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
        }
    }
}

impl Default for StdinKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for StdinKeys {
    fn next_key(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];

        loop {
            match self.stdin.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                // A signal arriving mid read is not a failure of the input
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<P: PosePublisher> Teleop<P> {
    /// Create a new teleop at the identity pose in the given frame.
    pub fn new(frame_id: &str, publisher: P) -> Self {
        Self {
            cmd: PoseStamped::identity(frame_id),
            rot_idx: RotationIndex::default(),
            publisher,
            num_published: 0,
        }
    }

    /// The current pose demand.
    pub fn pose(&self) -> &Pose {
        &self.cmd.pose
    }

    pub fn rotation_index(&self) -> RotationIndex {
        self.rot_idx
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Apply a command to the pose demand.
    pub fn apply(&mut self, command: Command) {
        match command.effect() {
            Effect::Translate { axis, delta_m } => {
                let position = &mut self.cmd.pose.position;
                match axis {
                    Axis::X => position.x += delta_m,
                    Axis::Y => position.y += delta_m,
                    Axis::Z => position.z += delta_m,
                }
            },
            Effect::Yaw(dir) => {
                self.rot_idx.step(dir);
                self.cmd.pose.orientation = ROTATION_TABLE.orientation(self.rot_idx);
            }
        }
    }

    /// Decode and apply a key, returning true if the pose demand changed.
    pub fn handle_key(&mut self, key: u8) -> bool {
        match Command::from_key(key) {
            Some(command) => {
                self.apply(command);
                trace!("{:?} -> {:?}", command, self.cmd.pose);
                true
            },
            None => false
        }
    }

    /// Stamp and publish the current pose demand.
    ///
    /// Publishing is best effort, failures are logged and otherwise ignored.
    pub fn publish(&mut self) {
        self.cmd.header.seq = self.num_published;
        self.cmd.header.stamp = Utc::now();
        self.num_published += 1;

        if let Err(e) = self.publisher.publish(&self.cmd) {
            warn!("Could not publish pose: {}", e);
        }
    }

    /// Process one key, publishing if it changed the pose demand.
    pub fn cycle(&mut self, key: u8) {
        let dirty = self.handle_key(key);

        if dirty {
            self.publish();
        }
    }

    /// Run the loop until the input ends or fails.
    ///
    /// A read failure is not retried: the error is logged and returned without processing any
    /// further keys.
    pub fn run<K: KeySource>(&mut self, keys: &mut K) -> Result<(), TeleopError> {
        let cycle_period = Duration::from_secs_f64(CYCLE_PERIOD_S);

        loop {
            let cycle_start = Instant::now();

            let key = match keys.next_key() {
                Ok(Some(k)) => k,
                Ok(None) => {
                    info!("End of keyboard input, stopping");
                    return Ok(())
                },
                Err(e) => {
                    error!("Error reading from the keyboard: {}", e);
                    return Err(TeleopError::InputReadFailure(e))
                }
            };

            self.cycle(key);

            thread::yield_now();

            // Time blocked on input counts towards the cycle, no catch up is made for overruns
            match cycle_period.checked_sub(cycle_start.elapsed()) {
                Some(d) => thread::sleep(d),
                None => trace!("Cycle overran (blocked on input)"),
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{pose_pub::PosePubError, rotation::NUM_ROTATIONS};
    use comms_if::{cmd::pose::Quaternion, net::zmq};
    use std::collections::VecDeque;

    const EPS: f64 = 1e-9;

    /// Publisher recording everything sent to it
    #[derive(Default)]
    struct Recorder {
        sent: Vec<PoseStamped>,
        fail: bool,
    }

    impl PosePublisher for Recorder {
        fn publish(&mut self, cmd: &PoseStamped) -> Result<(), PosePubError> {
            self.sent.push(cmd.clone());

            if self.fail {
                Err(PosePubError::SendError(zmq::Error::EAGAIN))
            }
            else {
                Ok(())
            }
        }
    }

    /// Key source replaying a script, ending the input once it runs out
    struct Script(VecDeque<io::Result<u8>>);

    impl Script {
        fn keys(keys: &[u8]) -> Self {
            Self(keys.iter().map(|k| Ok(*k)).collect())
        }
    }

    impl KeySource for Script {
        fn next_key(&mut self) -> io::Result<Option<u8>> {
            match self.0.pop_front() {
                Some(Ok(k)) => Ok(Some(k)),
                Some(Err(e)) => Err(e),
                None => Ok(None),
            }
        }
    }

    fn teleop() -> Teleop<Recorder> {
        Teleop::new("base_link", Recorder::default())
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn test_starts_at_identity() {
        let t = teleop();

        assert_eq!(t.pose(), &Pose::default());
        assert_eq!(t.pose().orientation, Quaternion::IDENTITY);
        assert_eq!(t.rotation_index().get(), 0);
        assert!(t.publisher().sent.is_empty());
    }

    #[test]
    fn test_forward_forward_left() {
        let mut t = teleop();

        t.run(&mut Script::keys(b"wwa")).unwrap();

        let sent = &t.publisher().sent;
        assert_eq!(sent.len(), 3);

        let expected = [(0.1, 0.0), (0.2, 0.0), (0.2, 0.1)];
        for (cmd, (x, y)) in sent.iter().zip(expected.iter()) {
            assert_close(cmd.pose.position.x, *x);
            assert_close(cmd.pose.position.y, *y);
            assert_close(cmd.pose.position.z, 0.0);
            assert_eq!(cmd.pose.orientation, Quaternion::IDENTITY);
            assert_eq!(cmd.header.frame_id, "base_link");
        }

        // Sequence numbers count publishes
        let seqs: Vec<u64> = sent.iter().map(|c| c.header.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn test_yaw_there_and_back() {
        let mut t = teleop();

        assert!(t.handle_key(b'z'));
        assert_eq!(t.rotation_index().get(), 1);
        assert!((t.pose().orientation.z - 0.383).abs() < 1e-3);
        assert!((t.pose().orientation.w - 0.924).abs() < 1e-3);

        assert!(t.handle_key(b'x'));
        assert_eq!(t.rotation_index().get(), 0);
        assert_close(t.pose().orientation.z, 0.0);
        assert_close(t.pose().orientation.w, 1.0);
    }

    #[test]
    fn test_full_turns() {
        for key in [b'z', b'x'].iter() {
            let mut t = teleop();
            t.handle_key(b'z');
            let start_idx = t.rotation_index();
            let start_q = t.pose().orientation;

            for _ in 0..NUM_ROTATIONS {
                t.handle_key(*key);
            }

            assert_eq!(t.rotation_index(), start_idx);
            assert_eq!(t.pose().orientation, start_q);
        }
    }

    #[test]
    fn test_unbound_keys_do_nothing() {
        let mut t = teleop();
        t.handle_key(b'w');
        t.handle_key(b'z');
        let pose = *t.pose();
        let idx = t.rotation_index();

        for _ in 0..100 {
            t.cycle(b'k');
            t.cycle(b' ');
            t.cycle(0x1b);
            t.cycle(b'W');
        }

        assert_eq!(t.pose(), &pose);
        assert_eq!(t.rotation_index(), idx);
        assert!(t.publisher().sent.is_empty());
    }

    #[test]
    fn test_key_sequence_accumulates() {
        let keys = b"wasdqezxkj\n";

        // Small LCG so the sequence is fixed
        let mut state: u32 = 12345;
        let mut seq = Vec::new();
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            seq.push(keys[(state >> 16) as usize % keys.len()]);
        }

        let mut t = teleop();
        let mut num_dirty = 0;
        for k in seq.iter() {
            if t.handle_key(*k) {
                num_dirty += 1;
            }
        }

        let count = |c: u8| seq.iter().filter(|k| **k == c).count() as f64;

        assert_close(t.pose().position.x, 0.1 * (count(b'w') - count(b's')));
        assert_close(t.pose().position.y, 0.1 * (count(b'a') - count(b'd')));
        assert_close(t.pose().position.z, 0.1 * (count(b'q') - count(b'e')));

        let turns = count(b'z') as i64 - count(b'x') as i64;
        let idx = turns.rem_euclid(NUM_ROTATIONS as i64) as usize;
        assert_eq!(t.rotation_index().get(), idx);
        assert_eq!(
            t.pose().orientation,
            ROTATION_TABLE.orientation(RotationIndex::new(idx))
        );
        assert_eq!(t.pose().orientation.x, 0.0);
        assert_eq!(t.pose().orientation.y, 0.0);

        let unbound = count(b'k') + count(b'j') + count(b'\n');
        assert_eq!(num_dirty, seq.len() - unbound as usize);
    }

    #[test]
    fn test_read_error_stops_loop() {
        let mut script = Script(VecDeque::from(vec![
            Ok(b'w'),
            Err(io::Error::new(io::ErrorKind::Other, "keyboard unplugged")),
            Ok(b'w'),
        ]));

        let mut t = teleop();
        let result = t.run(&mut script);

        assert!(matches!(result, Err(TeleopError::InputReadFailure(_))));
        assert_eq!(t.publisher().sent.len(), 1);
        assert_close(t.pose().position.x, 0.1);

        // Nothing was read after the failure
        assert_eq!(script.0.len(), 1);
    }

    #[test]
    fn test_publish_failure_is_ignored() {
        let mut t = Teleop::new("base_link", Recorder { fail: true, ..Default::default() });

        t.run(&mut Script::keys(b"qq")).unwrap();

        assert_eq!(t.publisher().sent.len(), 2);
        assert_close(t.pose().position.z, 0.2);
    }

    #[test]
    fn test_run_keeps_cycle_rate() {
        let mut t = teleop();
        let start = Instant::now();

        t.run(&mut Script::keys(b"wwww")).unwrap();

        assert!(start.elapsed() >= Duration::from_secs_f64(4.0 * CYCLE_PERIOD_S));
    }
}
