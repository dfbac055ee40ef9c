//! # Key Decoding
//!
//! Raw bytes read from the terminal are decoded into [`Command`]s using the [`KEY_BINDINGS`]
//! table. Each command then maps to an [`Effect`] on the pose demand. Keeping the two steps apart
//! means the key layout can change without touching the dispatch logic.

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Translation applied by a single key press, in meters.
pub const STEP_M: f64 = 0.1;

/// Key to command bindings, in banner order.
pub const KEY_BINDINGS: [(u8, Command); 8] = [
    (b'w', Command::Forward),
    (b's', Command::Backward),
    (b'a', Command::Left),
    (b'd', Command::Right),
    (b'q', Command::Up),
    (b'e', Command::Down),
    (b'z', Command::YawCcw),
    (b'x', Command::YawCw),
];

/// Pairs of opposing commands and the description shown in the usage banner.
const BANNER_PAIRS: [(Command, Command, &str); 4] = [
    (Command::Forward, Command::Backward, "forward/back"),
    (Command::Left, Command::Right, "left/right"),
    (Command::Up, Command::Down, "up/down"),
    (Command::YawCcw, Command::YawCw, "yaw counterclockwise/clockwise"),
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A teleoperation command produced by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,

    /// 45 degree counter-clockwise yaw step
    YawCcw,

    /// 45 degree clockwise yaw step
    YawCw,
}

/// The effect a command has on the pose demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Add `delta_m` to the position along `axis`.
    Translate {
        axis: Axis,
        delta_m: f64,
    },

    /// Step the rotation index in the given direction.
    Yaw(YawDir),
}

/// A position axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Direction of a yaw step, seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YawDir {
    CounterClockwise,
    Clockwise,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Command {
    /// Decode a key byte into a command. Unbound keys give `None`.
    pub fn from_key(key: u8) -> Option<Self> {
        KEY_BINDINGS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
    }

    /// The key bound to this command.
    pub fn key(self) -> u8 {
        match self {
            Command::Forward => b'w',
            Command::Backward => b's',
            Command::Left => b'a',
            Command::Right => b'd',
            Command::Up => b'q',
            Command::Down => b'e',
            Command::YawCcw => b'z',
            Command::YawCw => b'x',
        }
    }

    /// The effect of this command on the pose demand.
    pub fn effect(self) -> Effect {
        match self {
            Command::Forward => Effect::Translate { axis: Axis::X, delta_m: STEP_M },
            Command::Backward => Effect::Translate { axis: Axis::X, delta_m: -STEP_M },
            Command::Left => Effect::Translate { axis: Axis::Y, delta_m: STEP_M },
            Command::Right => Effect::Translate { axis: Axis::Y, delta_m: -STEP_M },
            Command::Up => Effect::Translate { axis: Axis::Z, delta_m: STEP_M },
            Command::Down => Effect::Translate { axis: Axis::Z, delta_m: -STEP_M },
            Command::YawCcw => Effect::Yaw(YawDir::CounterClockwise),
            Command::YawCw => Effect::Yaw(YawDir::Clockwise),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the usage banner printed at startup.
pub fn usage_banner() -> String {
    let mut banner = String::from("Reading from keyboard\n---------------------------\n");

    for (a, b, desc) in BANNER_PAIRS.iter() {
        banner.push_str(&format!(
            "Use '{}{}' to {}\n",
            a.key().to_ascii_uppercase() as char,
            b.key().to_ascii_uppercase() as char,
            desc
        ));
    }

    banner
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_bound_keys() {
        assert_eq!(Command::from_key(b'w'), Some(Command::Forward));
        assert_eq!(Command::from_key(b's'), Some(Command::Backward));
        assert_eq!(Command::from_key(b'a'), Some(Command::Left));
        assert_eq!(Command::from_key(b'd'), Some(Command::Right));
        assert_eq!(Command::from_key(b'q'), Some(Command::Up));
        assert_eq!(Command::from_key(b'e'), Some(Command::Down));
        assert_eq!(Command::from_key(b'z'), Some(Command::YawCcw));
        assert_eq!(Command::from_key(b'x'), Some(Command::YawCw));
    }

    #[test]
    fn test_key_matches_bindings() {
        for (key, command) in KEY_BINDINGS.iter() {
            assert_eq!(command.key(), *key);
            assert_eq!(Command::from_key(command.key()), Some(*command));
        }
    }

    #[test]
    fn test_decode_unbound_keys() {
        let bound: Vec<u8> = KEY_BINDINGS.iter().map(|(k, _)| *k).collect();

        for key in 0..=u8::MAX {
            if !bound.contains(&key) {
                assert_eq!(Command::from_key(key), None, "key {:#04x}", key);
            }
        }

        // Upper case is not bound
        assert_eq!(Command::from_key(b'W'), None);
    }

    #[test]
    fn test_opposing_effects_cancel() {
        for (a, b, _) in BANNER_PAIRS.iter() {
            match (a.effect(), b.effect()) {
                (
                    Effect::Translate { axis: axis_a, delta_m: da },
                    Effect::Translate { axis: axis_b, delta_m: db }
                ) => {
                    assert_eq!(axis_a, axis_b);
                    assert_eq!(da, STEP_M);
                    assert_eq!(da + db, 0.0);
                },
                (Effect::Yaw(YawDir::CounterClockwise), Effect::Yaw(YawDir::Clockwise)) => (),
                other => panic!("Unexpected effect pair {:?}", other)
            }
        }
    }

    #[test]
    fn test_usage_banner() {
        assert_eq!(
            usage_banner(),
            "Reading from keyboard\n\
             ---------------------------\n\
             Use 'WS' to forward/back\n\
             Use 'AD' to left/right\n\
             Use 'QE' to up/down\n\
             Use 'ZX' to yaw counterclockwise/clockwise\n"
        );
    }
}
