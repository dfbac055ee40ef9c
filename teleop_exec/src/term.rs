//! # Terminal Raw Mode
//!
//! Puts the controlling terminal into a raw mode so each key press is delivered as soon as it is
//! typed, without echo. The original ("cooked") settings are captured on entry and must be
//! restored exactly once on every exit path.
//!
//! [`RawMode`] restores the terminal when dropped, which covers normal and error exits. The
//! interrupt handler exits the process without unwinding, so it restores through a
//! [`TermRestore`] handle cloned from the guard. Both share a take-once snapshot, so whichever
//! runs first does the restore and the other does nothing.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    io,
    os::unix::io::RawFd,
    sync::{Arc, Mutex},
};

use log::{debug, warn};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// End of line control character used in raw mode
const RAW_VEOL: libc::cc_t = 1;

/// End of file control character used in raw mode
const RAW_VEOF: libc::cc_t = 2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Shared handle able to put the original terminal settings back.
#[derive(Clone)]
pub struct TermRestore {
    fd: RawFd,

    /// Original settings, taken on the first restore
    cooked: Arc<Mutex<Option<libc::termios>>>,
}

/// Guard keeping the terminal in raw mode for as long as it lives.
pub struct RawMode {
    restore: TermRestore,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error("Could not read the terminal settings (is the input a terminal?): {0}")]
    GetAttrError(io::Error),

    #[error("Could not apply the terminal settings: {0}")]
    SetAttrError(io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TermRestore {
    /// Create a handle which will restore `cooked` onto `fd`.
    pub fn new(fd: RawFd, cooked: libc::termios) -> Self {
        Self {
            fd,
            cooked: Arc::new(Mutex::new(Some(cooked))),
        }
    }

    /// Restore the original settings.
    ///
    /// Returns `Ok(true)` if this call restored the terminal and `Ok(false)` if it had already
    /// been restored. The snapshot is consumed even if applying it fails, so the restore is never
    /// attempted twice.
    pub fn restore(&self) -> Result<bool, TermError> {
        let cooked = {
            let mut guard = match self.cooked.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.take()
        };

        match cooked {
            Some(c) => {
                set_attr(self.fd, &c)?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Return true if the terminal has not yet been restored.
    pub fn is_pending(&self) -> bool {
        match self.cooked.lock() {
            Ok(g) => g.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

impl RawMode {
    /// Capture the current settings of `fd` and switch it into raw mode.
    pub fn enter(fd: RawFd) -> Result<Self, TermError> {
        let cooked = get_attr(fd)?;
        let raw = derive_raw(&cooked);

        set_attr(fd, &raw)?;

        debug!("Terminal on fd {} switched to raw mode", fd);

        Ok(Self {
            restore: TermRestore::new(fd, cooked),
        })
    }

    /// Get a handle which can restore the terminal from outside the guard's scope.
    pub fn restore_handle(&self) -> TermRestore {
        self.restore.clone()
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        match self.restore.restore() {
            Ok(true) => debug!("Terminal restored"),
            Ok(false) => (),
            Err(e) => warn!("Could not restore the terminal: {}", e),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Derive raw mode settings from the cooked ones.
///
/// Canonical line processing and echo are disabled, the end of line and end of file characters
/// are replaced by single byte sentinels, and reads block until exactly one byte is available.
/// Everything else, including signal generation and output processing, is left as it was.
pub fn derive_raw(cooked: &libc::termios) -> libc::termios {
    let mut raw = *cooked;

    raw.c_lflag &= !(libc::ICANON | libc::ECHO);

    raw.c_cc[libc::VEOL] = RAW_VEOL;
    raw.c_cc[libc::VEOF] = RAW_VEOF;

    // On some platforms VMIN/VTIME share slots with VEOF/VEOL, so these go last
    raw.c_cc[libc::VMIN] = 1;
    raw.c_cc[libc::VTIME] = 0;

    raw
}

fn get_attr(fd: RawFd) -> Result<libc::termios, TermError> {
    // SAFETY: termios is plain old data and is fully written by tcgetattr on success.
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
        return Err(TermError::GetAttrError(io::Error::last_os_error()));
    }

    Ok(termios)
}

fn set_attr(fd: RawFd, termios: &libc::termios) -> Result<(), TermError> {
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
        return Err(TermError::SetAttrError(io::Error::last_os_error()));
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
