//! # Interrupt Handling
//!
//! The teleop loop spends nearly all its time blocked reading the terminal, so it cannot poll a
//! shutdown flag. Instead the interrupt handler restores the terminal itself and exits the
//! process directly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};

use crate::term::TermRestore;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Could not set the interrupt handler: {0}")]
    SetHandlerError(ctrlc::Error),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Install the interrupt (Ctrl-C) handler.
///
/// On interrupt the terminal is restored through `restore` and the process exits with status 0.
/// The handler only touches the terminal snapshot, never the loop's state.
pub fn install_interrupt_handler(restore: TermRestore) -> Result<(), SignalError> {
    ctrlc::set_handler(move || {
        on_interrupt(&restore);
        std::process::exit(0);
    })
    .map_err(SignalError::SetHandlerError)
}

/// Everything the interrupt handler does before exiting.
fn on_interrupt(restore: &TermRestore) {
    if let Err(e) = restore.restore() {
        warn!("Could not restore the terminal on interrupt: {}", e);
    }

    info!("Interrupted, exiting");
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_on_interrupt_consumes_snapshot() {
        let cooked: libc::termios = unsafe { std::mem::zeroed() };
        let restore = TermRestore::new(-1, cooked);

        on_interrupt(&restore);

        assert!(!restore.is_pending());
    }
}
