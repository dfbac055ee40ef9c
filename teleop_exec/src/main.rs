//! # Teleop Executable
//!
//! Keyboard teleoperation of the simulated Firefly hexacopter. Reads key presses from the
//! terminal and publishes the resulting pose demands on the pose command topic.
//!
//! Keys:
//!     - `W`/`S`: forward/back
//!     - `A`/`D`: left/right
//!     - `Q`/`E`: up/down
//!     - `Z`/`X`: yaw 45 degrees counterclockwise/clockwise
//!
//! Ctrl-C restores the terminal and exits.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Result, eyre::WrapErr};
use comms_if::net::zmq;
use log::{info, warn};

// Internal
use teleop_lib::{
    key,
    params::TeleopExecParams,
    pose_pub::ZeroMqPosePublisher,
    signal,
    teleop::{StdinKeys, Teleop},
    term::RawMode,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::{Session, SessionError},
};

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Without a software root the session goes in the temp directory
    let (session, root_set) = match Session::new("teleop_exec", "sessions") {
        Ok(s) => (s, true),
        Err(SessionError::SwRootNotSet) => (
            Session::new_in("teleop_exec", std::env::temp_dir().join("sessions"))
                .wrap_err("Failed to create the session")?,
            false
        ),
        Err(e) => return Err(e).wrap_err("Failed to create the session"),
    };

    logger_init(LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    if !root_set {
        warn!(
            "{} is not set, session created in the temporary directory",
            host::SW_ROOT_ENV_VAR
        );
    }

    info!("Firefly Teleop Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params = TeleopExecParams::load_or_default("teleop_exec.toml")
        .wrap_err("Could not load teleop params")?;
    params.validate()
        .wrap_err("Invalid teleop params")?;

    info!("Parameters loaded");

    // ---- NETWORK INITIALISATION ----

    let zmq_ctx = zmq::Context::new();

    let publisher = ZeroMqPosePublisher::new(&zmq_ctx, &params)
        .wrap_err("Failed to initialise the pose publisher")?;

    info!(
        "Publishing poses on {} at {}",
        params.pose_topic,
        params.pose_endpoint
    );

    let mut teleop = Teleop::new(&params.frame_id, publisher);

    // ---- TERMINAL ----

    let raw_mode = RawMode::enter(libc::STDIN_FILENO)
        .wrap_err("Failed to put the terminal into raw mode")?;

    // If this fails the guard is dropped on return and the terminal restored
    signal::install_interrupt_handler(raw_mode.restore_handle())
        .wrap_err("Failed to install the interrupt handler")?;

    print!("{}", key::usage_banner());

    // ---- MAIN LOOP ----

    let result = teleop.run(&mut StdinKeys::new());

    // Restore before any error report is printed
    drop(raw_mode);

    result.wrap_err("Teleop loop failed")?;

    info!("End of execution");

    Ok(())
}
