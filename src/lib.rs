//! # AutoInput
//!
//! Script engine for a microcontroller that emulates a keyboard, a mouse
//! and a game controller. Scripts are plain text, one command per line:
//!
//! ```text
//! UseLED(1)
//! SET i = 0
//! LABEL Loop
//! KeyPushFor(ENTER, 0.05)
//! SetLED(0, 255 * (i % 2), 0)
//! SET i = i + 1
//! IF i < 3 GOTO Loop
//! END
//! ```
//!
//! [`mach`] loads and runs scripts against the [`hal`] collaborator traits,
//! [`lang`] holds the expression grammar and the line syntax, and
//! [`recovery`] keeps a device that crashes on every boot from staying
//! bricked. The `autoinput` binary runs scripts on the host with a
//! terminal standing in for the device.

pub mod config;
pub mod hal;
pub mod lang;
pub mod mach;
pub mod recovery;
pub mod term;

pub use config::Config;
