/*!
## Rust Machine Module

This Rust module loads scripts and runs them one line at a time against
the emulated device.

*/

/// Index of a script line.
pub type Address = usize;

mod device;
mod eval;
mod function;
mod guard;
mod label;
mod loader;
mod replay;
mod runtime;
mod stack;
mod var;

pub mod keys;

pub use device::{millis, Device};
pub use eval::{expand_line, truthy, Evaluator};
pub use function::{Builtin, Function, Host};
pub use guard::{Footprint, Guard};
pub use label::Labels;
pub use loader::{load, LineReader, Script};
pub use replay::{transform, Record, Replay};
pub use runtime::{execute_script, Context, Event, Runtime, ScriptState};
pub use stack::Stack;
pub use var::{format_value, Var};

#[cfg(test)]
mod tests;
