//! # AutoInput
//!
//! Host simulator for the script engine.
//!

fn main() {
    autoinput::term::main();
}
