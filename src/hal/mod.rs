/*!
## Hardware Abstraction Module

Traits for the collaborators the engine drives but does not implement: the
script store, the emulated HID device, the clock, the physical button and
the error sink. Each trait ships with an in-memory implementation used by
the tests and a host implementation used by the simulator.

*/

mod clock;
mod port;
mod sink;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use port::{Action, Button, FixedButton, Hat, Identity, MouseButton, OutputPort, ProButton, RecordingPort};
pub use sink::{ErrorSink, Report};
pub use store::{DirStore, Handle, MemStore, OpenMode, ScriptStore};
