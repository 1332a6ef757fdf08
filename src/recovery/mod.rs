/*!
## Crash Recovery Module

Counts consecutive boots that never reached the success checkpoint, in a
flash region kept apart from the script store. Too many in a row and the
store is reformatted before any script can run.

*/

mod boot;
mod counter;
mod flash;

pub use boot::{Board, BootDecision, Recovery};
pub use counter::{CrashLog, SLOT_SIZE};
pub use flash::{FileFlash, Flash, MemFlash};
