/// Tunables of the engine and the boot sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum GOSUB nesting.
    pub call_stack_capacity: usize,
    /// Bytes available to one script run.
    pub memory_budget: usize,
    /// Headroom below which a run halts with a memory error.
    pub memory_threshold: usize,
    /// Working memory the loader reserves beyond twice the file size.
    pub load_margin: usize,
    /// Consecutive failed boots that trigger a reformat.
    pub crash_threshold: usize,
    /// Slots in the crash-log flash region.
    pub crash_slots: usize,
    pub sleep_slice_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            call_stack_capacity: 4096,
            memory_budget: 200 * 1024,
            memory_threshold: 3 * 1024,
            load_margin: 4 * 1024,
            crash_threshold: 3,
            crash_slots: 16,
            sleep_slice_ms: 20,
            poll_interval_ms: 5,
        }
    }
}
