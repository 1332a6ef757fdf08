use std::time::{Duration, Instant};

/// Monotonic millisecond clock with a blocking sleep.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&mut self, ms: u64);
}

#[derive(Debug)]
pub struct SystemClock {
    boot: Instant,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock {
            boot: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }
    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Clock that only advances when slept on.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: u64,
    pub sleeps: Vec<u64>,
}

impl ManualClock {
    pub fn new(now: u64) -> ManualClock {
        ManualClock { now, sleeps: vec![] }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    pub fn slept(&self) -> u64 {
        self.sleeps.iter().sum()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push(ms);
        self.now += ms;
    }
}
