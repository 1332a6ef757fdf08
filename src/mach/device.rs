use crate::config::Config;
use crate::hal::{Button, Clock, OutputPort};

/// ## Device context
///
/// Wraps the output port with the clock and the physical button. Port
/// servicing is throttled and every wait is sliced so the USB stack keeps
/// being serviced.

pub struct Device<'a> {
    port: &'a mut dyn OutputPort,
    clock: &'a mut dyn Clock,
    button: &'a dyn Button,
    slice_ms: u64,
    poll_interval_ms: u64,
    last_poll: Option<u64>,
}

impl<'a> Device<'a> {
    pub fn new(
        port: &'a mut dyn OutputPort,
        clock: &'a mut dyn Clock,
        button: &'a dyn Button,
        config: &Config,
    ) -> Device<'a> {
        Device {
            port,
            clock,
            button,
            slice_ms: config.sleep_slice_ms.max(1),
            poll_interval_ms: config.poll_interval_ms,
            last_poll: None,
        }
    }

    /// Services the port unless it was serviced less than the poll
    /// interval ago. `force` skips the check.
    pub fn poll(&mut self, force: bool) {
        let now = self.clock.now_ms();
        let due = match self.last_poll {
            Some(last) => now.saturating_sub(last) >= self.poll_interval_ms,
            None => true,
        };
        if force || due {
            self.port.service();
            self.last_poll = Some(now);
        }
    }

    /// Blocks for `ms`, one slice at a time.
    pub fn sleep(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(self.slice_ms);
            self.clock.sleep_ms(step);
            self.poll(false);
            remaining -= step;
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    pub fn port(&mut self) -> &mut dyn OutputPort {
        &mut *self.port
    }
}

/// Whole milliseconds in `seconds`, rounded. Negative or NaN gives 0.
pub fn millis(seconds: f64) -> u64 {
    let ms = (seconds * 1000.0).round();
    if ms > 0.0 {
        ms as u64
    } else {
        0
    }
}
