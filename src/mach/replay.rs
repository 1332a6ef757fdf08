use super::loader::{with_mounted, LineReader};
use super::Device;
use crate::error;
use crate::hal::{MouseButton, OpenMode, ScriptStore};
use crate::lang::Error;
use std::collections::BTreeSet;

type Result<T> = std::result::Result<T, Error>;

/// Playback adjustments for a mouse recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Replay {
    pub time_scale: f64,
    /// Radians, counter-clockwise.
    pub angle: f64,
    pub scale: f64,
}

impl Default for Replay {
    fn default() -> Self {
        Replay {
            time_scale: 1.0,
            angle: 0.0,
            scale: 1.0,
        }
    }
}

/// One row of a recording: `dx,dy,wheel,left,right,middle,delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub dx: i32,
    pub dy: i32,
    pub wheel: i32,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub delay_ms: u64,
}

/// Leading integer of `s` after whitespace, or 0.
fn lenient_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    sign * digits[..end].parse::<i64>().unwrap_or(0)
}

impl Record {
    /// `None` for comments, blank lines and rows with fewer than seven
    /// fields.
    pub fn parse(line: &str) -> Option<Record> {
        let fields = Record::fields(line)?;
        if fields.len() < 7 {
            return None;
        }
        Some(Record::from_fields(&fields))
    }

    /// Parses the unterminated last row of a recording. Missing fields read
    /// as 0; comments and blank lines still give `None`.
    pub fn parse_partial(line: &str) -> Option<Record> {
        Record::fields(line).map(|fields| Record::from_fields(&fields))
    }

    fn fields(line: &str) -> Option<Vec<i64>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || crate::lang::starts_with_keyword(line, "REM") {
            return None;
        }
        Some(
            line.split(',')
                .filter(|field| !field.is_empty())
                .take(7)
                .map(lenient_int)
                .collect(),
        )
    }

    fn from_fields(fields: &[i64]) -> Record {
        let field = |n: usize| fields.get(n).copied().unwrap_or(0);
        let clamp_i32 = |v: i64| v.max(i64::from(i32::min_value())).min(i64::from(i32::max_value())) as i32;
        Record {
            dx: clamp_i32(field(0)),
            dy: clamp_i32(field(1)),
            wheel: clamp_i32(field(2)),
            left: field(3) != 0,
            right: field(4) != 0,
            middle: field(5) != 0,
            delay_ms: field(6).max(0) as u64,
        }
    }
}

fn clamp_i8(v: f64) -> i8 {
    v.round().max(-128.0).min(127.0) as i8
}

/// Rotates then scales a movement and clamps it to a report delta.
pub fn transform(dx: i32, dy: i32, angle: f64, scale: f64) -> (i8, i8) {
    let (sin, cos) = angle.sin_cos();
    let (dx, dy) = (f64::from(dx), f64::from(dy));
    let nx = (dx * cos - dy * sin) * scale;
    let ny = (dx * sin + dy * cos) * scale;
    (clamp_i8(nx), clamp_i8(ny))
}

impl Replay {
    /// Streams the named recording to the device. Returns the number of
    /// records played.
    pub fn play(
        &self,
        store: &mut dyn ScriptStore,
        device: &mut Device,
        held: &mut BTreeSet<MouseButton>,
        name: &str,
    ) -> Result<usize> {
        let time_scale = if self.time_scale.is_finite() { self.time_scale.max(0.0) } else { 1.0 };
        with_mounted(store, |store| {
            let handle = match store.open(name, OpenMode::Read) {
                Ok(handle) => handle,
                Err(error) => return Err(error!(NotFound; format!("{}: {}", name, error))),
            };
            let mut played = 0;
            let result = {
                let mut reader = LineReader::new(&mut *store, &handle);
                loop {
                    let line = match reader.next_line() {
                        Ok(Some(line)) => line,
                        Ok(None) => break Ok(played),
                        Err(error) => break Err(error),
                    };
                    let parsed = if reader.at_end() {
                        Record::parse_partial(&line)
                    } else {
                        Record::parse(&line)
                    };
                    let record = match parsed {
                        Some(record) => record,
                        None => continue,
                    };
                    self.apply(device, held, &record, time_scale);
                    played += 1;
                }
            };
            store.close(handle);
            result
        })
    }

    fn apply(&self, device: &mut Device, held: &mut BTreeSet<MouseButton>, record: &Record, time_scale: f64) {
        let buttons = [
            (MouseButton::Left, record.left),
            (MouseButton::Right, record.right),
            (MouseButton::Middle, record.middle),
        ];
        for (button, pressed) in buttons.iter() {
            device.port().mouse_button(*button, *pressed);
            if *pressed {
                held.insert(*button);
            } else {
                held.remove(button);
            }
        }
        let (x, y) = transform(record.dx, record.dy, self.angle, self.scale);
        let wheel = clamp_i8(f64::from(record.wheel));
        device.port().move_relative(x, y, wheel);
        device.poll(true);
        let wait = (record.delay_ms as f64 * time_scale).round();
        if wait > 0.0 {
            device.sleep(wait as u64);
        }
    }
}
