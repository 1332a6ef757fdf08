use super::flash::{Flash, ERASED};
use crate::lang::Error;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, Error>;

/// Bytes per log slot: a tagged sequence word and its CRC-32.
pub const SLOT_SIZE: usize = 8;

const MARKER_TAG: u32 = 0x424F_4F54;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Erased,
    Marker,
    Torn,
}

fn marker(seq: usize) -> [u8; SLOT_SIZE] {
    let word = (MARKER_TAG ^ seq as u32).to_le_bytes();
    let crc = crc::crc32::checksum_ieee(&word).to_le_bytes();
    let mut record = [0u8; SLOT_SIZE];
    record[..4].copy_from_slice(&word);
    record[4..].copy_from_slice(&crc);
    record
}

fn classify(record: &[u8; SLOT_SIZE]) -> Slot {
    if record.iter().all(|b| *b == ERASED) {
        return Slot::Erased;
    }
    let mut crc = [0u8; 4];
    crc.copy_from_slice(&record[4..]);
    if crc::crc32::checksum_ieee(&record[..4]) == u32::from_le_bytes(crc) {
        Slot::Marker
    } else {
        Slot::Torn
    }
}

/// ## Append-only crash log
///
/// One slot per failed boot, programmed in order. The count is the number of
/// slots before the first erased one, so a half-written slot still counts.
/// Clearing erases the whole region.

#[derive(Debug)]
pub struct CrashLog<F: Flash> {
    flash: F,
    slots: usize,
}

impl<F: Flash> CrashLog<F> {
    pub fn new(flash: F) -> CrashLog<F> {
        let slots = flash.len() / SLOT_SIZE;
        CrashLog { flash, slots }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn read_slot(&mut self, slot: usize) -> Result<Slot> {
        let mut record = [0u8; SLOT_SIZE];
        self.flash.read(slot * SLOT_SIZE, &mut record)?;
        Ok(classify(&record))
    }

    pub fn count(&mut self) -> Result<usize> {
        let mut count = 0;
        for slot in 0..self.slots {
            match self.read_slot(slot)? {
                Slot::Erased => break,
                Slot::Marker => count += 1,
                Slot::Torn => {
                    warn!("crash log slot {} is torn", slot);
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Appends one marker and returns the new count. A full log stays full.
    pub fn record_failure(&mut self) -> Result<usize> {
        let count = self.count()?;
        if count >= self.slots {
            warn!("crash log full at {} slots", self.slots);
            return Ok(count);
        }
        let record = marker(count);
        let offset = count * SLOT_SIZE;
        self.flash.program(offset, &record)?;
        let mut check = [0u8; SLOT_SIZE];
        self.flash.read(offset, &mut check)?;
        if check != record {
            warn!("crash log slot {} failed verification", count);
        }
        debug!("crash log at {}", count + 1);
        Ok(count + 1)
    }

    /// Erases the log unless it is already empty. Returns whether it erased.
    pub fn clear(&mut self) -> Result<bool> {
        if self.count()? == 0 {
            return Ok(false);
        }
        self.flash.erase()?;
        debug!("crash log cleared");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::MemFlash;

    #[test]
    fn test_append_and_clear() {
        let mut log = CrashLog::new(MemFlash::new(16 * SLOT_SIZE));
        assert_eq!(log.slots(), 16);
        assert_eq!(log.count().unwrap(), 0);
        assert_eq!(log.record_failure().unwrap(), 1);
        assert_eq!(log.record_failure().unwrap(), 2);
        assert_eq!(log.count().unwrap(), 2);
        assert!(log.clear().unwrap());
        assert_eq!(log.count().unwrap(), 0);
        assert!(!log.clear().unwrap());
        assert_eq!(log.flash().erases, 1);
    }

    #[test]
    fn test_torn_slot_counts() {
        let mut flash = MemFlash::new(4 * SLOT_SIZE);
        flash.tear_after = Some(3);
        let mut log = CrashLog::new(flash);
        assert_eq!(log.record_failure().unwrap(), 1);
        assert_eq!(log.count().unwrap(), 1);
        assert_eq!(log.record_failure().unwrap(), 2);
        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn test_full_log_saturates() {
        let mut log = CrashLog::new(MemFlash::new(2 * SLOT_SIZE));
        log.record_failure().unwrap();
        log.record_failure().unwrap();
        assert_eq!(log.record_failure().unwrap(), 2);
        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn test_marker_is_never_erased() {
        for seq in 0..64 {
            assert_eq!(classify(&marker(seq)), Slot::Marker);
        }
        assert_eq!(classify(&[ERASED; SLOT_SIZE]), Slot::Erased);
        let mut bad = marker(0);
        bad[5] ^= 0x10;
        assert_eq!(classify(&bad), Slot::Torn);
    }
}
