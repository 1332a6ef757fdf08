mod common;
use autoinput::hal::{MemStore, ScriptStore};
use autoinput::recovery::{Board, BootDecision, FileFlash, Flash, MemFlash, Recovery, SLOT_SIZE};
use autoinput::Config;
use common::*;

#[derive(Default)]
struct TestBoard {
    reboots: usize,
}

impl Board for TestBoard {
    fn reboot(&mut self) {
        self.reboots += 1;
    }
}

fn flash() -> MemFlash {
    MemFlash::new(16 * SLOT_SIZE)
}

#[test]
fn test_clean_boot() {
    let mut recovery = Recovery::new(flash(), &Config::default());
    let mut store = MemStore::new();
    let mut board = TestBoard::default();
    assert_eq!(
        recovery.boot(&mut store, &mut board).unwrap(),
        BootDecision::Continue { failures: 0 }
    );
    assert_eq!(recovery.log().count().unwrap(), 1);
    assert!(recovery.boot_succeeded().unwrap());
    assert_eq!(recovery.log().count().unwrap(), 0);
    assert!(!recovery.boot_succeeded().unwrap());
    assert_eq!(recovery.log().flash().erases, 1);
    assert_eq!(board.reboots, 0);
}

#[test]
fn test_success_at_two_clears() {
    let config = Config::default();
    let mut store = MemStore::new();
    let mut board = TestBoard::default();
    let mut recovery = Recovery::new(flash(), &config);
    recovery.log().record_failure().unwrap();
    recovery.log().record_failure().unwrap();
    assert_eq!(
        recovery.boot(&mut store, &mut board).unwrap(),
        BootDecision::Continue { failures: 2 }
    );
    assert!(recovery.boot_succeeded().unwrap());
    assert_eq!(recovery.log().count().unwrap(), 0);
    assert_eq!(store.formats, 0);
}

#[test]
fn test_repeated_failures_reformat() {
    init_test_logging();
    let config = Config::default();
    let mut store = MemStore::new();
    store.insert("script.txt", "GOSUB Crash");
    let mut board = TestBoard::default();
    let mut region = flash();
    for failures in 0..3 {
        let mut recovery = Recovery::new(region, &config);
        assert_eq!(
            recovery.boot(&mut store, &mut board).unwrap(),
            BootDecision::Continue { failures }
        );
        region = recovery.log().flash().clone();
    }
    let mut recovery = Recovery::new(region, &config);
    assert_eq!(
        recovery.boot(&mut store, &mut board).unwrap(),
        BootDecision::Reformatted
    );
    assert_eq!(board.reboots, 1);
    assert_eq!(store.formats, 1);
    assert_eq!(store.get("script.txt"), None);
    assert_eq!(recovery.log().count().unwrap(), 0);
}

#[test]
fn test_reformat_failure_keeps_count() {
    struct BrokenStore(MemStore);

    impl ScriptStore for BrokenStore {
        fn mount(&mut self) -> Result<(), autoinput::lang::Error> {
            self.0.mount()
        }
        fn unmount(&mut self) {
            self.0.unmount()
        }
        fn open(
            &mut self,
            name: &str,
            mode: autoinput::hal::OpenMode,
        ) -> Result<autoinput::hal::Handle, autoinput::lang::Error> {
            self.0.open(name, mode)
        }
        fn size(&self, handle: &autoinput::hal::Handle) -> Result<u64, autoinput::lang::Error> {
            self.0.size(handle)
        }
        fn read(&mut self, handle: &autoinput::hal::Handle, buf: &mut [u8]) -> Result<usize, autoinput::lang::Error> {
            self.0.read(handle, buf)
        }
        fn write(&mut self, handle: &autoinput::hal::Handle, buf: &[u8]) -> Result<usize, autoinput::lang::Error> {
            self.0.write(handle, buf)
        }
        fn close(&mut self, handle: autoinput::hal::Handle) {
            self.0.close(handle)
        }
        fn format(&mut self) -> Result<(), autoinput::lang::Error> {
            Err(autoinput::error!(DiskIoError; "WORN OUT"))
        }
    }

    let mut recovery = Recovery::new(flash(), &Config::default());
    for _ in 0..3 {
        recovery.log().record_failure().unwrap();
    }
    let mut store = BrokenStore(MemStore::new());
    let mut board = TestBoard::default();
    assert!(recovery.boot(&mut store, &mut board).is_err());
    assert_eq!(board.reboots, 1);
    assert_eq!(recovery.log().count().unwrap(), 3);
}

#[test]
fn test_file_flash_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crash.bin");
    let config = Config::default();
    let mut store = MemStore::new();
    let mut board = TestBoard::default();
    {
        let mut recovery = Recovery::new(FileFlash::open(&path, 16 * SLOT_SIZE).unwrap(), &config);
        recovery.boot(&mut store, &mut board).unwrap();
    }
    {
        let flash = FileFlash::open(&path, 16 * SLOT_SIZE).unwrap();
        assert_eq!(flash.len(), 16 * SLOT_SIZE);
        let mut recovery = Recovery::new(flash, &config);
        assert_eq!(
            recovery.boot(&mut store, &mut board).unwrap(),
            BootDecision::Continue { failures: 1 }
        );
        recovery.boot_succeeded().unwrap();
    }
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.iter().all(|b| *b == 0xFF));
}
