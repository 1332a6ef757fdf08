mod common;
use autoinput::hal::{Action, DirStore, FixedButton, ManualClock, RecordingPort, Report};
use autoinput::lang::ErrorCode;
use autoinput::mach::{execute_script, Context, Event};
use autoinput::Config;
use common::*;

#[test]
fn test_loop_scenario() {
    init_test_logging();
    let mut rig = Rig::with_script(
        "loop.txt",
        "SET i = 0\r\nLABEL Loop\r\nSET i = i + 1\r\nIF i < 3 GOTO Loop\r\nEND\r\n",
    );
    let (event, state) = rig.exec("loop.txt").unwrap();
    assert_eq!(event, Event::Ended);
    assert_eq!(state.vars.fetch("i"), Some(3.0));
    assert_eq!(state.script().len(), 5);
    assert!(!rig.store.is_mounted());
}

#[test]
fn test_led_scenario() {
    let mut rig = Rig::with_script(
        "led.txt",
        "SetLED(300, -10, 128)\nUseLED(1)\nSetLED(300, -10, 128)\n",
    );
    rig.exec("led.txt").unwrap();
    assert_eq!(rig.port.colors(), vec![(255, 0, 128)]);
}

#[test]
fn test_math_error_report() {
    let mut rig = Rig::with_script("bad.txt", "SET a = 2\n  PRINT a/0  \nSET b = 1\n");
    let (event, state) = rig.exec("bad.txt").unwrap();
    match event {
        Event::Halted(error) => assert_eq!(error.code(), ErrorCode::NonFinite),
        other => panic!("expected halt, got {:?}", other),
    }
    assert_eq!(
        rig.reports,
        vec![Report {
            kind: "Math Error".to_string(),
            line_number: 2,
            raw_line: "  PRINT a/0  ".to_string(),
            expanded_line: "  PRINT 2/0  ".to_string(),
            detail: rig.reports[0].detail.clone(),
        }]
    );
    assert_eq!(state.vars.fetch("b"), None);
}

#[test]
fn test_missing_script() {
    let mut rig = Rig::default();
    let err = rig.exec("nope.txt").unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(rig.reports.is_empty());
    assert!(rig.port.actions.is_empty());
}

#[test]
fn test_script_too_large() {
    let mut rig = Rig::with_script("big.txt", &"REM padding\n".repeat(100));
    let config = Config {
        memory_budget: 4096,
        load_margin: 2048,
        ..Config::default()
    };
    let err = rig.exec_with("big.txt", &config).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TooLarge);
    assert!(!rig.store.is_mounted());
}

#[test]
fn test_keyboard_session() {
    let mut rig = Rig::with_script(
        "keys.txt",
        "Mode(KeyMouse)\nKeyPress(CTRL)\nKeyPress(c)\nKeyRelease(c)\nKeyRelease(CTRL)\nKeyType(\"hi\", 0, 0)\n",
    );
    rig.exec("keys.txt").unwrap();
    assert_eq!(
        rig.port.actions[1..],
        [
            Action::Press(0x80),
            Action::Press(b'c'),
            Action::Release(b'c'),
            Action::Release(0x80),
            Action::Press(b'h'),
            Action::Release(b'h'),
            Action::Press(b'i'),
            Action::Release(b'i'),
        ]
    );
}

#[test]
fn test_gosub_nesting_limit() {
    let mut rig = Rig::with_script("deep.txt", "LABEL Down\nGOSUB Down\n");
    let config = Config {
        call_stack_capacity: 16,
        ..Config::default()
    };
    let (event, state) = rig.exec_with("deep.txt", &config).unwrap();
    assert!(matches!(event, Event::Halted(_)));
    assert_eq!(state.stack.len(), 16);
    assert_eq!(rig.reports.len(), 1);
    assert_eq!(rig.reports[0].kind, "Stack Overflow");
}

#[test]
fn test_dir_store_with_replay() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("main.txt"),
        "Mouserun(\"path.csv\", 0, 0, 1)\nSET done = 1\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("path.csv"), "1,2,0,0,0,0,100\n-3,4,0,0,0,0,100\n").unwrap();

    let mut store = DirStore::new(dir.path());
    let mut port = RecordingPort::new();
    let mut clock = ManualClock::new(0);
    let button = FixedButton(false);
    let mut reports: Vec<Report> = vec![];
    let context = Context {
        store: &mut store,
        port: &mut port,
        clock: &mut clock,
        button: &button,
        sink: &mut reports,
    };
    let event = execute_script("main.txt", context, &Config::default()).unwrap();
    assert_eq!(event, Event::Ended);
    assert_eq!(port.moves(), vec![(1, 2, 0), (-3, 4, 0)]);
    assert_eq!(clock.slept(), 0);
    assert!(reports.is_empty());
}
