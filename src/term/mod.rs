use crate::config::Config;
use crate::hal::{
    Action, DirStore, ErrorSink, FixedButton, Hat, Identity, MouseButton, OutputPort, ProButton,
    Report, ScriptStore, SystemClock,
};
use crate::lang::Error;
use crate::mach::{execute_script, Context, Event};
use crate::recovery::{Board, BootDecision, FileFlash, Recovery, SLOT_SIZE};
use ansi_term::{Colour, Style};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Runs an input script against a simulated HID device
#[derive(Parser, Debug)]
#[command(name = "autoinput", version)]
#[command(about = "Run an input script against a simulated HID device", long_about = None)]
pub struct Args {
    /// Script to run, by name inside the store
    #[arg(default_value = "script.txt")]
    pub script: String,

    /// Directory acting as the script store (erased on emergency reformat)
    #[arg(short, long, default_value = "store")]
    pub dir: PathBuf,

    /// File holding the crash-log flash region
    #[arg(long, default_value = "autoinput.flash")]
    pub flash: PathBuf,

    /// Memory budget of one run, in bytes
    #[arg(long)]
    pub memory: Option<usize>,

    /// Maximum GOSUB nesting
    #[arg(long)]
    pub stack: Option<usize>,

    /// Report the device button as held down
    #[arg(long)]
    pub pressed: bool,

    /// Print device actions without colors
    #[arg(long)]
    pub plain: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(memory) = self.memory {
            config.memory_budget = memory;
        }
        if let Some(stack) = self.stack {
            config.call_stack_capacity = stack;
        }
        config
    }
}

/// Prints every device action with a wall-clock timestamp.
struct TerminalPort {
    plain: bool,
}

impl TerminalPort {
    fn show(&mut self, action: Action) {
        let stamp = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.plain {
            println!("{} {}", stamp, action);
            return;
        }
        let style = match action {
            Action::Press(_) | Action::Button(_, true) | Action::Mouse(_, true) => Colour::Green.bold(),
            Action::Release(_) | Action::Button(_, false) | Action::Mouse(_, false) => Colour::Green.normal(),
            Action::Move(..) | Action::Sticks(..) | Action::Hat(_) => Colour::Cyan.normal(),
            Action::Identity(_) => Colour::Yellow.bold(),
            Action::Color(r, g, b) => Colour::RGB(r, g, b).bold(),
        };
        println!("{} {}", Style::new().dimmed().paint(stamp), style.paint(action.to_string()));
    }
}

impl OutputPort for TerminalPort {
    fn press(&mut self, code: u8) {
        self.show(Action::Press(code));
    }
    fn release(&mut self, code: u8) {
        self.show(Action::Release(code));
    }
    fn move_relative(&mut self, dx: i8, dy: i8, wheel: i8) {
        self.show(Action::Move(dx, dy, wheel));
    }
    fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.show(Action::Mouse(button, pressed));
    }
    fn set_button(&mut self, button: ProButton, pressed: bool) {
        self.show(Action::Button(button, pressed));
    }
    fn set_hat(&mut self, hat: Hat) {
        self.show(Action::Hat(hat));
    }
    fn set_sticks(&mut self, lx: u8, ly: u8, rx: u8, ry: u8) {
        self.show(Action::Sticks(lx, ly, rx, ry));
    }
    fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.show(Action::Color(r, g, b));
    }
    fn switch_identity(&mut self, identity: Identity) {
        self.show(Action::Identity(identity));
    }
    fn service(&mut self) {}
}

struct TerminalSink;

impl ErrorSink for TerminalSink {
    fn report(&mut self, report: &Report) {
        eprintln!(
            "{} {}",
            Colour::Red.bold().paint(&report.kind),
            Style::new().bold().paint(format!("at line {}", report.line_number))
        );
        eprintln!("  {}", report.raw_line);
        if report.expanded_line != report.raw_line {
            eprintln!("  {}", Style::new().dimmed().paint(&report.expanded_line));
        }
        eprintln!("  {}", report.detail);
    }
}

#[derive(Debug, Default)]
struct HostBoard {
    rebooted: bool,
}

impl Board for HostBoard {
    fn reboot(&mut self) {
        self.rebooted = true;
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("AUTOINPUT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn main() {
    let args = Args::parse();
    init_logging();
    if let Err(error) = run(&args) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        std::process::exit(1);
    }
}

/// One simulated power cycle: crash-recovery boot, store check, then the
/// script.
pub fn run(args: &Args) -> Result<(), Error> {
    let config = args.config();
    let mut store = DirStore::new(&args.dir);
    let flash = FileFlash::open(&args.flash, config.crash_slots * SLOT_SIZE)?;
    let mut recovery = Recovery::new(flash, &config);
    let mut board = HostBoard::default();
    match recovery.boot(&mut store, &mut board)? {
        BootDecision::Reformatted => {
            println!(
                "{}",
                Colour::Yellow.bold().paint("script store reformatted, rebooting")
            );
            return Ok(());
        }
        BootDecision::Continue { failures } if failures > 0 => {
            warn!("{} earlier boots did not finish", failures)
        }
        BootDecision::Continue { .. } => {}
    }
    store.mount()?;
    store.unmount();
    recovery.boot_succeeded()?;

    let mut port = TerminalPort { plain: args.plain };
    let mut clock = SystemClock::new();
    let button = FixedButton(args.pressed);
    let mut sink = TerminalSink;
    let context = Context {
        store: &mut store,
        port: &mut port,
        clock: &mut clock,
        button: &button,
        sink: &mut sink,
    };
    match execute_script(&args.script, context, &config)? {
        Event::Halted(error) => info!("script halted: {}", error),
        _ => info!("script finished"),
    }
    Ok(())
}
