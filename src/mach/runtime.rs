use super::eval::{expand_line, truthy, Evaluator};
use super::guard::{Footprint, Guard};
use super::keys::{self, ProInput};
use super::{device::millis, format_value, load, Address, Device, Labels, Replay, Script, Stack, Var};
use crate::config::Config;
use crate::hal::{Button, Clock, ErrorSink, Hat, Identity, MouseButton, OutputPort, ProButton, Report, ScriptStore};
use crate::lang::ast::Statement;
use crate::lang::{parse_line, unescape, unquote, Error, Word};
use std::collections::BTreeSet;
use std::mem::size_of;
use std::rc::Rc;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Error>;

/// Capabilities one script run borrows exclusively.
pub struct Context<'a> {
    pub store: &'a mut dyn ScriptStore,
    pub port: &'a mut dyn OutputPort,
    pub clock: &'a mut dyn Clock,
    pub button: &'a dyn Button,
    pub sink: &'a mut dyn ErrorSink,
}

/// Everything one run owns.
#[derive(Debug)]
pub struct ScriptState {
    script: Script,
    labels: Labels,
    /// Footprint of the script and label index, fixed for the run.
    static_footprint: usize,
    pub vars: Var,
    pub stack: Stack<Address>,
    pub pc: Address,
    pub end: bool,
    pub use_led: bool,
    pub debug: bool,
    pub held_keys: BTreeSet<u8>,
    pub held_mouse: BTreeSet<MouseButton>,
    pub held_buttons: BTreeSet<ProButton>,
    pub hat_active: bool,
}

impl ScriptState {
    pub fn new(script: Script, config: &Config) -> ScriptState {
        let labels = Labels::prepass(&script);
        let static_footprint = script.footprint() + labels.footprint();
        ScriptState {
            script,
            labels,
            static_footprint,
            vars: Var::new(),
            stack: Stack::new(config.call_stack_capacity, "GOSUB NESTED TOO DEEP"),
            pc: 0,
            end: false,
            use_led: false,
            debug: false,
            held_keys: BTreeSet::new(),
            held_mouse: BTreeSet::new(),
            held_buttons: BTreeSet::new(),
            hat_active: false,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    fn has_held_inputs(&self) -> bool {
        !self.held_keys.is_empty()
            || !self.held_mouse.is_empty()
            || !self.held_buttons.is_empty()
            || self.hat_active
    }
}

impl Footprint for ScriptState {
    fn footprint(&self) -> usize {
        size_of::<ScriptState>()
            + self.static_footprint
            + self.vars.footprint()
            + self.stack.footprint()
            + self.held_keys.len() * (size_of::<u8>() + size_of::<usize>())
            + self.held_mouse.len() * (size_of::<MouseButton>() + size_of::<usize>())
            + self.held_buttons.len() * (size_of::<ProButton>() + size_of::<usize>())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Running,
    Ended,
    Halted(Error),
}

/// ## Line interpreter
///
/// Executes one script line per step until `END`, the end of the script or
/// a fatal error. Fatal errors are reported to the error sink once. Held
/// inputs are released whenever the run stops.

pub struct Runtime<'a> {
    state: ScriptState,
    device: Device<'a>,
    store: &'a mut dyn ScriptStore,
    sink: &'a mut dyn ErrorSink,
    evaluator: Evaluator,
    guard: Guard,
    finished: Option<Event>,
}

impl<'a> Runtime<'a> {
    pub fn new(script: Script, context: Context<'a>, config: &Config) -> Runtime<'a> {
        let Context {
            store,
            port,
            clock,
            button,
            sink,
        } = context;
        let device = Device::new(port, clock, button, config);
        let evaluator = Evaluator::for_script(script.name(), device.now_ms());
        info!("running {} ({} lines)", script.name(), script.len());
        Runtime {
            state: ScriptState::new(script, config),
            device,
            store,
            sink,
            evaluator,
            guard: Guard::new(config),
            finished: None,
        }
    }

    /// Loads the named script from the store and prepares it to run. The
    /// whole budget is free at this point.
    pub fn load(name: &str, context: Context<'a>, config: &Config) -> Result<Runtime<'a>> {
        let free = Guard::new(config).free(0);
        let script = load(&mut *context.store, name, free, config.load_margin)?;
        Ok(Runtime::new(script, context, config))
    }

    pub fn state(&self) -> &ScriptState {
        &self.state
    }

    pub fn into_state(self) -> ScriptState {
        self.state
    }

    /// Runs until the script stops.
    pub fn run(&mut self) -> Event {
        loop {
            match self.execute(1000) {
                Event::Running => continue,
                event => return event,
            }
        }
    }

    /// Runs at most `cycles` lines.
    pub fn execute(&mut self, cycles: usize) -> Event {
        if let Some(event) = &self.finished {
            return event.clone();
        }
        for _ in 0..cycles {
            if self.state.end || self.state.pc >= self.state.script.len() {
                return self.finish(Event::Ended);
            }
            if let Err(error) = self.step() {
                self.halt(&error);
                return self.finish(Event::Halted(error));
            }
        }
        Event::Running
    }

    fn step(&mut self) -> Result<()> {
        self.guard.check(self.state.footprint())?;
        self.device.poll(false);
        let pc = self.state.pc;
        let line: Rc<str> = match self.state.script.shared_line(pc) {
            Some(line) => line,
            None => return Ok(()),
        };
        let statement = parse_line(&line);
        if self.state.debug && statement != Statement::Blank {
            info!("EXECUTE[{}]: {}", pc, line.trim());
        }
        self.state.pc = self.statement(statement, pc)?;
        Ok(())
    }

    fn eval(&mut self, expr: &str) -> Result<f64> {
        self.evaluator.evaluate(expr, &self.state.vars, &self.device)
    }

    fn statement(&mut self, statement: Statement, pc: Address) -> Result<Address> {
        let next = pc + 1;
        match statement {
            Statement::Blank | Statement::Remark | Statement::Label(_) => {}
            Statement::Unknown => debug!("line {}: unknown command ignored", next),
            Statement::Malformed(word) => debug!("line {}: malformed {} ignored", next, word),
            Statement::End => {
                self.state.end = true;
                return Ok(pc);
            }
            Statement::Wait(expr) => {
                let ms = millis(self.eval(&expr)?);
                self.device.sleep(ms);
            }
            Statement::Print(expr) => {
                let value = self.eval(&expr)?;
                if self.state.debug {
                    info!("PRINT: {}", format_value(value));
                }
            }
            Statement::Set(var_name, expr) => match self.eval(&expr) {
                Ok(_) if var_name.is_empty() => debug!("line {}: SET without a name", next),
                Ok(value) => self.state.vars.store(&var_name, value),
                Err(error) => warn!("line {}: SET {} not assigned: {}", next, var_name, error),
            },
            Statement::If(cond, label) => {
                if truthy(self.eval(&cond)?) {
                    if let Some(target) = self.jump_target(&label) {
                        return Ok(target);
                    }
                }
            }
            Statement::Goto(label) => {
                if let Some(target) = self.jump_target(&label) {
                    return Ok(target);
                }
            }
            Statement::Gosub(label) => {
                if let Some(target) = self.jump_target(&label) {
                    self.state.stack.push(next)?;
                    return Ok(target);
                }
            }
            Statement::Return => return self.state.stack.pop(),
            Statement::Call(word, args) => self.call(word, &args)?,
        }
        Ok(next)
    }

    fn jump_target(&self, label: &str) -> Option<Address> {
        let target = self.state.labels.resolve(label);
        if target.is_none() {
            debug!("label {} not found", label);
        }
        target
    }

    fn call(&mut self, word: Word, args: &[String]) -> Result<()> {
        let needed = match word {
            Word::SetLed | Word::KeyType | Word::MouseMove => 3,
            Word::ProConJoy => 4,
            Word::KeyPushFor | Word::MousePushFor | Word::ProConPushFor => 2,
            _ => 1,
        };
        if args.len() < needed {
            debug!("{} needs {} arguments, got {}", word, needed, args.len());
            return Ok(());
        }
        match word {
            Word::UseLed => self.state.use_led = truthy(self.eval(&args[0])?),
            Word::Debug => {
                self.state.debug = truthy(self.eval(&args[0])?);
                info!("debug trace {}", if self.state.debug { "on" } else { "off" });
            }
            Word::SetLed => self.set_led(args)?,
            Word::Mode => self.mode(&args[0]),
            Word::KeyPress => {
                for code in keys::key_codes(&args[0]) {
                    self.press_key(code);
                }
            }
            Word::KeyRelease => {
                for code in keys::key_codes(&args[0]) {
                    self.release_key(code);
                }
            }
            Word::KeyPushFor => {
                let ms = millis(self.eval(&args[1])?);
                let code = keys::first_key_code(&args[0]);
                if code != 0 {
                    self.press_key(code);
                    self.device.sleep(ms);
                    self.release_key(code);
                }
            }
            Word::KeyType => self.key_type(args)?,
            Word::MouseMove => {
                let dx = self.eval(&args[0])?;
                let dy = self.eval(&args[1])?;
                if !truthy(self.eval(&args[2])?) {
                    debug!("absolute mouse move sent as relative");
                }
                self.device.port().move_relative(clamp_i8(dx), clamp_i8(dy), 0);
                self.device.poll(true);
            }
            Word::MousePress | Word::MouseRelease => {
                if let Some(button) = keys::mouse_button(&args[0]) {
                    self.mouse_button(button, word == Word::MousePress);
                }
            }
            Word::MousePushFor => {
                let ms = millis(self.eval(&args[1])?);
                if let Some(button) = keys::mouse_button(&args[0]) {
                    self.mouse_button(button, true);
                    self.device.sleep(ms);
                    self.mouse_button(button, false);
                }
            }
            Word::Mouserun => self.mouserun(args)?,
            Word::ProConPress | Word::ProConRelease => {
                if let Some(input) = keys::pro_input(&args[0]) {
                    self.pro_input(input, word == Word::ProConPress);
                }
            }
            Word::ProConPushFor => {
                let ms = millis(self.eval(&args[1])?);
                if let Some(input) = keys::pro_input(&args[0]) {
                    self.pro_input(input, true);
                    self.device.sleep(ms);
                    self.pro_input(input, false);
                }
            }
            Word::ProConHat => {
                if let Some(hat) = keys::hat(&args[0]) {
                    self.set_hat(hat);
                }
            }
            Word::ProConJoy => {
                let mut axes = [0u8; 4];
                for (axis, arg) in axes.iter_mut().zip(args) {
                    *axis = keys::stick_axis(self.eval(arg)?);
                }
                self.device.port().set_sticks(axes[0], axes[1], axes[2], axes[3]);
                self.device.poll(true);
            }
            _ => debug!("{} is not a call", word),
        }
        Ok(())
    }

    fn set_led(&mut self, args: &[String]) -> Result<()> {
        let r = clamp_u8(self.eval(&args[0])?);
        let g = clamp_u8(self.eval(&args[1])?);
        let b = clamp_u8(self.eval(&args[2])?);
        if self.state.use_led {
            self.device.port().set_color(r, g, b);
            self.device.poll(true);
        } else {
            debug!("SetLED({}, {}, {}) ignored until UseLED(1)", r, g, b);
        }
        Ok(())
    }

    fn mode(&mut self, name: &str) {
        let identity = if name.eq_ignore_ascii_case("KeyMouse") {
            Identity::KeyMouse
        } else if name.eq_ignore_ascii_case("ProController") {
            Identity::ProController
        } else {
            debug!("unknown mode {}", name);
            return;
        };
        info!("switching to {:?}", identity);
        self.device.port().switch_identity(identity);
        self.device.poll(true);
    }

    fn key_type(&mut self, args: &[String]) -> Result<()> {
        let text = match unquote(&args[0]) {
            Some(text) => unescape(text),
            None => {
                debug!("KeyType needs a quoted string");
                return Ok(());
            }
        };
        let press_ms = millis(self.eval(&args[1])?);
        let release_ms = millis(self.eval(&args[2])?);
        for ch in text.chars().filter(|ch| ch.is_ascii() && *ch != '\0') {
            self.press_key(ch as u8);
            self.device.sleep(press_ms);
            self.release_key(ch as u8);
            self.device.sleep(release_ms);
        }
        Ok(())
    }

    fn mouserun(&mut self, args: &[String]) -> Result<()> {
        let name = match unquote(&args[0]) {
            Some(name) => name.to_string(),
            None => args[0].clone(),
        };
        let mut replay = Replay::default();
        if args.len() >= 4 {
            replay.time_scale = self.eval(&args[1])?;
            replay.angle = self.eval(&args[2])?;
            replay.scale = self.eval(&args[3])?;
        }
        match replay.play(
            &mut *self.store,
            &mut self.device,
            &mut self.state.held_mouse,
            &name,
        ) {
            Ok(records) => debug!("Mouserun {}: {} records", name, records),
            Err(error) => warn!("Mouserun {}: {}", name, error),
        }
        Ok(())
    }

    fn press_key(&mut self, code: u8) {
        self.device.port().press(code);
        self.state.held_keys.insert(code);
        self.device.poll(true);
    }

    fn release_key(&mut self, code: u8) {
        self.device.port().release(code);
        self.state.held_keys.remove(&code);
        self.device.poll(true);
    }

    fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.device.port().mouse_button(button, pressed);
        if pressed {
            self.state.held_mouse.insert(button);
        } else {
            self.state.held_mouse.remove(&button);
        }
        self.device.poll(true);
    }

    fn pro_input(&mut self, input: ProInput, pressed: bool) {
        match input {
            ProInput::Button(button) => {
                self.device.port().set_button(button, pressed);
                if pressed {
                    self.state.held_buttons.insert(button);
                } else {
                    self.state.held_buttons.remove(&button);
                }
                self.device.poll(true);
            }
            ProInput::Hat(hat) => self.set_hat(if pressed { hat } else { Hat::Center }),
        }
    }

    fn set_hat(&mut self, hat: Hat) {
        self.device.port().set_hat(hat);
        self.state.hat_active = hat != Hat::Center;
        self.device.poll(true);
    }

    fn halt(&mut self, error: &Error) {
        let pc = self.state.pc;
        let raw_line = self.state.script.line(pc).unwrap_or("").to_string();
        let report = Report {
            kind: error.kind().to_string(),
            line_number: pc + 1,
            expanded_line: expand_line(&raw_line, &self.state.vars),
            raw_line,
            detail: error.to_string(),
        };
        warn!("{} halted: {}", self.state.script.name(), report);
        self.sink.report(&report);
        self.state.end = true;
    }

    fn finish(&mut self, event: Event) -> Event {
        if self.state.has_held_inputs() {
            debug!("releasing held inputs");
            for code in std::mem::take(&mut self.state.held_keys) {
                self.device.port().release(code);
            }
            for button in std::mem::take(&mut self.state.held_mouse) {
                self.device.port().mouse_button(button, false);
            }
            for button in std::mem::take(&mut self.state.held_buttons) {
                self.device.port().set_button(button, false);
            }
            if self.state.hat_active {
                self.device.port().set_hat(Hat::Center);
                self.state.hat_active = false;
            }
            self.device.poll(true);
        }
        info!("{} stopped at line {}", self.state.script.name(), self.state.pc + 1);
        self.finished = Some(event.clone());
        event
    }
}

fn clamp_u8(value: f64) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}

fn clamp_i8(value: f64) -> i8 {
    value.round().max(-128.0).min(127.0) as i8
}

/// Loads and runs the named script to completion. Load failures are
/// returned; failures while running are reported to the sink and come back
/// as `Event::Halted`.
pub fn execute_script(name: &str, context: Context, config: &Config) -> Result<Event> {
    let mut runtime = Runtime::load(name, context, config)?;
    Ok(runtime.run())
}
