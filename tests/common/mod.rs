#![allow(dead_code)]

use autoinput::hal::{FixedButton, ManualClock, MemStore, RecordingPort, Report};
use autoinput::lang::Error;
use autoinput::mach::{Context, Event, Runtime, ScriptState};
use autoinput::Config;

/// In-memory stand-ins for every collaborator of a run.
#[derive(Default)]
pub struct Rig {
    pub store: MemStore,
    pub port: RecordingPort,
    pub clock: ManualClock,
    pub button: FixedButton,
    pub reports: Vec<Report>,
}

impl Rig {
    pub fn with_script(name: &str, source: &str) -> Rig {
        let mut rig = Rig::default();
        rig.store.insert(name, source);
        rig
    }

    pub fn context(&mut self) -> Context<'_> {
        Context {
            store: &mut self.store,
            port: &mut self.port,
            clock: &mut self.clock,
            button: &self.button,
            sink: &mut self.reports,
        }
    }

    pub fn exec(&mut self, name: &str) -> Result<(Event, ScriptState), Error> {
        self.exec_with(name, &Config::default())
    }

    pub fn exec_with(&mut self, name: &str, config: &Config) -> Result<(Event, ScriptState), Error> {
        let mut runtime = Runtime::load(name, self.context(), config)?;
        let event = runtime.run();
        Ok((event, runtime.into_state()))
    }
}

pub fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}
