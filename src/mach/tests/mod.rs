use crate::config::Config;
use crate::hal::{FixedButton, ManualClock, MemStore, RecordingPort, Report};
use crate::mach::{Context, Event, Runtime, Script, ScriptState};


struct Outcome {
    event: Event,
    state: ScriptState,
    port: RecordingPort,
    reports: Vec<Report>,
    clock: ManualClock,
}

impl Outcome {
    fn var(&self, name: &str) -> Option<f64> {
        self.state.vars.fetch(name)
    }
}

fn run(source: &str) -> Outcome {
    run_with(source, &Config::default(), MemStore::new())
}

fn run_with(source: &str, config: &Config, mut store: MemStore) -> Outcome {
    let mut port = RecordingPort::new();
    let mut clock = ManualClock::new(1000);
    let button = FixedButton(false);
    let mut reports: Vec<Report> = vec![];
    let (event, state) = {
        let context = Context {
            store: &mut store,
            port: &mut port,
            clock: &mut clock,
            button: &button,
            sink: &mut reports,
        };
        let mut runtime = Runtime::new(Script::from_str("test.txt", source), context, config);
        let event = runtime.run();
        (event, runtime.into_state())
    };
    Outcome {
        event,
        state,
        port,
        reports,
        clock,
    }
}
