/// Identity the device presents to the USB host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    KeyMouse,
    ProController,
    MassStorage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MouseButton {
    Left = 0x01,
    Right = 0x02,
    Middle = 0x04,
}

/// Game-controller buttons. Discriminants are the report bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProButton {
    Y = 0x0001,
    B = 0x0002,
    A = 0x0004,
    X = 0x0008,
    L = 0x0010,
    R = 0x0020,
    ZL = 0x0040,
    ZR = 0x0080,
    Minus = 0x0100,
    Plus = 0x0200,
    LClick = 0x0400,
    RClick = 0x0800,
    Home = 0x1000,
    Capture = 0x2000,
}

impl ProButton {
    pub fn mask(self) -> u16 {
        self as u16
    }
}

/// D-pad direction. Discriminants are the report hat values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hat {
    Up = 0,
    UpRight = 1,
    Right = 2,
    RightDown = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    LeftUp = 7,
    Center = 8,
}

/// ## Emulated HID device
///
/// Every call changes the report state of the device. `service` runs the
/// USB stack's task routine; callers throttle it themselves.
pub trait OutputPort {
    fn press(&mut self, code: u8);
    fn release(&mut self, code: u8);
    fn move_relative(&mut self, dx: i8, dy: i8, wheel: i8);
    fn mouse_button(&mut self, button: MouseButton, pressed: bool);
    fn set_button(&mut self, button: ProButton, pressed: bool);
    fn set_hat(&mut self, hat: Hat);
    fn set_sticks(&mut self, lx: u8, ly: u8, rx: u8, ry: u8);
    fn set_color(&mut self, r: u8, g: u8, b: u8);
    fn switch_identity(&mut self, identity: Identity);
    fn service(&mut self);
}

/// One state change sent to an `OutputPort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press(u8),
    Release(u8),
    Move(i8, i8, i8),
    Mouse(MouseButton, bool),
    Button(ProButton, bool),
    Hat(Hat),
    Sticks(u8, u8, u8, u8),
    Color(u8, u8, u8),
    Identity(Identity),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Action::*;
        match self {
            Press(code) => write!(f, "press {:#04x}", code),
            Release(code) => write!(f, "release {:#04x}", code),
            Move(dx, dy, wheel) => write!(f, "move {} {} wheel {}", dx, dy, wheel),
            Mouse(button, down) => write!(f, "mouse {:?} {}", button, if *down { "down" } else { "up" }),
            Button(button, down) => write!(f, "button {:?} ({:#06x}) {}", button, button.mask(), if *down { "down" } else { "up" }),
            Hat(hat) => write!(f, "hat {:?}", hat),
            Sticks(lx, ly, rx, ry) => write!(f, "sticks {} {} {} {}", lx, ly, rx, ry),
            Color(r, g, b) => write!(f, "color #{:02x}{:02x}{:02x}", r, g, b),
            Identity(identity) => write!(f, "identity {:?}", identity),
        }
    }
}

/// Port that records every action in order.
#[derive(Debug, Default)]
pub struct RecordingPort {
    pub actions: Vec<Action>,
    pub services: usize,
}

impl RecordingPort {
    pub fn new() -> RecordingPort {
        RecordingPort::default()
    }

    pub fn colors(&self) -> Vec<(u8, u8, u8)> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Color(r, g, b) => Some((*r, *g, *b)),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<(i8, i8, i8)> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Move(dx, dy, wheel) => Some((*dx, *dy, *wheel)),
                _ => None,
            })
            .collect()
    }
}

impl OutputPort for RecordingPort {
    fn press(&mut self, code: u8) {
        self.actions.push(Action::Press(code));
    }
    fn release(&mut self, code: u8) {
        self.actions.push(Action::Release(code));
    }
    fn move_relative(&mut self, dx: i8, dy: i8, wheel: i8) {
        self.actions.push(Action::Move(dx, dy, wheel));
    }
    fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.actions.push(Action::Mouse(button, pressed));
    }
    fn set_button(&mut self, button: ProButton, pressed: bool) {
        self.actions.push(Action::Button(button, pressed));
    }
    fn set_hat(&mut self, hat: Hat) {
        self.actions.push(Action::Hat(hat));
    }
    fn set_sticks(&mut self, lx: u8, ly: u8, rx: u8, ry: u8) {
        self.actions.push(Action::Sticks(lx, ly, rx, ry));
    }
    fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.actions.push(Action::Color(r, g, b));
    }
    fn switch_identity(&mut self, identity: Identity) {
        self.actions.push(Action::Identity(identity));
    }
    fn service(&mut self) {
        self.services += 1;
    }
}

/// The physical push button on the device.
pub trait Button {
    fn is_pressed(&self) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FixedButton(pub bool);

impl Button for FixedButton {
    fn is_pressed(&self) -> bool {
        self.0
    }
}
