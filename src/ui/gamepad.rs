/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Movement
///   Select                →  Quit
///   Start                 →  Pause
///   A / B / Start         →  Confirm (start, close prompt)
///
/// Without the `gamepad` feature this compiles to an always-idle pad.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::{DirectionKey, PressedKeys};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical face/shoulder buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST"  => Some(Btn::B),
            "X" | "WEST"  => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB"   => Some(Btn::L1),
            "R1" | "RB"   => Some(Btn::R1),
            "START"       => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South        => Some(Btn::A),
            Button::East         => Some(Btn::B),
            Button::West         => Some(Btn::X),
            Button::North        => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start        => Some(Btn::Start),
            Button::Select       => Some(Btn::Select),
            _ => None,
        }
    }
}

/// held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg(any(feature = "gamepad", test))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping.
#[derive(Debug, PartialEq)]
struct ActionMap {
    quit: Vec<Btn>,
    pause: Vec<Btn>,
    confirm: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            quit:    vec![Btn::Select],
            pause:   vec![Btn::Start],
            confirm: vec![Btn::A, Btn::B, Btn::Start],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; a list with no known names keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            quit: parse_list(&cfg.quit, d.quit),
            pause: parse_list(&cfg.pause, d.pause),
            confirm: parse_list(&cfg.confirm, d.confirm),
        }
    }
}

/// Movement directions, indexed by `DirectionKey` order.
const MOVES: [DirectionKey; 4] = [
    DirectionKey::Left,
    DirectionKey::Right,
    DirectionKey::Up,
    DirectionKey::Down,
];

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    /// Left, Right, Up, Down.
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    tracing::warn!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dpad_slot = match gilrs_btn {
            Button::DPadLeft  => Some(0),
            Button::DPadRight => Some(1),
            Button::DPadUp    => Some(2),
            Button::DPadDown  => Some(3),
            _ => None,
        };
        if let Some(slot) = dpad_slot {
            self.dpad[slot] = held;
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }

    /// Held directions (D-pad or stick) plus a held quit button.
    pub fn pressed_keys(&self) -> PressedKeys {
        // Stick Y is positive upwards.
        let stick = [
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
        ];
        let mut keys: PressedKeys = MOVES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.dpad[*i] || stick[*i])
            .map(|(_, k)| *k)
            .collect();
        if self.any_held(&self.action_map.quit) {
            keys.insert(DirectionKey::Quit);
        }
        keys
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn idle_pad(cfg: &GamepadConfig) -> GamepadState {
        let mut pad = GamepadState::new(cfg);
        #[cfg(feature = "gamepad")]
        {
            pad.gilrs = None;
        }
        pad.release_all();
        pad
    }

    fn default_cfg() -> GamepadConfig {
        GamepadConfig {
            quit: names(&["Select"]),
            pause: names(&["Start"]),
            confirm: names(&["A"]),
        }
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("select"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn unknown_names_keep_defaults() {
        let cfg = GamepadConfig {
            quit: names(&["Nope"]),
            pause: names(&["Y", "garbage"]),
            confirm: vec![],
        };
        let map = ActionMap::from_config(&cfg);
        let d = ActionMap::default();
        assert_eq!(map.quit, d.quit);
        assert_eq!(map.pause, vec![Btn::Y]);
        assert_eq!(map.confirm, d.confirm);
    }

    #[test]
    fn dpad_stick_and_quit_merge_into_keys() {
        let mut pad = idle_pad(&default_cfg());
        assert!(pad.pressed_keys().is_empty());

        pad.dpad[2] = true;
        pad.stick_x = 0.9;
        pad.buttons[Btn::Select as usize].set(true);
        let keys = pad.pressed_keys();
        assert!(keys.contains(DirectionKey::Up));
        assert!(keys.contains(DirectionKey::Right));
        assert!(keys.contains(DirectionKey::Quit));
        assert!(!keys.contains(DirectionKey::Left));
    }

    #[test]
    fn press_is_edge_triggered() {
        let mut pad = idle_pad(&default_cfg());
        pad.buttons[Btn::Start as usize].set(true);
        assert!(pad.pause_pressed());
        pad.update();
        pad.buttons[Btn::Start as usize].set(true);
        assert!(!pad.pause_pressed());
    }
}
