use crate::game::lane::Lane;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, NamedKey};

/// Host-level commands that never reach judgment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    ToggleDebug,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneEdge {
    pub lane: Lane,
    pub pressed: bool,
}

pub fn control_for_key(logical: &Key) -> Option<Control> {
    match logical {
        Key::Named(NamedKey::Enter | NamedKey::Space) => Some(Control::Start),
        Key::Named(NamedKey::F3) => Some(Control::ToggleDebug),
        Key::Named(NamedKey::Escape) => Some(Control::Quit),
        Key::Character(s) if s.eq_ignore_ascii_case("p") => Some(Control::Pause),
        _ => None,
    }
}

/// Lane for the typed character. The physical key position plays no part,
/// so every layout reaches a lane through exactly one key.
pub fn lane_for(logical: &Key) -> Option<Lane> {
    let Key::Character(s) = logical else {
        return None;
    };
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Lane::from_char(c),
        _ => None,
    }
}

/// Lane press/release for the event, with key repeat filtered out.
pub fn lane_edge(event: &KeyEvent) -> Option<LaneEdge> {
    let pressed = event.state == ElementState::Pressed;
    if pressed && event.repeat {
        return None;
    }
    lane_for(&event.logical_key).map(|lane| LaneEdge { lane, pressed })
}

/// Control command for a key-down event, if any.
pub fn control_for(event: &KeyEvent) -> Option<Control> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    control_for_key(&event.logical_key)
}
