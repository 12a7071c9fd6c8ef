use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::action::Action;

/// Keys the simulation listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    /// Pause toggle.
    P,
    /// Save request.
    K,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0:?}")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "space" | " " => Key::Space,
            "p" => Key::P,
            "k" => Key::K,
            _ => return Err(UnknownKey(s.to_string())),
        };
        Ok(key)
    }
}

/// Horizontal axis a directional key drives, in camera-local space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAxis {
    /// Strafe.
    X,
    /// Forward/backward.
    Z,
}

/// A directional key binding: which local axis it drives and in which direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveBinding {
    pub axis: MoveAxis,
    pub sign: f32,
}

/// Directional key bindings plus the jump key.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    moves: BTreeMap<Key, MoveBinding>,
    pub jump: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let forward = MoveBinding { axis: MoveAxis::Z, sign: 1.0 };
        let backward = MoveBinding { axis: MoveAxis::Z, sign: -1.0 };
        let left = MoveBinding { axis: MoveAxis::X, sign: 1.0 };
        let right = MoveBinding { axis: MoveAxis::X, sign: -1.0 };
        let moves = BTreeMap::from([
            (Key::W, forward),
            (Key::Up, forward),
            (Key::S, backward),
            (Key::Down, backward),
            (Key::A, left),
            (Key::Left, left),
            (Key::D, right),
            (Key::Right, right),
        ]);
        Self { moves, jump: Key::Space }
    }
}

impl KeyBindings {
    pub fn binding(&self, key: Key) -> Option<MoveBinding> {
        self.moves.get(&key).copied()
    }

    /// Bindings of every directional key held in `snapshot`.
    pub fn held<'a>(&'a self, snapshot: &'a InputSnapshot) -> impl Iterator<Item = MoveBinding> + 'a {
        self.moves
            .iter()
            .filter(|(key, _)| snapshot.is_down(**key))
            .map(|(_, binding)| *binding)
    }
}

/// Pointer buttons the input layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Pointer state as seen by one tick.
///
/// Serial counters let the orientation controller tell a new press or a new
/// raw motion event apart from one it has already consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSnapshot {
    /// Last pointer position while dragging.
    pub position: Vec2,
    /// Position of the most recent primary press.
    pub anchor: Vec2,
    pub dragging: bool,
    pub press_serial: u64,
    /// Movement reported by the most recent locked-pointer motion event.
    pub motion: Vec2,
    pub motion_serial: u64,
}

/// Everything a tick needs to know about input, captured once per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub keys_down: BTreeSet<Key>,
    pub pointer: PointerSnapshot,
    pub actions: Vec<Action>,
}

impl InputSnapshot {
    /// Snapshot with only the given keys held.
    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys_down: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

/// Accumulates raw key and pointer events between ticks.
///
/// Event handlers are the only writers; the tick reads through [`InputState::snapshot`].
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: BTreeSet<Key>,
    pointer: PointerSnapshot,
    moved_since_press: bool,
    pending: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        let newly_pressed = self.keys_down.insert(key);
        if !newly_pressed {
            return;
        }
        match key {
            Key::P => self.pending.push(Action::TogglePause),
            Key::K => self.pending.push(Action::Save),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    /// Queue an action that did not come from a key or pointer event (e.g. a UI picker).
    pub fn push_action(&mut self, action: Action) {
        self.pending.push(action);
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2) {
        self.moved_since_press = false;
        match button {
            PointerButton::Primary => {
                self.pointer.anchor = position;
                self.pointer.position = position;
                self.pointer.dragging = true;
                self.pointer.press_serial += 1;
            }
            PointerButton::Secondary => self.pending.push(Action::PlaceVoxel),
        }
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        self.moved_since_press = true;
        if self.pointer.dragging {
            self.pointer.position = position;
        }
    }

    /// Raw movement while the pointer is locked.
    pub fn pointer_motion(&mut self, delta: Vec2) {
        self.moved_since_press = true;
        self.pointer.motion = delta;
        self.pointer.motion_serial += 1;
    }

    /// A primary click that did not move in between requests a removal.
    pub fn pointer_up(&mut self, button: PointerButton) {
        if button == PointerButton::Primary {
            if !self.moved_since_press {
                self.pending.push(Action::RemoveVoxel);
            }
            self.pointer.dragging = false;
        }
        self.moved_since_press = false;
    }

    /// Pointer re-entered the surface; a drag whose release happened outside ends here.
    pub fn pointer_enter(&mut self, primary_held: bool) {
        if !primary_held {
            self.pointer.dragging = false;
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Capture the current state and drain queued actions.
    pub fn snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            keys_down: self.keys_down.clone(),
            pointer: self.pointer,
            actions: std::mem::take(&mut self.pending),
        }
    }
}
