use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::state::PointerSnapshot;

/// Pitch limit in degrees; `lat` always stays within `[-LAT_LIMIT, LAT_LIMIT]`.
pub const LAT_LIMIT: f32 = 85.0;

/// Distance from the eye to the derived look target.
const LOOK_DISTANCE: f32 = 100.0;

/// How pointer input turns into camera rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookMode {
    /// Rotate while the primary button is held, measured against the press anchor.
    #[default]
    Drag,
    /// Rotate from raw movement deltas reported by a locked pointer.
    LockedPointer,
}

/// Durable camera orientation in degrees: pitch (`lat`) and yaw (`lon`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub lat: f32,
    pub lon: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            lat: -66.59,
            lon: -31.8,
        }
    }
}

impl Orientation {
    /// Build an orientation, clamping `lat` into range.
    pub fn new(lat: f32, lon: f32) -> Self {
        Self {
            lat: lat.clamp(-LAT_LIMIT, LAT_LIMIT),
            lon,
        }
    }

    /// Point the camera at, seen from `eye`.
    pub fn look_target(&self, eye: Vec3) -> Vec3 {
        let phi = (90.0 - self.lat).to_radians();
        let theta = self.lon.to_radians();
        eye + LOOK_DISTANCE
            * Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
    }

    /// `look_target(eye) - eye`; independent of the eye position.
    pub fn view_direction(&self) -> Vec3 {
        self.look_target(Vec3::ZERO)
    }
}

/// Look tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Degrees of rotation per pixel of pointer movement.
    pub look_speed: f32,
    pub mode: LookMode,
    pub initial: Orientation,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            look_speed: 0.2,
            mode: LookMode::Drag,
            initial: Orientation::default(),
        }
    }
}

/// Turns pointer snapshots into a clamped yaw/pitch pair.
///
/// Both look modes share one update rule; only the source of the per-tick
/// delta differs. The controller remembers which press and which motion event
/// it already consumed, so a stale snapshot never rotates the camera twice.
#[derive(Debug, Clone)]
pub struct OrientationController {
    look_speed: f32,
    mode: LookMode,
    orientation: Orientation,
    anchor: Vec2,
    delta: Vec2,
    seen_press: u64,
    seen_motion: u64,
}

impl OrientationController {
    pub fn new(config: LookConfig) -> Self {
        Self {
            look_speed: config.look_speed,
            mode: config.mode,
            orientation: Orientation::new(config.initial.lat, config.initial.lon),
            anchor: Vec2::ZERO,
            delta: Vec2::ZERO,
            seen_press: 0,
            seen_motion: 0,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = Orientation::new(orientation.lat, orientation.lon);
    }

    pub fn mode(&self) -> LookMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LookMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "look mode changed");
        }
        self.mode = mode;
    }

    /// Delta applied by the most recent effective update.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Process one tick of pointer state. Returns whether the orientation changed.
    pub fn update(&mut self, pointer: &PointerSnapshot) -> bool {
        match self.mode {
            LookMode::Drag => {
                if !pointer.dragging {
                    return false;
                }
                if pointer.press_serial != self.seen_press {
                    self.seen_press = pointer.press_serial;
                    self.anchor = pointer.anchor;
                }
                if pointer.position == self.anchor {
                    return false;
                }
                self.delta = pointer.position - self.anchor;
                self.anchor = pointer.position;
            }
            LookMode::LockedPointer => {
                if pointer.motion_serial == self.seen_motion {
                    return false;
                }
                self.seen_motion = pointer.motion_serial;
                self.delta = pointer.motion;
            }
        }
        self.apply_delta();
        true
    }

    /// Drop any consumed-event bookkeeping, e.g. after the pointer lock changes hands.
    pub fn sync(&mut self, pointer: &PointerSnapshot) {
        self.seen_press = pointer.press_serial;
        self.seen_motion = pointer.motion_serial;
        self.anchor = pointer.position;
    }

    fn apply_delta(&mut self) {
        let lon = self.orientation.lon + self.delta.x * self.look_speed;
        let lat = self.orientation.lat - self.delta.y * self.look_speed;
        self.orientation = Orientation::new(lat, lon);
    }
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(LookConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{InputState, PointerButton};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn level_controller(mode: LookMode) -> OrientationController {
        OrientationController::new(LookConfig {
            mode,
            initial: Orientation::new(0.0, 0.0),
            ..LookConfig::default()
        })
    }

    #[test]
    fn idle_pointer_is_noop() {
        let mut ctl = level_controller(LookMode::Drag);
        assert!(!ctl.update(&PointerSnapshot::default()));
        assert_eq!(ctl.orientation(), Orientation::new(0.0, 0.0));
    }

    #[test]
    fn drag_rotates_by_delta_since_last_tick() {
        let mut input = InputState::new();
        let mut ctl = level_controller(LookMode::Drag);

        input.pointer_down(PointerButton::Primary, Vec2::new(100.0, 100.0));
        input.pointer_move(Vec2::new(110.0, 95.0));
        assert!(ctl.update(&input.snapshot().pointer));
        assert!(approx(ctl.orientation().lon, 2.0));
        assert!(approx(ctl.orientation().lat, 1.0));

        // Same position next tick: nothing moved since the anchor was reset.
        assert!(!ctl.update(&input.snapshot().pointer));

        input.pointer_move(Vec2::new(115.0, 95.0));
        assert!(ctl.update(&input.snapshot().pointer));
        assert!(approx(ctl.orientation().lon, 3.0));
        assert!(approx(ctl.delta().x, 5.0));
    }

    #[test]
    fn new_press_resets_anchor() {
        let mut input = InputState::new();
        let mut ctl = level_controller(LookMode::Drag);

        input.pointer_down(PointerButton::Primary, Vec2::new(0.0, 0.0));
        input.pointer_move(Vec2::new(10.0, 0.0));
        ctl.update(&input.snapshot().pointer);
        input.pointer_up(PointerButton::Primary);

        input.pointer_down(PointerButton::Primary, Vec2::new(500.0, 500.0));
        input.pointer_move(Vec2::new(505.0, 500.0));
        ctl.update(&input.snapshot().pointer);
        assert!(approx(ctl.orientation().lon, 3.0));
    }

    #[test]
    fn locked_pointer_consumes_each_motion_once() {
        let mut input = InputState::new();
        let mut ctl = level_controller(LookMode::LockedPointer);

        input.pointer_motion(Vec2::new(-5.0, 0.0));
        assert!(ctl.update(&input.snapshot().pointer));
        assert!(approx(ctl.orientation().lon, -1.0));
        assert!(!ctl.update(&input.snapshot().pointer));

        // An identical delta from a new event still counts.
        input.pointer_motion(Vec2::new(-5.0, 0.0));
        assert!(ctl.update(&input.snapshot().pointer));
        assert!(approx(ctl.orientation().lon, -2.0));
    }

    #[test]
    fn locked_mode_ignores_drag() {
        let mut input = InputState::new();
        let mut ctl = level_controller(LookMode::LockedPointer);
        input.pointer_down(PointerButton::Primary, Vec2::ZERO);
        input.pointer_move(Vec2::new(50.0, 50.0));
        assert!(!ctl.update(&input.snapshot().pointer));
    }

    #[test]
    fn lat_stays_clamped_for_any_delta_sequence() {
        let mut input = InputState::new();
        let mut ctl = level_controller(LookMode::LockedPointer);
        let deltas = [
            -1000.0, 3.0, 700.0, 700.0, -12.5, 0.0, -2000.0, 425.0, -425.0, 10_000.0,
        ];
        for dy in deltas {
            input.pointer_motion(Vec2::new(1.0, dy));
            ctl.update(&input.snapshot().pointer);
            let lat = ctl.orientation().lat;
            assert!((-LAT_LIMIT..=LAT_LIMIT).contains(&lat), "lat {lat} out of range");
        }
    }

    #[test]
    fn set_orientation_clamps() {
        let mut ctl = OrientationController::default();
        ctl.set_orientation(Orientation { lat: 120.0, lon: 400.0 });
        assert_eq!(ctl.orientation().lat, LAT_LIMIT);
        assert_eq!(ctl.orientation().lon, 400.0);
    }

    #[test]
    fn look_target_level_yaw_zero_points_along_x() {
        let o = Orientation::new(0.0, 0.0);
        let eye = Vec3::new(10.0, 20.0, 30.0);
        let t = o.look_target(eye);
        assert!(approx(t.x, 110.0));
        assert!(approx(t.y, 20.0));
        assert!(approx(t.z, 30.0));
    }

    #[test]
    fn look_target_yaw_ninety_points_along_z() {
        let dir = Orientation::new(0.0, 90.0).view_direction();
        assert!(dir.x.abs() < 1e-3);
        assert!(approx(dir.z, 100.0));
    }

    #[test]
    fn view_direction_is_position_independent() {
        let o = Orientation::new(30.0, -45.0);
        let a = o.look_target(Vec3::new(1.0, 2.0, 3.0)) - Vec3::new(1.0, 2.0, 3.0);
        let b = o.view_direction();
        assert!((a - b).length() < 1e-3);
        assert!(approx(b.length(), 100.0));
    }

    #[test]
    fn look_config_defaults() {
        let c = LookConfig::default();
        assert_eq!(c.look_speed, 0.2);
        assert_eq!(c.mode, LookMode::Drag);
        assert_eq!(c.initial, Orientation { lat: -66.59, lon: -31.8 });
    }
}
