use cubeworld_input::{InputSnapshot, KeyBindings, MoveAxis};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::{Axis, KinematicBody};
use crate::collision::CollisionDetector;
use crate::config::MovementConfig;
use crate::grid::SpatialGrid;

/// Per-tick velocity and contact state carried between ticks.
///
/// Horizontal velocity is rebuilt from input every tick. Vertical velocity
/// persists, so gravity and jumps integrate over frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub velocity: Vec3,
    /// The most recent downward move was blocked; gates jumping.
    pub grounded: bool,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            grounded: true,
        }
    }
}

/// Turns an input snapshot and a camera direction into resolved body motion.
///
/// Every call is a function of its arguments: the previous body and motion
/// state go in, the next ones come out.
#[derive(Debug, Clone, Default)]
pub struct MovementIntegrator {
    config: MovementConfig,
    bindings: KeyBindings,
}

impl MovementIntegrator {
    pub fn new(config: MovementConfig, bindings: KeyBindings) -> Self {
        Self { config, bindings }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Camera-local velocity from held keys: `x` strafes, `z` goes forward.
    ///
    /// Diagonal input is scaled by `cos 45°` on both axes. A held jump key
    /// only takes effect while grounded and clears the flag.
    pub fn define_move(&self, input: &InputSnapshot, state: MotionState) -> MotionState {
        let mut next = state;
        next.velocity.x = 0.0;
        next.velocity.z = 0.0;
        for binding in self.bindings.held(input) {
            let v = binding.sign * self.config.base_velocity;
            match binding.axis {
                MoveAxis::X => next.velocity.x += v,
                MoveAxis::Z => next.velocity.z += v,
            }
        }
        if input.is_down(self.bindings.jump) && next.grounded {
            next.grounded = false;
            next.velocity.y = self.config.jump_speed;
        }
        if next.velocity.x != 0.0 && next.velocity.z != 0.0 {
            let ratio = std::f32::consts::FRAC_PI_4.cos();
            next.velocity.x *= ratio;
            next.velocity.z *= ratio;
        }
        next
    }

    /// Rotate the horizontal part of a camera-local velocity into world space.
    ///
    /// `front` is the normalized horizontal view direction and
    /// `right = (front.y, -front.x)`. The vertical component passes through.
    pub fn project_on_camera(local: Vec3, view_direction: Vec3) -> Vec3 {
        let front = Vec2::new(view_direction.x, view_direction.z).normalize_or_zero();
        let right = Vec2::new(front.y, -front.x);
        let world = front * local.z + right * local.x;
        Vec3::new(world.x, local.y, world.y)
    }

    /// One sub-step of gravity. Once the fall speed passes the terminal
    /// velocity it stops growing.
    pub fn apply_gravity(&self, velocity: Vec3) -> Vec3 {
        if velocity.y < -self.config.terminal_velocity {
            return velocity;
        }
        Vec3::new(velocity.x, velocity.y - self.config.gravity_step, velocity.z)
    }

    /// Sub-step count for a frame that took `ratio` ideal frames.
    pub fn substeps(&self, ratio: f32) -> u32 {
        let n = (self.config.iteration_count as f32 * ratio).round();
        if n.is_finite() && n > 0.0 { n as u32 } else { 0 }
    }

    /// Run `substeps` sub-steps of gravity and per-axis resolved translation.
    ///
    /// Each axis moves on its own and is reverted if the moved body
    /// collides, so a blocked axis never stops the others.
    pub fn advance(
        &self,
        grid: &SpatialGrid,
        body: KinematicBody,
        state: MotionState,
        substeps: u32,
    ) -> (KinematicBody, MotionState) {
        let detector = CollisionDetector::new(grid);
        let mut body = body;
        let mut state = state;
        for _ in 0..substeps {
            state.velocity = self.apply_gravity(state.velocity);
            for axis in Axis::ALL {
                let delta = state.velocity[axis.index()];
                if delta == 0.0 {
                    continue;
                }
                let before = body.axis(axis);
                body.translate_axis(axis, delta);
                if detector.collides(&body) {
                    body.set_axis(axis, before);
                    if axis == Axis::Y && delta < 0.0 {
                        state.grounded = true;
                    }
                } else if axis == Axis::Y && delta <= 0.0 {
                    state.grounded = false;
                }
            }
        }
        (body, state)
    }

    /// Full movement tick: input to local velocity, camera projection, then
    /// sub-stepped resolution.
    pub fn tick(
        &self,
        grid: &SpatialGrid,
        body: KinematicBody,
        state: MotionState,
        input: &InputSnapshot,
        view_direction: Vec3,
        ratio: f32,
    ) -> (KinematicBody, MotionState) {
        let mut state = self.define_move(input, state);
        state.velocity = Self::project_on_camera(state.velocity, view_direction);
        let substeps = self.substeps(ratio);
        let (body, state) = self.advance(grid, body, state, substeps);
        tracing::trace!(
            substeps,
            position = ?body.position(),
            velocity = ?state.velocity,
            grounded = state.grounded,
            "movement tick"
        );
        (body, state)
    }
}
