use cubeworld_input::LookConfig;
use serde::{Deserialize, Serialize};

use crate::grid::{GridError, MAX_GRID_SIZE};

/// A configuration value the world cannot run with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid_size must be between 1 and {max}, got {value}", max = MAX_GRID_SIZE)]
    GridSize { value: usize },
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

/// Tuning for the movement integrator. Velocities are world units per sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Sub-steps per frame at the ideal frame time.
    pub iteration_count: u32,
    pub base_velocity: f32,
    pub jump_speed: f32,
    /// Downward velocity added per sub-step.
    pub gravity_step: f32,
    /// Gravity stops accelerating once the fall speed exceeds this.
    pub terminal_velocity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            iteration_count: 10,
            base_velocity: 0.4,
            jump_speed: 0.8,
            gravity_step: 0.005,
            terminal_velocity: 1.0,
        }
    }
}

/// World-level configuration. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells per side of the cubic grid.
    pub grid_size: usize,
    /// Edge length of one voxel in world units.
    pub cube_size: f32,
    /// Maximum interaction distance, in cubes.
    pub hand_length: f32,
    /// Frame time, in seconds, at which one frame runs exactly `iteration_count` sub-steps.
    pub ideal_frame_time: f32,
    pub movement: MovementConfig,
    pub look: LookConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            cube_size: 50.0,
            hand_length: 7.0,
            ideal_frame_time: 1.0 / 60.0,
            movement: MovementConfig::default(),
            look: LookConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Check every value the grid, the clock and the integrator depend on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::GridSize {
                value: self.grid_size,
            });
        }
        positive("cube_size", self.cube_size)?;
        positive("ideal_frame_time", self.ideal_frame_time)?;
        finite("hand_length", self.hand_length)?;
        let m = &self.movement;
        finite("movement.base_velocity", m.base_velocity)?;
        finite("movement.jump_speed", m.jump_speed)?;
        finite("movement.gravity_step", m.gravity_step)?;
        finite("movement.terminal_velocity", m.terminal_velocity)?;
        Ok(())
    }

    /// Hand reach in world units.
    pub fn reach(&self) -> f32 {
        self.hand_length * self.cube_size
    }
}
