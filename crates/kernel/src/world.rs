use cubeworld_assets::{AssetError, DEFAULT_BLOCK, GRASS, VoxelCatalog};
use cubeworld_common::VoxelTypeId;
use cubeworld_input::{Action, InputSnapshot, LookMode, Orientation, OrientationController};
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::KinematicBody;
use crate::collision::CollisionDetector;
use crate::config::{ConfigError, WorldConfig};
use crate::grid::SpatialGrid;
use crate::movement::{MotionState, MovementIntegrator};
use crate::raycast::{GridRayCaster, PickHit, RayCaster};

/// Half-width of the generated terrain patch, in cells.
const TERRAIN_RADIUS: i32 = 5;

/// A record of every grid mutation and every simulated tick.
///
/// Renderers drain it to add and remove voxel visuals keyed by cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    VoxelPlaced { cell: IVec3, voxel: VoxelTypeId },
    /// Carries the removed type so the visual can be found and dropped.
    VoxelRemoved { cell: IVec3, voxel: VoxelTypeId },
    Ticked { tick: u64, substeps: u32 },
}

/// Why a placement or removal did not happen.
///
/// Everything except [`PlaceError::InvalidVoxelType`] is an ordinary
/// rejection that leaves the world untouched. An invalid type means the
/// catalog cannot render what was asked for and the session should stop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("cell {0} is outside the world")]
    OutOfBounds(IVec3),
    #[error("cell {0} is already occupied")]
    Occupied(IVec3),
    #[error("a voxel at {0} would overlap the player")]
    BlockedByBody(IVec3),
    #[error("cell {0} is beyond hand reach")]
    OutOfReach(IVec3),
    #[error("nothing targeted")]
    NoTarget,
    #[error(transparent)]
    InvalidVoxelType(#[from] AssetError),
}

/// Why a world could not be built or restored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl PlaceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PlaceError::InvalidVoxelType(_))
    }
}

/// What applying one [`Action`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Placed(IVec3),
    Removed(IVec3),
    Rejected(PlaceError),
    Selected(VoxelTypeId),
    /// The new pause state. On `Paused(false)` the caller should restart its
    /// [`FrameClock`](crate::FrameClock) so the paused time is not simulated.
    Paused(bool),
    SaveRequested,
    LookModeChanged(LookMode),
}

/// Summary of one call to [`World::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub outcomes: Vec<ActionOutcome>,
    /// Zero when the world is paused.
    pub substeps: u32,
    pub paused: bool,
    pub save_requested: bool,
}

/// One play session: the voxel grid, the player body and camera, and the
/// state that ties input to them.
///
/// All mutations go through explicit operations and are recorded in the
/// event log.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    catalog: VoxelCatalog,
    grid: SpatialGrid,
    body: KinematicBody,
    motion: MotionState,
    look: OrientationController,
    integrator: MovementIntegrator,
    selected: VoxelTypeId,
    paused: bool,
    tick: u64,
    event_log: Vec<WorldEvent>,
}

impl World {
    /// An empty world with the player standing on the ground at the grid middle.
    pub fn new(config: WorldConfig, catalog: VoxelCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SpatialGrid::new(config.grid_size, config.cube_size)?;
        let body = KinematicBody::player(config.cube_size);
        let middle = config.grid_size as f32 / 2.0;
        let middle = middle.floor() * config.cube_size;
        let body = body.at(Vec3::new(middle, body.half_height(), middle));
        let look = OrientationController::new(config.look);
        let integrator = MovementIntegrator::new(config.movement, Default::default());
        Ok(Self {
            config,
            catalog,
            grid,
            body,
            motion: MotionState::default(),
            look,
            integrator,
            selected: VoxelTypeId::from(DEFAULT_BLOCK),
            paused: false,
            tick: 0,
            event_log: Vec::new(),
        })
    }

    /// A new world with a grass patch of 1-2 voxel columns around the grid
    /// middle. The player spawns one cube above the middle column.
    ///
    /// The same seed always produces the same terrain.
    pub fn generate(
        config: WorldConfig,
        catalog: VoxelCatalog,
        seed: u64,
    ) -> Result<Self, WorldError> {
        let _span = tracing::info_span!("generate_world", seed).entered();
        let mut world = Self::new(config, catalog)?;
        let grass = VoxelTypeId::from(GRASS);
        world.catalog.resolve(&grass)?;

        let middle = (world.config.grid_size / 2) as i32;
        let mut state = seed;
        let mut spawn_height = 1;
        for i in -TERRAIN_RADIUS..=TERRAIN_RADIUS {
            for j in -TERRAIN_RADIUS..=TERRAIN_RADIUS {
                state = splitmix64(state);
                let height = (state % 2) as i32 + 1;
                if i == 0 && j == 0 {
                    spawn_height = height;
                }
                for k in 0..height {
                    let cell = IVec3::new(middle + i, k, middle + j);
                    if world.grid.put(cell, Some(grass.clone())).is_ok() {
                        world.event_log.push(WorldEvent::VoxelPlaced {
                            cell,
                            voxel: grass.clone(),
                        });
                    }
                }
            }
        }

        let c = world.config.cube_size;
        let spawn = Vec3::new(
            middle as f32 * c,
            (spawn_height + 1) as f32 * c,
            middle as f32 * c,
        );
        world.body.set_position(spawn);
        tracing::debug!(
            voxels = world.grid.occupied_count(),
            ?spawn,
            "terrain generated"
        );
        Ok(world)
    }

    /// Rebuild a session from saved state. Every stored voxel type must be
    /// known to the catalog.
    pub fn restore(
        mut config: WorldConfig,
        catalog: VoxelCatalog,
        grid: SpatialGrid,
        position: Vec3,
        orientation: Orientation,
    ) -> Result<Self, WorldError> {
        for (_, voxel) in grid.iter_occupied() {
            catalog.resolve(voxel)?;
        }
        config.grid_size = grid.size();
        config.cube_size = grid.cube_size();
        let mut world = Self::new(config, catalog)?;
        world.event_log = grid
            .iter_occupied()
            .map(|(cell, voxel)| WorldEvent::VoxelPlaced {
                cell,
                voxel: voxel.clone(),
            })
            .collect();
        world.grid = grid;
        world.body.set_position(position);
        world.look.set_orientation(orientation);
        tracing::debug!(voxels = world.grid.occupied_count(), "world restored");
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn catalog(&self) -> &VoxelCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn orientation(&self) -> Orientation {
        self.look.orientation()
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.look.set_orientation(orientation);
    }

    pub fn look_mode(&self) -> LookMode {
        self.look.mode()
    }

    /// Camera position.
    pub fn eye_position(&self) -> Vec3 {
        self.body.eye_position()
    }

    /// Unnormalized direction from the eye to the look target.
    pub fn view_direction(&self) -> Vec3 {
        self.look.orientation().view_direction()
    }

    pub fn look_target(&self) -> Vec3 {
        self.look.orientation().look_target(self.eye_position())
    }

    pub fn selected(&self) -> &VoxelTypeId {
        &self.selected
    }

    /// Choose the type used by subsequent placements.
    pub fn select_voxel_type(&mut self, voxel: VoxelTypeId) -> Result<(), AssetError> {
        self.catalog.resolve(&voxel)?;
        tracing::debug!(%voxel, "voxel type selected");
        self.selected = voxel;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::debug!(paused, "pause toggled");
        }
        self.paused = paused;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Whether the player currently collides with the ground, the world
    /// boundary or a voxel.
    pub fn collides(&self) -> bool {
        CollisionDetector::new(&self.grid).collides(&self.body)
    }

    /// Put the selected voxel type into `cell`.
    ///
    /// Checked in order: bounds, occupancy, catalog, overlap with the player.
    pub fn place_voxel(&mut self, cell: IVec3) -> Result<(), PlaceError> {
        if !self.grid.contains(cell) {
            return Err(PlaceError::OutOfBounds(cell));
        }
        if self.grid.is_occupied(cell) {
            return Err(PlaceError::Occupied(cell));
        }
        let voxel = self.selected.clone();
        self.catalog.resolve(&voxel)?;
        if CollisionDetector::new(&self.grid).overlaps_cell(&self.body, cell) {
            return Err(PlaceError::BlockedByBody(cell));
        }
        self.grid
            .put(cell, Some(voxel.clone()))
            .map_err(|_| PlaceError::OutOfBounds(cell))?;
        tracing::debug!(%cell, %voxel, "voxel placed");
        self.event_log.push(WorldEvent::VoxelPlaced { cell, voxel });
        Ok(())
    }

    /// Empty `cell` and return what was there.
    pub fn remove_voxel(&mut self, cell: IVec3) -> Result<VoxelTypeId, PlaceError> {
        let previous = self
            .grid
            .put(cell, None)
            .map_err(|_| PlaceError::OutOfBounds(cell))?;
        let voxel = previous.ok_or(PlaceError::NoTarget)?;
        tracing::debug!(%cell, %voxel, "voxel removed");
        self.event_log.push(WorldEvent::VoxelRemoved {
            cell,
            voxel: voxel.clone(),
        });
        Ok(voxel)
    }

    /// Cast a pick ray from the eye through the grid.
    pub fn cast_ray(&self, direction: Vec3) -> Option<PickHit> {
        GridRayCaster::new(&self.grid).cast_ray(self.eye_position(), direction)
    }

    fn within_reach(&self, cell: IVec3) -> bool {
        let center = self.grid.voxel_center(cell);
        center.distance(self.body.position()) <= self.config.reach()
    }

    /// Place next to a hit: on the hit face of a voxel, or in the floor cell
    /// under a floor point.
    pub fn place_at(&mut self, hit: PickHit) -> Result<IVec3, PlaceError> {
        let cell = match hit {
            PickHit::Voxel { cell, normal } => cell + normal,
            PickHit::Floor { point } => self.grid.voxel_cell_at(point),
        };
        if !self.within_reach(cell) {
            tracing::debug!(%cell, "placement out of reach");
            return Err(PlaceError::OutOfReach(cell));
        }
        self.place_voxel(cell)?;
        Ok(cell)
    }

    /// Remove the voxel a hit points at. Floor hits remove nothing.
    pub fn remove_at(&mut self, hit: PickHit) -> Result<IVec3, PlaceError> {
        let PickHit::Voxel { cell, .. } = hit else {
            return Err(PlaceError::NoTarget);
        };
        if !self.within_reach(cell) {
            tracing::debug!(%cell, "removal out of reach");
            return Err(PlaceError::OutOfReach(cell));
        }
        self.remove_voxel(cell)?;
        Ok(cell)
    }

    /// Place along a ray from the eye.
    pub fn place_targeted(&mut self, direction: Vec3) -> Result<IVec3, PlaceError> {
        let hit = self.cast_ray(direction).ok_or(PlaceError::NoTarget)?;
        self.place_at(hit)
    }

    /// Remove along a ray from the eye.
    pub fn remove_targeted(&mut self, direction: Vec3) -> Result<IVec3, PlaceError> {
        let hit = self.cast_ray(direction).ok_or(PlaceError::NoTarget)?;
        self.remove_at(hit)
    }

    /// Apply one action. Placement and removal aim along the view direction.
    ///
    /// Rejections come back as [`ActionOutcome::Rejected`]; only fatal
    /// errors are returned as `Err`.
    pub fn apply_action(&mut self, action: &Action) -> Result<ActionOutcome, PlaceError> {
        let outcome = match action {
            Action::PlaceVoxel => match self.place_targeted(self.view_direction()) {
                Ok(cell) => ActionOutcome::Placed(cell),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => ActionOutcome::Rejected(e),
            },
            Action::RemoveVoxel => match self.remove_targeted(self.view_direction()) {
                Ok(cell) => ActionOutcome::Removed(cell),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => ActionOutcome::Rejected(e),
            },
            Action::SelectVoxelType(voxel) => {
                self.select_voxel_type(voxel.clone())?;
                ActionOutcome::Selected(voxel.clone())
            }
            Action::TogglePause => {
                self.set_paused(!self.paused);
                ActionOutcome::Paused(self.paused)
            }
            Action::Save => ActionOutcome::SaveRequested,
            Action::SetLookMode(mode) => {
                self.look.set_mode(*mode);
                ActionOutcome::LookModeChanged(*mode)
            }
        };
        Ok(outcome)
    }

    /// Advance one frame: queued actions, then movement over
    /// `round(iteration_count · ratio)` sub-steps, then camera look.
    ///
    /// Movement is projected with the orientation left by the previous tick;
    /// pointer motion in `input` turns the camera only after the body has moved.
    ///
    /// While paused only pause, selection, look-mode and save actions are
    /// handled; placement, removal and movement wait.
    pub fn tick(&mut self, input: &InputSnapshot, ratio: f32) -> Result<TickReport, PlaceError> {
        let _span = tracing::info_span!("world_tick", tick = self.tick).entered();
        let mut report = TickReport::default();

        for action in &input.actions {
            let targeted = matches!(action, Action::PlaceVoxel | Action::RemoveVoxel);
            if self.paused && targeted {
                continue;
            }
            let outcome = self.apply_action(action)?;
            match &outcome {
                ActionOutcome::SaveRequested => report.save_requested = true,
                ActionOutcome::LookModeChanged(_) => self.look.sync(&input.pointer),
                _ => {}
            }
            report.outcomes.push(outcome);
        }

        if self.paused {
            report.paused = true;
            return Ok(report);
        }

        let (body, motion) = self.integrator.tick(
            &self.grid,
            self.body,
            self.motion,
            input,
            self.view_direction(),
            ratio,
        );
        self.body = body;
        self.motion = motion;
        self.look.update(&input.pointer);

        self.tick += 1;
        report.substeps = self.integrator.substeps(ratio);
        self.event_log.push(WorldEvent::Ticked {
            tick: self.tick,
            substeps: report.substeps,
        });
        Ok(report)
    }
}

/// Splitmix64 step, used to draw terrain column heights from the seed.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
