mod entity;
mod grid;
mod map;
mod trigger;

pub use entity::{
    Behavior, BehaviorStep, Entity, EntityId, EntityIdAllocator, EntityRegistry, EntityTemplate,
    Scenario,
};
pub use grid::{Direction, GridCoord, GRID_CELL_PX};
pub use map::{MapState, MountError, OverworldMap, Placement, StepStart, CAMERA_ANCHOR_PX};
pub use trigger::{evaluate_action, evaluate_footstep, TriggeredCutscene};
