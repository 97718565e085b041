use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use super::entity::{
    Behavior, BehaviorStep, Entity, EntityId, EntityRegistry, EntityTemplate, Scenario,
};
use super::grid::{Direction, GridCoord, GRID_CELL_PX};
use crate::content::MapDef;
use crate::host::{MapLayer, MapSurface};

/// Screen anchor of the camera entity, in pixels (grid 10.5, 6).
pub const CAMERA_ANCHOR_PX: (i32, i32) = (GRID_CELL_PX * 21 / 2, GRID_CELL_PX * 6);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapState {
    #[default]
    Idle,
    RunningCutscene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStart {
    Reserved(GridCoord),
    Blocked,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: GridCoord,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("map '{map}' has no player-controlled object")]
    MissingPlayer { map: String },
    #[error("map '{map}' has {count} player-controlled objects, expected exactly one")]
    MultiplePlayers { map: String, count: usize },
}

#[derive(Debug)]
pub struct OverworldMap {
    id: String,
    lower_src: Option<String>,
    upper_src: Option<String>,
    walls: HashSet<GridCoord>,
    cutscene_spaces: HashMap<GridCoord, Vec<Scenario>>,
    entities: EntityRegistry,
    hero: EntityId,
    state: MapState,
}

impl OverworldMap {
    pub fn mount(
        id: &str,
        def: &MapDef,
        hero_placement: Option<Placement>,
    ) -> Result<Self, MountError> {
        let player_count = def
            .objects
            .iter()
            .filter(|object| object.player_controlled)
            .count();
        match player_count {
            0 => {
                return Err(MountError::MissingPlayer { map: id.to_string() });
            }
            1 => {}
            count => {
                return Err(MountError::MultiplePlayers {
                    map: id.to_string(),
                    count,
                });
            }
        }

        let mut entities = EntityRegistry::default();
        let mut hero = None;
        for object in &def.objects {
            let mut position = GridCoord::new(object.x, object.y);
            let mut direction = object.direction;
            let behavior = if object.player_controlled {
                if let Some(placement) = hero_placement {
                    position = placement.position;
                    direction = placement.direction;
                }
                Behavior::PlayerControlled
            } else {
                Behavior::idle(object.behavior_loop.clone())
            };
            let id = entities.spawn(EntityTemplate {
                key: object.id.clone(),
                position,
                direction,
                behavior,
                talking: object.scenarios(),
                sprite: object.sprite.clone(),
            });
            if object.player_controlled {
                hero = Some(id);
            }
        }
        let Some(hero) = hero else {
            return Err(MountError::MissingPlayer { map: id.to_string() });
        };

        let mut cutscene_spaces: HashMap<GridCoord, Vec<Scenario>> = HashMap::new();
        for space in &def.cutscene_spaces {
            cutscene_spaces
                .entry(GridCoord::new(space.x, space.y))
                .or_default()
                .extend(space.scenarios.iter().cloned());
        }

        let map = Self {
            id: id.to_string(),
            lower_src: def.lower_src.clone(),
            upper_src: def.upper_src.clone(),
            walls: def.walls.iter().copied().collect(),
            cutscene_spaces,
            entities,
            hero,
            state: MapState::Idle,
        };
        info!(
            map = %map.id,
            entity_count = map.entities.len(),
            wall_count = map.walls.len(),
            "map_mounted"
        );
        Ok(map)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hero(&self) -> EntityId {
        self.hero
    }

    pub fn hero_entity(&self) -> Option<&Entity> {
        self.entities.get(self.hero)
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn lookup(&self, key: &str) -> Option<EntityId> {
        self.entities.lookup(key)
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_cutscene_playing(&self) -> bool {
        self.state == MapState::RunningCutscene
    }

    /// Idle -> RunningCutscene. Refuses when a cutscene is already running.
    pub fn try_begin_cutscene(&mut self) -> bool {
        if self.state != MapState::Idle {
            return false;
        }
        self.state = MapState::RunningCutscene;
        true
    }

    pub fn end_cutscene(&mut self) {
        self.state = MapState::Idle;
    }

    pub fn add_wall(&mut self, cell: GridCoord) {
        self.walls.insert(cell);
    }

    pub fn is_wall(&self, cell: GridCoord) -> bool {
        self.walls.contains(&cell)
    }

    /// True when the cell one step from `from` towards `direction` is a wall,
    /// holds an entity, or is reserved as some entity's in-flight target.
    pub fn is_space_taken(&self, from: GridCoord, direction: Direction) -> bool {
        let cell = from.neighbor(direction);
        self.is_wall(cell) || self.entities.blocking(cell).is_some()
    }

    pub fn scenarios_at(&self, cell: GridCoord) -> Option<&[Scenario]> {
        self.cutscene_spaces.get(&cell).map(Vec::as_slice)
    }

    pub fn face(&mut self, id: EntityId, direction: Direction) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        entity.direction = direction;
        true
    }

    /// Turns the entity and reserves its destination cell if free.
    pub fn begin_step(&mut self, id: EntityId, direction: Direction) -> StepStart {
        let Some(entity) = self.entities.get(id) else {
            return StepStart::Missing;
        };
        let from = entity.position;
        let blocked = entity.intent.is_some() || self.is_space_taken(from, direction);

        let Some(entity) = self.entities.get_mut(id) else {
            return StepStart::Missing;
        };
        entity.direction = direction;
        if blocked {
            debug!(
                map = %self.id,
                entity = %entity.key,
                direction = direction.as_token(),
                "step_blocked"
            );
            return StepStart::Blocked;
        }
        let target = from.neighbor(direction);
        entity.intent = Some(target);
        StepStart::Reserved(target)
    }

    /// Commits a reserved step. Returns the new position.
    pub fn finish_step(&mut self, id: EntityId) -> Option<GridCoord> {
        let entity = self.entities.get_mut(id)?;
        let target = entity.intent.take()?;
        entity.position = target;
        Some(target)
    }

    /// Next step of an idle loop, advancing the loop cursor.
    pub fn next_idle_step(&mut self, id: EntityId) -> Option<BehaviorStep> {
        let entity = self.entities.get_mut(id)?;
        let Behavior::IdleLoop { steps, next } = &mut entity.behavior else {
            return None;
        };
        if steps.is_empty() {
            return None;
        }
        let step = steps[*next % steps.len()].clone();
        *next = (*next + 1) % steps.len();
        Some(step)
    }

    pub fn draw_lower_image(&self, surface: &mut dyn MapSurface, camera: EntityId) {
        self.draw_layer(surface, MapLayer::Lower, self.lower_src.as_deref(), camera);
    }

    pub fn draw_upper_image(&self, surface: &mut dyn MapSurface, camera: EntityId) {
        self.draw_layer(surface, MapLayer::Upper, self.upper_src.as_deref(), camera);
    }

    fn draw_layer(
        &self,
        surface: &mut dyn MapSurface,
        layer: MapLayer,
        src: Option<&str>,
        camera: EntityId,
    ) {
        let (Some(src), Some(camera)) = (src, self.entities.get(camera)) else {
            return;
        };
        let (camera_x, camera_y) = camera.position.to_px();
        surface.draw_image(
            layer,
            src,
            CAMERA_ANCHOR_PX.0 - camera_x,
            CAMERA_ANCHOR_PX.1 - camera_y,
        );
    }
}
