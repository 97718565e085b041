use std::collections::HashMap;

use serde::Deserialize;

use super::grid::{Direction, GridCoord};
use crate::event::CutsceneEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// One candidate event list; runs only when every `required` flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub required: Vec<String>,
    pub events: Vec<CutsceneEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorStep {
    Stand { direction: Direction, time_ms: u64 },
    Walk { direction: Direction },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    PlayerControlled,
    IdleLoop { steps: Vec<BehaviorStep>, next: usize },
}

impl Behavior {
    pub fn idle(steps: Vec<BehaviorStep>) -> Self {
        Self::IdleLoop { steps, next: 0 }
    }

    pub fn is_player_controlled(&self) -> bool {
        matches!(self, Self::PlayerControlled)
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub key: String,
    pub position: GridCoord,
    pub direction: Direction,
    pub behavior: Behavior,
    pub talking: Vec<Scenario>,
    pub sprite: Option<String>,
    pub intent: Option<GridCoord>,
}

impl Entity {
    pub fn occupies_or_reserves(&self, cell: GridCoord) -> bool {
        self.position == cell || self.intent == Some(cell)
    }
}

#[derive(Debug, Clone)]
pub struct EntityTemplate {
    pub key: String,
    pub position: GridCoord,
    pub direction: Direction,
    pub behavior: Behavior,
    pub talking: Vec<Scenario>,
    pub sprite: Option<String>,
}

/// Arena of the live entities of one map. Entities are never removed while
/// the map is mounted, so handles stay valid for the map's lifetime.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    by_key: HashMap<String, EntityId>,
}

impl EntityRegistry {
    pub fn spawn(&mut self, template: EntityTemplate) -> EntityId {
        let id = self.allocator.allocate();
        self.by_key.insert(template.key.clone(), id);
        self.entities.push(Entity {
            id,
            key: template.key,
            position: template.position,
            direction: template.direction,
            behavior: template.behavior,
            talking: template.talking,
            sprite: template.sprite,
            intent: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|entity| entity.id).collect()
    }

    pub fn lookup(&self, key: &str) -> Option<EntityId> {
        self.by_key.get(key).copied()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        // Ids are allocated densely from zero in spawn order.
        self.entities
            .get(id.0 as usize)
            .filter(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .get_mut(id.0 as usize)
            .filter(|entity| entity.id == id)
    }

    pub fn by_key(&self, key: &str) -> Option<&Entity> {
        self.lookup(key).and_then(|id| self.get(id))
    }

    pub fn at(&self, cell: GridCoord) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.position == cell)
    }

    pub fn blocking(&self, cell: GridCoord) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.occupies_or_reserves(cell))
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.behavior.is_player_controlled())
    }
}
