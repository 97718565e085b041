mod cutscene;

pub use cutscene::CutsceneOutcome;

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::content::WorldContent;
use crate::flags::StoryFlags;
use crate::host::{Hosts, MapSurface};
use crate::overworld::{
    evaluate_action, evaluate_footstep, BehaviorStep, Direction, EntityId, GridCoord, MountError,
    OverworldMap, Placement, StepStart,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown map '{map}'")]
    UnknownMap { map: String },
    #[error(transparent)]
    Mount(#[from] MountError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStep {
    /// A cutscene is playing; the hero did not move.
    Suppressed,
    /// The destination was taken; the hero only turned.
    Turned,
    Moved {
        position: GridCoord,
        cutscene: Option<CutsceneOutcome>,
    },
}

/// One play session: the mounted map, story progress and the collaborators
/// everything is shown through.
pub struct Overworld {
    config: EngineConfig,
    content: WorldContent,
    map: OverworldMap,
    flags: StoryFlags,
    hosts: Hosts,
    lineup: Vec<String>,
    idle_holds: HashMap<EntityId, Instant>,
}

impl Overworld {
    pub fn new(
        config: EngineConfig,
        content: WorldContent,
        hosts: Hosts,
    ) -> Result<Self, SessionError> {
        let map = mount(&content, &content.start_map, None)?;
        info!(map = %map.id(), entity_count = map.entities().len(), "session_started");
        Ok(Self {
            config,
            content,
            map,
            flags: StoryFlags::new(),
            hosts,
            lineup: Vec::new(),
            idle_holds: HashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &WorldContent {
        &self.content
    }

    pub fn map(&self) -> &OverworldMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut OverworldMap {
        &mut self.map
    }

    pub fn flags(&self) -> &StoryFlags {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut StoryFlags {
        &mut self.flags
    }

    /// Pizzas crafted so far, in crafting order.
    pub fn lineup(&self) -> &[String] {
        &self.lineup
    }

    pub fn hosts_mut(&mut self) -> &mut Hosts {
        &mut self.hosts
    }

    /// Replaces the mounted map. Entities of the old map are dropped.
    pub fn mount_map(&mut self, id: &str, hero: Option<Placement>) -> Result<(), SessionError> {
        self.map = mount(&self.content, id, hero)?;
        self.idle_holds.clear();
        Ok(())
    }

    /// Moves the hero one cell, then checks the footstep trigger.
    pub async fn step_player(&mut self, direction: Direction) -> PlayerStep {
        if self.map.is_cutscene_playing() {
            return PlayerStep::Suppressed;
        }
        let hero = self.map.hero();
        match self.map.begin_step(hero, direction) {
            StepStart::Reserved(_) => {}
            StepStart::Blocked => return PlayerStep::Turned,
            StepStart::Missing => return PlayerStep::Suppressed,
        }
        tokio::time::sleep(self.config.step_duration).await;
        let Some(position) = self.map.finish_step(hero) else {
            return PlayerStep::Suppressed;
        };
        debug!(map = %self.map.id(), x = position.x, y = position.y, "player_stepped");

        let cutscene = match evaluate_footstep(&self.map, hero) {
            Some(triggered) => Some(self.start_cutscene(&triggered.events).await),
            None => None,
        };
        PlayerStep::Moved { position, cutscene }
    }

    /// Talks to whatever stands in front of the hero.
    pub async fn interact(&mut self) -> Option<CutsceneOutcome> {
        let triggered = evaluate_action(&self.map, &self.flags, self.map.hero())?;
        Some(self.start_cutscene(&triggered.events).await)
    }

    /// Advances every idle loop by one step. Walks start together and are
    /// committed together after one step duration; a blocked walk is skipped.
    pub async fn advance_idle_behaviors(&mut self) {
        if self.map.is_cutscene_playing() {
            return;
        }
        let now = Instant::now();
        let mut walking = Vec::new();
        for id in self.map.entities().ids() {
            if self.idle_holds.get(&id).is_some_and(|until| *until > now) {
                continue;
            }
            match self.map.next_idle_step(id) {
                Some(BehaviorStep::Stand { direction, time_ms }) => {
                    self.map.face(id, direction);
                    self.idle_holds
                        .insert(id, now + Duration::from_millis(time_ms));
                }
                Some(BehaviorStep::Walk { direction }) => match self.map.begin_step(id, direction) {
                    StepStart::Reserved(_) => walking.push(id),
                    StepStart::Blocked | StepStart::Missing => {
                        debug!(map = %self.map.id(), entity = ?id, "idle_walk_skipped");
                    }
                },
                None => {}
            }
        }
        if walking.is_empty() {
            return;
        }
        tokio::time::sleep(self.config.step_duration).await;
        for id in walking {
            self.map.finish_step(id);
        }
    }

    /// Draws both map layers, centred on the hero.
    pub fn draw(&self, surface: &mut dyn MapSurface) {
        let camera = self.map.hero();
        self.map.draw_lower_image(surface, camera);
        self.map.draw_upper_image(surface, camera);
    }

    /// Ends the session, handing back the story progress it made.
    pub fn finish(self) -> StoryFlags {
        info!(flag_count = self.flags.len(), "session_finished");
        self.flags
    }
}

fn mount(
    content: &WorldContent,
    id: &str,
    hero: Option<Placement>,
) -> Result<OverworldMap, SessionError> {
    let def = content
        .maps
        .get(id)
        .ok_or_else(|| SessionError::UnknownMap { map: id.to_string() })?;
    Ok(OverworldMap::mount(id, def, hero)?)
}
