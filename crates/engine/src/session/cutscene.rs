use std::time::Duration;

use tracing::{debug, info, warn};

use super::Overworld;
use crate::battle::Battle;
use crate::event::{CutsceneEvent, EventResolution};
use crate::overworld::{Direction, GridCoord, Placement, StepStart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutsceneOutcome {
    /// Every event ran.
    Completed,
    /// A battle was lost; the remaining events were skipped.
    Aborted,
    /// Another cutscene was already running on this map.
    Rejected,
}

impl Overworld {
    /// Runs `events` one after another. Each event's effects are committed
    /// before the next one starts; a lost battle stops the run.
    pub async fn start_cutscene(&mut self, events: &[CutsceneEvent]) -> CutsceneOutcome {
        if !self.map.try_begin_cutscene() {
            warn!(map = %self.map.id(), "cutscene_rejected");
            return CutsceneOutcome::Rejected;
        }
        info!(map = %self.map.id(), event_count = events.len(), "cutscene_started");

        let mut outcome = CutsceneOutcome::Completed;
        for (index, event) in events.iter().enumerate() {
            let resolution = self.run_event(event).await;
            if resolution.is_battle_lost() {
                info!(
                    map = %self.map.id(),
                    index,
                    skipped = events.len() - index - 1,
                    "cutscene_aborted"
                );
                outcome = CutsceneOutcome::Aborted;
                break;
            }
        }

        self.map.end_cutscene();
        if outcome == CutsceneOutcome::Completed {
            info!(map = %self.map.id(), "cutscene_finished");
        }
        outcome
    }

    pub(crate) async fn run_event(&mut self, event: &CutsceneEvent) -> EventResolution {
        match event {
            CutsceneEvent::TextMessage { text, face_hero } => {
                self.text_message(text, face_hero.as_deref()).await
            }
            CutsceneEvent::Stand {
                who,
                direction,
                time_ms,
            } => self.stand(who, *direction, Duration::from_millis(*time_ms)).await,
            CutsceneEvent::Walk { who, direction } => self.walk(who, *direction).await,
            CutsceneEvent::ChangeMap { map, x, y, direction } => {
                self.change_map(map, GridCoord::new(*x, *y), *direction)
            }
            CutsceneEvent::AddStoryFlag { flag } => {
                if self.flags.insert(flag.as_str()) {
                    info!(flag = %flag, "story_flag_set");
                }
                EventResolution::Completed
            }
            CutsceneEvent::Battle { enemy_id } => self.battle(enemy_id).await,
            CutsceneEvent::CraftingMenu { pizzas } => self.crafting_menu(pizzas).await,
        }
    }

    async fn text_message(&mut self, text: &str, face_hero: Option<&str>) -> EventResolution {
        if let Some(who) = face_hero {
            let hero_direction = self.map.hero_entity().map(|hero| hero.direction);
            match (self.map.lookup(who), hero_direction) {
                (Some(id), Some(direction)) => {
                    self.map.face(id, direction.opposite());
                }
                _ => warn!(map = %self.map.id(), entity = %who, "face_hero_entity_missing"),
            }
        }
        self.hosts.show_message(text.to_string()).await;
        EventResolution::Completed
    }

    async fn stand(&mut self, who: &str, direction: Direction, hold: Duration) -> EventResolution {
        let Some(id) = self.map.lookup(who) else {
            warn!(map = %self.map.id(), entity = %who, "stand_entity_missing");
            return EventResolution::Completed;
        };
        self.map.face(id, direction);
        tokio::time::sleep(hold).await;
        EventResolution::Completed
    }

    async fn walk(&mut self, who: &str, direction: Direction) -> EventResolution {
        let Some(id) = self.map.lookup(who) else {
            warn!(map = %self.map.id(), entity = %who, "walk_entity_missing");
            return EventResolution::Completed;
        };

        let mut attempts = 0;
        loop {
            match self.map.begin_step(id, direction) {
                StepStart::Reserved(_) => break,
                StepStart::Missing => return EventResolution::Completed,
                StepStart::Blocked if attempts < self.config.max_walk_retries => {
                    attempts += 1;
                    tokio::time::sleep(self.config.walk_retry_delay).await;
                }
                StepStart::Blocked => {
                    warn!(
                        map = %self.map.id(),
                        entity = %who,
                        direction = direction.as_token(),
                        attempts,
                        "walk_gave_up"
                    );
                    return EventResolution::Completed;
                }
            }
        }

        tokio::time::sleep(self.config.step_duration).await;
        self.map.finish_step(id);
        EventResolution::Completed
    }

    fn change_map(
        &mut self,
        map: &str,
        position: GridCoord,
        direction: Direction,
    ) -> EventResolution {
        let running = self.map.is_cutscene_playing();
        if let Err(error) = self.mount_map(map, Some(Placement { position, direction })) {
            warn!(map = %map, error = %error, "change_map_failed");
            return EventResolution::Completed;
        }
        if running {
            self.map.try_begin_cutscene();
        }
        EventResolution::Completed
    }

    async fn crafting_menu(&mut self, pizzas: &[String]) -> EventResolution {
        match self.hosts.choose_pizza(pizzas.to_vec()).await {
            Some(pizza) if pizzas.contains(&pizza) => {
                info!(pizza = %pizza, lineup = self.lineup.len() + 1, "pizza_crafted");
                self.lineup.push(pizza);
            }
            Some(pizza) => warn!(pizza = %pizza, "crafting_choice_rejected"),
            None => debug!("crafting_declined"),
        }
        EventResolution::Completed
    }

    async fn battle(&mut self, enemy_id: &str) -> EventResolution {
        let Some(enemy) = self.content.enemies.get(enemy_id) else {
            warn!(enemy = %enemy_id, "battle_enemy_missing");
            return EventResolution::Completed;
        };
        let mut battle = Battle::new(
            &self.config,
            &self.content.actions,
            &self.content.party,
            &enemy.combatant,
        );
        let outcome = battle.run(&mut self.hosts).await;
        EventResolution::BattleFinished(outcome)
    }
}
