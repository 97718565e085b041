use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::types::{MapDef, ObjectKind, WorldContent};
use crate::battle::{BattleEvent, CombatantDef};
use crate::event::CutsceneEvent;
use crate::overworld::Scenario;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse content json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {path}: {message}")]
    Validation { path: String, message: String },
}

pub fn load_world(path: &Path) -> Result<WorldContent, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let world = parse_world(&raw)?;
    info!(
        path = %path.display(),
        map_count = world.maps.len(),
        action_count = world.actions.len(),
        enemy_count = world.enemies.len(),
        "content_loaded"
    );
    Ok(world)
}

pub fn parse_world(raw: &str) -> Result<WorldContent, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let world = serde_path_to_error::deserialize::<_, WorldContent>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            ContentError::Parse {
                path,
                source: error.into_inner(),
            }
        },
    )?;
    validate_world(&world)?;
    Ok(world)
}

fn validation_err(path: impl Into<String>, message: impl Into<String>) -> ContentError {
    ContentError::Validation {
        path: path.into(),
        message: message.into(),
    }
}

fn sorted_keys<V>(map: &std::collections::HashMap<String, V>) -> Vec<&String> {
    let mut keys = map.keys().collect::<Vec<_>>();
    keys.sort();
    keys
}

pub fn validate_world(world: &WorldContent) -> Result<(), ContentError> {
    if !world.maps.contains_key(&world.start_map) {
        return Err(validation_err(
            "start_map",
            format!("unknown map '{}'", world.start_map),
        ));
    }

    validate_combatant(world, "party", &world.party)?;
    for id in sorted_keys(&world.enemies) {
        validate_combatant(
            world,
            &format!("enemies.{id}.combatant"),
            &world.enemies[id].combatant,
        )?;
    }

    for id in sorted_keys(&world.actions) {
        for (index, event) in world.actions[id].success.iter().enumerate() {
            if matches!(event, BattleEvent::SubmissionMenu { .. }) {
                return Err(validation_err(
                    format!("actions.{id}.success[{index}]"),
                    "submission_menu is issued by the battle loop, not by actions",
                ));
            }
        }
    }

    for id in sorted_keys(&world.maps) {
        validate_map(world, id, &world.maps[id])?;
    }
    Ok(())
}

fn validate_combatant(
    world: &WorldContent,
    path: &str,
    combatant: &CombatantDef,
) -> Result<(), ContentError> {
    if combatant.max_hp == 0 {
        return Err(validation_err(
            format!("{path}.max_hp"),
            "expected a positive value",
        ));
    }
    if combatant.hp == 0 {
        return Err(validation_err(
            format!("{path}.hp"),
            "expected a positive value",
        ));
    }
    for (index, action) in combatant.actions.iter().enumerate() {
        if !world.actions.contains_key(action) {
            return Err(validation_err(
                format!("{path}.actions[{index}]"),
                format!("unknown action '{action}'"),
            ));
        }
    }
    Ok(())
}

fn validate_map(world: &WorldContent, id: &str, map: &MapDef) -> Result<(), ContentError> {
    let players = map
        .objects
        .iter()
        .filter(|object| object.player_controlled)
        .count();
    if players != 1 {
        return Err(validation_err(
            format!("maps.{id}.objects"),
            format!("expected exactly 1 player_controlled object, got {players}"),
        ));
    }

    let mut seen = HashSet::new();
    for (index, object) in map.objects.iter().enumerate() {
        let object_path = format!("maps.{id}.objects[{index}]");
        if !seen.insert(object.id.as_str()) {
            return Err(validation_err(
                format!("{object_path}.id"),
                format!("duplicate object id '{}'", object.id),
            ));
        }
        if let ObjectKind::PizzaStone { story_flag, .. } = &object.kind {
            if story_flag.is_empty() {
                return Err(validation_err(
                    format!("{object_path}.kind.pizza_stone.story_flag"),
                    "expected a story flag",
                ));
            }
            if object.player_controlled || !object.talking.is_empty() {
                return Err(validation_err(
                    object_path,
                    "a pizza stone is neither player controlled nor given talking scenarios",
                ));
            }
        }
        validate_scenarios(
            world,
            &format!("{object_path}.talking"),
            &object.talking,
        )?;
    }
    for (index, space) in map.cutscene_spaces.iter().enumerate() {
        validate_scenarios(
            world,
            &format!("maps.{id}.cutscene_spaces[{index}].scenarios"),
            &space.scenarios,
        )?;
    }
    Ok(())
}

fn validate_scenarios(
    world: &WorldContent,
    path: &str,
    scenarios: &[Scenario],
) -> Result<(), ContentError> {
    for (scenario_index, scenario) in scenarios.iter().enumerate() {
        for (event_index, event) in scenario.events.iter().enumerate() {
            let event_path = format!("{path}[{scenario_index}].events[{event_index}]");
            match event {
                CutsceneEvent::Battle { enemy_id } if !world.enemies.contains_key(enemy_id) => {
                    return Err(validation_err(
                        format!("{event_path}.enemy_id"),
                        format!("unknown enemy '{enemy_id}'"),
                    ));
                }
                CutsceneEvent::ChangeMap { map, .. } if !world.maps.contains_key(map) => {
                    return Err(validation_err(
                        format!("{event_path}.map"),
                        format!("unknown map '{map}'"),
                    ));
                }
                _ => {}
            }
        }
    }
    Ok(())
}
