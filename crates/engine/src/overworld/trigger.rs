use tracing::debug;

use super::entity::{EntityId, Scenario};
use super::map::{MapState, OverworldMap};
use crate::event::CutsceneEvent;
use crate::flags::StoryFlags;

/// A cutscene picked by the evaluator, plus the entity it came from if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredCutscene {
    pub source: Option<EntityId>,
    pub events: Vec<CutsceneEvent>,
}

/// Talking scenario of the entity in front of `actor`. Scripts are tried in
/// declaration order; the first whose required flags are all set wins.
pub fn evaluate_action(
    map: &OverworldMap,
    flags: &StoryFlags,
    actor: EntityId,
) -> Option<TriggeredCutscene> {
    if map.state() != MapState::Idle {
        return None;
    }
    let actor = map.entity(actor)?;
    let ahead = actor.position.neighbor(actor.direction);
    let target = map.entities().at(ahead)?;
    let scenario = first_satisfied(&target.talking, flags)?;
    debug!(map = %map.id(), entity = %target.key, "action_trigger_matched");
    Some(TriggeredCutscene {
        source: Some(target.id),
        events: scenario.events.clone(),
    })
}

/// Cutscene space under `actor`. Footstep spaces are not flag gated.
pub fn evaluate_footstep(map: &OverworldMap, actor: EntityId) -> Option<TriggeredCutscene> {
    if map.state() != MapState::Idle {
        return None;
    }
    let actor = map.entity(actor)?;
    let scenario = map.scenarios_at(actor.position)?.first()?;
    debug!(
        map = %map.id(),
        x = actor.position.x,
        y = actor.position.y,
        "footstep_trigger_matched"
    );
    Some(TriggeredCutscene {
        source: None,
        events: scenario.events.clone(),
    })
}

fn first_satisfied<'a>(scenarios: &'a [Scenario], flags: &StoryFlags) -> Option<&'a Scenario> {
    scenarios
        .iter()
        .find(|scenario| flags.satisfies(scenario.required.as_slice()))
}
