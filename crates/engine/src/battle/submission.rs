use thiserror::Error;

use super::action::TargetType;
use super::combatant::CombatantId;
use crate::host::DecisionPolicy;

/// One side's choice for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Use { action: String, target: CombatantId },
    Flee,
}

/// Action offered to the side being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionChoice {
    pub key: String,
    pub name: String,
    pub description: String,
    pub target_type: TargetType,
}

/// Everything a menu or a policy needs to produce a [`Submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub caster: CombatantId,
    pub caster_name: String,
    pub enemy: CombatantId,
    pub enemy_name: String,
    pub actions: Vec<ActionChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("unknown action '{action}'")]
    UnknownAction { action: String },
    #[error("{caster} does not know action '{action}'")]
    NotKnownByCaster { caster: String, action: String },
    #[error("unknown target {target:?}")]
    UnknownTarget { target: CombatantId },
    #[error("target {target} is already down")]
    TargetDown { target: String },
}

/// Picks the first known action: friendly ones on itself, others on the enemy.
/// Flees when it knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstActionPolicy;

impl DecisionPolicy for FirstActionPolicy {
    fn decide(&mut self, request: &SubmissionRequest) -> Submission {
        let Some(choice) = request.actions.first() else {
            return Submission::Flee;
        };
        let target = match choice.target_type {
            TargetType::Friendly => request.caster,
            TargetType::Enemy => request.enemy,
        };
        Submission::Use {
            action: choice.key.clone(),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(actions: Vec<ActionChoice>) -> SubmissionRequest {
        SubmissionRequest {
            caster: CombatantId(1),
            caster_name: "Beth".to_string(),
            enemy: CombatantId(0),
            enemy_name: "Slice".to_string(),
            actions,
        }
    }

    fn choice(key: &str, target_type: TargetType) -> ActionChoice {
        ActionChoice {
            key: key.to_string(),
            name: key.to_string(),
            description: String::new(),
            target_type,
        }
    }

    #[test]
    fn first_action_policy_aims_hostile_actions_at_the_enemy() {
        let submission = FirstActionPolicy.decide(&request(vec![
            choice("damage1", TargetType::Enemy),
            choice("recover1", TargetType::Friendly),
        ]));
        assert_eq!(
            submission,
            Submission::Use {
                action: "damage1".to_string(),
                target: CombatantId(0)
            }
        );
    }

    #[test]
    fn first_action_policy_aims_friendly_actions_at_itself() {
        let submission =
            FirstActionPolicy.decide(&request(vec![choice("recover1", TargetType::Friendly)]));
        assert_eq!(
            submission,
            Submission::Use {
                action: "recover1".to_string(),
                target: CombatantId(1)
            }
        );
    }

    #[test]
    fn first_action_policy_flees_without_actions() {
        assert_eq!(FirstActionPolicy.decide(&request(Vec::new())), Submission::Flee);
    }
}
