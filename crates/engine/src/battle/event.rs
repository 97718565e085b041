use serde::{Deserialize, Deserializer};

use super::combatant::{CombatantId, Status, Team};

/// Status effect of a state change. An explicit `null` clears the status,
/// an absent field leaves it alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusChange {
    #[default]
    Unchanged,
    Clear,
    Set(Status),
}

impl<'de> Deserialize<'de> for StatusChange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Status>::deserialize(deserializer)? {
            Some(status) => Self::Set(status),
            None => Self::Clear,
        })
    }
}

/// Events resolved inside a battle: action `success` lists plus the
/// submission request the loop issues itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    TextMessage {
        text: String,
    },
    StateChange {
        #[serde(default)]
        damage: Option<u32>,
        #[serde(default)]
        recover: Option<u32>,
        #[serde(default)]
        status: StatusChange,
        #[serde(default)]
        on_caster: bool,
    },
    SubmissionMenu {
        caster: CombatantId,
        enemy: CombatantId,
    },
    Animation {
        animation: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleEventKind {
    TextMessage,
    StateChange,
    SubmissionMenu,
    Animation,
}

impl BattleEvent {
    pub fn kind(&self) -> BattleEventKind {
        match self {
            Self::TextMessage { .. } => BattleEventKind::TextMessage,
            Self::StateChange { .. } => BattleEventKind::StateChange,
            Self::SubmissionMenu { .. } => BattleEventKind::SubmissionMenu,
            Self::Animation { .. } => BattleEventKind::Animation,
        }
    }
}

/// What an animation function is shown when it is played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationCue {
    pub animation: String,
    pub caster: String,
    pub caster_team: Team,
    pub target: String,
}
