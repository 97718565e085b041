mod completion;
mod text;

pub use completion::{completion, Abandoned, Completion, Pending};
pub use text::{interpolate, MessageBindings, ACTION_TOKEN, CASTER_TOKEN, TARGET_TOKEN};

use serde::Deserialize;

use crate::battle::{BattleOutcome, Submission};
use crate::overworld::Direction;

/// Overworld events a cutscene is made of. Tags are closed: content with any
/// other `type` fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CutsceneEvent {
    TextMessage {
        text: String,
        #[serde(default)]
        face_hero: Option<String>,
    },
    Stand {
        who: String,
        direction: Direction,
        time_ms: u64,
    },
    Walk {
        who: String,
        direction: Direction,
    },
    ChangeMap {
        map: String,
        x: i32,
        y: i32,
        direction: Direction,
    },
    AddStoryFlag {
        flag: String,
    },
    Battle {
        enemy_id: String,
    },
    /// Offers `pizzas` to craft; the choice joins the party's lineup.
    CraftingMenu {
        pizzas: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutsceneEventKind {
    TextMessage,
    Stand,
    Walk,
    ChangeMap,
    AddStoryFlag,
    Battle,
    CraftingMenu,
}

impl CutsceneEvent {
    pub fn kind(&self) -> CutsceneEventKind {
        match self {
            Self::TextMessage { .. } => CutsceneEventKind::TextMessage,
            Self::Stand { .. } => CutsceneEventKind::Stand,
            Self::Walk { .. } => CutsceneEventKind::Walk,
            Self::ChangeMap { .. } => CutsceneEventKind::ChangeMap,
            Self::AddStoryFlag { .. } => CutsceneEventKind::AddStoryFlag,
            Self::Battle { .. } => CutsceneEventKind::Battle,
            Self::CraftingMenu { .. } => CutsceneEventKind::CraftingMenu,
        }
    }
}

/// What an event handler resolved with. Only submission requests and battle
/// launches carry a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResolution {
    Completed,
    Submitted(Submission),
    BattleFinished(BattleOutcome),
}

impl EventResolution {
    pub fn is_battle_lost(&self) -> bool {
        matches!(self, Self::BattleFinished(BattleOutcome::Lost))
    }
}
