mod action;
mod combatant;
mod event;
mod submission;
mod turn;

pub use action::{Action, TargetType};
pub use combatant::{Combatant, CombatantDef, CombatantId, Status, StatusKind, Team};
pub use event::{AnimationCue, BattleEvent, BattleEventKind, StatusChange};
pub use submission::{
    ActionChoice, FirstActionPolicy, Submission, SubmissionError, SubmissionRequest,
};
pub use turn::{Battle, BattleOutcome, BattlePhase, SAUCY_RECOVER};
