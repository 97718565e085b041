use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::action::Action;
use super::combatant::{Combatant, CombatantDef, CombatantId, Status, StatusKind, Team};
use super::event::{AnimationCue, BattleEvent, StatusChange};
use super::submission::{
    ActionChoice, FirstActionPolicy, Submission, SubmissionError, SubmissionRequest,
};
use crate::config::EngineConfig;
use crate::event::{interpolate, EventResolution, MessageBindings};
use crate::host::{DecisionPolicy, Hosts};

/// hp a saucy combatant recovers after each of its turns.
pub const SAUCY_RECOVER: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Won,
    Lost,
    Fled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    AwaitingSubmission,
    Resolving,
    Animating,
    CheckOutcome,
    Finished(BattleOutcome),
}

/// Names the placeholders of the event being resolved refer to.
#[derive(Debug, Clone, Copy)]
struct TurnContext<'a> {
    caster: CombatantId,
    target: Option<CombatantId>,
    action: Option<&'a Action>,
}

/// One battle between the party and an enemy. Teams alternate turns,
/// player first, until one side is down or someone flees.
#[derive(Debug)]
pub struct Battle<'a> {
    config: &'a EngineConfig,
    actions: &'a HashMap<String, Action>,
    combatants: Vec<Combatant>,
    active: Team,
    phase: BattlePhase,
    phase_log: Vec<BattlePhase>,
}

impl<'a> Battle<'a> {
    pub fn new(
        config: &'a EngineConfig,
        actions: &'a HashMap<String, Action>,
        player: &CombatantDef,
        enemy: &CombatantDef,
    ) -> Self {
        Self {
            config,
            actions,
            combatants: vec![
                Combatant::from_def(CombatantId(0), Team::Player, player),
                Combatant::from_def(CombatantId(1), Team::Enemy, enemy),
            ],
            active: Team::Player,
            phase: BattlePhase::AwaitingSubmission,
            phase_log: Vec::new(),
        }
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(id.0)
    }

    pub fn side(&self, team: Team) -> Option<&Combatant> {
        self.combatants
            .iter()
            .find(|combatant| combatant.team == team)
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn phase_log(&self) -> &[BattlePhase] {
        &self.phase_log
    }

    pub async fn run(&mut self, hosts: &mut Hosts) -> BattleOutcome {
        let enemy_name = self
            .side(Team::Enemy)
            .map(|enemy| enemy.name.clone())
            .unwrap_or_default();
        info!(
            enemy = %enemy_name,
            combatant_count = self.combatants.len(),
            "battle_started"
        );
        hosts
            .show_message(format!("{enemy_name} wants to battle!"))
            .await;

        let outcome = loop {
            // A side already at 0 hp decides the battle before anyone acts.
            if let Some(outcome) = self.check_outcome() {
                self.set_phase(BattlePhase::CheckOutcome);
                break outcome;
            }
            if let Some(outcome) = self.play_turn(hosts).await {
                break outcome;
            }
            self.active = self.active.opponent();
        };

        self.set_phase(BattlePhase::Finished(outcome));
        let closing = match outcome {
            BattleOutcome::Won => "You won the battle!".to_string(),
            BattleOutcome::Lost => "You lost the battle...".to_string(),
            BattleOutcome::Fled => "Got away safely.".to_string(),
        };
        hosts.show_message(closing).await;
        info!(enemy = %enemy_name, outcome = ?outcome, "battle_finished");
        outcome
    }

    async fn play_turn(&mut self, hosts: &mut Hosts) -> Option<BattleOutcome> {
        let (Some(caster), Some(enemy)) = (
            self.side(self.active).map(|c| c.id),
            self.side(self.active.opponent()).map(|c| c.id),
        ) else {
            warn!(team = ?self.active, "battle_side_missing");
            return Some(BattleOutcome::Fled);
        };

        self.set_phase(BattlePhase::AwaitingSubmission);
        let request = BattleEvent::SubmissionMenu { caster, enemy };
        let context = TurnContext {
            caster,
            target: Some(enemy),
            action: None,
        };
        let submission = match self.dispatch(hosts, &request, context).await {
            EventResolution::Submitted(submission) => submission,
            _ => Submission::Flee,
        };
        let Submission::Use { action, target } = submission else {
            info!(caster = ?caster, "battle_fled");
            return Some(BattleOutcome::Fled);
        };
        let actions = self.actions;
        let Some(action) = actions.get(&action) else {
            return None;
        };

        self.set_phase(BattlePhase::Resolving);
        let context = TurnContext {
            caster,
            target: Some(target),
            action: Some(action),
        };
        for event in &action.success {
            self.dispatch(hosts, event, context).await;
        }

        self.set_phase(BattlePhase::CheckOutcome);
        if let Some(outcome) = self.check_outcome() {
            return Some(outcome);
        }
        self.end_turn(hosts, caster).await;
        None
    }

    /// Saucy recovery, then one tick of status expiry for the caster.
    async fn end_turn(&mut self, hosts: &mut Hosts, caster: CombatantId) {
        let Some(status) = self.combatant(caster).and_then(|c| c.status) else {
            return;
        };
        let context = TurnContext {
            caster,
            target: Some(caster),
            action: None,
        };
        if status.kind == StatusKind::Saucy {
            let events = [
                BattleEvent::TextMessage {
                    text: "Feeling saucy!".to_string(),
                },
                BattleEvent::StateChange {
                    damage: None,
                    recover: Some(SAUCY_RECOVER),
                    status: StatusChange::Unchanged,
                    on_caster: true,
                },
            ];
            for event in &events {
                self.dispatch(hosts, event, context).await;
            }
        }

        let expired = self.tick_status(caster);
        if let Some(expired) = expired {
            let event = BattleEvent::TextMessage {
                text: format!("{{CASTER}} is no longer {}.", expired.kind.as_str()),
            };
            self.dispatch(hosts, &event, context).await;
        }
    }

    fn tick_status(&mut self, id: CombatantId) -> Option<Status> {
        let combatant = self.combatants.get_mut(id.0)?;
        let status = combatant.status.as_mut()?;
        status.expires_in = status.expires_in.saturating_sub(1);
        if status.expires_in > 0 {
            return None;
        }
        let expired = *status;
        combatant.status = None;
        debug!(combatant = %combatant.name, status = expired.kind.as_str(), "status_expired");
        Some(expired)
    }

    fn check_outcome(&self) -> Option<BattleOutcome> {
        let down = |team: Team| {
            self.combatants
                .iter()
                .any(|combatant| combatant.team == team && combatant.is_down())
        };
        if down(Team::Player) {
            Some(BattleOutcome::Lost)
        } else if down(Team::Enemy) {
            Some(BattleOutcome::Won)
        } else {
            None
        }
    }

    async fn dispatch(
        &mut self,
        hosts: &mut Hosts,
        event: &BattleEvent,
        context: TurnContext<'_>,
    ) -> EventResolution {
        match event {
            BattleEvent::TextMessage { text } => {
                let text = interpolate(text, self.bindings(context));
                hosts.show_message(text).await;
                EventResolution::Completed
            }
            BattleEvent::StateChange {
                damage,
                recover,
                status,
                on_caster,
            } => {
                let friendly = context.action.is_some_and(Action::is_friendly);
                let who = match context.target {
                    Some(target) if !*on_caster && !friendly => target,
                    _ => context.caster,
                };
                self.apply_state_change(who, *damage, *recover, *status);

                self.set_phase(BattlePhase::Animating);
                tokio::time::sleep(self.config.damage_blink).await;
                for combatant in &mut self.combatants {
                    combatant.blinking = false;
                }
                self.set_phase(BattlePhase::Resolving);
                EventResolution::Completed
            }
            BattleEvent::SubmissionMenu { caster, enemy } => {
                EventResolution::Submitted(self.collect_submission(hosts, *caster, *enemy).await)
            }
            BattleEvent::Animation { animation } => {
                let bindings = self.bindings(context);
                let Some(caster) = self.combatant(context.caster) else {
                    return EventResolution::Completed;
                };
                let cue = AnimationCue {
                    animation: animation.clone(),
                    caster: caster.name.clone(),
                    caster_team: caster.team,
                    target: bindings.target.unwrap_or_default().to_string(),
                };
                self.set_phase(BattlePhase::Animating);
                hosts.play_animation(&cue).await;
                self.set_phase(BattlePhase::Resolving);
                EventResolution::Completed
            }
        }
    }

    fn apply_state_change(
        &mut self,
        who: CombatantId,
        damage: Option<u32>,
        recover: Option<u32>,
        status: StatusChange,
    ) {
        let Some(combatant) = self.combatants.get_mut(who.0) else {
            warn!(combatant = ?who, "state_change_target_missing");
            return;
        };
        if let Some(damage) = damage.filter(|damage| *damage > 0) {
            combatant.take_damage(damage);
            combatant.blinking = true;
        }
        if let Some(recover) = recover.filter(|recover| *recover > 0) {
            combatant.recover(recover);
        }
        match status {
            StatusChange::Unchanged => {}
            StatusChange::Clear => combatant.status = None,
            StatusChange::Set(status) => combatant.status = Some(status),
        }
        info!(
            combatant = %combatant.name,
            hp = combatant.hp,
            max_hp = combatant.max_hp,
            status = combatant.status.map(|s| s.kind.as_str()).unwrap_or("none"),
            "state_changed"
        );
    }

    /// Solicits until a submission validates. A menu that drops its
    /// completion flees; an invalid policy answer falls back to the first
    /// known action.
    async fn collect_submission(
        &mut self,
        hosts: &mut Hosts,
        caster: CombatantId,
        enemy: CombatantId,
    ) -> Submission {
        let Some(team) = self.combatant(caster).map(|c| c.team) else {
            return Submission::Flee;
        };
        loop {
            let request = self.submission_request(caster, enemy);
            let submission = match team {
                Team::Player => match hosts.request_submission(request.clone()).await {
                    Ok(submission) => submission,
                    Err(error) => {
                        warn!(caster = ?caster, error = %error, "submission_abandoned");
                        return Submission::Flee;
                    }
                },
                Team::Enemy => hosts.policy.decide(&request),
            };

            let Err(error) = self.validate(caster, &submission) else {
                return submission;
            };
            warn!(caster = ?caster, error = %error, "submission_rejected");
            if team == Team::Enemy {
                let fallback = FirstActionPolicy.decide(&request);
                return match self.validate(caster, &fallback) {
                    Ok(()) => fallback,
                    Err(_) => Submission::Flee,
                };
            }
        }
    }

    fn submission_request(&self, caster: CombatantId, enemy: CombatantId) -> SubmissionRequest {
        let name = |id: CombatantId| {
            self.combatant(id)
                .map(|c| c.name.clone())
                .unwrap_or_default()
        };
        let actions = self
            .combatant(caster)
            .map(|c| c.actions.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|key| {
                self.actions.get(key).map(|action| ActionChoice {
                    key: key.clone(),
                    name: action.name.clone(),
                    description: action.description.clone(),
                    target_type: action.target_type,
                })
            })
            .collect();
        SubmissionRequest {
            caster,
            caster_name: name(caster),
            enemy,
            enemy_name: name(enemy),
            actions,
        }
    }

    pub fn validate(
        &self,
        caster: CombatantId,
        submission: &Submission,
    ) -> Result<(), SubmissionError> {
        let Submission::Use { action, target } = submission else {
            return Ok(());
        };
        if !self.actions.contains_key(action) {
            return Err(SubmissionError::UnknownAction {
                action: action.clone(),
            });
        }
        if let Some(caster) = self.combatant(caster) {
            if !caster.knows(action) {
                return Err(SubmissionError::NotKnownByCaster {
                    caster: caster.name.clone(),
                    action: action.clone(),
                });
            }
        }
        let Some(target) = self.combatant(*target) else {
            return Err(SubmissionError::UnknownTarget { target: *target });
        };
        if target.is_down() {
            return Err(SubmissionError::TargetDown {
                target: target.name.clone(),
            });
        }
        Ok(())
    }

    fn bindings<'b>(&'b self, context: TurnContext<'b>) -> MessageBindings<'b> {
        MessageBindings {
            caster: self.combatant(context.caster).map(|c| c.name.as_str()),
            target: context
                .target
                .and_then(|id| self.combatant(id))
                .map(|c| c.name.as_str()),
            action: context.action.map(|action| action.name.as_str()),
        }
    }

    fn set_phase(&mut self, phase: BattlePhase) {
        debug!(phase = ?phase, team = ?self.active, "battle_phase");
        self.phase = phase;
        self.phase_log.push(phase);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::battle::TargetType;
    use crate::host::fakes::{RecordingMessages, ScriptedMenu, ScriptedPolicy};

    fn fighter(name: &str, hp: u32, max_hp: u32, actions: &[&str]) -> CombatantDef {
        CombatantDef {
            name: name.to_string(),
            hp,
            max_hp,
            status: None,
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn action(name: &str, target_type: TargetType, success: Vec<BattleEvent>) -> Action {
        Action {
            name: name.to_string(),
            description: String::new(),
            target_type,
            success,
        }
    }

    fn state_change(damage: Option<u32>, recover: Option<u32>) -> BattleEvent {
        BattleEvent::StateChange {
            damage,
            recover,
            status: StatusChange::Unchanged,
            on_caster: false,
        }
    }

    fn action_table() -> HashMap<String, Action> {
        HashMap::from([
            (
                "damage1".to_string(),
                action(
                    "Whomp!",
                    TargetType::Enemy,
                    vec![
                        BattleEvent::TextMessage {
                            text: "{CASTER} uses {ACTION} on {TARGET}!".to_string(),
                        },
                        state_change(Some(10), None),
                    ],
                ),
            ),
            (
                "recover5".to_string(),
                action(
                    "Tomato Squeeze",
                    TargetType::Friendly,
                    vec![state_change(None, Some(5))],
                ),
            ),
            (
                "smash".to_string(),
                action("Smash", TargetType::Enemy, vec![state_change(Some(99), None)]),
            ),
        ])
    }

    fn use_on(action: &str, target: usize) -> Submission {
        Submission::Use {
            action: action.to_string(),
            target: CombatantId(target),
        }
    }

    fn hosts(menu: ScriptedMenu, policy: ScriptedPolicy) -> (Hosts, RecordingMessages) {
        let messages = RecordingMessages::default();
        let hosts = Hosts::new(messages.clone(), menu).with_policy(policy);
        (hosts, messages)
    }

    #[tokio::test(start_paused = true)]
    async fn damage_of_ten_leaves_thirty_hp_enemy_at_twenty_and_battle_continues() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, messages) = hosts(
            ScriptedMenu::answering([use_on("damage1", 1)]),
            ScriptedPolicy::default(),
        );

        let outcome = battle.play_turn(&mut hosts).await;

        assert_eq!(outcome, None);
        let beth = battle.combatant(CombatantId(1)).expect("beth");
        assert_eq!(beth.hp, 20);
        assert_eq!(beth.status, None);
        assert!(!beth.blinking);
        assert_eq!(messages.texts(), vec!["Slice uses Whomp! on Beth!".to_string()]);
        assert_eq!(
            battle.phase_log(),
            &[
                BattlePhase::AwaitingSubmission,
                BattlePhase::Resolving,
                BattlePhase::Animating,
                BattlePhase::Resolving,
                BattlePhase::CheckOutcome,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn friendly_recover_heals_the_caster_up_to_max() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 25, 30, &["recover5"]);
        let enemy = fighter("Beth", 12, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        // Aimed at the enemy on purpose; friendly actions land on the caster.
        let (mut hosts, _) = hosts(
            ScriptedMenu::answering([use_on("recover5", 1)]),
            ScriptedPolicy::default(),
        );

        battle.play_turn(&mut hosts).await;

        assert_eq!(battle.combatant(CombatantId(0)).expect("slice").hp, 30);
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").hp, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn knockout_ends_the_battle_without_another_submission() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["smash"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let policy = ScriptedPolicy::default();
        let (mut hosts, messages) = hosts(
            ScriptedMenu::answering([use_on("smash", 1)]),
            policy.clone(),
        );

        let outcome = battle.run(&mut hosts).await;

        assert_eq!(outcome, BattleOutcome::Won);
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").hp, 0);
        assert_eq!(*policy.asked.borrow(), 0);
        let log = battle.phase_log();
        let last_check = log
            .iter()
            .rposition(|phase| *phase == BattlePhase::CheckOutcome)
            .expect("check outcome");
        assert!(!log[last_check..].contains(&BattlePhase::AwaitingSubmission));
        assert_eq!(log.last(), Some(&BattlePhase::Finished(BattleOutcome::Won)));
        assert_eq!(
            messages.texts().last().map(String::as_str),
            Some("You won the battle!")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn enemy_already_down_is_won_without_a_turn() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 0, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let menu = ScriptedMenu::answering(std::iter::repeat(use_on("damage1", 1)).take(5));
        let policy = ScriptedPolicy::default();
        let (mut hosts, messages) = hosts(menu.clone(), policy.clone());

        assert_eq!(battle.run(&mut hosts).await, BattleOutcome::Won);
        assert_eq!(menu.request_count(), 0);
        assert_eq!(*policy.asked.borrow(), 0);
        assert_eq!(
            battle.phase_log(),
            &[
                BattlePhase::CheckOutcome,
                BattlePhase::Finished(BattleOutcome::Won)
            ]
        );
        assert_eq!(
            messages.texts(),
            vec![
                "Beth wants to battle!".to_string(),
                "You won the battle!".to_string()
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn party_already_down_is_lost_without_a_turn() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 0, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let menu = ScriptedMenu::answering([use_on("damage1", 1)]);
        let (mut hosts, _) = hosts(menu.clone(), ScriptedPolicy::default());

        assert_eq!(battle.run(&mut hosts).await, BattleOutcome::Lost);
        assert_eq!(menu.request_count(), 0);
        assert!(!battle
            .phase_log()
            .contains(&BattlePhase::AwaitingSubmission));
    }

    #[tokio::test(start_paused = true)]
    async fn losing_the_party_ends_in_lost() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 10, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["smash"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, _) = hosts(
            ScriptedMenu::answering([use_on("damage1", 1)]),
            ScriptedPolicy::default(),
        );

        assert_eq!(battle.run(&mut hosts).await, BattleOutcome::Lost);
        assert_eq!(battle.combatant(CombatantId(0)).expect("slice").hp, 0);
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").hp, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_player_submissions_are_reprompted() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let menu = ScriptedMenu::answering([
            use_on("laser", 1),
            use_on("smash", 1),
            use_on("damage1", 7),
            use_on("damage1", 1),
        ]);
        let (mut hosts, _) = hosts(menu.clone(), ScriptedPolicy::default());

        battle.play_turn(&mut hosts).await;

        assert_eq!(menu.request_count(), 4);
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").hp, 20);
        assert_eq!(battle.combatant(CombatantId(0)).expect("slice").hp, 30);
    }

    #[test]
    fn validation_names_each_rejection() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 0, 30, &["damage1"]);
        let battle = Battle::new(&config, &actions, &player, &enemy);
        let caster = CombatantId(0);

        assert_eq!(
            battle.validate(caster, &use_on("laser", 1)),
            Err(SubmissionError::UnknownAction {
                action: "laser".to_string()
            })
        );
        assert_eq!(
            battle.validate(caster, &use_on("smash", 1)),
            Err(SubmissionError::NotKnownByCaster {
                caster: "Slice".to_string(),
                action: "smash".to_string()
            })
        );
        assert_eq!(
            battle.validate(caster, &use_on("damage1", 9)),
            Err(SubmissionError::UnknownTarget {
                target: CombatantId(9)
            })
        );
        assert_eq!(
            battle.validate(caster, &use_on("damage1", 1)),
            Err(SubmissionError::TargetDown {
                target: "Beth".to_string()
            })
        );
        assert_eq!(battle.validate(caster, &Submission::Flee), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_policy_answer_falls_back_to_first_action() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, _) = hosts(
            ScriptedMenu::default(),
            ScriptedPolicy::answering([use_on("smash", 0)]),
        );
        battle.active = Team::Enemy;

        battle.play_turn(&mut hosts).await;

        assert_eq!(battle.combatant(CombatantId(0)).expect("slice").hp, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn fleeing_ends_the_battle() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, _) = hosts(
            ScriptedMenu::answering([Submission::Flee]),
            ScriptedPolicy::default(),
        );

        assert_eq!(battle.run(&mut hosts).await, BattleOutcome::Fled);
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").hp, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_menu_flees() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, _) = hosts(ScriptedMenu::default(), ScriptedPolicy::default());

        assert_eq!(battle.run(&mut hosts).await, BattleOutcome::Fled);
    }

    #[tokio::test(start_paused = true)]
    async fn state_change_holds_for_the_damage_blink() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, _) = hosts(ScriptedMenu::default(), ScriptedPolicy::default());
        let event = state_change(Some(10), None);
        let context = TurnContext {
            caster: CombatantId(0),
            target: Some(CombatantId(1)),
            action: actions.get("damage1"),
        };

        let early = tokio::time::timeout(
            Duration::from_millis(599),
            battle.dispatch(&mut hosts, &event, context),
        )
        .await;
        assert!(early.is_err(), "state change resolved before the blink");

        let started = Instant::now();
        battle.dispatch(&mut hosts, &event, context).await;
        assert!(started.elapsed() >= Duration::from_millis(600));
        // The timed-out first dispatch had already applied its damage.
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").hp, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn status_assignment_and_clearing_are_distinct() {
        let config = EngineConfig::default();
        let actions = action_table();
        let player = fighter("Slice", 30, 30, &["damage1"]);
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, _) = hosts(ScriptedMenu::default(), ScriptedPolicy::default());
        let context = TurnContext {
            caster: CombatantId(0),
            target: Some(CombatantId(1)),
            action: None,
        };
        let clumsy = Status {
            kind: StatusKind::Clumsy,
            expires_in: 3,
        };
        let with_status = |status| BattleEvent::StateChange {
            damage: None,
            recover: None,
            status,
            on_caster: false,
        };

        battle
            .dispatch(&mut hosts, &with_status(StatusChange::Set(clumsy)), context)
            .await;
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").status, Some(clumsy));

        battle
            .dispatch(&mut hosts, &with_status(StatusChange::Unchanged), context)
            .await;
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").status, Some(clumsy));

        battle
            .dispatch(&mut hosts, &with_status(StatusChange::Clear), context)
            .await;
        assert_eq!(battle.combatant(CombatantId(1)).expect("beth").status, None);
    }

    #[tokio::test(start_paused = true)]
    async fn saucy_caster_recovers_and_status_expires() {
        let config = EngineConfig::default();
        let actions = action_table();
        let mut player = fighter("Slice", 20, 30, &["damage1"]);
        player.status = Some(Status {
            kind: StatusKind::Saucy,
            expires_in: 1,
        });
        let enemy = fighter("Beth", 30, 30, &["damage1"]);
        let mut battle = Battle::new(&config, &actions, &player, &enemy);
        let (mut hosts, messages) = hosts(
            ScriptedMenu::answering([use_on("damage1", 1)]),
            ScriptedPolicy::default(),
        );

        battle.play_turn(&mut hosts).await;

        let slice = battle.combatant(CombatantId(0)).expect("slice");
        assert_eq!(slice.hp, 25);
        assert_eq!(slice.status, None);
        let texts = messages.texts();
        assert!(texts.contains(&"Feeling saucy!".to_string()), "{texts:?}");
        assert!(texts.contains(&"Slice is no longer saucy.".to_string()), "{texts:?}");
    }
}
