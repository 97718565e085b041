use std::collections::HashMap;

use tracing::warn;

use crate::battle::{AnimationCue, FirstActionPolicy, Submission, SubmissionRequest};
use crate::event::{completion, Abandoned, Completion};

/// Shows a message and calls `on_complete` once it is dismissed.
pub trait MessageBox {
    fn open(&mut self, text: String, on_complete: Completion<()>);
}

/// Asks the player for a battle submission.
pub trait SubmissionMenu {
    fn open(&mut self, request: SubmissionRequest, on_complete: Completion<Submission>);
}

/// Offers pizzas to craft and completes with the chosen one, or `None`.
pub trait CraftingMenu {
    fn open(&mut self, pizzas: Vec<String>, on_complete: Completion<Option<String>>);
}

/// Crafting menu of a host without one: nothing gets crafted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrafting;

impl CraftingMenu for NoCrafting {
    fn open(&mut self, _pizzas: Vec<String>, on_complete: Completion<Option<String>>) {
        on_complete.complete(None);
    }
}

/// Non-player side of a battle.
pub trait DecisionPolicy {
    fn decide(&mut self, request: &SubmissionRequest) -> Submission;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayer {
    Lower,
    Upper,
}

pub trait MapSurface {
    fn draw_image(&mut self, layer: MapLayer, src: &str, x: i32, y: i32);
}

pub type AnimationFn = Box<dyn FnMut(&AnimationCue, Completion<()>)>;

/// Named battle animations.
#[derive(Default)]
pub struct AnimationTable {
    entries: HashMap<String, AnimationFn>,
}

impl AnimationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        animation: impl FnMut(&AnimationCue, Completion<()>) + 'static,
    ) {
        self.entries.insert(name.into(), Box::new(animation));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names = self.entries.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Plays `cue`. Unknown names resolve immediately.
    pub fn play(&mut self, cue: &AnimationCue, on_complete: Completion<()>) {
        match self.entries.get_mut(&cue.animation) {
            Some(animation) => animation(cue, on_complete),
            None => {
                warn!(animation = %cue.animation, "animation_unknown");
                on_complete.done();
            }
        }
    }
}

/// The external collaborators a session talks to.
pub struct Hosts {
    pub messages: Box<dyn MessageBox>,
    pub menu: Box<dyn SubmissionMenu>,
    pub policy: Box<dyn DecisionPolicy>,
    pub crafting: Box<dyn CraftingMenu>,
    pub animations: AnimationTable,
}

impl Hosts {
    pub fn new(messages: impl MessageBox + 'static, menu: impl SubmissionMenu + 'static) -> Self {
        Self {
            messages: Box::new(messages),
            menu: Box::new(menu),
            policy: Box::new(FirstActionPolicy),
            crafting: Box::new(NoCrafting),
            animations: AnimationTable::new(),
        }
    }

    pub fn with_policy(mut self, policy: impl DecisionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn with_crafting(mut self, crafting: impl CraftingMenu + 'static) -> Self {
        self.crafting = Box::new(crafting);
        self
    }

    pub fn with_animations(mut self, animations: AnimationTable) -> Self {
        self.animations = animations;
        self
    }

    pub async fn show_message(&mut self, text: String) {
        let (on_complete, pending) = completion();
        self.messages.open(text, on_complete);
        if pending.wait().await.is_err() {
            warn!("message_box_abandoned");
        }
    }

    pub async fn play_animation(&mut self, cue: &AnimationCue) {
        let (on_complete, pending) = completion();
        self.animations.play(cue, on_complete);
        if pending.wait().await.is_err() {
            warn!(animation = %cue.animation, "animation_abandoned");
        }
    }

    pub async fn choose_pizza(&mut self, pizzas: Vec<String>) -> Option<String> {
        let (on_complete, pending) = completion();
        self.crafting.open(pizzas, on_complete);
        pending.wait().await.unwrap_or_else(|_| {
            warn!("crafting_menu_abandoned");
            None
        })
    }

    pub async fn request_submission(
        &mut self,
        request: SubmissionRequest,
    ) -> Result<Submission, Abandoned> {
        let (on_complete, pending) = completion();
        self.menu.open(request, on_complete);
        pending.wait().await
    }
}
