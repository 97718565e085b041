use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

use crate::battle::{Action, BattleEvent, CombatantDef};
use crate::event::CutsceneEvent;
use crate::overworld::{BehaviorStep, Direction, GridCoord, Scenario};

/// Everything a session runs on, as read from one JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldContent {
    pub start_map: String,
    pub party: CombatantDef,
    #[serde(default)]
    pub actions: HashMap<String, Action>,
    #[serde(default)]
    pub enemies: HashMap<String, EnemyDef>,
    pub maps: HashMap<String, MapDef>,
}

impl WorldContent {
    /// Animation names the actions play, sorted.
    pub fn animation_names(&self) -> BTreeSet<&str> {
        self.actions
            .values()
            .flat_map(|action| action.success.iter())
            .filter_map(|event| match event {
                BattleEvent::Animation { animation } => Some(animation.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnemyDef {
    pub name: String,
    pub combatant: CombatantDef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MapDef {
    #[serde(default)]
    pub lower_src: Option<String>,
    #[serde(default)]
    pub upper_src: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    #[serde(default)]
    pub walls: Vec<GridCoord>,
    #[serde(default)]
    pub cutscene_spaces: Vec<CutsceneSpaceDef>,
}

/// What an object is. People talk through their own scenarios; a pizza
/// stone builds its scenarios from its flag and the pizzas it offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Person,
    PizzaStone {
        story_flag: String,
        #[serde(default)]
        pizzas: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectDef {
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub player_controlled: bool,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub behavior_loop: Vec<BehaviorStep>,
    #[serde(default)]
    pub talking: Vec<Scenario>,
}

impl ObjectDef {
    /// Talking scenarios the object mounts with. A pizza stone offers its
    /// pizzas once, then only reminds the player it was used.
    pub fn scenarios(&self) -> Vec<Scenario> {
        let ObjectKind::PizzaStone { story_flag, pizzas } = &self.kind else {
            return self.talking.clone();
        };
        let say = |text: &str| CutsceneEvent::TextMessage {
            text: text.to_string(),
            face_hero: None,
        };
        vec![
            Scenario {
                required: vec![story_flag.clone()],
                events: vec![say("You have already used this.")],
            },
            Scenario {
                required: Vec::new(),
                events: vec![
                    say("Approaching the legendary pizza stone..."),
                    CutsceneEvent::CraftingMenu {
                        pizzas: pizzas.clone(),
                    },
                    CutsceneEvent::AddStoryFlag {
                        flag: story_flag.clone(),
                    },
                ],
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CutsceneSpaceDef {
    pub x: i32,
    pub y: i32,
    pub scenarios: Vec<Scenario>,
}
