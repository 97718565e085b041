use serde::Deserialize;

use super::event::BattleEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Enemy,
    Friendly,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_type: TargetType,
    pub success: Vec<BattleEvent>,
}

impl Action {
    pub fn is_friendly(&self) -> bool {
        self.target_type == TargetType::Friendly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_type_defaults_to_enemy() {
        let action: Action = serde_json::from_str(
            r#"{
                "name": "Whomp!",
                "success": [
                    {"type": "text_message", "text": "{CASTER} uses {ACTION}!"},
                    {"type": "animation", "animation": "spin"},
                    {"type": "state_change", "damage": 10}
                ]
            }"#,
        )
        .expect("action");
        assert_eq!(action.target_type, TargetType::Enemy);
        assert!(!action.is_friendly());
        assert_eq!(action.success.len(), 3);
        assert_eq!(action.description, "");
    }

    #[test]
    fn friendly_actions_parse() {
        let action: Action = serde_json::from_str(
            r#"{"name": "Tomato Squeeze", "description": "Recover hp", "target_type": "friendly",
                "success": [{"type": "state_change", "recover": 5}]}"#,
        )
        .expect("action");
        assert!(action.is_friendly());
    }
}
