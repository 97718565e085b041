pub const CASTER_TOKEN: &str = "{CASTER}";
pub const TARGET_TOKEN: &str = "{TARGET}";
pub const ACTION_TOKEN: &str = "{ACTION}";

/// Names bound to the three placeholders of a battle message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageBindings<'a> {
    pub caster: Option<&'a str>,
    pub target: Option<&'a str>,
    pub action: Option<&'a str>,
}

/// Substitutes the first occurrence of each placeholder. A token whose
/// referent is absent stays in the text untouched.
pub fn interpolate(text: &str, bindings: MessageBindings<'_>) -> String {
    let mut out = text.to_string();
    for (token, value) in [
        (CASTER_TOKEN, bindings.caster),
        (TARGET_TOKEN, bindings.target),
        (ACTION_TOKEN, bindings.action),
    ] {
        if let Some(value) = value {
            out = out.replacen(token, value, 1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_three_placeholders() {
        let text = interpolate(
            "{CASTER} uses {ACTION} on {TARGET}!",
            MessageBindings {
                caster: Some("Slice"),
                target: Some("Beth"),
                action: Some("Whomp"),
            },
        );
        assert_eq!(text, "Slice uses Whomp on Beth!");
    }

    #[test]
    fn missing_referent_leaves_token_in_place() {
        let text = interpolate(
            "{CASTER} glares at {TARGET}",
            MessageBindings {
                caster: Some("Slice"),
                ..MessageBindings::default()
            },
        );
        assert_eq!(text, "Slice glares at {TARGET}");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let text = interpolate(
            "{CASTER} and {CASTER}",
            MessageBindings {
                caster: Some("Slice"),
                ..MessageBindings::default()
            },
        );
        assert_eq!(text, "Slice and {CASTER}");
    }

    #[test]
    fn text_without_tokens_is_unchanged() {
        assert_eq!(
            interpolate("The battle is starting!", MessageBindings::default()),
            "The battle is starting!"
        );
    }
}
