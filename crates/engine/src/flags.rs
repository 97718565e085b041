use std::collections::BTreeSet;

/// Session-wide story progress. Starts empty; passed explicitly to the trigger
/// evaluator and the flag-writing event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFlags {
    set: BTreeSet<String>,
}

impl StoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flag: impl Into<String>) -> bool {
        self.set.insert(flag.into())
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.set.contains(flag)
    }

    pub fn satisfies<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|flag| self.contains(flag.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.set.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_requirements_are_always_satisfied() {
        let flags = StoryFlags::new();
        assert!(flags.satisfies::<&str>(&[]));
    }

    #[test]
    fn every_required_flag_must_be_set() {
        let mut flags = StoryFlags::new();
        assert!(flags.insert("TALKED_TO_ERIO"));
        assert!(!flags.insert("TALKED_TO_ERIO"));

        assert!(flags.satisfies(&["TALKED_TO_ERIO"]));
        assert!(!flags.satisfies(&["TALKED_TO_ERIO", "DEFEATED_BETH"]));

        flags.insert("DEFEATED_BETH");
        assert!(flags.satisfies(&["TALKED_TO_ERIO", "DEFEATED_BETH"]));
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn clear_ends_the_session_state() {
        let mut flags = StoryFlags::new();
        flags.insert("USED_PIZZA_STONE");
        flags.clear();
        assert!(flags.is_empty());
        assert!(!flags.contains("USED_PIZZA_STONE"));
    }
}
