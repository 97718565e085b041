use std::time::Duration;

/// Frames per grid step at the 60 Hz reference rate.
pub const STEP_FRAMES: u64 = 16;

/// Pacing of a session. Every delay a handler holds comes from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub step_duration: Duration,
    pub damage_blink: Duration,
    pub walk_retry_delay: Duration,
    pub max_walk_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_duration: Duration::from_millis(STEP_FRAMES * 1000 / 60),
            damage_blink: Duration::from_millis(600),
            walk_retry_delay: Duration::from_millis(10),
            max_walk_retries: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_step_is_sixteen_frames() {
        let config = EngineConfig::default();
        assert_eq!(config.step_duration, Duration::from_millis(266));
        assert_eq!(config.damage_blink, Duration::from_millis(600));
        assert_eq!(config.max_walk_retries, 30);
    }
}
