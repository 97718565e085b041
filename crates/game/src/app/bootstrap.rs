use std::path::PathBuf;
use std::time::Duration;

use quest_engine::{resolve_app_paths, EngineConfig, StartupError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const STEP_MS_ENV_VAR: &str = "QUEST_STEP_MS";
const BLINK_MS_ENV_VAR: &str = "QUEST_BLINK_MS";

pub(crate) struct AppWiring {
    pub(crate) config: EngineConfig,
    pub(crate) content_file: PathBuf,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Quest Startup ===");

    let paths = resolve_app_paths()?;
    let defaults = EngineConfig::default();
    let config = EngineConfig {
        step_duration: millis_from_env(STEP_MS_ENV_VAR).unwrap_or(defaults.step_duration),
        damage_blink: millis_from_env(BLINK_MS_ENV_VAR).unwrap_or(defaults.damage_blink),
        ..defaults
    };
    info!(
        content = %paths.content_file.display(),
        step_ms = config.step_duration.as_millis() as u64,
        blink_ms = config.damage_blink.as_millis() as u64,
        "app_configured"
    );

    Ok(AppWiring {
        config,
        content_file: paths.content_file,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn millis_from_env(var: &'static str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    let parsed = parse_millis(&raw);
    if parsed.is_none() {
        warn!(var, value = %raw, "env_override_ignored");
    }
    parsed
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}
