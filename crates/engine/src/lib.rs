use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod battle;
pub mod config;
pub mod content;
pub mod event;
pub mod flags;
pub mod host;
pub mod overworld;
pub mod session;

pub use battle::{
    Action, AnimationCue, Battle, BattleEvent, BattleOutcome, BattlePhase, Combatant,
    CombatantDef, CombatantId, FirstActionPolicy, Status, StatusChange, StatusKind, Submission,
    SubmissionError, SubmissionRequest, TargetType, Team,
};
pub use config::EngineConfig;
pub use content::{load_world, parse_world, ContentError, WorldContent};
pub use event::{completion, Completion, CutsceneEvent, EventResolution, Pending};
pub use flags::StoryFlags;
pub use host::{
    AnimationTable, CraftingMenu, DecisionPolicy, Hosts, MapLayer, MapSurface, MessageBox,
    NoCrafting, SubmissionMenu,
};
pub use overworld::{Direction, EntityId, GridCoord, MapState, OverworldMap, Placement};
pub use session::{CutsceneOutcome, Overworld, PlayerStep, SessionError};

pub const ROOT_ENV_VAR: &str = "QUEST_ROOT";
pub const CONTENT_ENV_VAR: &str = "QUEST_CONTENT";
pub const DEFAULT_CONTENT_FILE: &str = "assets/world.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub content_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "{env_var} is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and assets/."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Set {env_var} to the directory holding assets/, or {content_var} to a content file."
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
        content_var: &'static str,
    },
}

/// Content file from `QUEST_CONTENT` when set, otherwise
/// `assets/world.json` under the project root.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    if let Some(content_file) = read_env(CONTENT_ENV_VAR)? {
        let content_file = PathBuf::from(content_file);
        let root = content_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        return Ok(AppPaths {
            root: normalize_path(&root),
            content_file,
        });
    }
    let root = resolve_root()?;
    let content_file = root.join(DEFAULT_CONTENT_FILE);
    Ok(AppPaths { root, content_file })
}

fn read_env(var: &'static str) -> Result<Option<String>, StartupError> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    if let Some(value) = read_env(ROOT_ENV_VAR)? {
        let normalized = normalize_path(Path::new(&value));
        return if is_repo_marker(&normalized) {
            Ok(normalized)
        } else {
            Err(StartupError::InvalidEnvRoot {
                path: normalized,
                env_var: ROOT_ENV_VAR,
            })
        };
    }

    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let exe_dir = exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
    exe_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: normalize_path(&exe_dir),
            env_var: ROOT_ENV_VAR,
            content_var: CONTENT_ENV_VAR,
        })
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("assets").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml_and_assets() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(!is_repo_marker(dir.path()));

        fs::create_dir(dir.path().join("assets")).expect("assets dir");
        assert!(!is_repo_marker(dir.path()));

        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        assert!(is_repo_marker(dir.path()));
    }
}
