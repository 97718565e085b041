mod loader;
mod types;

pub use loader::{load_world, parse_world, validate_world, ContentError};
pub use types::{CutsceneSpaceDef, EnemyDef, MapDef, ObjectDef, ObjectKind, WorldContent};
