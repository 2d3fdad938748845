use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod geom;
mod sprite_keys;

pub use app::{
    run_app, run_app_with_metrics, screen_to_world_px, world_to_screen_px, AppError, Banner,
    Camera2D, CombatPanel, DialogPanel, Entity, EntityId, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle, RenderableDesc, RenderableKind, Renderer, Scene,
    SceneCommand, SceneWorld, SpriteRegion, TileLayer, Tilemap, TilemapError, Transform, UiFrame,
    Viewport, SLOW_FRAME_ENV_VAR,
};
pub use content::{
    build_or_load_map_catalog, compile_map_catalog, ContentCompileError, ContentErrorCode,
    ContentPipelineError, ContentRequest, MapCatalog, MapDef, MapId, NamedObject, SourceLocation,
    TileLayerDef,
};
pub use geom::{Rect, Vec2};

pub const ROOT_ENV_VAR: &str = "DONJON_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    pub cache_dir: PathBuf,
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
    #[error("failed to create cache directory at {path}: {source}")]
    CreateCacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "DONJON_ROOT does not name a project root: {path}\n\
The root directory must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "no project root found walking up from the executable directory {start_dir}\n\
(looked for Cargo.toml next to crates/ or assets/)\n\
Set {env_var} to the project root, e.g. export {env_var}=/path/to/donjon"
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = AppPaths {
        base_content_dir: root.join("assets").join("base"),
        cache_dir: root.join("cache"),
        root,
    };
    fs::create_dir_all(&paths.cache_dir).map_err(|source| StartupError::CreateCacheDir {
        path: paths.cache_dir.clone(),
        source,
    })?;
    Ok(paths)
}

/// `DONJON_ROOT` wins when set; otherwise walk upward from the executable
/// so `cargo run` and a copied-out target/ both find the assets.
fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => root_from_env(PathBuf::from(value)),
        Err(env::VarError::NotPresent) => root_from_exe_ancestors(),
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn root_from_env(raw: PathBuf) -> Result<PathBuf, StartupError> {
    let path = normalize_path(&raw);
    if looks_like_project_root(&path) {
        Ok(path)
    } else {
        Err(StartupError::InvalidEnvRoot { path })
    }
}

fn root_from_exe_ancestors() -> Result<PathBuf, StartupError> {
    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let exe_dir = exe
        .parent()
        .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?
        .to_path_buf();

    exe_dir
        .ancestors()
        .find(|candidate| looks_like_project_root(candidate))
        .map(normalize_path)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: normalize_path(&exe_dir),
            env_var: ROOT_ENV_VAR,
        })
}

fn looks_like_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
