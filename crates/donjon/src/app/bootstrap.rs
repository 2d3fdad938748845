use engine::{ContentRequest, LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::adventure;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Dungeon et Donjon Startup ===");

    let scene = adventure::build_scene();
    let config = LoopConfig {
        window_title: "Dungeon et Donjon".to_string(),
        content_request: ContentRequest {
            compiler_version: env!("CARGO_PKG_VERSION").to_string(),
            game_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        ..LoopConfig::default()
    };

    AppWiring { config, scene }
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
