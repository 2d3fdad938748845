mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod tools;

pub use input::InputAction;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{screen_to_world_px, world_to_screen_px, Renderer, Viewport};
pub use scene::{
    Banner, Camera2D, CombatPanel, DialogPanel, Entity, EntityId, InputSnapshot, RenderableDesc,
    RenderableKind, Scene, SceneCommand, SceneWorld, SpriteRegion, TileLayer, Tilemap,
    TilemapError, Transform, UiFrame, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN,
    CAMERA_ZOOM_STEP,
};
pub(crate) use tools::OverlayData;
