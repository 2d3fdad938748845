use crate::app::Camera2D;
use crate::geom::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Maps a world position (map pixels, y down) to framebuffer pixels. The
/// camera position lands on the viewport center and zoom scales around it;
/// both spaces share the y-down orientation, so there is no axis flip.
pub fn world_to_screen_px(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    let zoom = camera.effective_zoom();
    let x = (world.x - camera.position.x) * zoom + viewport.width as f32 * 0.5;
    let y = (world.y - camera.position.y) * zoom + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}

/// Inverse of `world_to_screen_px`, used by debug tooling to map a screen
/// pixel back into map space.
pub fn screen_to_world_px(screen_x: f32, screen_y: f32, camera: &Camera2D, viewport: Viewport) -> Vec2 {
    let zoom = camera.effective_zoom();
    let x = (screen_x - viewport.width as f32 * 0.5) / zoom + camera.position.x;
    let y = (screen_y - viewport.height as f32 * 0.5) / zoom + camera.position.y;
    Vec2::new(x, y)
}
