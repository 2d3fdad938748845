mod renderer;
pub(crate) mod text;
mod transform;

pub use renderer::Renderer;
pub use transform::{screen_to_world_px, world_to_screen_px, Viewport};
