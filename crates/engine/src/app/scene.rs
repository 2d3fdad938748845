use super::input::{ActionStates, InputAction};
use crate::content::{MapCatalog, MapDef};
use crate::geom::Vec2;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Discard the scene world and rebuild the scene from scratch.
    HardReset,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    interact_pressed: bool,
    actions: ActionStates,
    save_pressed: bool,
    load_pressed: bool,
    zoom_delta_steps: i32,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        interact_pressed: bool,
        actions: ActionStates,
        save_pressed: bool,
        load_pressed: bool,
        zoom_delta_steps: i32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            interact_pressed,
            actions,
            save_pressed,
            load_pressed,
            zoom_delta_steps,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Edge-triggered interact key (dialog trigger / page skip).
    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Single held direction after priority resolution (up, down, left,
    /// right). Never yields a diagonal.
    pub fn held_direction(&self) -> Option<InputAction> {
        self.actions.held_direction()
    }

    pub fn save_pressed(&self) -> bool {
        self.save_pressed
    }

    pub fn load_pressed(&self) -> bool {
        self.load_pressed
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_interact_pressed(mut self, interact_pressed: bool) -> Self {
        self.interact_pressed = interact_pressed;
        self
    }

    pub fn with_save_pressed(mut self, save_pressed: bool) -> Self {
        self.save_pressed = save_pressed;
        self
    }

    pub fn with_load_pressed(mut self, load_pressed: bool) -> Self {
        self.load_pressed = load_pressed;
        self
    }

    pub fn with_zoom_delta_steps(mut self, zoom_delta_steps: i32) -> Self {
        self.zoom_delta_steps = zoom_delta_steps;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

pub const CAMERA_ZOOM_DEFAULT: f32 = 3.0;
pub const CAMERA_ZOOM_MIN: f32 = 1.0;
pub const CAMERA_ZOOM_MAX: f32 = 4.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let target_zoom = self.zoom + steps as f32 * CAMERA_ZOOM_STEP;
        self.set_zoom_clamped(target_zoom);
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self { position }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    name: String,
    tiles: Vec<u16>,
}

impl TileLayer {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Multi-layer tile grid in map pixel space. Tile id 0 is empty; layers draw
/// bottom-up in their stored order, all below the dynamic entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size_px: u32,
    tileset_key: String,
    layers: Vec<TileLayer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tilemap dimensions must be non-zero (got {width}x{height}, tile size {tile_size_px})")]
    ZeroDimension {
        width: u32,
        height: u32,
        tile_size_px: u32,
    },
    #[error("layer '{layer}' tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size_px: u32,
        tileset_key: impl Into<String>,
        layers: Vec<(String, Vec<u16>)>,
    ) -> Result<Self, TilemapError> {
        if width == 0 || height == 0 || tile_size_px == 0 {
            return Err(TilemapError::ZeroDimension {
                width,
                height,
                tile_size_px,
            });
        }
        let expected = width as usize * height as usize;
        let mut checked = Vec::with_capacity(layers.len());
        for (name, tiles) in layers {
            if tiles.len() != expected {
                return Err(TilemapError::TileCountMismatch {
                    layer: name,
                    expected,
                    actual: tiles.len(),
                });
            }
            checked.push(TileLayer { name, tiles });
        }
        Ok(Self {
            width,
            height,
            tile_size_px,
            tileset_key: tileset_key.into(),
            layers: checked,
        })
    }

    pub fn from_map_def(def: &MapDef) -> Result<Self, TilemapError> {
        let layers = def
            .layers()
            .iter()
            .map(|layer| (layer.name().to_owned(), layer.tiles().to_vec()))
            .collect();
        Self::new(
            def.width(),
            def.height(),
            def.tile_size_px(),
            def.tileset_key(),
            layers,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    pub fn tileset_key(&self) -> &str {
        &self.tileset_key
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn pixel_width(&self) -> u32 {
        self.width * self.tile_size_px
    }

    pub fn pixel_height(&self) -> u32 {
        self.height * self.tile_size_px
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, layer: usize, x: u32, y: u32) -> Option<u16> {
        let index = self.index_of(x, y)?;
        self.layers
            .get(layer)
            .and_then(|layer| layer.tiles.get(index).copied())
    }
}

/// Source rectangle inside a sprite sheet, in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableKind {
    Placeholder,
    /// A region of a sprite sheet, drawn with its top-left at the entity's
    /// transform position.
    Sprite {
        sheet_key: String,
        region: SpriteRegion,
    },
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
}

/// Per-frame UI state built by the scene and consumed by the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiFrame {
    pub dialog: Option<DialogPanel>,
    pub combat: Option<CombatPanel>,
    pub banner: Option<Banner>,
    pub help_lines: Vec<String>,
}

impl UiFrame {
    pub fn clear(&mut self) {
        self.dialog = None;
        self.combat = None;
        self.banner = None;
        self.help_lines.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogPanel {
    pub speaker: String,
    pub text: String,
    /// Character count of the typewriter reveal; the renderer shows
    /// `text[..revealed_chars]` counted in characters, not bytes.
    pub revealed_chars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatPanel {
    pub player_hp: i32,
    pub npc_name: String,
    pub npc_hp: i32,
    pub last_event: String,
}

/// Full-screen dark panel with a centered title (death screen).
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub title: String,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    camera: Camera2D,
    tilemap: Option<Tilemap>,
    ui: UiFrame,
    map_catalog: Option<MapCatalog>,
}

impl SceneWorld {
    /// Queues a spawn; the entity becomes visible after `apply_pending`.
    /// Draw order is spawn order.
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            renderable,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort();
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.entities
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            self.pending_spawns
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            self.pending_despawns.clear();
        }

        if !self.pending_spawns.is_empty() {
            self.entities.append(&mut self.pending_spawns);
        }
    }

    /// Resets everything a hard reset must rebuild. The entity id allocator
    /// and the map catalog survive; ids stay unique across resets.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.camera = Camera2D::default();
        self.tilemap = None;
        self.ui.clear();
    }

    pub fn set_tilemap(&mut self, tilemap: Tilemap) {
        self.tilemap = Some(tilemap);
    }

    pub fn clear_tilemap(&mut self) {
        self.tilemap = None;
    }

    pub fn tilemap(&self) -> Option<&Tilemap> {
        self.tilemap.as_ref()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn ui_frame(&self) -> &UiFrame {
        &self.ui
    }

    pub fn ui_frame_mut(&mut self) -> &mut UiFrame {
        &mut self.ui
    }

    pub fn set_map_catalog(&mut self, map_catalog: MapCatalog) {
        self.map_catalog = Some(map_catalog);
    }

    pub fn map_catalog(&self) -> Option<&MapCatalog> {
        self.map_catalog.as_ref()
    }
}

pub trait Scene {
    /// Builds the scene's state from the world's map catalog. Errors abort
    /// startup (or the hard reset that requested the reload).
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), String>;
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
    /// Extra lines for the debug overlay (mode, map, player state).
    fn debug_lines(&self, _world: &SceneWorld) -> Option<Vec<String>> {
        None
    }
}

pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn set_map_catalog(&mut self, map_catalog: MapCatalog) {
        self.world.set_map_catalog(map_catalog);
    }

    pub(crate) fn load(&mut self) -> Result<(), String> {
        if self.is_loaded {
            return Ok(());
        }
        self.scene.load(&mut self.world)?;
        self.is_loaded = true;
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        self.scene.update(fixed_dt_seconds, input, &mut self.world)
    }

    pub(crate) fn apply_pending(&mut self) {
        self.world.apply_pending();
    }

    /// Unloads the scene, discards the scene world (keeping the catalog),
    /// and loads again from scratch.
    pub(crate) fn hard_reset(&mut self) -> Result<(), String> {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.is_loaded = false;
        }
        self.world.clear();
        self.load()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.is_loaded = false;
        }
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn debug_lines(&self) -> Option<Vec<String>> {
        self.scene.debug_lines(&self.world)
    }
}
