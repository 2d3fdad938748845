use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::tools::draw_overlay;
use crate::app::{
    Banner, Camera2D, CombatPanel, DialogPanel, Entity, OverlayData, RenderableKind, SceneWorld,
    SpriteRegion, Tilemap, UiFrame,
};
use crate::geom::Vec2;
use crate::sprite_keys::validate_sprite_key;

use super::text::{
    draw_filled_rect, draw_rect_outline, draw_text_clipped, glyph_advance, line_advance,
    text_width_px,
};
use super::{world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];
const PLACEHOLDER_HALF_SIZE_PX: i32 = 5;

const UI_REFERENCE_WIDTH: f32 = 800.0;
const UI_REFERENCE_HEIGHT: f32 = 600.0;
const DIALOG_BOX_X: f32 = 60.0;
const DIALOG_BOX_Y: f32 = 470.0;
const DIALOG_BOX_WIDTH: f32 = 700.0;
const DIALOG_BOX_HEIGHT: f32 = 100.0;
const UI_TEXT_SCALE: i32 = 2;
const BANNER_TEXT_SCALE: i32 = 5;
const PANEL_PADDING: i32 = 12;

const PANEL_FILL_COLOR: [u8; 4] = [12, 12, 16, 235];
const PANEL_BORDER_COLOR: [u8; 4] = [214, 214, 214, 255];
const UI_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const SPEAKER_COLOR: [u8; 4] = [255, 222, 120, 255];
const BANNER_FILL_COLOR: [u8; 4] = [0, 0, 0, 255];
const BANNER_TEXT_COLOR: [u8; 4] = [200, 30, 30, 255];
const HELP_TEXT_COLOR: [u8; 4] = [190, 195, 205, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Software rasterizer over the `pixels` framebuffer: tile layers first,
/// entities in spawn order above them, then the window-space UI panels and
/// the optional debug overlay.
pub struct Renderer {
    window: &'static Window,
    pixels: Pixels<'static>,
    viewport: Viewport,
    asset_root: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: &'static Window, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(window, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            asset_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(self.window, width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: &'static Window,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(
        &mut self,
        world: &SceneWorld,
        overlay_data: Option<&OverlayData>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let asset_root = self.asset_root.as_path();
        let sprite_cache = &mut self.sprite_cache;
        let warned_missing_sprite_keys = &mut self.warned_missing_sprite_keys;
        let frame = self.pixels.frame_mut();

        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        if let Some(tilemap) = world.tilemap() {
            draw_tilemap(
                frame,
                viewport,
                tilemap,
                world.camera(),
                sprite_cache,
                warned_missing_sprite_keys,
                asset_root,
            );
        }

        for entity in world.entities() {
            draw_entity(
                frame,
                viewport,
                world.camera(),
                entity,
                sprite_cache,
                warned_missing_sprite_keys,
                asset_root,
            );
        }

        draw_ui_frame(frame, viewport, world.ui_frame());

        if let Some(data) = overlay_data {
            draw_overlay(frame, viewport.width, viewport.height, data);
        }

        self.pixels.render()
    }
}

/// Screen-space rectangle for a world-space rectangle. Both corners go
/// through the same projection, so adjacent tiles stay seam-free at any
/// zoom level.
fn world_rect_to_screen(
    camera: &Camera2D,
    viewport: Viewport,
    world_x: f32,
    world_y: f32,
    world_w: f32,
    world_h: f32,
) -> (i32, i32, i32, i32) {
    let (left, top) = world_to_screen_px(Vec2::new(world_x, world_y), camera, viewport);
    let (right, bottom) = world_to_screen_px(
        Vec2::new(world_x + world_w, world_y + world_h),
        camera,
        viewport,
    );
    (left, top, right - left, bottom - top)
}

fn draw_tilemap(
    frame: &mut [u8],
    viewport: Viewport,
    tilemap: &Tilemap,
    camera: &Camera2D,
    sprite_cache: &mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    asset_root: &Path,
) {
    let Some(tileset) = resolve_cached_sprite(
        sprite_cache,
        warned_missing_sprite_keys,
        asset_root,
        tilemap.tileset_key(),
    ) else {
        return;
    };

    let tile_size = tilemap.tile_size_px();
    let sheet_columns = tileset.width / tile_size;
    if sheet_columns == 0 {
        return;
    }

    let (x_min, x_max, y_min, y_max) = visible_tile_range(tilemap, camera, viewport);
    for layer_index in 0..tilemap.layers().len() {
        for tile_y in y_min..=y_max {
            for tile_x in x_min..=x_max {
                let Some(tile_id) = tilemap.tile_at(layer_index, tile_x, tile_y) else {
                    continue;
                };
                if tile_id == 0 {
                    continue;
                }

                // Tile ids are 1-based into the sheet, row-major.
                let sheet_index = u32::from(tile_id - 1);
                let region = SpriteRegion {
                    x: (sheet_index % sheet_columns) * tile_size,
                    y: (sheet_index / sheet_columns) * tile_size,
                    width: tile_size,
                    height: tile_size,
                };
                let (dst_x, dst_y, dst_w, dst_h) = world_rect_to_screen(
                    camera,
                    viewport,
                    (tile_x * tile_size) as f32,
                    (tile_y * tile_size) as f32,
                    tile_size as f32,
                    tile_size as f32,
                );
                blit_sprite_region(
                    frame, viewport, tileset, region, dst_x, dst_y, dst_w, dst_h,
                );
            }
        }
    }
}

/// Inclusive tile range touching the viewport, clamped to the map.
fn visible_tile_range(
    tilemap: &Tilemap,
    camera: &Camera2D,
    viewport: Viewport,
) -> (u32, u32, u32, u32) {
    let zoom = camera.effective_zoom();
    let half_w = viewport.width as f32 * 0.5 / zoom;
    let half_h = viewport.height as f32 * 0.5 / zoom;
    let tile_size = tilemap.tile_size_px() as f32;

    let min_x = ((camera.position.x - half_w) / tile_size).floor().max(0.0) as u32;
    let min_y = ((camera.position.y - half_h) / tile_size).floor().max(0.0) as u32;
    let max_x = (((camera.position.x + half_w) / tile_size).floor().max(0.0) as u32)
        .min(tilemap.width().saturating_sub(1));
    let max_y = (((camera.position.y + half_h) / tile_size).floor().max(0.0) as u32)
        .min(tilemap.height().saturating_sub(1));
    (min_x.min(max_x), max_x, min_y.min(max_y), max_y)
}

fn draw_entity(
    frame: &mut [u8],
    viewport: Viewport,
    camera: &Camera2D,
    entity: &Entity,
    sprite_cache: &mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    asset_root: &Path,
) {
    let position = entity.transform.position;
    match &entity.renderable.kind {
        RenderableKind::Placeholder => {
            let (cx, cy) = world_to_screen_px(position, camera, viewport);
            draw_square(frame, viewport, cx, cy, PLACEHOLDER_HALF_SIZE_PX);
        }
        RenderableKind::Sprite { sheet_key, region } => {
            let Some(sprite) = resolve_cached_sprite(
                sprite_cache,
                warned_missing_sprite_keys,
                asset_root,
                sheet_key,
            ) else {
                let (cx, cy) = world_to_screen_px(position, camera, viewport);
                draw_square(frame, viewport, cx, cy, PLACEHOLDER_HALF_SIZE_PX);
                return;
            };
            let (dst_x, dst_y, dst_w, dst_h) = world_rect_to_screen(
                camera,
                viewport,
                position.x,
                position.y,
                region.width as f32,
                region.height as f32,
            );
            blit_sprite_region(
                frame, viewport, sprite, *region, dst_x, dst_y, dst_w, dst_h,
            );
        }
    }
}

fn draw_square(frame: &mut [u8], viewport: Viewport, cx: i32, cy: i32, half_size: i32) {
    draw_filled_rect(
        frame,
        viewport.width,
        viewport.height,
        cx - half_size,
        cy - half_size,
        half_size * 2,
        half_size * 2,
        PLACEHOLDER_COLOR,
    );
}

/// Nearest-neighbor blit of a sheet region into a destination rectangle.
/// Fully transparent source pixels are skipped; everything else overwrites.
#[allow(clippy::too_many_arguments)]
fn blit_sprite_region(
    frame: &mut [u8],
    viewport: Viewport,
    sprite: &LoadedSprite,
    region: SpriteRegion,
    dst_x: i32,
    dst_y: i32,
    dst_w: i32,
    dst_h: i32,
) {
    if dst_w <= 0 || dst_h <= 0 || region.width == 0 || region.height == 0 {
        return;
    }
    if region.x + region.width > sprite.width || region.y + region.height > sprite.height {
        return;
    }

    let start_x = dst_x.max(0);
    let start_y = dst_y.max(0);
    let end_x = (dst_x + dst_w).min(viewport.width as i32);
    let end_y = (dst_y + dst_h).min(viewport.height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }

    let frame_width = viewport.width as usize;
    for py in start_y..end_y {
        let src_y = region.y + ((py - dst_y) as u32 * region.height) / dst_h as u32;
        for px in start_x..end_x {
            let src_x = region.x + ((px - dst_x) as u32 * region.width) / dst_w as u32;
            let src_offset = (src_y as usize * sprite.width as usize + src_x as usize) * 4;
            let Some(pixel) = sprite.rgba.get(src_offset..src_offset + 4) else {
                continue;
            };
            if pixel[3] == 0 {
                continue;
            }
            let dst_offset = (py as usize * frame_width + px as usize) * 4;
            if let Some(target) = frame.get_mut(dst_offset..dst_offset + 4) {
                target.copy_from_slice(pixel);
            }
        }
    }
}

fn resolve_cached_sprite<'a>(
    sprite_cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    asset_root: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !sprite_cache.contains_key(key) {
        let loaded = load_sprite(asset_root, key, warned_missing_sprite_keys);
        sprite_cache.insert(key.to_owned(), loaded);
    }
    sprite_cache.get(key).and_then(|slot| slot.as_ref())
}

fn load_sprite(
    asset_root: &Path,
    key: &str,
    warned_missing_sprite_keys: &mut HashSet<String>,
) -> Option<LoadedSprite> {
    if let Err(error) = validate_sprite_key(key) {
        warn_missing_once(warned_missing_sprite_keys, key, &error.to_string());
        return None;
    }

    let path = asset_root.join("base").join("sprites").join(format!("{key}.png"));
    let image = match ImageReader::open(&path) {
        Ok(reader) => match reader.decode() {
            Ok(image) => image,
            Err(error) => {
                warn_missing_once(warned_missing_sprite_keys, key, &error.to_string());
                return None;
            }
        },
        Err(error) => {
            warn_missing_once(warned_missing_sprite_keys, key, &error.to_string());
            return None;
        }
    };

    let rgba = image.to_rgba8();
    Some(LoadedSprite {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

fn warn_missing_once(warned: &mut HashSet<String>, key: &str, reason: &str) {
    if warned.insert(key.to_owned()) {
        warn!(sprite_key = key, reason, "sprite_unavailable");
    }
}

fn draw_ui_frame(frame: &mut [u8], viewport: Viewport, ui: &UiFrame) {
    if let Some(banner) = &ui.banner {
        draw_banner(frame, viewport, banner);
        return;
    }

    if let Some(dialog) = &ui.dialog {
        draw_dialog_panel(frame, viewport, dialog);
    }
    if let Some(combat) = &ui.combat {
        draw_combat_panel(frame, viewport, combat);
    }
    draw_help_lines(frame, viewport, &ui.help_lines);
}

/// Bottom text box, laid out against the 800x600 reference window and
/// scaled with the actual framebuffer.
fn dialog_box_rect(viewport: Viewport) -> (i32, i32, i32, i32) {
    let sx = viewport.width as f32 / UI_REFERENCE_WIDTH;
    let sy = viewport.height as f32 / UI_REFERENCE_HEIGHT;
    (
        (DIALOG_BOX_X * sx) as i32,
        (DIALOG_BOX_Y * sy) as i32,
        (DIALOG_BOX_WIDTH * sx) as i32,
        (DIALOG_BOX_HEIGHT * sy) as i32,
    )
}

fn draw_panel_background(frame: &mut [u8], viewport: Viewport, rect: (i32, i32, i32, i32)) {
    let (x, y, w, h) = rect;
    draw_filled_rect(frame, viewport.width, viewport.height, x, y, w, h, PANEL_FILL_COLOR);
    draw_rect_outline(frame, viewport.width, viewport.height, x, y, w, h, PANEL_BORDER_COLOR);
}

fn draw_dialog_panel(frame: &mut [u8], viewport: Viewport, dialog: &DialogPanel) {
    let rect = dialog_box_rect(viewport);
    draw_panel_background(frame, viewport, rect);

    let (x, y, w, _h) = rect;
    let text_x = x + PANEL_PADDING;
    let mut text_y = y + PANEL_PADDING;

    draw_text_clipped(
        frame,
        viewport.width,
        viewport.height,
        text_x,
        text_y,
        UI_TEXT_SCALE,
        &dialog.speaker,
        SPEAKER_COLOR,
    );
    text_y += line_advance(UI_TEXT_SCALE);

    // Reveal is counted in characters, not bytes.
    let revealed: String = dialog.text.chars().take(dialog.revealed_chars).collect();
    let max_columns = ((w - 2 * PANEL_PADDING) / glyph_advance(UI_TEXT_SCALE)).max(1) as usize;
    for line in wrap_text(&revealed, max_columns) {
        draw_text_clipped(
            frame,
            viewport.width,
            viewport.height,
            text_x,
            text_y,
            UI_TEXT_SCALE,
            &line,
            UI_TEXT_COLOR,
        );
        text_y += line_advance(UI_TEXT_SCALE);
    }
}

fn draw_combat_panel(frame: &mut [u8], viewport: Viewport, combat: &CombatPanel) {
    let rect = dialog_box_rect(viewport);
    draw_panel_background(frame, viewport, rect);

    let (x, y, _w, _h) = rect;
    let text_x = x + PANEL_PADDING;
    let mut text_y = y + PANEL_PADDING;
    let lines = [
        format!("You: {} HP", combat.player_hp),
        format!("{}: {} HP", combat.npc_name, combat.npc_hp),
        combat.last_event.clone(),
    ];
    for line in lines {
        draw_text_clipped(
            frame,
            viewport.width,
            viewport.height,
            text_x,
            text_y,
            UI_TEXT_SCALE,
            &line,
            UI_TEXT_COLOR,
        );
        text_y += line_advance(UI_TEXT_SCALE);
    }
}

fn draw_banner(frame: &mut [u8], viewport: Viewport, banner: &Banner) {
    draw_filled_rect(
        frame,
        viewport.width,
        viewport.height,
        0,
        0,
        viewport.width as i32,
        viewport.height as i32,
        BANNER_FILL_COLOR,
    );
    let title_width = text_width_px(&banner.title, BANNER_TEXT_SCALE);
    let x = (viewport.width as i32 - title_width) / 2;
    let y = (viewport.height as i32 - line_advance(BANNER_TEXT_SCALE)) / 2;
    draw_text_clipped(
        frame,
        viewport.width,
        viewport.height,
        x,
        y,
        BANNER_TEXT_SCALE,
        &banner.title,
        BANNER_TEXT_COLOR,
    );
}

fn draw_help_lines(frame: &mut [u8], viewport: Viewport, help_lines: &[String]) {
    if help_lines.is_empty() {
        return;
    }
    let total_height = help_lines.len() as i32 * line_advance(UI_TEXT_SCALE);
    let mut text_y = viewport.height as i32 - total_height - PANEL_PADDING;
    for line in help_lines {
        draw_text_clipped(
            frame,
            viewport.width,
            viewport.height,
            PANEL_PADDING,
            text_y,
            UI_TEXT_SCALE,
            line,
            HELP_TEXT_COLOR,
        );
        text_y += line_advance(UI_TEXT_SCALE);
    }
}

/// Greedy word wrap; a word longer than the line budget is split mid-word
/// rather than overflowing the panel.
fn wrap_text(text: &str, max_columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_columns {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > max_columns {
            for ch in word.chars() {
                if current_len == max_columns {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 800,
            height: 600,
        }
    }

    fn checker_sprite() -> LoadedSprite {
        // 2x2: opaque red, transparent, transparent, opaque blue.
        let rgba = vec![
            255, 0, 0, 255, //
            0, 0, 0, 0, //
            0, 0, 0, 0, //
            0, 0, 255, 255,
        ];
        LoadedSprite {
            width: 2,
            height: 2,
            rgba,
        }
    }

    fn pixel_at(frame: &[u8], width: u32, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn blit_skips_fully_transparent_pixels() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        let sprite = checker_sprite();
        let region = SpriteRegion {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
        };
        blit_sprite_region(
            &mut frame,
            Viewport {
                width: 8,
                height: 8,
            },
            &sprite,
            region,
            0,
            0,
            2,
            2,
        );

        assert_eq!(pixel_at(&frame, 8, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 8, 1, 0), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 8, 0, 1), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 8, 1, 1), [0, 0, 255, 255]);
    }

    #[test]
    fn blit_scales_with_nearest_neighbor() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        let sprite = checker_sprite();
        let region = SpriteRegion {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
        };
        blit_sprite_region(
            &mut frame,
            Viewport {
                width: 8,
                height: 8,
            },
            &sprite,
            region,
            0,
            0,
            4,
            4,
        );

        // Top-left source pixel covers a 2x2 destination block.
        assert_eq!(pixel_at(&frame, 8, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 8, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 8, 3, 3), [0, 0, 255, 255]);
    }

    #[test]
    fn blit_rejects_region_outside_sheet() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        let sprite = checker_sprite();
        let region = SpriteRegion {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        };
        blit_sprite_region(
            &mut frame,
            Viewport {
                width: 8,
                height: 8,
            },
            &sprite,
            region,
            0,
            0,
            2,
            2,
        );
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn blit_clips_to_viewport_without_panicking() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let sprite = checker_sprite();
        let region = SpriteRegion {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
        };
        blit_sprite_region(
            &mut frame,
            Viewport {
                width: 4,
                height: 4,
            },
            &sprite,
            region,
            -1,
            -1,
            8,
            8,
        );
        blit_sprite_region(
            &mut frame,
            Viewport {
                width: 4,
                height: 4,
            },
            &sprite,
            region,
            100,
            100,
            2,
            2,
        );
    }

    #[test]
    fn visible_tile_range_clamps_to_map_bounds() {
        let tilemap = Tilemap::new(
            10,
            8,
            16,
            "tilesets/overworld",
            vec![("ground".to_owned(), vec![0u16; 80])],
        )
        .unwrap();
        let camera = Camera2D {
            position: Vec2::new(-500.0, -500.0),
            zoom: 3.0,
        };
        let (x_min, x_max, y_min, y_max) = visible_tile_range(&tilemap, &camera, viewport());
        assert_eq!((x_min, y_min), (0, 0));
        assert!(x_max < 10 && y_max < 8);

        let camera = Camera2D {
            position: Vec2::new(10_000.0, 10_000.0),
            zoom: 3.0,
        };
        let (x_min, x_max, y_min, y_max) = visible_tile_range(&tilemap, &camera, viewport());
        assert_eq!((x_max, y_max), (9, 7));
        assert!(x_min <= x_max && y_min <= y_max);
    }

    #[test]
    fn world_rect_corners_share_projection() {
        let camera = Camera2D {
            position: Vec2::new(0.0, 0.0),
            zoom: 3.0,
        };
        let (_, _, w_a, h_a) = world_rect_to_screen(&camera, viewport(), 0.0, 0.0, 16.0, 16.0);
        let (x_b, y_b, _, _) = world_rect_to_screen(&camera, viewport(), 16.0, 16.0, 16.0, 16.0);
        let (x_a, y_a, _, _) = world_rect_to_screen(&camera, viewport(), 0.0, 0.0, 16.0, 16.0);
        assert_eq!(x_a + w_a, x_b);
        assert_eq!(y_a + h_a, y_b);
    }

    #[test]
    fn wrap_text_breaks_on_word_boundaries() {
        let lines = wrap_text("Welcome traveler to the dungeon", 12);
        assert_eq!(lines, vec!["Welcome", "traveler to", "the dungeon"]);
    }

    #[test]
    fn wrap_text_splits_overlong_words() {
        let lines = wrap_text("aaaaaaaaaa", 4);
        assert_eq!(lines, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn wrap_text_empty_input_yields_no_lines() {
        assert!(wrap_text("", 10).is_empty());
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn dialog_box_scales_with_window() {
        let rect = dialog_box_rect(Viewport {
            width: 1600,
            height: 1200,
        });
        assert_eq!(rect, (120, 940, 1400, 200));
    }

    #[test]
    fn missing_sprite_key_warns_once_and_caches_none() {
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();
        let root = std::env::temp_dir().join("no-such-asset-root");

        assert!(resolve_cached_sprite(&mut cache, &mut warned, &root, "missing/key").is_none());
        assert!(resolve_cached_sprite(&mut cache, &mut warned, &root, "missing/key").is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(warned.len(), 1);
    }

    #[test]
    fn invalid_sprite_key_is_rejected_without_touching_disk() {
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();
        let root = std::env::temp_dir();
        assert!(resolve_cached_sprite(&mut cache, &mut warned, &root, "../escape").is_none());
        assert!(warned.contains("../escape"));
    }
}
