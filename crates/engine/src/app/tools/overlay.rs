//! F3 diagnostics overlay: loop metrics plus the scene's own debug lines,
//! drawn into a corner panel with the built-in bitmap font.

use crate::app::rendering::text::{
    draw_filled_rect, draw_rect_outline, draw_text_clipped, glyph_advance, line_advance,
};
use crate::app::LoopMetricsSnapshot;

const OVERLAY_TEXT_SCALE: i32 = 3;
const OVERLAY_PADDING: i32 = 18;
const PANEL_INNER_PADDING: i32 = 9;

const PANEL_BACKGROUND_COLOR: [u8; 4] = [10, 12, 16, 230];
const PANEL_BORDER_COLOR: [u8; 4] = [90, 98, 110, 255];
const TEXT_COLOR: [u8; 4] = [235, 240, 245, 255];

#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub slow_frame_delay_ms: u64,
    pub entity_count: usize,
    pub content_status: &'static str,
    pub debug_lines: Option<Vec<String>>,
}

pub(crate) fn draw_overlay(frame: &mut [u8], width: u32, height: u32, data: &OverlayData) {
    if width == 0 || height == 0 {
        return;
    }

    let lines = build_overlay_lines(data);
    let longest_line_chars = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as i32;
    let panel_width =
        longest_line_chars * glyph_advance(OVERLAY_TEXT_SCALE) + 2 * PANEL_INNER_PADDING;
    let panel_height =
        lines.len() as i32 * line_advance(OVERLAY_TEXT_SCALE) + 2 * PANEL_INNER_PADDING;

    draw_filled_rect(
        frame,
        width,
        height,
        OVERLAY_PADDING,
        OVERLAY_PADDING,
        panel_width,
        panel_height,
        PANEL_BACKGROUND_COLOR,
    );
    draw_rect_outline(
        frame,
        width,
        height,
        OVERLAY_PADDING,
        OVERLAY_PADDING,
        panel_width,
        panel_height,
        PANEL_BORDER_COLOR,
    );

    let text_x = OVERLAY_PADDING + PANEL_INNER_PADDING;
    let mut text_y = OVERLAY_PADDING + PANEL_INNER_PADDING;
    for line in &lines {
        draw_text_clipped(
            frame,
            width,
            height,
            text_x,
            text_y,
            OVERLAY_TEXT_SCALE,
            line,
            TEXT_COLOR,
        );
        text_y += line_advance(OVERLAY_TEXT_SCALE);
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        format!("FPS {:.1}  TPS {:.1}", data.metrics.fps, data.metrics.tps),
        format!("Frame {:.2} ms", data.metrics.frame_time_ms),
        format!("Entities {}", data.entity_count),
        format!("Content {}", data.content_status),
        format!("Cap {}", format_fps_cap(data.render_fps_cap)),
    ];
    if data.slow_frame_delay_ms > 0 {
        lines.push(format!("Slow frame {} ms", data.slow_frame_delay_ms));
    }
    if let Some(debug_lines) = &data.debug_lines {
        lines.extend(debug_lines.iter().cloned());
    }
    lines
}

fn format_fps_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_owned(),
    }
}
