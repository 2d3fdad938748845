//! Built-in 3x5 bitmap font and clipped pixel primitives shared by the UI
//! panels and the debug overlay. ASCII printable only; anything else draws
//! as the caller's fallback glyph.

pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;

pub(crate) const fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub(crate) const fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale
}

pub(crate) fn text_width_px(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * glyph_advance(scale)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_text_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    scale: i32,
    text: &str,
    color: [u8; 4],
) {
    for ch in text.chars() {
        let glyph = glyph_for(ch).unwrap_or(SPACE_GLYPH);
        draw_glyph_clipped(frame, width, height, x, y, scale, glyph, color);
        x += glyph_advance(scale);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    scale: i32,
    glyph: Glyph,
    color: [u8; 4],
) {
    if width == 0 || height == 0 || scale <= 0 {
        return;
    }

    let height_i32 = height as i32;
    let width_i32 = width as i32;

    for (row_index, row_bits) in glyph.rows.iter().enumerate() {
        let glyph_y = y + row_index as i32 * scale;

        for col in 0..GLYPH_WIDTH {
            if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                continue;
            }

            let glyph_x = x + col * scale;
            for sy in 0..scale {
                let pixel_y = glyph_y + sy;
                if pixel_y < 0 || pixel_y >= height_i32 {
                    continue;
                }
                for sx in 0..scale {
                    let pixel_x = glyph_x + sx;
                    if pixel_x < 0 || pixel_x >= width_i32 {
                        continue;
                    }
                    write_pixel_rgba(
                        frame,
                        width as usize,
                        pixel_x as usize,
                        pixel_y as usize,
                        color,
                    );
                }
            }
        }
    }
}

pub(crate) fn write_pixel_rgba(frame: &mut [u8], width: usize, x: usize, y: usize, color: [u8; 4]) {
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }

    frame[byte_offset..end].copy_from_slice(&color);
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = (x + rect_width).min(width as i32);
    let end_y = (y + rect_height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }

    let width_usize = width as usize;
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba(frame, width_usize, px as usize, py as usize, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    if rect_width <= 1 || rect_height <= 1 {
        return;
    }
    draw_filled_rect(frame, width, height, x, y, rect_width, 1, color);
    draw_filled_rect(
        frame,
        width,
        height,
        x,
        y + rect_height - 1,
        rect_width,
        1,
        color,
    );
    draw_filled_rect(frame, width, height, x, y, 1, rect_height, color);
    draw_filled_rect(
        frame,
        width,
        height,
        x + rect_width - 1,
        y,
        1,
        rect_height,
        color,
    );
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyph {
    rows: [u8; GLYPH_HEIGHT as usize],
}

const SPACE_GLYPH: Glyph = Glyph {
    rows: [0, 0, 0, 0, 0],
};

fn glyph_for(ch: char) -> Option<Glyph> {
    match ch {
        ' '..='~' => Some(ascii_glyph(ch)),
        _ => None,
    }
}

fn ascii_glyph(ch: char) -> Glyph {
    match ch {
        ' ' => SPACE_GLYPH,
        '!' => Glyph {
            rows: [0b010, 0b010, 0b010, 0b000, 0b010],
        },
        '"' => Glyph {
            rows: [0b101, 0b101, 0b000, 0b000, 0b000],
        },
        '#' => Glyph {
            rows: [0b101, 0b111, 0b101, 0b111, 0b101],
        },
        '$' => Glyph {
            rows: [0b111, 0b110, 0b111, 0b011, 0b111],
        },
        '%' => Glyph {
            rows: [0b101, 0b001, 0b010, 0b100, 0b101],
        },
        '&' => Glyph {
            rows: [0b010, 0b101, 0b010, 0b101, 0b011],
        },
        '\'' => Glyph {
            rows: [0b010, 0b010, 0b000, 0b000, 0b000],
        },
        '(' => Glyph {
            rows: [0b001, 0b010, 0b010, 0b010, 0b001],
        },
        ')' => Glyph {
            rows: [0b100, 0b010, 0b010, 0b010, 0b100],
        },
        '*' => Glyph {
            rows: [0b000, 0b101, 0b010, 0b101, 0b000],
        },
        '+' => Glyph {
            rows: [0b000, 0b010, 0b111, 0b010, 0b000],
        },
        ',' => Glyph {
            rows: [0b000, 0b000, 0b000, 0b010, 0b100],
        },
        '-' => Glyph {
            rows: [0b000, 0b000, 0b111, 0b000, 0b000],
        },
        '.' => Glyph {
            rows: [0b000, 0b000, 0b000, 0b000, 0b010],
        },
        '/' => Glyph {
            rows: [0b001, 0b001, 0b010, 0b100, 0b100],
        },
        '0' => Glyph {
            rows: [0b111, 0b101, 0b101, 0b101, 0b111],
        },
        '1' => Glyph {
            rows: [0b010, 0b110, 0b010, 0b010, 0b111],
        },
        '2' => Glyph {
            rows: [0b111, 0b001, 0b111, 0b100, 0b111],
        },
        '3' => Glyph {
            rows: [0b111, 0b001, 0b111, 0b001, 0b111],
        },
        '4' => Glyph {
            rows: [0b101, 0b101, 0b111, 0b001, 0b001],
        },
        '5' => Glyph {
            rows: [0b111, 0b100, 0b111, 0b001, 0b111],
        },
        '6' => Glyph {
            rows: [0b111, 0b100, 0b111, 0b101, 0b111],
        },
        '7' => Glyph {
            rows: [0b111, 0b001, 0b010, 0b010, 0b010],
        },
        '8' => Glyph {
            rows: [0b111, 0b101, 0b111, 0b101, 0b111],
        },
        '9' => Glyph {
            rows: [0b111, 0b101, 0b111, 0b001, 0b111],
        },
        ':' => Glyph {
            rows: [0b000, 0b010, 0b000, 0b010, 0b000],
        },
        ';' => Glyph {
            rows: [0b000, 0b010, 0b000, 0b010, 0b100],
        },
        '<' => Glyph {
            rows: [0b001, 0b010, 0b100, 0b010, 0b001],
        },
        '=' => Glyph {
            rows: [0b000, 0b111, 0b000, 0b111, 0b000],
        },
        '>' => Glyph {
            rows: [0b100, 0b010, 0b001, 0b010, 0b100],
        },
        '?' => Glyph {
            rows: [0b111, 0b001, 0b011, 0b000, 0b010],
        },
        '@' => Glyph {
            rows: [0b111, 0b101, 0b111, 0b100, 0b111],
        },
        'A' => Glyph {
            rows: [0b010, 0b101, 0b111, 0b101, 0b101],
        },
        'B' => Glyph {
            rows: [0b110, 0b101, 0b110, 0b101, 0b110],
        },
        'C' => Glyph {
            rows: [0b111, 0b100, 0b100, 0b100, 0b111],
        },
        'D' => Glyph {
            rows: [0b110, 0b101, 0b101, 0b101, 0b110],
        },
        'E' => Glyph {
            rows: [0b111, 0b100, 0b110, 0b100, 0b111],
        },
        'F' => Glyph {
            rows: [0b111, 0b100, 0b110, 0b100, 0b100],
        },
        'G' => Glyph {
            rows: [0b111, 0b100, 0b101, 0b101, 0b111],
        },
        'H' => Glyph {
            rows: [0b101, 0b101, 0b111, 0b101, 0b101],
        },
        'I' => Glyph {
            rows: [0b111, 0b010, 0b010, 0b010, 0b111],
        },
        'J' => Glyph {
            rows: [0b111, 0b001, 0b001, 0b101, 0b111],
        },
        'K' => Glyph {
            rows: [0b101, 0b101, 0b110, 0b101, 0b101],
        },
        'L' => Glyph {
            rows: [0b100, 0b100, 0b100, 0b100, 0b111],
        },
        'M' => Glyph {
            rows: [0b101, 0b111, 0b111, 0b101, 0b101],
        },
        'N' => Glyph {
            rows: [0b101, 0b111, 0b111, 0b111, 0b101],
        },
        'O' => Glyph {
            rows: [0b111, 0b101, 0b101, 0b101, 0b111],
        },
        'P' => Glyph {
            rows: [0b110, 0b101, 0b110, 0b100, 0b100],
        },
        'Q' => Glyph {
            rows: [0b111, 0b101, 0b101, 0b111, 0b001],
        },
        'R' => Glyph {
            rows: [0b110, 0b101, 0b110, 0b101, 0b101],
        },
        'S' => Glyph {
            rows: [0b111, 0b100, 0b111, 0b001, 0b111],
        },
        'T' => Glyph {
            rows: [0b111, 0b010, 0b010, 0b010, 0b010],
        },
        'U' => Glyph {
            rows: [0b101, 0b101, 0b101, 0b101, 0b111],
        },
        'V' => Glyph {
            rows: [0b101, 0b101, 0b101, 0b101, 0b010],
        },
        'W' => Glyph {
            rows: [0b101, 0b101, 0b111, 0b111, 0b101],
        },
        'X' => Glyph {
            rows: [0b101, 0b101, 0b010, 0b101, 0b101],
        },
        'Y' => Glyph {
            rows: [0b101, 0b101, 0b010, 0b010, 0b010],
        },
        'Z' => Glyph {
            rows: [0b111, 0b001, 0b010, 0b100, 0b111],
        },
        '[' => Glyph {
            rows: [0b110, 0b100, 0b100, 0b100, 0b110],
        },
        '\\' => Glyph {
            rows: [0b100, 0b100, 0b010, 0b001, 0b001],
        },
        ']' => Glyph {
            rows: [0b011, 0b001, 0b001, 0b001, 0b011],
        },
        '^' => Glyph {
            rows: [0b010, 0b101, 0b000, 0b000, 0b000],
        },
        '_' => Glyph {
            rows: [0b000, 0b000, 0b000, 0b000, 0b111],
        },
        '`' => Glyph {
            rows: [0b100, 0b010, 0b000, 0b000, 0b000],
        },
        'a' => Glyph {
            rows: [0b000, 0b111, 0b001, 0b111, 0b111],
        },
        'b' => Glyph {
            rows: [0b100, 0b100, 0b110, 0b101, 0b110],
        },
        'c' => Glyph {
            rows: [0b000, 0b111, 0b100, 0b100, 0b111],
        },
        'd' => Glyph {
            rows: [0b001, 0b001, 0b111, 0b101, 0b111],
        },
        'e' => Glyph {
            rows: [0b000, 0b111, 0b110, 0b100, 0b111],
        },
        'f' => Glyph {
            rows: [0b011, 0b100, 0b110, 0b100, 0b100],
        },
        'g' => Glyph {
            rows: [0b000, 0b111, 0b101, 0b111, 0b001],
        },
        'h' => Glyph {
            rows: [0b100, 0b100, 0b110, 0b101, 0b101],
        },
        'i' => Glyph {
            rows: [0b010, 0b000, 0b010, 0b010, 0b010],
        },
        'j' => Glyph {
            rows: [0b001, 0b000, 0b001, 0b101, 0b010],
        },
        'k' => Glyph {
            rows: [0b100, 0b101, 0b110, 0b101, 0b101],
        },
        'l' => Glyph {
            rows: [0b100, 0b100, 0b100, 0b100, 0b111],
        },
        'm' => Glyph {
            rows: [0b000, 0b110, 0b111, 0b101, 0b101],
        },
        'n' => Glyph {
            rows: [0b000, 0b110, 0b101, 0b101, 0b101],
        },
        'o' => Glyph {
            rows: [0b000, 0b111, 0b101, 0b101, 0b111],
        },
        'p' => Glyph {
            rows: [0b000, 0b110, 0b101, 0b110, 0b100],
        },
        'q' => Glyph {
            rows: [0b000, 0b111, 0b101, 0b111, 0b001],
        },
        'r' => Glyph {
            rows: [0b000, 0b110, 0b101, 0b100, 0b100],
        },
        's' => Glyph {
            rows: [0b000, 0b111, 0b110, 0b001, 0b111],
        },
        't' => Glyph {
            rows: [0b010, 0b111, 0b010, 0b010, 0b011],
        },
        'u' => Glyph {
            rows: [0b000, 0b101, 0b101, 0b101, 0b111],
        },
        'v' => Glyph {
            rows: [0b000, 0b101, 0b101, 0b101, 0b010],
        },
        'w' => Glyph {
            rows: [0b000, 0b101, 0b101, 0b111, 0b010],
        },
        'x' => Glyph {
            rows: [0b000, 0b101, 0b010, 0b010, 0b101],
        },
        'y' => Glyph {
            rows: [0b000, 0b101, 0b101, 0b111, 0b001],
        },
        'z' => Glyph {
            rows: [0b000, 0b111, 0b001, 0b010, 0b111],
        },
        '{' => Glyph {
            rows: [0b011, 0b010, 0b110, 0b010, 0b011],
        },
        '|' => Glyph {
            rows: [0b010, 0b010, 0b010, 0b010, 0b010],
        },
        '}' => Glyph {
            rows: [0b110, 0b010, 0b011, 0b010, 0b110],
        },
        '~' => Glyph {
            rows: [0b000, 0b011, 0b110, 0b000, 0b000],
        },
        _ => SPACE_GLYPH,
    }
}
