//! CAPTCHA image rendering.
//!
//! Draws the code onto a 100x50 PNG with background noise, per-glyph jitter
//! and rotation, and curved interference lines. Glyphs are stroked from a
//! segment font so no font files are needed at runtime.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, Rgba, RgbaImage};
use rand::Rng;
use std::io::Cursor;
use thiserror::Error;

pub const WIDTH: u32 = 100;
pub const HEIGHT: u32 = 50;

const BACKGROUND: Rgba<u8> = Rgba([0xf5, 0xf5, 0xf5, 0xff]);
const NOISE_DOTS: usize = 100;
const INTERFERENCE_LINES: usize = 4;
const GLYPH_ADVANCE: f32 = 22.0;
const FIRST_GLYPH_X: f32 = 15.0;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum CaptchaImageError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Segments of a seven-segment digit in a unit cell
/// (x in `-0.5..=0.5`, y in `-1.0..=1.0`, y down).
const SEG_TOP: [(f32, f32); 2] = [(-0.5, -1.0), (0.5, -1.0)];
const SEG_TOP_RIGHT: [(f32, f32); 2] = [(0.5, -1.0), (0.5, 0.0)];
const SEG_BOTTOM_RIGHT: [(f32, f32); 2] = [(0.5, 0.0), (0.5, 1.0)];
const SEG_BOTTOM: [(f32, f32); 2] = [(-0.5, 1.0), (0.5, 1.0)];
const SEG_BOTTOM_LEFT: [(f32, f32); 2] = [(-0.5, 0.0), (-0.5, 1.0)];
const SEG_TOP_LEFT: [(f32, f32); 2] = [(-0.5, -1.0), (-0.5, 0.0)];
const SEG_MIDDLE: [(f32, f32); 2] = [(-0.5, 0.0), (0.5, 0.0)];

fn glyph_segments(digit: char) -> &'static [[(f32, f32); 2]] {
    match digit {
        '0' => &[SEG_TOP, SEG_TOP_RIGHT, SEG_BOTTOM_RIGHT, SEG_BOTTOM, SEG_BOTTOM_LEFT, SEG_TOP_LEFT],
        '1' => &[SEG_TOP_RIGHT, SEG_BOTTOM_RIGHT],
        '2' => &[SEG_TOP, SEG_TOP_RIGHT, SEG_MIDDLE, SEG_BOTTOM_LEFT, SEG_BOTTOM],
        '3' => &[SEG_TOP, SEG_TOP_RIGHT, SEG_MIDDLE, SEG_BOTTOM_RIGHT, SEG_BOTTOM],
        '4' => &[SEG_TOP_LEFT, SEG_MIDDLE, SEG_TOP_RIGHT, SEG_BOTTOM_RIGHT],
        '5' => &[SEG_TOP, SEG_TOP_LEFT, SEG_MIDDLE, SEG_BOTTOM_RIGHT, SEG_BOTTOM],
        '6' => &[SEG_TOP, SEG_TOP_LEFT, SEG_MIDDLE, SEG_BOTTOM_RIGHT, SEG_BOTTOM, SEG_BOTTOM_LEFT],
        '7' => &[SEG_TOP, SEG_TOP_RIGHT, SEG_BOTTOM_RIGHT],
        '8' => &[
            SEG_TOP,
            SEG_TOP_RIGHT,
            SEG_BOTTOM_RIGHT,
            SEG_BOTTOM,
            SEG_BOTTOM_LEFT,
            SEG_TOP_LEFT,
            SEG_MIDDLE,
        ],
        '9' => &[SEG_TOP, SEG_TOP_RIGHT, SEG_BOTTOM_RIGHT, SEG_BOTTOM, SEG_TOP_LEFT, SEG_MIDDLE],
        _ => &[],
    }
}

/// Alpha-blends `color` over the pixel at `(x, y)`; out-of-bounds is a no-op.
fn blend(img: &mut RgbaImage, x: i32, y: i32, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for (channel, src) in px.0.iter_mut().take(3).zip(color) {
        let mixed = f32::from(*channel) * (1.0 - alpha) + f32::from(src) * alpha;
        *channel = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

fn stamp(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 3], alpha: f32) {
    let r = radius.max(0.5);
    let reach = r.ceil() as i32;
    let (ix, iy) = (cx.round() as i32, cy.round() as i32);
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (px, py) = (ix + dx, iy + dy);
            let dist = ((px as f32 - cx).powi(2) + (py as f32 - cy).powi(2)).sqrt();
            if dist <= r {
                blend(img, px, py, color, alpha);
            }
        }
    }
}

fn stroke_line(img: &mut RgbaImage, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 3]) {
    let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
    let steps = (length * 2.0).ceil().max(1.0) as usize;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        stamp(img, x, y, width / 2.0, color, 1.0);
    }
}

fn draw_glyph(img: &mut RgbaImage, digit: char, center: (f32, f32), size: f32, angle: f32, color: [u8; 3]) {
    let half_height = size * 0.4;
    let half_width = size * 0.25;
    let (sin, cos) = angle.sin_cos();
    let place = |(ux, uy): (f32, f32)| {
        let (x, y) = (ux * half_width * 2.0, uy * half_height);
        (center.0 + x * cos - y * sin, center.1 + x * sin + y * cos)
    };
    let width = (size / 8.0).max(2.0);

    for [a, b] in glyph_segments(digit) {
        stroke_line(img, place(*a), place(*b), width, color);
    }
}

fn cubic_bezier(p: [(f32, f32); 4], t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    (
        a * p[0].0 + b * p[1].0 + c * p[2].0 + d * p[3].0,
        a * p[0].1 + b * p[1].1 + c * p[2].1 + d * p[3].1,
    )
}

/// Renders `code` to an RGBA image.
pub fn render(code: &str) -> RgbaImage {
    let mut rng = rand::thread_rng();
    let (w, h) = (WIDTH as f32, HEIGHT as f32);
    let mut img = RgbaImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    for _ in 0..NOISE_DOTS {
        let x = rng.gen_range(0..WIDTH) as i32;
        let y = rng.gen_range(0..HEIGHT) as i32;
        blend(&mut img, x, y, [0, 0, 0], rng.gen_range(0.0..0.1));
    }

    for (i, digit) in code.chars().enumerate() {
        let size = rng.gen_range(20.0..30.0);
        let color = [
            rng.gen_range(0..100),
            rng.gen_range(0..100),
            rng.gen_range(155..255),
        ];
        let x = FIRST_GLYPH_X + i as f32 * GLYPH_ADVANCE;
        let y = h / 2.0 + rng.gen_range(-5.0..5.0);
        let angle = rng.gen_range(-0.2..0.2);
        draw_glyph(&mut img, digit, (x, y), size, angle, color);
    }

    for _ in 0..INTERFERENCE_LINES {
        let width: f32 = rng.gen_range(1.0..3.0);
        let color = [
            rng.gen_range(0..150),
            rng.gen_range(0..150),
            rng.gen_range(100..250),
        ];
        let points = [
            (rng.gen_range(0.0..30.0), rng.gen_range(0.0..h)),
            (w / 3.0 + rng.gen_range(0.0..30.0), rng.gen_range(0.0..h)),
            (w * 2.0 / 3.0 + rng.gen_range(0.0..30.0), rng.gen_range(0.0..h)),
            (w - rng.gen_range(0.0..30.0), rng.gen_range(0.0..h)),
        ];
        for step in 0..=200 {
            let (x, y) = cubic_bezier(points, step as f32 / 200.0);
            stamp(&mut img, x, y, width / 2.0, color, 0.5);
        }
    }

    img
}

pub fn render_png(code: &str) -> Result<Vec<u8>, CaptchaImageError> {
    let mut bytes = Vec::new();
    render(code).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `data:image/png;base64,...` for embedding in an `<img>` tag.
pub fn render_data_url(code: &str) -> Result<String, CaptchaImageError> {
    let png = render_png(code)?;
    Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png)))
}
