//! Rasterizer: paint commands to an RGBA buffer.
//!
//! All geometry arrives in CSS pixels and is multiplied by the capture
//! scale here, so a 2x capture rasterizes every mark at doubled size
//! rather than upsampling a 1x canvas.

use image::{imageops, Rgba, RgbaImage};

use crate::rendering::layout::{CHAR_W, LINE_H};
use crate::rendering::paint::PaintCommand;
use crate::rendering::ImageSet;

fn fill_rect(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, rgba: [u8; 4]) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x + width as i32).clamp(0, canvas.width() as i32) as u32;
    let y1 = (y + height as i32).clamp(0, canvas.height() as i32) as u32;
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, Rgba(rgba));
        }
    }
}

/// Greek a run of text: one filled cell per non-space glyph.
fn fill_glyphs(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, cell: u32, rgba: [u8; 4]) {
    let inset = (cell / 8).max(1);
    for (index, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let gx = x + (index as u32 * cell) as i32 + inset as i32;
        fill_rect(
            canvas,
            gx,
            y + inset as i32,
            cell - inset * 2,
            cell - inset * 2,
            rgba,
        );
    }
}

/// Rasterize a display list onto a fresh canvas of
/// `width * scale` x `height * scale` pixels.
pub fn rasterize(
    commands: &[PaintCommand],
    images: &ImageSet,
    width: u32,
    height: u32,
    scale: u32,
) -> RgbaImage {
    let scale = scale.max(1);
    let mut canvas = RgbaImage::from_pixel(
        width * scale,
        height * scale,
        Rgba([255, 255, 255, 255]),
    );

    for command in commands {
        match command {
            PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
            } => {
                fill_rect(
                    &mut canvas,
                    x * scale as i32,
                    y * scale as i32,
                    width * scale,
                    height * scale,
                    *rgba,
                );
            }
            PaintCommand::Glyphs {
                x,
                y,
                text,
                scale: text_scale,
                rgba,
            } => {
                debug_assert_eq!(CHAR_W, LINE_H);
                let cell = CHAR_W * text_scale * scale;
                fill_glyphs(
                    &mut canvas,
                    x * scale as i32,
                    y * scale as i32,
                    text,
                    cell,
                    *rgba,
                );
            }
            PaintCommand::Blit {
                x,
                y,
                width,
                height,
                source,
            } => {
                if let Some(pixels) = images.get(source) {
                    let resized = imageops::resize(
                        pixels,
                        width * scale,
                        height * scale,
                        imageops::FilterType::Triangle,
                    );
                    imageops::overlay(
                        &mut canvas,
                        &resized,
                        (x * scale as i32) as i64,
                        (y * scale as i32) as i64,
                    );
                }
            }
        }
    }
    canvas
}
