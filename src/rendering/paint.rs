//! Display list construction.
//!
//! Flattens laid-out blocks into paint commands in back-to-front order:
//! the background first, then each block's marks.

use crate::rendering::layout::{BlockKind, LayoutBlock, CHAR_W, LINE_H};
use crate::rendering::{Palette, Rgba};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    /// A run of greeked glyph cells
    Glyphs {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
    /// A decoded image, scaled into the destination rect
    Blit {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        source: String,
    },
}

pub fn build_display_list(
    blocks: &[LayoutBlock],
    palette: &Palette,
    canvas_width: u32,
    canvas_height: u32,
) -> Vec<PaintCommand> {
    let mut commands = Vec::with_capacity(blocks.len() + 1);
    commands.push(PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: canvas_width,
        height: canvas_height,
        rgba: palette.background,
    });

    for block in blocks {
        match &block.kind {
            BlockKind::Heading | BlockKind::Paragraph | BlockKind::ListItem => {
                if let BlockKind::ListItem = block.kind {
                    // Bullet mark in the indent gutter.
                    commands.push(PaintCommand::SolidRect {
                        x: block.rect.x - 10,
                        y: block.rect.y + 4,
                        width: 4,
                        height: 4,
                        rgba: palette.ink,
                    });
                }
                let line_h = (LINE_H * block.scale + 2) as i32;
                for (index, line) in block.text.lines().enumerate() {
                    commands.push(PaintCommand::Glyphs {
                        x: block.rect.x,
                        y: block.rect.y + index as i32 * line_h,
                        text: line.to_string(),
                        scale: block.scale,
                        rgba: palette.ink,
                    });
                }
                if let BlockKind::Heading = block.kind {
                    commands.push(PaintCommand::SolidRect {
                        x: block.rect.x,
                        y: block.rect.y + block.rect.height as i32 - 2,
                        width: block.rect.width.min(block.longest_line_px()),
                        height: 2,
                        rgba: palette.accent,
                    });
                }
            }
            BlockKind::Image { source } => {
                commands.push(PaintCommand::Blit {
                    x: block.rect.x,
                    y: block.rect.y,
                    width: block.rect.width,
                    height: block.rect.height,
                    source: source.clone(),
                });
            }
            BlockKind::ImagePlaceholder => {
                commands.push(PaintCommand::SolidRect {
                    x: block.rect.x,
                    y: block.rect.y,
                    width: block.rect.width,
                    height: block.rect.height,
                    rgba: palette.surface,
                });
            }
        }
    }
    commands
}

impl LayoutBlock {
    /// Pixel width of the widest wrapped line.
    fn longest_line_px(&self) -> u32 {
        self.text
            .lines()
            .map(|line| line.chars().count() as u32 * CHAR_W * self.scale)
            .max()
            .unwrap_or(0)
    }
}
