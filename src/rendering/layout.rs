//! Block layout for captured regions.
//!
//! Stacks the region's blocks vertically at a fixed content width: headings
//! and paragraphs wrap on an estimated glyph width, list items indent,
//! images keep their intrinsic aspect ratio scaled to the content width.
//! The cursor never clips: the region's full height is laid out even when
//! it runs past the viewport.

use scraper::ElementRef;

use crate::rendering::ImageSet;
use crate::Viewport;

/// Estimated glyph advance in pixels at text scale 1
pub const CHAR_W: u32 = 8;
/// Line box height in pixels at text scale 1
pub const LINE_H: u32 = 8;
/// Outer margin around the region content
pub const MARGIN: u32 = 8;
/// Extra left inset for list items
const LIST_INDENT: u32 = 16;
/// Height of the placeholder box for images that were left blank
const PLACEHOLDER_H: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// What a laid-out block renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Heading text; `scale` on the block carries the size
    Heading,
    Paragraph,
    ListItem,
    /// An image with a decoded source in the [`ImageSet`]
    Image { source: String },
    /// An image that was left blank (no source, or cross-origin excluded)
    ImagePlaceholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBlock {
    pub rect: Rect,
    pub kind: BlockKind,
    /// Wrapped text, lines joined with `\n`; empty for images
    pub text: String,
    /// Text size multiple (1 = body text)
    pub scale: u32,
}

/// Wrap text into lines of at most `chars_per_line` glyphs, breaking on
/// whitespace.
fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > chars_per_line
        {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Cursor<'a> {
    blocks: Vec<LayoutBlock>,
    images: &'a ImageSet,
    content_width: u32,
    y: u32,
}

impl<'a> Cursor<'a> {
    fn push_text(&mut self, text: &str, kind: BlockKind, scale: u32, indent: u32) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let width = self.content_width.saturating_sub(indent);
        let chars_per_line = (width / (CHAR_W * scale)).max(1) as usize;
        let lines = wrap_text(trimmed, chars_per_line);
        let line_h = LINE_H * scale + 2;
        let height = lines.len() as u32 * line_h + 4;

        self.blocks.push(LayoutBlock {
            rect: Rect {
                x: (MARGIN + indent) as i32,
                y: self.y as i32,
                width,
                height,
            },
            kind,
            text: lines.join("\n"),
            scale,
        });
        self.y += height + 6;
    }

    fn push_image(&mut self, source: Option<&str>) {
        let (kind, width, height) = match source.and_then(|s| self.images.get(s).map(|i| (s, i))) {
            Some((src, pixels)) => {
                // Fit to content width, keep the intrinsic aspect ratio.
                let width = pixels.width().min(self.content_width);
                let height =
                    ((pixels.height() as u64 * width as u64) / pixels.width() as u64).max(1) as u32;
                (
                    BlockKind::Image {
                        source: src.to_string(),
                    },
                    width,
                    height,
                )
            }
            None => (BlockKind::ImagePlaceholder, self.content_width, PLACEHOLDER_H),
        };

        self.blocks.push(LayoutBlock {
            rect: Rect {
                x: MARGIN as i32,
                y: self.y as i32,
                width,
                height,
            },
            kind,
            text: String::new(),
            scale: 1,
        });
        self.y += height + 6;
    }

    fn walk(&mut self, element: ElementRef) {
        for child in element.children() {
            let Some(el) = ElementRef::wrap(child) else {
                continue;
            };
            match el.value().name() {
                "h1" => self.push_text(&el.text().collect::<String>(), BlockKind::Heading, 3, 0),
                "h2" | "h3" | "h4" => {
                    self.push_text(&el.text().collect::<String>(), BlockKind::Heading, 2, 0)
                }
                "p" => self.push_text(&el.text().collect::<String>(), BlockKind::Paragraph, 1, 0),
                "li" => self.push_text(
                    &el.text().collect::<String>(),
                    BlockKind::ListItem,
                    1,
                    LIST_INDENT,
                ),
                "img" => self.push_image(el.value().attr("src")),
                // Invisible subtrees
                "script" | "style" | "head" => {}
                _ => {
                    if el.children().any(|c| ElementRef::wrap(c).is_some()) {
                        self.walk(el);
                    } else {
                        self.push_text(
                            &el.text().collect::<String>(),
                            BlockKind::Paragraph,
                            1,
                            0,
                        );
                    }
                }
            }
        }
    }
}

/// Lay out the region subtree. Returns the blocks and the content height in
/// CSS pixels; the height never falls below the viewport's.
pub fn layout_region(
    region: ElementRef,
    images: &ImageSet,
    viewport: Viewport,
) -> (Vec<LayoutBlock>, u32) {
    let mut cursor = Cursor {
        blocks: Vec::new(),
        images,
        content_width: viewport.width.saturating_sub(MARGIN * 2).max(CHAR_W),
        y: MARGIN,
    };
    cursor.walk(region);

    let height = (cursor.y + MARGIN).max(viewport.height);
    (cursor.blocks, height)
}
