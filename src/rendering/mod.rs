//! Region rendering for the native backend.
//!
//! Three stages: block layout over the region subtree ([`layout`]), a flat
//! display list ([`paint`]), and rasterization to an RGBA buffer
//! ([`raster`]). The output only needs faithful geometry, so text is greeked
//! (one filled cell per glyph) rather than shaped.

pub mod layout;
pub mod paint;
pub mod raster;

use std::collections::HashMap;

use crate::prefs::Theme;

/// RGBA color
pub type Rgba = [u8; 4];

/// Decoded images referenced by the region, keyed by their `src` value.
pub type ImageSet = HashMap<String, image::RgbaImage>;

/// Colors used when rendering a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub surface: Rgba,
    pub ink: Rgba,
    pub accent: Rgba,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: [255, 255, 255, 255],
                surface: [243, 244, 246, 255],
                ink: [31, 41, 55, 255],
                accent: [79, 70, 229, 255],
            },
            Theme::Dark => Self {
                background: [17, 24, 39, 255],
                surface: [31, 41, 55, 255],
                ink: [229, 231, 235, 255],
                accent: [129, 140, 248, 255],
            },
        }
    }
}
