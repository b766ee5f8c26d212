//! Pagination: slice a captured image into page-height bands.
//!
//! All height conversions between pixels and millimetres use one ratio,
//! derived once per export from the image width and the physical page
//! width. Slices are produced top to bottom, never overlap, and cover the
//! image height exactly.

use crate::document::{encode_page_jpeg, DocumentSink};
use crate::{PageFormat, RasterImage, Result};

/// Physical page size plus the pixel-per-millimetre ratio of one export.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    /// Page width in millimetres
    pub page_width: f32,
    /// Page height in millimetres
    pub page_height: f32,
    /// Pixels per millimetre, fixed for the whole document
    pub ratio: f32,
}

impl PageGeometry {
    /// Derive the geometry for one export from the captured image width.
    pub fn new(format: PageFormat, image_width: u32) -> Self {
        Self {
            page_width: format.width_mm,
            page_height: format.height_mm,
            ratio: image_width as f32 / format.width_mm,
        }
    }

    /// Full page height expressed in image pixels.
    pub fn page_height_px(&self) -> u32 {
        (self.page_height * self.ratio).round() as u32
    }

    /// Convert a pixel height to millimetres.
    pub fn to_units(&self, px: u32) -> f32 {
        px as f32 / self.ratio
    }
}

/// A horizontal band of the captured image, one output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// Vertical offset into the image, in pixels
    pub offset: u32,
    /// Band height in pixels, never zero
    pub height: u32,
}

/// Split an image height into page-sized bands.
///
/// The final band may be shorter than a page; it still becomes its own
/// page, unpadded and unmerged.
pub fn compute_slices(image_height: u32, page_height_px: u32) -> Vec<PageSlice> {
    debug_assert!(page_height_px > 0);
    let mut slices = Vec::new();
    let mut offset = 0u32;
    while offset < image_height {
        let height = page_height_px.min(image_height - offset);
        slices.push(PageSlice { offset, height });
        offset += height;
    }
    slices
}

/// Lay the captured image out across pages, appending each band to `sink`
/// in order. Returns the page count.
///
/// When the whole image fits one page it is placed as-is and no slicing
/// runs. Otherwise the first band lands on the sink's implicit first page
/// and every later band opens its page immediately before placement,
/// never after, so the document cannot end on a blank page.
pub fn paginate<S: DocumentSink>(
    image: &RasterImage,
    geometry: &PageGeometry,
    sink: &mut S,
) -> Result<usize> {
    let image_height_units = geometry.to_units(image.height());

    if image_height_units <= geometry.page_height {
        let jpeg = encode_page_jpeg(image, 0, image.height())?;
        sink.place_image(&jpeg, image.width(), image.height(), image_height_units)?;
        return Ok(1);
    }

    let slices = compute_slices(image.height(), geometry.page_height_px());
    for (index, slice) in slices.iter().enumerate() {
        if index > 0 {
            sink.add_page()?;
        }
        let jpeg = encode_page_jpeg(image, slice.offset, slice.height)?;
        sink.place_image(
            &jpeg,
            image.width(),
            slice.height,
            geometry.to_units(slice.height),
        )?;
    }
    Ok(slices.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RecordingSink, SinkOp};

    fn image(width: u32, height: u32) -> RasterImage {
        let buf = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        RasterImage::new(buf).unwrap()
    }

    #[test]
    fn slice_count_and_coverage() {
        for &(h, p) in &[
            (1u32, 1u32),
            (10, 3),
            (100, 100),
            (101, 100),
            (2261, 2261),
            (3400, 2262),
            (9999, 1169),
            (50_000, 2262),
        ] {
            let slices = compute_slices(h, p);
            let expected = (h as u64 + p as u64 - 1) / p as u64;
            assert_eq!(slices.len() as u64, expected, "count for h={} p={}", h, p);

            let sum: u32 = slices.iter().map(|s| s.height).sum();
            assert_eq!(sum, h, "coverage for h={} p={}", h, p);
            assert!(slices.iter().all(|s| s.height > 0));

            // Bands are contiguous and ordered top to bottom.
            let mut offset = 0;
            for s in &slices {
                assert_eq!(s.offset, offset);
                offset += s.height;
            }
        }
    }

    #[test]
    fn single_page_fast_path_never_slices() {
        // 800 px wide on a 210 mm page: one page holds round(297 * 800/210)
        // = 1131 px of content.
        let img = image(800, 900);
        let geometry = PageGeometry::new(crate::PageFormat::a4(), img.width());
        let mut sink = RecordingSink::new();

        let pages = paginate(&img, &geometry, &mut sink).unwrap();
        assert_eq!(pages, 1);
        assert_eq!(sink.pages(), 1);
        // Exactly one placement, full image height, no add_page before it.
        assert_eq!(sink.ops.len(), 1);
        assert_eq!(
            sink.ops[0],
            SinkOp::Place {
                height_px: 900,
                height_mm: geometry.to_units(900),
            }
        );
    }

    #[test]
    fn multi_page_adds_before_each_placement() {
        let img = image(800, 4000);
        let geometry = PageGeometry::new(crate::PageFormat::a4(), img.width());
        let page_px = geometry.page_height_px();
        let expected_pages = ((4000 + page_px - 1) / page_px) as usize;
        assert!(expected_pages > 1);

        let mut sink = RecordingSink::new();
        let pages = paginate(&img, &geometry, &mut sink).unwrap();
        assert_eq!(pages, expected_pages);
        assert_eq!(sink.pages(), expected_pages);

        // N pages: N placements and N-1 add_page ops, each add immediately
        // before its placement; the sequence starts with the implicit
        // first page's placement and never ends on an add.
        let adds = sink
            .ops
            .iter()
            .filter(|op| matches!(op, SinkOp::AddPage))
            .count();
        assert_eq!(adds, expected_pages - 1);
        assert!(matches!(sink.ops[0], SinkOp::Place { .. }));
        assert!(matches!(sink.ops.last().unwrap(), SinkOp::Place { .. }));
        for pair in sink.ops.windows(2) {
            if let SinkOp::AddPage = pair[0] {
                assert!(matches!(pair[1], SinkOp::Place { .. }));
            }
        }

        // Placements cover the image height exactly.
        let placed: u32 = sink
            .ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Place { height_px, .. } => Some(*height_px),
                _ => None,
            })
            .sum();
        assert_eq!(placed, 4000);
    }

    #[test]
    fn ratio_is_constant_across_slices() {
        let img = image(800, 4000);
        let geometry = PageGeometry::new(crate::PageFormat::a4(), img.width());
        let mut sink = RecordingSink::new();
        paginate(&img, &geometry, &mut sink).unwrap();

        for op in &sink.ops {
            if let SinkOp::Place {
                height_px,
                height_mm,
            } = op
            {
                // Every placement converts with the same ratio.
                let back = height_mm * geometry.ratio;
                assert!((back - *height_px as f32).abs() < 0.01);
            }
        }
    }

    #[test]
    fn reference_scenario_1600x3400() {
        // 1600x3400 px image on a 827x1169 unit page (the page expressed in
        // the same unit family as the ratio): two pages, heights summing to
        // the full image height.
        let format = crate::PageFormat {
            width_mm: 827.0,
            height_mm: 1169.0,
        };
        let geometry = PageGeometry::new(format, 1600);
        assert!((geometry.ratio - 1600.0 / 827.0).abs() < 1e-4);

        let page_px = geometry.page_height_px();
        assert_eq!(page_px, 2262);

        let slices = compute_slices(3400, page_px);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0], PageSlice { offset: 0, height: 2262 });
        assert_eq!(
            slices[1],
            PageSlice {
                offset: 2262,
                height: 1138
            }
        );
        assert_eq!(slices[0].height + slices[1].height, 3400);
    }
}
