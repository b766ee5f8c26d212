//! Document assembly: the sink the paginator writes pages into.
//!
//! A [`DocumentSink`] starts with one implicit page. `add_page` opens the
//! next page; `place_image` puts an encoded slice on the current page,
//! anchored to the top-left corner at full page width. [`PdfSink`] builds
//! the real PDF; [`RecordingSink`] records the operation sequence and is
//! used by unit tests and dry runs.

use image::codecs::jpeg::JpegEncoder;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Px,
};

use crate::paginate::PageGeometry;
use crate::{Error, RasterImage, Result};

/// JPEG quality for embedded page images. Deliberately just below maximum;
/// trades file size for fidelity.
const JPEG_QUALITY: u8 = 98;

/// Encode a horizontal band of the captured image as a standalone JPEG.
pub fn encode_page_jpeg(image: &RasterImage, offset: u32, height: u32) -> Result<Vec<u8>> {
    let band = image::imageops::crop_imm(image.pixels(), 0, offset, image.width(), height)
        .to_image();
    // JPEG has no alpha channel; captures are fully opaque anyway.
    let rgb = image::DynamicImage::ImageRgba8(band).to_rgb8();

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| Error::SerializationError(format!("JPEG encoding failed: {}", e)))?;
    Ok(out)
}

/// Where the paginator appends pages.
pub trait DocumentSink {
    /// Open the next page. The first page exists from document creation and
    /// never goes through this call.
    fn add_page(&mut self) -> Result<()>;

    /// Place an encoded slice on the current page: top-left corner, full
    /// page width, `height_mm` tall.
    fn place_image(&mut self, jpeg: &[u8], width_px: u32, height_px: u32, height_mm: f32)
        -> Result<()>;
}

/// PDF-building sink over printpdf.
pub struct PdfSink {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    page_width: f32,
    page_height: f32,
    dpi: f32,
    pages: usize,
}

impl PdfSink {
    /// Create a document with its first (implicit) page.
    pub fn new(title: &str, geometry: &PageGeometry) -> Self {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(geometry.page_width),
            Mm(geometry.page_height),
            "page 1",
        );
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            page_width: geometry.page_width,
            page_height: geometry.page_height,
            // The fixed pixel-per-millimetre ratio, expressed the way the
            // PDF placement call wants it.
            dpi: geometry.ratio * 25.4,
            pages: 1,
        }
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Serialize the document. Called exactly once, after the last page.
    pub fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| Error::SerializationError(format!("PDF serialization failed: {}", e)))
    }
}

impl DocumentSink for PdfSink {
    fn add_page(&mut self) -> Result<()> {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.page_width),
            Mm(self.page_height),
            format!("page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        Ok(())
    }

    fn place_image(
        &mut self,
        jpeg: &[u8],
        width_px: u32,
        height_px: u32,
        height_mm: f32,
    ) -> Result<()> {
        let xobject = ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: jpeg.to_vec(),
            image_filter: Some(ImageFilter::DCT),
            smask: None,
            clipping_bbox: None,
        };
        // PDF origin is bottom-left; anchor the slice to the page's top edge.
        let transform = ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(self.page_height - height_mm)),
            dpi: Some(self.dpi),
            ..Default::default()
        };
        Image::from(xobject).add_to_layer(self.layer.clone(), transform);
        Ok(())
    }
}

/// One recorded sink operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    AddPage,
    Place { height_px: u32, height_mm: f32 },
}

/// A sink that records operations instead of building a PDF.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page count implied by the recorded operations (one implicit page
    /// plus every `add_page`).
    pub fn pages(&self) -> usize {
        1 + self
            .ops
            .iter()
            .filter(|op| matches!(op, SinkOp::AddPage))
            .count()
    }
}

impl DocumentSink for RecordingSink {
    fn add_page(&mut self) -> Result<()> {
        self.ops.push(SinkOp::AddPage);
        Ok(())
    }

    fn place_image(
        &mut self,
        _jpeg: &[u8],
        _width_px: u32,
        height_px: u32,
        height_mm: f32,
    ) -> Result<()> {
        self.ops.push(SinkOp::Place {
            height_px,
            height_mm,
        });
        Ok(())
    }
}
