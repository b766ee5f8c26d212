//! page2pdf
//!
//! Capture a rendered page region as a raster image and export it as a
//! paginated PDF. The pipeline has two components: a capture backend that
//! turns a visible region into a pixel buffer, and a paginator that slices
//! that buffer into page-height bands and assembles an A4 document, one
//! band per page.
//!
//! # Features
//!
//! - **Native backend** (default): pure-Rust document fetch + region
//!   rasterizer, no external browser required
//! - **CDP backend**: element screenshots via headless Chrome
//! - **Modular design**: capture backends are swappable behind one trait
//!
//! # Example
//!
//! ```no_run
//! use page2pdf::{Capture, ExportConfig, Region};
//! use page2pdf::export::ExportJob;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut capture = page2pdf::new_capture(ExportConfig::default())?;
//! capture.load_url("https://example.com")?;
//!
//! let report = ExportJob::new(&mut capture)
//!     .run(&Region::Selector("main".to_string()), std::path::Path::new("resume.pdf"))?;
//! println!("{} page(s) written", report.pages);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Exports are independent: every per-export value (the captured image, the
//! page geometry, the document under construction) is freshly allocated and
//! exclusively owned by one invocation. Two exports running at the same time
//! share no mutable state.

pub mod error;
pub use error::{Error, Result};

#[cfg(feature = "cdp")]
pub mod cdp;

// Native backend: document fetch + pure-Rust region rasterizer
#[cfg(feature = "native")]
pub mod native;

// Layout, display list, and rasterizer used by the native backend
#[cfg(feature = "native")]
pub mod rendering;

pub mod document;
pub mod export;
pub mod paginate;
pub mod prefs;

// Async-friendly export API (worker-backed abstraction)
#[cfg(feature = "native")]
pub mod async_api;

// Re-export the Exporter type at the crate root for ergonomic use
#[cfg(feature = "native")]
pub use async_api::Exporter;

/// Configuration for a capture backend
///
/// The rendering options (`scale`, `allow_cross_origin`) are fixed at
/// construction time and apply to every capture taken by the backend; they
/// are not negotiated per call. The defaults match the export action this
/// crate was built for: 2x resolution and cross-origin images included.
///
/// # Examples
///
/// ```
/// let cfg = page2pdf::ExportConfig::default();
/// assert_eq!(cfg.scale, 2);
/// assert!(cfg.allow_cross_origin);
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// User agent string to send with requests
    pub user_agent: String,
    /// Viewport dimensions; the width fixes the region's layout width, the
    /// height is only a minimum; captured content may extend past it
    pub viewport: Viewport,
    /// Timeout for document and image fetches in milliseconds
    pub timeout_ms: u64,
    /// Resolution multiplier applied uniformly to the captured image
    pub scale: u32,
    /// Whether externally hosted images are fetched and included; when
    /// false they are left blank rather than failing the capture
    pub allow_cross_origin: bool,
    /// Palette used when rendering the region
    pub theme: prefs::Theme,
    /// Physical page size of the exported document
    pub page: PageFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) page2pdf/0.1".to_string(),
            viewport: Viewport::default(),
            timeout_ms: 30000,
            scale: 2,
            allow_cross_origin: true,
            theme: prefs::Theme::Light,
            page: PageFormat::a4(),
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Physical page size in millimetres, portrait orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageFormat {
    /// ISO A4 portrait
    pub const fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4()
    }
}

/// The region of the loaded document to capture
///
/// `Root` always resolves on a loaded document. `Selector` keeps the
/// lookup-by-query form; a selector that matches nothing fails with
/// [`Error::RegionNotFound`] before any rendering work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// The root content element of the document
    Root,
    /// The first element matched by a CSS selector, e.g. `"main"`
    Selector(String),
}

/// A captured raster image
///
/// Produced once by a capture backend, consumed by the paginator, and
/// discarded when the export completes. Width and height are guaranteed
/// non-zero.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: image::RgbaImage,
}

impl RasterImage {
    /// Wrap a pixel buffer, rejecting empty captures.
    pub fn new(pixels: image::RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::CaptureError(
                "capture produced an empty image".into(),
            ));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

/// Summary of a completed export
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportReport {
    /// Number of pages in the written document
    pub pages: usize,
    /// Captured image width in pixels
    pub image_width: u32,
    /// Captured image height in pixels
    pub image_height: u32,
    /// Size of the serialized document in bytes
    pub bytes_written: u64,
}

/// Core trait for capture backend implementations
pub trait Capture {
    /// Create a new backend instance with the given configuration
    fn new(config: ExportConfig) -> Result<Self>
    where
        Self: Sized;

    /// Load a document by URL and wait until it is ready to capture
    fn load_url(&mut self, url: &str) -> Result<()>;

    /// Load a document from an HTML string
    fn load_html(&mut self, html: &str) -> Result<()>;

    /// Render the given region of the loaded document as a raster image.
    ///
    /// Fails with [`Error::RegionNotFound`] when the region does not
    /// resolve, before any rendering is attempted, and with
    /// [`Error::CaptureError`] when rendering itself fails. Partial output
    /// is never returned.
    fn capture(&mut self, region: &Region) -> Result<RasterImage>;

    /// The configuration this backend was created with
    fn config(&self) -> &ExportConfig;

    /// Close the backend and clean up resources
    fn close(self) -> Result<()>;
}

// Prefer the native backend when the feature is enabled (it does not
// require Chrome).
#[cfg(feature = "native")]
pub fn new_capture(config: ExportConfig) -> Result<impl Capture> {
    native::NativeCapture::new(config)
}

// Fall back to CDP when the native backend is not enabled.
#[cfg(all(not(feature = "native"), feature = "cdp"))]
pub fn new_capture(config: ExportConfig) -> Result<impl Capture> {
    cdp::CdpCapture::new(config)
}
