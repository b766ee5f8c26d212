//! Native capture backend: fetch a document, resolve the region, render it
//! to pixels without an external browser.
//!
//! The backend keeps the last loaded document and renders on demand. Region
//! resolution happens before any rendering work, so a missing region never
//! costs a layout pass. Referenced images are fetched through one shared
//! HTTP client, decoded up front, and handed to the rasterizer; a fetch or
//! decode failure aborts the capture rather than producing partial output.

use std::sync::OnceLock;
use std::time::Duration;

use base64::Engine as Base64Engine;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::rendering::{layout, paint, raster, ImageSet, Palette};
use crate::{Capture, Error, ExportConfig, RasterImage, Region, Result};

static IMG_SELECTOR: OnceLock<Selector> = OnceLock::new();
static BODY_SELECTOR: OnceLock<Selector> = OnceLock::new();

/// Compile the shared selectors. Runs at most once per process, before
/// first use; [`crate::export::ensure_ready`] calls this eagerly.
pub(crate) fn ensure_selectors() {
    let _ = img_selector();
    let _ = body_selector();
}

fn img_selector() -> &'static Selector {
    IMG_SELECTOR.get_or_init(|| Selector::parse("img").unwrap())
}

fn body_selector() -> &'static Selector {
    BODY_SELECTOR.get_or_init(|| Selector::parse("body").unwrap())
}

/// Pure-Rust capture backend.
pub struct NativeCapture {
    client: Client,
    config: ExportConfig,
    last_html: Option<String>,
    last_url: Option<String>,
}

impl NativeCapture {
    fn fetch_images(&self, region: ElementRef) -> Result<ImageSet> {
        let mut set = ImageSet::new();
        for img in region.select(img_selector()) {
            let Some(src) = img.value().attr("src") else {
                continue;
            };
            if set.contains_key(src) {
                continue;
            }
            if let Some(pixels) = self.fetch_image(src)? {
                set.insert(src.to_string(), pixels);
            }
        }
        Ok(set)
    }

    /// Fetch and decode one referenced image. `Ok(None)` means the image is
    /// deliberately left blank (cross-origin inclusion disabled, or no way
    /// to resolve the reference); any fetch or decode failure is an error.
    fn fetch_image(&self, src: &str) -> Result<Option<image::RgbaImage>> {
        if let Some(rest) = src.strip_prefix("data:") {
            let payload = rest
                .split_once("base64,")
                .ok_or_else(|| Error::CaptureError(format!("unsupported data URI: {}", src)))?
                .1;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| Error::CaptureError(format!("invalid data URI: {}", e)))?;
            return Ok(Some(decode_image(&bytes, src)?));
        }

        let base = self
            .last_url
            .as_deref()
            .and_then(|b| Url::parse(b).ok());
        let resolved = match &base {
            Some(base) => base
                .join(src)
                .map_err(|e| Error::CaptureError(format!("bad image URL {}: {}", src, e)))?,
            None => match Url::parse(src) {
                Ok(url) => url,
                // Relative reference with no document URL: leave it blank.
                Err(_) => return Ok(None),
            },
        };

        if !self.config.allow_cross_origin {
            let same_origin = base
                .as_ref()
                .map(|b| b.origin() == resolved.origin())
                .unwrap_or(false);
            if !same_origin {
                return Ok(None);
            }
        }

        let bytes = self
            .client
            .get(resolved.clone())
            .header("User-Agent", self.config.user_agent.clone())
            .send()
            .and_then(|res| res.error_for_status())
            .map_err(|e| Error::CaptureError(format!("image fetch failed for {}: {}", resolved, e)))?
            .bytes()
            .map_err(|e| Error::CaptureError(format!("image read failed for {}: {}", resolved, e)))?;

        Ok(Some(decode_image(&bytes, resolved.as_str())?))
    }
}

fn decode_image(bytes: &[u8], source: &str) -> Result<image::RgbaImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::CaptureError(format!("image decode failed for {}: {}", source, e)))?;
    Ok(decoded.to_rgba8())
}

impl Capture for NativeCapture {
    fn new(config: ExportConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            last_html: None,
            last_url: None,
        })
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        let res = self
            .client
            .get(url)
            .header("User-Agent", self.config.user_agent.clone())
            .send()
            .map_err(|e| Error::LoadError(format!("HTTP GET failed: {}", e)))?;

        let body = res
            .text()
            .map_err(|e| Error::LoadError(format!("Failed to read response body: {}", e)))?;

        self.last_html = Some(body);
        self.last_url = Some(url.to_string());
        Ok(())
    }

    fn load_html(&mut self, html: &str) -> Result<()> {
        self.last_html = Some(html.to_string());
        self.last_url = None;
        Ok(())
    }

    fn capture(&mut self, region: &Region) -> Result<RasterImage> {
        let html = self
            .last_html
            .as_ref()
            .ok_or_else(|| Error::CaptureError("no document loaded".into()))?;
        let document = Html::parse_document(html);

        // Resolve the region first; a miss must not start any rendering.
        let element = match region {
            Region::Root => document
                .select(body_selector())
                .next()
                .unwrap_or_else(|| document.root_element()),
            Region::Selector(query) => {
                let selector = Selector::parse(query).map_err(|_| {
                    Error::ConfigError(format!("invalid region selector: {}", query))
                })?;
                document
                    .select(&selector)
                    .next()
                    .ok_or_else(|| Error::RegionNotFound(query.clone()))?
            }
        };

        let images = self.fetch_images(element)?;
        let palette = Palette::for_theme(self.config.theme);

        let (blocks, content_height) =
            layout::layout_region(element, &images, self.config.viewport);
        log::debug!(
            "capture: {} block(s), {}x{} css px at {}x",
            blocks.len(),
            self.config.viewport.width,
            content_height,
            self.config.scale
        );

        let commands = paint::build_display_list(
            &blocks,
            &palette,
            self.config.viewport.width,
            content_height,
        );
        let pixels = raster::rasterize(
            &commands,
            &images,
            self.config.viewport.width,
            content_height,
            self.config.scale,
        );
        RasterImage::new(pixels)
    }

    fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
