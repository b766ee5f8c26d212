//! Chrome DevTools Protocol capture backend (uses the `headless_chrome`
//! crate).
//!
//! Launches a headless Chrome instance, manages a single tab, and captures
//! the region as an element screenshot. Useful when the document relies on
//! styling or scripts the native renderer does not model.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};

use crate::{Capture, Error, ExportConfig, RasterImage, Region, Result};

/// CDP-based capture backend.
pub struct CdpCapture {
    browser: Browser,
    tab: Arc<Tab>,
    config: ExportConfig,
}

impl Capture for CdpCapture {
    fn new(config: ExportConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| Error::InitializationError(format!("Failed to set user agent: {}", e)))?;

        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        // Let late-loading images settle before any capture
        std::thread::sleep(Duration::from_millis(500));
        Ok(())
    }

    fn load_html(&mut self, html: &str) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(html);
        self.load_url(&format!("data:text/html;base64,{}", encoded))
    }

    fn capture(&mut self, region: &Region) -> Result<RasterImage> {
        // TODO: drive Emulation.setDeviceMetricsOverride so config.scale is
        // honored; element captures are taken at device scale 1 until then.
        let selector = match region {
            Region::Root => "body",
            Region::Selector(query) => query.as_str(),
        };

        let element = self
            .tab
            .wait_for_element(selector)
            .map_err(|_| Error::RegionNotFound(selector.to_string()))?;

        let png = element
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png)
            .map_err(|e| Error::CaptureError(format!("Screenshot failed: {}", e)))?;

        let pixels = image::load_from_memory(&png)
            .map_err(|e| Error::CaptureError(format!("Screenshot decode failed: {}", e)))?
            .to_rgba8();
        RasterImage::new(pixels)
    }

    fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn close(self) -> Result<()> {
        drop(self.browser);
        Ok(())
    }
}
