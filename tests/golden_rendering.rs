//! Determinism and palette checks for the native renderer

#![cfg(feature = "native")]

use page2pdf::prefs::Theme;
use page2pdf::{Capture, ExportConfig, Region};
use sha2::{Digest, Sha256};

const PAGE: &str = "<html><head><title>t</title></head><body>\
    <main><h1>Heading</h1><p>Body text that wraps across a couple of lines \
    when the content width is narrow enough.</p><ul><li>alpha</li>\
    <li>beta</li></ul></main></body></html>";

fn digest(image: &page2pdf::RasterImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.pixels().as_raw());
    hex::encode(hasher.finalize())
}

#[test]
fn capture_is_deterministic() {
    let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
    capture.load_html(PAGE).unwrap();

    let region = Region::Selector("main".to_string());
    let first = capture.capture(&region).unwrap();
    let second = capture.capture(&region).unwrap();

    assert_eq!(first.width(), second.width());
    assert_eq!(first.height(), second.height());
    assert_eq!(digest(&first), digest(&second));
}

#[test]
fn theme_selects_the_palette() {
    let light = {
        let mut capture = page2pdf::new_capture(ExportConfig {
            theme: Theme::Light,
            ..Default::default()
        })
        .unwrap();
        capture.load_html(PAGE).unwrap();
        capture.capture(&Region::Selector("main".to_string())).unwrap()
    };
    let dark = {
        let mut capture = page2pdf::new_capture(ExportConfig {
            theme: Theme::Dark,
            ..Default::default()
        })
        .unwrap();
        capture.load_html(PAGE).unwrap();
        capture.capture(&Region::Selector("main".to_string())).unwrap()
    };

    // Top-left corner carries the background fill.
    assert_eq!(light.pixels().get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(dark.pixels().get_pixel(0, 0).0, [17, 24, 39, 255]);

    // Same geometry either way; only the colors differ.
    assert_eq!(light.width(), dark.width());
    assert_eq!(light.height(), dark.height());
    assert_ne!(digest(&light), digest(&dark));
}
