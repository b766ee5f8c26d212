//! Integration tests for the export pipeline

#![cfg(feature = "native")]

use std::sync::Once;

use page2pdf::export::ExportJob;
use page2pdf::{Capture, Error, ExportConfig, Region};
use tiny_http::{Header, Response, Server};

static INIT: Once = Once::new();

fn sample_page(paragraphs: usize, image_src: Option<&str>) -> String {
    let mut body = String::from("<main><h1>Quarterly Report</h1>");
    if let Some(src) = image_src {
        body.push_str(&format!("<img src=\"{}\">", src));
    }
    for index in 0..paragraphs {
        body.push_str(&format!("<p>Paragraph number {} of the report.</p>", index));
    }
    body.push_str("</main>");
    format!(
        "<!DOCTYPE html><html><head><title>Report</title></head><body>{}</body></html>",
        body
    )
}

fn photo_png() -> Vec<u8> {
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        64,
        48,
        image::Rgba([120, 90, 60, 255]),
    ))
    .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
    .unwrap();
    out
}

/// Start a simple test HTTP server
fn start_test_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18090").unwrap();
            for request in server.incoming_requests() {
                let path = request.url().to_string();
                let html_header = "Content-Type: text/html; charset=utf-8"
                    .parse::<Header>()
                    .unwrap();
                let response = match path.as_str() {
                    "/" => Response::from_string(sample_page(100, Some("/photo.png")))
                        .with_header(html_header),
                    "/short" => {
                        Response::from_string(sample_page(2, None)).with_header(html_header)
                    }
                    "/broken" => Response::from_string(sample_page(2, Some("/missing.png")))
                        .with_header(html_header),
                    "/photo.png" => Response::from_data(photo_png())
                        .with_header("Content-Type: image/png".parse::<Header>().unwrap()),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        // Give the server time to start
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    "http://127.0.0.1:18090".to_string()
}

fn expected_pages(image_width: u32, image_height: u32) -> usize {
    let format = page2pdf::PageFormat::a4();
    let ratio = image_width as f32 / format.width_mm;
    let page_px = (format.height_mm * ratio).round() as u32;
    ((image_height + page_px - 1) / page_px) as usize
}

#[test]
fn long_page_exports_multiple_pages() {
    let base = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");

    let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
    capture.load_url(&base).unwrap();
    let report = ExportJob::new(&mut capture)
        .run(&Region::Selector("main".to_string()), &out)
        .unwrap();

    assert!(report.pages >= 2, "expected a multi-page export");
    assert_eq!(
        report.pages,
        expected_pages(report.image_width, report.image_height)
    );

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len() as u64, report.bytes_written);
}

#[test]
fn short_page_exports_one_page() {
    let base = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");

    let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
    capture.load_url(&format!("{}/short", base)).unwrap();
    let report = ExportJob::new(&mut capture)
        .run(&Region::Selector("main".to_string()), &out)
        .unwrap();

    assert_eq!(report.pages, 1);
    assert!(out.exists());
}

#[test]
fn served_images_are_included() {
    let base = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");

    let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
    capture.load_url(&base).unwrap();
    // The page references /photo.png on the same origin; the export must
    // fetch and embed it without error.
    let report = ExportJob::new(&mut capture)
        .run(&Region::Selector("main".to_string()), &out)
        .unwrap();
    assert!(report.pages >= 1);
}

#[test]
fn broken_image_aborts_the_export() {
    let base = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");

    let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
    capture.load_url(&format!("{}/broken", base)).unwrap();
    let result = ExportJob::new(&mut capture).run(&Region::Selector("main".to_string()), &out);

    match result {
        Err(Error::CaptureError(_)) => {}
        other => panic!("expected CaptureError, got {:?}", other),
    }
    assert!(!out.exists(), "no partial document may be written");
}

#[test]
fn missing_region_aborts_before_capture() {
    let base = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resume.pdf");

    let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
    capture.load_url(&format!("{}/short", base)).unwrap();
    let result =
        ExportJob::new(&mut capture).run(&Region::Selector("#absent".to_string()), &out);

    match result {
        Err(Error::RegionNotFound(_)) => {}
        other => panic!("expected RegionNotFound, got {:?}", other),
    }
    assert!(!out.exists());
}

#[test]
fn concurrent_exports_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let out_a = dir.path().join("a.pdf");
    let out_b = dir.path().join("b.pdf");

    let handle_a = {
        let out = out_a.clone();
        std::thread::spawn(move || {
            let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
            capture.load_html(&sample_page(2, None)).unwrap();
            ExportJob::new(&mut capture)
                .run(&Region::Selector("main".to_string()), &out)
                .unwrap()
        })
    };
    let handle_b = {
        let out = out_b.clone();
        std::thread::spawn(move || {
            let mut capture = page2pdf::new_capture(ExportConfig::default()).unwrap();
            capture.load_html(&sample_page(150, None)).unwrap();
            ExportJob::new(&mut capture)
                .run(&Region::Selector("main".to_string()), &out)
                .unwrap()
        })
    };

    let report_a = handle_a.join().unwrap();
    let report_b = handle_b.join().unwrap();

    assert_eq!(report_a.pages, 1);
    assert!(report_b.pages > report_a.pages);
    assert!(out_a.exists());
    assert!(out_b.exists());
}
