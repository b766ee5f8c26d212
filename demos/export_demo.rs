//! Minimal end-to-end demo: serve a page, capture its main region, and
//! write the paginated PDF (feature: `native`)
//!
//! Run with: cargo run --example export_demo

use page2pdf::export::{ExportJob, OUTPUT_FILENAME};
use page2pdf::{Capture, ExportConfig, Region};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("page2pdf - Minimal Export Demo\n");

    // Use a tiny HTTP server to provide deterministic content for the demo
    let server = tiny_http::Server::http("0.0.0.0:0").unwrap();
    let addr = server.server_addr();

    std::thread::spawn(move || {
        if let Ok(req) = server.recv() {
            let html = r#"<html><head><title>Demo</title></head><body>
<main>
  <h1>Ada Example</h1>
  <p>Systems engineer. Builds capture pipelines and document tooling.</p>
  <h2>Projects</h2>
  <ul>
    <li>page2pdf - region capture to paginated PDF</li>
    <li>tinyserve - deterministic test fixtures</li>
  </ul>
  <h2>Contact</h2>
  <p>ada@example.com</p>
</main>
</body></html>"#;
            let _ = req.respond(tiny_http::Response::from_string(html));
        }
    });

    let url = format!("http://{}", addr);
    println!("Loading: {}", url);

    let mut capture = page2pdf::new_capture(ExportConfig::default())?;
    capture.load_url(&url)?;

    let report = ExportJob::new(&mut capture).run(
        &Region::Selector("main".to_string()),
        std::path::Path::new(OUTPUT_FILENAME),
    )?;
    println!(
        "Wrote {} page(s), {}x{} px capture, {} bytes -> {}",
        report.pages, report.image_width, report.image_height, report.bytes_written, OUTPUT_FILENAME
    );

    capture.close()?;
    Ok(())
}
