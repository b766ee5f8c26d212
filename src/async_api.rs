//! Async-friendly export API backed by a dedicated worker thread.
//!
//! The worker thread owns a synchronous [`NativeCapture`] instance and
//! executes commands sent from async tasks, so callers get an async
//! interface without requiring the backend to be `Send` across threads.
//! The calling flow suspends while a command runs; capture and pagination
//! never interleave with other work of the same export.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;

use tokio::sync::oneshot;

use crate::export::ExportJob;
use crate::native::NativeCapture;
use crate::{Capture, Error, ExportConfig, ExportReport, Region, Result};

enum Command {
    LoadUrl(String, oneshot::Sender<Result<()>>),
    LoadHtml(String, oneshot::Sender<Result<()>>),
    Export(Region, PathBuf, oneshot::Sender<Result<ExportReport>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async handle to an export worker.
#[derive(Clone)]
pub struct Exporter {
    cmd_tx: Sender<Command>,
}

impl Exporter {
    /// Create a new exporter (spawns a background thread that owns the
    /// capture backend).
    pub async fn new(config: Option<ExportConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Initialize the backend on the worker thread
            let mut capture = match NativeCapture::new(config) {
                Ok(c) => c,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            // Command loop
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::LoadUrl(url, resp) => {
                        let res = capture.load_url(&url);
                        let _ = resp.send(res);
                    }
                    Command::LoadHtml(html, resp) => {
                        let res = capture.load_html(&html);
                        let _ = resp.send(res);
                    }
                    Command::Export(region, out, resp) => {
                        let res = ExportJob::new(&mut capture).run(&region, &out);
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let res = capture.close();
                        let _ = resp.send(res);
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report initialization success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::InitializationError(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Load a document by URL.
    pub async fn load_url(&self, url: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::LoadUrl(url.to_string(), tx));
        rx.await
            .map_err(|e| Error::CaptureError(format!("LoadUrl canceled: {}", e)))?
    }

    /// Load a document from an HTML string.
    pub async fn load_html(&self, html: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::LoadHtml(html.to_string(), tx));
        rx.await
            .map_err(|e| Error::CaptureError(format!("LoadHtml canceled: {}", e)))?
    }

    /// Export the region of the loaded document to `out`.
    pub async fn export(&self, region: Region, out: impl Into<PathBuf>) -> Result<ExportReport> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Export(region, out.into(), tx));
        rx.await
            .map_err(|e| Error::CaptureError(format!("Export canceled: {}", e)))?
    }

    /// Shut the worker down.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::CaptureError(format!("Close canceled: {}", e)))?
    }
}
