//! Export orchestration: capture, paginate, finalize.
//!
//! Every invocation is a fresh [`ExportJob`] walking `Idle → Capturing →
//! Paginating → Finalizing → Done`, with `Failed` terminal from any step.
//! No phase is re-entered, and jobs share no mutable state, so concurrent
//! exports are independent. One guard at the top maps any failure to its
//! fixed user message and keeps the diagnostic detail on the log channel.

use std::path::Path;

use crate::document::PdfSink;
use crate::paginate::{paginate, PageGeometry};
use crate::{Capture, Error, ExportReport, Region, Result};

/// Fixed output filename for the one-shot export action.
pub const OUTPUT_FILENAME: &str = "resume.pdf";

/// Phases of one export invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Paginating,
    Finalizing,
    Done,
    Failed,
}

/// One-time initialization of shared collaborators: the compiled selector
/// set and the preference store. Guaranteed to run at most once per
/// process, before first use; every export calls it, only the first pays.
pub fn ensure_ready() {
    #[cfg(feature = "native")]
    crate::native::ensure_selectors();
    let _ = crate::prefs::current();
}

/// A single export invocation over a capture backend.
pub struct ExportJob<'a, C: Capture> {
    capture: &'a mut C,
    phase: Phase,
}

impl<'a, C: Capture> ExportJob<'a, C> {
    pub fn new(capture: &'a mut C) -> Self {
        Self {
            capture,
            phase: Phase::Idle,
        }
    }

    /// The phase this job last reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn set_phase(&mut self, next: Phase) {
        log::debug!("export: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Capture the region and build the document in memory.
    fn build(&mut self, region: &Region) -> Result<(ExportReport, Vec<u8>)> {
        ensure_ready();

        self.set_phase(Phase::Capturing);
        let image = self.capture.capture(region)?;

        self.set_phase(Phase::Paginating);
        let geometry = PageGeometry::new(self.capture.config().page, image.width());
        let mut sink = PdfSink::new("export", &geometry);
        let pages = paginate(&image, &geometry, &mut sink)?;

        self.set_phase(Phase::Finalizing);
        let bytes = sink.finish()?;

        let report = ExportReport {
            pages,
            image_width: image.width(),
            image_height: image.height(),
            bytes_written: bytes.len() as u64,
        };
        Ok((report, bytes))
    }

    /// Run the export and write the document to `out`.
    ///
    /// Serialization happens exactly once, after the last page; nothing is
    /// written on failure. The diagnostic detail of any error is logged
    /// here; callers surface [`Error::user_message`].
    pub fn run(&mut self, region: &Region, out: &Path) -> Result<ExportReport> {
        let result = self.build(region).and_then(|(report, bytes)| {
            std::fs::write(out, &bytes).map_err(|e| {
                Error::SerializationError(format!("failed to write {}: {}", out.display(), e))
            })?;
            Ok(report)
        });

        match result {
            Ok(report) => {
                self.set_phase(Phase::Done);
                log::info!(
                    "export: {} page(s), {} bytes -> {}",
                    report.pages,
                    report.bytes_written,
                    out.display()
                );
                Ok(report)
            }
            Err(err) => {
                self.set_phase(Phase::Failed);
                log::error!("export failed: {}", err);
                Err(err)
            }
        }
    }

    /// Run the export and return the document bytes instead of writing a
    /// file.
    pub fn run_to_bytes(&mut self, region: &Region) -> Result<(ExportReport, Vec<u8>)> {
        match self.build(region) {
            Ok(out) => {
                self.set_phase(Phase::Done);
                Ok(out)
            }
            Err(err) => {
                self.set_phase(Phase::Failed);
                log::error!("export failed: {}", err);
                Err(err)
            }
        }
    }
}
