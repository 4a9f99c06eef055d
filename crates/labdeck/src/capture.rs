//! Window capture to PNG or PDF.
//!
//! A capture spans frames: the screenshot is requested in one frame and
//! delivered as an event in a later one. [`PendingCapture`] carries the
//! controls guard across that gap, so the toolbar and draw controls stay out
//! of the picture until the capture finishes, fails, or times out.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use crate::chrome::{ControlsVisibility, HiddenControls};
use crate::pdf;

/// Give up on a screenshot that has not arrived after this long.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(2);

pub const DRAWING_FILENAME: &str = "page_with_drawing.png";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("screenshot buffer does not match its {width}x{height} size")]
    BadBuffer { width: usize, height: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Png,
    Pdf,
}

impl CaptureKind {
    /// Output file for this kind of capture inside `dir`.
    pub fn output_path(self, dir: &Path, experiment_id: &str) -> PathBuf {
        match self {
            Self::Png => dir.join(DRAWING_FILENAME),
            Self::Pdf => dir.join(format!("{experiment_id}.pdf")),
        }
    }
}

/// A requested screenshot waiting for its pixels.
#[derive(Debug)]
pub struct PendingCapture {
    kind: CaptureKind,
    path: PathBuf,
    title: String,
    requested_at: Instant,
    _controls: HiddenControls,
}

impl PendingCapture {
    /// Hide the controls and remember where the capture goes. The caller
    /// requests the screenshot on the next frame, once the controls are gone.
    pub fn new(
        kind: CaptureKind,
        path: PathBuf,
        title: impl Into<String>,
        controls: &ControlsVisibility,
        now: Instant,
    ) -> Self {
        Self {
            kind,
            path,
            title: title.into(),
            requested_at: now,
            _controls: controls.hide(),
        }
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.requested_at) >= CAPTURE_TIMEOUT
    }

    /// Write the captured pixels. Consumes the capture, so the controls come
    /// back whether or not the write succeeds.
    pub fn complete(self, image: &egui::ColorImage) -> Result<PathBuf, CaptureError> {
        let Self {
            kind, path, title, ..
        } = self;
        match kind {
            CaptureKind::Png => save_png(image, &path)?,
            CaptureKind::Pdf => {
                let page = DynamicImage::ImageRgba8(to_rgba_image(image)?).to_rgb8();
                pdf::write_pdf(&[page], &path, &title)?;
            }
        }
        tracing::info!(path = %path.display(), ?kind, "capture saved");
        Ok(path)
    }
}

/// Save a screenshot as PNG.
pub fn save_png(image: &egui::ColorImage, path: &Path) -> Result<(), CaptureError> {
    let width = image.width() as u32;
    let height = image.height() as u32;
    image::save_buffer(
        path,
        &rgba_bytes(image),
        width,
        height,
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

pub fn to_rgba_image(image: &egui::ColorImage) -> Result<RgbaImage, CaptureError> {
    let (width, height) = (image.width(), image.height());
    RgbaImage::from_raw(width as u32, height as u32, rgba_bytes(image))
        .ok_or(CaptureError::BadBuffer { width, height })
}

fn rgba_bytes(image: &egui::ColorImage) -> Vec<u8> {
    image
        .pixels
        .iter()
        .flat_map(|c| [c.r(), c.g(), c.b(), c.a()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize) -> egui::ColorImage {
        let bytes: Vec<u8> = [0x20, 0x40, 0x80, 0xFF].repeat(width * height);
        egui::ColorImage::from_rgba_unmultiplied([width, height], &bytes)
    }

    #[test]
    fn test_output_paths() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            CaptureKind::Png.output_path(dir, "exp1"),
            dir.join("page_with_drawing.png")
        );
        assert_eq!(
            CaptureKind::Pdf.output_path(dir, "exp3"),
            dir.join("exp3.pdf")
        );
    }

    #[test]
    fn test_png_capture_restores_controls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let controls = ControlsVisibility::default();
        let path = CaptureKind::Png.output_path(dir.path(), "exp1");
        let capture = PendingCapture::new(
            CaptureKind::Png,
            path.clone(),
            "Limits",
            &controls,
            Instant::now(),
        );
        assert!(!controls.is_visible());

        let written = capture.complete(&solid(8, 4)).expect("png written");
        assert_eq!(written, path);
        assert!(controls.is_visible());

        let decoded = image::open(&path).expect("decode png");
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn test_failed_capture_restores_controls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let controls = ControlsVisibility::default();
        let missing = dir.path().join("no-such-dir").join(DRAWING_FILENAME);
        let capture =
            PendingCapture::new(CaptureKind::Png, missing, "", &controls, Instant::now());

        assert!(capture.complete(&solid(2, 2)).is_err());
        assert!(controls.is_visible());
    }

    #[test]
    fn test_pdf_capture() {
        let dir = tempfile::tempdir().expect("tempdir");
        let controls = ControlsVisibility::default();
        let path = CaptureKind::Pdf.output_path(dir.path(), "exp1");
        let capture =
            PendingCapture::new(CaptureKind::Pdf, path, "Limits", &controls, Instant::now());
        let written = capture.complete(&solid(16, 9)).expect("pdf written");
        assert!(controls.is_visible());

        let bytes = std::fs::read(written).expect("read pdf");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_stale_after_timeout() {
        let controls = ControlsVisibility::default();
        let t0 = Instant::now();
        let capture = PendingCapture::new(
            CaptureKind::Png,
            PathBuf::from(DRAWING_FILENAME),
            "",
            &controls,
            t0,
        );
        assert!(!capture.is_stale(t0 + Duration::from_millis(1999)));
        assert!(capture.is_stale(t0 + CAPTURE_TIMEOUT));
        drop(capture);
        assert!(controls.is_visible());
    }
}
