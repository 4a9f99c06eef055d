use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use eframe::egui;
use image::{DynamicImage, RgbImage};

use crate::capture::{self, CaptureError};
use crate::cli::ExportFormat;
use crate::parser::{self, Deck};
use crate::pdf;
use crate::render::{self, SlideView};
use crate::theme::Theme;

#[derive(Default)]
struct ExportReport {
    written: Vec<PathBuf>,
    error: Option<CaptureError>,
}

struct ExportApp {
    deck: Deck,
    theme: Theme,
    format: ExportFormat,
    output_dir: PathBuf,
    pdf_name: String,
    current_slide: usize,
    screenshot_requested: bool,
    pages: Vec<RgbImage>,
    report: Rc<RefCell<ExportReport>>,
    done: bool,
}

impl ExportApp {
    fn new(
        deck: Deck,
        theme: Theme,
        format: ExportFormat,
        output_dir: PathBuf,
        pdf_name: String,
        report: Rc<RefCell<ExportReport>>,
    ) -> Self {
        Self {
            deck,
            theme,
            format,
            output_dir,
            pdf_name,
            current_slide: 0,
            screenshot_requested: false,
            pages: Vec::new(),
            report,
            done: false,
        }
    }

    fn slide_count(&self) -> usize {
        self.deck.slides.len()
    }

    fn store(&mut self, image: &egui::ColorImage) -> Result<(), CaptureError> {
        match self.format {
            ExportFormat::Png => {
                let filename = format!("slide-{:02}.png", self.current_slide + 1);
                let path = self.output_dir.join(&filename);
                capture::save_png(image, &path)?;
                eprintln!("  Saved {filename}");
                self.report.borrow_mut().written.push(path);
            }
            ExportFormat::Pdf => {
                let page = DynamicImage::ImageRgba8(capture::to_rgba_image(image)?).to_rgb8();
                self.pages.push(page);
                eprintln!("  Captured slide {}", self.current_slide + 1);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CaptureError> {
        if self.format == ExportFormat::Pdf {
            let path = self.output_dir.join(&self.pdf_name);
            let title = self.deck.meta.title.as_deref().unwrap_or_default();
            pdf::write_pdf(&self.pages, &path, title)?;
            eprintln!("  Saved {}", self.pdf_name);
            self.report.borrow_mut().written.push(path);
        }
        Ok(())
    }

    fn fail(&mut self, ctx: &egui::Context, error: CaptureError) {
        tracing::error!("export failed: {error}");
        self.report.borrow_mut().error = Some(error);
        self.done = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Store the screenshot of the current slide and move on, closing after the last.
    fn accept(&mut self, ctx: &egui::Context, image: &egui::ColorImage) {
        if let Err(e) = self.store(image) {
            self.fail(ctx, e);
            return;
        }
        self.screenshot_requested = false;
        self.current_slide += 1;
        if self.current_slide < self.slide_count() {
            return;
        }
        if let Err(e) = self.finish() {
            self.fail(ctx, e);
            return;
        }
        self.done = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

fn pdf_name_for(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slides".to_string());
    format!("{stem}.pdf")
}

impl eframe::App for ExportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.done {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Screenshot requested last frame
        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        if let Some(image) = screenshot {
            self.accept(ctx, &image);
            if self.done {
                return;
            }
        }

        let bg = self.theme.background;
        let idx = self.current_slide;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(48.0))
            .show(ctx, |ui| {
                if let Some(slide) = self.deck.slides.get(idx) {
                    let view = SlideView {
                        slide,
                        index: idx,
                        revealed: slide.point_count(),
                        theme: &self.theme,
                        search: None,
                        scroll_to_match: false,
                    };
                    render::render_slide(ui, &view);
                    if let Some(footer) = &self.deck.meta.footer {
                        render::render_footer(ui, footer, &self.theme);
                    }
                }
            });

        // Request screenshot after rendering (will arrive next frame)
        if !self.screenshot_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            self.screenshot_requested = true;
        }

        ctx.request_repaint();
    }
}

pub fn run(
    file: PathBuf,
    output_dir: PathBuf,
    format: ExportFormat,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&file)?;
    let deck = parser::parse(&content);

    if deck.slides.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }

    std::fs::create_dir_all(&output_dir)?;

    eprintln!(
        "Exporting {} slides to {} ({}x{})",
        deck.slides.len(),
        output_dir.display(),
        width,
        height,
    );

    let title = deck
        .meta
        .title
        .clone()
        .unwrap_or_else(|| "labdeck export".to_string());
    let pdf_name = pdf_name_for(&file);
    let theme = Theme::from_name(deck.meta.theme.as_deref().unwrap_or("light"));

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([width as f32, height as f32])
        .with_title(&title)
        .with_decorations(false);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let report = Rc::new(RefCell::new(ExportReport::default()));
    let app_report = Rc::clone(&report);
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ExportApp::new(
                deck, theme, format, output_dir, pdf_name, app_report,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let report = report.take();
    if let Some(error) = report.error {
        return Err(error.into());
    }
    eprintln!("Export complete: {} file(s) written.", report.written.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = "---\ntitle: Limits\n---\n\n# Numeric\n\n+ h shrinks\n\n---\n\n# Symbolic\n\n```matlab\nlimit(sin(x)/x, x, 0)\n```\n";

    fn solid(width: usize, height: usize) -> egui::ColorImage {
        let bytes: Vec<u8> = [0x20, 0x40, 0x80, 0xFF].repeat(width * height);
        egui::ColorImage::from_rgba_unmultiplied([width, height], &bytes)
    }

    fn app(format: ExportFormat, output_dir: &Path) -> (ExportApp, Rc<RefCell<ExportReport>>) {
        let report = Rc::new(RefCell::new(ExportReport::default()));
        let app = ExportApp::new(
            parser::parse(DECK),
            Theme::light(),
            format,
            output_dir.to_path_buf(),
            pdf_name_for(Path::new("decks/calculus-limits.md")),
            Rc::clone(&report),
        );
        (app, report)
    }

    #[test]
    fn test_pdf_name_follows_deck_stem() {
        assert_eq!(pdf_name_for(Path::new("decks/calculus-limits.md")), "calculus-limits.pdf");
        assert_eq!(pdf_name_for(Path::new("")), "slides.pdf");
    }

    #[test]
    fn test_png_export_writes_one_file_per_slide() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = egui::Context::default();
        let (mut app, report) = app(ExportFormat::Png, dir.path());
        assert_eq!(app.slide_count(), 2);

        app.accept(&ctx, &solid(8, 6));
        assert!(!app.done);
        assert_eq!(app.current_slide, 1);
        app.accept(&ctx, &solid(8, 6));
        assert!(app.done);

        let report = report.borrow();
        assert!(report.error.is_none());
        assert_eq!(
            report.written,
            vec![dir.path().join("slide-01.png"), dir.path().join("slide-02.png")]
        );
        for path in &report.written {
            let image = image::open(path).unwrap();
            assert_eq!((image.width(), image.height()), (8, 6));
        }
    }

    #[test]
    fn test_pdf_export_collects_pages_into_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = egui::Context::default();
        let (mut app, report) = app(ExportFormat::Pdf, dir.path());

        app.accept(&ctx, &solid(8, 6));
        assert_eq!(app.pages.len(), 1);
        assert!(report.borrow().written.is_empty());
        app.accept(&ctx, &solid(8, 6));
        assert!(app.done);

        let path = dir.path().join("calculus-limits.pdf");
        assert_eq!(report.borrow().written, vec![path.clone()]);
        let doc = lopdf::Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_unwritable_output_dir_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let ctx = egui::Context::default();
        let (mut app, report) = app(ExportFormat::Png, &blocker);

        app.accept(&ctx, &solid(4, 4));
        assert!(app.done);
        assert_eq!(app.current_slide, 0);
        let report = report.borrow();
        assert!(report.error.is_some());
        assert!(report.written.is_empty());
    }
}
