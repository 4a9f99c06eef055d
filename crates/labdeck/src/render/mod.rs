pub mod overlay;
pub mod syntax;

use eframe::egui::{self, Color32, FontFamily, FontId, Margin, RichText};
use eframe::egui::text::{LayoutJob, TextFormat};

use crate::chrome::CODE_BLOCK_LABEL;
use crate::parser::{Block, ListItem, ListMarker, Slide};
use crate::search::{SearchIndex, SourceKind};
use crate::theme::Theme;

use syntax::Highlight;

/// Everything needed to draw one slide.
pub struct SlideView<'a> {
    pub slide: &'a Slide,
    pub index: usize,
    /// Number of points visible.
    pub revealed: usize,
    pub theme: &'a Theme,
    pub search: Option<&'a SearchIndex>,
    /// Scroll the highlighted match into view this frame.
    pub scroll_to_match: bool,
}

impl SlideView<'_> {
    fn highlight(&self, kind: SourceKind, local: usize) -> Option<Highlight> {
        let range = self.search?.highlight(kind, self.index, local)?;
        Some(Highlight {
            range,
            color: self.theme.search_highlight,
        })
    }
}

/// Render a slide top to bottom into `ui`.
pub fn render_slide(ui: &mut egui::Ui, view: &SlideView<'_>) {
    let theme = view.theme;
    let mut code_local = 0;
    let mut item_local = 0;
    let mut point = 0;

    for block in &view.slide.blocks {
        match block {
            Block::Heading { level, text } => {
                ui.label(
                    RichText::new(text)
                        .size(theme.heading_size(*level))
                        .color(theme.heading_color)
                        .strong(),
                );
            }
            Block::Paragraph { text } => {
                ui.label(
                    RichText::new(text)
                        .size(theme.body_size)
                        .color(theme.foreground),
                );
            }
            Block::List { ordered, items } => {
                for (n, item) in items.iter().enumerate() {
                    let local = item_local;
                    item_local += 1;
                    if item.marker == ListMarker::Point {
                        point += 1;
                        if point > view.revealed {
                            continue;
                        }
                    }
                    let marker = if *ordered {
                        format!("{}.", n + 1)
                    } else {
                        "\u{2022}".to_string()
                    };
                    let highlight = view.highlight(SourceKind::Explanation, local);
                    let response = draw_list_item(ui, &marker, item, theme, highlight.as_ref());
                    if highlight.is_some() && view.scroll_to_match {
                        response.scroll_to_me(Some(egui::Align::Center));
                    }
                }
            }
            Block::CodeBlock { language, code } => {
                let local = code_local;
                code_local += 1;
                let highlight = view.highlight(SourceKind::Code, local);
                let response =
                    draw_code_block(ui, code, language.as_deref(), theme, highlight.as_ref());
                if highlight.is_some() && view.scroll_to_match {
                    response.scroll_to_me(Some(egui::Align::Center));
                }
            }
        }
        ui.add_space(theme.body_size * 0.6);
    }
}

fn draw_list_item(
    ui: &mut egui::Ui,
    marker: &str,
    item: &ListItem,
    theme: &Theme,
    highlight: Option<&Highlight>,
) -> egui::Response {
    ui.horizontal_wrapped(|ui| {
        ui.label(
            RichText::new(marker)
                .size(theme.body_size)
                .color(theme.accent),
        );
        let mut job = LayoutJob::default();
        job.wrap.max_width = ui.available_width();
        let format = TextFormat::simple(
            FontId::new(theme.body_size, FontFamily::Proportional),
            theme.foreground,
        );
        syntax::append_highlighted(&mut job, &item.text, 0, format, highlight);
        ui.label(job)
    })
    .inner
}

/// Draw a code block with syntax highlighting.
fn draw_code_block(
    ui: &mut egui::Ui,
    code: &str,
    language: Option<&str>,
    theme: &Theme,
    highlight: Option<&Highlight>,
) -> egui::Response {
    let frame = egui::Frame::new()
        .fill(theme.code_background)
        .corner_radius(8.0)
        .inner_margin(Margin::same(16));

    let response = frame
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            let job = syntax::highlight_code(
                code,
                language,
                theme.code_size,
                theme,
                ui.available_width(),
                highlight,
            );
            ui.label(job)
        })
        .inner;
    response.widget_info(|| {
        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, CODE_BLOCK_LABEL)
    });
    response
}

/// Footer line shown under the slide, when the deck has one.
pub fn render_footer(ui: &mut egui::Ui, footer: &str, theme: &Theme) {
    ui.label(
        RichText::new(footer)
            .size(theme.body_size * 0.6)
            .color(Theme::with_opacity(theme.muted, 0.9)),
    );
}

/// Centered message for decks with nothing to show.
pub fn render_empty(ui: &mut egui::Ui, theme: &Theme) {
    ui.centered_and_justified(|ui| {
        ui.label(
            RichText::new("This deck has no slides")
                .size(theme.h2_size)
                .color(Color32::GRAY),
        );
    });
}
