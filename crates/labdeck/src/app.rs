use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::capture::{CaptureKind, PendingCapture};
use crate::chrome::{self, ControlsVisibility, FullscreenState};
use crate::config::Config;
use crate::controller::{Effect, PresentationController};
use crate::keymap::{self, Action, KeyContext};
use crate::parser;
use crate::progress::{DEFAULT_EXPERIMENT_ID, FileStore, MemoryStore, ProgressStore};
use crate::render::{self, SlideView, overlay};
use crate::search::SearchOutcome;
use crate::theme::Theme;

const TOAST_DURATION: f32 = 2.5;
const TOAST_FADE: f32 = 0.5;

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let fade_start = TOAST_DURATION - TOAST_FADE;
        if elapsed < fade_start {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - fade_start) / TOAST_FADE
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

struct PresentationApp {
    controller: PresentationController,
    theme: Theme,
    title: String,
    store: Box<dyn ProgressStore>,
    controls: ControlsVisibility,
    export_dir: PathBuf,
    search_id: egui::Id,
    search_query: String,
    /// Bring the current match into view on the next render.
    scroll_to_match: bool,
    pending_capture: Option<PendingCapture>,
    screenshot_sent: bool,
    toast: Option<Toast>,
}

impl PresentationApp {
    fn search_focused(&self, ctx: &egui::Context) -> bool {
        ctx.memory(|m| m.has_focus(self.search_id))
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action, now: Instant) {
        let before = self.controller.search().current_index();
        let effect = self.controller.apply(action);
        if self.controller.search().current_index() != before
            || matches!(action, Action::NextMatch | Action::PreviousMatch)
        {
            self.scroll_to_match = true;
        }
        if let Some(effect) = effect {
            self.handle_effect(ctx, effect, now);
        }
    }

    fn handle_effect(&mut self, ctx: &egui::Context, effect: Effect, now: Instant) {
        match effect {
            Effect::SetFullscreen(on) => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(on));
            }
            Effect::FocusSearch => ctx.memory_mut(|m| m.request_focus(self.search_id)),
            Effect::LeaveSearch => ctx.memory_mut(|m| m.surrender_focus(self.search_id)),
            Effect::Capture(kind) => self.begin_capture(kind, now),
            Effect::ToggleTheme => {
                self.theme = self.theme.toggled();
                ctx.set_visuals(self.theme.visuals());
                self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
            }
            Effect::Quit => {
                self.controller.save_progress(self.store.as_mut());
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn begin_capture(&mut self, kind: CaptureKind, now: Instant) {
        if self.pending_capture.is_some() {
            self.toast = Some(Toast::new("A capture is already in progress"));
            return;
        }
        let path = kind.output_path(&self.export_dir, self.controller.experiment_id());
        tracing::debug!(?kind, path = %path.display(), "capture requested");
        self.pending_capture = Some(PendingCapture::new(
            kind,
            path,
            self.title.clone(),
            &self.controls,
            now,
        ));
        self.screenshot_sent = false;
    }

    /// Finish, fail, or time out the pending capture.
    fn poll_capture(&mut self, ctx: &egui::Context, now: Instant) {
        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        if let Some(image) = screenshot {
            let Some(capture) = self.pending_capture.take() else {
                return;
            };
            let message = match capture.complete(&image) {
                Ok(path) => format!("Saved {}", path.display()),
                Err(e) => {
                    tracing::error!("capture failed: {e}");
                    format!("Capture failed: {e}")
                }
            };
            self.toast = Some(Toast::new(message));
        } else if let Some(capture) = self.pending_capture.take_if(|c| c.is_stale(now)) {
            tracing::warn!(
                kind = ?capture.kind(),
                path = %capture.path().display(),
                "screenshot never arrived, capture abandoned"
            );
            self.toast = Some(Toast::new("Capture timed out"));
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        let cx = KeyContext {
            overlay_active: self.controller.overlay().is_active(),
            search_focused: self.search_focused(ctx),
        };

        // Collect actions and apply them AFTER the input closure
        // (sending viewport commands inside ctx.input() deadlocks)
        let actions: Vec<Action> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => keymap::action_for(*key, *modifiers, cx),
                    _ => None,
                })
                .collect()
        });

        for action in actions {
            self.apply(ctx, action, now);
        }
    }

    fn handle_drawing(&mut self, ctx: &egui::Context) {
        let screen = ctx.content_rect();
        self.controller.overlay_mut().resize(screen.size());
        if !self.controller.overlay().is_active() {
            return;
        }

        egui::Area::new(egui::Id::new("draw_overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let response = ui.allocate_rect(screen, egui::Sense::drag());
                let overlay = self.controller.overlay_mut();
                if response.drag_started() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        overlay.begin(pos);
                    }
                } else if response.dragged() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        overlay.extend(pos);
                    }
                }
                let pointer_left = !ui.input(|i| i.pointer.has_pointer());
                if response.drag_stopped() || pointer_left {
                    overlay.end();
                }
                overlay::paint_strokes(ui.painter(), self.controller.overlay());
            });

        if !self.controls.is_visible() {
            return;
        }
        let command = egui::Area::new(egui::Id::new("draw_controls"))
            .order(egui::Order::Tooltip)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 56.0))
            .show(ctx, |ui| {
                overlay::draw_controls(ui, self.controller.overlay(), &self.theme)
            })
            .inner;

        match command {
            Some(overlay::OverlayCommand::SetColor(color)) => {
                self.controller.overlay_mut().set_color(color);
                if let Some(name) = overlay::color_name(color) {
                    tracing::debug!(color = name, "pen color");
                }
            }
            Some(overlay::OverlayCommand::Clear) => {
                self.apply(ctx, Action::ClearDrawing, Instant::now());
            }
            Some(overlay::OverlayCommand::Save) => {
                self.apply(ctx, Action::SaveDrawing, Instant::now());
            }
            Some(overlay::OverlayCommand::Close) => {
                self.apply(ctx, Action::CloseDraw, Instant::now());
            }
            None => {}
        }
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context, now: Instant) {
        let mut clicked: Vec<Action> = Vec::new();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.search_query)
                        .id(self.search_id)
                        .hint_text("Search code and explanations")
                        .return_key(None::<egui::KeyboardShortcut>)
                        .desired_width(260.0),
                );
                if response.changed() {
                    match self.controller.run_search(&self.search_query) {
                        SearchOutcome::Found(n) => {
                            tracing::debug!(matches = n, "search");
                            self.scroll_to_match = true;
                        }
                        SearchOutcome::NoResults | SearchOutcome::Cleared => {}
                    }
                }
                if ui.button("\u{25B2}").on_hover_text("Previous result").clicked() {
                    clicked.push(Action::PreviousMatch);
                }
                if ui.button("\u{25BC}").on_hover_text("Next result").clicked() {
                    clicked.push(Action::NextMatch);
                }
                if let Some(status) = self.controller.search().status() {
                    ui.label(status);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("PDF").on_hover_text("Save page as PDF").clicked() {
                        clicked.push(Action::ExportPdf);
                    }
                    let draw_label = if self.controller.overlay().is_active() {
                        "\u{270F} Drawing"
                    } else {
                        "\u{270F} Draw"
                    };
                    if ui.button(draw_label).clicked() {
                        clicked.push(Action::ToggleDraw);
                    }
                    if ui
                        .button(self.controller.fullscreen().button_label())
                        .clicked()
                    {
                        clicked.push(Action::ToggleFullscreen);
                    }
                });
            });
        });
        for action in clicked {
            self.apply(ctx, action, now);
        }
    }

    fn draw_navigation(&mut self, ctx: &egui::Context, now: Instant) {
        let mut clicked: Vec<Action> = Vec::new();
        let slides = self.controller.slides();
        let meta = &self.controller.deck().meta;
        egui::TopBottomPanel::bottom("navigation").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal_wrapped(|ui| {
                let prev = egui::Button::new("\u{25C0} Prev");
                if ui.add_enabled(slides.current() > 0, prev).clicked() {
                    clicked.push(Action::Previous);
                }
                for button in slides.jump_strip() {
                    let mut response =
                        ui.selectable_label(button.active, button.number().to_string());
                    if let Some(title) = self
                        .controller
                        .deck()
                        .slides
                        .get(button.index)
                        .and_then(|s| s.title())
                    {
                        response = response.on_hover_text(title);
                    }
                    response.widget_info(|| {
                        egui::WidgetInfo::selected(
                            egui::WidgetType::Button,
                            true,
                            button.active,
                            chrome::jump_button_label(button.number()),
                        )
                    });
                    if response.clicked() {
                        clicked.push(Action::GoTo(button.index));
                    }
                }
                let next = egui::Button::new("Next \u{25B6}");
                if ui.add_enabled(!slides.is_complete(), next).clicked() {
                    clicked.push(Action::Next);
                }
                ui.label(slides.slide_label());
                if let Some(author) = &meta.author {
                    ui.label(
                        egui::RichText::new(author).color(Theme::with_opacity(self.theme.muted, 0.9)),
                    );
                }
            });
            ui.add(
                egui::ProgressBar::new(slides.progress_percent() / 100.0)
                    .desired_height(4.0)
                    .fill(self.theme.accent),
            );
            ui.add_space(4.0);
        });
        for action in clicked {
            self.apply(ctx, action, now);
        }
    }

    fn draw_slide(&mut self, ctx: &egui::Context) {
        let bg = self.theme.background;
        let scroll_to_match = std::mem::take(&mut self.scroll_to_match);
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(32.0))
            .show(ctx, |ui| {
                let slides = self.controller.slides();
                let Some(slide) = self.controller.current_slide() else {
                    render::render_empty(ui, &self.theme);
                    return;
                };
                egui::ScrollArea::vertical()
                    .id_salt(("slide", slides.current()))
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let view = SlideView {
                            slide,
                            index: slides.current(),
                            revealed: slides.revealed(slides.current()),
                            theme: &self.theme,
                            search: Some(self.controller.search()),
                            scroll_to_match,
                        };
                        render::render_slide(ui, &view);
                        if let Some(footer) = &self.controller.deck().meta.footer {
                            ui.add_space(16.0);
                            render::render_footer(ui, footer, &self.theme);
                        }
                    });

                if let Some(ref toast) = self.toast {
                    draw_toast(ui, toast, &self.theme, ctx);
                }
                if self.controller.show_hints() && self.controls.is_visible() {
                    draw_hints(ui, &self.theme, ui.max_rect());
                }
            });
    }
}

impl eframe::App for PresentationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        let actual_fullscreen = ctx.input(|i| i.viewport().fullscreen);
        self.controller.fullscreen_mut().sync(actual_fullscreen);

        self.poll_capture(ctx, now);
        self.handle_keys(ctx, now);

        if let Some(slide) = self.controller.tick(now, self.store.as_mut()) {
            self.toast = Some(Toast::new(format!("Resumed at slide {}", slide + 1)));
        }
        if ctx.input(|i| i.viewport().close_requested()) {
            self.controller.save_progress(self.store.as_mut());
        }

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }

        if self.controls.is_visible() {
            self.draw_toolbar(ctx, now);
            self.draw_navigation(ctx, now);
        }
        self.draw_slide(ctx);
        self.handle_drawing(ctx);

        // Controls are already gone from this frame; capture it.
        if self.pending_capture.is_some() {
            if !self.screenshot_sent {
                ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                self.screenshot_sent = true;
            }
            ctx.request_repaint();
        }

        ctx.request_repaint_after(self.controller.next_wakeup(now));
    }
}

fn draw_toast(ui: &egui::Ui, toast: &Toast, theme: &Theme, ctx: &egui::Context) {
    let opacity = toast.opacity();
    if opacity <= 0.0 {
        return;
    }
    let rect = ui.max_rect();
    let toast_color = Theme::with_opacity(theme.foreground, opacity * 0.9);
    let toast_bg = Theme::with_opacity(theme.code_background, opacity * 0.9);
    let galley = ui.painter().layout_no_wrap(
        toast.message.clone(),
        egui::FontId::proportional(18.0),
        toast_color,
    );
    let padding = 14.0;
    let toast_rect = egui::Rect::from_min_size(
        egui::pos2(
            rect.center().x - galley.rect.width() / 2.0 - padding,
            rect.bottom() - galley.rect.height() - padding * 2.0 - 24.0,
        ),
        egui::vec2(
            galley.rect.width() + padding * 2.0,
            galley.rect.height() + padding * 2.0,
        ),
    );
    ui.painter().rect_filled(toast_rect, 8.0, toast_bg);
    let text_pos = egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
    ui.painter().galley(text_pos, galley, toast_color);
    ctx.request_repaint();
}

fn draw_hints(ui: &egui::Ui, theme: &Theme, rect: egui::Rect) {
    let bg = Theme::with_opacity(theme.code_background, 0.95);
    let text_color = Theme::with_opacity(theme.foreground, 0.95);
    let key_color = Theme::with_opacity(theme.accent, 0.95);

    let padding = 24.0;
    let line_height = 28.0;
    let height = chrome::KEYBOARD_HINTS.len() as f32 * line_height + padding * 2.0 + 40.0;
    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(420.0, height));
    ui.painter().rect_filled(hud_rect, 12.0, bg);

    let title_galley = ui.painter().layout_no_wrap(
        "Keyboard Shortcuts".to_string(),
        egui::FontId::proportional(20.0),
        Theme::with_opacity(theme.heading_color, 0.95),
    );
    let title_pos = egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding);
    ui.painter().galley(title_pos, title_galley, text_color);

    let mut y = hud_rect.top() + padding + 40.0;
    for (key, desc) in chrome::KEYBOARD_HINTS {
        let key_galley =
            ui.painter()
                .layout_no_wrap(key.to_string(), egui::FontId::monospace(14.0), key_color);
        ui.painter()
            .galley(egui::pos2(hud_rect.left() + padding, y), key_galley, key_color);

        let desc_galley = ui.painter().layout_no_wrap(
            desc.to_string(),
            egui::FontId::proportional(14.0),
            text_color,
        );
        ui.painter().galley(
            egui::pos2(hud_rect.left() + padding + 190.0, y),
            desc_galley,
            text_color,
        );
        y += line_height;
    }
}

fn open_store() -> Box<dyn ProgressStore> {
    match FileStore::open_default() {
        Ok(store) => {
            tracing::debug!(dir = %store.dir().display(), "progress store");
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!("progress will not persist: {e}");
            Box::new(MemoryStore::default())
        }
    }
}

fn window_title(deck_title: Option<&str>, file: &Path) -> String {
    deck_title.map(str::to_string).unwrap_or_else(|| {
        format!(
            "labdeck: {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    })
}

pub fn run(
    file: PathBuf,
    windowed: bool,
    start_slide: Option<usize>,
    experiment: Option<String>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&file)?;
    let deck = parser::parse(&content);

    if deck.slides.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }

    let config = Config::load_or_default();
    let experiment_id = experiment
        .or_else(|| config.experiment().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_EXPERIMENT_ID.to_string());

    let theme_name = deck
        .meta
        .theme
        .as_deref()
        .or(config.theme())
        .unwrap_or("light");
    let theme = Theme::from_name(theme_name);
    let pen_color = overlay::pen_color_from_config(config.pen_color(), &theme);
    let export_dir = config
        .export_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let title = window_title(deck.meta.title.as_deref(), &file);

    let mut controller = PresentationController::new(deck, experiment_id, Instant::now());
    controller.overlay_mut().set_color(pen_color);
    *controller.fullscreen_mut() = FullscreenState::new(!windowed);

    tracing::info!(
        slides = controller.slides().len(),
        experiment = controller.experiment_id(),
        fullscreen = controller.fullscreen().is_fullscreen(),
        "starting presentation"
    );
    if let Some(slide) = start_slide {
        controller.start_at(slide.saturating_sub(1));
    }

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let window_name = title.clone();
    eframe::run_native(
        &window_name,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(theme.visuals());
            Ok(Box::new(PresentationApp {
                controller,
                theme,
                title,
                store: open_store(),
                controls: ControlsVisibility::default(),
                export_dir,
                search_id: egui::Id::new("search_input"),
                search_query: String::new(),
                scroll_to_match: false,
                pending_capture: None,
                screenshot_sent: false,
                toast: None,
            }))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
