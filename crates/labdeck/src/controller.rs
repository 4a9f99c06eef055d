//! The presentation controller: one owner for every piece of presenter
//! state. The window feeds it [`Action`]s and renders from it each frame;
//! anything that needs the window itself comes back as an [`Effect`].

use std::time::{Duration, Instant};

use crate::capture::CaptureKind;
use crate::chrome::FullscreenState;
use crate::deck::{SlideDeck, Step};
use crate::draw::DrawOverlay;
use crate::keymap::Action;
use crate::parser::{Deck, Slide};
use crate::progress::{self, ProgressSchedule, ProgressSnapshot, ProgressStore};
use crate::search::{SearchIndex, SearchOutcome};

/// Work only the window can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    SetFullscreen(bool),
    FocusSearch,
    LeaveSearch,
    Capture(CaptureKind),
    ToggleTheme,
    Quit,
}

pub struct PresentationController {
    deck: Deck,
    slides: SlideDeck,
    search: SearchIndex,
    overlay: DrawOverlay,
    fullscreen: FullscreenState,
    experiment_id: String,
    schedule: ProgressSchedule,
    show_hints: bool,
}

impl PresentationController {
    pub fn new(deck: Deck, experiment_id: impl Into<String>, now: Instant) -> Self {
        let slides = SlideDeck::new(deck.slides.iter().map(Slide::point_count));
        let search = SearchIndex::from_deck(&deck);
        Self {
            deck,
            slides,
            search,
            overlay: DrawOverlay::default(),
            fullscreen: FullscreenState::default(),
            experiment_id: experiment_id.into(),
            schedule: ProgressSchedule::new(now),
            show_hints: false,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn slides(&self) -> &SlideDeck {
        &self.slides
    }

    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    pub fn overlay(&self) -> &DrawOverlay {
        &self.overlay
    }

    /// Pointer and color changes go straight to the overlay.
    pub fn overlay_mut(&mut self) -> &mut DrawOverlay {
        &mut self.overlay
    }

    pub fn fullscreen(&self) -> &FullscreenState {
        &self.fullscreen
    }

    pub fn fullscreen_mut(&mut self) -> &mut FullscreenState {
        &mut self.fullscreen
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    pub fn show_hints(&self) -> bool {
        self.show_hints
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.deck.slides.get(self.slides.current())
    }

    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        tracing::trace!(?action, "apply");
        match action {
            Action::Next => {
                match self.slides.next() {
                    Step::Revealed(count) => tracing::debug!(count, "revealed point"),
                    Step::Advanced(index) => tracing::debug!(index, "next slide"),
                    Step::AtEnd => {}
                }
                None
            }
            Action::Previous => {
                self.slides.previous();
                None
            }
            Action::First => {
                self.slides.first();
                None
            }
            Action::Last => {
                self.slides.last();
                None
            }
            Action::GoTo(index) => {
                self.slides.go_to(index);
                None
            }
            Action::ToggleFullscreen => Some(Effect::SetFullscreen(self.fullscreen.toggle())),
            Action::ToggleDraw => {
                self.overlay.toggle();
                None
            }
            Action::CloseDraw => {
                self.overlay.close();
                None
            }
            Action::ClearDrawing => {
                self.overlay.clear();
                None
            }
            Action::SaveDrawing => Some(Effect::Capture(CaptureKind::Png)),
            Action::ExportPdf => Some(Effect::Capture(CaptureKind::Pdf)),
            Action::FocusSearch => Some(Effect::FocusSearch),
            Action::LeaveSearch => Some(Effect::LeaveSearch),
            Action::NextMatch => {
                if self.search.find_next().is_some() {
                    self.show_current_match();
                }
                None
            }
            Action::PreviousMatch => {
                if self.search.find_previous().is_some() {
                    self.show_current_match();
                }
                None
            }
            Action::ToggleHints => {
                self.show_hints = !self.show_hints;
                None
            }
            Action::ToggleTheme => Some(Effect::ToggleTheme),
            Action::Quit => Some(Effect::Quit),
        }
    }

    /// Run a new query and bring the first match into view.
    pub fn run_search(&mut self, query: &str) -> SearchOutcome {
        let outcome = self.search.search(query);
        if matches!(outcome, SearchOutcome::Found(_)) {
            self.show_current_match();
        }
        outcome
    }

    /// Navigate to the slide holding the current match and reveal its point.
    /// Staying on the same slide keeps what is already revealed.
    fn show_current_match(&mut self) {
        let Some(source) = self
            .search
            .current_match()
            .and_then(|m| self.search.source(m))
        else {
            return;
        };
        let (slide, point) = (source.slide, source.point);
        if slide != self.slides.current() {
            self.slides.go_to(slide);
        }
        if let Some(point) = point {
            self.slides.reveal_through(point);
        }
    }

    /// Open on `slide` instead of restoring saved progress.
    pub fn start_at(&mut self, slide: usize) {
        let shown = self.slides.go_to(slide);
        tracing::debug!(slide = shown, of = self.slides.len(), "explicit start slide");
        self.schedule.skip_restore();
    }

    /// Drive the autosave and the deferred restore. Returns the restored
    /// slide when a restore happened this tick.
    pub fn tick(&mut self, now: Instant, store: &mut dyn ProgressStore) -> Option<usize> {
        let mut restored = None;
        if self.schedule.restore_due(now) {
            if let Some(slide) = progress::restorable_slide(store, &self.experiment_id) {
                let shown = self.slides.go_to(slide);
                tracing::info!(slide = shown, experiment = %self.experiment_id, "restored progress");
                restored = Some(shown);
            }
        }
        if self.schedule.save_due(now) {
            self.save_progress(store);
        }
        restored
    }

    /// Write the current position immediately.
    pub fn save_progress(&self, store: &mut dyn ProgressStore) {
        let snapshot = ProgressSnapshot::now(&self.experiment_id, self.slides.current());
        if let Err(e) = progress::save(store, &snapshot) {
            tracing::warn!("failed to save progress: {e}");
        }
    }

    pub fn next_wakeup(&self, now: Instant) -> Duration {
        self.schedule.next_wakeup(now)
    }
}
