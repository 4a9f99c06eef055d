//! Slide navigation and progressive reveal.
//!
//! The deck is a two-level state machine: the current slide index, and for
//! each slide how many of its points are visible. Entering a slide shows its
//! first point; `next` reveals the remaining points one by one before it
//! moves on.

/// Outcome of a forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Another point on the current slide became visible (new visible count).
    Revealed(usize),
    /// Moved to the slide at this index.
    Advanced(usize),
    /// Last slide with every point visible; nothing changed.
    AtEnd,
}

/// One entry of the numbered jump-button strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpButton {
    pub index: usize,
    pub active: bool,
}

impl JumpButton {
    /// 1-based number shown on the button.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

#[derive(Debug, Clone)]
struct SlideProgress {
    points: usize,
    revealed: usize,
}

impl SlideProgress {
    fn reset(&mut self) {
        self.revealed = self.points.min(1);
    }
}

#[derive(Debug, Clone)]
pub struct SlideDeck {
    slides: Vec<SlideProgress>,
    current: usize,
}

impl SlideDeck {
    /// Build a deck from the number of points on each slide.
    pub fn new(point_counts: impl IntoIterator<Item = usize>) -> Self {
        let mut slides: Vec<SlideProgress> = point_counts
            .into_iter()
            .map(|points| SlideProgress {
                points,
                revealed: 0,
            })
            .collect();
        if let Some(first) = slides.first_mut() {
            first.reset();
        }
        Self { slides, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of visible points on the slide at `index`.
    pub fn revealed(&self, index: usize) -> usize {
        self.slides.get(index).map_or(0, |s| s.revealed)
    }

    /// Jump to `index`, clamped into the deck. Returns the slide actually shown.
    pub fn go_to(&mut self, index: usize) -> usize {
        if self.slides.is_empty() {
            return 0;
        }
        let target = index.min(self.slides.len() - 1);
        self.current = target;
        self.slides[target].reset();
        target
    }

    pub fn first(&mut self) -> usize {
        self.go_to(0)
    }

    pub fn last(&mut self) -> usize {
        self.go_to(self.slides.len().saturating_sub(1))
    }

    /// Reveal the next point, or advance once every point is visible.
    pub fn next(&mut self) -> Step {
        let Some(slide) = self.slides.get_mut(self.current) else {
            return Step::AtEnd;
        };
        if slide.revealed < slide.points {
            slide.revealed += 1;
            return Step::Revealed(slide.revealed);
        }
        if self.current + 1 >= self.slides.len() {
            return Step::AtEnd;
        }
        Step::Advanced(self.go_to(self.current + 1))
    }

    /// Move back one slide. Returns false on the first slide.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 || self.slides.is_empty() {
            return false;
        }
        self.go_to(self.current - 1);
        true
    }

    /// Make point `point` (0-based) of the current slide visible, keeping any
    /// points already shown.
    pub fn reveal_through(&mut self, point: usize) {
        if let Some(slide) = self.slides.get_mut(self.current) {
            let wanted = (point + 1).min(slide.points);
            slide.revealed = slide.revealed.max(wanted);
        }
    }

    /// True on the last slide with every point visible.
    pub fn is_complete(&self) -> bool {
        self.slides.last().is_some_and(|s| {
            self.current + 1 == self.slides.len() && s.revealed == s.points
        })
    }

    /// Width of the progress bar, in percent.
    pub fn progress_percent(&self) -> f32 {
        if self.slides.is_empty() {
            return 0.0;
        }
        (self.current + 1) as f32 / self.slides.len() as f32 * 100.0
    }

    pub fn jump_strip(&self) -> Vec<JumpButton> {
        (0..self.slides.len())
            .map(|index| JumpButton {
                index,
                active: index == self.current,
            })
            .collect()
    }

    pub fn slide_label(&self) -> String {
        format!("Slide {} / {}", self.current + 1, self.slides.len())
    }
}
