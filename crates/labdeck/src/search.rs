//! In-deck text search over code blocks and explanation items.
//!
//! Matches are byte ranges into the immutable source text captured when the
//! index is built. Highlighting is derived from the current match on every
//! render, so there is never more than one highlight and offsets never drift.

use std::ops::Range;

use regex::RegexBuilder;

use crate::parser::{Deck, ListMarker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Code,
    Explanation,
}

/// A searchable fragment of the deck.
#[derive(Debug, Clone)]
pub struct SearchSource {
    pub slide: usize,
    /// Position among fragments of the same kind on the same slide.
    pub local: usize,
    /// Point index when the fragment is a progressively revealed item.
    pub point: Option<usize>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub kind: SourceKind,
    /// Index into the fragments of `kind`, in document order.
    pub container: usize,
    pub offset: usize,
    pub len: usize,
}

impl SearchMatch {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty query: no matches, no highlight.
    Cleared,
    NoResults,
    Found(usize),
}

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    code: Vec<SearchSource>,
    explanations: Vec<SearchSource>,
    query: String,
    matches: Vec<SearchMatch>,
    current: Option<usize>,
}

impl SearchIndex {
    pub fn from_deck(deck: &Deck) -> Self {
        let mut code = Vec::new();
        let mut explanations = Vec::new();

        for (slide_index, slide) in deck.slides.iter().enumerate() {
            for (local, text) in slide.code_blocks().enumerate() {
                code.push(SearchSource {
                    slide: slide_index,
                    local,
                    point: None,
                    text: text.to_string(),
                });
            }

            let mut point = 0;
            for (local, item) in slide.list_items().enumerate() {
                let point_index = (item.marker == ListMarker::Point).then(|| {
                    point += 1;
                    point - 1
                });
                explanations.push(SearchSource {
                    slide: slide_index,
                    local,
                    point: point_index,
                    text: item.text.clone(),
                });
            }
        }

        Self {
            code,
            explanations,
            ..Default::default()
        }
    }

    /// Rebuild the match list for `query`. The first match becomes current.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        self.query = query.to_string();
        self.matches.clear();
        self.current = None;

        if query.is_empty() {
            return SearchOutcome::Cleared;
        }

        let pattern = match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!("search pattern rejected: {e}");
                return SearchOutcome::NoResults;
            }
        };

        for (kind, sources) in [
            (SourceKind::Code, &self.code),
            (SourceKind::Explanation, &self.explanations),
        ] {
            for (container, source) in sources.iter().enumerate() {
                self.matches
                    .extend(pattern.find_iter(&source.text).map(|m| SearchMatch {
                        kind,
                        container,
                        offset: m.start(),
                        len: m.len(),
                    }));
            }
        }

        tracing::debug!(query, matches = self.matches.len(), "search");

        if self.matches.is_empty() {
            SearchOutcome::NoResults
        } else {
            self.current = Some(0);
            SearchOutcome::Found(self.matches.len())
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current.and_then(|i| self.matches.get(i))
    }

    /// Advance to the next match, wrapping to the first.
    pub fn find_next(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let next = self.current.map_or(0, |i| (i + 1) % self.matches.len());
        self.current = Some(next);
        self.matches.get(next)
    }

    /// Step back to the previous match, wrapping to the last.
    pub fn find_previous(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(i) if i > 0 => i - 1,
            _ => self.matches.len() - 1,
        };
        self.current = Some(prev);
        self.matches.get(prev)
    }

    pub fn source(&self, m: &SearchMatch) -> Option<&SearchSource> {
        match m.kind {
            SourceKind::Code => self.code.get(m.container),
            SourceKind::Explanation => self.explanations.get(m.container),
        }
    }

    /// The highlighted byte range inside fragment `local` of `kind` on
    /// `slide`, if the current match lives there.
    pub fn highlight(&self, kind: SourceKind, slide: usize, local: usize) -> Option<Range<usize>> {
        let m = self.current_match()?;
        let source = self.source(m)?;
        (m.kind == kind && source.slide == slide && source.local == local).then(|| m.range())
    }

    /// Status line text, `None` when no query is active.
    pub fn status(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        match self.current {
            Some(i) => Some(format!("{} of {} results", i + 1, self.matches.len())),
            None => Some("No results found".to_string()),
        }
    }
}
