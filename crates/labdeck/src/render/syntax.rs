//! Syntax-highlighted code layout via syntect.

use std::ops::Range;
use std::sync::LazyLock;

use eframe::egui::text::{LayoutJob, TextFormat};
use eframe::egui::{Color32, FontId};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// A byte range of the source text painted with a background color.
#[derive(Debug, Clone)]
pub struct Highlight {
    pub range: Range<usize>,
    pub color: Color32,
}

/// Append `text`, which starts at byte `start` of its source, painting the
/// part that falls inside `highlight`.
pub fn append_highlighted(
    job: &mut LayoutJob,
    text: &str,
    start: usize,
    format: TextFormat,
    highlight: Option<&Highlight>,
) {
    let end = start + text.len();
    let overlap = highlight
        .map(|h| h.range.start.max(start)..h.range.end.min(end))
        .filter(|r| r.start < r.end);

    let (Some(overlap), Some(highlight)) = (overlap, highlight) else {
        job.append(text, 0.0, format);
        return;
    };

    let (before, rest) = text.split_at(overlap.start - start);
    let (marked, after) = rest.split_at(overlap.end - overlap.start);
    if !before.is_empty() {
        job.append(before, 0.0, format.clone());
    }
    job.append(
        marked,
        0.0,
        TextFormat {
            background: highlight.color,
            ..format.clone()
        },
    );
    if !after.is_empty() {
        job.append(after, 0.0, format);
    }
}

/// Lay out `code` with syntax colors for `language` (plain text when the
/// language is unknown) and an optional search highlight.
pub fn highlight_code(
    code: &str,
    language: Option<&str>,
    font_size: f32,
    theme: &Theme,
    max_width: f32,
    highlight: Option<&Highlight>,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.wrap.max_width = max_width;
    let font_id = FontId::monospace(font_size);

    let syntax = language
        .and_then(|lang| SYNTAX_SET.find_syntax_by_token(lang))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let Some(syntect_theme) = THEME_SET.themes.get(theme.syntect_theme_name()) else {
        tracing::warn!(theme = theme.syntect_theme_name(), "syntect theme missing");
        let format = TextFormat::simple(font_id, theme.code_foreground);
        append_highlighted(&mut job, code, 0, format, highlight);
        return job;
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    let mut offset = 0;
    for line in LinesWithEndings::from(code) {
        let regions = highlighter
            .highlight_line(line, &SYNTAX_SET)
            .unwrap_or_else(|e| {
                tracing::debug!("highlighting failed, falling back to plain text: {e}");
                vec![(Style::default(), line)]
            });
        for (style, text) in regions {
            let fg = style.foreground;
            let color = if fg.a == 0 {
                theme.code_foreground
            } else {
                Color32::from_rgb(fg.r, fg.g, fg.b)
            };
            let format = TextFormat::simple(font_id.clone(), color);
            append_highlighted(&mut job, text, offset, format, highlight);
            offset += text.len();
        }
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TextFormat {
        TextFormat::simple(FontId::monospace(12.0), Color32::BLACK)
    }

    #[test]
    fn test_split_around_highlight() {
        let mut job = LayoutJob::default();
        let highlight = Highlight {
            range: 8..13,
            color: Color32::YELLOW,
        };
        append_highlighted(&mut job, "L = limit(x)", 4, plain(), Some(&highlight));
        let parts: Vec<&str> = job
            .sections
            .iter()
            .map(|s| &job.text[s.byte_range.clone()])
            .collect();
        assert_eq!(parts, vec!["L = ", "limit", "(x)"]);
        assert_eq!(job.sections[1].format.background, Color32::YELLOW);
        assert_eq!(job.sections[0].format.background, Color32::TRANSPARENT);
    }

    #[test]
    fn test_highlight_outside_segment_is_ignored() {
        let mut job = LayoutJob::default();
        let highlight = Highlight {
            range: 0..3,
            color: Color32::YELLOW,
        };
        append_highlighted(&mut job, "tail", 10, plain(), Some(&highlight));
        assert_eq!(job.sections.len(), 1);
    }

    #[test]
    fn test_code_layout_keeps_text_and_single_highlight() {
        let code = "syms x\nL = limit(sin(x)/x, x, 0)\n";
        let start = code.find("limit").expect("present");
        let highlight = Highlight {
            range: start..start + 5,
            color: Color32::YELLOW,
        };
        let job = highlight_code(
            code,
            Some("matlab"),
            14.0,
            &Theme::light(),
            600.0,
            Some(&highlight),
        );
        assert_eq!(job.text, code);
        let marked: Vec<&str> = job
            .sections
            .iter()
            .filter(|s| s.format.background == Color32::YELLOW)
            .map(|s| &job.text[s.byte_range.clone()])
            .collect();
        assert_eq!(marked.concat(), "limit");
    }
}
