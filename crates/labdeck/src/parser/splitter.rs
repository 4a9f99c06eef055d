/// Split a deck body (after frontmatter extraction) into raw slide strings.
///
/// A slide break happens at:
/// 1. a `---` line with blank lines (or the document edge) on both sides
/// 2. three or more consecutive blank lines
/// 3. a `# ` heading when the current slide already has content
///
/// Lines inside fenced code blocks never cause a break.
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();

    let mut slides = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence = Fence::default();
    let mut blank_run = 0usize;

    for (i, line) in lines.iter().copied().enumerate() {
        let trimmed = line.trim();
        let in_code = fence.observe(trimmed);

        if !in_code {
            if is_dash_separator(trimmed) {
                let prev_blank = i == 0 || lines[i - 1].trim().is_empty();
                let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
                if prev_blank && next_blank {
                    flush(&mut current, &mut slides);
                    blank_run = 0;
                    continue;
                }
            }

            if trimmed.is_empty() {
                blank_run += 1;
                if blank_run == 3 {
                    flush(&mut current, &mut slides);
                }
            } else {
                blank_run = 0;
            }

            if line.starts_with("# ") && has_content(&current) {
                flush(&mut current, &mut slides);
            }
        }

        current.push(line);
    }
    flush(&mut current, &mut slides);

    slides
}

fn flush(current: &mut Vec<&str>, slides: &mut Vec<String>) {
    let text = current.join("\n").trim().to_string();
    if !text.is_empty() {
        slides.push(text);
    }
    current.clear();
}

fn has_content(lines: &[&str]) -> bool {
    lines.iter().any(|l| !l.trim().is_empty())
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Tracks whether the scanner is inside a ``` or ~~~ fenced block.
#[derive(Default)]
struct Fence {
    open: Option<(char, usize)>,
}

impl Fence {
    /// Feed one trimmed line. Returns true while the line belongs to a fence
    /// (including the opening line).
    fn observe(&mut self, trimmed: &str) -> bool {
        match self.open {
            Some((ch, len)) => {
                let run = trimmed.chars().take_while(|&c| c == ch).count();
                if run >= len && trimmed[run * ch.len_utf8()..].trim().is_empty() {
                    self.open = None;
                }
                true
            }
            None => {
                let Some(ch) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~') else {
                    return false;
                };
                let run = trimmed.chars().take_while(|&c| c == ch).count();
                if run >= 3 {
                    self.open = Some((ch, run));
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_separator() {
        let slides = split("Slide one\n\n---\n\nSlide two");
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_dash_without_blank_lines_is_content() {
        let slides = split("Slide one\n---\nstill one");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_blank_line_split() {
        let slides = split("Slide one\n\n\n\nSlide two");
        assert_eq!(slides, vec!["Slide one", "Slide two"]);
    }

    #[test]
    fn test_heading_inference() {
        let slides = split("# First\n\nContent\n\n# Second\n\nMore content");
        assert_eq!(slides.len(), 2);
        assert!(slides[0].starts_with("# First"));
        assert!(slides[1].starts_with("# Second"));
    }

    #[test]
    fn test_first_heading_does_not_split() {
        let slides = split("# Only Heading\n\nContent here");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_h2_no_split() {
        let slides = split("# Title\n\n## Subtitle\n\nContent");
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_combined_separators_make_one_break() {
        let slides = split("Slide one\n\n\n\n---\n\n\n\nSlide two");
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn test_matlab_comment_in_code_block_no_split() {
        let body = "# Title\n\n```matlab\n% comment\n# not a heading\n---\n\nx = 1;\n```";
        let slides = split(body);
        assert_eq!(slides.len(), 1, "fenced lines must never split: {slides:?}");
    }

    #[test]
    fn test_heading_after_closed_fence_splits() {
        let body = "# One\n\n```\ncode\n```\n# Two";
        let slides = split(body);
        assert_eq!(slides.len(), 2);
    }
}
