use super::{Block, ListItem, ListMarker};

/// Parse one slide's markdown into blocks.
pub fn parse(content: &str) -> Vec<Block> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            i += 1;
            continue;
        }

        if let Some((fence, language)) = parse_fence_open(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let (code, next) = collect_fenced(&lines, i + 1, fence);
            blocks.push(Block::CodeBlock { language, code });
            i = next;
            continue;
        }

        if let Some((level, text)) = parse_heading(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading { level, text });
            i += 1;
            continue;
        }

        if parse_list_item(trimmed).is_some() {
            flush_paragraph(&mut paragraph, &mut blocks);
            let (block, next) = collect_list(&lines, i);
            blocks.push(block);
            i = next;
            continue;
        }

        paragraph.push(trimmed);
        i += 1;
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    blocks
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !lines.is_empty() {
        blocks.push(Block::Paragraph {
            text: lines.join(" "),
        });
        lines.clear();
    }
}

/// Opening fence: returns the fence string and the info-string language.
fn parse_fence_open(trimmed: &str) -> Option<(String, Option<String>)> {
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|&c| c == ch).count();
    if run < 3 {
        return None;
    }
    let info = trimmed[run..].trim();
    let language = info
        .split_whitespace()
        .next()
        .map(|lang| lang.to_ascii_lowercase());
    Some((trimmed[..run].to_string(), language))
}

/// Collect code lines up to the closing fence. An unclosed fence runs to the
/// end of the slide.
fn collect_fenced(lines: &[&str], start: usize, fence: String) -> (String, usize) {
    let mut code = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        let closes = trimmed.starts_with(fence.as_str())
            && trimmed.trim_start_matches(&fence[..1]).trim().is_empty();
        if closes {
            return (code.join("\n"), i + 1);
        }
        code.push(lines[i]);
        i += 1;
    }
    (code.join("\n"), i)
}

fn parse_heading(trimmed: &str) -> Option<(u8, String)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some((level as u8, rest.trim().to_string()))
}

fn parse_list_item(trimmed: &str) -> Option<(ListMarker, &str)> {
    for (prefix, marker) in [
        ("- ", ListMarker::Static),
        ("* ", ListMarker::Static),
        ("+ ", ListMarker::Point),
    ] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return Some((marker, rest.trim()));
        }
    }

    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = trimmed[digits..].strip_prefix(". ") {
            return Some((ListMarker::Ordered, rest.trim()));
        }
    }
    None
}

/// Collect consecutive list items. Indented non-item lines continue the
/// previous item; a blank line ends the list.
fn collect_list(lines: &[&str], start: usize) -> (Block, usize) {
    let mut items: Vec<ListItem> = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        if let Some((marker, text)) = parse_list_item(trimmed) {
            items.push(ListItem {
                marker,
                text: text.to_string(),
            });
        } else if line.starts_with([' ', '\t']) {
            if let Some(last) = items.last_mut() {
                last.text.push(' ');
                last.text.push_str(trimmed);
            }
        } else {
            break;
        }
        i += 1;
    }

    let ordered = items
        .first()
        .is_some_and(|item| item.marker == ListMarker::Ordered);
    (Block::List { ordered, items }, i)
}
