pub mod blocks;
pub mod frontmatter;
pub mod splitter;

pub use frontmatter::DeckMeta;

#[derive(Debug, Clone)]
pub struct Deck {
    pub meta: DeckMeta,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub marker: ListMarker,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListMarker {
    /// `-` or `*`: always visible
    Static,
    /// `+`: revealed one at a time
    Point,
    /// `1.`
    Ordered,
}

impl Slide {
    /// First heading of the slide, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn point_count(&self) -> usize {
        self.list_items()
            .filter(|item| item.marker == ListMarker::Point)
            .count()
    }

    /// Code block sources in document order.
    pub fn code_blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::CodeBlock { code, .. } => Some(code.as_str()),
            _ => None,
        })
    }

    /// Every list item of the slide in document order, across all lists.
    pub fn list_items(&self) -> impl Iterator<Item = &ListItem> {
        self.blocks.iter().flat_map(|b| match b {
            Block::List { items, .. } => items.as_slice(),
            _ => &[][..],
        })
    }
}

pub fn parse(content: &str) -> Deck {
    let (meta, body) = frontmatter::extract(content);
    let slides = splitter::split(&body)
        .into_iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| Slide {
            blocks: blocks::parse(&raw),
        })
        .collect();
    Deck { meta, slides }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_deck_parses() {
        let content = include_str!("../../../../decks/calculus-limits.md");
        let deck = parse(content);
        assert_eq!(deck.meta.title.as_deref(), Some("Experiment 1: Limits in MATLAB"));
        assert!(
            deck.slides.len() >= 5,
            "Expected at least 5 slides, got {}",
            deck.slides.len()
        );
        assert_eq!(deck.slides[0].title(), Some("Experiment 1: Limits in MATLAB"));
    }

    #[test]
    fn test_derivatives_deck_parses() {
        let content = include_str!("../../../../decks/calculus-derivatives.md");
        let deck = parse(content);
        assert_eq!(deck.meta.theme.as_deref(), Some("dark"));
        assert!(deck.slides.iter().any(|s| s.code_blocks().count() > 0));
    }

    #[test]
    fn test_point_count_ignores_static_items() {
        let deck = parse("# Steps\n\n- context\n+ first\n+ second\n* more context");
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].point_count(), 2);
        assert_eq!(deck.slides[0].list_items().count(), 4);
    }

    #[test]
    fn test_points_counted_across_lists() {
        let deck = parse("# Two lists\n\n+ a\n+ b\n\nBetween\n\n+ c");
        assert_eq!(deck.slides[0].point_count(), 3);
    }

    #[test]
    fn test_code_blocks_in_order() {
        let content = "# Code\n\n```matlab\nx = 1;\n```\n\nThen\n\n```matlab\ny = 2;\n```";
        let deck = parse(content);
        let codes: Vec<&str> = deck.slides[0].code_blocks().collect();
        assert_eq!(codes, vec!["x = 1;", "y = 2;"]);
    }

    #[test]
    fn test_multiple_slides() {
        let content = "# Slide One\n\nContent\n\n---\n\n# Slide Two\n\nMore content";
        let deck = parse(content);
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[1].title(), Some("Slide Two"));
    }

    #[test]
    fn test_empty_document_has_no_slides() {
        let deck = parse("---\ntitle: Nothing\n---\n\n");
        assert!(deck.slides.is_empty());
        assert_eq!(deck.meta.title.as_deref(), Some("Nothing"));
    }
}
