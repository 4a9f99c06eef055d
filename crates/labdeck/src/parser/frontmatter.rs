use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
}

/// Split a leading `---` YAML block off the document.
///
/// Returns default metadata and the whole document when there is no
/// frontmatter, or when it fails to parse.
pub fn extract(content: &str) -> (DeckMeta, String) {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return (DeckMeta::default(), content);
    };

    let Some(end) = find_closing_fence(rest) else {
        return (DeckMeta::default(), content);
    };

    let yaml = &rest[..end];
    let body = rest[end..]
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or("");

    match serde_yaml::from_str::<DeckMeta>(yaml) {
        Ok(meta) => (meta, body.to_string()),
        Err(e) => {
            tracing::warn!("ignoring malformed frontmatter: {e}");
            (DeckMeta::default(), body.to_string())
        }
    }
}

/// Byte offset of the line that closes the frontmatter block.
fn find_closing_fence(rest: &str) -> Option<usize> {
    let mut offset = 0;
    for line in rest.split('\n') {
        if line.trim_end() == "---" {
            return Some(offset);
        }
        offset += line.len() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fields() {
        let doc = "---\ntitle: Limits\ntheme: dark\nfooter: MATH 101\n---\n# First";
        let (meta, body) = extract(doc);
        assert_eq!(meta.title.as_deref(), Some("Limits"));
        assert_eq!(meta.theme.as_deref(), Some("dark"));
        assert_eq!(meta.footer.as_deref(), Some("MATH 101"));
        assert_eq!(body, "# First");
    }

    #[test]
    fn test_no_frontmatter() {
        let (meta, body) = extract("# Just a slide");
        assert!(meta.title.is_none());
        assert_eq!(body, "# Just a slide");
    }

    #[test]
    fn test_unclosed_frontmatter_is_body() {
        let doc = "---\ntitle: Oops\n# Slide";
        let (meta, body) = extract(doc);
        assert!(meta.title.is_none());
        assert_eq!(body, doc);
    }

    #[test]
    fn test_malformed_yaml_keeps_body() {
        let (meta, body) = extract("---\ntitle: [unterminated\n---\n# Slide");
        assert!(meta.title.is_none());
        assert_eq!(body, "# Slide");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (meta, _) = extract("---\ntitle: T\ntransition: fade\n---\n");
        assert_eq!(meta.title.as_deref(), Some("T"));
    }
}
