//! Case-insensitive keyword matching.

use crate::models::Keyword;

/// True when `keyword` occurs in `text`, ignoring case. Missing or empty
/// text never matches.
pub fn matches(text: Option<&str>, keyword: &str) -> bool {
    match text {
        Some(text) if !text.is_empty() => text.to_lowercase().contains(&keyword.to_lowercase()),
        _ => false,
    }
}

/// Keywords that occur in `text`, in the order given.
pub fn matching<'a>(text: &'a str, keywords: &'a [Keyword]) -> impl Iterator<Item = &'a Keyword> + 'a {
    keywords
        .iter()
        .filter(move |keyword| matches(Some(text), &keyword.word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(id: i64, word: &str) -> Keyword {
        Keyword {
            id,
            word: word.to_string(),
            active: true,
        }
    }

    #[test]
    fn ignores_case() {
        assert!(matches(Some("New LINUX kernel"), "linux"));
        assert!(matches(Some("new linux kernel"), "Linux"));
        assert!(matches(Some("Новые ТЕХНОЛОГИИ в школах"), "технологии"));
    }

    #[test]
    fn substring_without_tokenizing() {
        assert!(matches(Some("Интернет-провайдеры"), "интернет"));
        assert!(matches(Some("bioscience"), "science"));
        assert!(!matches(Some("Rust 1.80 released"), "linux"));
    }

    #[test]
    fn empty_or_missing_text_never_matches() {
        assert!(!matches(None, "linux"));
        assert!(!matches(Some(""), "linux"));
        assert!(!matches(Some(""), ""));
    }

    #[test]
    fn matching_keeps_registry_order() {
        let keywords = [keyword(1, "наука"), keyword(2, "Linux"), keyword(3, "kernel")];

        let found: Vec<i64> = matching("Linux kernel and наука", &keywords)
            .map(|k| k.id)
            .collect();

        assert_eq!(found, [1, 2, 3]);
        assert_eq!(matching("nothing here", &keywords).count(), 0);
    }
}
