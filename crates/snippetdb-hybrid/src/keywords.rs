/// Words that never count as keywords.
pub const STOP_WORDS: [&str; 23] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "how", "what", "when",
    "where", "why", "tips", "help", "advice", "guide",
];

/// Lower-cased word tokens of `query` minus stop words and words of two
/// characters or fewer. Order and duplicates are kept.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() > 2)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stop_words_and_short_words() {
        assert_eq!(extract_keywords("How can I improve my sleep?"), vec!["can", "improve", "sleep"]);
        assert_eq!(extract_keywords("Tips & advice: diet, diet, guide"), vec!["diet", "diet"]);
        assert!(extract_keywords("").is_empty());
    }

    #[test]
    fn keeps_underscores_and_unicode_letters() {
        assert_eq!(extract_keywords("deep_sleep café"), vec!["deep_sleep", "café"]);
    }
}
