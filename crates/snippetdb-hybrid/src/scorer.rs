//! Additive score boosts on top of cosine similarity.
//!
//! All matching is literal, case-insensitive substring containment.

/// Added per distinct keyword found in the chunk.
pub const KEYWORD_BONUS: f32 = 0.10;
/// Added per distinct query word found on a title/key-ideas line.
pub const FIELD_BONUS: f32 = 0.15;
/// Markers of a field line, matched lower-case.
pub const FIELD_MARKERS: [&str; 2] = ["title:", "key ideas:"];
/// Only this many leading lines of a chunk are inspected for field markers.
pub const FIELD_LINES: usize = 3;

/// Per-query scoring state: lower-cased, de-duplicated keywords and query words.
#[derive(Debug, Clone, Default)]
pub struct HybridScorer {
    keywords: Vec<String>,
    query_words: Vec<String>,
}

impl HybridScorer {
    pub fn new(query: &str, keywords: &[String]) -> Self {
        let query_lower = query.to_lowercase();
        Self {
            keywords: distinct(keywords.iter().map(|k| k.to_lowercase())),
            query_words: distinct(query_lower.split_whitespace().map(str::to_string)),
        }
    }

    /// Number of distinct keywords contained in `text`.
    pub fn keyword_matches(&self, text: &str) -> usize {
        let text_lower = text.to_lowercase();
        self.keywords.iter().filter(|k| text_lower.contains(k.as_str())).count()
    }

    pub fn keyword_bonus(&self, text: &str) -> f32 {
        KEYWORD_BONUS * self.keyword_matches(text) as f32
    }

    /// Bonus from the first marked line (among the first three) that contains
    /// at least one query word.
    pub fn field_bonus(&self, text: &str) -> f32 {
        for line in text.split('\n').take(FIELD_LINES) {
            let line_lower = line.to_lowercase();
            if !FIELD_MARKERS.iter().any(|m| line_lower.contains(m)) {
                continue;
            }
            let matches = self.query_words.iter().filter(|w| line_lower.contains(w.as_str())).count();
            if matches > 0 {
                return FIELD_BONUS * matches as f32;
            }
        }
        0.0
    }

    /// Full hybrid score: cosine + keyword bonus + field bonus.
    pub fn score(&self, cosine: f32, text: &str) -> f32 {
        cosine + self.keyword_bonus(text) + self.field_bonus(text)
    }

    /// Score used when picking a chunk for an intent override: no field bonus.
    pub fn override_score(&self, cosine: f32, text: &str) -> f32 {
        cosine + self.keyword_bonus(text)
    }
}

fn distinct(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
