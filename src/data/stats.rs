// ============================================================
// Layer 4 — Text Statistics
// ============================================================
// Computes the per-review diagnostics that feed the outlier
// filter and the `describe` report:
//
//   word count, unique-word count, character count,
//   stop-word count, punctuation count, mean word length
//
// Words are whitespace-delimited tokens of the already
// lower-cased, markup-free text. Punctuation means ASCII
// punctuation characters (!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~).
//
// Reference: Rust Book §8 (Hash Maps / Hash Sets)
//            Rust Book §13 (Iterators)

use std::collections::HashSet;

use crate::domain::review::TextStats;

/// Fixed English stop-word list.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because",
    "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below",
    "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s",
    "t", "can", "will", "just", "don", "don't", "should", "should've", "now", "d",
    "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Computes [`TextStats`] for review text.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    stopwords: HashSet<String>,
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::from_list(ENGLISH_STOPWORDS)
    }
}

impl TextAnalyzer {
    /// Analyzer with the built-in English stop-word list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with a custom stop-word list. Matching is exact,
    /// so the list should be lower-case like the text it is used on.
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn analyze(&self, text: &str) -> TextStats {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let word_count = tokens.len();
        let unique_word_count = tokens.iter().collect::<HashSet<_>>().len();
        let stopword_count = tokens.iter().filter(|t| self.is_stopword(t)).count();

        let token_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
        let mean_word_length = if word_count == 0 {
            0.0
        } else {
            token_chars as f64 / word_count as f64
        };

        TextStats {
            word_count,
            unique_word_count,
            char_count: text.chars().count(),
            stopword_count,
            punctuation_count: text.chars().filter(char::is_ascii_punctuation).count(),
            mean_word_length,
        }
    }
}
