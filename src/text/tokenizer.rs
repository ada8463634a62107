use super::stopwords::BUILTIN_STOP_WORDS;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// True for CJK unified ideographs (including extensions A and B)
pub fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

/// Splits text into lowercase search terms with stop-words removed
///
/// Latin and other space-delimited scripts are cut at Unicode word boundaries.
/// Runs of Han characters have no delimiters, so a run of two or more yields
/// every adjacent pair in order, and a lone character stands for itself. A
/// query for `搜索` then hits a document containing `搜索引擎` through the
/// shared bigram, while `中国` does not match `美国`.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Tokenizer {
    /// Builds a tokenizer with the built-in stop-words plus `extra`
    pub fn new(extra: &[String]) -> Self {
        let stop_words = BUILTIN_STOP_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra.iter().map(|w| w.trim().to_lowercase()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { stop_words }
    }

    pub fn is_stop_word(&self, term: &str) -> bool {
        self.stop_words.contains(term)
    }

    /// Terms of `text` in order of appearance; duplicates are kept
    pub fn terms(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut han_run: Vec<char> = Vec::new();

        for segment in text.split_word_bounds() {
            let mut chars = segment.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if is_han(c) {
                    han_run.push(c);
                    continue;
                }
            }

            self.flush_han_run(&mut han_run, &mut terms);

            if segment.chars().any(char::is_alphanumeric) {
                self.push_term(segment.to_lowercase(), &mut terms);
            }
        }
        self.flush_han_run(&mut han_run, &mut terms);

        terms
    }

    fn flush_han_run(&self, run: &mut Vec<char>, terms: &mut Vec<String>) {
        match run.as_slice() {
            [] => {}
            [c] => self.push_term(c.to_string(), terms),
            chars => {
                for pair in chars.windows(2) {
                    self.push_term(pair.iter().collect(), terms);
                }
            }
        }
        run.clear();
    }

    fn push_term(&self, term: String, terms: &mut Vec<String>) {
        if !self.is_stop_word(&term) {
            terms.push(term);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_words_lowercased() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.terms("Rust Programming, Tokio!"),
            vec!["rust", "programming", "tokio"]
        );
    }

    #[test]
    fn test_stop_words_removed() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.terms("The book of the year"), vec!["book", "year"]);
    }

    #[test]
    fn test_han_run_emits_bigrams_only() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.terms("搜索引擎"), vec!["搜索", "索引", "引擎"]);
        assert_eq!(tokenizer.terms("中国"), vec!["中国"]);
    }

    #[test]
    fn test_lone_han_char_kept_unless_stop_word() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.terms("我的"), vec!["我的"]);
        assert_eq!(tokenizer.terms("rust 书"), vec!["rust", "书"]);
        assert!(tokenizer.terms("的").is_empty());
    }

    #[test]
    fn test_mixed_scripts_break_han_runs() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.terms("学习Rust语言"),
            vec!["学习", "rust", "语言"]
        );
    }

    #[test]
    fn test_extra_stop_words() {
        let tokenizer = Tokenizer::new(&["Crate".to_string()]);
        assert_eq!(tokenizer.terms("rust crate"), vec!["rust"]);
    }

    #[test]
    fn test_punctuation_and_empty_input() {
        let tokenizer = Tokenizer::default();
        assert!(tokenizer.terms("").is_empty());
        assert!(tokenizer.terms(" ,.!？ ").is_empty());
    }

    #[test]
    fn test_duplicates_kept() {
        let tokenizer = Tokenizer::default();
        assert_eq!(tokenizer.terms("rust rust"), vec!["rust", "rust"]);
    }
}
