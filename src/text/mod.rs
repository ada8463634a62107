//! Search-oriented text segmentation
//!
//! Both the index builder and the ranker cut text into terms with the same
//! [`Tokenizer`], so a query term matches exactly the postings it was built from.

mod stopwords;
mod tokenizer;

pub use stopwords::{is_builtin_stop_word, BUILTIN_STOP_WORDS};
pub use tokenizer::{is_han, Tokenizer};
