/// Function words dropped from both documents and queries
pub const BUILTIN_STOP_WORDS: &[&str] = &[
    // Chinese
    "的", "了", "和", "是", "在", "就", "都", "而", "及", "与", "着", "或", "一个", "没有",
    "我们", "你们", "他们", "它们", "这", "那", "之", "也", "但", "并", "很", "把", "被",
    "让", "从", "向", "对", "于", "以", "为", "其", "此", "等", "吗", "呢", "吧", "啊",
    // English
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in",
    "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were",
    "will", "with",
];

pub fn is_builtin_stop_word(term: &str) -> bool {
    BUILTIN_STOP_WORDS.contains(&term)
}
