use crate::stemmer::stem;
use crate::Term;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

pub type Stopwords = HashSet<String>;

lazy_static! {
    // ASCII punctuation, the same set the corpus tooling has always stripped.
    static ref PUNCT: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
    static ref DEFAULT_STOPWORDS: Stopwords = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        // Stopwords are compared after punctuation stripping, so "don't" must be stored as "dont".
        words.iter().map(|w| PUNCT.replace_all(w, "").into_owned()).collect()
    };
}

/// Built-in English stopword list, used when no stopword file is available.
pub fn default_stopwords() -> Stopwords {
    DEFAULT_STOPWORDS.clone()
}

/// Lowercase and remove punctuation without inserting whitespace, so `"cat,dog"` becomes `"catdog"`.
pub fn preprocess(text: &str) -> String {
    PUNCT.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Tokenize text into Porter-stemmed terms in input order, one entry per occurrence.
///
/// Stopwords are matched against the unstemmed, lowercased token. Pass an empty
/// set to keep every token.
pub fn tokenize(text: &str, stopwords: &Stopwords) -> Vec<Term> {
    preprocess(text)
        .split_whitespace()
        .filter(|token| !token.is_empty() && !stopwords.contains(*token))
        .map(stem)
        .collect()
}
