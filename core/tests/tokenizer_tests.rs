use search_core::tokenizer::{preprocess, tokenize, Stopwords};

fn sw(words: &[&str]) -> Stopwords {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The café's menu.", &Stopwords::new());
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"the".to_string()));
    assert_eq!(words.len(), 6);
}

#[test]
fn it_filters_stopwords_before_stemming() {
    let words = tokenize("The quick brown fox and the lazy dog", &sw(&["the", "and"]));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazi", "dog"]);
}

#[test]
fn it_removes_punctuation_without_splitting() {
    assert_eq!(preprocess("Cat,Dog. (Mouse)"), "catdog mouse");
    assert_eq!(tokenize("cat,dog", &Stopwords::new()), vec!["catdog"]);
}

#[test]
fn it_keeps_order_and_duplicates() {
    let words = tokenize("dogs bark cats, cats hiss dogs", &Stopwords::new());
    assert_eq!(words, vec!["dog", "bark", "cat", "cat", "hiss", "dog"]);
}

#[test]
fn it_drops_tokens_that_were_only_punctuation() {
    assert!(tokenize(" -- ... !! ", &Stopwords::new()).is_empty());
}
