//! Porter (1980) suffix stripping, in the variant NLTK's `PorterStemmer` runs by
//! default: a small table of irregular forms, words of two letters or fewer left
//! alone, `ies`/`ied` special cases, `y -> i` only after a consonant, and the
//! extra `fulli`/`logi` step 2 rules.

type Word = Vec<char>;
type Condition = fn(&[char]) -> bool;
type Rule = (&'static str, &'static str, Option<Condition>);

const IRREGULAR: &[(&str, &str)] = &[
    ("sky", "sky"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

pub fn stem(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some((_, irregular)) = IRREGULAR.iter().find(|(form, _)| *form == lower) {
        return irregular.to_string();
    }
    let w: Word = lower.chars().collect();
    if w.len() <= 2 {
        return lower;
    }
    let w = step5b(step5a(step4(step3(step2(step1c(step1b(step1a(w))))))));
    w.into_iter().collect()
}

fn is_consonant(w: &[char], i: usize) -> bool {
    match w[i] {
        'a' | 'e' | 'i' | 'o' | 'u' => false,
        'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant runs, the `m` in `[C](VC)^m[V]`.
fn measure(w: &[char]) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && prev_vowel {
            m += 1;
        }
        prev_vowel = !consonant;
    }
    m
}

fn positive_measure(w: &[char]) -> bool {
    measure(w) > 0
}

fn measure_gt_1(w: &[char]) -> bool {
    measure(w) > 1
}

fn contains_vowel(w: &[char]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[char]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

fn ends_cvc(w: &[char]) -> bool {
    let n = w.len();
    (n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], 'w' | 'x' | 'y'))
        || (n == 2 && !is_consonant(w, 0) && is_consonant(w, 1))
}

fn ends_with(w: &[char], suffix: &str) -> bool {
    w.len() >= suffix.len() && w[w.len() - suffix.len()..].iter().copied().eq(suffix.chars())
}

fn strip<'w>(w: &'w [char], suffix: &str) -> &'w [char] {
    &w[..w.len() - suffix.len()]
}

fn join(stem: &[char], replacement: &str) -> Word {
    stem.iter().copied().chain(replacement.chars()).collect()
}

/// The first rule whose suffix matches decides; a failed condition leaves the word as is.
fn apply_rules(w: Word, rules: &[Rule]) -> Word {
    for &(suffix, replacement, condition) in rules {
        if ends_with(&w, suffix) {
            let stem = strip(&w, suffix);
            if condition.map_or(true, |holds| holds(stem)) {
                return join(stem, replacement);
            }
            return w;
        }
    }
    w
}

fn step1a(w: Word) -> Word {
    if w.len() == 4 && ends_with(&w, "ies") {
        return join(strip(&w, "ies"), "ie");
    }
    apply_rules(w, &[("sses", "ss", None), ("ies", "i", None), ("ss", "ss", None), ("s", "", None)])
}

fn step1b(w: Word) -> Word {
    if ends_with(&w, "ied") {
        let replacement = if w.len() == 4 { "ie" } else { "i" };
        return join(strip(&w, "ied"), replacement);
    }
    if ends_with(&w, "eed") {
        let stem = strip(&w, "eed");
        return if positive_measure(stem) { join(stem, "ee") } else { w };
    }
    let Some(stem) = ["ed", "ing"]
        .iter()
        .find(|suffix| ends_with(&w, suffix) && contains_vowel(strip(&w, suffix)))
        .map(|suffix| strip(&w, suffix).to_vec())
    else {
        return w;
    };

    if ends_with(&stem, "at") || ends_with(&stem, "bl") || ends_with(&stem, "iz") {
        return join(&stem, "e");
    }
    if ends_double_consonant(&stem) {
        let mut stem = stem;
        if !matches!(stem[stem.len() - 1], 'l' | 's' | 'z') {
            stem.pop();
        }
        return stem;
    }
    if measure(&stem) == 1 && ends_cvc(&stem) {
        return join(&stem, "e");
    }
    stem
}

fn step1c(w: Word) -> Word {
    fn after_consonant(stem: &[char]) -> bool {
        stem.len() > 1 && is_consonant(stem, stem.len() - 1)
    }
    apply_rules(w, &[("y", "i", Some(after_consonant))])
}

fn step2(w: Word) -> Word {
    if ends_with(&w, "alli") && positive_measure(strip(&w, "alli")) {
        return step2(join(strip(&w, "alli"), "al"));
    }
    // The "l" of "logi" stays with the stem so that "geologi" and "theologi" behave alike.
    if ends_with(&w, "logi") {
        return if positive_measure(strip(&w, "ogi")) { join(strip(&w, "logi"), "log") } else { w };
    }
    let p = Some(positive_measure as Condition);
    apply_rules(
        w,
        &[
            ("ational", "ate", p),
            ("tional", "tion", p),
            ("enci", "ence", p),
            ("anci", "ance", p),
            ("izer", "ize", p),
            ("bli", "ble", p),
            ("alli", "al", p),
            ("entli", "ent", p),
            ("eli", "e", p),
            ("ousli", "ous", p),
            ("ization", "ize", p),
            ("ation", "ate", p),
            ("ator", "ate", p),
            ("alism", "al", p),
            ("iveness", "ive", p),
            ("fulness", "ful", p),
            ("ousness", "ous", p),
            ("aliti", "al", p),
            ("iviti", "ive", p),
            ("biliti", "ble", p),
            ("fulli", "ful", p),
        ],
    )
}

fn step3(w: Word) -> Word {
    let p = Some(positive_measure as Condition);
    apply_rules(
        w,
        &[
            ("icate", "ic", p),
            ("ative", "", p),
            ("alize", "al", p),
            ("iciti", "ic", p),
            ("ical", "ic", p),
            ("ful", "", p),
            ("ness", "", p),
        ],
    )
}

fn step4(w: Word) -> Word {
    fn ion_stem(stem: &[char]) -> bool {
        measure_gt_1(stem) && matches!(stem.last(), Some('s' | 't'))
    }
    let m = Some(measure_gt_1 as Condition);
    apply_rules(
        w,
        &[
            ("al", "", m),
            ("ance", "", m),
            ("ence", "", m),
            ("er", "", m),
            ("ic", "", m),
            ("able", "", m),
            ("ible", "", m),
            ("ant", "", m),
            ("ement", "", m),
            ("ment", "", m),
            ("ent", "", m),
            ("ion", "", Some(ion_stem)),
            ("ou", "", m),
            ("ism", "", m),
            ("ate", "", m),
            ("iti", "", m),
            ("ous", "", m),
            ("ive", "", m),
            ("ize", "", m),
        ],
    )
}

fn step5a(w: Word) -> Word {
    if ends_with(&w, "e") {
        let stem = strip(&w, "e");
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            return stem.to_vec();
        }
    }
    w
}

fn step5b(mut w: Word) -> Word {
    if ends_with(&w, "ll") && measure_gt_1(&w[..w.len() - 1]) {
        w.pop();
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pairs: &[(&str, &str)]) {
        for (word, expected) in pairs {
            assert_eq!(stem(word), *expected, "stem({word})");
        }
    }

    #[test]
    fn classic_porter_examples() {
        check(&[
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("cats", "cat"),
            ("agreed", "agre"),
            ("hopping", "hop"),
            ("filing", "file"),
            ("running", "run"),
            ("relational", "relat"),
            ("generalization", "gener"),
            ("hiss", "hiss"),
            ("barking", "bark"),
        ]);
    }

    #[test]
    fn porter_and_porter2_disagree_here() {
        // Snowball English stems these to "general" and "knight".
        check(&[("generalization", "gener"), ("knightly", "knightli")]);
    }

    #[test]
    fn irregular_and_short_words() {
        check(&[("news", "news"), ("skies", "sky"), ("dying", "die"), ("ties", "tie"), ("is", "is"), ("og", "og")]);
    }

    #[test]
    fn non_ascii_letters_do_not_panic() {
        assert_eq!(stem("cafés"), "café");
    }
}
