// Word tokenizer shared by the similarity scorer and the classifier's
// vectorizer. Tokens are runs of two or more word characters, lowercased.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

pub static ENGLISH_STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
        "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
        "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
        "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Raw tokens in document order. `lowercase` folds case before matching.
pub fn tokens(text: &str, lowercase: bool) -> Vec<String> {
    let text = if lowercase {
        text.to_lowercase()
    } else {
        text.to_string()
    };
    TOKEN
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercased tokens with English stop words removed.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokens(text, true)
        .into_iter()
        .filter(|t| !ENGLISH_STOP_WORDS.contains(t.as_str()))
        .collect()
}

/// Word n-grams for every `n` in `min..=max`, joined by single spaces.
pub fn ngrams(tokens: &[String], min: usize, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in min.max(1)..=max {
        if n == 1 {
            out.extend(tokens.iter().cloned());
            continue;
        }
        out.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_characters_are_dropped() {
        assert_eq!(tokens("I saw a UFO", true), vec!["saw", "ufo"]);
    }

    #[test]
    fn punctuation_splits_tokens() {
        assert_eq!(
            tokens("Don't panic: state-run media.", true),
            vec!["don", "panic", "state", "run", "media"]
        );
    }

    #[test]
    fn case_is_kept_when_requested() {
        assert_eq!(tokens("NASA Report", false), vec!["NASA", "Report"]);
    }

    #[test]
    fn stop_words_are_removed() {
        assert_eq!(
            content_tokens("The minister said that the floods were over"),
            vec!["minister", "said", "floods"]
        );
        assert!(content_tokens("it is what it is").is_empty());
    }

    #[test]
    fn bigrams_follow_unigrams() {
        let toks: Vec<String> = ["heavy", "monsoon", "rain"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            ngrams(&toks, 1, 2),
            vec!["heavy", "monsoon", "rain", "heavy monsoon", "monsoon rain"]
        );
        assert_eq!(ngrams(&toks, 2, 2), vec!["heavy monsoon", "monsoon rain"]);
    }
}
