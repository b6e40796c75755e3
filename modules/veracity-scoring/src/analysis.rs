// Keyword and sentiment heuristics shown next to a verdict. They explain,
// they never vote.

use std::sync::LazyLock;

use regex::Regex;
use veracity_common::{ContentAnalysis, Sentiment};

use crate::tokenize::tokens;

const SUSPICIOUS_WORDS: [&str; 6] = ["shocking", "breaking", "viral", "amazing", "exclusive", "rumor"];
const TRUST_WORDS: [&str; 7] = [
    "report",
    "official",
    "source",
    "confirmed",
    "data",
    "government",
    "research",
];

const MIN_WORDS: usize = 50;
const MAX_SUSPICIOUS: usize = 2;
const POLARITY_BAND: f64 = 0.2;

pub const NO_TEXT_FLAG: &str = "No text provided.";
pub const SENSATIONAL_FLAG: &str = "Contains emotionally charged or exaggerated words.";
pub const NEGATIVE_FLAG: &str = "Negative or fear-based sentiment detected.";
pub const SHORT_FLAG: &str = "Text too short, might lack credibility.";
pub const NO_TRUST_FLAG: &str = "No trustworthy keywords detected (like 'official', 'report').";

struct Keyword {
    word: &'static str,
    pattern: Regex,
}

fn keyword_patterns(words: &[&'static str]) -> Vec<Keyword> {
    words
        .iter()
        .map(|&word| Keyword {
            word,
            pattern: Regex::new(&format!(r"(?i)\b{word}\b")).expect("valid keyword pattern"),
        })
        .collect()
}

static SUSPICIOUS: LazyLock<Vec<Keyword>> = LazyLock::new(|| keyword_patterns(&SUSPICIOUS_WORDS));
static TRUST: LazyLock<Vec<Keyword>> = LazyLock::new(|| keyword_patterns(&TRUST_WORDS));

/// Word polarities in [-1, 1].
const LEXICON: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("best", 1.0),
    ("positive", 0.2),
    ("happy", 0.8),
    ("success", 0.3),
    ("successful", 0.75),
    ("win", 0.8),
    ("wins", 0.8),
    ("improve", 0.4),
    ("improved", 0.4),
    ("safe", 0.5),
    ("hope", 0.3),
    ("celebrate", 0.5),
    ("amazing", 0.6),
    ("wonderful", 1.0),
    ("strong", 0.4),
    ("growth", 0.2),
    ("benefit", 0.3),
    ("bad", -0.7),
    ("terrible", -1.0),
    ("worst", -1.0),
    ("horrible", -1.0),
    ("negative", -0.3),
    ("sad", -0.5),
    ("angry", -0.5),
    ("fear", -0.6),
    ("afraid", -0.6),
    ("dangerous", -0.6),
    ("deadly", -0.8),
    ("dead", -0.2),
    ("death", -0.4),
    ("kill", -0.6),
    ("killed", -0.6),
    ("crisis", -0.5),
    ("disaster", -0.8),
    ("attack", -0.5),
    ("panic", -0.6),
    ("fail", -0.5),
    ("failed", -0.5),
    ("fake", -0.5),
    ("shocking", -0.6),
    ("scam", -0.7),
    ("corrupt", -0.7),
    ("threat", -0.5),
];

const NEGATIONS: [&str; 4] = ["not", "never", "no", "don"];

/// Mean polarity of lexicon words in `text`; a negation directly before a
/// word halves and flips it. No lexicon hits means 0.
pub fn polarity(text: &str) -> f64 {
    let words = tokens(text, true);
    let mut scores = Vec::new();

    for (i, word) in words.iter().enumerate() {
        let Some(&(_, value)) = LEXICON.iter().find(|(w, _)| *w == word.as_str()) else {
            continue;
        };
        let negated = i > 0 && NEGATIONS.contains(&words[i - 1].as_str());
        scores.push(if negated { value * -0.5 } else { value });
    }

    if scores.is_empty() {
        0.0
    } else {
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }
}

fn sentiment(text: &str) -> Sentiment {
    let score = polarity(text);
    if score > POLARITY_BAND {
        Sentiment::Positive
    } else if score < -POLARITY_BAND {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn matching(keywords: &[Keyword], text: &str) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| k.pattern.is_match(text))
        .map(|k| k.word.to_string())
        .collect()
}

pub fn analyze_content(text: &str) -> ContentAnalysis {
    let text = text.trim();
    if text.is_empty() {
        return ContentAnalysis {
            suspicious_keywords: Vec::new(),
            trust_keywords: Vec::new(),
            sentiment: Sentiment::Neutral,
            red_flags: vec![NO_TEXT_FLAG.to_string()],
        };
    }

    let suspicious_keywords = matching(&SUSPICIOUS, text);
    let trust_keywords = matching(&TRUST, text);
    let sentiment = sentiment(text);

    let mut red_flags = Vec::new();
    if suspicious_keywords.len() > MAX_SUSPICIOUS {
        red_flags.push(SENSATIONAL_FLAG.to_string());
    }
    if sentiment == Sentiment::Negative {
        red_flags.push(NEGATIVE_FLAG.to_string());
    }
    if text.split_whitespace().count() < MIN_WORDS {
        red_flags.push(SHORT_FLAG.to_string());
    }
    if trust_keywords.is_empty() {
        red_flags.push(NO_TRUST_FLAG.to_string());
    }

    ContentAnalysis {
        suspicious_keywords,
        trust_keywords,
        sentiment,
        red_flags,
    }
}
