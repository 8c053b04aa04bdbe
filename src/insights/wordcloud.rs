//! ワードクラウド用の単語頻度。描画は行わず、頻度と相対重みだけを返す。
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::util::text::normalize_text;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w[\w']+").expect("word pattern is valid"));

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't",
        "did", "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each",
        "else", "ever", "few", "for", "from", "further", "get", "had", "hadn't", "has", "hasn't",
        "have", "haven't", "having", "he", "he'd", "he'll", "he's", "hence", "her", "here",
        "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "however", "http",
        "https", "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it",
        "it's", "its", "itself", "just", "k", "let's", "like", "me", "more", "most", "mustn't",
        "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other",
        "otherwise", "ought", "our", "ours", "ourselves", "out", "over", "own", "r", "same",
        "shall", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "since",
        "so", "some", "such", "than", "that", "that's", "the", "their", "theirs", "them",
        "themselves", "then", "there", "there's", "therefore", "these", "they", "they'd",
        "they'll", "they're", "they've", "this", "those", "through", "to", "too", "under",
        "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
        "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while",
        "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www",
        "you", "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// 単語と出現回数、最頻語を1.0とした相対重み。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
    pub weight: f64,
}

fn normalize_token(token: &str) -> Option<String> {
    let lower = token.to_lowercase();
    let lower = lower.strip_suffix("'s").map_or(lower.clone(), str::to_string);
    if lower.chars().count() < 2
        || STOPWORDS.contains(lower.as_str())
        || lower.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some(lower)
}

/// テキスト群から頻出語を数え、上位`max_words`件を返す。
///
/// 複数形`xs`は単数形`x`も出現している場合に`x`へ合算する。
#[must_use]
pub fn word_frequencies<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    max_words: usize,
) -> Vec<WordFrequency> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        let text = normalize_text(text);
        for token in WORD_PATTERN.find_iter(&text) {
            if let Some(word) = normalize_token(token.as_str()) {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
    }

    let plurals: Vec<String> = counts
        .keys()
        .filter(|word| word.ends_with('s') && !word.ends_with("ss"))
        .filter(|word| counts.contains_key(&word[..word.len() - 1]))
        .cloned()
        .collect();
    for plural in plurals {
        if let Some(count) = counts.remove(&plural) {
            *counts.entry(plural[..plural.len() - 1].to_string()).or_insert(0) += count;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(max_words);

    let max_count = ranked.first().map_or(1, |(_, count)| *count) as f64;
    ranked
        .into_iter()
        .map(|(word, count)| WordFrequency {
            weight: count as f64 / max_count,
            word,
            count,
        })
        .collect()
}
