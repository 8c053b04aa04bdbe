//! 辞書ベースの極性スコアラー。
use serde::Serialize;

use crate::util::text::is_blank;

/// 極性スコア。`compound`は[-1, 1]に正規化された総合スコア。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// 翻訳済みテキストを採点するコラボレータ。
pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> PolarityScores;
}

/// VADER辞書によるスコアラー。
///
/// 辞書はプロセス起動時に一度だけ構築し、`Arc`で共有して注入する。
pub struct VaderScorer {
    analyzer: vader_sentiment::SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            analyzer: vader_sentiment::SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaderScorer").finish_non_exhaustive()
    }
}

impl PolarityScorer for VaderScorer {
    fn polarity_scores(&self, text: &str) -> PolarityScores {
        if is_blank(text) {
            return PolarityScores::default();
        }

        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        let (neg, pos) = (get("neg"), get("pos"));
        // vader_sentiment は感情語がなくても `!` / `?` の増幅分を負側に加算してしまう。
        // 感情語がなければ compound は常に 0
        let compound = if pos == 0.0 && neg == 0.0 {
            0.0
        } else {
            get("compound")
        };
        PolarityScores {
            neg,
            neu: get("neu"),
            pos,
            compound,
        }
    }
}
